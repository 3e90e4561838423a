use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::alignment::AlignmentHits;
use crate::fasta::SequenceTable;
use crate::merge::{MemberList, MergedClusters};
use crate::utils::io::{ensure_dir_exists, gzip_and_remove, open_file_for_writing};

/// Sequence tables a cluster file draws from.
#[derive(Debug, Clone, Copy)]
pub struct SequenceSources<'a> {
    /// Raw and reference sequences, looked up for alignment hits.
    pub uniques: &'a SequenceTable,
    /// Sequences rebuilt from the mapping tables, looked up for merged members.
    pub original: &'a SequenceTable,
}

fn write_record<W: Write>(writer: &mut W, ucl_id: &str, id: &str, table: &SequenceTable) -> Result<()> {
    let sequence = table
        .get(id)
        .ok_or_else(|| anyhow!("No sequence for '{}' in cluster {}", id, ucl_id))?;
    writeln!(writer, ">{}", id)?;
    writeln!(writer, "{}", sequence)?;
    Ok(())
}

/// Writes one cluster as FASTA: alignment hits first, in hit order, then the
/// merged members in accumulation order. Returns the number of records.
pub fn write_cluster_fasta<W: Write>(
    writer: &mut W,
    ucl_id: &str,
    hits: &[String],
    members: Option<&MemberList>,
    sources: SequenceSources<'_>,
) -> Result<usize> {
    for id in hits {
        write_record(writer, ucl_id, id, sources.uniques)?;
    }

    let mut records = hits.len();
    if let Some(members) = members {
        for id in members.iter() {
            write_record(writer, ucl_id, id, sources.original)?;
        }
        records += members.len();
    }
    Ok(records)
}

/// Writes `<dir>/<ucl_id>.fas`, compresses it to `<ucl_id>.fas.gz` and
/// removes the plaintext file. Returns the compressed file's path.
pub fn emit_cluster(
    dir: &Path,
    ucl_id: &str,
    hits: &[String],
    members: Option<&MemberList>,
    sources: SequenceSources<'_>,
) -> Result<PathBuf> {
    let fasta_path = dir.join(format!("{}.fas", ucl_id));
    {
        let mut writer = open_file_for_writing(&fasta_path)?;
        let records = write_cluster_fasta(&mut writer, ucl_id, hits, members, sources)
            .with_context(|| format!("Failed to write cluster file {}", fasta_path.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush file: {}", fasta_path.display()))?;
        debug!("COMP\tWrote {} records to {}", records, fasta_path.display());
    }
    gzip_and_remove(&fasta_path)
}

/// Emits one compressed FASTA file per cluster with alignment hits.
///
/// Clusters write disjoint files, so they are spread over a rayon pool of
/// `threads` workers; the returned paths follow hit-table order regardless.
pub fn emit_clusters(
    dir: &Path,
    hits: &AlignmentHits,
    merged: &MergedClusters,
    sources: SequenceSources<'_>,
    threads: usize,
) -> Result<Vec<PathBuf>> {
    ensure_dir_exists(dir)?;

    let jobs: Vec<(&str, &[String], Option<&MemberList>)> = hits
        .iter()
        .map(|(ucl_id, hit_ids)| {
            let members = merged.get(ucl_id);
            if members.is_none() {
                warn!("COMP\tNo merged members for {}; writing alignment hits only", ucl_id);
            }
            (ucl_id, hit_ids, members)
        })
        .collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
        .context("Failed to build emission thread pool")?;

    let written = pool.install(|| {
        jobs.par_iter()
            .map(|&(ucl_id, hit_ids, members)| emit_cluster(dir, ucl_id, hit_ids, members, sources))
            .collect::<Result<Vec<_>>>()
    })?;

    info!("COMP\tWrote {} cluster files to {}", written.len(), dir.display());
    Ok(written)
}
