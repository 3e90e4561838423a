use anyhow::{Context, Result};
use log::info;

use crate::alignment::join_alignment_hits;
use crate::config::RunConfig;
use crate::fasta::{load_reference_sequences, SequenceTable};
use crate::io::{emit_clusters, SequenceSources};
use crate::mapping::{build_current_mapping, build_legacy_mapping, Crosswalk};
use crate::merge::merge_clusters;
use crate::run_management::{RunStatus, RunSummary};

/// Builds the compound cluster files of one run.
///
/// Stages run strictly in order and each table is only read once the stage
/// that builds it has returned:
/// 1. raw and curated reference sequences,
/// 2. SH to UCL crosswalk and the 0.5 compound table,
/// 3. the 0.30 compound table,
/// 4. merge of both versions per UCL cluster,
/// 5. closed-reference hit join and per-cluster FASTA emission.
pub fn run_pipeline(config: &RunConfig) -> Result<RunSummary> {
    let mut summary = RunSummary::new(config.run_id().clone());
    summary.status = RunStatus::Running;
    info!(
        "COMP\tCreating compound clusters for run {} (user dir {}, data dir {})",
        config.run_id(),
        config.user_dir().display(),
        config.data_dir().display()
    );

    let refs = load_reference_sequences(&config.sanger_refs_fasta(), &config.candidate_fasta())
        .context("Failed to load reference sequences")?;
    summary.reference_sequences = refs.uniques.len();
    summary.must_keep_references = refs.must_keep.len();

    let crosswalk = Crosswalk::from_path(&config.sh_crosswalk_table())
        .context("Failed to load SH to UCL crosswalk")?;
    summary.crosswalk_entries = crosswalk.len();

    let mut original = SequenceTable::new();
    let legacy = build_legacy_mapping(&config.legacy_compound_table(), &crosswalk, &mut original)
        .context("Failed to build legacy compound mapping")?;
    summary.legacy_compounds = legacy.clusters.len();
    summary.legacy_superseded = legacy.clusters.superseded_count();

    let current = build_current_mapping(&config.current_compound_table(), &mut original)
        .context("Failed to build current compound mapping")?;
    summary.current_compounds = current.clusters.len();
    summary.current_superseded = current.clusters.superseded_count();
    summary.reconstructed_sequences = original.len();

    let merged = merge_clusters(&current, &legacy);
    summary.merged_clusters = merged.len();
    summary.legacy_members_added = merged.legacy_added;

    let hits = join_alignment_hits(&config.closedref_hits(), &crosswalk)
        .context("Failed to join closed-reference hits")?;
    summary.alignment_hits = hits.mapped;
    summary.unmapped_hits = hits.unmapped;

    let sources = SequenceSources {
        uniques: &refs.uniques,
        original: &original,
    };
    let written = emit_clusters(&config.compounds_dir(), &hits, &merged, sources, config.threads())
        .context("Failed to write compound cluster files")?;
    summary.cluster_files = written.len();

    summary.finish(RunStatus::Completed);
    Ok(summary)
}
