//! Closed-reference alignment hits (usearch `.uc` output) joined to UCL clusters.
//!
//! Only `H` (hit) records are used. Column 9 holds the query (raw sequence)
//! id and column 10 the target reference label, whose second `_`-delimited
//! token is the target's SH id.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::info;
use std::path::Path;

use crate::mapping::table::read_table;
use crate::mapping::Crosswalk;

/// Record type of a usearch hit row.
pub const HIT_RECORD: &str = "H";
/// Columns of a usearch cluster-format row.
pub const UC_COLUMNS: usize = 10;

const QUERY_COLUMN: usize = 8;
const TARGET_COLUMN: usize = 9;

/// SH id embedded in a target label such as `UDB012345_SH1234.10FU_reps`.
pub fn sh_id_from_target(target: &str) -> Option<&str> {
    target.split('_').nth(1)
}

/// Raw sequence ids hit per UCL cluster, in hit-table order.
#[derive(Debug, Clone, Default)]
pub struct AlignmentHits {
    clusters: IndexMap<String, Vec<String>>,
    /// Hit rows joined to a cluster.
    pub mapped: usize,
    /// Hit rows whose SH id has no UCL cluster.
    pub unmapped: usize,
}

impl AlignmentHits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `query_id` to the cluster of `sh_id`. Returns false, after logging,
    /// when the crosswalk has no cluster for the SH id.
    pub fn record(&mut self, query_id: &str, sh_id: &str, crosswalk: &Crosswalk) -> bool {
        match crosswalk.ucl_for(sh_id) {
            Some(ucl_id) => {
                self.clusters
                    .entry(ucl_id.to_string())
                    .or_default()
                    .push(query_id.to_string());
                self.mapped += 1;
                true
            }
            None => {
                info!("COMP\tUCL for {} not found.", sh_id);
                self.unmapped += 1;
                false
            }
        }
    }

    pub fn get(&self, ucl_id: &str) -> Option<&[String]> {
        self.clusters.get(ucl_id).map(|ids| ids.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.clusters.iter().map(|(ucl, ids)| (ucl.as_str(), ids.as_slice()))
    }

    /// Number of clusters with at least one hit.
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

/// Reads the closed-reference hit table and groups hit queries by UCL cluster.
///
/// A hit row with fewer than ten columns, or whose target label has no SH
/// token, aborts the run.
pub fn join_alignment_hits(path: &Path, crosswalk: &Crosswalk) -> Result<AlignmentHits> {
    let mut hits = AlignmentHits::new();
    read_table(path, |row| {
        if row.get(0) != Some(HIT_RECORD) {
            return Ok(());
        }
        row.require_columns(UC_COLUMNS)?;
        let query_id = row.field(QUERY_COLUMN)?;
        let target = row.field(TARGET_COLUMN)?;
        let sh_id = sh_id_from_target(target).with_context(|| {
            format!(
                "Malformed hit at {}:{}: target '{}' has no SH token",
                path.display(),
                row.line(),
                target
            )
        })?;
        hits.record(query_id, sh_id, crosswalk);
        Ok(())
    })?;

    info!(
        "COMP\tJoined {} hits into {} clusters ({} hits without UCL) from {}",
        hits.mapped,
        hits.len(),
        hits.unmapped,
        path.display()
    );
    Ok(hits)
}
