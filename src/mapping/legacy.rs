use anyhow::Result;
use log::{debug, info};
use std::collections::HashMap;
use std::path::Path;

use super::table::read_table;
use super::{normalize_sequence, ClusterSlots, Crosswalk, MappingRow, NestedMap};
use crate::fasta::SequenceTable;

/// The 0.5-resolution compound table, regrouped by UCL cluster.
#[derive(Debug, Clone, Default)]
pub struct LegacyMapping {
    /// compound id -> (UCL id -> synthetic id)
    pub clusters: NestedMap,
    /// SH id -> compound id, last row wins.
    pub sh_to_compound: HashMap<String, String>,
}

impl LegacyMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one legacy table row.
    ///
    /// Every row records its SH id's compound. Only rows whose SH id has a UCL
    /// cluster in the crosswalk are placed into a slot and get their
    /// normalised sequence stored in `original`.
    pub fn add_row(&mut self, row: &MappingRow<'_>, crosswalk: &Crosswalk, original: &mut SequenceTable) {
        self.sh_to_compound
            .insert(row.sh_id.to_string(), row.compound_id.to_string());

        if let Some(ucl_id) = crosswalk.ucl_for(row.sh_id) {
            let member = row.synthetic_id();
            if self.clusters.assign(row.compound_id, ucl_id, member.clone()) {
                debug!(
                    "COMP\tLegacy slot {}/{} reassigned to {}",
                    row.compound_id, ucl_id, member
                );
            }
            original.insert(member, normalize_sequence(row.sequence));
        }
    }

    /// Compound that the legacy table assigned to `sh_id`.
    pub fn compound_for(&self, sh_id: &str) -> Option<&str> {
        self.sh_to_compound.get(sh_id).map(|s| s.as_str())
    }

    /// Legacy slots of the compound holding `sh_id`, if any.
    pub fn slots_for_sh(&self, sh_id: &str) -> Option<&ClusterSlots> {
        self.compound_for(sh_id).and_then(|compound| self.clusters.get(compound))
    }
}

/// Reads the legacy compound to sequence table
/// (compound id, ordinal, sequence, length, SH id).
pub fn build_legacy_mapping(path: &Path, crosswalk: &Crosswalk, original: &mut SequenceTable) -> Result<LegacyMapping> {
    let mut legacy = LegacyMapping::new();
    let rows = read_table(path, |row| {
        let row = MappingRow::from_table_row(row)?;
        legacy.add_row(&row, crosswalk, original);
        Ok(())
    })?;

    info!(
        "COMP\tLegacy table {}: {} rows, {} compounds, {} superseded members",
        path.display(),
        rows,
        legacy.clusters.len(),
        legacy.clusters.superseded_count()
    );
    Ok(legacy)
}
