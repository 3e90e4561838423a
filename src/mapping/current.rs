use anyhow::Result;
use log::{debug, info};
use std::path::Path;

use super::table::read_table;
use super::{normalize_sequence, MappingRow, NestedMap};
use crate::fasta::SequenceTable;

/// The 0.30-resolution compound table: compound id -> (SH id -> synthetic id).
#[derive(Debug, Clone, Default)]
pub struct CurrentMapping {
    pub clusters: NestedMap,
}

impl CurrentMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one current table row. Slots are keyed by the row's own SH id,
    /// and the normalised sequence replaces any earlier entry for the same id.
    pub fn add_row(&mut self, row: &MappingRow<'_>, original: &mut SequenceTable) {
        let member = row.synthetic_id();
        if self.clusters.assign(row.compound_id, row.sh_id, member.clone()) {
            debug!("COMP\tSlot {}/{} reassigned to {}", row.compound_id, row.sh_id, member);
        }
        original.insert(member, normalize_sequence(row.sequence));
    }
}

/// Reads the current compound to sequence table
/// (compound id, ordinal, sequence, length, SH id, UCL id; the last column is unused).
pub fn build_current_mapping(path: &Path, original: &mut SequenceTable) -> Result<CurrentMapping> {
    let mut current = CurrentMapping::new();
    let rows = read_table(path, |row| {
        let row = MappingRow::from_table_row(row)?;
        current.add_row(&row, original);
        Ok(())
    })?;

    info!(
        "COMP\tCurrent table {}: {} rows, {} compounds, {} superseded members",
        path.display(),
        rows,
        current.clusters.len(),
        current.clusters.superseded_count()
    );
    Ok(current)
}
