// Compound to sequence mapping tables of the 0.5 and 0.30 clusterings
pub mod crosswalk;
pub mod current;
pub mod legacy;
pub mod table;

use anyhow::Result;
use indexmap::IndexMap;

pub use crosswalk::Crosswalk;
pub use current::{build_current_mapping, CurrentMapping};
pub use legacy::{build_legacy_mapping, LegacyMapping};

use self::table::TableRow;

/// Synthetic reference id for a mapping-table ordinal: `i<ordinal>i`.
pub fn synthetic_id(ordinal: &str) -> String {
    format!("i{}i", ordinal)
}

/// Strips alignment gaps, spaces and line terminators and upper-cases the rest.
pub fn normalize_sequence(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '-' | ' ' | '\r' | '\n'))
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Columns shared by both compound to sequence tables:
/// compound id, ordinal, aligned sequence, length, SH id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingRow<'a> {
    pub compound_id: &'a str,
    pub ordinal: &'a str,
    pub sequence: &'a str,
    pub sh_id: &'a str,
}

impl<'a> MappingRow<'a> {
    pub const COLUMNS: usize = 5;

    pub fn from_table_row(row: &TableRow<'a>) -> Result<Self> {
        row.require_columns(Self::COLUMNS)?;
        Ok(MappingRow {
            compound_id: row.field(0)?,
            ordinal: row.field(1)?,
            sequence: row.field(2)?,
            sh_id: row.field(4)?,
        })
    }

    pub fn synthetic_id(&self) -> String {
        synthetic_id(self.ordinal)
    }
}

/// Members of one cluster, grouped by slot (an SH or UCL id).
///
/// Each slot holds the most recently assigned member. Assigning an occupied
/// slot moves the previous member to `superseded`, so every member ever
/// assigned is either held or superseded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterSlots {
    held: IndexMap<String, String>,
    superseded: Vec<String>,
}

impl ClusterSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `member` into `slot`. Returns true when an earlier member was displaced.
    pub fn assign(&mut self, slot: &str, member: String) -> bool {
        match self.held.get_mut(slot) {
            Some(current) => {
                let displaced = std::mem::replace(current, member);
                self.superseded.push(displaced);
                true
            }
            None => {
                self.held.insert(slot.to_string(), member);
                false
            }
        }
    }

    /// Member currently held by `slot`.
    pub fn get(&self, slot: &str) -> Option<&str> {
        self.held.get(slot).map(|s| s.as_str())
    }

    /// `(slot, member)` pairs in first-assignment order of the slot.
    pub fn held(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.held.iter().map(|(slot, member)| (slot.as_str(), member.as_str()))
    }

    /// Displaced members in the order they were displaced.
    pub fn superseded(&self) -> &[String] {
        &self.superseded
    }

    /// Every member: superseded ones first, then the held ones in slot order.
    pub fn members(&self) -> impl Iterator<Item = &str> + '_ {
        self.superseded
            .iter()
            .map(|s| s.as_str())
            .chain(self.held.values().map(|s| s.as_str()))
    }

    pub fn slot_count(&self) -> usize {
        self.held.len()
    }
}

/// Insertion-ordered cluster key -> `ClusterSlots`.
#[derive(Debug, Clone, Default)]
pub struct NestedMap {
    clusters: IndexMap<String, ClusterSlots>,
}

impl NestedMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `member` into `slot` of cluster `key`, creating the cluster on first use.
    pub fn assign(&mut self, key: &str, slot: &str, member: String) -> bool {
        match self.clusters.get_mut(key) {
            Some(slots) => slots.assign(slot, member),
            None => {
                let mut slots = ClusterSlots::new();
                slots.assign(slot, member);
                self.clusters.insert(key.to_string(), slots);
                false
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&ClusterSlots> {
        self.clusters.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClusterSlots)> + '_ {
        self.clusters.iter().map(|(key, slots)| (key.as_str(), slots))
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Total number of displaced members across all clusters.
    pub fn superseded_count(&self) -> usize {
        self.clusters.values().map(|slots| slots.superseded().len()).sum()
    }
}
