use indexmap::IndexMap;
use log::{debug, info};
use std::collections::HashSet;

use crate::mapping::{CurrentMapping, LegacyMapping};

/// Ordered member ids of one cluster with a membership index for dedup-on-insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberList {
    ids: Vec<String>,
    index: HashSet<String>,
}

impl MemberList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `id` whether or not it is already present.
    pub fn push(&mut self, id: &str) {
        self.index.insert(id.to_string());
        self.ids.push(id.to_string());
    }

    /// Appends `id` unless it is already present. Returns true if appended.
    pub fn push_unique(&mut self, id: &str) -> bool {
        if self.index.contains(id) {
            return false;
        }
        self.push(id);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.ids.iter().map(|s| s.as_str())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Comma-joined form, used only for logging.
    pub fn joined(&self) -> String {
        self.ids.join(",")
    }
}

/// Merged member list of every UCL cluster in the current mapping.
#[derive(Debug, Clone, Default)]
pub struct MergedClusters {
    clusters: IndexMap<String, MemberList>,
    /// Legacy members that were not already present in their cluster.
    pub legacy_added: usize,
    /// Current SH ids with no legacy slots to draw from.
    pub unlinked_sh: usize,
}

impl MergedClusters {
    pub fn get(&self, ucl_id: &str) -> Option<&MemberList> {
        self.clusters.get(ucl_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MemberList)> + '_ {
        self.clusters.iter().map(|(ucl, members)| (ucl.as_str(), members))
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

/// Unions each current cluster with the legacy members reachable from its SH ids.
///
/// Per cluster the list holds, in order: the superseded current members, then
/// for each SH slot its current member followed by any legacy member of the
/// SH's legacy compound that is not yet in the list.
pub fn merge_clusters(current: &CurrentMapping, legacy: &LegacyMapping) -> MergedClusters {
    let mut merged = MergedClusters::default();

    for (ucl_id, slots) in current.clusters.iter() {
        let mut members = MemberList::new();
        for id in slots.superseded() {
            members.push(id);
        }

        for (sh_id, id) in slots.held() {
            members.push(id);

            let Some(legacy_slots) = legacy.slots_for_sh(sh_id) else {
                debug!("COMP\tNo legacy compound for {} in {}", sh_id, ucl_id);
                merged.unlinked_sh += 1;
                continue;
            };
            for (_, legacy_id) in legacy_slots.held() {
                if members.push_unique(legacy_id) {
                    merged.legacy_added += 1;
                }
            }
        }

        debug!("COMP\t{}: {}", ucl_id, members.joined());
        merged.clusters.insert(ucl_id.to_string(), members);
    }

    info!(
        "COMP\tMerged {} clusters, added {} legacy members, {} SH ids without legacy compound",
        merged.len(),
        merged.legacy_added,
        merged.unlinked_sh
    );
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fasta::SequenceTable;
    use crate::mapping::{Crosswalk, MappingRow};

    fn row<'a>(compound_id: &'a str, ordinal: &'a str, sh_id: &'a str) -> MappingRow<'a> {
        MappingRow { compound_id, ordinal, sequence: "ACGT", sh_id }
    }

    fn build(
        crosswalk: &[(&str, &str)],
        legacy_rows: &[MappingRow<'_>],
        current_rows: &[MappingRow<'_>],
    ) -> MergedClusters {
        let crosswalk: Crosswalk = crosswalk.iter().copied().collect();
        let mut original = SequenceTable::new();
        let mut legacy = LegacyMapping::new();
        for r in legacy_rows {
            legacy.add_row(r, &crosswalk, &mut original);
        }
        let mut current = CurrentMapping::new();
        for r in current_rows {
            current.add_row(r, &mut original);
        }
        merge_clusters(&current, &legacy)
    }

    #[test]
    fn test_member_list_dedup() {
        let mut list = MemberList::new();
        list.push("a");
        assert!(!list.push_unique("a"));
        assert!(list.push_unique("b"));
        list.push("a");
        assert_eq!(list.as_slice(), &["a".to_string(), "b".to_string(), "a".to_string()]);
        assert_eq!(list.joined(), "a,b,a");
        assert!(list.contains("b"));
        assert!(!list.contains("c"));
    }

    #[test]
    fn test_current_member_precedes_legacy_member() {
        let merged = build(
            &[("SH1", "UCL1")],
            &[row("C1", "100", "SH1")],
            &[row("C1", "200", "SH1")],
        );

        let members: Vec<&str> = merged.get("C1").unwrap().iter().collect();
        assert_eq!(members, vec!["i200i", "i100i"]);
        assert_eq!(merged.legacy_added, 1);
    }

    #[test]
    fn test_legacy_member_already_present_is_not_repeated() {
        let merged = build(
            &[("SH1", "UCL1")],
            &[row("C1", "5", "SH1")],
            &[row("UCL1", "5", "SH1")],
        );

        let members: Vec<&str> = merged.get("UCL1").unwrap().iter().collect();
        assert_eq!(members, vec!["i5i"]);
        assert_eq!(merged.legacy_added, 0);
    }

    #[test]
    fn test_superseded_members_come_first_and_none_is_lost() {
        let merged = build(
            &[("SH1", "UCL1"), ("SH2", "UCL2")],
            &[row("L1", "10", "SH1"), row("L1", "11", "SH2")],
            &[
                row("UCL1", "1", "SH1"),
                row("UCL1", "2", "SH1"),
                row("UCL1", "3", "SH2"),
                row("UCL1", "4", "SH1"),
            ],
        );

        let members: Vec<&str> = merged.get("UCL1").unwrap().iter().collect();
        // superseded i1i, i2i; then SH1 -> i4i + legacy L1 (i10i, i11i); then SH2 -> i3i
        assert_eq!(members, vec!["i1i", "i2i", "i4i", "i10i", "i11i", "i3i"]);

        let unique: HashSet<&str> = members.iter().copied().collect();
        assert_eq!(unique.len(), members.len());
    }

    #[test]
    fn test_missing_legacy_compound_is_tolerated() {
        let merged = build(&[("SH1", "UCL1")], &[], &[row("UCL1", "1", "SH9")]);

        let members: Vec<&str> = merged.get("UCL1").unwrap().iter().collect();
        assert_eq!(members, vec!["i1i"]);
        assert_eq!(merged.unlinked_sh, 1);
        assert_eq!(merged.legacy_added, 0);
    }

    #[test]
    fn test_legacy_compound_without_crosswalked_rows_adds_nothing() {
        // SH1 is in the legacy table but never crosswalked, so its compound has no slots
        let merged = build(&[], &[row("L1", "10", "SH1")], &[row("UCL1", "1", "SH1")]);

        let members: Vec<&str> = merged.get("UCL1").unwrap().iter().collect();
        assert_eq!(members, vec!["i1i"]);
        assert_eq!(merged.unlinked_sh, 1);
    }

    #[test]
    fn test_cluster_order_follows_current_table() {
        let merged = build(
            &[],
            &[],
            &[row("UCL3", "1", "SH1"), row("UCL1", "2", "SH2"), row("UCL3", "3", "SH3")],
        );
        let order: Vec<&str> = merged.iter().map(|(ucl, _)| ucl).collect();
        assert_eq!(order, vec!["UCL3", "UCL1"]);
        assert_eq!(merged.len(), 2);
    }
}
