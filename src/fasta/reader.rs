use anyhow::{Context, Result};
use bio::io::fasta;
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::utils::io::open_file_for_reading;

/// Sequence strings keyed by sequence identifier.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SequenceTable {
    sequences: HashMap<String, String>,
}

impl SequenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `sequence` under `id`, returning the sequence it replaced.
    pub fn insert(&mut self, id: impl Into<String>, sequence: impl Into<String>) -> Option<String> {
        self.sequences.insert(id.into(), sequence.into())
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.sequences.get(id).map(|s| s.as_str())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sequences.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

/// Raw and reference sequences available to a run.
#[derive(Debug, Default)]
pub struct ReferenceSequences {
    /// Curated references under their canonical id plus every candidate record.
    pub uniques: SequenceTable,
    /// Canonical ids of all curated references.
    pub must_keep: HashSet<String>,
}

/// Canonical id of a curated reference record: the text before the first `_`.
pub fn canonical_reference_id(record_id: &str) -> &str {
    record_id.split('_').next().unwrap_or(record_id)
}

/// Calls `visit` with the id and sequence of every record in a FASTA file.
/// Returns the number of records read.
pub fn for_each_fasta_record<F>(fasta_path: &Path, mut visit: F) -> Result<usize>
where
    F: FnMut(&str, String),
{
    let reader = fasta::Reader::new(open_file_for_reading(fasta_path)?);

    let mut record_count = 0;
    for result in reader.records() {
        let record = result.with_context(|| format!("Failed to read FASTA record from {}", fasta_path.display()))?;
        let sequence = String::from_utf8(record.seq().to_vec())
            .with_context(|| format!("Record '{}' in {} is not valid UTF-8", record.id(), fasta_path.display()))?;
        visit(record.id(), sequence);
        record_count += 1;
    }

    debug!("Read {} records from {}", record_count, fasta_path.display());
    Ok(record_count)
}

/// Loads the curated reference set and the run's candidate set into one table.
///
/// Curated headers are collapsed to their canonical id (last record wins on a
/// collision) and recorded as must-keep. Candidate records keep their full id
/// and are loaded second, so they win over a curated record with the same id.
pub fn load_reference_sequences(curated_path: &Path, candidate_path: &Path) -> Result<ReferenceSequences> {
    let mut refs = ReferenceSequences::default();

    let curated_count = for_each_fasta_record(curated_path, |id, sequence| {
        let canonical = canonical_reference_id(id);
        refs.must_keep.insert(canonical.to_string());
        refs.uniques.insert(canonical, sequence);
    })?;
    info!(
        "COMP\tLoaded {} curated references ({} canonical ids) from {}",
        curated_count,
        refs.must_keep.len(),
        curated_path.display()
    );

    let candidate_count = for_each_fasta_record(candidate_path, |id, sequence| {
        refs.uniques.insert(id, sequence);
    })?;
    info!("COMP\tLoaded {} candidate sequences from {}", candidate_count, candidate_path.display());

    Ok(refs)
}
