// FASTA input for raw and curated reference sequences
pub mod reader;

pub use reader::{canonical_reference_id, load_reference_sequences, ReferenceSequences, SequenceTable};
