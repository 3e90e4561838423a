// Output writers
pub mod output_fasta;

pub use output_fasta::{emit_cluster, emit_clusters, write_cluster_fasta, SequenceSources};
