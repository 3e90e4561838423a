// Declare the library modules
pub mod alignment;
pub mod config;
pub mod fasta;
pub mod io;
pub mod mapping;
pub mod merge;
pub mod pipeline;
pub mod run_management;
pub mod utils;

// Re-export the entry points used by the binary and the integration tests
pub use config::{RunConfig, RunId};
pub use pipeline::run_pipeline;
pub use run_management::{RunStatus, RunSummary};
