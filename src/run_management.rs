use anyhow::{Context, Result};
use chrono::{DateTime, Local}; // For timestamps
use log::{info, LevelFilter};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::config::RunId;

/// Timestamp layout of run log lines, e.g. `2024-05-01 13:02:11,532`.
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Represents the possible states of a compound cluster run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The run is currently being set up.
    Initializing,
    /// The run is actively processing.
    Running,
    /// The run has finished all processing successfully.
    Completed,
    /// The run encountered an error and stopped prematurely.
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunStatus::Initializing => "initializing",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Counters collected while a run moves through its stages.
/// Logged once at the end of the run so operators can check partial results.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Identifier of the run this summary belongs to.
    pub run_id: RunId,
    /// The current execution status of the run.
    pub status: RunStatus,
    /// Timestamp of when the run was started.
    pub started: DateTime<Local>,
    /// Timestamp of when the run reached a terminal status.
    pub finished: Option<DateTime<Local>>,
    pub reference_sequences: usize,
    pub must_keep_references: usize,
    pub crosswalk_entries: usize,
    pub legacy_compounds: usize,
    pub legacy_superseded: usize,
    pub current_compounds: usize,
    pub current_superseded: usize,
    pub reconstructed_sequences: usize,
    pub merged_clusters: usize,
    pub legacy_members_added: usize,
    pub alignment_hits: usize,
    pub unmapped_hits: usize,
    pub cluster_files: usize,
}

impl RunSummary {
    pub fn new(run_id: RunId) -> Self {
        RunSummary {
            run_id,
            status: RunStatus::Initializing,
            started: Local::now(),
            finished: None,
            reference_sequences: 0,
            must_keep_references: 0,
            crosswalk_entries: 0,
            legacy_compounds: 0,
            legacy_superseded: 0,
            current_compounds: 0,
            current_superseded: 0,
            reconstructed_sequences: 0,
            merged_clusters: 0,
            legacy_members_added: 0,
            alignment_hits: 0,
            unmapped_hits: 0,
            cluster_files: 0,
        }
    }

    /// Marks the run as finished with the given terminal status.
    pub fn finish(&mut self, status: RunStatus) {
        self.status = status;
        self.finished = Some(Local::now());
    }

    /// Writes the summary to the run log.
    pub fn log(&self) {
        info!(
            "COMP\tRun {} {}: {} reference sequences ({} must-keep), {} crosswalk entries",
            self.run_id, self.status, self.reference_sequences, self.must_keep_references, self.crosswalk_entries
        );
        info!(
            "COMP\tLegacy compounds: {} ({} superseded members), current compounds: {} ({} superseded members), reconstructed sequences: {}",
            self.legacy_compounds,
            self.legacy_superseded,
            self.current_compounds,
            self.current_superseded,
            self.reconstructed_sequences
        );
        info!(
            "COMP\tMerged clusters: {} ({} legacy members added), alignment hits: {} ({} without UCL), cluster files: {}",
            self.merged_clusters, self.legacy_members_added, self.alignment_hits, self.unmapped_hits, self.cluster_files
        );
        if let Some(finished) = self.finished {
            let elapsed = finished.signed_duration_since(self.started);
            info!("COMP\tRun {} took {} ms", self.run_id, elapsed.num_milliseconds());
        }
    }
}

/// Formats one run log line: `<timestamp> - <target> - <LEVEL> - <message>`.
pub fn format_log_line(timestamp: &DateTime<Local>, target: &str, level: log::Level, message: &fmt::Arguments<'_>) -> String {
    format!("{} - {} - {} - {}", timestamp.format(LOG_TIMESTAMP_FORMAT), target, level, message)
}

/// Installs the global logger, appending every record to the run's log file.
///
/// Environment variables are ignored; the level comes from the command line.
pub fn init_run_log(log_path: &Path, level: LevelFilter) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open run log at {:?}", log_path))?;

    env_logger::Builder::new()
        .filter_level(level)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            writeln!(buf, "{}", format_log_line(&Local::now(), record.target(), record.level(), record.args()))
        })
        .try_init()
        .with_context(|| format!("Failed to install run logger for {:?}", log_path))?;
    Ok(())
}
