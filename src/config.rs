use anyhow::{bail, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// Shared data directory holding the curated references and mapping tables.
pub const DEFAULT_DATA_DIR: &str = "/sh_matching/data";

const USER_DIR_NAME: &str = "userdir";
const COMPOUNDS_DIR_NAME: &str = "compounds";

const CANDIDATE_FASTA: &str = "iupac_out_full.fasta";
const CLOSEDREF_HITS: &str = "closedref.80-best-hits.map.uc";
const SANGER_REFS_FASTA: &str = "sanger_refs_sh_full.fasta";
const LEGACY_COMPOUND_TABLE: &str = "compound2seq_mapping.txt";
const CURRENT_COMPOUND_TABLE: &str = "sh030_2seq_mapping.txt";
const SH_CROSSWALK_TABLE: &str = "sh005_to_sh030_mappings.txt";

/// Numeric run identifier.
///
/// Kept as the original digit string so that leading zeros survive in the
/// per-run directory and log file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunId(String);

impl RunId {
    /// Validates that `raw` is a non-empty string of ASCII digits.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            bail!("Run id is not numeric: {:?}", raw);
        }
        Ok(RunId(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Configuration settings for one run, derived from CLI arguments.
///
/// Every input and output location is a fixed name under either the run's
/// user directory (`<work_dir>/userdir/<run_id>`) or the shared data directory.
#[derive(Debug, Clone)]
pub struct RunConfig {
    run_id: RunId,
    user_dir: PathBuf,
    data_dir: PathBuf,
    threads: usize,
}

impl RunConfig {
    /// Creates a new RunConfig. Validation of the run id happens in `RunId::parse`.
    pub fn new(run_id: RunId, work_dir: &Path, data_dir: &Path) -> Self {
        let user_dir = work_dir.join(USER_DIR_NAME).join(run_id.as_str());
        RunConfig {
            run_id,
            user_dir,
            data_dir: data_dir.to_path_buf(),
            threads: 1,
        }
    }

    /// Sets the number of worker threads used while writing cluster files.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn user_dir(&self) -> &Path {
        &self.user_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Run-specific candidate sequences.
    pub fn candidate_fasta(&self) -> PathBuf {
        self.user_dir.join(CANDIDATE_FASTA)
    }

    /// usearch closed-reference best hits for this run.
    pub fn closedref_hits(&self) -> PathBuf {
        self.user_dir.join(CLOSEDREF_HITS)
    }

    /// Curated Sanger reference sequences.
    pub fn sanger_refs_fasta(&self) -> PathBuf {
        self.data_dir.join(SANGER_REFS_FASTA)
    }

    /// 0.5-resolution compound to sequence table.
    pub fn legacy_compound_table(&self) -> PathBuf {
        self.data_dir.join(LEGACY_COMPOUND_TABLE)
    }

    /// 0.30-resolution compound to sequence table.
    pub fn current_compound_table(&self) -> PathBuf {
        self.data_dir.join(CURRENT_COMPOUND_TABLE)
    }

    /// SH (0.5) to UCL (0.30) crosswalk.
    pub fn sh_crosswalk_table(&self) -> PathBuf {
        self.data_dir.join(SH_CROSSWALK_TABLE)
    }

    pub fn log_file(&self) -> PathBuf {
        self.user_dir.join(format!("err_{}.log", self.run_id))
    }

    pub fn compounds_dir(&self) -> PathBuf {
        self.user_dir.join(COMPOUNDS_DIR_NAME)
    }
}
