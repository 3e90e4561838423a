use anyhow::{Context, Result};
use clap::Parser;
use log::{error, LevelFilter};
use std::path::PathBuf;

use compound_clusters::config::DEFAULT_DATA_DIR;
use compound_clusters::run_management::init_run_log;
use compound_clusters::{run_pipeline, RunConfig, RunId, RunStatus};

fn parse_run_id(raw: &str) -> Result<RunId, String> {
    RunId::parse(raw).map_err(|e| e.to_string())
}

fn parse_thread_count(raw: &str) -> Result<usize, String> {
    let threads: usize = raw
        .parse()
        .map_err(|e| format!("Invalid thread count '{}': {}", raw, e))?;
    if threads == 0 {
        return Err("Thread count must be at least 1".to_string());
    }
    Ok(threads)
}

/// Create compound clusters for closed-reference hits.
///
/// Reconstructs, for every UCL cluster hit by the run's closed-reference
/// alignment, the member sequences of both the 0.5 and 0.30 clusterings and
/// writes them to `userdir/<RUN_ID>/compounds/<UCL>.fas.gz`.
#[derive(Parser, Debug, Clone)]
#[command(author = "SH matching team", version)]
#[command(help_template = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
")]
struct CompoundArgs {
    /// Run id in numeric format.
    #[clap(value_name = "RUN_ID", value_parser = parse_run_id)]
    run_id: RunId,

    /// Directory containing `userdir/<RUN_ID>` (defaults to the current directory).
    #[clap(long, value_parser)]
    work_dir: Option<PathBuf>,

    /// Shared data directory with the reference FASTA and mapping tables.
    #[clap(long, value_parser, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Number of threads used to write cluster files.
    #[clap(short, long, value_parser = parse_thread_count, default_value = "1")]
    threads: usize,

    /// Log at debug level.
    #[clap(short, long, action = clap::ArgAction::SetTrue)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = CompoundArgs::parse();

    let work_dir = match args.work_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to resolve the current directory")?,
    };
    let config = RunConfig::new(args.run_id, &work_dir, &args.data_dir).with_threads(args.threads);

    let level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    init_run_log(&config.log_file(), level)?;

    match run_pipeline(&config) {
        Ok(summary) => {
            summary.log();
            Ok(())
        }
        Err(err) => {
            error!("COMP\tRun {} {}: {:#}", config.run_id(), RunStatus::Failed, err);
            Err(err)
        }
    }
}
