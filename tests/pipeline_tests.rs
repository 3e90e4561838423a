// End-to-end tests of the compound cluster pipeline through the library API

use anyhow::Result;
use compound_clusters::{run_pipeline, RunConfig, RunId, RunStatus};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const RUN_ID: &str = "17";

/// Input files of one run laid out the way the pipeline expects them.
struct RunFixture {
    _dir: TempDir,
    work_dir: PathBuf,
    data_dir: PathBuf,
}

impl RunFixture {
    fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        let work_dir = dir.path().join("work");
        let data_dir = dir.path().join("data");
        fs::create_dir_all(work_dir.join("userdir").join(RUN_ID))?;
        fs::create_dir_all(&data_dir)?;
        Ok(RunFixture { _dir: dir, work_dir, data_dir })
    }

    fn user_file(&self, name: &str, content: &str) -> Result<()> {
        fs::write(self.work_dir.join("userdir").join(RUN_ID).join(name), content)?;
        Ok(())
    }

    fn data_file(&self, name: &str, content: &str) -> Result<()> {
        fs::write(self.data_dir.join(name), content)?;
        Ok(())
    }

    /// Crosswalk {SH1: UCL1, SH2: UCL2}, one legacy and one current row for
    /// SH1, and hits for Q1 (SH1) and Q2 (unknown SH9).
    fn basic() -> Result<Self> {
        let fixture = RunFixture::new()?;
        fixture.data_file("sanger_refs_sh_full.fasta", ">UDB1_SH1_refs\nACGTACGT\n")?;
        fixture.data_file("sh005_to_sh030_mappings.txt", "SH1\tUCL1\t1\nSH2\tUCL2\t1\n")?;
        fixture.data_file("compound2seq_mapping.txt", "C1\t100\tac-gt\t4\tSH1\n")?;
        fixture.data_file("sh030_2seq_mapping.txt", "UCL1\t200\tACGT\t4\tSH1\tUCL10_000001\n")?;
        fixture.user_file("iupac_out_full.fasta", ">Q1\nTTTTGGGG\n>Q2\nCCCCAAAA\n")?;
        fixture.user_file(
            "closedref.80-best-hits.map.uc",
            "H\t0\t8\t100.0\t+\t0\t0\t8M\tQ1\tX_SH1_Y\n\
             H\t0\t8\t100.0\t+\t0\t0\t8M\tQ2\tX_SH9_Y\n",
        )?;
        Ok(fixture)
    }

    fn config(&self) -> RunConfig {
        RunConfig::new(RunId::parse(RUN_ID).unwrap(), &self.work_dir, &self.data_dir)
    }

    fn compounds_dir(&self) -> PathBuf {
        self.config().compounds_dir()
    }
}

fn read_gz(path: &Path) -> Result<String> {
    let mut content = String::new();
    GzDecoder::new(File::open(path)?).read_to_string(&mut content)?;
    Ok(content)
}

#[test]
fn test_hits_then_current_then_legacy_members() -> Result<()> {
    let fixture = RunFixture::basic()?;

    let summary = run_pipeline(&fixture.config())?;

    let content = read_gz(&fixture.compounds_dir().join("UCL1.fas.gz"))?;
    assert_eq!(content, ">Q1\nTTTTGGGG\n>i200i\nACGT\n>i100i\nACGT\n");

    assert_eq!(summary.status, RunStatus::Completed);
    assert_eq!(summary.cluster_files, 1);
    assert_eq!(summary.alignment_hits, 1);
    assert_eq!(summary.unmapped_hits, 1);
    assert_eq!(summary.must_keep_references, 1);
    assert_eq!(summary.reference_sequences, 3);
    assert_eq!(summary.legacy_members_added, 1);
    Ok(())
}

#[test]
fn test_unmapped_hit_contributes_no_file_or_member() -> Result<()> {
    let fixture = RunFixture::basic()?;

    run_pipeline(&fixture.config())?;

    let mut names: Vec<String> = fs::read_dir(fixture.compounds_dir())?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<std::io::Result<_>>()?;
    names.sort();
    assert_eq!(names, vec!["UCL1.fas.gz".to_string()]);

    let content = read_gz(&fixture.compounds_dir().join("UCL1.fas.gz"))?;
    assert!(!content.contains(">Q2"));
    Ok(())
}

#[test]
fn test_displaced_current_member_is_still_emitted() -> Result<()> {
    let fixture = RunFixture::basic()?;
    // two rows for the same (compound, SH) slot, then a second SH group
    fixture.data_file(
        "sh030_2seq_mapping.txt",
        "UCL1\t201\tAAAA\t4\tSH1\tx\nUCL1\t202\tCCCC\t4\tSH1\tx\nUCL1\t203\tGG-GG\t4\tSH2\tx\n",
    )?;

    let summary = run_pipeline(&fixture.config())?;
    assert_eq!(summary.current_superseded, 1);

    let content = read_gz(&fixture.compounds_dir().join("UCL1.fas.gz"))?;
    assert_eq!(
        content,
        ">Q1\nTTTTGGGG\n>i201i\nAAAA\n>i202i\nCCCC\n>i100i\nACGT\n>i203i\nGGGG\n"
    );
    Ok(())
}

#[test]
fn test_rerun_is_byte_identical() -> Result<()> {
    let fixture = RunFixture::basic()?;
    let gz = fixture.compounds_dir().join("UCL1.fas.gz");

    run_pipeline(&fixture.config())?;
    let first = fs::read(&gz)?;

    fs::remove_dir_all(fixture.compounds_dir())?;
    run_pipeline(&fixture.config().with_threads(4))?;
    let second = fs::read(&gz)?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_hit_cluster_without_mapping_rows_gets_hits_only() -> Result<()> {
    let fixture = RunFixture::basic()?;
    fixture.user_file(
        "closedref.80-best-hits.map.uc",
        "H\t0\t8\t100.0\t+\t0\t0\t8M\tQ2\tX_SH2_Y\n",
    )?;

    run_pipeline(&fixture.config())?;

    let content = read_gz(&fixture.compounds_dir().join("UCL2.fas.gz"))?;
    assert_eq!(content, ">Q2\nCCCCAAAA\n");
    Ok(())
}

#[test]
fn test_missing_input_fails() -> Result<()> {
    let fixture = RunFixture::basic()?;
    fs::remove_file(fixture.data_dir.join("compound2seq_mapping.txt"))?;

    let err = run_pipeline(&fixture.config()).unwrap_err();
    assert!(format!("{:#}", err).contains("compound2seq_mapping.txt"));
    assert!(!fixture.compounds_dir().exists());
    Ok(())
}

#[test]
fn test_hit_without_sequence_fails() -> Result<()> {
    let fixture = RunFixture::basic()?;
    fixture.user_file("iupac_out_full.fasta", ">Q2\nCCCCAAAA\n")?;

    let err = run_pipeline(&fixture.config()).unwrap_err();
    assert!(format!("{:#}", err).contains("No sequence for 'Q1'"));
    Ok(())
}
