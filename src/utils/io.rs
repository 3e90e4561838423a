use anyhow::{Context, Result};
use flate2::{Compression, GzBuilder};
use std::fs::{self, create_dir_all, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Ensure that the specified directory exists, creating it if necessary
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        create_dir_all(path).with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Open a file for reading
pub fn open_file_for_reading(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file for reading: {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Open a file for writing
pub fn open_file_for_writing(path: &Path) -> Result<BufWriter<File>> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent)?;
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to open file for writing: {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Path of the gzip companion of `path` (`x.fas` -> `x.fas.gz`).
pub fn gzip_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".gz");
    PathBuf::from(name)
}

/// Compresses `path` into `<path>.gz` and removes the plaintext file.
///
/// The gzip header records the plaintext file name and a zero modification
/// time, so compressing identical content always yields identical bytes.
pub fn gzip_and_remove(path: &Path) -> Result<PathBuf> {
    let gz_path = gzip_path(path);
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    {
        let mut reader = open_file_for_reading(path)?;
        let writer = open_file_for_writing(&gz_path)?;
        let mut encoder = GzBuilder::new()
            .filename(file_name)
            .mtime(0)
            .write(writer, Compression::default());
        io::copy(&mut reader, &mut encoder)
            .with_context(|| format!("Failed to compress {} into {}", path.display(), gz_path.display()))?;
        let mut writer = encoder
            .finish()
            .with_context(|| format!("Failed to finish gzip stream: {}", gz_path.display()))?;
        io::Write::flush(&mut writer)
            .with_context(|| format!("Failed to flush file: {}", gz_path.display()))?;
    }

    fs::remove_file(path).with_context(|| format!("Failed to remove plaintext file: {}", path.display()))?;
    Ok(gz_path)
}
