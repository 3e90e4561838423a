use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::path::Path;

/// One row of a headerless tab-separated table, with enough position
/// information to report malformed input.
#[derive(Debug)]
pub struct TableRow<'a> {
    path: &'a Path,
    line: u64,
    record: &'a StringRecord,
}

impl<'a> TableRow<'a> {
    /// 1-based line number of this row in its file.
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn len(&self) -> usize {
        self.record.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record.is_empty()
    }

    /// Field at `index`, or `None` when the row is shorter.
    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.record.get(index)
    }

    /// Fails unless the row carries at least `columns` fields.
    pub fn require_columns(&self, columns: usize) -> Result<()> {
        if self.record.len() < columns {
            bail!(
                "Malformed row at {}:{}: expected at least {} tab-separated columns, found {}",
                self.path.display(),
                self.line,
                columns,
                self.record.len()
            );
        }
        Ok(())
    }

    /// Field at `index`, failing with the file position when it is missing.
    pub fn field(&self, index: usize) -> Result<&'a str> {
        self.require_columns(index + 1)?;
        Ok(&self.record[index])
    }
}

/// Streams every row of a headerless tab-separated table through `visit`.
/// Rows may have differing column counts; each consumer checks what it needs.
/// Returns the number of rows read.
pub fn read_table<F>(path: &Path, mut visit: F) -> Result<usize>
where
    F: FnMut(&TableRow<'_>) -> Result<()>,
{
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_path(path)
        .with_context(|| format!("Failed to open table: {}", path.display()))?;

    let mut record = StringRecord::new();
    let mut row_count = 0;
    while reader
        .read_record(&mut record)
        .with_context(|| format!("Failed to read table row from {}", path.display()))?
    {
        let line = record.position().map(|pos| pos.line()).unwrap_or(0);
        let row = TableRow { path, line, record: &record };
        visit(&row)?;
        row_count += 1;
    }

    Ok(row_count)
}
