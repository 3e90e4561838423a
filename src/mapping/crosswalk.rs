use anyhow::Result;
use log::info;
use std::collections::HashMap;
use std::path::Path;

use super::table::read_table;

/// SH id (0.5 resolution) -> UCL cluster id (0.30 resolution).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Crosswalk {
    sh_to_ucl: HashMap<String, String>,
}

impl Crosswalk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the crosswalk table. Only the first two of its three columns
    /// (SH id, UCL id) are used; a repeated SH id keeps its last UCL id.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mut crosswalk = Crosswalk::new();
        let rows = read_table(path, |row| {
            crosswalk.insert(row.field(0)?, row.field(1)?);
            Ok(())
        })?;
        info!(
            "COMP\tLoaded {} SH to UCL mappings ({} rows) from {}",
            crosswalk.len(),
            rows,
            path.display()
        );
        Ok(crosswalk)
    }

    pub fn insert(&mut self, sh_id: impl Into<String>, ucl_id: impl Into<String>) {
        self.sh_to_ucl.insert(sh_id.into(), ucl_id.into());
    }

    /// UCL cluster of `sh_id`, if the crosswalk knows it.
    pub fn ucl_for(&self, sh_id: &str) -> Option<&str> {
        self.sh_to_ucl.get(sh_id).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.sh_to_ucl.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sh_to_ucl.is_empty()
    }
}

impl<S: Into<String>, U: Into<String>> FromIterator<(S, U)> for Crosswalk {
    fn from_iter<I: IntoIterator<Item = (S, U)>>(iter: I) -> Self {
        let mut crosswalk = Crosswalk::new();
        for (sh_id, ucl_id) in iter {
            crosswalk.insert(sh_id, ucl_id);
        }
        crosswalk
    }
}
