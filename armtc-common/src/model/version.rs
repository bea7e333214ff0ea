use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// A `<component>.ver` file dropped into the install prefix for downstream tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub component: String,
    pub version: String,
}

impl VersionRecord {
    pub fn new(component: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            version: version.into(),
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.ver", self.component)
    }

    pub fn write_to(&self, prefix: &Path) -> Result<PathBuf> {
        let path = prefix.join(self.file_name());
        tracing::debug!("Writing version record {}", path.display());
        fs::write(&path, format!("{}\n", self.version))?;
        Ok(path)
    }
}
