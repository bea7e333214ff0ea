// armtc-core/src/state.rs
//! Persisted record of downloaded archives and completed stages.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::SystemTime;

use armtc_common::error::Result;
use armtc_common::pipeline::Stage;
use armtc_io::json_io::{read_json, write_json};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    pub url: String,
    pub sha256: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    /// RFC 3339, UTC.
    pub completed_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildState {
    #[serde(default)]
    pub archives: BTreeMap<String, ArchiveRecord>,
    #[serde(default)]
    pub stages: BTreeMap<Stage, StageRecord>,
}

impl BuildState {
    /// Loads the state file. A missing or unreadable file yields an empty state.
    pub fn load(path: &Path) -> Self {
        if !path.is_file() {
            debug!("No build state at {}, starting fresh", path.display());
            return Self::default();
        }
        match read_json(path) {
            Ok(state) => state,
            Err(e) => {
                warn!(
                    "Ignoring unreadable build state {}: {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    pub fn archive(&self, filename: &str) -> Option<&ArchiveRecord> {
        self.archives.get(filename)
    }

    pub fn record_archive(&mut self, filename: &str, record: ArchiveRecord) {
        self.archives.insert(filename.to_string(), record);
    }

    pub fn forget_archive(&mut self, filename: &str) {
        self.archives.remove(filename);
    }

    pub fn mark_complete(&mut self, stage: Stage) {
        let completed_at = humantime::format_rfc3339_seconds(SystemTime::now()).to_string();
        self.stages.insert(stage, StageRecord { completed_at });
    }

    pub fn is_complete(&self, stage: Stage) -> bool {
        self.stages.contains_key(&stage)
    }

    /// Drops the record of `stage` and every stage after it.
    pub fn forget(&mut self, stage: Stage) {
        for s in stage.self_and_dependents() {
            self.stages.remove(&s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = BuildState::load(&dir.path().join("state.json"));
        assert_eq!(state, BuildState::default());
    }

    #[test]
    fn corrupt_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, b"{ not json").unwrap();
        assert_eq!(BuildState::load(&path), BuildState::default());
    }

    #[test]
    fn saved_state_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("work").join("state.json");
        let mut state = BuildState::default();
        state.record_archive(
            "llvm-5.0.0.src.tar.xz",
            ArchiveRecord {
                url: "https://releases.llvm.org/5.0.0/llvm-5.0.0.src.tar.xz".to_string(),
                sha256: "ab".repeat(32),
                size: 42,
            },
        );
        state.mark_complete(Stage::Download);
        state.save(&path).unwrap();

        let loaded = BuildState::load(&path);
        assert!(loaded.is_complete(Stage::Download));
        assert!(!loaded.is_complete(Stage::Unpack));
        assert_eq!(loaded.archive("llvm-5.0.0.src.tar.xz").unwrap().size, 42);
        let stamp = &loaded.stages[&Stage::Download].completed_at;
        assert!(humantime::parse_rfc3339(stamp).is_ok());
    }

    #[test]
    fn forgetting_configure_also_forgets_build() {
        let mut state = BuildState::default();
        for stage in Stage::ALL {
            state.mark_complete(stage);
        }
        state.forget(Stage::Configure);
        assert!(state.is_complete(Stage::Unpack));
        assert!(!state.is_complete(Stage::Configure));
        assert!(!state.is_complete(Stage::Build));
    }
}
