// armtc-common/src/pipeline.rs
use std::fmt;

use serde::{Deserialize, Serialize};

/// The ordered phases of a toolchain build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Download,
    Unpack,
    Configure,
    Build,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Download, Stage::Unpack, Stage::Configure, Stage::Build];

    /// Every stage that has to run to reach `self`, in execution order.
    pub fn prerequisites_and_self(self) -> impl Iterator<Item = Stage> {
        Self::ALL.into_iter().filter(move |stage| *stage <= self)
    }

    /// Stages whose results are invalidated when `self` is forced to rerun.
    pub fn self_and_dependents(self) -> impl Iterator<Item = Stage> {
        Self::ALL.into_iter().filter(move |stage| *stage >= self)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Download => "download",
            Stage::Unpack => "unpack",
            Stage::Configure => "configure",
            Stage::Build => "build",
        })
    }
}

/// Flags that force work the idempotency checks would otherwise skip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    pub reconfigure: bool,
    pub rebuild: bool,
}
