// armtc-common/src/config.rs
use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::{Result, ToolchainError};
use crate::model::{ArtifactSpec, Platform, PlatformLayout, TARGET_TRIPLE};

const DEFAULT_ARM_LISTING_URL: &str =
    "https://developer.arm.com/open-source/gnu-toolchain/gnu-rm/downloads";
const DEFAULT_ARM_LINK_PATTERN: &str = r"gcc-arm-none-eabi-";
const DEFAULT_LLVM_LISTING_URL: &str = "https://releases.llvm.org/download.html";
const DEFAULT_LLVM_LINK_PATTERN: &str = r"\.src\.tar\.xz$";
const DEFAULT_JOBS: usize = 2;

const WORK_DIR_NAME: &str = "work";
const STATE_FILENAME: &str = "state.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub root_dir: PathBuf,
    /// Directory the install prefix is created in.
    pub prefix_root: PathBuf,
    pub platform: Platform,
    pub jobs: usize,
    pub cross_toolchain: ArtifactSpec,
    pub llvm_sources: ArtifactSpec,
}

impl Config {
    pub fn load() -> Result<Self> {
        debug!("Loading armtc configuration");

        let root_dir = match env::var("ARMTC_ROOT").ok().filter(|s| !s.is_empty()) {
            Some(root) => PathBuf::from(root),
            None => env::current_dir().map_err(|e| {
                ToolchainError::Config(format!("Cannot determine working directory: {e}"))
            })?,
        };
        debug!("Effective project root: {}", root_dir.display());

        let mut config = Self::for_root(&root_dir, Platform::current());

        if let Some(url) = env_override("ARMTC_ARM_LISTING_URL") {
            config.cross_toolchain.listing_url = url;
        }
        if let Some(pattern) = env_override("ARMTC_ARM_LINK_PATTERN") {
            config.cross_toolchain.link_pattern = pattern;
        }
        if let Some(url) = env_override("ARMTC_LLVM_LISTING_URL") {
            config.llvm_sources.listing_url = url;
        }
        if let Some(pattern) = env_override("ARMTC_LLVM_LINK_PATTERN") {
            config.llvm_sources.link_pattern = pattern;
        }

        debug!("Configuration loaded successfully.");
        Ok(config)
    }

    /// Defaults rooted at `root_dir` for the given host.
    pub fn for_root(root_dir: &Path, platform: Platform) -> Self {
        let layout = PlatformLayout::for_platform(platform);
        Self {
            root_dir: root_dir.to_path_buf(),
            prefix_root: root_dir.join("dist"),
            platform,
            jobs: DEFAULT_JOBS,
            cross_toolchain: ArtifactSpec {
                name: "gcc-arm-none-eabi".to_string(),
                listing_url: DEFAULT_ARM_LISTING_URL.to_string(),
                link_pattern: DEFAULT_ARM_LINK_PATTERN.to_string(),
                platform_suffix: Some(layout.link_suffix.to_string()),
            },
            llvm_sources: ArtifactSpec {
                name: "llvm".to_string(),
                listing_url: DEFAULT_LLVM_LISTING_URL.to_string(),
                link_pattern: DEFAULT_LLVM_LINK_PATTERN.to_string(),
                platform_suffix: None,
            },
        }
    }

    pub fn with_prefix(mut self, prefix: &Path) -> Result<Self> {
        let prefix = if prefix.is_absolute() {
            prefix.to_path_buf()
        } else {
            env::current_dir()?.join(prefix)
        };
        self.prefix_root = prefix;
        Ok(self)
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn layout(&self) -> &'static PlatformLayout {
        PlatformLayout::for_platform(self.platform)
    }

    pub fn work_dir(&self) -> PathBuf {
        self.root_dir.join(WORK_DIR_NAME)
    }

    pub fn src_dir(&self) -> PathBuf {
        self.work_dir().join("src")
    }

    pub fn dl_dir(&self) -> PathBuf {
        self.work_dir().join("dl")
    }

    pub fn build_dir(&self) -> PathBuf {
        self.work_dir().join("build")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.work_dir().join("logs")
    }

    pub fn state_file(&self) -> PathBuf {
        self.work_dir().join(STATE_FILENAME)
    }

    pub fn extras_dir(&self) -> PathBuf {
        self.root_dir.join("extras")
    }

    /// The install prefix, e.g. `dist/arm-none-eabi-llvm-linux`.
    pub fn dist_dir(&self) -> PathBuf {
        self.prefix_root
            .join(format!("{TARGET_TRIPLE}-llvm-{}", self.platform.tag()))
    }
}

fn env_override(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.is_empty())
}
