// armtc-core/src/cache.rs
use std::fs;
use std::path::{Path, PathBuf};

use armtc_common::error::Result;
use armtc_common::model::ResolvedArtifact;
use armtc_io::checksum::{sha256_file, verify_checksum};
use armtc_io::fs::create_dir_all;
use armtc_net::http::Fetcher;
use tracing::{debug, info, warn};

use crate::state::{ArchiveRecord, BuildState};

/// Download directory whose entries are trusted only when their digest matches
/// the one recorded at download time.
pub struct ArchiveCache {
    dir: PathBuf,
    state_path: PathBuf,
}

impl ArchiveCache {
    pub fn new(dir: impl Into<PathBuf>, state_path: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            state_path: state_path.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entry_path(&self, artifact: &ResolvedArtifact) -> PathBuf {
        self.dir.join(&artifact.filename)
    }

    pub fn ensure_cached(
        &self,
        artifact: &ResolvedArtifact,
        fetcher: &dyn Fetcher,
        state: &mut BuildState,
    ) -> Result<PathBuf> {
        let path = self.entry_path(artifact);
        let filename = artifact.filename.as_str();

        if path.is_file() {
            if self.is_valid_entry(&path, artifact, state)? {
                info!("> Latest archive \"{}\" already present", filename);
                return Ok(path);
            }
            debug!("Removing untrusted cache entry {}", path.display());
            fs::remove_file(&path)?;
            state.forget_archive(filename);
        }

        create_dir_all(&self.dir)?;
        info!("> Downloading \"{}\"...", filename);
        let size = fetcher.download(&artifact.download_url, &path)?;

        if let Some(published) = &artifact.sha256 {
            if let Err(e) = verify_checksum(&path, published) {
                if let Err(remove_err) = fs::remove_file(&path) {
                    warn!(
                        "Could not remove mismatched download {}: {}",
                        path.display(),
                        remove_err
                    );
                }
                return Err(e);
            }
        }
        let digest = sha256_file(&path)?;

        state.record_archive(
            filename,
            ArchiveRecord {
                url: artifact.download_url.clone(),
                sha256: digest,
                size,
            },
        );
        state.save(&self.state_path)?;
        Ok(path)
    }

    fn is_valid_entry(
        &self,
        path: &Path,
        artifact: &ResolvedArtifact,
        state: &BuildState,
    ) -> Result<bool> {
        let Some(record) = state.archive(&artifact.filename) else {
            warn!(
                "No download record for {}, treating it as incomplete",
                artifact.filename
            );
            return Ok(false);
        };
        let digest = sha256_file(path)?;
        if digest != record.sha256 {
            warn!(
                "Cached {} does not match its recorded checksum, downloading again",
                artifact.filename
            );
            return Ok(false);
        }
        if let Some(published) = &artifact.sha256 {
            if !published.eq_ignore_ascii_case(&digest) {
                warn!(
                    "Cached {} does not match the published checksum, downloading again",
                    artifact.filename
                );
                return Ok(false);
            }
        }
        Ok(true)
    }
}
