// armtc-core/src/install/sources.rs
//! Arranges the LLVM, Clang and LLD source archives into one source tree.

use std::fs;
use std::path::{Path, PathBuf};

use armtc_common::error::{Result, ToolchainError};
use armtc_common::model::artifact::source_stem;
use armtc_common::model::{ResolvedArtifact, SourceComponent};
use armtc_io::extract::extract_archive;
use armtc_io::fs::{create_dir_all, remove_directory_recursive};
use tracing::{debug, info};

/// A source archive sitting in the download cache.
#[derive(Debug, Clone)]
pub struct SourceArchive {
    pub component: SourceComponent,
    pub artifact: ResolvedArtifact,
    pub path: PathBuf,
}

impl SourceArchive {
    /// `llvm-5.0.0.src.tar.xz` -> `llvm-5.0.0`.
    pub fn stem(&self) -> &str {
        source_stem(&self.artifact.filename)
    }
}

/// `llvm-5.0.0` -> `5.0.0`.
pub fn llvm_version(llvm_stem: &str) -> &str {
    llvm_stem
        .strip_prefix(SourceComponent::Llvm.link_prefix())
        .unwrap_or(llvm_stem)
}

pub fn find_component(
    sources: &[SourceArchive],
    component: SourceComponent,
) -> Result<&SourceArchive> {
    sources
        .iter()
        .find(|s| s.component == component)
        .ok_or_else(|| {
            ToolchainError::DataShape(format!("no {} source archive", component.name()))
        })
}

/// Extracts each archive into place below `src_dir/<llvm-stem>`. Components
/// whose directory already exists are left untouched. Returns the LLVM source root.
pub fn unpack_sources(sources: &[SourceArchive], src_dir: &Path) -> Result<PathBuf> {
    let llvm = find_component(sources, SourceComponent::Llvm)?;
    let llvm_root = src_dir.join(llvm.stem());

    for component in SourceComponent::ALL {
        let source = find_component(sources, component)?;
        let target = match component.nested_path() {
            None => llvm_root.clone(),
            Some(nested) => llvm_root.join(nested),
        };
        if target.is_dir() {
            debug!("{} sources already in {}", component.name(), target.display());
            continue;
        }
        unpack_one(source, src_dir, &target)?;
    }
    Ok(llvm_root)
}

fn unpack_one(source: &SourceArchive, src_dir: &Path, target: &Path) -> Result<()> {
    let unpacked = src_dir.join(format!("{}.src", source.stem()));
    // Leftover from an interrupted extraction.
    remove_directory_recursive(&unpacked)?;

    info!("> Extracting {}...", source.artifact.filename);
    extract_archive(&source.path, src_dir, source.artifact.archive_kind)?;
    if !unpacked.is_dir() {
        return Err(ToolchainError::DataShape(format!(
            "{} did not unpack to {}",
            source.artifact.filename,
            unpacked.display()
        )));
    }

    if let Some(parent) = target.parent() {
        create_dir_all(parent)?;
    }
    fs::rename(&unpacked, target)?;
    debug!("Moved {} to {}", unpacked.display(), target.display());
    Ok(())
}
