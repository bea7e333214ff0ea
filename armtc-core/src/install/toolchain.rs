// armtc-core/src/install/toolchain.rs
//! Merges the pre-built GNU cross toolchain into the install prefix.

use std::fs;
use std::path::{Path, PathBuf};

use armtc_common::error::{Result, ToolchainError};
use armtc_common::model::{ExtractTarget, PlatformLayout, ResolvedArtifact, TARGET_TRIPLE};
use armtc_io::extract::extract_archive;
use armtc_io::fs::{
    copy_file, copy_tree, create_dir_all, list_directory_entries, merge_tree, move_entries,
    remove_dir,
};
use tracing::{debug, info};

/// GNU tools re-exported from the prefix's `bin/` without the triple prefix.
pub const BINUTILS: &[&str] = &[
    "ar", "as", "gdb", "gdb-py", "ld", "ld.bfd", "nm", "objcopy", "objdump", "ranlib", "readelf",
    "size", "strings", "strip",
];

/// Present in a flat C++ header root, absent while headers sit under a version directory.
const CXX_SENTINEL_HEADER: &str = "algorithm";
/// Present once the gcc runtime objects have been merged into the triple's lib dir.
const RUNTIME_SENTINEL: &str = "crtbegin.o";
/// Holds the version directory's entries while they are lifted into the header root.
const CXX_STAGING_DIR: &str = ".flattening";

/// Name of the directory the cross-toolchain archive unpacks to.
pub fn toolchain_dirname<'a>(artifact: &'a ResolvedArtifact, link_suffix: &str) -> &'a str {
    artifact
        .filename
        .strip_suffix(link_suffix)
        .unwrap_or(&artifact.filename)
}

/// Extracts the cross-toolchain archive under `src_dir` unless already present.
/// Returns the extracted toolchain root.
pub fn unpack_cross_toolchain(
    archive: &Path,
    artifact: &ResolvedArtifact,
    layout: &PlatformLayout,
    link_suffix: &str,
    src_dir: &Path,
) -> Result<PathBuf> {
    let dirname = toolchain_dirname(artifact, link_suffix);
    let toolchain_dir = src_dir.join(dirname);
    if toolchain_dir.is_dir() {
        debug!("{} already extracted", dirname);
        return Ok(toolchain_dir);
    }

    info!("> Extracting {}...", artifact.filename);
    let target = match layout.extract_target {
        ExtractTarget::NamedDir => toolchain_dir.clone(),
        ExtractTarget::SourceRoot => src_dir.to_path_buf(),
    };
    extract_archive(archive, &target, artifact.archive_kind)?;

    if !toolchain_dir.is_dir() {
        return Err(ToolchainError::DataShape(format!(
            "{} did not unpack to {}",
            artifact.filename,
            toolchain_dir.display()
        )));
    }
    Ok(toolchain_dir)
}

/// Copies the toolchain's headers, libraries and binutils into `dist` and
/// normalizes the runtime and C++ header layout. Returns the gcc version.
pub fn assemble_prefix(
    toolchain_dir: &Path,
    dist: &Path,
    layout: &PlatformLayout,
) -> Result<String> {
    create_dir_all(dist)?;
    copy_missing_subtrees(toolchain_dir, dist)?;
    copy_binutils(toolchain_dir, dist, layout)?;
    let version = install_gcc_runtime(dist)?;
    flatten_cxx_headers(dist)?;
    Ok(version)
}

fn copy_missing_subtrees(toolchain_dir: &Path, dist: &Path) -> Result<()> {
    let subtrees = [
        PathBuf::from(TARGET_TRIPLE).join("include"),
        PathBuf::from(TARGET_TRIPLE).join("lib"),
        PathBuf::from("lib"),
    ];
    for relative in &subtrees {
        let dest = dist.join(relative);
        if dest.is_dir() {
            debug!("{} already present, skipping", dest.display());
            continue;
        }
        let copied = copy_tree(&toolchain_dir.join(relative), &dest)?;
        debug!("Copied {} files into {}", copied, dest.display());
    }
    create_dir_all(&dist.join("bin"))
}

fn copy_binutils(toolchain_dir: &Path, dist: &Path, layout: &PlatformLayout) -> Result<()> {
    for tool in BINUTILS {
        let dst = dist.join("bin").join(layout.exe_name(tool));
        if dst.is_file() {
            continue;
        }
        let src = toolchain_dir
            .join("bin")
            .join(layout.exe_name(&format!("{TARGET_TRIPLE}-{tool}")));
        if !src.is_file() {
            return Err(ToolchainError::DataShape(format!(
                "cross toolchain has no {}",
                src.display()
            )));
        }
        copy_file(&src, &dst)?;
    }
    Ok(())
}

/// `dist/lib/gcc/<triple>`.
pub fn gcc_lib_dir(dist: &Path) -> PathBuf {
    dist.join("lib").join("gcc").join(TARGET_TRIPLE)
}

/// The gcc version, taken from the single version directory under the gcc lib dir.
pub fn gcc_version(dist: &Path) -> Result<String> {
    let (name, _) = single_directory(&gcc_lib_dir(dist))?;
    Ok(name)
}

fn install_gcc_runtime(dist: &Path) -> Result<String> {
    let version = gcc_version(dist)?;
    let version_dir = gcc_lib_dir(dist).join(&version);
    let libdest = dist.join(TARGET_TRIPLE).join("lib");
    if libdest.join(RUNTIME_SENTINEL).is_file() {
        debug!("gcc {} runtime already installed", version);
    } else {
        let copied = merge_tree(&version_dir, &libdest)?;
        debug!("Merged {} gcc {} runtime files into {}", copied, version, libdest.display());
    }
    Ok(version)
}

/// Lifts `include/c++/<ver>/*` to `include/c++/` unless the headers are already flat.
///
/// The version directory is first renamed to a fixed staging name, so an
/// interrupted run is resumed from the staging directory on the next call.
pub fn flatten_cxx_headers(dist: &Path) -> Result<()> {
    let cxx_root = dist.join(TARGET_TRIPLE).join("include").join("c++");
    let staging = cxx_root.join(CXX_STAGING_DIR);
    if staging.is_dir() {
        info!("Resuming interrupted C++ header flattening in {}", cxx_root.display());
    } else {
        if cxx_root.join(CXX_SENTINEL_HEADER).is_file() {
            return Ok(());
        }
        let (version, version_dir) = single_directory(&cxx_root)?;
        debug!("Flattening C++ headers for {}", version);
        fs::rename(&version_dir, &staging)?;
    }
    move_entries(&staging, &cxx_root)?;
    remove_dir(&staging)?;
    if !cxx_root.join(CXX_SENTINEL_HEADER).is_file() {
        return Err(ToolchainError::DataShape(format!(
            "no {} header in {} after flattening",
            CXX_SENTINEL_HEADER,
            cxx_root.display()
        )));
    }
    Ok(())
}

/// The one and only entry of `dir`, which must be a directory.
fn single_directory(dir: &Path) -> Result<(String, PathBuf)> {
    if !dir.is_dir() {
        return Err(ToolchainError::DataShape(format!(
            "expected directory {} is missing",
            dir.display()
        )));
    }
    let mut entries = list_directory_entries(dir)?;
    match entries.len() {
        1 => {
            let (name, path, is_dir) = entries.remove(0);
            if is_dir {
                Ok((name, path))
            } else {
                Err(ToolchainError::DataShape(format!(
                    "expected a version directory in {}, found file {}",
                    dir.display(),
                    name
                )))
            }
        }
        n => Err(ToolchainError::DataShape(format!(
            "expected exactly one version directory in {}, found {}",
            dir.display(),
            n
        ))),
    }
}
