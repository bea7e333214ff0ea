/*
File: armtc-io/src/fs.rs
Purpose: Primitive synchronous filesystem operations.
*/
use std::fs;
use std::io::{self, Write};
#[cfg(unix)]
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use armtc_common::error::{Result, ToolchainError};
use tempfile::NamedTempFile;
use tracing::{debug, error, warn};
use walkdir::WalkDir;

/// Creates a directory and all its parent components if they are missing.
pub fn create_dir_all(path: &Path) -> Result<()> {
    debug!("Creating directory recursively: {}", path.display());
    fs::create_dir_all(path).map_err(|e| {
        error!("Failed create dir {}: {}", path.display(), e);
        ToolchainError::from(e)
    })
}

/// Removes an empty directory.
pub fn remove_dir(path: &Path) -> Result<()> {
    debug!("Removing directory: {}", path.display());
    fs::remove_dir(path).map_err(|e| {
        if e.kind() != io::ErrorKind::NotFound {
            error!("Failed remove dir {}: {}", path.display(), e);
        }
        ToolchainError::from(e)
    })
}

/// Removes a directory and all its contents recursively. A missing directory is not an error.
pub fn remove_directory_recursive(path: &Path) -> Result<()> {
    debug!("Removing directory recursively: {}", path.display());
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => {
            error!("Failed remove dir_all {}: {}", path.display(), e);
            Err(ToolchainError::from(e))
        }
    }
}

/// Empties a directory but keeps the directory itself.
pub fn remove_dir_contents(path: &Path) -> Result<()> {
    debug!("Removing contents of: {}", path.display());
    for (_, entry_path, is_dir) in list_directory_entries(path)? {
        if is_dir {
            remove_directory_recursive(&entry_path)?;
        } else {
            fs::remove_file(&entry_path)?;
        }
    }
    Ok(())
}

/// Reads the entire contents of a file into a byte vector.
pub fn read_to_bytes(path: &Path) -> Result<Vec<u8>> {
    debug!("Reading file to bytes: {}", path.display());
    fs::read(path).map_err(|e| {
        error!("Failed read file {}: {}", path.display(), e);
        ToolchainError::from(e)
    })
}

/// Copies one file, creating the destination's parent directory when needed.
pub fn copy_file(src: &Path, dst: &Path) -> Result<u64> {
    debug!("Copying {} -> {}", src.display(), dst.display());
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dst).map_err(|e| {
        error!("Failed copy {} -> {}: {}", src.display(), dst.display(), e);
        ToolchainError::Io(Arc::new(io::Error::new(
            e.kind(),
            format!("Failed to copy {} to {}: {}", src.display(), dst.display(), e),
        )))
    })
}

/// Recursively copies `src` into a fresh `dst`. Fails if `dst` already exists.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<u64> {
    if dst.symlink_metadata().is_ok() {
        return Err(ToolchainError::Io(Arc::new(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Copy destination already exists: {}", dst.display()),
        ))));
    }
    merge_tree(src, dst)
}

/// Recursively copies `src` over `dst`, creating directories as needed and overwriting
/// files that already exist. Returns the number of files written.
pub fn merge_tree(src: &Path, dst: &Path) -> Result<u64> {
    debug!("Merging tree {} -> {}", src.display(), dst.display());
    if !src.is_dir() {
        return Err(ToolchainError::Io(Arc::new(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Source directory does not exist: {}", src.display()),
        ))));
    }

    let mut files_written = 0;
    for entry in WalkDir::new(src) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| ToolchainError::Generic(format!("Path outside copy root: {e}")))?;
        let target = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
            files_written += 1;
        } else {
            if target.symlink_metadata().is_ok() {
                fs::remove_file(&target)?;
            }
            fs::copy(entry.path(), &target)?;
            files_written += 1;
        }
    }
    Ok(files_written)
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    let link_target = fs::read_link(src)?;
    if dst.symlink_metadata().is_ok() {
        fs::remove_file(dst)?;
    }
    symlink(&link_target, dst)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    warn!(
        "Symlinks not supported on this platform, copying target of {} instead",
        src.display()
    );
    fs::copy(src, dst)?;
    Ok(())
}

/// Moves every entry of `dir` into `dest` by rename.
pub fn move_entries(dir: &Path, dest: &Path) -> Result<()> {
    debug!("Moving entries of {} into {}", dir.display(), dest.display());
    for (name, path, _) in list_directory_entries(dir)? {
        let target = dest.join(&name);
        fs::rename(&path, &target).map_err(|e| {
            error!(
                "Failed move {} -> {}: {}",
                path.display(),
                target.display(),
                e
            );
            ToolchainError::from(e)
        })?;
    }
    Ok(())
}

/// Atomically writes data to a file using a temporary file.
pub fn atomic_write_file(original_path: &Path, content: &[u8]) -> Result<()> {
    let dir = original_path.parent().ok_or_else(|| {
        ToolchainError::Generic(format!(
            "Cannot get parent directory for {}",
            original_path.display()
        ))
    })?;

    create_dir_all(dir)?;

    let mut temp_file = NamedTempFile::new_in(dir)?;
    let temp_path = temp_file.path().to_path_buf();

    debug!(
        "Atomically writing {} bytes to {} via temp file {}",
        content.len(),
        original_path.display(),
        temp_path.display()
    );

    temp_file.write_all(content)?;
    temp_file.flush()?;
    temp_file.as_file().sync_all()?;

    temp_file.persist(original_path).map_err(|e| {
        error!(
            "Failed to persist temporary file {} over {}: {}",
            temp_path.display(),
            original_path.display(),
            e.error
        );
        ToolchainError::Io(Arc::new(e.error))
    })?;

    Ok(())
}

/// Lists directory entries sorted by name, returning (name, path, is_dir).
/// Skips entries that cause errors during reading.
pub fn list_directory_entries(dir_path: &Path) -> Result<Vec<(String, PathBuf, bool)>> {
    debug!("Listing directory entries for: {}", dir_path.display());
    let mut entries = Vec::new();

    let read_dir = fs::read_dir(dir_path).map_err(|e| {
        error!("Failed to read directory {}: {}", dir_path.display(), e);
        ToolchainError::from(e)
    })?;
    for entry_res in read_dir {
        match entry_res {
            Ok(entry) => {
                let path = entry.path();
                let name = entry.file_name().to_string_lossy().to_string();
                match entry.file_type() {
                    Ok(file_type) => entries.push((name, path, file_type.is_dir())),
                    Err(e) => warn!("Failed to get file type for {}: {}", path.display(), e),
                }
            }
            Err(e) => warn!("Error reading entry in {}: {}", dir_path.display(), e),
        }
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}
