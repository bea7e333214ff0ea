// Path: armtc-io/src/extract.rs
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
#[cfg(unix)]
use std::os::unix::fs as unix_fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use armtc_common::error::{Result, ToolchainError};
use armtc_common::model::ArchiveKind;
use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use tar::{Archive, EntryType};
use tracing::{debug, error, warn};
use xz2::read::XzDecoder;
use zip::read::ZipArchive;

pub fn extract_archive(
    archive_path: &Path,
    target_dir: &Path,
    archive_kind: ArchiveKind,
) -> Result<()> {
    debug!(
        "Extracting archive '{}' (type: {:?}) to '{}'",
        archive_path.display(),
        archive_kind,
        target_dir.display()
    );

    fs::create_dir_all(target_dir).map_err(|e| {
        ToolchainError::Io(Arc::new(io::Error::new(
            e.kind(),
            format!(
                "Failed to create target directory {}: {}",
                target_dir.display(),
                e
            ),
        )))
    })?;

    let file = File::open(archive_path).map_err(|e| {
        ToolchainError::Io(Arc::new(io::Error::new(
            e.kind(),
            format!("Failed to open archive {}: {}", archive_path.display(), e),
        )))
    })?;
    let file = BufReader::new(file);

    match archive_kind {
        ArchiveKind::Zip => extract_zip_archive(file, target_dir, archive_path),
        ArchiveKind::TarGz => extract_tar_archive(
            GzDecoder::new(file),
            target_dir,
            archive_path,
        ),
        ArchiveKind::TarBz2 => extract_tar_archive(
            BzDecoder::new(file),
            target_dir,
            archive_path,
        ),
        ArchiveKind::TarXz => extract_tar_archive(
            XzDecoder::new(file),
            target_dir,
            archive_path,
        ),
    }
}

/// Maps an archive entry path onto disk below `target_dir`, rejecting anything that
/// would escape it. `Ok(None)` means the entry names nothing below `target_dir`.
fn resolve_entry_path(
    path_in_archive: &Path,
    target_dir: &Path,
) -> std::result::Result<Option<PathBuf>, String> {
    let mut on_disk = target_dir.to_path_buf();
    for comp in path_in_archive.components() {
        match comp {
            Component::Normal(p) => on_disk.push(p),
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(format!(
                    "Unsafe '..' in archive path {}",
                    path_in_archive.display()
                ));
            }
            Component::Prefix(_) | Component::RootDir => {
                return Err(format!(
                    "Disallowed component {:?} in archive path {}",
                    comp,
                    path_in_archive.display()
                ));
            }
        }
    }
    if !on_disk.starts_with(target_dir) {
        return Err(format!(
            "Path traversal {} -> {}",
            path_in_archive.display(),
            on_disk.display()
        ));
    }
    if on_disk == target_dir {
        return Ok(None);
    }
    Ok(Some(on_disk))
}

/// Hardlinks are created once every regular file has been unpacked.
#[cfg(unix)]
struct DeferredHardLink {
    link_path: PathBuf,
    target_path: PathBuf,
}

fn extract_tar_archive<R: Read>(
    reader: R,
    target_dir: &Path,
    archive_path_for_log: &Path,
) -> Result<()> {
    let mut archive = Archive::new(reader);
    archive.set_preserve_permissions(true);
    archive.set_overwrite(true);

    debug!(
        "Starting TAR extraction for {}",
        archive_path_for_log.display()
    );

    #[cfg(unix)]
    let mut deferred_hardlinks: Vec<DeferredHardLink> = Vec::new();
    let mut errors: Vec<String> = Vec::new();

    for entry_result in archive.entries()? {
        let mut entry = entry_result.map_err(|e| {
            ToolchainError::Extraction(format!(
                "Error reading TAR entry from {}: {}",
                archive_path_for_log.display(),
                e
            ))
        })?;

        let path_in_archive: PathBuf = entry
            .path()
            .map_err(|e| {
                ToolchainError::Extraction(format!(
                    "Invalid path in TAR entry from {}: {}",
                    archive_path_for_log.display(),
                    e
                ))
            })?
            .into_owned();

        let on_disk = match resolve_entry_path(&path_in_archive, target_dir) {
            Ok(Some(path)) => path,
            Ok(None) => continue,
            Err(msg) => {
                error!("{} (in {})", msg, archive_path_for_log.display());
                errors.push(msg);
                continue;
            }
        };

        if let Some(parent) = on_disk.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        #[cfg(unix)]
        if entry.header().entry_type() == EntryType::Link {
            let link_name = entry.link_name().ok().flatten().map(|p| p.into_owned());
            match link_name
                .as_deref()
                .map(|name| resolve_entry_path(name, target_dir))
            {
                Some(Ok(Some(target_path))) => {
                    deferred_hardlinks.push(DeferredHardLink {
                        link_path: on_disk,
                        target_path,
                    });
                }
                _ => {
                    let msg = format!(
                        "Hardlink entry '{}' in {} has no usable link target.",
                        path_in_archive.display(),
                        archive_path_for_log.display()
                    );
                    warn!("{}", msg);
                    errors.push(msg);
                }
            }
            continue;
        }

        if let Err(e) = entry.unpack(&on_disk) {
            if e.kind() != io::ErrorKind::AlreadyExists {
                let msg = format!(
                    "Failed to unpack entry {:?} to {}: {}",
                    path_in_archive,
                    on_disk.display(),
                    e
                );
                error!("{}", msg);
                errors.push(msg);
            }
        }
    }

    #[cfg(unix)]
    for deferred in deferred_hardlinks {
        if !deferred.target_path.exists() {
            let msg = format!(
                "Target '{}' for hardlink '{}' does not exist.",
                deferred.target_path.display(),
                deferred.link_path.display()
            );
            error!("{}", msg);
            errors.push(msg);
            continue;
        }
        if deferred.link_path.symlink_metadata().is_ok() {
            if let Err(e) = fs::remove_file(&deferred.link_path) {
                warn!(
                    "Could not remove existing file at hardlink destination {}: {}",
                    deferred.link_path.display(),
                    e
                );
            }
        }
        if let Err(e) = fs::hard_link(&deferred.target_path, &deferred.link_path) {
            let msg = format!(
                "Failed to create hardlink '{}' -> '{}': {}",
                deferred.link_path.display(),
                deferred.target_path.display(),
                e
            );
            error!("{}", msg);
            errors.push(msg);
        }
    }

    if !errors.is_empty() {
        return Err(ToolchainError::Extraction(format!(
            "Failed during TAR extraction for {} with {} error(s): {}",
            archive_path_for_log.display(),
            errors.len(),
            errors.join("; ")
        )));
    }

    debug!(
        "Finished TAR extraction for {}",
        archive_path_for_log.display()
    );
    Ok(())
}

fn extract_zip_archive<R: Read + Seek>(
    reader: R,
    target_dir: &Path,
    archive_path_for_log: &Path,
) -> Result<()> {
    let mut archive = ZipArchive::new(reader).map_err(|e| {
        ToolchainError::Extraction(format!(
            "Failed to open ZIP {}: {}",
            archive_path_for_log.display(),
            e
        ))
    })?;
    debug!(
        "Starting ZIP extraction for {}",
        archive_path_for_log.display()
    );

    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(|e| {
            ToolchainError::Extraction(format!(
                "Error reading ZIP index {} in {}: {}",
                i,
                archive_path_for_log.display(),
                e
            ))
        })?;

        let Some(path_in_archive) = file.enclosed_name() else {
            debug!("Skipping unsafe ZIP entry name {}", file.name());
            continue;
        };
        let on_disk = match resolve_entry_path(&path_in_archive, target_dir)
        {
            Ok(Some(path)) => path,
            Ok(None) => continue,
            Err(msg) => {
                error!("{} (in {})", msg, archive_path_for_log.display());
                return Err(ToolchainError::Extraction(msg));
            }
        };

        if let Some(parent) = on_disk.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        if file.is_dir() {
            fs::create_dir_all(&on_disk)?;
            continue;
        }

        if file.is_symlink() {
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)?;
            let link_target = PathBuf::from(String::from_utf8_lossy(&buf).to_string());
            #[cfg(unix)]
            {
                if on_disk.symlink_metadata().is_ok() {
                    fs::remove_file(&on_disk)?;
                }
                unix_fs::symlink(&link_target, &on_disk)?;
            }
            #[cfg(not(unix))]
            {
                warn!(
                    "Cannot create symlink on non-unix system: {} -> {}",
                    on_disk.display(),
                    link_target.display()
                );
            }
            continue;
        }

        if on_disk.symlink_metadata().is_ok() {
            fs::remove_file(&on_disk)?;
        }
        let mut out_file = File::create(&on_disk).map_err(|e| {
            ToolchainError::Io(Arc::new(io::Error::new(
                e.kind(),
                format!("Failed create file {}: {}", on_disk.display(), e),
            )))
        })?;
        io::copy(&mut file, &mut out_file)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = file.unix_mode() {
                fs::set_permissions(&on_disk, fs::Permissions::from_mode(mode))?;
            }
        }
    }
    debug!(
        "Finished ZIP extraction for {}",
        archive_path_for_log.display()
    );
    Ok(())
}
