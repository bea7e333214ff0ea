// armtc-io/src/checksum.rs
use std::fs::File;
use std::io;
use std::path::Path;

use armtc_common::error::{Result, ToolchainError};
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of a file's contents.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let bytes_copied = io::copy(&mut file, &mut hasher)?;
    let actual = hex::encode(hasher.finalize());
    tracing::debug!(
        "Calculated SHA256 of {}: {} ({} bytes read)",
        path.display(),
        actual,
        bytes_copied
    );
    Ok(actual)
}

pub fn verify_checksum(path: &Path, expected: &str) -> Result<()> {
    tracing::debug!("Verifying checksum for: {}", path.display());
    let actual = sha256_file(path)?;
    tracing::debug!("Expected SHA256:   {}", expected);
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(ToolchainError::ChecksumMismatch(format!(
            "Checksum mismatch for {}: expected {}, got {}",
            path.display(),
            expected,
            actual
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // sha256("abc")
    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn accepts_matching_digest_in_any_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.txt");
        std::fs::write(&path, b"abc").unwrap();
        verify_checksum(&path, ABC_SHA256).unwrap();
        verify_checksum(&path, &ABC_SHA256.to_uppercase()).unwrap();
    }

    #[test]
    fn rejects_truncated_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.txt");
        std::fs::write(&path, b"ab").unwrap();
        let err = verify_checksum(&path, ABC_SHA256).unwrap_err();
        assert!(matches!(err, ToolchainError::ChecksumMismatch(_)));
    }
}
