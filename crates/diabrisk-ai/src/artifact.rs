//! Content digests for model artifacts.

use std::path::Path;

use tracing::debug;

use crate::ModelError;

/// Lowercase hex MD5 of a file's bytes.
pub fn file_md5(path: &Path) -> Result<String, ModelError> {
    let bytes = read_artifact(path)?;
    let digest = format!("{:x}", md5::compute(&bytes));
    debug!(path = %path.display(), bytes = bytes.len(), %digest, "hashed artifact");
    Ok(digest)
}

/// Check a file against an expected hex MD5 (case-insensitive).
pub fn verify_md5(path: &Path, expected: &str) -> Result<(), ModelError> {
    let actual = file_md5(path)?;
    if actual.eq_ignore_ascii_case(expected.trim()) {
        Ok(())
    } else {
        Err(ModelError::DigestMismatch {
            path: path.to_path_buf(),
            expected: expected.trim().to_ascii_lowercase(),
            actual,
        })
    }
}

/// Read an artifact, mapping a missing file to [`ModelError::ArtifactNotFound`].
pub(crate) fn read_artifact(path: &Path) -> Result<Vec<u8>, ModelError> {
    std::fs::read(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => ModelError::ArtifactNotFound(path.to_path_buf()),
        _ => ModelError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}
