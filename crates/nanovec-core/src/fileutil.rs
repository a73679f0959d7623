//! Small filesystem helpers shared by the engine and its host bindings.

use crate::error::{Error, Result};
use std::path::Path;

/// Ensures `path`'s parent directory exists, creating it (and ancestors) if
/// needed. A no-op if `path` has no parent component.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// True if `path` names an existing file.
#[must_use]
pub fn exists(path: &Path) -> bool {
    path.exists()
}

/// Size in bytes of the file at `path`.
pub fn size_of(path: &Path) -> Result<u64> {
    Ok(std::fs::metadata(path)?.len())
}

/// Copies the file at `source` to `destination` for backup purposes.
/// Refuses to overwrite an existing destination rather than silently
/// clobbering a prior backup.
pub fn copy_for_backup(source: &Path, destination: &Path) -> Result<u64> {
    if destination.exists() {
        return Err(Error::InvalidArgs(format!(
            "backup destination already exists: {}",
            destination.display()
        )));
    }
    ensure_parent_dir(destination)?;
    Ok(std::fs::copy(source, destination)?)
}

/// Removes the file at `path` if present. A missing file is not an error.
pub fn remove_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn ensure_parent_dir_creates_ancestors() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("a/b/c.nvdb");
        ensure_parent_dir(&target).unwrap();
        assert!(target.parent().unwrap().is_dir());
    }

    #[test]
    fn copy_for_backup_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.nvdb");
        let dst = dir.path().join("a.bak");
        std::fs::write(&src, b"data").unwrap();
        copy_for_backup(&src, &dst).unwrap();
        let err = copy_for_backup(&src, &dst).unwrap_err();
        assert_eq!(err.code(), -1);
    }

    #[test]
    fn remove_if_exists_tolerates_missing() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("missing.nvdb");
        assert!(remove_if_exists(&target).is_ok());
    }
}
