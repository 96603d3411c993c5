// Crash-safe file replacement
// reason: tempfile for same-directory temp files + atomic rename
use std::fs::File;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use kvmd_core::error::{AppError, Result};

/// Replace `path` with `contents` so that readers see either the old file or
/// the complete new one, never a partial write.
///
/// The temp file lives in the target's directory so the final rename never
/// crosses a filesystem. Both the file and the directory entry are synced.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path.parent().ok_or_else(|| {
        AppError::Config(format!("{} has no parent directory", path.display()))
    })?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| AppError::fs(dir, e))?;
    tmp.write_all(contents)
        .map_err(|e| AppError::fs(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| AppError::fs(tmp.path(), e))?;

    tmp.persist(path).map_err(|e| AppError::fs(path, e.error))?;

    File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(|e| AppError::fs(dir, e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.json");

        write_atomic(&target, b"{}").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"{}");
    }

    #[test]
    fn test_write_replaces_and_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.json");

        write_atomic(&target, b"first").unwrap();
        write_atomic(&target, b"second").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"second");
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("missing").join("out.json");

        let result = write_atomic(&target, b"{}");
        assert!(matches!(result, Err(AppError::Filesystem { .. })));
    }
}
