// Legacy result file layout
//
// Older releases wrote one file per run, named
// `<timestamp>-update-result.json`. The timestamp prefix sorts
// lexicographically in chronological order, so the greatest filename is
// the most recent run.
use std::path::{Path, PathBuf};

use kvmd_core::error::{AppError, Result};

/// Filename suffix shared by every legacy result file
pub const LEGACY_SUFFIX: &str = "-update-result.json";

/// true for `<something>-update-result.json`
pub fn is_legacy_name(name: &str) -> bool {
    name.len() > LEGACY_SUFFIX.len() && name.ends_with(LEGACY_SUFFIX)
}

/// All legacy result files in `dir`, sorted by filename ascending
///
/// A missing directory holds no files.
pub async fn list_legacy_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(AppError::fs(dir, e)),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| AppError::fs(dir, e))? {
        let is_match = entry.file_name().to_str().is_some_and(is_legacy_name);
        if is_match {
            files.push(entry.path());
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Most recent legacy result file, if any
pub async fn latest_legacy_file(dir: &Path) -> Result<Option<PathBuf>> {
    Ok(list_legacy_files(dir).await?.pop())
}
