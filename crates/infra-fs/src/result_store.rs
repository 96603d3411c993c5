// Filesystem result store
// reason: the result must survive the server process disappearing entirely
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use kvmd_core::domain::{codec, UpdateResult};
use kvmd_core::error::{AppError, Result};
use kvmd_core::port::{ResultStore, TimeProvider};

use crate::atomic::write_atomic;
use crate::legacy::latest_legacy_file;

/// Name of the canonical, always-overwritten result file
pub const CANONICAL_FILENAME: &str = "update-result.json";

/// Optional age cutoff applied to legacy results
struct StalenessWindow {
    max_age: Duration,
    time_provider: Arc<dyn TimeProvider>,
}

/// Result store rooted at the user's log directory
///
/// The canonical file is written by the privileged updater at the end of
/// each run. Legacy per-run files are read as a fallback and removed by
/// `clear`, but never written.
pub struct FsResultStore {
    dir: PathBuf,
    legacy_window: Option<StalenessWindow>,
}

impl FsResultStore {
    /// Create a store over `dir`
    ///
    /// # Example
    /// ```ignore
    /// let store = FsResultStore::new("/home/kvmd/logs");
    /// let latest = store.read().await?;
    /// ```
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            legacy_window: None,
        }
    }

    /// Treat legacy results older than `max_age` as absent
    pub fn with_legacy_max_age(
        mut self,
        max_age: Duration,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        self.legacy_window = Some(StalenessWindow {
            max_age,
            time_provider,
        });
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn canonical_path(&self) -> PathBuf {
        self.dir.join(CANONICAL_FILENAME)
    }

    async fn read_file(path: &Path) -> Result<Option<UpdateResult>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(codec::decode(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::fs(path, e)),
        }
    }

    async fn read_legacy(&self) -> Result<Option<UpdateResult>> {
        let Some(path) = latest_legacy_file(&self.dir).await? else {
            return Ok(None);
        };

        debug!(path = %path.display(), "Falling back to legacy result file");
        let Some(result) = Self::read_file(&path).await? else {
            return Ok(None);
        };

        if self.is_stale(&result) {
            debug!(
                path = %path.display(),
                timestamp = %result.timestamp(),
                "Ignoring stale legacy result"
            );
            return Ok(None);
        }
        Ok(Some(result))
    }

    fn is_stale(&self, result: &UpdateResult) -> bool {
        let Some(window) = &self.legacy_window else {
            return false;
        };
        let age_ms = window.time_provider.now_millis() - result.timestamp().timestamp_millis();
        age_ms > window.max_age.as_millis() as i64
    }

    async fn remove_if_present(path: &Path) -> Result<bool> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::fs(path, e)),
        }
    }
}

#[async_trait]
impl ResultStore for FsResultStore {
    async fn read(&self) -> Result<Option<UpdateResult>> {
        if let Some(result) = Self::read_file(&self.canonical_path()).await? {
            return Ok(Some(result));
        }
        self.read_legacy().await
    }

    async fn write(&self, result: &UpdateResult) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::fs(&self.dir, e))?;

        let bytes = codec::encode(result)?;
        let path = self.canonical_path();
        write_atomic(&path, &bytes)?;

        info!(
            path = %path.display(),
            success = %result.is_success(),
            "Update result written"
        );
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut removed = 0usize;

        if Self::remove_if_present(&self.canonical_path()).await? {
            removed += 1;
        }
        for path in crate::legacy::list_legacy_files(&self.dir).await? {
            if Self::remove_if_present(&path).await? {
                removed += 1;
            }
        }

        info!(dir = %self.dir.display(), removed = %removed, "Update results cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use kvmd_core::domain::DomainError;
    use kvmd_core::port::time_provider::mocks::FixedTimeProvider;
    use tempfile::TempDir;

    fn legacy(dir: &Path, stamp: &str, error: &str) {
        let body = format!(r#"{{"error": "{}", "timestamp": "{}"}}"#, error, stamp);
        std::fs::write(dir.join(format!("{}-update-result.json", stamp)), body).unwrap();
    }

    #[tokio::test]
    async fn test_read_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = FsResultStore::new(dir.path());
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_missing_directory() {
        let dir = TempDir::new().unwrap();
        let store = FsResultStore::new(dir.path().join("logs"));
        assert!(store.read().await.unwrap().is_none());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_write_creates_directory_and_reads_back() {
        let dir = TempDir::new().unwrap();
        let store = FsResultStore::new(dir.path().join("logs"));
        let result = UpdateResult::failure("disk full", Utc::now());

        store.write(&result).await.unwrap();

        assert!(store.canonical_path().exists());
        assert_eq!(store.read().await.unwrap(), Some(result));
    }

    #[tokio::test]
    async fn test_canonical_file_wins_over_legacy() {
        let dir = TempDir::new().unwrap();
        legacy(dir.path(), "20990101T000000Z", "legacy");
        let store = FsResultStore::new(dir.path());
        store.write(&UpdateResult::success(Utc::now())).await.unwrap();

        let result = store.read().await.unwrap().unwrap();
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_legacy_fallback_picks_latest() {
        let dir = TempDir::new().unwrap();
        legacy(dir.path(), "20210101T000000Z", "first");
        legacy(dir.path(), "20210201T000000Z", "second");
        legacy(dir.path(), "20210301T000000Z", "third");
        let store = FsResultStore::new(dir.path());

        let result = store.read().await.unwrap().unwrap();
        assert_eq!(result.error(), Some("third"));
        assert_eq!(
            result.timestamp(),
            Utc.with_ymd_and_hms(2021, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_corrupt_canonical_file_propagates() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CANONICAL_FILENAME), b"{not json").unwrap();
        let store = FsResultStore::new(dir.path());

        let result = store.read().await;
        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::MalformedResult(_)))
        ));
    }

    #[tokio::test]
    async fn test_corrupt_latest_legacy_file_propagates() {
        let dir = TempDir::new().unwrap();
        legacy(dir.path(), "20210101T000000Z", "fine");
        std::fs::write(dir.path().join("20210301T000000Z-update-result.json"), b"[").unwrap();
        let store = FsResultStore::new(dir.path());

        assert!(store.read().await.is_err());
    }

    #[tokio::test]
    async fn test_clear_removes_all_generations() {
        let dir = TempDir::new().unwrap();
        legacy(dir.path(), "20210101T000000Z", "a");
        legacy(dir.path(), "20210201T000000Z", "b");
        std::fs::write(dir.path().join("keep.log"), b"log").unwrap();
        let store = FsResultStore::new(dir.path());
        store.write(&UpdateResult::success(Utc::now())).await.unwrap();

        store.clear().await.unwrap();

        assert!(store.read().await.unwrap().is_none());
        assert!(dir.path().join("keep.log").exists());
        // Idempotent
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_legacy_staleness_window() {
        let dir = TempDir::new().unwrap();
        legacy(dir.path(), "20210210T085735Z", "old failure");
        let written_at = Utc.with_ymd_and_hms(2021, 2, 10, 8, 57, 35).unwrap();
        let clock = Arc::new(FixedTimeProvider::new(written_at.timestamp_millis()));
        let store = FsResultStore::new(dir.path())
            .with_legacy_max_age(Duration::from_secs(8 * 60), clock.clone());

        clock.set(written_at.timestamp_millis() + 60_000);
        assert!(store.read().await.unwrap().is_some());

        clock.set(written_at.timestamp_millis() + 9 * 60_000);
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_staleness_window_ignores_canonical_file() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(FixedTimeProvider::new(i64::MAX / 2));
        let store = FsResultStore::new(dir.path())
            .with_legacy_max_age(Duration::from_secs(1), clock);
        let old = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();

        store.write(&UpdateResult::success(old)).await.unwrap();

        assert!(store.read().await.unwrap().is_some());
    }
}
