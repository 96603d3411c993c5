// Result Store Port
// Persistent home of the latest update outcome
use async_trait::async_trait;

use crate::domain::UpdateResult;
use crate::error::Result;

/// Storage for the outcome of the last completed update
///
/// Implementations read the current single-file layout and fall back to the
/// legacy per-run layout. Filesystem errors are never masked.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Latest stored result, `None` when no result exists
    ///
    /// # Errors
    /// - AppError::Filesystem if a result file exists but cannot be read
    /// - AppError::Domain if a result file is malformed
    async fn read(&self) -> Result<Option<UpdateResult>>;

    /// Replace the stored result
    async fn write(&self, result: &UpdateResult) -> Result<()>;

    /// Remove every stored result, current and legacy
    ///
    /// Removing nothing is not an error.
    async fn clear(&self) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// In-memory ResultStore that counts mutations
    #[derive(Default)]
    pub struct MockResultStore {
        result: Arc<Mutex<Option<UpdateResult>>>,
        write_count: Arc<Mutex<usize>>,
        clear_count: Arc<Mutex<usize>>,
    }

    impl MockResultStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_result(result: UpdateResult) -> Self {
            let store = Self::new();
            *store.result.lock().unwrap() = Some(result);
            store
        }

        pub fn current(&self) -> Option<UpdateResult> {
            self.result.lock().unwrap().clone()
        }

        pub fn write_count(&self) -> usize {
            *self.write_count.lock().unwrap()
        }

        pub fn clear_count(&self) -> usize {
            *self.clear_count.lock().unwrap()
        }

        pub fn mutation_count(&self) -> usize {
            self.write_count() + self.clear_count()
        }
    }

    #[async_trait]
    impl ResultStore for MockResultStore {
        async fn read(&self) -> Result<Option<UpdateResult>> {
            Ok(self.result.lock().unwrap().clone())
        }

        async fn write(&self, result: &UpdateResult) -> Result<()> {
            *self.write_count.lock().unwrap() += 1;
            *self.result.lock().unwrap() = Some(result.clone());
            Ok(())
        }

        async fn clear(&self) -> Result<()> {
            *self.clear_count.lock().unwrap() += 1;
            *self.result.lock().unwrap() = None;
            Ok(())
        }
    }
}
