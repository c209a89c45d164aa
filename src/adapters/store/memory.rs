//! In-memory record store for tests and dry runs.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::RecordStore;

#[derive(Default)]
pub struct MemoryStore<T> {
    snapshot: RwLock<Option<T>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl<T: Clone> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(None),
            saves: AtomicUsize::new(0),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Start with `snapshot` already stored.
    pub fn with_snapshot(snapshot: T) -> Self {
        Self {
            snapshot: RwLock::new(Some(snapshot)),
            ..Self::new()
        }
    }

    /// Make every following save fail.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub async fn stored(&self) -> Option<T> {
        self.snapshot.read().await.clone()
    }
}

#[async_trait]
impl<T> RecordStore<T> for MemoryStore<T>
where
    T: Clone + Default + Send + Sync,
{
    async fn load(&self) -> DomainResult<T> {
        Ok(self.snapshot.read().await.clone().unwrap_or_default())
    }

    async fn save(&self, snapshot: &T) -> DomainResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(DomainError::StoreFailed("memory store set to fail".to_string()));
        }
        *self.snapshot.write().await = Some(snapshot.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
