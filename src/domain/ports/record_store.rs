//! Record store port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;

/// Durable whole-snapshot storage.
///
/// There is no partial or delta persistence: callers save the full state
/// after every mutation and load it once at startup.
#[async_trait]
pub trait RecordStore<T>: Send + Sync
where
    T: Send + Sync,
{
    /// Load the stored snapshot, or the default snapshot when nothing is stored.
    async fn load(&self) -> DomainResult<T>;

    /// Replace the stored snapshot.
    async fn save(&self, snapshot: &T) -> DomainResult<()>;

    /// Keep a copy of the current snapshot aside. Returns `None` when there
    /// was nothing to copy.
    async fn backup(&self) -> DomainResult<Option<String>> {
        Ok(None)
    }
}
