//! Cached video catalog.
//!
//! # Design
//! - The cache mirrors the last successful listing verbatim (order kept, no dedup).
//! - A failed refresh keeps the previous snapshot and reports the failure.
//! - Only [`CatalogClient::refresh`] writes the cache, and each write bumps
//!   its revision.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use vidshelf_api_models::VideoId;

use crate::backend::LibraryBackend;
use crate::error::{ControllerError, ControllerResult};
use crate::notify::{Notifier, OUTCOME_NOTICE};

/// Shown when the catalog cannot be fetched.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load videos";
/// Shown when the refresh following a mutation fails.
pub const REFRESH_FAILED_MESSAGE: &str = "Failed to refresh video list";

/// Ordered list of video ids as last fetched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<VideoId>,
}

impl Catalog {
    /// Entries in server order.
    #[must_use]
    pub fn entries(&self) -> &[VideoId] {
        &self.entries
    }

    /// Number of entries, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `video` is listed.
    #[must_use]
    pub fn contains(&self, video: &VideoId) -> bool {
        self.entries.contains(video)
    }

    /// Iterate entries in server order.
    pub fn iter(&self) -> impl Iterator<Item = &VideoId> {
        self.entries.iter()
    }
}

impl From<Vec<VideoId>> for Catalog {
    fn from(entries: Vec<VideoId>) -> Self {
        Self { entries }
    }
}

impl FromIterator<VideoId> for Catalog {
    fn from_iter<I: IntoIterator<Item = VideoId>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Owner of the cached catalog.
#[derive(Debug)]
pub(crate) struct CatalogClient<B> {
    backend: Rc<B>,
    current: RefCell<Catalog>,
    revision: Cell<u64>,
}

impl<B: LibraryBackend> CatalogClient<B> {
    pub(crate) fn new(backend: Rc<B>) -> Self {
        Self {
            backend,
            current: RefCell::new(Catalog::default()),
            revision: Cell::new(0),
        }
    }

    /// Fetch a listing without touching the cache.
    pub(crate) async fn fetch(&self) -> ControllerResult<Catalog> {
        self.backend
            .list_videos()
            .await
            .map(Catalog::from)
            .map_err(|source| ControllerError::CatalogUnavailable { source })
    }

    /// Fetch a listing and replace the cache with it.
    pub(crate) async fn refresh(&self) -> ControllerResult<Catalog> {
        match self.fetch().await {
            Ok(catalog) => {
                tracing::debug!(count = catalog.len(), "catalog refreshed");
                *self.current.borrow_mut() = catalog.clone();
                self.revision.set(self.revision.get() + 1);
                Ok(catalog)
            }
            Err(err) => {
                tracing::warn!(error = %err, "catalog refresh failed; keeping previous snapshot");
                Err(err)
            }
        }
    }

    /// Refresh after a mutation, notifying on failure. Returns whether it succeeded.
    pub(crate) async fn refresh_after_mutation(&self, notifier: &Notifier) -> bool {
        if self.refresh().await.is_ok() {
            true
        } else {
            notifier.notify(REFRESH_FAILED_MESSAGE, OUTCOME_NOTICE);
            false
        }
    }

    pub(crate) fn snapshot(&self) -> Catalog {
        self.current.borrow().clone()
    }

    /// Number of successful refreshes so far.
    pub(crate) fn revision(&self) -> u64 {
        self.revision.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use crate::testing::{Call, FakeBackend, ids};

    #[tokio::test]
    async fn refresh_keeps_server_order_and_duplicates() -> anyhow::Result<()> {
        let backend = Rc::new(FakeBackend::with_catalog(&["b.mkv", "a.mkv", "b.mkv"]));
        let client = CatalogClient::new(backend.clone());

        let catalog = client.refresh().await?;
        assert_eq!(catalog.entries(), ids(&["b.mkv", "a.mkv", "b.mkv"]).as_slice());
        assert_eq!(client.snapshot(), catalog);
        assert_eq!(backend.calls(), vec![Call::List]);
        Ok(())
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() -> anyhow::Result<()> {
        let backend = Rc::new(FakeBackend::with_catalog(&["a.mkv"]));
        let client = CatalogClient::new(backend.clone());
        client.refresh().await?;

        backend.fail_listing(BackendError::transport("/api/videos", "connection refused"));
        let result = client.refresh().await;
        assert!(matches!(
            result,
            Err(ControllerError::CatalogUnavailable { .. })
        ));
        assert_eq!(client.snapshot().entries(), ids(&["a.mkv"]).as_slice());
        assert_eq!(client.revision(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn fetch_does_not_write_cache() -> anyhow::Result<()> {
        let backend = Rc::new(FakeBackend::with_catalog(&["a.mkv"]));
        let client = CatalogClient::new(backend);
        let fetched = client.fetch().await?;
        assert_eq!(fetched.len(), 1);
        assert!(client.snapshot().is_empty());
        Ok(())
    }
}
