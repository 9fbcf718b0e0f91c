//! Test view stores — `TabViewStore` doubles for projection-failure paths.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use cafe_core::error::DomainError;
use cafe_tab::projection::{InMemoryTabViewStore, TabView, TabViewStore};
use uuid::Uuid;

/// A view store whose first `count` saves fail with an infrastructure
/// error before it starts behaving like the in-memory store. Reads always
/// delegate, so a rebuild that retries the save can be observed through
/// `get`.
#[derive(Debug, Default)]
pub struct FlakyTabViewStore {
    inner: InMemoryTabViewStore,
    save_failures_left: AtomicUsize,
}

impl FlakyTabViewStore {
    /// Create a store that fails the first `count` saves. Pass
    /// `usize::MAX` for a store that never accepts a save.
    #[must_use]
    pub fn failing_saves(count: usize) -> Self {
        Self {
            inner: InMemoryTabViewStore::new(),
            save_failures_left: AtomicUsize::new(count),
        }
    }
}

#[async_trait]
impl TabViewStore for FlakyTabViewStore {
    async fn get(&self, id: Uuid) -> Result<Option<TabView>, DomainError> {
        self.inner.get(id).await
    }

    async fn save(&self, view: TabView) -> Result<(), DomainError> {
        let failures = self.save_failures_left.load(Ordering::SeqCst);
        if failures > 0 {
            self.save_failures_left
                .store(failures - 1, Ordering::SeqCst);
            return Err(DomainError::Infrastructure(
                "view store write failed".into(),
            ));
        }
        self.inner.save(view).await
    }

    async fn list_open(&self) -> Result<Vec<TabView>, DomainError> {
        self.inner.list_open().await
    }

    async fn list_closed(&self) -> Result<Vec<TabView>, DomainError> {
        self.inner.list_closed().await
    }
}
