//! Test repositories — mock `EventRepository` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use cafe_core::error::DomainError;
use cafe_core::repository::{EventRepository, StoredEvent};
use uuid::Uuid;

/// An event repository that records all `append_events` calls. Returns the
/// configured events from `load_events` on every call and always succeeds
/// on `append_events`.
#[derive(Debug)]
pub struct RecordingEventRepository {
    loaded: Mutex<Vec<StoredEvent>>,
    appended: Mutex<Vec<(Uuid, i64, Vec<StoredEvent>)>>,
}

impl RecordingEventRepository {
    /// Create a repository that returns `loaded` from every `load_events`
    /// call.
    #[must_use]
    pub fn new(loaded: Vec<StoredEvent>) -> Self {
        Self {
            loaded: Mutex::new(loaded),
            appended: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of all batches that were appended.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn appended_events(&self) -> Vec<(Uuid, i64, Vec<StoredEvent>)> {
        self.appended.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventRepository for RecordingEventRepository {
    async fn load_events(&self, _stream_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(self.loaded.lock().unwrap().clone())
    }

    async fn append_events(
        &self,
        stream_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        self.appended
            .lock()
            .unwrap()
            .push((stream_id, expected_version, events.to_vec()));
        Ok(())
    }
}

/// An event repository that always returns an empty event list and silently
/// accepts appends. Useful for testing "new aggregate" scenarios and
/// creation commands.
#[derive(Debug)]
pub struct EmptyEventRepository;

#[async_trait]
impl EventRepository for EmptyEventRepository {
    async fn load_events(&self, _stream_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(vec![])
    }

    async fn append_events(
        &self,
        _stream_id: Uuid,
        _expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Ok(())
    }
}

/// An event repository that always returns an infrastructure error. Useful
/// for testing error-handling paths.
#[derive(Debug)]
pub struct FailingEventRepository;

#[async_trait]
impl EventRepository for FailingEventRepository {
    async fn load_events(&self, _stream_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn append_events(
        &self,
        _stream_id: Uuid,
        _expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}

/// An event repository whose `load_events` succeeds but whose
/// `append_events` always reports a concurrency conflict, as if another
/// writer committed between replay and append.
#[derive(Debug)]
pub struct ConflictingEventRepository {
    loaded: Mutex<Vec<StoredEvent>>,
}

impl ConflictingEventRepository {
    /// Create a repository that returns `loaded` from every `load_events`
    /// call and conflicts on every append.
    #[must_use]
    pub fn new(loaded: Vec<StoredEvent>) -> Self {
        Self {
            loaded: Mutex::new(loaded),
        }
    }
}

#[async_trait]
impl EventRepository for ConflictingEventRepository {
    async fn load_events(&self, _stream_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        Ok(self.loaded.lock().unwrap().clone())
    }

    async fn append_events(
        &self,
        stream_id: Uuid,
        expected_version: i64,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Err(DomainError::ConcurrencyConflict {
            stream_id,
            expected: expected_version,
            actual: expected_version + 1,
        })
    }
}
