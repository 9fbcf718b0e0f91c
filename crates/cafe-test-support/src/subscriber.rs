//! Test subscribers — mock `EventSubscriber` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use cafe_core::error::DomainError;
use cafe_core::repository::StoredEvent;
use cafe_core::subscriber::EventSubscriber;
use uuid::Uuid;

/// A subscriber that records every committed batch it is handed.
#[derive(Debug, Default)]
pub struct RecordingSubscriber {
    notified: Mutex<Vec<(Uuid, Vec<StoredEvent>)>>,
}

impl RecordingSubscriber {
    /// Create an empty recording subscriber.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all batches received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn notifications(&self) -> Vec<(Uuid, Vec<StoredEvent>)> {
        self.notified.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSubscriber for RecordingSubscriber {
    async fn on_events_committed(
        &self,
        stream_id: Uuid,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        self.notified
            .lock()
            .unwrap()
            .push((stream_id, events.to_vec()));
        Ok(())
    }
}

/// A subscriber that always fails. Commands must still be acknowledged
/// when notification delivery fails.
#[derive(Debug)]
pub struct FailingSubscriber;

#[async_trait]
impl EventSubscriber for FailingSubscriber {
    async fn on_events_committed(
        &self,
        _stream_id: Uuid,
        _events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("broadcast channel down".into()))
    }
}
