//! In-memory implementation of the `EventRepository` trait.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use cafe_core::error::DomainError;
use cafe_core::repository::{EventRepository, StoredEvent};

/// In-memory, append-only event store.
///
/// Streams live in a `HashMap` keyed by stream id, guarded by a single
/// `RwLock`. The write lock is held only for the version check and the
/// push, making the append the sole serialization point; reads clone the
/// stream under the read lock and never block each other.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    streams: RwLock<HashMap<Uuid, Vec<StoredEvent>>>,
}

impl InMemoryEventStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventStore {
    async fn load_events(&self, stream_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        let streams = self
            .streams
            .read()
            .map_err(|_| DomainError::Infrastructure("event store lock poisoned".into()))?;
        Ok(streams.get(&stream_id).cloned().unwrap_or_default())
    }

    async fn append_events(
        &self,
        stream_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        if events.is_empty() {
            return Ok(());
        }

        let mut streams = self
            .streams
            .write()
            .map_err(|_| DomainError::Infrastructure("event store lock poisoned".into()))?;
        let stream = streams.entry(stream_id).or_default();

        // Sequence numbers are contiguous from 1, so the stream's version
        // is simply its length.
        #[allow(clippy::cast_possible_wrap)]
        let actual = stream.len() as i64;
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                stream_id,
                expected: expected_version,
                actual,
            });
        }

        for (offset, event) in events.iter().enumerate() {
            #[allow(clippy::cast_possible_wrap)]
            let expected_sequence = expected_version + offset as i64 + 1;
            if event.sequence_number != expected_sequence {
                return Err(DomainError::Infrastructure(format!(
                    "non-contiguous append to stream {stream_id}: \
                     event carries sequence {} where {expected_sequence} was required",
                    event.sequence_number
                )));
            }
        }

        stream.extend_from_slice(events);
        Ok(())
    }
}
