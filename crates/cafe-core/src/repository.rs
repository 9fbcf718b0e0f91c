//! Event store abstraction.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;

/// Stored representation of a domain event.
///
/// The event store deals only in this envelope; bounded contexts map their
/// typed events to and from it. Once appended, a stored event is immutable.
#[derive(Debug, Clone)]
pub struct StoredEvent {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Stream this event belongs to (the aggregate id).
    pub stream_id: Uuid,
    /// Event type name for deserialization routing.
    pub event_type: String,
    /// Serialized event payload.
    pub payload: serde_json::Value,
    /// Sequence number within the stream, contiguous from 1.
    pub sequence_number: i64,
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Causation ID linking to the causing command.
    pub causation_id: Uuid,
    /// Timestamp of event creation.
    pub occurred_at: chrono::DateTime<chrono::Utc>,
}

/// Append-only, per-stream event log with optimistic concurrency.
///
/// The version of a stream is the sequence number of its last event; a
/// stream that does not exist yet has version 0. There is no lock held
/// between read and write: any number of writers may load the same stream
/// concurrently, and the expected-version check at append time is the only
/// serialization point.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Load all events for a stream, ordered by sequence number.
    ///
    /// Returns an empty vec, not an error, if the stream does not exist —
    /// callers distinguish "new aggregate" from "corrupt data" themselves.
    async fn load_events(&self, stream_id: Uuid) -> Result<Vec<StoredEvent>, DomainError>;

    /// Append new events to a stream.
    ///
    /// The append is atomic: either every event in the batch commits
    /// contiguously or none do. Fails with
    /// [`DomainError::ConcurrencyConflict`] when the stream's current
    /// version differs from `expected_version` at commit time — including
    /// `expected_version = 0` against a stream that already exists
    /// (duplicate aggregate creation). The kernel never retries a conflict
    /// on the caller's behalf; re-deciding against fresh state may yield a
    /// different outcome.
    async fn append_events(
        &self,
        stream_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError>;
}
