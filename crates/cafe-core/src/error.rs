//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
///
/// Every failure the kernel can produce is one of these variants; callers
/// never see panics or stringly-typed control flow. `ConcurrencyConflict`
/// is deliberately distinct from `Conflict`: the former means another
/// writer committed first, the latter means the command itself breaks a
/// business rule against the current state.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A malformed or semantically invalid command given current state.
    #[error("validation error: {0}")]
    Validation(String),

    /// A business-rule conflict independent of concurrency, such as
    /// closing a tab that still has unserved items.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Optimistic concurrency conflict: another writer appended to the
    /// stream between replay and commit.
    #[error("concurrency conflict on stream {stream_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The stream that had the conflict.
        stream_id: Uuid,
        /// The version the writer observed during replay.
        expected: i64,
        /// The actual version found at commit time.
        actual: i64,
    },

    /// A query against an unknown id.
    #[error("not found: {0}")]
    NotFound(Uuid),

    /// A storage failure or a schema-evolution mismatch during replay.
    /// Never recovered silently; the failed command aborts.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
