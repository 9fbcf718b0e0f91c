//! Command abstractions.

use uuid::Uuid;

/// Trait that all commands implement.
///
/// A command is a request to change state. It is validated against the
/// aggregate's replayed history and either accepted, producing events, or
/// rejected with a typed failure.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> Uuid;
}
