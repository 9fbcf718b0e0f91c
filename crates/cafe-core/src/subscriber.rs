//! Post-commit event notification seam.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;
use crate::repository::StoredEvent;

/// Receives newly committed events for real-time fan-out.
///
/// Delivery is best-effort and outside the kernel's durability guarantee:
/// the command pipeline calls this after a successful append, logs any
/// failure, and acknowledges the command regardless. Subscribers that need
/// redelivery after a restart must read the event log themselves.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Called once per committed batch, in commit order.
    async fn on_events_committed(
        &self,
        stream_id: Uuid,
        events: &[StoredEvent],
    ) -> Result<(), DomainError>;
}
