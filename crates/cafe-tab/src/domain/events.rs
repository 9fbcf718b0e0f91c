//! Domain events for the Tab bounded context.

use cafe_core::error::DomainError;
use cafe_core::event::{DomainEvent, EventMetadata};
use cafe_core::repository::StoredEvent;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event type name for `TabOpened`.
pub const TAB_OPENED_EVENT_TYPE: &str = "tab.opened";
/// Event type name for `ItemsOrdered`.
pub const ITEMS_ORDERED_EVENT_TYPE: &str = "tab.items_ordered";
/// Event type name for `ItemsServed`.
pub const ITEMS_SERVED_EVENT_TYPE: &str = "tab.items_served";
/// Event type name for `ItemsRejected`.
pub const ITEMS_REJECTED_EVENT_TYPE: &str = "tab.items_rejected";
/// Event type name for `TabClosed`.
pub const TAB_CLOSED_EVENT_TYPE: &str = "tab.closed";

/// One ordered unit of a menu item, captured with the description and
/// price that were current at ordering time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedItem {
    /// The menu item identifier.
    pub menu_item_id: Uuid,
    /// The menu item description at ordering time.
    pub description: String,
    /// The menu item price at ordering time.
    pub price: Decimal,
}

/// Emitted when a tab is opened on a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabOpened {
    /// The tab identifier.
    pub tab_id: Uuid,
    /// The table the tab is open on.
    pub table_number: i32,
    /// The waiter serving the table.
    pub waiter_name: String,
}

/// Emitted when menu items are ordered. Ordering a count of N produces N
/// entries for that menu item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsOrdered {
    /// The tab identifier.
    pub tab_id: Uuid,
    /// The ordered units.
    pub items: Vec<OrderedItem>,
}

/// Emitted when ordered items are served to the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsServed {
    /// The tab identifier.
    pub tab_id: Uuid,
    /// The menu items served.
    pub menu_item_ids: Vec<Uuid>,
}

/// Emitted when ordered items are rejected by the kitchen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsRejected {
    /// The tab identifier.
    pub tab_id: Uuid,
    /// The menu items rejected.
    pub menu_item_ids: Vec<Uuid>,
}

/// Emitted when a tab is closed after every item has been served or
/// rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabClosed {
    /// The tab identifier.
    pub tab_id: Uuid,
}

/// Event payload variants for the Tab bounded context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TabEventKind {
    /// A tab has been opened on a table.
    TabOpened(TabOpened),
    /// Menu items have been ordered.
    ItemsOrdered(ItemsOrdered),
    /// Ordered items have been served.
    ItemsServed(ItemsServed),
    /// Ordered items have been rejected.
    ItemsRejected(ItemsRejected),
    /// The tab has been closed.
    TabClosed(TabClosed),
}

impl TabEventKind {
    /// Returns the event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            TabEventKind::TabOpened(_) => TAB_OPENED_EVENT_TYPE,
            TabEventKind::ItemsOrdered(_) => ITEMS_ORDERED_EVENT_TYPE,
            TabEventKind::ItemsServed(_) => ITEMS_SERVED_EVENT_TYPE,
            TabEventKind::ItemsRejected(_) => ITEMS_REJECTED_EVENT_TYPE,
            TabEventKind::TabClosed(_) => TAB_CLOSED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the Tab bounded context.
#[derive(Debug, Clone)]
pub struct TabEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: TabEventKind,
}

impl TabEvent {
    /// Maps this event to its persisted envelope.
    #[must_use]
    pub fn to_stored(&self) -> StoredEvent {
        StoredEvent {
            event_id: self.metadata.event_id,
            stream_id: self.metadata.stream_id,
            event_type: self.event_type().to_owned(),
            payload: self.to_payload(),
            sequence_number: self.metadata.sequence_number,
            correlation_id: self.metadata.correlation_id,
            causation_id: self.metadata.causation_id,
            occurred_at: self.metadata.occurred_at,
        }
    }

    /// Reconstructs a typed event from its persisted envelope.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` when the payload cannot be
    /// decoded — an unknown event type means the stream was written by a
    /// newer schema, and replaying past it would corrupt state.
    pub fn from_stored(stored: &StoredEvent) -> Result<Self, DomainError> {
        let kind: TabEventKind = serde_json::from_value(stored.payload.clone()).map_err(|err| {
            DomainError::Infrastructure(format!(
                "cannot replay event '{}' at sequence {} of stream {}: {err}",
                stored.event_type, stored.sequence_number, stored.stream_id
            ))
        })?;
        Ok(Self {
            metadata: EventMetadata {
                event_id: stored.event_id,
                event_type: stored.event_type.clone(),
                stream_id: stored.stream_id,
                sequence_number: stored.sequence_number,
                correlation_id: stored.correlation_id,
                causation_id: stored.causation_id,
                occurred_at: stored.occurred_at,
            },
            kind,
        })
    }
}

impl DomainEvent for TabEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("TabEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
