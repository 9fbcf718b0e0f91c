//! The Tab aggregate root.

use cafe_core::aggregate::AggregateRoot;
use cafe_core::clock::Clock;
use cafe_core::error::DomainError;
use cafe_core::event::EventMetadata;
use cafe_core::repository::StoredEvent;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::events::{
    ItemsOrdered, ItemsRejected, ItemsServed, OrderedItem, TabClosed, TabEvent, TabEventKind,
    TabOpened,
};

/// Lifecycle status of one ordered unit.
///
/// A unit moves from `Ordered` to `Served` or `Rejected` and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
    /// Ordered but not yet served or rejected.
    Ordered,
    /// Served to the table.
    Served,
    /// Rejected by the kitchen.
    Rejected,
}

/// One ordered unit as tracked by the aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct TabItem {
    /// The menu item identifier.
    pub menu_item_id: Uuid,
    /// The menu item description at ordering time.
    pub description: String,
    /// The menu item price at ordering time.
    pub price: Decimal,
    /// Current lifecycle status.
    pub status: ItemStatus,
}

/// The aggregate root for one table-service tab.
///
/// Never persisted directly: the struct is rebuilt from its event stream
/// on every command and discarded afterwards. The item list is append-only
/// in entry count; existing entries change only their status.
#[derive(Debug)]
pub struct Tab {
    /// Aggregate identifier.
    pub id: Uuid,
    /// The table the tab is open on.
    pub table_number: i32,
    /// The waiter serving the table.
    pub waiter_name: String,
    /// Whether the tab currently accepts commands.
    pub is_open: bool,
    /// Ordered units, one entry per unit.
    pub items: Vec<TabItem>,
    /// Sequence number of the last event folded.
    version: i64,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<TabEvent>,
}

impl Tab {
    /// Creates the empty pre-history state for a tab.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            table_number: 0,
            waiter_name: String::new(),
            is_open: false,
            items: Vec::new(),
            version: 0,
            uncommitted_events: Vec::new(),
        }
    }

    /// Reconstitutes a tab by folding its stream in sequence order.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if any stored event fails to
    /// decode; replay never skips an event it does not understand.
    pub fn from_events(id: Uuid, events: &[StoredEvent]) -> Result<Self, DomainError> {
        let mut tab = Self::new(id);
        for stored in events {
            let event = TabEvent::from_stored(stored)?;
            tab.apply(&event);
        }
        Ok(tab)
    }

    /// Returns the next sequence number for a new event.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    fn raise(&mut self, kind: TabEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = TabEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                stream_id: self.id,
                sequence_number: self.next_sequence_number(),
                correlation_id,
                causation_id: correlation_id,
                occurred_at: clock.now(),
            },
            kind,
        };

        self.uncommitted_events.push(event);
    }

    /// Counts entries for `menu_item_id` currently in `Ordered` status.
    fn ordered_units(&self, menu_item_id: Uuid) -> usize {
        self.items
            .iter()
            .filter(|item| item.menu_item_id == menu_item_id && item.status == ItemStatus::Ordered)
            .count()
    }

    /// Shared guard for the serve/reject pair: the tab must be open, the
    /// id list non-empty, and every id must have at least one `Ordered`
    /// entry. A mix of valid and invalid ids fails the whole command.
    fn check_items_pending(&self, menu_item_ids: &[Uuid]) -> Result<(), DomainError> {
        if !self.is_open {
            return Err(DomainError::Validation(format!(
                "tab {} is not open",
                self.id
            )));
        }
        if menu_item_ids.is_empty() {
            return Err(DomainError::Validation(
                "at least one menu item id is required".into(),
            ));
        }
        for menu_item_id in menu_item_ids {
            if self.ordered_units(*menu_item_id) == 0 {
                return Err(DomainError::Validation(format!(
                    "menu item {menu_item_id} has no ordered units on tab {}",
                    self.id
                )));
            }
        }
        Ok(())
    }

    /// Opens the tab on a table, producing a `TabOpened` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Conflict` if the tab has any history — a tab
    /// id can be opened exactly once, and a closed tab is never reopened.
    pub fn open(
        &mut self,
        table_number: i32,
        waiter_name: String,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if self.version > 0 || !self.uncommitted_events.is_empty() {
            return Err(DomainError::Conflict(format!(
                "tab {} already exists",
                self.id
            )));
        }

        self.raise(
            TabEventKind::TabOpened(TabOpened {
                tab_id: self.id,
                table_number,
                waiter_name,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Orders menu items, producing an `ItemsOrdered` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the tab is not open or the
    /// item list is empty.
    pub fn order_items(
        &mut self,
        items: Vec<OrderedItem>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        if !self.is_open {
            return Err(DomainError::Validation(format!(
                "tab {} is not open",
                self.id
            )));
        }
        if items.is_empty() {
            return Err(DomainError::Validation(
                "an order must contain at least one item".into(),
            ));
        }

        self.raise(
            TabEventKind::ItemsOrdered(ItemsOrdered {
                tab_id: self.id,
                items,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Serves ordered items, producing an `ItemsServed` event. Serving a
    /// menu item id serves every ordered unit of that item.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the tab is not open or any id
    /// has no unit currently in `Ordered` status; no event is raised in
    /// that case.
    pub fn serve_items(
        &mut self,
        menu_item_ids: Vec<Uuid>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.check_items_pending(&menu_item_ids)?;

        self.raise(
            TabEventKind::ItemsServed(ItemsServed {
                tab_id: self.id,
                menu_item_ids,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Rejects ordered items, producing an `ItemsRejected` event. Same
    /// guard as [`Tab::serve_items`], different target status.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the tab is not open or any id
    /// has no unit currently in `Ordered` status.
    pub fn reject_items(
        &mut self,
        menu_item_ids: Vec<Uuid>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.check_items_pending(&menu_item_ids)?;

        self.raise(
            TabEventKind::ItemsRejected(ItemsRejected {
                tab_id: self.id,
                menu_item_ids,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Closes the tab, producing a `TabClosed` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the tab is not open, and
    /// `DomainError::Conflict` if any unit is still `Ordered` — everything
    /// must be served or rejected before the tab settles.
    pub fn close(&mut self, correlation_id: Uuid, clock: &dyn Clock) -> Result<(), DomainError> {
        if !self.is_open {
            return Err(DomainError::Validation(format!(
                "tab {} is not open",
                self.id
            )));
        }
        let pending = self
            .items
            .iter()
            .filter(|item| item.status == ItemStatus::Ordered)
            .count();
        if pending > 0 {
            return Err(DomainError::Conflict(format!(
                "tab {} has {pending} ordered units awaiting serve or reject",
                self.id
            )));
        }

        self.raise(
            TabEventKind::TabClosed(TabClosed { tab_id: self.id }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    fn flip_ordered(&mut self, menu_item_ids: &[Uuid], to: ItemStatus) {
        for menu_item_id in menu_item_ids {
            for item in &mut self.items {
                if item.menu_item_id == *menu_item_id && item.status == ItemStatus::Ordered {
                    item.status = to;
                }
            }
        }
    }
}

impl AggregateRoot for Tab {
    type Event = TabEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            TabEventKind::TabOpened(payload) => {
                self.table_number = payload.table_number;
                self.waiter_name = payload.waiter_name.clone();
                self.is_open = true;
            }
            TabEventKind::ItemsOrdered(payload) => {
                self.items.extend(payload.items.iter().map(|item| TabItem {
                    menu_item_id: item.menu_item_id,
                    description: item.description.clone(),
                    price: item.price,
                    status: ItemStatus::Ordered,
                }));
            }
            TabEventKind::ItemsServed(payload) => {
                self.flip_ordered(&payload.menu_item_ids, ItemStatus::Served);
            }
            TabEventKind::ItemsRejected(payload) => {
                self.flip_ordered(&payload.menu_item_ids, ItemStatus::Rejected);
            }
            TabEventKind::TabClosed(_) => {
                self.is_open = false;
            }
        }
        self.version = event.metadata.sequence_number;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}
