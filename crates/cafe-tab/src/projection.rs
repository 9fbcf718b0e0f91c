//! The `TabView` projection — a denormalized read model folded from the
//! tab event stream.
//!
//! The projection is updated synchronously inside the command's commit
//! boundary, so a caller that appends and immediately queries sees its own
//! write. The view is a rebuildable cache: if an incremental update fails,
//! it is reconstructed from the event log rather than from the in-flight
//! events, because the log is the source of truth.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use cafe_core::error::DomainError;
use cafe_core::repository::{EventRepository, StoredEvent};
use rust_decimal::Decimal;

use crate::domain::events::{TabEvent, TabEventKind};
use crate::domain::tab::ItemStatus;

/// One line of a tab view: ordered units grouped by menu item and status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabViewItem {
    /// The menu item identifier.
    pub menu_item_id: Uuid,
    /// The menu item description.
    pub description: String,
    /// The unit price at ordering time.
    pub price: Decimal,
    /// Status shared by every unit in this line.
    pub status: ItemStatus,
    /// Number of units in this line.
    pub count: u32,
}

/// Read-optimized view of one tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabView {
    /// The tab identifier.
    pub id: Uuid,
    /// The table the tab is open on.
    pub table_number: i32,
    /// The waiter serving the table.
    pub waiter_name: String,
    /// When the tab was opened.
    pub opened_at: DateTime<Utc>,
    /// Order lines grouped by menu item and status.
    pub items: Vec<TabViewItem>,
    /// Whether the tab is still open.
    pub is_open: bool,
}

/// Storage seam for projected tab views.
#[async_trait]
pub trait TabViewStore: Send + Sync {
    /// Returns the view for a tab, or `None` if it was never projected.
    async fn get(&self, id: Uuid) -> Result<Option<TabView>, DomainError>;

    /// Inserts or replaces a view.
    async fn save(&self, view: TabView) -> Result<(), DomainError>;

    /// Returns all currently open tabs.
    async fn list_open(&self) -> Result<Vec<TabView>, DomainError>;

    /// Returns all closed tabs (the queryable history).
    async fn list_closed(&self) -> Result<Vec<TabView>, DomainError>;
}

/// In-memory `TabViewStore` backed by a `RwLock`ed map.
#[derive(Debug, Default)]
pub struct InMemoryTabViewStore {
    views: RwLock<HashMap<Uuid, TabView>>,
}

impl InMemoryTabViewStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn list_where(&self, is_open: bool) -> Result<Vec<TabView>, DomainError> {
        let views = self
            .views
            .read()
            .map_err(|_| DomainError::Infrastructure("view store lock poisoned".into()))?;
        let mut selected: Vec<TabView> = views
            .values()
            .filter(|view| view.is_open == is_open)
            .cloned()
            .collect();
        selected.sort_by_key(|view| (view.opened_at, view.id));
        Ok(selected)
    }
}

#[async_trait]
impl TabViewStore for InMemoryTabViewStore {
    async fn get(&self, id: Uuid) -> Result<Option<TabView>, DomainError> {
        let views = self
            .views
            .read()
            .map_err(|_| DomainError::Infrastructure("view store lock poisoned".into()))?;
        Ok(views.get(&id).cloned())
    }

    async fn save(&self, view: TabView) -> Result<(), DomainError> {
        let mut views = self
            .views
            .write()
            .map_err(|_| DomainError::Infrastructure("view store lock poisoned".into()))?;
        views.insert(view.id, view);
        Ok(())
    }

    async fn list_open(&self) -> Result<Vec<TabView>, DomainError> {
        self.list_where(true)
    }

    async fn list_closed(&self) -> Result<Vec<TabView>, DomainError> {
        self.list_where(false)
    }
}

fn move_units(view: &mut TabView, menu_item_ids: &[Uuid], to: ItemStatus) {
    for menu_item_id in menu_item_ids {
        let Some(position) = view
            .items
            .iter()
            .position(|line| line.menu_item_id == *menu_item_id && line.status == ItemStatus::Ordered)
        else {
            continue;
        };
        let moved = view.items.remove(position);
        if let Some(target) = view
            .items
            .iter_mut()
            .find(|line| line.menu_item_id == *menu_item_id && line.status == to)
        {
            target.count += moved.count;
        } else {
            view.items.push(TabViewItem {
                status: to,
                ..moved
            });
        }
    }
}

/// Applies one stored event to an optional view, creating it on
/// `TabOpened`.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the payload cannot be decoded
/// or the stream starts with anything but `TabOpened`.
fn apply_stored(view: &mut Option<TabView>, stored: &StoredEvent) -> Result<(), DomainError> {
    let event = TabEvent::from_stored(stored)?;
    match (&event.kind, view.as_mut()) {
        (TabEventKind::TabOpened(payload), _) => {
            *view = Some(TabView {
                id: payload.tab_id,
                table_number: payload.table_number,
                waiter_name: payload.waiter_name.clone(),
                opened_at: stored.occurred_at,
                items: Vec::new(),
                is_open: true,
            });
        }
        (TabEventKind::ItemsOrdered(payload), Some(view)) => {
            for item in &payload.items {
                if let Some(line) = view.items.iter_mut().find(|line| {
                    line.menu_item_id == item.menu_item_id && line.status == ItemStatus::Ordered
                }) {
                    line.count += 1;
                } else {
                    view.items.push(TabViewItem {
                        menu_item_id: item.menu_item_id,
                        description: item.description.clone(),
                        price: item.price,
                        status: ItemStatus::Ordered,
                        count: 1,
                    });
                }
            }
        }
        (TabEventKind::ItemsServed(payload), Some(view)) => {
            move_units(view, &payload.menu_item_ids, ItemStatus::Served);
        }
        (TabEventKind::ItemsRejected(payload), Some(view)) => {
            move_units(view, &payload.menu_item_ids, ItemStatus::Rejected);
        }
        (TabEventKind::TabClosed(_), Some(view)) => {
            view.is_open = false;
        }
        (_, None) => {
            return Err(DomainError::Infrastructure(format!(
                "stream {} does not start with a tab.opened event",
                stored.stream_id
            )));
        }
    }
    Ok(())
}

/// Folds a full stream into a view. Returns `None` for an empty stream.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` on any decode failure.
pub fn fold_view(events: &[StoredEvent]) -> Result<Option<TabView>, DomainError> {
    let mut view = None;
    for stored in events {
        apply_stored(&mut view, stored)?;
    }
    Ok(view)
}

/// Incrementally projects newly committed events, strictly in commit
/// order, inside the committing command's boundary.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the view cannot be loaded,
/// decoded against, or saved. The committed events are not lost on
/// failure; callers recover with [`rebuild`].
pub async fn project_committed(
    views: &dyn TabViewStore,
    stream_id: Uuid,
    events: &[StoredEvent],
) -> Result<(), DomainError> {
    let mut view = views.get(stream_id).await?;
    for stored in events {
        apply_stored(&mut view, stored)?;
    }
    if let Some(view) = view {
        views.save(view).await?;
    }
    Ok(())
}

/// Rebuilds a tab's view from the durable event log, replacing whatever
/// the store currently holds. This is both the retry path for a failed
/// incremental projection and a standalone recovery tool.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the log cannot be read or the
/// rebuilt view cannot be saved.
pub async fn rebuild(
    views: &dyn TabViewStore,
    repo: &dyn EventRepository,
    stream_id: Uuid,
) -> Result<(), DomainError> {
    let events = repo.load_events(stream_id).await?;
    if let Some(view) = fold_view(&events)? {
        views.save(view).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::{ItemsOrdered, ItemsServed, OrderedItem, TabClosed, TabOpened};
    use cafe_event_store::InMemoryEventStore;
    use chrono::TimeZone;

    fn stored(stream_id: Uuid, sequence_number: i64, kind: &TabEventKind) -> StoredEvent {
        StoredEvent {
            event_id: Uuid::new_v4(),
            stream_id,
            event_type: kind.event_type().to_owned(),
            payload: serde_json::to_value(kind).unwrap(),
            sequence_number,
            correlation_id: Uuid::new_v4(),
            causation_id: Uuid::new_v4(),
            occurred_at: Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap(),
        }
    }

    fn coffee_unit(menu_item_id: Uuid) -> OrderedItem {
        OrderedItem {
            menu_item_id,
            description: "Coffee".to_owned(),
            price: Decimal::new(250, 2),
        }
    }

    fn lifecycle_stream(tab_id: Uuid, coffee_id: Uuid) -> Vec<StoredEvent> {
        vec![
            stored(
                tab_id,
                1,
                &TabEventKind::TabOpened(TabOpened {
                    tab_id,
                    table_number: 5,
                    waiter_name: "Ada".to_owned(),
                }),
            ),
            stored(
                tab_id,
                2,
                &TabEventKind::ItemsOrdered(ItemsOrdered {
                    tab_id,
                    items: vec![coffee_unit(coffee_id), coffee_unit(coffee_id)],
                }),
            ),
            stored(
                tab_id,
                3,
                &TabEventKind::ItemsServed(ItemsServed {
                    tab_id,
                    menu_item_ids: vec![coffee_id],
                }),
            ),
            stored(tab_id, 4, &TabEventKind::TabClosed(TabClosed { tab_id })),
        ]
    }

    #[test]
    fn test_fold_groups_units_by_item_and_status() {
        // Arrange
        let tab_id = Uuid::new_v4();
        let coffee_id = Uuid::new_v4();
        let events = lifecycle_stream(tab_id, coffee_id);

        // Act
        let view = fold_view(&events[..2]).unwrap().unwrap();

        // Assert: two ordered coffees collapse into one line with count 2.
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].count, 2);
        assert_eq!(view.items[0].status, ItemStatus::Ordered);
        assert_eq!(view.items[0].description, "Coffee");
        assert!(view.is_open);
    }

    #[test]
    fn test_fold_full_lifecycle_matches_aggregate_state() {
        // Arrange
        let tab_id = Uuid::new_v4();
        let coffee_id = Uuid::new_v4();
        let events = lifecycle_stream(tab_id, coffee_id);

        // Act
        let view = fold_view(&events).unwrap().unwrap();
        let tab = crate::domain::tab::Tab::from_events(tab_id, &events).unwrap();

        // Assert: every unit the aggregate reports served, the view
        // reports served too.
        assert!(!view.is_open);
        assert!(!tab.is_open);
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].status, ItemStatus::Served);
        assert_eq!(view.items[0].count, 2);
        assert_eq!(
            tab.items
                .iter()
                .filter(|item| item.status == ItemStatus::Served)
                .count(),
            2
        );
        assert_eq!(view.table_number, tab.table_number);
        assert_eq!(view.waiter_name, tab.waiter_name);
    }

    #[test]
    fn test_fold_empty_stream_yields_no_view() {
        assert!(fold_view(&[]).unwrap().is_none());
    }

    #[test]
    fn test_fold_rejects_stream_not_starting_with_open() {
        // Arrange
        let tab_id = Uuid::new_v4();
        let events = vec![stored(
            tab_id,
            1,
            &TabEventKind::TabClosed(TabClosed { tab_id }),
        )];

        // Act + Assert
        assert!(matches!(
            fold_view(&events),
            Err(DomainError::Infrastructure(_))
        ));
    }

    #[tokio::test]
    async fn test_project_committed_is_incremental() {
        // Arrange
        let tab_id = Uuid::new_v4();
        let coffee_id = Uuid::new_v4();
        let events = lifecycle_stream(tab_id, coffee_id);
        let views = InMemoryTabViewStore::new();

        // Act: project the stream in two batches, as two commands would.
        project_committed(&views, tab_id, &events[..2]).await.unwrap();
        project_committed(&views, tab_id, &events[2..]).await.unwrap();

        // Assert: identical to a one-shot fold of the full stream.
        let projected = views.get(tab_id).await.unwrap().unwrap();
        let folded = fold_view(&events).unwrap().unwrap();
        assert_eq!(projected, folded);
    }

    #[tokio::test]
    async fn test_rebuild_replaces_a_stale_view() {
        // Arrange: a store holding a view that lost the last two events.
        let tab_id = Uuid::new_v4();
        let coffee_id = Uuid::new_v4();
        let events = lifecycle_stream(tab_id, coffee_id);
        let views = InMemoryTabViewStore::new();
        let repo = InMemoryEventStore::new();
        repo.append_events(tab_id, 0, &events).await.unwrap();
        project_committed(&views, tab_id, &events[..2]).await.unwrap();

        // Act
        rebuild(&views, &repo, tab_id).await.unwrap();

        // Assert
        let view = views.get(tab_id).await.unwrap().unwrap();
        assert!(!view.is_open);
        assert_eq!(view.items[0].status, ItemStatus::Served);
    }

    #[tokio::test]
    async fn test_list_open_and_closed_partition_views() {
        // Arrange
        let views = InMemoryTabViewStore::new();
        let open_id = Uuid::new_v4();
        let closed_id = Uuid::new_v4();
        let coffee_id = Uuid::new_v4();
        let open_events = vec![stored(
            open_id,
            1,
            &TabEventKind::TabOpened(TabOpened {
                tab_id: open_id,
                table_number: 2,
                waiter_name: "Grace".to_owned(),
            }),
        )];
        project_committed(&views, open_id, &open_events).await.unwrap();
        project_committed(&views, closed_id, &lifecycle_stream(closed_id, coffee_id))
            .await
            .unwrap();

        // Act
        let open = views.list_open().await.unwrap();
        let closed = views.list_closed().await.unwrap();

        // Assert
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, open_id);
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].id, closed_id);
    }
}
