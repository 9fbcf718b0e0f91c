//! Command handlers for the Tab bounded context.
//!
//! Each handler runs one command through the full pipeline: structural
//! validation, stream replay, aggregate decision, atomic append at the
//! replayed version, synchronous projection, and post-commit
//! notification. A `ConcurrencyConflict` from the append is returned to
//! the caller as-is — re-deciding against fresh state is the caller's
//! choice, never the kernel's.

use cafe_core::aggregate::AggregateRoot;
use cafe_core::clock::Clock;
use cafe_core::error::DomainError;
use cafe_core::repository::{EventRepository, StoredEvent};
use cafe_core::subscriber::EventSubscriber;
use uuid::Uuid;

use crate::domain::commands::{CloseTab, OpenTab, OrderMenuItems, RejectMenuItems, ServeMenuItems};
use crate::domain::events::{OrderedItem, TabEvent};
use crate::domain::tab::Tab;
use crate::projection::{self, TabViewStore};

/// Replays the target stream into a `Tab`; an empty stream yields the
/// pre-history state of a new aggregate.
async fn reconstitute(tab_id: Uuid, repo: &dyn EventRepository) -> Result<Tab, DomainError> {
    let events = repo.load_events(tab_id).await?;
    Tab::from_events(tab_id, &events)
}

/// Commits the aggregate's uncommitted events: atomic append at the
/// replayed version, synchronous projection, best-effort notification.
///
/// When the incremental projection fails, the view is rebuilt from the
/// event log — the events are already durable at that point and must not
/// be lost by the derived cache.
async fn commit(
    tab: &mut Tab,
    repo: &dyn EventRepository,
    views: &dyn TabViewStore,
    subscriber: &dyn EventSubscriber,
) -> Result<Vec<StoredEvent>, DomainError> {
    let stored: Vec<StoredEvent> = tab
        .uncommitted_events()
        .iter()
        .map(TabEvent::to_stored)
        .collect();

    repo.append_events(tab.id, tab.version(), &stored).await?;

    if let Err(err) = projection::project_committed(views, tab.id, &stored).await {
        tracing::warn!(
            stream_id = %tab.id,
            error = %err,
            "incremental projection failed, rebuilding view from the event log"
        );
        projection::rebuild(views, repo, tab.id).await?;
    }

    if let Err(err) = subscriber.on_events_committed(tab.id, &stored).await {
        tracing::warn!(
            stream_id = %tab.id,
            error = %err,
            "post-commit notification failed, delivery is best-effort"
        );
    }

    tab.clear_uncommitted_events();
    Ok(stored)
}

/// Handles `OpenTab`: opens a brand-new tab on a table.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a non-positive table number or a
/// blank waiter name, `DomainError::Conflict` if the tab id already has
/// history, and storage errors unchanged.
pub async fn handle_open_tab(
    command: &OpenTab,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
    views: &dyn TabViewStore,
    subscriber: &dyn EventSubscriber,
) -> Result<Vec<StoredEvent>, DomainError> {
    if command.table_number < 1 {
        return Err(DomainError::Validation(
            "table number must be positive".into(),
        ));
    }
    if command.waiter_name.trim().is_empty() {
        return Err(DomainError::Validation(
            "waiter name must not be empty".into(),
        ));
    }

    let mut tab = reconstitute(command.id, repo).await?;
    tab.open(
        command.table_number,
        command.waiter_name.clone(),
        command.correlation_id,
        clock,
    )?;

    commit(&mut tab, repo, views, subscriber).await
}

/// Handles `OrderMenuItems`: resolves the order lines against the menu
/// catalog, expands counts into per-unit entries, and orders them on the
/// tab.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an empty order, a zero count, an
/// unknown menu item, or a tab that is not open.
pub async fn handle_order_menu_items(
    command: &OrderMenuItems,
    clock: &dyn Clock,
    catalog: &dyn crate::application::menu::MenuCatalog,
    repo: &dyn EventRepository,
    views: &dyn TabViewStore,
    subscriber: &dyn EventSubscriber,
) -> Result<Vec<StoredEvent>, DomainError> {
    if command.items.is_empty() {
        return Err(DomainError::Validation(
            "an order must contain at least one line".into(),
        ));
    }
    if command.items.iter().any(|line| line.count == 0) {
        return Err(DomainError::Validation(
            "order line counts must be positive".into(),
        ));
    }

    let ids: Vec<Uuid> = command.items.iter().map(|line| line.menu_item_id).collect();
    let details = catalog.find_items(&ids).await?;

    let mut units = Vec::new();
    for line in &command.items {
        let Some(item) = details.get(&line.menu_item_id) else {
            return Err(DomainError::Validation(format!(
                "menu item {} does not exist",
                line.menu_item_id
            )));
        };
        for _ in 0..line.count {
            units.push(OrderedItem {
                menu_item_id: item.id,
                description: item.description.clone(),
                price: item.price,
            });
        }
    }

    let mut tab = reconstitute(command.tab_id, repo).await?;
    tab.order_items(units, command.correlation_id, clock)?;

    commit(&mut tab, repo, views, subscriber).await
}

/// Handles `ServeMenuItems`: marks every ordered unit of the given menu
/// items as served.
///
/// # Errors
///
/// Returns `DomainError::Validation` if any id has nothing to serve; the
/// whole command fails atomically and the stream is untouched.
pub async fn handle_serve_menu_items(
    command: &ServeMenuItems,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
    views: &dyn TabViewStore,
    subscriber: &dyn EventSubscriber,
) -> Result<Vec<StoredEvent>, DomainError> {
    let mut tab = reconstitute(command.tab_id, repo).await?;
    tab.serve_items(command.menu_item_ids.clone(), command.correlation_id, clock)?;

    commit(&mut tab, repo, views, subscriber).await
}

/// Handles `RejectMenuItems`: same pipeline as serving, with `Rejected`
/// as the target status.
///
/// # Errors
///
/// Returns `DomainError::Validation` if any id has nothing to reject.
pub async fn handle_reject_menu_items(
    command: &RejectMenuItems,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
    views: &dyn TabViewStore,
    subscriber: &dyn EventSubscriber,
) -> Result<Vec<StoredEvent>, DomainError> {
    let mut tab = reconstitute(command.tab_id, repo).await?;
    tab.reject_items(command.menu_item_ids.clone(), command.correlation_id, clock)?;

    commit(&mut tab, repo, views, subscriber).await
}

/// Handles `CloseTab`: closes the tab once every unit is served or
/// rejected.
///
/// # Errors
///
/// Returns `DomainError::Conflict` while ordered units remain, and
/// `DomainError::Validation` if the tab is not open.
pub async fn handle_close_tab(
    command: &CloseTab,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
    views: &dyn TabViewStore,
    subscriber: &dyn EventSubscriber,
) -> Result<Vec<StoredEvent>, DomainError> {
    let mut tab = reconstitute(command.tab_id, repo).await?;
    tab.close(command.correlation_id, clock)?;

    commit(&mut tab, repo, views, subscriber).await
}
