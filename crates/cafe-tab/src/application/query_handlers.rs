//! Query handlers for the Tab bounded context.
//!
//! Read-only access to the projected views. No business rules live here;
//! only existence checks.

use uuid::Uuid;

use cafe_core::error::DomainError;

use crate::projection::{TabView, TabViewStore};

/// Retrieves the view for one tab.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the tab was never projected.
pub async fn get_tab_view(id: Uuid, views: &dyn TabViewStore) -> Result<TabView, DomainError> {
    views.get(id).await?.ok_or(DomainError::NotFound(id))
}

/// Lists all currently open tabs.
///
/// # Errors
///
/// Propagates view store failures.
pub async fn list_open_tabs(views: &dyn TabViewStore) -> Result<Vec<TabView>, DomainError> {
    views.list_open().await
}

/// Lists all closed tabs — closed tabs stay queryable as history.
///
/// # Errors
///
/// Propagates view store failures.
pub async fn list_closed_tabs(views: &dyn TabViewStore) -> Result<Vec<TabView>, DomainError> {
    views.list_closed().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::InMemoryTabViewStore;
    use chrono::{TimeZone, Utc};

    fn view(id: Uuid, is_open: bool) -> TabView {
        TabView {
            id,
            table_number: 5,
            waiter_name: "Ada".to_owned(),
            opened_at: Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap(),
            items: Vec::new(),
            is_open,
        }
    }

    #[tokio::test]
    async fn test_get_tab_view_returns_projected_view() {
        // Arrange
        let views = InMemoryTabViewStore::new();
        let id = Uuid::new_v4();
        views.save(view(id, true)).await.unwrap();

        // Act
        let found = get_tab_view(id, &views).await.unwrap();

        // Assert
        assert_eq!(found.id, id);
        assert!(found.is_open);
    }

    #[tokio::test]
    async fn test_get_tab_view_returns_not_found_for_unknown_id() {
        // Arrange
        let views = InMemoryTabViewStore::new();
        let id = Uuid::new_v4();

        // Act
        let result = get_tab_view(id, &views).await;

        // Assert
        match result.unwrap_err() {
            DomainError::NotFound(missing) => assert_eq!(missing, id),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_listings_partition_open_and_closed() {
        // Arrange
        let views = InMemoryTabViewStore::new();
        let open_id = Uuid::new_v4();
        let closed_id = Uuid::new_v4();
        views.save(view(open_id, true)).await.unwrap();
        views.save(view(closed_id, false)).await.unwrap();

        // Act
        let open = list_open_tabs(&views).await.unwrap();
        let closed = list_closed_tabs(&views).await.unwrap();

        // Assert
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, open_id);
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].id, closed_id);
    }
}
