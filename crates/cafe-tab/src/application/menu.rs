//! Menu reference-data seam.
//!
//! The menu itself is plain reference data owned elsewhere; the kernel
//! only needs to resolve menu item ids to descriptions and prices when an
//! order comes in, so the ordered units capture them as they were at
//! ordering time.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use cafe_core::error::DomainError;

/// Menu item details as resolved at ordering time.
#[derive(Debug, Clone)]
pub struct MenuItemDetails {
    /// The menu item identifier.
    pub id: Uuid,
    /// Display description.
    pub description: String,
    /// Current unit price.
    pub price: Decimal,
}

/// Lookup seam for menu reference data.
#[async_trait]
pub trait MenuCatalog: Send + Sync {
    /// Resolves the given ids. Ids that do not exist are simply absent
    /// from the result; callers decide whether that is an error.
    async fn find_items(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, MenuItemDetails>, DomainError>;
}

/// In-memory catalog seeded with a fixed set of items.
#[derive(Debug, Default)]
pub struct InMemoryMenuCatalog {
    items: RwLock<HashMap<Uuid, MenuItemDetails>>,
}

impl InMemoryMenuCatalog {
    /// Creates a catalog holding the given items.
    #[must_use]
    pub fn with_items(items: Vec<MenuItemDetails>) -> Self {
        Self {
            items: RwLock::new(items.into_iter().map(|item| (item.id, item)).collect()),
        }
    }
}

#[async_trait]
impl MenuCatalog for InMemoryMenuCatalog {
    async fn find_items(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, MenuItemDetails>, DomainError> {
        let items = self
            .items
            .read()
            .map_err(|_| DomainError::Infrastructure("menu catalog lock poisoned".into()))?;
        Ok(ids
            .iter()
            .filter_map(|id| items.get(id).map(|item| (*id, item.clone())))
            .collect())
    }
}
