//! Commands for the Tab bounded context.

use cafe_core::command::Command;
use uuid::Uuid;

/// One order line as submitted by a client: a menu item and how many
/// units of it to order.
#[derive(Debug, Clone)]
pub struct OrderLine {
    /// The menu item identifier.
    pub menu_item_id: Uuid,
    /// Number of units to order.
    pub count: u32,
}

/// Command to open a tab on a table.
#[derive(Debug, Clone)]
pub struct OpenTab {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The tab identifier chosen by the caller.
    pub id: Uuid,
    /// The table to open the tab on.
    pub table_number: i32,
    /// The waiter serving the table, resolved by the caller.
    pub waiter_name: String,
}

impl Command for OpenTab {
    fn command_type(&self) -> &'static str {
        "tab.open_tab"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to order menu items on an open tab.
#[derive(Debug, Clone)]
pub struct OrderMenuItems {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The tab to order on.
    pub tab_id: Uuid,
    /// The order lines.
    pub items: Vec<OrderLine>,
}

impl Command for OrderMenuItems {
    fn command_type(&self) -> &'static str {
        "tab.order_menu_items"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to mark ordered menu items as served.
#[derive(Debug, Clone)]
pub struct ServeMenuItems {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The tab the items were ordered on.
    pub tab_id: Uuid,
    /// The menu items to serve.
    pub menu_item_ids: Vec<Uuid>,
}

impl Command for ServeMenuItems {
    fn command_type(&self) -> &'static str {
        "tab.serve_menu_items"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to reject ordered menu items.
#[derive(Debug, Clone)]
pub struct RejectMenuItems {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The tab the items were ordered on.
    pub tab_id: Uuid,
    /// The menu items to reject.
    pub menu_item_ids: Vec<Uuid>,
}

impl Command for RejectMenuItems {
    fn command_type(&self) -> &'static str {
        "tab.reject_menu_items"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to close a settled tab.
#[derive(Debug, Clone)]
pub struct CloseTab {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The tab to close.
    pub tab_id: Uuid,
}

impl Command for CloseTab {
    fn command_type(&self) -> &'static str {
        "tab.close_tab"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
