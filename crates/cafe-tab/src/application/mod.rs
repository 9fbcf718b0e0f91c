//! Application layer for the Tab bounded context.

pub mod command_handlers;
pub mod menu;
pub mod query_handlers;
