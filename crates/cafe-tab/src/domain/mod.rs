//! Domain layer for the Tab bounded context.

pub mod commands;
pub mod events;
pub mod tab;
