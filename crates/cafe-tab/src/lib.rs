//! Cafe order-processing kernel — the Tab bounded context.
//!
//! Responsible for the lifecycle of a table-service tab: opening,
//! ordering, serving, rejecting, and closing. Truth lives in the
//! append-only event stream; the [`projection::TabView`] read model is a
//! derived cache kept in sync within the command's commit boundary.

pub mod application;
pub mod domain;
pub mod projection;
