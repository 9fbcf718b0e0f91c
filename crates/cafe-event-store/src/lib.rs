//! Event store implementations for the cafe order-processing kernel.
//!
//! Two implementations of the [`cafe_core::repository::EventRepository`]
//! contract: an in-memory store used in-process and throughout the test
//! suites, and a PostgreSQL-backed store for durable deployments.

pub mod memory;
pub mod pg_event_store;
pub mod schema;

pub use memory::InMemoryEventStore;
pub use pg_event_store::PgEventStore;
