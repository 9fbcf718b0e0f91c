//! Shared test mocks and utilities for the cafe order-processing kernel.

mod clock;
mod repository;
mod subscriber;
mod view_store;

pub use clock::FixedClock;
pub use repository::{
    ConflictingEventRepository, EmptyEventRepository, FailingEventRepository,
    RecordingEventRepository,
};
pub use subscriber::{FailingSubscriber, RecordingSubscriber};
pub use view_store::FlakyTabViewStore;
