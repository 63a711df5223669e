//! Optimistic update subsystem.

pub mod coordinator;

pub use coordinator::{UpdateCoordinator, UpdateOutcome, UpdateRequest};
