//! Versioned persistence for the engine's aggregates.

pub mod order;

pub use order::{OrderStore, StateError};
