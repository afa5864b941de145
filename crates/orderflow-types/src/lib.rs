//! Common types for the orderflow system.
//!
//! This crate defines the shared vocabulary every other crate builds on:
//! the order entity and its role-keyed projections, the closed sets of
//! statuses, actions and roles that make up the lifecycle state machine,
//! the tracking log, storage namespaces, engine events and the API
//! request and error types.

/// API request bodies, the error response envelope and HTTP error mapping.
pub mod api;
/// Events published by the engine after committed operations.
pub mod events;
/// Lifecycle vocabulary: statuses, payment states, roles, actors and actions.
pub mod lifecycle;
/// Order entity, address snapshots and projections.
pub mod order;
/// Registry trait implemented by pluggable backend implementations.
pub mod registry;
/// Storage namespace keys.
pub mod storage;
/// Tracking log entries and shipper locations.
pub mod tracking;

pub use api::*;
pub use events::*;
pub use lifecycle::*;
pub use order::*;
pub use registry::ImplementationRegistry;
pub use storage::*;
pub use tracking::*;
