//! Core lifecycle engine for the orderflow system.
//!
//! This crate provides the main orchestration logic for order lifecycle
//! management: the transition table and validator, the versioned order
//! store, the engine operations callers invoke, and the event-driven
//! notification pipeline. The builder composes an engine instance from
//! configuration and pluggable service implementations.

pub mod builder;
pub mod engine;
pub mod handlers;
pub mod lifecycle;
pub mod state;
pub mod utils;

pub use builder::{BuilderError, LifecycleBuilder, LifecycleFactories};
pub use engine::{event_bus::EventBus, EngineError, LifecycleEngine, TransitionContext};
pub use lifecycle::{
	valid_actions, AcceptedTransition, TransitionEffects, TransitionError, TransitionValidator,
};
