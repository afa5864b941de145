//! Event handlers consuming committed lifecycle events.
//!
//! Handlers run off the event bus after a transition has been stored, so
//! nothing here can affect whether an order change succeeds.

pub mod notification;

pub use notification::NotificationHandler;
