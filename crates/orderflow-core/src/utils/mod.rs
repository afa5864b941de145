//! Utility functions for the engine core.
//!
//! Contains helper functions for common operations such as ID truncation
//! for display purposes and unix timestamps.

pub mod formatting;
pub mod time;

pub use formatting::truncate_id;
pub use time::unix_timestamp;
