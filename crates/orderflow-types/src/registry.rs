//! Registry trait implemented by pluggable backend implementations.
//!
//! Each backend crate (storage, payment, catalog, notify) exposes its
//! implementations through small registry structs. The binary collects
//! the factories it wants to ship into maps keyed by `NAME`, and the
//! builder resolves configuration sections against those maps.

/// Trait for registering an implementation under its configuration name.
///
/// `NAME` is the string a configuration file uses to select the
/// implementation, for example `memory` or `file` for storage backends.
/// `Factory` is the crate-specific factory function type that builds
/// the implementation from its configuration table.
pub trait ImplementationRegistry {
	/// Name used in configuration files.
	const NAME: &'static str;
	/// Factory function type for this implementation kind.
	type Factory;
	/// Returns the factory function.
	fn factory() -> Self::Factory;
}
