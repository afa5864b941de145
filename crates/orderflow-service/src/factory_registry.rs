//! Dynamic factory registry for orderflow implementations.
//!
//! This module provides a centralized registry for all factory functions,
//! allowing dynamic instantiation of implementations based on
//! configuration. Every implementation crate contributes its factories
//! through `get_all_implementations`; the registry then resolves the
//! names a configuration file asks for and fails fast on unknown ones.

use orderflow_catalog::CatalogFactory;
use orderflow_config::Config;
use orderflow_core::{LifecycleBuilder, LifecycleEngine, LifecycleFactories};
use orderflow_notify::NotifyFactory;
use orderflow_payment::PaymentFactory;
use orderflow_storage::StorageFactory;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Global registry for all implementation factories
pub struct FactoryRegistry {
	pub storage: HashMap<String, StorageFactory>,
	pub payment: HashMap<String, PaymentFactory>,
	pub catalog: HashMap<String, CatalogFactory>,
	pub notify: HashMap<String, NotifyFactory>,
}

impl FactoryRegistry {
	/// Create a new empty registry
	pub fn new() -> Self {
		Self {
			storage: HashMap::new(),
			payment: HashMap::new(),
			catalog: HashMap::new(),
			notify: HashMap::new(),
		}
	}

	/// Register a storage implementation
	pub fn register_storage(&mut self, name: impl Into<String>, factory: StorageFactory) {
		self.storage.insert(name.into(), factory);
	}

	/// Register a payment implementation
	pub fn register_payment(&mut self, name: impl Into<String>, factory: PaymentFactory) {
		self.payment.insert(name.into(), factory);
	}

	/// Register a catalog implementation
	pub fn register_catalog(&mut self, name: impl Into<String>, factory: CatalogFactory) {
		self.catalog.insert(name.into(), factory);
	}

	/// Register a notification channel implementation
	pub fn register_notify(&mut self, name: impl Into<String>, factory: NotifyFactory) {
		self.notify.insert(name.into(), factory);
	}
}

// Global registry instance
static REGISTRY: OnceLock<FactoryRegistry> = OnceLock::new();

/// Initialize the global registry with all available implementations
pub fn initialize_registry() -> &'static FactoryRegistry {
	REGISTRY.get_or_init(|| {
		let mut registry = FactoryRegistry::new();

		// Auto-register all storage implementations
		for (name, factory) in orderflow_storage::get_all_implementations() {
			tracing::debug!("Registering storage implementation: {}", name);
			registry.register_storage(name, factory);
		}

		// Auto-register all payment implementations
		for (name, factory) in orderflow_payment::get_all_implementations() {
			tracing::debug!("Registering payment implementation: {}", name);
			registry.register_payment(name, factory);
		}

		// Auto-register all catalog implementations
		for (name, factory) in orderflow_catalog::get_all_implementations() {
			tracing::debug!("Registering catalog implementation: {}", name);
			registry.register_catalog(name, factory);
		}

		// Auto-register all notification channels
		for (name, factory) in orderflow_notify::get_all_implementations() {
			tracing::debug!("Registering notification channel: {}", name);
			registry.register_notify(name, factory);
		}

		registry
	})
}

/// Get the global factory registry
pub fn get_registry() -> &'static FactoryRegistry {
	initialize_registry()
}

/// Macro to build factories from config implementations
macro_rules! build_factories {
	($registry:expr, $config_impls:expr, $registry_field:ident, $type_name:literal) => {{
		let mut factories = HashMap::new();
		for name in $config_impls.keys() {
			if let Some(factory) = $registry.$registry_field.get(name) {
				factories.insert(name.clone(), *factory);
			} else {
				let available: Vec<_> = $registry.$registry_field.keys().cloned().collect();
				let available_str = available.join(", ");
				return Err(format!(
					"Unknown {} implementation '{}'. Available: [{}]",
					$type_name, name, available_str
				)
				.into());
			}
		}
		factories
	}};
}

/// Build a lifecycle engine using registry and config
pub fn build_engine_from_config(
	config: Config,
) -> Result<LifecycleEngine, Box<dyn std::error::Error>> {
	let registry = get_registry();
	let builder = LifecycleBuilder::new(config.clone());

	// Build factories for each component type using the macro
	let storage_factories =
		build_factories!(registry, config.storage.implementations, storage, "storage");
	let payment_factories =
		build_factories!(registry, config.payment.implementations, payment, "payment");
	let catalog_factories =
		build_factories!(registry, config.catalog.implementations, catalog, "catalog");
	let notify_factories = build_factories!(registry, config.notify.implementations, notify, "notify");

	let factories = LifecycleFactories {
		storage_factories,
		payment_factories,
		catalog_factories,
		notify_factories,
	};

	Ok(builder.build(factories)?)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn test_config_toml() -> &'static str {
		r#"
		[engine]
		id = "orderflow-service-test"

		[storage]
		primary = "memory"
		cleanup_interval_seconds = 60
		[storage.implementations.memory]

		[payment]
		primary = "snapshot"
		[payment.implementations.snapshot]

		[catalog]
		primary = "static"
		[catalog.implementations.static]
		restaurants = { "rest-1" = "seller-1" }

		[notify]
		[notify.implementations.log]
		"#
	}

	#[test]
	fn registry_carries_every_shipped_implementation() {
		let registry = get_registry();
		assert!(registry.storage.contains_key("memory"));
		assert!(registry.storage.contains_key("file"));
		assert!(registry.payment.contains_key("snapshot"));
		assert!(registry.payment.contains_key("http"));
		assert!(registry.catalog.contains_key("static"));
		assert!(registry.catalog.contains_key("http"));
		assert!(registry.notify.contains_key("log"));
		assert!(registry.notify.contains_key("webhook"));
	}

	#[test]
	fn builds_an_engine_from_config() {
		let config: Config = test_config_toml().parse().unwrap();
		let engine = build_engine_from_config(config).unwrap();
		assert_eq!(engine.config().engine.id, "orderflow-service-test");
	}

	#[test]
	fn unknown_implementation_names_fail_fast() {
		let mut config: Config = test_config_toml().parse().unwrap();
		config.storage.implementations.insert(
			"redis".to_string(),
			toml::Value::Table(toml::map::Map::new()),
		);
		// `unwrap_err` would need `LifecycleEngine: Debug`, which its
		// trait-object services cannot provide.
		let Err(err) = build_engine_from_config(config) else {
			panic!("expected unknown implementation to fail")
		};
		assert!(err.to_string().contains("Unknown storage implementation 'redis'"));
	}
}
