//! Builder pattern for constructing lifecycle engines.
//!
//! Provides a flexible way to compose a LifecycleEngine from various
//! service implementations using factory functions. Storage, payment and
//! catalog each resolve to the configured primary implementation; every
//! configured notification channel is loaded, since dispatch fans out to
//! all of them.

use crate::engine::{event_bus::EventBus, LifecycleEngine};
use orderflow_catalog::{CatalogError, CatalogInterface, CatalogService};
use orderflow_config::Config;
use orderflow_notify::{NotifyError, NotifyInterface, NotifyService};
use orderflow_payment::{PaymentError, PaymentInterface, PaymentService};
use orderflow_storage::{StorageError, StorageInterface, StorageService};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during lifecycle engine construction.
///
/// These errors indicate problems with configuration or missing required
/// components when building an engine instance.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Container for all factory functions needed to build a LifecycleEngine.
///
/// This struct holds factory functions for creating implementations of
/// each service type required by the engine. Each factory function takes
/// a TOML configuration value and returns the corresponding service
/// implementation.
pub struct LifecycleFactories<SF, PF, CF, NF> {
	pub storage_factories: HashMap<String, SF>,
	pub payment_factories: HashMap<String, PF>,
	pub catalog_factories: HashMap<String, CF>,
	pub notify_factories: HashMap<String, NF>,
}

/// Builder for constructing a LifecycleEngine with pluggable
/// implementations.
pub struct LifecycleBuilder {
	config: Config,
}

impl LifecycleBuilder {
	/// Creates a new LifecycleBuilder with the given configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the LifecycleEngine using factories for each component type.
	pub fn build<SF, PF, CF, NF>(
		self,
		factories: LifecycleFactories<SF, PF, CF, NF>,
	) -> Result<LifecycleEngine, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
		PF: Fn(&toml::Value) -> Result<Box<dyn PaymentInterface>, PaymentError>,
		CF: Fn(&toml::Value) -> Result<Box<dyn CatalogInterface>, CatalogError>,
		NF: Fn(&toml::Value) -> Result<Box<dyn NotifyInterface>, NotifyError>,
	{
		// Create storage implementations
		let mut storage_impls = HashMap::new();
		for (name, config) in &self.config.storage.implementations {
			if let Some(factory) = factories.storage_factories.get(name) {
				match factory(config) {
					Ok(implementation) => {
						// Validation already happened in the factory
						storage_impls.insert(name.clone(), implementation);
						let is_primary = &self.config.storage.primary == name;
						tracing::info!(component = "storage", implementation = %name, enabled = %is_primary, "Loaded");
					}
					Err(e) => {
						tracing::error!(
							component = "storage",
							implementation = %name,
							error = %e,
							"Failed to create storage implementation"
						);
						return Err(BuilderError::Config(format!(
							"Failed to create storage implementation '{}': {}",
							name, e
						)));
					}
				}
			}
		}

		if storage_impls.is_empty() {
			return Err(BuilderError::Config(
				"No valid storage implementations available".into(),
			));
		}

		// Get the primary storage implementation
		let primary_storage = &self.config.storage.primary;
		let storage_backend = storage_impls.remove(primary_storage).ok_or_else(|| {
			BuilderError::MissingComponent(format!("storage implementation '{}'", primary_storage))
		})?;

		let storage = Arc::new(StorageService::new(storage_backend));

		// Create payment implementations
		let mut payment_impls = HashMap::new();
		for (name, config) in &self.config.payment.implementations {
			if let Some(factory) = factories.payment_factories.get(name) {
				match factory(config) {
					Ok(implementation) => {
						payment_impls.insert(name.clone(), implementation);
						let is_primary = &self.config.payment.primary == name;
						tracing::info!(component = "payment", implementation = %name, enabled = %is_primary, "Loaded");
					}
					Err(e) => {
						tracing::error!(
							component = "payment",
							implementation = %name,
							error = %e,
							"Failed to create payment implementation"
						);
						return Err(BuilderError::Config(format!(
							"Failed to create payment implementation '{}': {}",
							name, e
						)));
					}
				}
			}
		}

		if payment_impls.is_empty() {
			return Err(BuilderError::Config(
				"No valid payment implementations available".into(),
			));
		}

		// Get the primary payment implementation
		let primary_payment = &self.config.payment.primary;
		let payment_backend = payment_impls.remove(primary_payment).ok_or_else(|| {
			BuilderError::MissingComponent(format!("payment implementation '{}'", primary_payment))
		})?;

		let payment = Arc::new(PaymentService::new(payment_backend));

		// Create catalog implementations
		let mut catalog_impls = HashMap::new();
		for (name, config) in &self.config.catalog.implementations {
			if let Some(factory) = factories.catalog_factories.get(name) {
				match factory(config) {
					Ok(implementation) => {
						catalog_impls.insert(name.clone(), implementation);
						let is_primary = &self.config.catalog.primary == name;
						tracing::info!(component = "catalog", implementation = %name, enabled = %is_primary, "Loaded");
					}
					Err(e) => {
						tracing::error!(
							component = "catalog",
							implementation = %name,
							error = %e,
							"Failed to create catalog implementation"
						);
						return Err(BuilderError::Config(format!(
							"Failed to create catalog implementation '{}': {}",
							name, e
						)));
					}
				}
			}
		}

		if catalog_impls.is_empty() {
			return Err(BuilderError::Config(
				"No valid catalog implementations available".into(),
			));
		}

		// Get the primary catalog implementation
		let primary_catalog = &self.config.catalog.primary;
		let catalog_backend = catalog_impls.remove(primary_catalog).ok_or_else(|| {
			BuilderError::MissingComponent(format!("catalog implementation '{}'", primary_catalog))
		})?;

		let catalog = Arc::new(CatalogService::new(catalog_backend));

		// Create notification channels. All configured channels stay
		// active; dispatch fans out to every one of them.
		let mut channels: Vec<Box<dyn NotifyInterface>> = Vec::new();
		for (name, config) in &self.config.notify.implementations {
			if let Some(factory) = factories.notify_factories.get(name) {
				match factory(config) {
					Ok(implementation) => {
						channels.push(implementation);
						tracing::info!(component = "notify", implementation = %name, "Loaded");
					}
					Err(e) => {
						tracing::error!(
							component = "notify",
							implementation = %name,
							error = %e,
							"Failed to create notification channel"
						);
						return Err(BuilderError::Config(format!(
							"Failed to create notification channel '{}': {}",
							name, e
						)));
					}
				}
			}
		}

		if channels.is_empty() {
			return Err(BuilderError::Config(
				"No valid notification channels available".into(),
			));
		}

		let notify = Arc::new(NotifyService::new(channels));

		Ok(LifecycleEngine::new(
			self.config,
			storage,
			payment,
			catalog,
			notify,
			EventBus::new(1000),
		))
	}
}
