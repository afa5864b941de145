//! Core lifecycle engine that applies validated transitions to orders.
//!
//! This module contains the main LifecycleEngine struct which coordinates
//! between the collaborating services (storage, payment, catalog,
//! notifications) and runs the event loop that turns committed
//! transitions into notifications.

pub mod event_bus;
pub mod orders;
pub mod tracking;

#[cfg(test)]
pub(crate) mod support;

use crate::handlers::NotificationHandler;
use crate::lifecycle::{TransitionError, TransitionValidator};
use crate::state::{OrderStore, StateError};
use orderflow_catalog::CatalogService;
use orderflow_config::Config;
use orderflow_notify::NotifyService;
use orderflow_payment::PaymentService;
use orderflow_storage::StorageService;
use orderflow_types::{Actor, Order, OrderStatus, Role};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;

/// Errors that can occur during engine operations.
///
/// Rejections coming out of the validator keep their own type so the API
/// layer can map each rejection class to a distinct response.
#[derive(Debug, Error)]
pub enum EngineError {
	/// No order exists under the given reference.
	#[error("Order not found: {0}")]
	NotFound(String),
	/// The validator refused the request.
	#[error(transparent)]
	Rejected(#[from] TransitionError),
	/// Another writer changed the order between load and commit.
	#[error("Order is no longer available")]
	Conflict,
	/// The request itself is malformed.
	#[error("{0}")]
	InvalidRequest(String),
	#[error("Storage error: {0}")]
	Storage(String),
	#[error("Service error: {0}")]
	Service(String),
	#[error("Clock error: {0}")]
	Time(String),
}

/// Caller-supplied context accompanying a transition request.
#[derive(Debug, Clone, Default)]
pub struct TransitionContext {
	/// Free-form tracking message. Falls back to the target status name.
	pub message: Option<String>,
	/// Position where the action happened, when the caller reports one.
	pub latitude: Option<f64>,
	pub longitude: Option<f64>,
}

/// Main engine coordinating order lifecycle operations.
#[derive(Clone)]
pub struct LifecycleEngine {
	/// Engine configuration.
	pub(crate) config: Config,
	/// Storage service backing all persistence.
	pub(crate) storage: Arc<StorageService>,
	/// Versioned order persistence.
	pub(crate) store: Arc<OrderStore>,
	/// Transition validation.
	pub(crate) validator: Arc<TransitionValidator>,
	/// Catalog service, used for read authorization.
	pub(crate) catalog: Arc<CatalogService>,
	/// Event bus for inter-component communication.
	pub(crate) event_bus: event_bus::EventBus,
	/// Notification handler driven by the event loop.
	pub(crate) notification_handler: Arc<NotificationHandler>,
}

impl LifecycleEngine {
	/// Creates a new lifecycle engine with the given services.
	pub fn new(
		config: Config,
		storage: Arc<StorageService>,
		payment: Arc<PaymentService>,
		catalog: Arc<CatalogService>,
		notify: Arc<NotifyService>,
		event_bus: event_bus::EventBus,
	) -> Self {
		let store = Arc::new(OrderStore::new(storage.clone()));
		let validator = Arc::new(TransitionValidator::new(payment, catalog.clone()));
		let notification_handler = Arc::new(NotificationHandler::new(notify));

		Self {
			config,
			storage,
			store,
			validator,
			catalog,
			event_bus,
			notification_handler,
		}
	}

	/// Main execution loop for the engine.
	///
	/// Drives notification dispatch off the event bus and sweeps expired
	/// storage entries in the background until a shutdown signal.
	pub async fn run(&self) -> Result<(), EngineError> {
		// Subscribe to events
		let mut event_receiver = self.event_bus.subscribe();

		// Start storage cleanup task
		let storage = self.storage.clone();
		let cleanup_interval = tokio::time::interval(Duration::from_secs(
			self.config.storage.cleanup_interval_seconds,
		));
		let cleanup_handle = tokio::spawn(async move {
			let mut interval = cleanup_interval;
			loop {
				interval.tick().await;
				match storage.cleanup_expired().await {
					Ok(count) if count > 0 => {
						tracing::debug!("Storage cleanup: removed {} expired entries", count);
					}
					Err(e) => {
						tracing::warn!("Storage cleanup failed: {}", e);
					}
					_ => {} // No expired entries
				}
			}
		});

		let semaphore = Arc::new(Semaphore::new(
			self.config.engine.max_concurrent_notifications,
		));

		loop {
			tokio::select! {
				// Fan committed lifecycle events out to notifications
				Ok(event) = event_receiver.recv() => {
					self.spawn_handler(&semaphore, move |engine| async move {
						engine.notification_handler.handle(&event).await;
						Ok(())
					})
					.await;
				}

				// Shutdown signal
				_ = tokio::signal::ctrl_c() => {
					break;
				}
			}
		}

		cleanup_handle.abort(); // Stop the cleanup task

		Ok(())
	}

	/// Returns a reference to the event bus.
	pub fn event_bus(&self) -> &event_bus::EventBus {
		&self.event_bus
	}

	/// Returns a reference to the configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Returns a reference to the storage service.
	pub fn storage(&self) -> &Arc<StorageService> {
		&self.storage
	}

	/// Helper method to spawn handler tasks with semaphore-based
	/// concurrency control.
	async fn spawn_handler<F, Fut>(&self, semaphore: &Arc<Semaphore>, handler: F)
	where
		F: FnOnce(LifecycleEngine) -> Fut + Send + 'static,
		Fut: Future<Output = Result<(), EngineError>> + Send,
	{
		let engine = self.clone();
		match semaphore.clone().acquire_owned().await {
			Ok(permit) => {
				tokio::spawn(async move {
					let _permit = permit; // Keep permit alive for duration of task
					if let Err(e) = handler(engine).await {
						tracing::error!("Handler error: {}", e);
					}
				});
			}
			Err(e) => {
				tracing::error!("Failed to acquire semaphore permit: {}", e);
			}
		}
	}

	/// Read access differs from write access: shippers may inspect any
	/// order that is open for acceptance, and guests read through their
	/// checkout contact.
	async fn authorize_read(&self, actor: &Actor, order: &Order) -> Result<(), EngineError> {
		let allowed = match actor {
			Actor::User { id, role } => match role {
				Role::Admin => true,
				Role::Customer => order.customer_id.as_deref() == Some(id.as_str()),
				Role::Seller => {
					let owner = self
						.catalog
						.owner_of(&order.restaurant_id)
						.await
						.map_err(|err| EngineError::Service(err.to_string()))?;
					owner.as_deref() == Some(id.as_str())
				}
				Role::Shipper => {
					order.shipper_id.as_deref() == Some(id.as_str())
						|| order.status == OrderStatus::Ready
				}
			},
			Actor::Guest { contact } => order.contact_matches(contact),
		};
		if allowed {
			Ok(())
		} else {
			Err(TransitionError::Forbidden("You do not have access to this order".to_string()).into())
		}
	}
}

/// Translates store errors, attaching the order reference the caller
/// asked for to not-found results.
fn state_err(order_ref: &str, err: StateError) -> EngineError {
	match err {
		StateError::NotFound => EngineError::NotFound(order_ref.to_string()),
		StateError::Conflict => EngineError::Conflict,
		StateError::Storage(message) => EngineError::Storage(message),
	}
}
