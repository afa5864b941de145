//! Payment readiness module for the orderflow system.
//!
//! The lifecycle engine refuses to let a restaurant confirm an online
//! order whose payment has not settled. This crate provides the
//! abstraction that answers "has this order been paid?", with
//! implementations that either trust the payment status snapshot on the
//! order or ask an external payment provider.

use async_trait::async_trait;
use orderflow_types::{ImplementationRegistry, Order};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod http;
	pub mod snapshot;
}

/// Errors that can occur during payment lookups.
#[derive(Debug, Error)]
pub enum PaymentError {
	/// Error that occurs when the payment provider cannot be reached.
	#[error("Provider unavailable: {0}")]
	ProviderUnavailable(String),
	/// Error that occurs when the provider returns an unusable payload.
	#[error("Invalid provider response: {0}")]
	InvalidResponse(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for payment implementations.
///
/// Implementations answer whether an order's payment has settled. They
/// never mutate the order; recording a settlement is the engine's job.
#[async_trait]
pub trait PaymentInterface: Send + Sync {
	/// Returns true when the payment for this order has settled.
	async fn is_paid(&self, order: &Order) -> Result<bool, PaymentError>;
}

/// Type alias for payment factory functions.
///
/// This is the function signature every payment implementation provides
/// to create instances of its payment interface.
pub type PaymentFactory = fn(&toml::Value) -> Result<Box<dyn PaymentInterface>, PaymentError>;

/// Registry trait for payment implementations.
pub trait PaymentRegistry: ImplementationRegistry<Factory = PaymentFactory> {}

/// Get all registered payment implementations.
///
/// Returns a vector of (name, factory) tuples for all available payment
/// implementations, used by the binary to build its factory map.
pub fn get_all_implementations() -> Vec<(&'static str, PaymentFactory)> {
	use implementations::{http, snapshot};

	vec![
		(http::Registry::NAME, http::Registry::factory()),
		(snapshot::Registry::NAME, snapshot::Registry::factory()),
	]
}

/// Service that manages payment readiness lookups.
///
/// Wraps an underlying payment implementation and provides the
/// high-level interface the transition validator calls.
pub struct PaymentService {
	/// The underlying payment implementation.
	implementation: Box<dyn PaymentInterface>,
}

impl PaymentService {
	/// Creates a new PaymentService with the specified implementation.
	pub fn new(implementation: Box<dyn PaymentInterface>) -> Self {
		Self { implementation }
	}

	/// Returns true when the payment for this order has settled.
	pub async fn is_paid(&self, order: &Order) -> Result<bool, PaymentError> {
		self.implementation.is_paid(order).await
	}
}
