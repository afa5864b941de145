//! Catalog lookup module for the orderflow system.
//!
//! The engine gates seller actions on restaurant ownership: only the
//! user who owns the restaurant an order was placed with may act as its
//! seller. This crate provides the ownership lookup, backed either by a
//! static table or by an external catalog service.

use async_trait::async_trait;
use orderflow_types::ImplementationRegistry;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod http;
	pub mod static_table;
}

/// Errors that can occur during catalog lookups.
#[derive(Debug, Error)]
pub enum CatalogError {
	/// Error that occurs when the catalog service cannot be reached.
	#[error("Catalog unavailable: {0}")]
	Unavailable(String),
	/// Error that occurs when the catalog returns an unusable payload.
	#[error("Invalid catalog response: {0}")]
	InvalidResponse(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for catalog implementations.
#[async_trait]
pub trait CatalogInterface: Send + Sync {
	/// Returns the seller user id owning the given restaurant, or None
	/// when the restaurant is unknown.
	async fn restaurant_owner(&self, restaurant_id: &str) -> Result<Option<String>, CatalogError>;
}

/// Type alias for catalog factory functions.
pub type CatalogFactory = fn(&toml::Value) -> Result<Box<dyn CatalogInterface>, CatalogError>;

/// Registry trait for catalog implementations.
pub trait CatalogRegistry: ImplementationRegistry<Factory = CatalogFactory> {}

/// Get all registered catalog implementations.
///
/// Returns a vector of (name, factory) tuples for all available catalog
/// implementations, used by the binary to build its factory map.
pub fn get_all_implementations() -> Vec<(&'static str, CatalogFactory)> {
	use implementations::{http, static_table};

	vec![
		(http::Registry::NAME, http::Registry::factory()),
		(static_table::Registry::NAME, static_table::Registry::factory()),
	]
}

/// Service that manages restaurant ownership lookups.
pub struct CatalogService {
	/// The underlying catalog implementation.
	implementation: Box<dyn CatalogInterface>,
}

impl CatalogService {
	/// Creates a new CatalogService with the specified implementation.
	pub fn new(implementation: Box<dyn CatalogInterface>) -> Self {
		Self { implementation }
	}

	/// Returns the seller user id owning the given restaurant.
	pub async fn owner_of(&self, restaurant_id: &str) -> Result<Option<String>, CatalogError> {
		self.implementation.restaurant_owner(restaurant_id).await
	}
}
