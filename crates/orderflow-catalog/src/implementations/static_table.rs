//! Static table catalog implementation.
//!
//! Resolves restaurant ownership from a table in the configuration
//! file. Suitable for tests and small fixed deployments where the set
//! of restaurants is known up front.

use crate::{CatalogError, CatalogInterface};
use async_trait::async_trait;
use orderflow_types::ImplementationRegistry;
use std::collections::HashMap;

/// Catalog implementation backed by a configured restaurant table.
pub struct StaticCatalog {
	/// Restaurant id to owning seller user id.
	restaurants: HashMap<String, String>,
}

impl StaticCatalog {
	/// Creates a new StaticCatalog from an ownership table.
	pub fn new(restaurants: HashMap<String, String>) -> Self {
		Self { restaurants }
	}
}

#[async_trait]
impl CatalogInterface for StaticCatalog {
	async fn restaurant_owner(&self, restaurant_id: &str) -> Result<Option<String>, CatalogError> {
		Ok(self.restaurants.get(restaurant_id).cloned())
	}
}

/// Factory function to create a static catalog from configuration.
///
/// Configuration parameters:
/// - `restaurants`: Table mapping restaurant ids to seller user ids (required)
pub fn create_catalog(config: &toml::Value) -> Result<Box<dyn CatalogInterface>, CatalogError> {
	let table = config
		.get("restaurants")
		.and_then(|v| v.as_table())
		.ok_or_else(|| CatalogError::Configuration("restaurants table is required".into()))?;

	let mut restaurants = HashMap::new();
	for (restaurant_id, owner) in table {
		let owner = owner.as_str().ok_or_else(|| {
			CatalogError::Configuration(format!(
				"owner of restaurant '{}' must be a string",
				restaurant_id
			))
		})?;
		restaurants.insert(restaurant_id.clone(), owner.to_string());
	}

	Ok(Box::new(StaticCatalog::new(restaurants)))
}

/// Registry for the static catalog implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "static";
	type Factory = crate::CatalogFactory;

	fn factory() -> Self::Factory {
		create_catalog
	}
}

impl crate::CatalogRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn resolves_owners_from_config() {
		let config: toml::Value = toml::from_str(
			r#"
			[restaurants]
			rest-1 = "seller-1"
			rest-2 = "seller-2"
			"#,
		)
		.unwrap();
		let catalog = create_catalog(&config).unwrap();

		assert_eq!(
			catalog.restaurant_owner("rest-1").await.unwrap(),
			Some("seller-1".to_string())
		);
		assert_eq!(catalog.restaurant_owner("rest-9").await.unwrap(), None);
	}

	#[test]
	fn factory_requires_restaurants_table() {
		let config: toml::Value = toml::from_str("").unwrap();
		// `unwrap_err` would need `Box<dyn CatalogInterface>: Debug`.
		let Err(err) = create_catalog(&config) else {
			panic!("expected a missing restaurants table to fail")
		};
		assert!(matches!(err, CatalogError::Configuration(_)));

		let config: toml::Value = toml::from_str("[restaurants]\nrest-1 = 7").unwrap();
		let Err(err) = create_catalog(&config) else {
			panic!("expected a non-string owner to fail")
		};
		assert!(matches!(err, CatalogError::Configuration(_)));
	}
}
