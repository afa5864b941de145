//! HTTP catalog implementation.
//!
//! Resolves restaurant ownership from an external catalog service via
//! `GET {base_url}/restaurants/{id}`, which returns a JSON body with an
//! `ownerId` field. A 404 from the catalog means the restaurant is
//! unknown, not an outage.

use crate::{CatalogError, CatalogInterface};
use async_trait::async_trait;
use orderflow_types::ImplementationRegistry;
use serde::Deserialize;
use std::time::Duration;

/// Response body returned by the catalog service.
#[derive(Debug, Deserialize)]
struct RestaurantInfo {
	#[serde(rename = "ownerId")]
	owner_id: String,
}

/// Catalog implementation backed by an external HTTP service.
pub struct HttpCatalog {
	client: reqwest::Client,
	base_url: String,
}

impl HttpCatalog {
	/// Creates a new HttpCatalog for the given service endpoint.
	pub fn new(base_url: String, timeout: Duration) -> Result<Self, CatalogError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| CatalogError::Configuration(e.to_string()))?;

		Ok(Self { client, base_url })
	}
}

#[async_trait]
impl CatalogInterface for HttpCatalog {
	async fn restaurant_owner(&self, restaurant_id: &str) -> Result<Option<String>, CatalogError> {
		let url = format!(
			"{}/restaurants/{}",
			self.base_url.trim_end_matches('/'),
			restaurant_id
		);

		let response = self
			.client
			.get(&url)
			.send()
			.await
			.map_err(|e| CatalogError::Unavailable(e.to_string()))?;

		if response.status() == reqwest::StatusCode::NOT_FOUND {
			return Ok(None);
		}
		if !response.status().is_success() {
			return Err(CatalogError::Unavailable(format!(
				"catalog returned {}",
				response.status()
			)));
		}

		let info: RestaurantInfo = response
			.json()
			.await
			.map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;

		Ok(Some(info.owner_id))
	}
}

/// Factory function to create an HTTP catalog implementation.
///
/// Configuration parameters:
/// - `base_url`: Catalog endpoint, must be http(s) (required)
/// - `timeout_seconds`: Request timeout (default: 5)
pub fn create_catalog(config: &toml::Value) -> Result<Box<dyn CatalogInterface>, CatalogError> {
	let base_url = config
		.get("base_url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| CatalogError::Configuration("base_url is required".into()))?;
	if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
		return Err(CatalogError::Configuration(
			"base_url must start with http:// or https://".into(),
		));
	}

	let timeout_seconds = match config.get("timeout_seconds") {
		None => 5,
		Some(value) => value
			.as_integer()
			.filter(|v| *v > 0)
			.ok_or_else(|| {
				CatalogError::Configuration("timeout_seconds must be a positive integer".into())
			})? as u64,
	};

	Ok(Box::new(HttpCatalog::new(
		base_url.to_string(),
		Duration::from_secs(timeout_seconds),
	)?))
}

/// Registry for the HTTP catalog implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "http";
	type Factory = crate::CatalogFactory;

	fn factory() -> Self::Factory {
		create_catalog
	}
}

impl crate::CatalogRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn factory_requires_base_url() {
		let config: toml::Value = toml::from_str("timeout_seconds = 5").unwrap();
		// `unwrap_err` would need `Box<dyn CatalogInterface>: Debug`.
		let Err(err) = create_catalog(&config) else {
			panic!("expected a missing base_url to fail")
		};
		assert!(matches!(err, CatalogError::Configuration(_)));
	}

	#[test]
	fn factory_rejects_bad_scheme() {
		let config: toml::Value = toml::from_str("base_url = \"catalog.example\"").unwrap();
		let Err(err) = create_catalog(&config) else {
			panic!("expected a bad scheme to fail")
		};
		assert!(matches!(err, CatalogError::Configuration(_)));
	}
}
