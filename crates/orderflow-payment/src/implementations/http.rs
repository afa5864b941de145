//! HTTP payment provider implementation.
//!
//! Asks an external payment provider for the settlement state of an
//! order. The provider exposes `GET {base_url}/payments/{order_id}`
//! returning a JSON body with a `status` field; `"paid"` means settled.

use crate::{PaymentError, PaymentInterface};
use async_trait::async_trait;
use orderflow_types::{ImplementationRegistry, Order};
use serde::Deserialize;
use std::time::Duration;

/// Response body returned by the payment provider.
#[derive(Debug, Deserialize)]
struct ProviderStatus {
	status: String,
}

/// Payment implementation backed by an external HTTP provider.
pub struct HttpPayment {
	client: reqwest::Client,
	base_url: String,
	api_key: Option<String>,
}

impl HttpPayment {
	/// Creates a new HttpPayment for the given provider endpoint.
	pub fn new(
		base_url: String,
		api_key: Option<String>,
		timeout: Duration,
	) -> Result<Self, PaymentError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| PaymentError::Configuration(e.to_string()))?;

		Ok(Self {
			client,
			base_url,
			api_key,
		})
	}
}

#[async_trait]
impl PaymentInterface for HttpPayment {
	async fn is_paid(&self, order: &Order) -> Result<bool, PaymentError> {
		let url = format!("{}/payments/{}", self.base_url.trim_end_matches('/'), order.id);

		let mut request = self.client.get(&url);
		if let Some(key) = &self.api_key {
			request = request.bearer_auth(key);
		}

		let response = request
			.send()
			.await
			.map_err(|e| PaymentError::ProviderUnavailable(e.to_string()))?;

		// No payment record yet means not settled, not an outage.
		if response.status() == reqwest::StatusCode::NOT_FOUND {
			return Ok(false);
		}
		if !response.status().is_success() {
			return Err(PaymentError::ProviderUnavailable(format!(
				"provider returned {}",
				response.status()
			)));
		}

		let body: ProviderStatus = response
			.json()
			.await
			.map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;

		Ok(body.status == "paid")
	}
}

/// Factory function to create an HTTP payment implementation.
///
/// Configuration parameters:
/// - `base_url`: Provider endpoint, must be http(s) (required)
/// - `api_key`: Bearer token sent with every request (optional)
/// - `timeout_seconds`: Request timeout (default: 5)
pub fn create_payment(config: &toml::Value) -> Result<Box<dyn PaymentInterface>, PaymentError> {
	let base_url = config
		.get("base_url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| PaymentError::Configuration("base_url is required".into()))?;
	if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
		return Err(PaymentError::Configuration(
			"base_url must start with http:// or https://".into(),
		));
	}

	let api_key = match config.get("api_key") {
		None => None,
		Some(value) => Some(
			value
				.as_str()
				.ok_or_else(|| PaymentError::Configuration("api_key must be a string".into()))?
				.to_string(),
		),
	};

	let timeout_seconds = match config.get("timeout_seconds") {
		None => 5,
		Some(value) => value
			.as_integer()
			.filter(|v| *v > 0)
			.ok_or_else(|| {
				PaymentError::Configuration("timeout_seconds must be a positive integer".into())
			})? as u64,
	};

	Ok(Box::new(HttpPayment::new(
		base_url.to_string(),
		api_key,
		Duration::from_secs(timeout_seconds),
	)?))
}

/// Registry for the HTTP payment implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "http";
	type Factory = crate::PaymentFactory;

	fn factory() -> Self::Factory {
		create_payment
	}
}

impl crate::PaymentRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn factory_requires_base_url() {
		let config: toml::Value = toml::from_str("api_key = \"k\"").unwrap();
		// `unwrap_err` would need `Box<dyn PaymentInterface>: Debug`.
		let Err(err) = create_payment(&config) else {
			panic!("expected a missing base_url to fail")
		};
		assert!(matches!(err, PaymentError::Configuration(_)));
	}

	#[test]
	fn factory_rejects_bad_scheme() {
		let config: toml::Value = toml::from_str("base_url = \"ftp://pay.example\"").unwrap();
		let Err(err) = create_payment(&config) else {
			panic!("expected a bad scheme to fail")
		};
		assert!(matches!(err, PaymentError::Configuration(_)));
	}

	#[test]
	fn factory_rejects_bad_timeout() {
		let config: toml::Value =
			toml::from_str("base_url = \"https://pay.example\"\ntimeout_seconds = 0").unwrap();
		let Err(err) = create_payment(&config) else {
			panic!("expected a zero timeout to fail")
		};
		assert!(matches!(err, PaymentError::Configuration(_)));
	}

	#[test]
	fn factory_accepts_minimal_config() {
		let config: toml::Value = toml::from_str("base_url = \"https://pay.example\"").unwrap();
		assert!(create_payment(&config).is_ok());
	}
}
