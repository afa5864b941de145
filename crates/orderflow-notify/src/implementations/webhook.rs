//! Webhook notification channel.
//!
//! POSTs each notification as JSON to a configured endpoint, typically
//! a messaging gateway that turns it into email or push. Non-2xx
//! responses count as delivery failures; retrying is left to the
//! receiving gateway since the engine treats dispatch as best-effort.

use crate::{Notification, NotifyError, NotifyInterface};
use async_trait::async_trait;
use orderflow_types::ImplementationRegistry;
use std::time::Duration;

/// Notification channel that forwards to an HTTP endpoint.
pub struct WebhookNotifier {
	client: reqwest::Client,
	endpoint: String,
	auth_token: Option<String>,
}

impl WebhookNotifier {
	/// Creates a new WebhookNotifier for the given endpoint.
	pub fn new(
		endpoint: String,
		auth_token: Option<String>,
		timeout: Duration,
	) -> Result<Self, NotifyError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| NotifyError::Configuration(e.to_string()))?;

		Ok(Self {
			client,
			endpoint,
			auth_token,
		})
	}
}

#[async_trait]
impl NotifyInterface for WebhookNotifier {
	fn name(&self) -> &'static str {
		"webhook"
	}

	async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
		let mut request = self.client.post(&self.endpoint).json(notification);
		if let Some(token) = &self.auth_token {
			request = request.bearer_auth(token);
		}

		let response = request
			.send()
			.await
			.map_err(|e| NotifyError::DeliveryFailed(e.to_string()))?;

		if !response.status().is_success() {
			return Err(NotifyError::DeliveryFailed(format!(
				"webhook returned {}",
				response.status()
			)));
		}

		Ok(())
	}
}

/// Factory function to create a webhook notification channel.
///
/// Configuration parameters:
/// - `endpoint`: URL to POST notifications to, must be http(s) (required)
/// - `auth_token`: Bearer token sent with every request (optional)
/// - `timeout_seconds`: Request timeout (default: 5)
pub fn create_notifier(config: &toml::Value) -> Result<Box<dyn NotifyInterface>, NotifyError> {
	let endpoint = config
		.get("endpoint")
		.and_then(|v| v.as_str())
		.ok_or_else(|| NotifyError::Configuration("endpoint is required".into()))?;
	if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
		return Err(NotifyError::Configuration(
			"endpoint must start with http:// or https://".into(),
		));
	}

	let auth_token = match config.get("auth_token") {
		None => None,
		Some(value) => Some(
			value
				.as_str()
				.ok_or_else(|| NotifyError::Configuration("auth_token must be a string".into()))?
				.to_string(),
		),
	};

	let timeout_seconds = match config.get("timeout_seconds") {
		None => 5,
		Some(value) => value
			.as_integer()
			.filter(|v| *v > 0)
			.ok_or_else(|| {
				NotifyError::Configuration("timeout_seconds must be a positive integer".into())
			})? as u64,
	};

	Ok(Box::new(WebhookNotifier::new(
		endpoint.to_string(),
		auth_token,
		Duration::from_secs(timeout_seconds),
	)?))
}

/// Registry for the webhook notification channel.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "webhook";
	type Factory = crate::NotifyFactory;

	fn factory() -> Self::Factory {
		create_notifier
	}
}

impl crate::NotifyRegistry for Registry {}
