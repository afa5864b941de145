//! Notification module for the orderflow system.
//!
//! Carries customer-visible updates (order placed, delivered,
//! cancelled) and participant alerts (new assignment for a shipper) out
//! of the engine. Dispatch is strictly best-effort: a failing channel
//! is logged and never affects the lifecycle change that triggered it.

use async_trait::async_trait;
use futures::future::join_all;
use orderflow_types::ImplementationRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod log;
	pub mod webhook;
}

/// Errors that can occur during notification delivery.
#[derive(Debug, Error)]
pub enum NotifyError {
	/// Error that occurs when a channel fails to deliver.
	#[error("Delivery failed: {0}")]
	DeliveryFailed(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Participant a notification is addressed to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Recipient {
	/// The buyer, addressed by account id and/or checkout email.
	Customer {
		#[serde(skip_serializing_if = "Option::is_none")]
		id: Option<String>,
		#[serde(skip_serializing_if = "Option::is_none")]
		email: Option<String>,
	},
	/// The restaurant owner.
	Seller { id: String },
	/// The courier.
	Shipper { id: String },
}

impl fmt::Display for Recipient {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Recipient::Customer { id: Some(id), .. } => write!(f, "customer {}", id),
			Recipient::Customer {
				email: Some(email), ..
			} => write!(f, "guest {}", email),
			Recipient::Customer { .. } => write!(f, "customer"),
			Recipient::Seller { id } => write!(f, "seller {}", id),
			Recipient::Shipper { id } => write!(f, "shipper {}", id),
		}
	}
}

/// A message addressed to one marketplace participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
	pub recipient: Recipient,
	/// Short headline, e.g. "Order delivered".
	pub title: String,
	/// Full message body.
	pub body: String,
	#[serde(rename = "orderId")]
	pub order_id: String,
	#[serde(rename = "orderNumber")]
	pub order_number: String,
}

/// Trait defining the interface for notification channels.
#[async_trait]
pub trait NotifyInterface: Send + Sync {
	/// Channel name used in logs.
	fn name(&self) -> &'static str;

	/// Delivers one notification.
	async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Type alias for notification channel factory functions.
pub type NotifyFactory = fn(&toml::Value) -> Result<Box<dyn NotifyInterface>, NotifyError>;

/// Registry trait for notification channel implementations.
pub trait NotifyRegistry: ImplementationRegistry<Factory = NotifyFactory> {}

/// Get all registered notification channel implementations.
///
/// Returns a vector of (name, factory) tuples for all available
/// channels, used by the binary to build its factory map.
pub fn get_all_implementations() -> Vec<(&'static str, NotifyFactory)> {
	use implementations::{log, webhook};

	vec![
		(log::Registry::NAME, log::Registry::factory()),
		(webhook::Registry::NAME, webhook::Registry::factory()),
	]
}

/// Service that fans notifications out to every configured channel.
///
/// Unlike the other services this one holds all implementations rather
/// than a single primary: each notification goes to each channel, and
/// per-channel failures are logged without affecting the others.
pub struct NotifyService {
	channels: Vec<Box<dyn NotifyInterface>>,
}

impl NotifyService {
	/// Creates a new NotifyService with the specified channels.
	pub fn new(channels: Vec<Box<dyn NotifyInterface>>) -> Self {
		Self { channels }
	}

	/// Delivers a notification through every channel.
	///
	/// Failures are logged per channel; this method never errors.
	pub async fn dispatch(&self, notification: &Notification) {
		let deliveries = self
			.channels
			.iter()
			.map(|channel| async move {
				if let Err(e) = channel.deliver(notification).await {
					tracing::warn!(
						channel = channel.name(),
						recipient = %notification.recipient,
						order_id = %notification.order_id,
						error = %e,
						"Notification delivery failed"
					);
				}
			});
		join_all(deliveries).await;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Arc;
	use tokio::sync::Mutex;

	struct RecordingChannel {
		delivered: Arc<Mutex<Vec<String>>>,
	}

	#[async_trait]
	impl NotifyInterface for RecordingChannel {
		fn name(&self) -> &'static str {
			"recording"
		}

		async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
			self.delivered.lock().await.push(notification.title.clone());
			Ok(())
		}
	}

	struct FailingChannel;

	#[async_trait]
	impl NotifyInterface for FailingChannel {
		fn name(&self) -> &'static str {
			"failing"
		}

		async fn deliver(&self, _notification: &Notification) -> Result<(), NotifyError> {
			Err(NotifyError::DeliveryFailed("smtp down".into()))
		}
	}

	fn sample_notification() -> Notification {
		Notification {
			recipient: Recipient::Seller {
				id: "seller-1".to_string(),
			},
			title: "New order".to_string(),
			body: "Order FD-1 is waiting for confirmation".to_string(),
			order_id: "o-1".to_string(),
			order_number: "FD-1".to_string(),
		}
	}

	#[tokio::test]
	async fn dispatch_reaches_all_channels() {
		let delivered = Arc::new(Mutex::new(Vec::new()));
		let service = NotifyService::new(vec![
			Box::new(RecordingChannel {
				delivered: delivered.clone(),
			}),
			Box::new(RecordingChannel {
				delivered: delivered.clone(),
			}),
		]);

		service.dispatch(&sample_notification()).await;
		assert_eq!(delivered.lock().await.len(), 2);
	}

	#[tokio::test]
	async fn failing_channel_does_not_block_others() {
		let delivered = Arc::new(Mutex::new(Vec::new()));
		let service = NotifyService::new(vec![
			Box::new(FailingChannel),
			Box::new(RecordingChannel {
				delivered: delivered.clone(),
			}),
		]);

		service.dispatch(&sample_notification()).await;
		assert_eq!(delivered.lock().await.len(), 1);
	}

	#[test]
	fn recipient_display() {
		let guest = Recipient::Customer {
			id: None,
			email: Some("g@example.com".to_string()),
		};
		assert_eq!(guest.to_string(), "guest g@example.com");
		let shipper = Recipient::Shipper {
			id: "s-1".to_string(),
		};
		assert_eq!(shipper.to_string(), "shipper s-1");
	}
}
