//! Log notification channel.
//!
//! Writes every notification to the structured log instead of an
//! external system. Useful in development and as an always-on audit
//! channel alongside a real one.

use crate::{Notification, NotifyError, NotifyInterface};
use async_trait::async_trait;
use orderflow_types::ImplementationRegistry;

/// Notification channel that logs instead of sending.
pub struct LogNotifier;

#[async_trait]
impl NotifyInterface for LogNotifier {
	fn name(&self) -> &'static str {
		"log"
	}

	async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
		tracing::info!(
			component = "notify",
			recipient = %notification.recipient,
			order_number = %notification.order_number,
			title = %notification.title,
			body = %notification.body,
			"Notification"
		);
		Ok(())
	}
}

/// Factory function to create a log notification channel.
///
/// Configuration parameters:
/// - None required
pub fn create_notifier(_config: &toml::Value) -> Result<Box<dyn NotifyInterface>, NotifyError> {
	Ok(Box::new(LogNotifier))
}

/// Registry for the log notification channel.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "log";
	type Factory = crate::NotifyFactory;

	fn factory() -> Self::Factory {
		create_notifier
	}
}

impl crate::NotifyRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Recipient;

	#[tokio::test]
	async fn always_delivers() {
		let notifier = LogNotifier;
		let notification = Notification {
			recipient: Recipient::Customer {
				id: Some("c-1".to_string()),
				email: None,
			},
			title: "Order completed".to_string(),
			body: "Thanks for confirming delivery".to_string(),
			order_id: "o-1".to_string(),
			order_number: "FD-1".to_string(),
		};
		assert!(notifier.deliver(&notification).await.is_ok());
	}
}
