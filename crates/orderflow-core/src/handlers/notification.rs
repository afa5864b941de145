//! Turns committed lifecycle events into participant notifications.
//!
//! The policy lives here, the delivery lives in the notify service.
//! Customers hear about the moments they care about (placed, delivered,
//! completed, any cancellation, a failed delivery, a collected cash
//! payment); a reassigned order alerts the newly assigned shipper.
//! Routine kitchen progress is visible through tracking instead of
//! being pushed.

use orderflow_notify::{Notification, NotifyService, Recipient};
use orderflow_types::{Order, OrderEvent, OrderStatus};
use std::sync::Arc;
use tracing::instrument;

/// Handler consuming lifecycle events off the bus.
pub struct NotificationHandler {
	notify: Arc<NotifyService>,
}

impl NotificationHandler {
	pub fn new(notify: Arc<NotifyService>) -> Self {
		Self { notify }
	}

	/// Dispatches every notification the event warrants. Per-channel
	/// failures are logged by the notify service and never surface.
	#[instrument(skip_all)]
	pub async fn handle(&self, event: &OrderEvent) {
		for notification in notifications_for(event) {
			self.notify.dispatch(&notification).await;
		}
	}
}

/// Maps one event to the notifications it produces.
fn notifications_for(event: &OrderEvent) -> Vec<Notification> {
	match event {
		OrderEvent::Created { order } => vec![to_customer(
			order,
			"Order placed",
			format!(
				"Your order {} has been placed and is waiting for the restaurant to confirm.",
				order.order_number
			),
		)],
		OrderEvent::Transitioned { order, .. } => status_notifications(order),
		OrderEvent::ShipperReassigned { order, .. } => match order.shipper_id.as_deref() {
			Some(shipper_id) => vec![Notification {
				recipient: Recipient::Shipper {
					id: shipper_id.to_string(),
				},
				title: "Order assigned to you".to_string(),
				body: format!(
					"Order {} was assigned to you by operations.",
					order.order_number
				),
				order_id: order.id.clone(),
				order_number: order.order_number.clone(),
			}],
			None => Vec::new(),
		},
		OrderEvent::PaymentCollected { order } => vec![to_customer(
			order,
			"Payment received",
			format!(
				"The cash payment for order {} has been collected.",
				order.order_number
			),
		)],
	}
}

/// Customer-facing notifications keyed off the status an order landed
/// on. Intermediate kitchen steps produce nothing.
fn status_notifications(order: &Order) -> Vec<Notification> {
	let (title, body) = match order.status {
		OrderStatus::Delivered => (
			"Order delivered",
			format!("Order {} has been delivered. Enjoy!", order.order_number),
		),
		OrderStatus::Completed => (
			"Order completed",
			format!(
				"Order {} is complete. Thank you for ordering.",
				order.order_number
			),
		),
		OrderStatus::CancelledByUser
		| OrderStatus::CancelledBySeller
		| OrderStatus::CancelledByShipper => (
			"Order cancelled",
			format!(
				"Order {} was cancelled ({}).",
				order.order_number,
				order.status.display_name().to_lowercase()
			),
		),
		OrderStatus::FailedDelivery => (
			"Delivery failed",
			format!(
				"The delivery attempt for order {} failed. Our team will follow up.",
				order.order_number
			),
		),
		_ => return Vec::new(),
	};
	vec![to_customer(order, title, body)]
}

fn to_customer(order: &Order, title: &str, body: String) -> Notification {
	Notification {
		recipient: Recipient::Customer {
			id: order.customer_id.clone(),
			email: order.customer_email.clone(),
		},
		title: title.to_string(),
		body,
		order_id: order.id.clone(),
		order_number: order.order_number.clone(),
	}
}
