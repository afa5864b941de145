//! Snapshot-based payment implementation.
//!
//! Trusts the payment status stored on the order itself. Suitable when
//! an upstream checkout flow already writes settlement results into the
//! order record before it reaches this engine.

use crate::{PaymentError, PaymentInterface};
use async_trait::async_trait;
use orderflow_types::{ImplementationRegistry, Order, PaymentStatus};

/// Payment implementation backed by the order's own payment status.
pub struct SnapshotPayment;

#[async_trait]
impl PaymentInterface for SnapshotPayment {
	async fn is_paid(&self, order: &Order) -> Result<bool, PaymentError> {
		Ok(order.payment_status == PaymentStatus::Paid)
	}
}

/// Factory function to create a snapshot payment implementation.
///
/// Configuration parameters:
/// - None required
pub fn create_payment(_config: &toml::Value) -> Result<Box<dyn PaymentInterface>, PaymentError> {
	Ok(Box::new(SnapshotPayment))
}

/// Registry for the snapshot payment implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "snapshot";
	type Factory = crate::PaymentFactory;

	fn factory() -> Self::Factory {
		create_payment
	}
}

impl crate::PaymentRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use orderflow_types::{AddressSnapshot, OrderStatus, PaymentMethod};
	use rust_decimal::Decimal;

	fn order_with(status: PaymentStatus) -> Order {
		Order {
			id: "o-1".to_string(),
			order_number: "FD-1".to_string(),
			customer_id: Some("c-1".to_string()),
			customer_email: None,
			guest_name: None,
			restaurant_id: "r-1".to_string(),
			shipper_id: None,
			status: OrderStatus::Pending,
			payment_method: PaymentMethod::Online,
			payment_status: status,
			pickup: AddressSnapshot {
				address: "a".to_string(),
				phone: "p".to_string(),
				latitude: None,
				longitude: None,
			},
			delivery: AddressSnapshot {
				address: "b".to_string(),
				phone: "q".to_string(),
				latitude: None,
				longitude: None,
			},
			subtotal: Decimal::new(1000, 2),
			delivery_fee: Decimal::ZERO,
			discount: Decimal::ZERO,
			total: Decimal::new(1000, 2),
			created_at: 0,
			updated_at: 0,
			delivered_at: None,
		}
	}

	#[tokio::test]
	async fn reflects_order_snapshot() {
		let payment = SnapshotPayment;
		assert!(payment.is_paid(&order_with(PaymentStatus::Paid)).await.unwrap());
		assert!(!payment.is_paid(&order_with(PaymentStatus::Unpaid)).await.unwrap());
		assert!(!payment.is_paid(&order_with(PaymentStatus::Pending)).await.unwrap());
		assert!(!payment.is_paid(&order_with(PaymentStatus::Failed)).await.unwrap());
	}
}
