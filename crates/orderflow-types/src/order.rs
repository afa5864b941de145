//! Order entity, address snapshots and role-keyed projections.

use crate::{OrderStatus, PaymentMethod, PaymentStatus, Role, TrackingEntry};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Address and contact details captured when the order is created.
///
/// Snapshots are copies, not references. Later edits to a restaurant or
/// customer profile never change what a historical order displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressSnapshot {
	pub address: String,
	pub phone: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub latitude: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub longitude: Option<f64>,
}

/// One customer purchase from a single restaurant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
	/// Internal identifier, never shown to guests.
	pub id: String,
	/// Externally shareable number used for guest tracking.
	pub order_number: String,
	/// Customer account, absent for guest checkouts.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub customer_id: Option<String>,
	/// Contact email snapshot. For guest orders this is the only handle
	/// the customer side has on the order.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub customer_email: Option<String>,
	/// Name supplied with a guest checkout.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub guest_name: Option<String>,
	/// Restaurant the order was placed with.
	pub restaurant_id: String,
	/// Courier, set by the ready -> assigned transition or by an
	/// operations reassignment.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub shipper_id: Option<String>,
	pub status: OrderStatus,
	pub payment_method: PaymentMethod,
	pub payment_status: PaymentStatus,
	/// Restaurant-side address snapshot.
	pub pickup: AddressSnapshot,
	/// Customer-side address snapshot.
	pub delivery: AddressSnapshot,
	pub subtotal: Decimal,
	pub delivery_fee: Decimal,
	pub discount: Decimal,
	/// Always equals subtotal + delivery_fee - discount.
	pub total: Decimal,
	/// Unix seconds.
	pub created_at: u64,
	/// Unix seconds, bumped on every accepted transition.
	pub updated_at: u64,
	/// Unix seconds, stamped once when the shipper marks delivery.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delivered_at: Option<u64>,
}

impl Order {
	/// Checks the monetary invariant the engine maintains on creation.
	pub fn totals_consistent(&self) -> bool {
		self.total == self.subtotal + self.delivery_fee - self.discount
	}

	/// Matches a guest-supplied contact against the stored snapshots.
	/// The email snapshot (case-insensitive) or the delivery phone both
	/// qualify.
	pub fn contact_matches(&self, contact: &str) -> bool {
		let contact = contact.trim();
		if contact.is_empty() {
			return false;
		}
		self.customer_email
			.as_deref()
			.is_some_and(|email| email.eq_ignore_ascii_case(contact))
			|| self.delivery.phone == contact
	}
}

/// Persisted aggregate: the order plus its append-only tracking log.
///
/// The log lives inside the same record so that a status change and its
/// log entry commit in one conditional write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
	pub order: Order,
	pub tracking: Vec<TrackingEntry>,
}

impl OrderRecord {
	/// Wraps a freshly created order with its opening log entry.
	pub fn new(order: Order, opening_entry: TrackingEntry) -> Self {
		Self {
			order,
			tracking: vec![opening_entry],
		}
	}
}

/// Role-projected order representation returned by the read APIs.
///
/// Projections differ by viewer: customers and guests never receive the
/// restaurant-side pickup snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderView {
	pub id: String,
	#[serde(rename = "orderNumber")]
	pub order_number: String,
	pub status: OrderStatus,
	#[serde(rename = "statusDisplay")]
	pub status_display: String,
	#[serde(rename = "restaurantId")]
	pub restaurant_id: String,
	#[serde(rename = "customerId", skip_serializing_if = "Option::is_none")]
	pub customer_id: Option<String>,
	#[serde(rename = "guestName", skip_serializing_if = "Option::is_none")]
	pub guest_name: Option<String>,
	#[serde(rename = "shipperId", skip_serializing_if = "Option::is_none")]
	pub shipper_id: Option<String>,
	#[serde(rename = "paymentMethod")]
	pub payment_method: PaymentMethod,
	#[serde(rename = "paymentStatus")]
	pub payment_status: PaymentStatus,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub pickup: Option<AddressSnapshot>,
	pub delivery: AddressSnapshot,
	pub subtotal: Decimal,
	#[serde(rename = "deliveryFee")]
	pub delivery_fee: Decimal,
	pub discount: Decimal,
	pub total: Decimal,
	#[serde(rename = "createdAt")]
	pub created_at: u64,
	#[serde(rename = "updatedAt")]
	pub updated_at: u64,
	#[serde(rename = "deliveredAt", skip_serializing_if = "Option::is_none")]
	pub delivered_at: Option<u64>,
}

impl OrderView {
	/// Projects an order for the given viewer role.
	pub fn project(order: &Order, viewer: Role) -> Self {
		let pickup = match viewer {
			Role::Customer => None,
			Role::Seller | Role::Shipper | Role::Admin => Some(order.pickup.clone()),
		};
		Self {
			id: order.id.clone(),
			order_number: order.order_number.clone(),
			status: order.status,
			status_display: order.status.display_name().to_string(),
			restaurant_id: order.restaurant_id.clone(),
			customer_id: order.customer_id.clone(),
			guest_name: order.guest_name.clone(),
			shipper_id: order.shipper_id.clone(),
			payment_method: order.payment_method,
			payment_status: order.payment_status,
			pickup,
			delivery: order.delivery.clone(),
			subtotal: order.subtotal,
			delivery_fee: order.delivery_fee,
			discount: order.discount,
			total: order.total,
			created_at: order.created_at,
			updated_at: order.updated_at,
			delivered_at: order.delivered_at,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_order() -> Order {
		Order {
			id: "11111111-2222-3333-4444-555555555555".to_string(),
			order_number: "FD1A2B3C4D".to_string(),
			customer_id: Some("cust-1".to_string()),
			customer_email: Some("Ana@Example.com".to_string()),
			guest_name: None,
			restaurant_id: "rest-1".to_string(),
			shipper_id: None,
			status: OrderStatus::Pending,
			payment_method: PaymentMethod::Cash,
			payment_status: PaymentStatus::Unpaid,
			pickup: AddressSnapshot {
				address: "1 Kitchen Way".to_string(),
				phone: "555-0100".to_string(),
				latitude: Some(10.76),
				longitude: Some(106.66),
			},
			delivery: AddressSnapshot {
				address: "9 Home St".to_string(),
				phone: "555-0199".to_string(),
				latitude: None,
				longitude: None,
			},
			subtotal: Decimal::new(4250, 2),
			delivery_fee: Decimal::new(300, 2),
			discount: Decimal::new(50, 2),
			total: Decimal::new(4500, 2),
			created_at: 1_700_000_000,
			updated_at: 1_700_000_000,
			delivered_at: None,
		}
	}

	#[test]
	fn totals_invariant() {
		let mut order = sample_order();
		assert!(order.totals_consistent());
		order.total = Decimal::new(4600, 2);
		assert!(!order.totals_consistent());
	}

	#[test]
	fn contact_matching() {
		let order = sample_order();
		assert!(order.contact_matches("ana@example.com"));
		assert!(order.contact_matches("  Ana@Example.com "));
		assert!(order.contact_matches("555-0199"));
		assert!(!order.contact_matches("555-0100"));
		assert!(!order.contact_matches(""));
		assert!(!order.contact_matches("other@example.com"));
	}

	#[test]
	fn customer_projection_hides_pickup() {
		let order = sample_order();
		let view = OrderView::project(&order, Role::Customer);
		assert!(view.pickup.is_none());
		let view = OrderView::project(&order, Role::Shipper);
		assert_eq!(view.pickup, Some(order.pickup.clone()));
	}

	#[test]
	fn view_serializes_camel_case() {
		let order = sample_order();
		let view = OrderView::project(&order, Role::Admin);
		let value = serde_json::to_value(&view).unwrap();
		assert_eq!(value["orderNumber"], "FD1A2B3C4D");
		assert_eq!(value["statusDisplay"], "Pending confirmation");
		assert_eq!(value["paymentMethod"], "cash");
		assert!(value.get("deliveredAt").is_none());
	}
}
