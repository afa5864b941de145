//! Shared fixtures for engine tests: an engine wired to in-memory
//! implementations, canonical actors, and drivers that walk an order to
//! a given point in the lifecycle.

use crate::engine::event_bus::EventBus;
use crate::engine::{LifecycleEngine, TransitionContext};
use orderflow_catalog::implementations::static_table::StaticCatalog;
use orderflow_catalog::CatalogService;
use orderflow_config::Config;
use orderflow_notify::implementations::log::LogNotifier;
use orderflow_notify::NotifyService;
use orderflow_payment::implementations::snapshot::SnapshotPayment;
use orderflow_payment::PaymentService;
use orderflow_storage::implementations::memory::MemoryStorage;
use orderflow_storage::StorageService;
use orderflow_types::{
	Action, Actor, AddressSnapshot, CreateOrderRequest, Order, OrderRecord, OrderStatus,
	PaymentMethod, PaymentStatus, Role,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) const SELLER: &str = "seller-1";
pub(crate) const CUSTOMER: &str = "cust-1";
pub(crate) const SHIPPER: &str = "ship-1";

pub(crate) fn test_config() -> Config {
	r#"
	[engine]
	id = "orderflow-test"
	location_ttl_seconds = 1

	[storage]
	primary = "memory"
	cleanup_interval_seconds = 60

	[storage.implementations.memory]

	[payment]
	primary = "snapshot"

	[payment.implementations.snapshot]

	[catalog]
	primary = "static"

	[catalog.implementations.static]
	restaurants = { "rest-1" = "seller-1" }

	[notify]

	[notify.implementations.log]
	"#
	.parse()
	.expect("test config must parse")
}

/// Engine over in-memory implementations, matching `test_config`.
pub(crate) fn engine() -> LifecycleEngine {
	let mut restaurants = HashMap::new();
	restaurants.insert("rest-1".to_string(), SELLER.to_string());
	LifecycleEngine::new(
		test_config(),
		Arc::new(StorageService::new(Box::new(MemoryStorage::new()))),
		Arc::new(PaymentService::new(Box::new(SnapshotPayment))),
		Arc::new(CatalogService::new(Box::new(StaticCatalog::new(
			restaurants,
		)))),
		Arc::new(NotifyService::new(vec![Box::new(LogNotifier)])),
		EventBus::new(64),
	)
}

pub(crate) fn seller() -> Actor {
	Actor::user(SELLER, Role::Seller)
}

pub(crate) fn customer() -> Actor {
	Actor::user(CUSTOMER, Role::Customer)
}

pub(crate) fn shipper() -> Actor {
	Actor::user(SHIPPER, Role::Shipper)
}

pub(crate) fn admin() -> Actor {
	Actor::user("ops-1", Role::Admin)
}

pub(crate) fn create_request() -> CreateOrderRequest {
	CreateOrderRequest {
		customer_id: Some(CUSTOMER.to_string()),
		customer_email: Some("ana@example.com".to_string()),
		guest_name: None,
		restaurant_id: "rest-1".to_string(),
		payment_method: PaymentMethod::Cash,
		pickup: AddressSnapshot {
			address: "1 Kitchen Way".to_string(),
			phone: "555-0100".to_string(),
			latitude: Some(10.7624),
			longitude: Some(106.6602),
		},
		delivery: AddressSnapshot {
			address: "9 Home St".to_string(),
			phone: "555-0199".to_string(),
			latitude: Some(10.7721),
			longitude: Some(106.6983),
		},
		subtotal: Decimal::new(4250, 2),
		delivery_fee: Decimal::new(300, 2),
		discount: Decimal::new(50, 2),
	}
}

/// Creates an order and walks it along the normal path until it reaches
/// `target`.
pub(crate) async fn order_in_status(
	engine: &LifecycleEngine,
	target: OrderStatus,
) -> OrderRecord {
	let mut record = engine.create_order(create_request()).await.unwrap();
	let steps = [
		(seller(), Action::Confirm),
		(seller(), Action::StartPreparing),
		(seller(), Action::MarkReady),
		(shipper(), Action::Accept),
		(shipper(), Action::PickUp),
		(shipper(), Action::StartDelivering),
		(shipper(), Action::Deliver),
		(customer(), Action::Complete),
	];
	for (actor, action) in steps {
		if record.order.status == target {
			break;
		}
		let order_id = record.order.id.clone();
		record = engine
			.apply_transition(&actor, &order_id, action, TransitionContext::default())
			.await
			.unwrap();
	}
	assert_eq!(record.order.status, target);
	record
}

/// Simulates an upstream checkout webhook settling an online payment.
pub(crate) async fn settle_payment(engine: &LifecycleEngine, order_id: &str) {
	let (mut record, version) = engine.store.load(order_id).await.unwrap();
	record.order.payment_status = PaymentStatus::Paid;
	engine.store.commit(&record, version).await.unwrap();
}

/// Standalone order for tests that never touch storage.
pub(crate) fn sample_order(status: OrderStatus) -> Order {
	Order {
		id: "11111111-2222-3333-4444-555555555555".to_string(),
		order_number: "FD1A2B3C4D".to_string(),
		customer_id: Some(CUSTOMER.to_string()),
		customer_email: Some("ana@example.com".to_string()),
		guest_name: None,
		restaurant_id: "rest-1".to_string(),
		shipper_id: None,
		status,
		payment_method: PaymentMethod::Cash,
		payment_status: PaymentStatus::Unpaid,
		pickup: AddressSnapshot {
			address: "1 Kitchen Way".to_string(),
			phone: "555-0100".to_string(),
			latitude: Some(10.7624),
			longitude: Some(106.6602),
		},
		delivery: AddressSnapshot {
			address: "9 Home St".to_string(),
			phone: "555-0199".to_string(),
			latitude: Some(10.7721),
			longitude: Some(106.6983),
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
