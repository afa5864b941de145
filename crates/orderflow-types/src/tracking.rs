//! Tracking log entries and shipper location types.

use crate::{AddressSnapshot, OrderStatus};
use serde::{Deserialize, Serialize};

/// One immutable record in an order's tracking log.
///
/// An entry is appended for every accepted transition, plus one for
/// creation and one for each operations reassignment. Entries are never
/// edited or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingEntry {
	/// Status the order held after the change was applied.
	pub status: OrderStatus,
	/// Human-readable description of the change.
	pub message: String,
	/// Geo position, present on shipper-originated updates.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub latitude: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub longitude: Option<f64>,
	/// Unix seconds.
	pub created_at: u64,
}

/// Last reported position of a shipper.
///
/// Stored with a freshness TTL so a stale ping ages out instead of
/// drawing a courier who stopped reporting hours ago.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipperLocation {
	pub shipper_id: String,
	/// Order the ping was reported against, when the shipper sent one.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub order_id: Option<String>,
	pub latitude: f64,
	pub longitude: f64,
	/// Unix seconds.
	pub recorded_at: u64,
}

/// Tracking payload assembled for the tracking endpoints.
///
/// Both address snapshots are included so clients can draw the route;
/// the live location is attached only while the order is moving and the
/// last ping is still fresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingView {
	#[serde(rename = "orderNumber")]
	pub order_number: String,
	pub status: OrderStatus,
	#[serde(rename = "statusDisplay")]
	pub status_display: String,
	#[serde(rename = "shipperId", skip_serializing_if = "Option::is_none")]
	pub shipper_id: Option<String>,
	#[serde(rename = "currentLocation", skip_serializing_if = "Option::is_none")]
	pub current_location: Option<ShipperLocation>,
	pub pickup: AddressSnapshot,
	pub delivery: AddressSnapshot,
	pub history: Vec<TrackingEntry>,
}
