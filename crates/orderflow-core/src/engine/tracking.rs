//! Tracking reads and shipper location reporting.
//!
//! Tracking views bundle the order's progress log with both address
//! snapshots and, while the order is actually moving, the shipper's
//! last fresh position. Positions are stored with a TTL, so freshness
//! is enforced by the storage layer rather than by filtering here.

use super::{state_err, EngineError, LifecycleEngine};
use crate::lifecycle::TransitionError;
use crate::utils::{truncate_id, unix_timestamp};
use orderflow_types::{
	Actor, Order, OrderRecord, OrderStatus, Role, ShipperLocation, TrackingView,
};
use std::time::Duration;
use tracing::instrument;

impl LifecycleEngine {
	/// Tracking payload for an authenticated viewer.
	pub async fn track_order(
		&self,
		actor: &Actor,
		order_id: &str,
	) -> Result<TrackingView, EngineError> {
		let (record, _) = self
			.store
			.load(order_id)
			.await
			.map_err(|err| state_err(order_id, err))?;
		self.authorize_read(actor, &record.order).await?;
		self.build_tracking_view(record).await
	}

	/// Tracking payload for a guest holding the shareable order number.
	///
	/// A wrong contact is answered exactly like an unknown number, so
	/// the endpoint cannot be used to probe which numbers exist.
	#[instrument(skip_all, fields(order_number = %order_number))]
	pub async fn guest_track(
		&self,
		order_number: &str,
		contact: &str,
	) -> Result<TrackingView, EngineError> {
		let order_id = self
			.store
			.resolve_number(order_number)
			.await
			.map_err(|err| state_err(order_number, err))?;
		let (record, _) = self
			.store
			.load(&order_id)
			.await
			.map_err(|err| state_err(order_number, err))?;
		if !record.order.contact_matches(contact) {
			return Err(EngineError::NotFound(order_number.to_string()));
		}
		self.build_tracking_view(record).await
	}

	/// Records a shipper's position with the configured freshness TTL.
	///
	/// Shippers may only report for themselves; there is no admin
	/// override, since a position nobody measured is worse than none.
	#[instrument(skip_all, fields(shipper_id = %truncate_id(shipper_id)))]
	pub async fn record_location(
		&self,
		actor: &Actor,
		shipper_id: &str,
		latitude: f64,
		longitude: f64,
		order_id: Option<String>,
	) -> Result<(), EngineError> {
		let own = matches!(
			actor,
			Actor::User { id, role: Role::Shipper } if id.as_str() == shipper_id
		);
		if !own {
			return Err(TransitionError::Forbidden(
				"Shippers may only report their own location".to_string(),
			)
			.into());
		}
		if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
			return Err(EngineError::InvalidRequest(
				"Coordinates out of range".to_string(),
			));
		}

		let now = unix_timestamp().map_err(|err| EngineError::Time(err.to_string()))?;
		let location = ShipperLocation {
			shipper_id: shipper_id.to_string(),
			order_id,
			latitude,
			longitude,
			recorded_at: now,
		};
		self.store
			.put_location(
				&location,
				Duration::from_secs(self.config.engine.location_ttl_seconds),
			)
			.await
			.map_err(|err| state_err(shipper_id, err))?;
		Ok(())
	}

	async fn build_tracking_view(&self, record: OrderRecord) -> Result<TrackingView, EngineError> {
		let current_location = self.active_shipper_location(&record.order).await?;
		let order = record.order;
		Ok(TrackingView {
			order_number: order.order_number,
			status: order.status,
			status_display: order.status.display_name().to_string(),
			shipper_id: order.shipper_id,
			current_location,
			pickup: order.pickup,
			delivery: order.delivery,
			history: record.tracking,
		})
	}

	/// A live position is attached only while the order is out with a
	/// shipper. Before assignment there is nobody to draw; after
	/// delivery the courier's whereabouts are not the customer's
	/// business anymore.
	async fn active_shipper_location(
		&self,
		order: &Order,
	) -> Result<Option<ShipperLocation>, EngineError> {
		if !matches!(
			order.status,
			OrderStatus::Assigned | OrderStatus::PickedUp | OrderStatus::Delivering
		) {
			return Ok(None);
		}
		let Some(shipper_id) = order.shipper_id.as_deref() else {
			return Ok(None);
		};
		self.store
			.location(shipper_id)
			.await
			.map_err(|err| state_err(shipper_id, err))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::support;
	use crate::engine::TransitionContext;
	use orderflow_types::Action;

	#[tokio::test]
	async fn live_location_appears_only_while_moving() {
		let engine = support::engine();
		let record = support::order_in_status(&engine, OrderStatus::PickedUp).await;

		engine
			.record_location(
				&support::shipper(),
				support::SHIPPER,
				10.7701,
				106.6822,
				Some(record.order.id.clone()),
			)
			.await
			.unwrap();

		let view = engine
			.track_order(&support::customer(), &record.order.id)
			.await
			.unwrap();
		let location = view.current_location.unwrap();
		assert_eq!(location.shipper_id, support::SHIPPER);
		assert_eq!(view.status_display, "Picked up");
		assert_eq!(view.history.len(), record.tracking.len());

		// Once delivered, the position is no longer attached even though
		// the ping is still fresh.
		for action in [Action::StartDelivering, Action::Deliver] {
			engine
				.apply_transition(
					&support::shipper(),
					&record.order.id,
					action,
					TransitionContext::default(),
				)
				.await
				.unwrap();
		}
		let view = engine
			.track_order(&support::customer(), &record.order.id)
			.await
			.unwrap();
		assert!(view.current_location.is_none());
	}

	#[tokio::test]
	async fn no_location_before_a_shipper_is_assigned() {
		let engine = support::engine();
		let record = support::order_in_status(&engine, OrderStatus::Ready).await;
		engine
			.record_location(&support::shipper(), support::SHIPPER, 10.0, 106.0, None)
			.await
			.unwrap();

		let view = engine
			.track_order(&support::customer(), &record.order.id)
			.await
			.unwrap();
		assert!(view.shipper_id.is_none());
		assert!(view.current_location.is_none());
	}

	#[tokio::test]
	async fn stale_locations_age_out() {
		// test_config sets a one second freshness window.
		let engine = support::engine();
		let record = support::order_in_status(&engine, OrderStatus::Delivering).await;

		engine
			.record_location(&support::shipper(), support::SHIPPER, 10.0, 106.0, None)
			.await
			.unwrap();
		let view = engine
			.track_order(&support::customer(), &record.order.id)
			.await
			.unwrap();
		assert!(view.current_location.is_some());

		tokio::time::sleep(Duration::from_millis(1100)).await;
		let view = engine
			.track_order(&support::customer(), &record.order.id)
			.await
			.unwrap();
		assert!(view.current_location.is_none());
	}

	#[tokio::test]
	async fn shippers_report_only_their_own_position() {
		let engine = support::engine();
		let err = engine
			.record_location(&support::shipper(), "ship-2", 10.0, 106.0, None)
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			EngineError::Rejected(TransitionError::Forbidden(_))
		));

		let err = engine
			.record_location(&support::customer(), support::CUSTOMER, 10.0, 106.0, None)
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			EngineError::Rejected(TransitionError::Forbidden(_))
		));
	}

	#[tokio::test]
	async fn coordinates_are_range_checked() {
		let engine = support::engine();
		let err = engine
			.record_location(&support::shipper(), support::SHIPPER, 95.0, 106.0, None)
			.await
			.unwrap_err();
		assert!(matches!(err, EngineError::InvalidRequest(_)));

		let err = engine
			.record_location(&support::shipper(), support::SHIPPER, 10.0, -181.0, None)
			.await
			.unwrap_err();
		assert!(matches!(err, EngineError::InvalidRequest(_)));
	}

	#[tokio::test]
	async fn guest_tracking_needs_the_matching_contact() {
		let engine = support::engine();
		let record = support::order_in_status(&engine, OrderStatus::Confirmed).await;
		let number = record.order.order_number.as_str();

		let view = engine.guest_track(number, "ana@example.com").await.unwrap();
		assert_eq!(view.order_number, number);
		assert_eq!(view.status, OrderStatus::Confirmed);

		// The delivery phone works as a contact too.
		engine.guest_track(number, "555-0199").await.unwrap();

		// A wrong contact is indistinguishable from an unknown number.
		let err = engine
			.guest_track(number, "mallory@example.com")
			.await
			.unwrap_err();
		assert!(matches!(err, EngineError::NotFound(_)));
		let err = engine
			.guest_track("FD00000000", "ana@example.com")
			.await
			.unwrap_err();
		assert!(matches!(err, EngineError::NotFound(_)));
	}

	#[tokio::test]
	async fn tracking_reads_are_authorized_like_order_reads() {
		let engine = support::engine();
		let record = support::order_in_status(&engine, OrderStatus::Confirmed).await;
		let err = engine
			.track_order(&Actor::user("cust-9", Role::Customer), &record.order.id)
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			EngineError::Rejected(TransitionError::Forbidden(_))
		));
	}
}
