//! Order write operations: creation, lifecycle transitions and the
//! administrative overrides.
//!
//! Every write follows the same shape: load the record with its
//! version, validate the request against what was loaded, apply the
//! change and its side effects in memory, then commit with a
//! version-checked write. A lost race surfaces as a conflict instead of
//! a silent overwrite, which is what decides shipper acceptance.

use super::{state_err, EngineError, LifecycleEngine, TransitionContext};
use crate::lifecycle::TransitionError;
use crate::state::StateError;
use crate::utils::{truncate_id, unix_timestamp};
use orderflow_types::{
	Action, Actor, CreateOrderRequest, Order, OrderEvent, OrderRecord, OrderStatus, OrderView,
	PaymentStatus, TrackingEntry,
};
use rust_decimal::Decimal;
use tracing::instrument;
use uuid::Uuid;

/// Attempts at minting a unique order number before giving up.
const NUMBER_ATTEMPTS: usize = 5;

impl LifecycleEngine {
	/// Creates a new order in `pending` and publishes `Created`.
	///
	/// The total is always computed server-side from the parts; a caller
	/// cannot supply one. Orders need either a customer account id or a
	/// contact email so someone is able to act on them later.
	#[instrument(skip_all, fields(restaurant_id = %request.restaurant_id))]
	pub async fn create_order(
		&self,
		request: CreateOrderRequest,
	) -> Result<OrderRecord, EngineError> {
		if request.subtotal < Decimal::ZERO
			|| request.delivery_fee < Decimal::ZERO
			|| request.discount < Decimal::ZERO
		{
			return Err(EngineError::InvalidRequest(
				"Monetary fields must not be negative".to_string(),
			));
		}
		let total = request.subtotal + request.delivery_fee - request.discount;
		if total < Decimal::ZERO {
			return Err(EngineError::InvalidRequest(
				"Discount exceeds the order value".to_string(),
			));
		}

		if request.restaurant_id.trim().is_empty() {
			return Err(EngineError::InvalidRequest(
				"Restaurant id must not be empty".to_string(),
			));
		}
		let customer_id = normalize(request.customer_id);
		let customer_email = normalize(request.customer_email);
		let guest_name = normalize(request.guest_name);
		if customer_id.is_none() && customer_email.is_none() {
			return Err(EngineError::InvalidRequest(
				"Order needs a customer account or a guest contact".to_string(),
			));
		}
		for snapshot in [&request.pickup, &request.delivery] {
			if snapshot.address.trim().is_empty() || snapshot.phone.trim().is_empty() {
				return Err(EngineError::InvalidRequest(
					"Address snapshots need both an address line and a phone".to_string(),
				));
			}
		}

		let now = unix_timestamp().map_err(|err| EngineError::Time(err.to_string()))?;
		let order_id = Uuid::new_v4().to_string();
		let order_number = self.claim_order_number(&order_id).await?;

		let order = Order {
			id: order_id,
			order_number,
			customer_id,
			customer_email,
			guest_name,
			restaurant_id: request.restaurant_id,
			shipper_id: None,
			status: OrderStatus::Pending,
			payment_method: request.payment_method,
			payment_status: PaymentStatus::Unpaid,
			pickup: request.pickup,
			delivery: request.delivery,
			subtotal: request.subtotal,
			delivery_fee: request.delivery_fee,
			discount: request.discount,
			total,
			created_at: now,
			updated_at: now,
			delivered_at: None,
		};
		let record = OrderRecord::new(
			order,
			TrackingEntry {
				status: OrderStatus::Pending,
				message: "Order placed".to_string(),
				latitude: None,
				longitude: None,
				created_at: now,
			},
		);

		self.store
			.insert(&record)
			.await
			.map_err(|err| state_err(&record.order.id, err))?;

		tracing::info!(
			order_id = %truncate_id(&record.order.id),
			order_number = %record.order.order_number,
			"Order created"
		);
		self.event_bus
			.publish(OrderEvent::Created {
				order: record.order.clone(),
			})
			.ok();

		Ok(record)
	}

	/// Applies one lifecycle action to an order.
	///
	/// On success the committed record is returned, including the
	/// tracking entry this transition appended. A lost write race
	/// surfaces as [`EngineError::Conflict`].
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id), action = %action))]
	pub async fn apply_transition(
		&self,
		actor: &Actor,
		order_id: &str,
		action: Action,
		ctx: TransitionContext,
	) -> Result<OrderRecord, EngineError> {
		let (mut record, version) = self
			.store
			.load(order_id)
			.await
			.map_err(|err| state_err(order_id, err))?;

		let accepted = self
			.validator
			.authorize(actor, &record.order, action)
			.await?;

		let now = unix_timestamp().map_err(|err| EngineError::Time(err.to_string()))?;
		let from = record.order.status;

		record.order.status = accepted.to;
		record.order.updated_at = now;
		if accepted.effects.assign_shipper {
			record.order.shipper_id = actor.id().map(str::to_string);
		}
		if accepted.effects.stamp_delivered_at {
			record.order.delivered_at = Some(now);
		}
		if accepted.effects.collect_cod_payment {
			record.order.payment_status = PaymentStatus::Paid;
		}

		let message = ctx
			.message
			.filter(|message| !message.trim().is_empty())
			.unwrap_or(accepted.default_message);
		record.tracking.push(TrackingEntry {
			status: accepted.to,
			message,
			latitude: ctx.latitude,
			longitude: ctx.longitude,
			created_at: now,
		});

		self.store
			.commit(&record, version)
			.await
			.map_err(|err| state_err(order_id, err))?;

		tracing::info!(from = %from, to = %accepted.to, "Transition committed");

		self.event_bus
			.publish(OrderEvent::Transitioned {
				order: record.order.clone(),
				from,
				action,
			})
			.ok();
		if accepted.effects.collect_cod_payment {
			self.event_bus
				.publish(OrderEvent::PaymentCollected {
					order: record.order.clone(),
				})
				.ok();
		}

		Ok(record)
	}

	/// Completes an order on behalf of an unauthenticated guest.
	///
	/// Guests hold the shareable order number, not the internal id, so
	/// the number is resolved first and the contact is checked by the
	/// validator like any other completion.
	pub async fn guest_complete(
		&self,
		order_number: &str,
		contact: &str,
		message: Option<String>,
	) -> Result<OrderRecord, EngineError> {
		let order_id = self
			.store
			.resolve_number(order_number)
			.await
			.map_err(|err| state_err(order_number, err))?;
		let actor = Actor::guest(contact);
		self.apply_transition(
			&actor,
			&order_id,
			Action::Complete,
			TransitionContext {
				message,
				..TransitionContext::default()
			},
		)
		.await
	}

	/// Loads an order for a viewer, projected for their role.
	pub async fn get_order(&self, actor: &Actor, order_id: &str) -> Result<OrderView, EngineError> {
		let (record, _) = self
			.store
			.load(order_id)
			.await
			.map_err(|err| state_err(order_id, err))?;
		self.authorize_read(actor, &record.order).await?;
		Ok(OrderView::project(&record.order, actor.role()))
	}

	/// Places an order with a different shipper as an operations
	/// override.
	///
	/// A ready order is advanced to `assigned`; an order already out
	/// with a shipper keeps its status and only swaps the assignee.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn reassign_shipper(
		&self,
		actor: &Actor,
		order_id: &str,
		new_shipper_id: &str,
	) -> Result<OrderRecord, EngineError> {
		if !actor.is_admin() {
			return Err(TransitionError::Forbidden(
				"Only admins may reassign shippers".to_string(),
			)
			.into());
		}
		let new_shipper_id = new_shipper_id.trim();
		if new_shipper_id.is_empty() {
			return Err(EngineError::InvalidRequest(
				"Shipper id must not be empty".to_string(),
			));
		}

		let (mut record, version) = self
			.store
			.load(order_id)
			.await
			.map_err(|err| state_err(order_id, err))?;

		let (status, message) = match record.order.status {
			OrderStatus::Ready => (OrderStatus::Assigned, "Shipper assigned"),
			OrderStatus::Assigned | OrderStatus::PickedUp | OrderStatus::Delivering => {
				(record.order.status, "Shipper reassigned")
			}
			other => {
				return Err(EngineError::InvalidRequest(format!(
					"Cannot reassign a shipper while the order is {other}"
				)))
			}
		};

		let now = unix_timestamp().map_err(|err| EngineError::Time(err.to_string()))?;
		let previous = record.order.shipper_id.replace(new_shipper_id.to_string());
		record.order.status = status;
		record.order.updated_at = now;
		record.tracking.push(TrackingEntry {
			status,
			message: message.to_string(),
			latitude: None,
			longitude: None,
			created_at: now,
		});

		self.store
			.commit(&record, version)
			.await
			.map_err(|err| state_err(order_id, err))?;

		tracing::info!(shipper_id = %new_shipper_id, status = %status, "Shipper reassigned");
		self.event_bus
			.publish(OrderEvent::ShipperReassigned {
				order: record.order.clone(),
				previous,
			})
			.ok();

		Ok(record)
	}

	/// Deletes a terminal order and frees its number. Admin only.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn remove_order(&self, actor: &Actor, order_id: &str) -> Result<(), EngineError> {
		if !actor.is_admin() {
			return Err(
				TransitionError::Forbidden("Only admins may remove orders".to_string()).into(),
			);
		}
		let (record, _) = self
			.store
			.load(order_id)
			.await
			.map_err(|err| state_err(order_id, err))?;
		if !record.order.status.is_terminal() {
			return Err(EngineError::InvalidRequest(format!(
				"Only terminal orders can be removed; this one is {}",
				record.order.status
			)));
		}
		self.store
			.remove(&record)
			.await
			.map_err(|err| state_err(order_id, err))?;
		tracing::info!(order_number = %record.order.order_number, "Order removed");
		Ok(())
	}

	/// Claims a fresh order number, retrying on collisions. The number
	/// index is written create-only, so two orders can never share one.
	async fn claim_order_number(&self, order_id: &str) -> Result<String, EngineError> {
		for _ in 0..NUMBER_ATTEMPTS {
			let candidate = self.generate_order_number();
			match self.store.claim_number(&candidate, order_id).await {
				Ok(()) => return Ok(candidate),
				Err(StateError::Conflict) => continue,
				Err(err) => return Err(state_err(order_id, err)),
			}
		}
		Err(EngineError::Storage(
			"Could not allocate a unique order number".to_string(),
		))
	}

	fn generate_order_number(&self) -> String {
		let hex = Uuid::new_v4().simple().to_string();
		format!(
			"{}{}",
			self.config.engine.order_number_prefix,
			hex[..8].to_uppercase()
		)
	}
}

/// Trims an optional field, dropping it entirely when blank.
fn normalize(value: Option<String>) -> Option<String> {
	value
		.map(|value| value.trim().to_string())
		.filter(|value| !value.is_empty())
}
