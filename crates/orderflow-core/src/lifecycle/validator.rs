//! Transition validation: who may move which order, and what the move
//! entails.
//!
//! The validator runs a fixed sequence of checks against the transition
//! table and the order being acted on:
//!
//! 1. Availability: the action must fire from the order's current status.
//! 2. Role: the acting role must own the action. Admins may fire any rule
//!    except `accept`; shippers are placed through reassignment.
//! 3. Ownership: the actor must be the specific customer, seller or
//!    assigned shipper of this order. Admins skip this check.
//! 4. Payment: a seller confirming an online order needs settled payment.
//!
//! The checks run in this order so a caller always gets the most useful
//! rejection: a wrong-status request is reported with the actions that
//! would currently work, before any permission question is raised.

use crate::lifecycle::transitions;
use orderflow_catalog::CatalogService;
use orderflow_payment::PaymentService;
use orderflow_types::{Action, Actor, Order, OrderStatus, PaymentStatus, Role};
use std::sync::Arc;
use thiserror::Error;

/// Why a requested transition was rejected.
#[derive(Debug, Error)]
pub enum TransitionError {
	/// The action cannot fire from the order's current status.
	#[error("Cannot {action} an order that is {current_status}")]
	InvalidTransition {
		action: Action,
		current_status: OrderStatus,
		/// Actions the acting role could take instead, for the caller.
		valid_actions: Vec<Action>,
	},
	/// The actor is not allowed to perform this action on this order.
	#[error("{0}")]
	Forbidden(String),
	/// The order requires settled payment before it can be confirmed.
	#[error("Payment not completed")]
	PaymentNotReady,
	/// A collaborating service failed while validating.
	#[error("Dependency error: {0}")]
	Dependency(String),
}

/// Side effects the engine must apply together with the status change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionEffects {
	/// Record the acting shipper on the order.
	pub assign_shipper: bool,
	/// Stamp the delivery timestamp.
	pub stamp_delivered_at: bool,
	/// Mark a cash-on-delivery payment as collected.
	pub collect_cod_payment: bool,
}

/// A validated transition, ready for the engine to apply.
#[derive(Debug, Clone)]
pub struct AcceptedTransition {
	/// Status the order moves to.
	pub to: OrderStatus,
	/// Side effects to apply in the same write.
	pub effects: TransitionEffects,
	/// Tracking message used when the caller did not supply one.
	pub default_message: String,
}

/// Validates transition requests against the lifecycle table and the
/// order's ownership and payment state.
pub struct TransitionValidator {
	payment: Arc<PaymentService>,
	catalog: Arc<CatalogService>,
}

impl TransitionValidator {
	pub fn new(payment: Arc<PaymentService>, catalog: Arc<CatalogService>) -> Self {
		Self { payment, catalog }
	}

	/// Runs the full check sequence for `actor` requesting `action` on
	/// `order`. Returns the target status and side effects on success.
	pub async fn authorize(
		&self,
		actor: &Actor,
		order: &Order,
		action: Action,
	) -> Result<AcceptedTransition, TransitionError> {
		let admin = actor.is_admin();
		let role = actor.role();

		let Some(rule) = transitions::available_rule(action, order.status, admin) else {
			return Err(TransitionError::InvalidTransition {
				action,
				current_status: order.status,
				valid_actions: transitions::valid_actions(role, order.status),
			});
		};

		if admin {
			if action == Action::Accept {
				return Err(TransitionError::Forbidden(
					"Admins reassign shippers instead of accepting orders".to_string(),
				));
			}
		} else {
			if rule.role != role {
				return Err(TransitionError::Forbidden(format!(
					"Action {action} requires the {} role",
					rule.role
				)));
			}
			self.check_ownership(actor, order, action).await?;

			if rule.action == Action::Confirm && !order.payment_method.is_cash() {
				let paid = self
					.payment
					.is_paid(order)
					.await
					.map_err(|err| TransitionError::Dependency(err.to_string()))?;
				if !paid {
					return Err(TransitionError::PaymentNotReady);
				}
			}
		}

		let effects = TransitionEffects {
			assign_shipper: action == Action::Accept,
			stamp_delivered_at: rule.to == OrderStatus::Delivered,
			collect_cod_payment: matches!(action, Action::Complete | Action::ForceComplete)
				&& order.payment_method.is_cash()
				&& order.payment_status != PaymentStatus::Paid,
		};

		Ok(AcceptedTransition {
			to: rule.to,
			effects,
			default_message: rule.to.display_name().to_string(),
		})
	}

	/// The actor must be the specific party the order names for their
	/// role. `accept` is the one exception: a ready order is open to any
	/// shipper, and the winner is decided by the conditional write.
	async fn check_ownership(
		&self,
		actor: &Actor,
		order: &Order,
		action: Action,
	) -> Result<(), TransitionError> {
		match actor.role() {
			Role::Seller => {
				let owner = self
					.catalog
					.owner_of(&order.restaurant_id)
					.await
					.map_err(|err| TransitionError::Dependency(err.to_string()))?;
				let owns = match (owner.as_deref(), actor.id()) {
					(Some(owner), Some(id)) => owner == id,
					_ => false,
				};
				if !owns {
					return Err(TransitionError::Forbidden(
						"Order belongs to another restaurant".to_string(),
					));
				}
			}
			Role::Shipper => {
				if action != Action::Accept {
					let assigned = order
						.shipper_id
						.as_deref()
						.zip(actor.id())
						.is_some_and(|(assigned, id)| assigned == id);
					if !assigned {
						return Err(TransitionError::Forbidden(
							"Order is assigned to another shipper".to_string(),
						));
					}
				}
			}
			Role::Customer => match actor {
				Actor::User { id, .. } => {
					if order.customer_id.as_deref() != Some(id.as_str()) {
						return Err(TransitionError::Forbidden(
							"Order belongs to another customer".to_string(),
						));
					}
				}
				Actor::Guest { contact } => {
					if !order.contact_matches(contact) {
						return Err(TransitionError::Forbidden(
							"Contact does not match this order".to_string(),
						));
					}
				}
			},
			Role::Admin => {}
		}
		Ok(())
	}
}
