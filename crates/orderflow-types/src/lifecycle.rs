//! Lifecycle vocabulary for the order state machine.
//!
//! Every status an order can hold, every named action that moves it
//! between statuses, and the roles allowed to perform those actions are
//! defined here as closed enums. The transition table itself lives in
//! the core crate; this module only provides the vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of an order in the delivery lifecycle.
///
/// Statuses form a single forward path from `Pending` to `Completed`,
/// with the cancellation and failure statuses branching off as terminal
/// exits. Once a terminal status is reached no further transitions are
/// accepted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
	/// Order placed, waiting for the restaurant to confirm.
	Pending,
	/// Restaurant accepted the order.
	Confirmed,
	/// Kitchen is preparing the order.
	Preparing,
	/// Order is packed and open for shipper acceptance.
	Ready,
	/// A shipper claimed the order.
	Assigned,
	/// Shipper collected the order from the restaurant.
	PickedUp,
	/// Shipper is in transit to the customer.
	Delivering,
	/// Shipper handed the order over.
	Delivered,
	/// Customer confirmed receipt. Terminal.
	Completed,
	/// Cancelled by the customer. Terminal.
	CancelledByUser,
	/// Cancelled by the restaurant. Terminal.
	CancelledBySeller,
	/// Cancelled by the shipper after acceptance. Terminal.
	CancelledByShipper,
	/// Delivery was attempted and failed. Terminal.
	FailedDelivery,
}

impl OrderStatus {
	/// Returns true when the status accepts no further transitions.
	pub fn is_terminal(&self) -> bool {
		matches!(
			self,
			OrderStatus::Completed
				| OrderStatus::CancelledByUser
				| OrderStatus::CancelledBySeller
				| OrderStatus::CancelledByShipper
				| OrderStatus::FailedDelivery
		)
	}

	/// Wire name used in storage records and API payloads.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "pending",
			OrderStatus::Confirmed => "confirmed",
			OrderStatus::Preparing => "preparing",
			OrderStatus::Ready => "ready",
			OrderStatus::Assigned => "assigned",
			OrderStatus::PickedUp => "picked_up",
			OrderStatus::Delivering => "delivering",
			OrderStatus::Delivered => "delivered",
			OrderStatus::Completed => "completed",
			OrderStatus::CancelledByUser => "cancelled_by_user",
			OrderStatus::CancelledBySeller => "cancelled_by_seller",
			OrderStatus::CancelledByShipper => "cancelled_by_shipper",
			OrderStatus::FailedDelivery => "failed_delivery",
		}
	}

	/// All statuses, lifecycle order first, then the terminal exits.
	pub fn all() -> &'static [OrderStatus] {
		&[
			OrderStatus::Pending,
			OrderStatus::Confirmed,
			OrderStatus::Preparing,
			OrderStatus::Ready,
			OrderStatus::Assigned,
			OrderStatus::PickedUp,
			OrderStatus::Delivering,
			OrderStatus::Delivered,
			OrderStatus::Completed,
			OrderStatus::CancelledByUser,
			OrderStatus::CancelledBySeller,
			OrderStatus::CancelledByShipper,
			OrderStatus::FailedDelivery,
		]
	}

	/// Human-readable name used in tracking messages and notifications.
	pub fn display_name(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "Pending confirmation",
			OrderStatus::Confirmed => "Confirmed",
			OrderStatus::Preparing => "Being prepared",
			OrderStatus::Ready => "Ready for pickup",
			OrderStatus::Assigned => "Shipper assigned",
			OrderStatus::PickedUp => "Picked up",
			OrderStatus::Delivering => "Out for delivery",
			OrderStatus::Delivered => "Delivered",
			OrderStatus::Completed => "Completed",
			OrderStatus::CancelledByUser => "Cancelled by customer",
			OrderStatus::CancelledBySeller => "Cancelled by restaurant",
			OrderStatus::CancelledByShipper => "Cancelled by shipper",
			OrderStatus::FailedDelivery => "Delivery failed",
		}
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for OrderStatus {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"pending" => Ok(OrderStatus::Pending),
			"confirmed" => Ok(OrderStatus::Confirmed),
			"preparing" => Ok(OrderStatus::Preparing),
			"ready" => Ok(OrderStatus::Ready),
			"assigned" => Ok(OrderStatus::Assigned),
			"picked_up" => Ok(OrderStatus::PickedUp),
			"delivering" => Ok(OrderStatus::Delivering),
			"delivered" => Ok(OrderStatus::Delivered),
			"completed" => Ok(OrderStatus::Completed),
			"cancelled_by_user" => Ok(OrderStatus::CancelledByUser),
			"cancelled_by_seller" => Ok(OrderStatus::CancelledBySeller),
			"cancelled_by_shipper" => Ok(OrderStatus::CancelledByShipper),
			"failed_delivery" => Ok(OrderStatus::FailedDelivery),
			_ => Err(()),
		}
	}
}

/// Payment settlement state, tracked separately from the order status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
	/// No payment attempt recorded yet.
	Unpaid,
	/// A payment attempt is in flight with the provider.
	Pending,
	/// Funds captured.
	Paid,
	/// The provider rejected the payment.
	Failed,
	/// Funds returned after a cancellation.
	Refunded,
}

impl PaymentStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			PaymentStatus::Unpaid => "unpaid",
			PaymentStatus::Pending => "pending",
			PaymentStatus::Paid => "paid",
			PaymentStatus::Failed => "failed",
			PaymentStatus::Refunded => "refunded",
		}
	}
}

impl fmt::Display for PaymentStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// How the customer pays for the order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
	/// Cash on delivery, collected by the shipper at completion.
	Cash,
	/// Online payment captured up front through a provider.
	Online,
}

impl PaymentMethod {
	/// Cash orders settle at the door instead of up front.
	pub fn is_cash(&self) -> bool {
		matches!(self, PaymentMethod::Cash)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			PaymentMethod::Cash => "cash",
			PaymentMethod::Online => "online",
		}
	}
}

impl fmt::Display for PaymentMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// Role an actor holds when performing a lifecycle action.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	/// The buyer who placed the order.
	Customer,
	/// The restaurant fulfilling the order.
	Seller,
	/// The courier moving the order.
	Shipper,
	/// Operations staff with override powers.
	Admin,
}

impl Role {
	pub fn as_str(&self) -> &'static str {
		match self {
			Role::Customer => "customer",
			Role::Seller => "seller",
			Role::Shipper => "shipper",
			Role::Admin => "admin",
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for Role {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"customer" => Ok(Role::Customer),
			"seller" => Ok(Role::Seller),
			"shipper" => Ok(Role::Shipper),
			"admin" => Ok(Role::Admin),
			_ => Err(()),
		}
	}
}

/// Identity attempting an operation against the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
	/// An authenticated user acting in one of the four roles.
	User { id: String, role: Role },
	/// An unauthenticated guest, identified only by the contact they
	/// supplied at checkout.
	Guest { contact: String },
}

impl Actor {
	pub fn user(id: impl Into<String>, role: Role) -> Self {
		Actor::User {
			id: id.into(),
			role,
		}
	}

	pub fn guest(contact: impl Into<String>) -> Self {
		Actor::Guest {
			contact: contact.into(),
		}
	}

	/// Role used for permission lookups. Guests act through the
	/// customer column of the transition table.
	pub fn role(&self) -> Role {
		match self {
			Actor::User { role, .. } => *role,
			Actor::Guest { .. } => Role::Customer,
		}
	}

	/// User id when the actor is authenticated.
	pub fn id(&self) -> Option<&str> {
		match self {
			Actor::User { id, .. } => Some(id),
			Actor::Guest { .. } => None,
		}
	}

	pub fn is_admin(&self) -> bool {
		matches!(
			self,
			Actor::User {
				role: Role::Admin,
				..
			}
		)
	}
}

/// Named lifecycle action requested by an actor.
///
/// Actions, not raw target statuses, are the unit of permission: the
/// transition table maps each action to the statuses it may fire from
/// and the roles allowed to fire it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
	/// Restaurant accepts the order.
	Confirm,
	/// Kitchen starts cooking.
	StartPreparing,
	/// Order packed and opened for shippers.
	MarkReady,
	/// Shipper claims the order.
	Accept,
	/// Shipper collects from the restaurant.
	PickUp,
	/// Shipper departs toward the customer.
	StartDelivering,
	/// Shipper hands the order over.
	Deliver,
	/// Customer confirms receipt.
	Complete,
	/// Customer backs out before preparation starts.
	CancelByUser,
	/// Restaurant rejects or abandons the order.
	CancelBySeller,
	/// Shipper abandons the order after claiming it.
	CancelByShipper,
	/// Shipper reports a failed delivery attempt.
	FailDelivery,
	/// Operations closes an order out regardless of where it stalled.
	ForceComplete,
}

impl Action {
	pub fn as_str(&self) -> &'static str {
		match self {
			Action::Confirm => "confirm",
			Action::StartPreparing => "start_preparing",
			Action::MarkReady => "mark_ready",
			Action::Accept => "accept",
			Action::PickUp => "pick_up",
			Action::StartDelivering => "start_delivering",
			Action::Deliver => "deliver",
			Action::Complete => "complete",
			Action::CancelByUser => "cancel_by_user",
			Action::CancelBySeller => "cancel_by_seller",
			Action::CancelByShipper => "cancel_by_shipper",
			Action::FailDelivery => "fail_delivery",
			Action::ForceComplete => "force_complete",
		}
	}

	/// All actions, in table order.
	pub fn all() -> &'static [Action] {
		&[
			Action::Confirm,
			Action::StartPreparing,
			Action::MarkReady,
			Action::Accept,
			Action::PickUp,
			Action::StartDelivering,
			Action::Deliver,
			Action::Complete,
			Action::CancelByUser,
			Action::CancelBySeller,
			Action::CancelByShipper,
			Action::FailDelivery,
			Action::ForceComplete,
		]
	}

	/// Cancellations are the actions that may exit the forward path.
	pub fn is_cancellation(&self) -> bool {
		matches!(
			self,
			Action::CancelByUser | Action::CancelBySeller | Action::CancelByShipper
		)
	}
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for Action {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"confirm" => Ok(Action::Confirm),
			"start_preparing" => Ok(Action::StartPreparing),
			"mark_ready" => Ok(Action::MarkReady),
			"accept" => Ok(Action::Accept),
			"pick_up" => Ok(Action::PickUp),
			"start_delivering" => Ok(Action::StartDelivering),
			"deliver" => Ok(Action::Deliver),
			"complete" => Ok(Action::Complete),
			"cancel_by_user" => Ok(Action::CancelByUser),
			"cancel_by_seller" => Ok(Action::CancelBySeller),
			"cancel_by_shipper" => Ok(Action::CancelByShipper),
			"fail_delivery" => Ok(Action::FailDelivery),
			"force_complete" => Ok(Action::ForceComplete),
			_ => Err(()),
		}
	}
}
