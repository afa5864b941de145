//! Events published by the engine after committed operations.

use crate::{Action, Order, OrderStatus};
use serde::{Deserialize, Serialize};

/// Event emitted on the engine's broadcast bus after a commit.
///
/// Dispatch is post-commit and best-effort. Consumers must tolerate
/// loss and must never feed results back into the committed change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrderEvent {
	/// A new order was created in `pending`.
	Created { order: Order },
	/// An accepted lifecycle transition was committed.
	Transitioned {
		order: Order,
		from: OrderStatus,
		action: Action,
	},
	/// Operations moved the order to a different shipper.
	ShipperReassigned {
		order: Order,
		previous: Option<String>,
	},
	/// A cash-on-delivery balance was collected at completion.
	PaymentCollected { order: Order },
}

impl OrderEvent {
	/// Order the event concerns.
	pub fn order(&self) -> &Order {
		match self {
			OrderEvent::Created { order }
			| OrderEvent::Transitioned { order, .. }
			| OrderEvent::ShipperReassigned { order, .. }
			| OrderEvent::PaymentCollected { order } => order,
		}
	}
}
