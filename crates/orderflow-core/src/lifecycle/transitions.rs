//! Static transition table for the order lifecycle.
//!
//! Every action an actor can take on an order is described by an
//! [`ActionRule`]: which role owns the action, which statuses it may fire
//! from, and which status it lands on. The table is the single source of
//! truth; the validator and the API layer both read it through the lookup
//! functions below instead of hard-coding status checks.

use once_cell::sync::Lazy;
use orderflow_types::{Action, OrderStatus, Role};

/// One row of the lifecycle table.
#[derive(Debug, Clone, Copy)]
pub struct ActionRule {
	/// The action this rule describes.
	pub action: Action,
	/// Role that owns the action. Admins are handled separately and may
	/// fire any rule except `Accept`.
	pub role: Role,
	/// Statuses the action may fire from.
	pub from: &'static [OrderStatus],
	/// Status the order lands on when the action is applied.
	pub to: OrderStatus,
}

/// Statuses an order can still move out of.
const LIVE: &[OrderStatus] = &[
	OrderStatus::Pending,
	OrderStatus::Confirmed,
	OrderStatus::Preparing,
	OrderStatus::Ready,
	OrderStatus::Assigned,
	OrderStatus::PickedUp,
	OrderStatus::Delivering,
	OrderStatus::Delivered,
];

static RULES: Lazy<Vec<ActionRule>> = Lazy::new(|| {
	vec![
		ActionRule {
			action: Action::Confirm,
			role: Role::Seller,
			from: &[OrderStatus::Pending],
			to: OrderStatus::Confirmed,
		},
		ActionRule {
			action: Action::StartPreparing,
			role: Role::Seller,
			from: &[OrderStatus::Confirmed],
			to: OrderStatus::Preparing,
		},
		ActionRule {
			action: Action::MarkReady,
			role: Role::Seller,
			from: &[OrderStatus::Preparing],
			to: OrderStatus::Ready,
		},
		ActionRule {
			action: Action::Accept,
			role: Role::Shipper,
			from: &[OrderStatus::Ready],
			to: OrderStatus::Assigned,
		},
		ActionRule {
			action: Action::PickUp,
			role: Role::Shipper,
			from: &[OrderStatus::Assigned],
			to: OrderStatus::PickedUp,
		},
		ActionRule {
			action: Action::StartDelivering,
			role: Role::Shipper,
			from: &[OrderStatus::PickedUp],
			to: OrderStatus::Delivering,
		},
		ActionRule {
			action: Action::Deliver,
			role: Role::Shipper,
			from: &[OrderStatus::Delivering],
			to: OrderStatus::Delivered,
		},
		ActionRule {
			action: Action::Complete,
			role: Role::Customer,
			from: &[OrderStatus::Delivered],
			to: OrderStatus::Completed,
		},
		ActionRule {
			action: Action::CancelByUser,
			role: Role::Customer,
			from: &[OrderStatus::Pending, OrderStatus::Confirmed],
			to: OrderStatus::CancelledByUser,
		},
		ActionRule {
			action: Action::CancelBySeller,
			role: Role::Seller,
			from: &[
				OrderStatus::Pending,
				OrderStatus::Confirmed,
				OrderStatus::Preparing,
			],
			to: OrderStatus::CancelledBySeller,
		},
		ActionRule {
			action: Action::CancelByShipper,
			role: Role::Shipper,
			from: &[OrderStatus::Assigned, OrderStatus::PickedUp],
			to: OrderStatus::CancelledByShipper,
		},
		ActionRule {
			action: Action::FailDelivery,
			role: Role::Shipper,
			from: &[OrderStatus::Delivering],
			to: OrderStatus::FailedDelivery,
		},
		ActionRule {
			action: Action::ForceComplete,
			role: Role::Admin,
			from: LIVE,
			to: OrderStatus::Completed,
		},
	]
});

/// Returns the full lifecycle table.
pub fn rules() -> &'static [ActionRule] {
	&RULES
}

/// Looks up the rule for an action. Every action has exactly one row.
pub fn rule_for(action: Action) -> Option<&'static ActionRule> {
	RULES.iter().find(|rule| rule.action == action)
}

/// Returns the rule for `action` if it may fire from `status`.
///
/// Admins get a wider window for cancellations: any cancellation may fire
/// from any status the order can still move out of. Everything else keeps
/// the from-set of the table, including for admins.
pub fn available_rule(
	action: Action,
	status: OrderStatus,
	admin: bool,
) -> Option<&'static ActionRule> {
	let rule = rule_for(action)?;
	let available = if admin && action.is_cancellation() {
		!status.is_terminal()
	} else {
		rule.from.contains(&status)
	};
	available.then_some(rule)
}

/// Actions `role` could take on an order in `status`, in table order.
///
/// Used to build actionable rejection messages. For admins this includes
/// every role's current step plus all cancellations, but never `Accept`;
/// admins place shippers through reassignment instead.
pub fn valid_actions(role: Role, status: OrderStatus) -> Vec<Action> {
	if status.is_terminal() {
		return Vec::new();
	}
	RULES
		.iter()
		.filter(|rule| match role {
			Role::Admin => {
				rule.action != Action::Accept
					&& (rule.from.contains(&status) || rule.action.is_cancellation())
			}
			_ => rule.role == role && rule.from.contains(&status),
		})
		.map(|rule| rule.action)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_action_has_exactly_one_rule() {
		for action in Action::all() {
			let matching: Vec<_> = rules().iter().filter(|r| r.action == *action).collect();
			assert_eq!(matching.len(), 1, "{action} should appear once in the table");
		}
	}

	#[test]
	fn happy_path_chains_without_skips() {
		let path = [
			(Action::Confirm, OrderStatus::Pending, OrderStatus::Confirmed),
			(
				Action::StartPreparing,
				OrderStatus::Confirmed,
				OrderStatus::Preparing,
			),
			(Action::MarkReady, OrderStatus::Preparing, OrderStatus::Ready),
			(Action::Accept, OrderStatus::Ready, OrderStatus::Assigned),
			(Action::PickUp, OrderStatus::Assigned, OrderStatus::PickedUp),
			(
				Action::StartDelivering,
				OrderStatus::PickedUp,
				OrderStatus::Delivering,
			),
			(Action::Deliver, OrderStatus::Delivering, OrderStatus::Delivered),
			(Action::Complete, OrderStatus::Delivered, OrderStatus::Completed),
		];
		for (action, from, to) in path {
			let rule = rule_for(action).unwrap();
			assert_eq!(rule.from, &[from], "{action} fires from exactly one status");
			assert_eq!(rule.to, to);
		}
	}

	#[test]
	fn cancellation_windows_match_roles() {
		let user = rule_for(Action::CancelByUser).unwrap();
		assert_eq!(user.role, Role::Customer);
		assert_eq!(user.from, &[OrderStatus::Pending, OrderStatus::Confirmed]);

		let seller = rule_for(Action::CancelBySeller).unwrap();
		assert_eq!(seller.role, Role::Seller);
		assert!(seller.from.contains(&OrderStatus::Preparing));
		assert!(!seller.from.contains(&OrderStatus::Ready));

		let shipper = rule_for(Action::CancelByShipper).unwrap();
		assert_eq!(shipper.role, Role::Shipper);
		assert_eq!(shipper.from, &[OrderStatus::Assigned, OrderStatus::PickedUp]);
	}

	#[test]
	fn force_complete_fires_from_any_live_status() {
		let rule = rule_for(Action::ForceComplete).unwrap();
		assert_eq!(rule.role, Role::Admin);
		assert_eq!(rule.to, OrderStatus::Completed);
		for status in OrderStatus::all() {
			assert_eq!(rule.from.contains(status), !status.is_terminal());
		}
	}

	#[test]
	fn terminal_statuses_offer_no_actions() {
		let terminal = [
			OrderStatus::Completed,
			OrderStatus::CancelledByUser,
			OrderStatus::CancelledBySeller,
			OrderStatus::CancelledByShipper,
			OrderStatus::FailedDelivery,
		];
		for status in terminal {
			for role in [Role::Customer, Role::Seller, Role::Shipper, Role::Admin] {
				assert!(valid_actions(role, status).is_empty());
			}
		}
	}

	#[test]
	fn role_menus_for_pending_orders() {
		assert_eq!(
			valid_actions(Role::Seller, OrderStatus::Pending),
			vec![Action::Confirm, Action::CancelBySeller]
		);
		assert_eq!(
			valid_actions(Role::Customer, OrderStatus::Pending),
			vec![Action::CancelByUser]
		);
		assert!(valid_actions(Role::Shipper, OrderStatus::Pending).is_empty());
	}

	#[test]
	fn shipper_menu_follows_the_delivery_leg() {
		assert_eq!(
			valid_actions(Role::Shipper, OrderStatus::Ready),
			vec![Action::Accept]
		);
		assert_eq!(
			valid_actions(Role::Shipper, OrderStatus::Assigned),
			vec![Action::PickUp, Action::CancelByShipper]
		);
		assert_eq!(
			valid_actions(Role::Shipper, OrderStatus::Delivering),
			vec![Action::Deliver, Action::FailDelivery]
		);
	}

	#[test]
	fn admin_menu_widens_cancellations_but_never_accepts() {
		let menu = valid_actions(Role::Admin, OrderStatus::Delivering);
		assert!(menu.contains(&Action::Deliver));
		assert!(menu.contains(&Action::FailDelivery));
		assert!(menu.contains(&Action::CancelByUser));
		assert!(menu.contains(&Action::CancelBySeller));
		assert!(menu.contains(&Action::CancelByShipper));
		assert!(menu.contains(&Action::ForceComplete));
		assert!(!menu.contains(&Action::Accept));

		let ready = valid_actions(Role::Admin, OrderStatus::Ready);
		assert!(!ready.contains(&Action::Accept));
		assert!(ready.contains(&Action::ForceComplete));
	}

	#[test]
	fn admin_cancellation_window_covers_every_live_status() {
		for status in OrderStatus::all() {
			let available = available_rule(Action::CancelByUser, *status, true).is_some();
			assert_eq!(available, !status.is_terminal());
		}
		// Non-admins keep the narrow window.
		assert!(available_rule(Action::CancelByUser, OrderStatus::Delivering, false).is_none());
		assert!(available_rule(Action::CancelByUser, OrderStatus::Confirmed, false).is_some());
	}
}
