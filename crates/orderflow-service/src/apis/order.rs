//! Order endpoints: creation, reads, lifecycle actions, reassignment,
//! deletion and the guest completion flow.

use axum::{
	extract::{Path, State},
	http::{HeaderMap, StatusCode},
	response::Json,
};
use orderflow_core::TransitionContext;
use orderflow_types::{
	APIError, Action, CreateOrderRequest, GuestCompleteRequest, Order, OrderView,
	ReassignRequest, Role, TransitionRequest,
};
use tracing::info;

use crate::server::AppState;

use super::{actor_from_headers, map_engine_error};

/// Handles `POST /api/orders` requests.
///
/// Called by the marketplace backend after checkout; the request is
/// trusted and carries either an account id or a guest contact snapshot.
pub async fn create_order(
	State(state): State<AppState>,
	Json(request): Json<CreateOrderRequest>,
) -> Result<Json<Order>, APIError> {
	info!(restaurant_id = %request.restaurant_id, "Creating order");

	let record = state
		.engine
		.create_order(request)
		.await
		.map_err(map_engine_error)?;
	Ok(Json(record.order))
}

/// Handles `GET /api/orders/{id}` requests.
///
/// Returns the order projected for the caller's role; customers do not
/// receive the restaurant-side pickup snapshot.
pub async fn get_order(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(id): Path<String>,
) -> Result<Json<OrderView>, APIError> {
	let actor = actor_from_headers(&headers)?;
	let view = state
		.engine
		.get_order(&actor, &id)
		.await
		.map_err(map_engine_error)?;
	Ok(Json(view))
}

/// Handles `POST /api/orders/{id}/actions/{action}` requests.
///
/// The action name in the path selects the lifecycle transition; the
/// body optionally carries a tracking message and a position.
pub async fn apply_action(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path((id, action_name)): Path<(String, String)>,
	Json(request): Json<TransitionRequest>,
) -> Result<Json<OrderView>, APIError> {
	let actor = actor_from_headers(&headers)?;
	let action = action_name
		.parse::<Action>()
		.map_err(|_| APIError::bad_request(format!("Unknown action '{action_name}'")))?;

	info!(order_id = %id, action = %action_name, "Applying lifecycle action");

	let record = state
		.engine
		.apply_transition(
			&actor,
			&id,
			action,
			TransitionContext {
				message: request.message,
				latitude: request.latitude,
				longitude: request.longitude,
			},
		)
		.await
		.map_err(map_engine_error)?;
	Ok(Json(OrderView::project(&record.order, actor.role())))
}

/// Handles `POST /api/orders/{id}/shipper` requests.
///
/// Admin-only reassignment of the delivering shipper while the order is
/// actively moving.
pub async fn reassign_shipper(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(id): Path<String>,
	Json(request): Json<ReassignRequest>,
) -> Result<Json<OrderView>, APIError> {
	let actor = actor_from_headers(&headers)?;

	info!(order_id = %id, shipper_id = %request.shipper_id, "Reassigning shipper");

	let record = state
		.engine
		.reassign_shipper(&actor, &id, &request.shipper_id)
		.await
		.map_err(map_engine_error)?;
	Ok(Json(OrderView::project(&record.order, actor.role())))
}

/// Handles `DELETE /api/orders/{id}` requests.
pub async fn remove_order(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(id): Path<String>,
) -> Result<StatusCode, APIError> {
	let actor = actor_from_headers(&headers)?;

	info!(order_id = %id, "Removing order");

	state
		.engine
		.remove_order(&actor, &id)
		.await
		.map_err(map_engine_error)?;
	Ok(StatusCode::NO_CONTENT)
}

/// Handles `POST /api/guest/orders/complete` requests.
///
/// Guests identify their order by number plus the contact supplied at
/// checkout instead of identity headers.
pub async fn guest_complete(
	State(state): State<AppState>,
	Json(request): Json<GuestCompleteRequest>,
) -> Result<Json<OrderView>, APIError> {
	info!(order_number = %request.order_number, "Guest completing order");

	let record = state
		.engine
		.guest_complete(&request.order_number, &request.contact, request.message)
		.await
		.map_err(map_engine_error)?;
	Ok(Json(OrderView::project(&record.order, Role::Customer)))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn action_path_segments_parse_into_actions() {
		assert_eq!("confirm".parse::<Action>(), Ok(Action::Confirm));
		assert_eq!("pick_up".parse::<Action>(), Ok(Action::PickUp));
		assert_eq!(
			"cancel_by_seller".parse::<Action>(),
			Ok(Action::CancelBySeller)
		);
		assert!("refund".parse::<Action>().is_err());
	}
}
