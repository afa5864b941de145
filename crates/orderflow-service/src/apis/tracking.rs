//! Tracking endpoints: the per-order tracking view for participants and
//! guests, plus shipper position reporting.

use axum::{
	extract::{Path, Query, State},
	http::{HeaderMap, StatusCode},
	response::Json,
};
use orderflow_types::{APIError, GuestTrackQuery, LocationUpdateRequest, TrackingView};
use tracing::info;

use crate::server::AppState;

use super::{actor_from_headers, map_engine_error};

/// Handles `GET /api/orders/{id}/tracking` requests.
///
/// Returns the tracking log plus, while the order is actively moving,
/// the shipper's last reported position.
pub async fn track_order(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(id): Path<String>,
) -> Result<Json<TrackingView>, APIError> {
	let actor = actor_from_headers(&headers)?;
	let view = state
		.engine
		.track_order(&actor, &id)
		.await
		.map_err(map_engine_error)?;
	Ok(Json(view))
}

/// Handles `GET /api/guest/orders/{order_number}/tracking` requests.
///
/// The contact supplied at checkout doubles as the guest's credential;
/// a mismatch reads as not found so order numbers cannot be probed.
pub async fn guest_track(
	State(state): State<AppState>,
	Path(order_number): Path<String>,
	Query(query): Query<GuestTrackQuery>,
) -> Result<Json<TrackingView>, APIError> {
	let view = state
		.engine
		.guest_track(&order_number, &query.contact)
		.await
		.map_err(map_engine_error)?;
	Ok(Json(view))
}

/// Handles `POST /api/shippers/{id}/location` requests.
///
/// Shippers report their own position; the update expires from storage
/// after the configured TTL so stale positions never reach customers.
pub async fn record_location(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(shipper_id): Path<String>,
	Json(request): Json<LocationUpdateRequest>,
) -> Result<StatusCode, APIError> {
	let actor = actor_from_headers(&headers)?;

	info!(shipper_id = %shipper_id, "Recording shipper location");

	state
		.engine
		.record_location(
			&actor,
			&shipper_id,
			request.latitude,
			request.longitude,
			request.order_id,
		)
		.await
		.map_err(map_engine_error)?;
	Ok(StatusCode::NO_CONTENT)
}
