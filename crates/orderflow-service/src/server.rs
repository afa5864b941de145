//! HTTP server for the orderflow API.
//!
//! Builds the router over the lifecycle engine and serves it with the
//! configured timeout and body size limits.

use std::sync::Arc;
use std::time::Duration;

use axum::{
	routing::{get, post},
	Router,
};
use orderflow_config::ApiConfig;
use orderflow_core::LifecycleEngine;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
	cors::CorsLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::apis;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the lifecycle engine for processing requests.
	pub engine: Arc<LifecycleEngine>,
}

/// Routes under the `/api` base path.
fn api_router() -> Router<AppState> {
	Router::new()
		.route("/orders", post(apis::order::create_order))
		.route(
			"/orders/{id}",
			get(apis::order::get_order).delete(apis::order::remove_order),
		)
		.route(
			"/orders/{id}/actions/{action}",
			post(apis::order::apply_action),
		)
		.route("/orders/{id}/tracking", get(apis::tracking::track_order))
		.route("/orders/{id}/shipper", post(apis::order::reassign_shipper))
		.route("/guest/orders/complete", post(apis::order::guest_complete))
		.route(
			"/guest/orders/{order_number}/tracking",
			get(apis::tracking::guest_track),
		)
		.route(
			"/shippers/{id}/location",
			post(apis::tracking::record_location),
		)
}

/// Starts the HTTP server for the API.
///
/// Runs until the listener fails; the caller races this against the
/// engine loop and shuts both down together.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<LifecycleEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app_state = AppState { engine };

	// The body-limit layer is applied in its own `Router::layer` call (added
	// first, so it sits innermost) because `Router::layer` re-boxes the
	// response body between calls; `TimeoutLayer` and `CorsLayer` need that
	// boxed body's `Default` impl, which `RequestBodyLimit`'s body lacks.
	let app = Router::new()
		.nest("/api", api_router())
		.layer(RequestBodyLimitLayer::new(api_config.max_request_size))
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(CorsLayer::permissive())
				.layer(TimeoutLayer::new(Duration::from_secs(
					api_config.timeout_seconds,
				))),
		)
		.with_state(app_state);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Orderflow API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}
