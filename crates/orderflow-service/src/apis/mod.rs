//! HTTP endpoint implementations for the orderflow API.
//!
//! Handlers extract the acting identity from gateway-supplied headers,
//! delegate to the lifecycle engine and translate engine failures into
//! the wire error envelope. Authentication itself happens upstream; the
//! headers name an already authenticated user.

pub mod order;
pub mod tracking;

use axum::http::HeaderMap;
use orderflow_core::{EngineError, TransitionError};
use orderflow_types::{APIError, Actor, Role};
use serde_json::json;

/// Builds the acting identity from the `X-Actor-Id` and `X-Actor-Role`
/// headers. Guests do not send identity headers; they use the dedicated
/// guest endpoints instead.
pub(crate) fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, APIError> {
	let id = headers
		.get("x-actor-id")
		.and_then(|value| value.to_str().ok())
		.map(str::trim)
		.filter(|value| !value.is_empty());
	let role = headers
		.get("x-actor-role")
		.and_then(|value| value.to_str().ok());

	match (id, role) {
		(Some(id), Some(role_name)) => {
			let role = role_name.parse::<Role>().map_err(|_| {
				APIError::bad_request(format!("Unknown role '{role_name}' in X-Actor-Role"))
			})?;
			Ok(Actor::user(id, role))
		}
		_ => Err(APIError::bad_request(
			"X-Actor-Id and X-Actor-Role headers are required",
		)),
	}
}

/// Maps an engine failure onto the wire error envelope.
///
/// Validation rejections keep their specific code so clients can react
/// to them; unexpected failures collapse into a 500 and are logged here,
/// since the handler has nothing further to add.
pub(crate) fn map_engine_error(error: EngineError) -> APIError {
	match error {
		EngineError::NotFound(_) => APIError::NotFound {
			message: error.to_string(),
		},
		EngineError::Rejected(rejection) => {
			let message = rejection.to_string();
			match rejection {
				TransitionError::InvalidTransition {
					current_status,
					valid_actions,
					..
				} => APIError::BadRequest {
					error: "INVALID_TRANSITION".to_string(),
					message,
					details: Some(json!({
						"currentStatus": current_status,
						"validActions": valid_actions,
					})),
				},
				TransitionError::Forbidden(message) => APIError::Forbidden { message },
				TransitionError::PaymentNotReady => APIError::BadRequest {
					error: "PAYMENT_NOT_READY".to_string(),
					message,
					details: None,
				},
				TransitionError::Dependency(_) => {
					tracing::error!(error = %message, "Collaborator failure");
					APIError::InternalServerError { message }
				}
			}
		}
		EngineError::Conflict => APIError::Conflict {
			message: error.to_string(),
		},
		EngineError::InvalidRequest(message) => APIError::bad_request(message),
		EngineError::Storage(_) | EngineError::Service(_) | EngineError::Time(_) => {
			tracing::error!(error = %error, "Engine failure");
			APIError::InternalServerError {
				message: error.to_string(),
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::http::HeaderValue;
	use orderflow_types::{Action, OrderStatus};

	fn headers(id: Option<&str>, role: Option<&str>) -> HeaderMap {
		let mut map = HeaderMap::new();
		if let Some(id) = id {
			map.insert("x-actor-id", HeaderValue::from_str(id).unwrap());
		}
		if let Some(role) = role {
			map.insert("x-actor-role", HeaderValue::from_str(role).unwrap());
		}
		map
	}

	#[test]
	fn actor_extraction_reads_both_headers() {
		let actor = actor_from_headers(&headers(Some("cust-1"), Some("customer"))).unwrap();
		assert_eq!(actor, Actor::user("cust-1", Role::Customer));
	}

	#[test]
	fn actor_extraction_requires_both_headers() {
		assert!(actor_from_headers(&headers(Some("cust-1"), None)).is_err());
		assert!(actor_from_headers(&headers(None, Some("customer"))).is_err());
		assert!(actor_from_headers(&headers(Some("  "), Some("customer"))).is_err());
	}

	#[test]
	fn unknown_roles_are_rejected() {
		let err = actor_from_headers(&headers(Some("u-1"), Some("superuser"))).unwrap_err();
		assert_eq!(err.status_code(), 400);
	}

	#[test]
	fn invalid_transitions_carry_the_valid_menu() {
		let err = map_engine_error(EngineError::Rejected(TransitionError::InvalidTransition {
			action: Action::Deliver,
			current_status: OrderStatus::Pending,
			valid_actions: vec![Action::Confirm, Action::CancelBySeller],
		}));
		assert_eq!(err.status_code(), 400);
		let body = err.to_error_response();
		assert_eq!(body.error, "INVALID_TRANSITION");
		let details = body.details.unwrap();
		assert_eq!(details["currentStatus"], "pending");
		assert_eq!(details["validActions"][0], "confirm");
	}

	#[test]
	fn rejection_classes_map_to_distinct_statuses() {
		let forbidden = map_engine_error(EngineError::Rejected(TransitionError::Forbidden(
			"no".to_string(),
		)));
		assert_eq!(forbidden.status_code(), 403);

		let payment = map_engine_error(EngineError::Rejected(TransitionError::PaymentNotReady));
		assert_eq!(payment.status_code(), 400);
		assert_eq!(payment.to_error_response().error, "PAYMENT_NOT_READY");

		let conflict = map_engine_error(EngineError::Conflict);
		assert_eq!(conflict.status_code(), 409);
		assert_eq!(conflict.to_error_response().error, "ORDER_NOT_AVAILABLE");

		let missing = map_engine_error(EngineError::NotFound("o-1".to_string()));
		assert_eq!(missing.status_code(), 404);

		let storage = map_engine_error(EngineError::Storage("disk gone".to_string()));
		assert_eq!(storage.status_code(), 500);
	}
}
