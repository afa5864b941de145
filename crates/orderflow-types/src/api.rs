//! API types for the orderflow HTTP surface.
//!
//! Request bodies accepted by the server, the error envelope returned
//! on failure, and the `APIError` type handlers use to map engine
//! failures onto HTTP statuses. The axum conversion is feature-gated so
//! non-server crates can use these types without pulling in the web
//! stack.

use crate::{AddressSnapshot, PaymentMethod};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Body for `POST /api/orders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
	#[serde(rename = "customerId", skip_serializing_if = "Option::is_none")]
	pub customer_id: Option<String>,
	#[serde(rename = "customerEmail", skip_serializing_if = "Option::is_none")]
	pub customer_email: Option<String>,
	#[serde(rename = "guestName", skip_serializing_if = "Option::is_none")]
	pub guest_name: Option<String>,
	#[serde(rename = "restaurantId")]
	pub restaurant_id: String,
	#[serde(rename = "paymentMethod")]
	pub payment_method: PaymentMethod,
	pub pickup: AddressSnapshot,
	pub delivery: AddressSnapshot,
	pub subtotal: Decimal,
	#[serde(rename = "deliveryFee")]
	pub delivery_fee: Decimal,
	/// Defaults to zero when omitted.
	#[serde(default)]
	pub discount: Decimal,
}

/// Body for `POST /api/orders/{id}/actions/{action}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransitionRequest {
	/// Optional note recorded in the tracking log instead of the
	/// default message for the action.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub latitude: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub longitude: Option<f64>,
}

/// Body for `POST /api/guest/orders/complete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestCompleteRequest {
	#[serde(rename = "orderNumber")]
	pub order_number: String,
	/// Email or delivery phone supplied at checkout.
	pub contact: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}

/// Query for `GET /api/guest/orders/{order_number}/tracking`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestTrackQuery {
	pub contact: String,
}

/// Body for `POST /api/orders/{id}/shipper`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReassignRequest {
	#[serde(rename = "shipperId")]
	pub shipper_id: String,
}

/// Body for `POST /api/shippers/{id}/location`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationUpdateRequest {
	pub latitude: f64,
	pub longitude: f64,
	#[serde(rename = "orderId", skip_serializing_if = "Option::is_none")]
	pub order_id: Option<String>,
}

/// Error envelope returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Stable machine-readable code, e.g. `INVALID_TRANSITION`.
	pub error: String,
	/// Human-readable description.
	pub message: String,
	/// Additional context, e.g. the valid next actions for a rejected
	/// transition.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Structured API error with HTTP status mapping.
#[derive(Debug)]
pub enum APIError {
	/// Malformed input or a rejected transition (400). `error` carries
	/// the specific code, e.g. `INVALID_TRANSITION` or
	/// `PAYMENT_NOT_READY`.
	BadRequest {
		error: String,
		message: String,
		details: Option<serde_json::Value>,
	},
	/// Actor is known but not allowed to touch this order (403).
	Forbidden { message: String },
	/// Referenced order does not exist (404).
	NotFound { message: String },
	/// Lost a write race, e.g. another shipper claimed the order (409).
	Conflict { message: String },
	/// Unexpected persistence or internal failure (500).
	InternalServerError { message: String },
}

impl APIError {
	pub fn bad_request(message: impl Into<String>) -> Self {
		APIError::BadRequest {
			error: "BAD_REQUEST".to_string(),
			message: message.into(),
			details: None,
		}
	}

	/// HTTP status this error maps to.
	pub fn status_code(&self) -> u16 {
		match self {
			APIError::BadRequest { .. } => 400,
			APIError::Forbidden { .. } => 403,
			APIError::NotFound { .. } => 404,
			APIError::Conflict { .. } => 409,
			APIError::InternalServerError { .. } => 500,
		}
	}

	/// Builds the wire envelope for this error.
	pub fn to_error_response(&self) -> ErrorResponse {
		match self {
			APIError::BadRequest {
				error,
				message,
				details,
			} => ErrorResponse {
				error: error.clone(),
				message: message.clone(),
				details: details.clone(),
			},
			APIError::Forbidden { message } => ErrorResponse {
				error: "FORBIDDEN".to_string(),
				message: message.clone(),
				details: None,
			},
			APIError::NotFound { message } => ErrorResponse {
				error: "ORDER_NOT_FOUND".to_string(),
				message: message.clone(),
				details: None,
			},
			APIError::Conflict { message } => ErrorResponse {
				error: "ORDER_NOT_AVAILABLE".to_string(),
				message: message.clone(),
				details: None,
			},
			APIError::InternalServerError { message } => ErrorResponse {
				error: "INTERNAL_ERROR".to_string(),
				message: message.clone(),
				details: None,
			},
		}
	}
}

impl fmt::Display for APIError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			APIError::BadRequest { message, .. } => write!(f, "bad request: {message}"),
			APIError::Forbidden { message } => write!(f, "forbidden: {message}"),
			APIError::NotFound { message } => write!(f, "not found: {message}"),
			APIError::Conflict { message } => write!(f, "conflict: {message}"),
			APIError::InternalServerError { message } => {
				write!(f, "internal server error: {message}")
			}
		}
	}
}

impl std::error::Error for APIError {}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for APIError {
	fn into_response(self) -> axum::response::Response {
		let status = axum::http::StatusCode::from_u16(self.status_code())
			.unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
		(status, axum::Json(self.to_error_response())).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn status_codes() {
		assert_eq!(APIError::bad_request("x").status_code(), 400);
		assert_eq!(
			APIError::Forbidden {
				message: "x".into()
			}
			.status_code(),
			403
		);
		assert_eq!(
			APIError::NotFound {
				message: "x".into()
			}
			.status_code(),
			404
		);
		assert_eq!(
			APIError::Conflict {
				message: "x".into()
			}
			.status_code(),
			409
		);
		assert_eq!(
			APIError::InternalServerError {
				message: "x".into()
			}
			.status_code(),
			500
		);
	}

	#[test]
	fn bad_request_preserves_code_and_details() {
		let err = APIError::BadRequest {
			error: "INVALID_TRANSITION".to_string(),
			message: "cannot confirm from ready".to_string(),
			details: Some(json!({ "currentStatus": "ready" })),
		};
		let body = err.to_error_response();
		assert_eq!(body.error, "INVALID_TRANSITION");
		assert_eq!(body.details.unwrap()["currentStatus"], "ready");
	}

	#[test]
	fn transition_request_defaults_empty() {
		let req: TransitionRequest = serde_json::from_str("{}").unwrap();
		assert!(req.message.is_none());
		assert!(req.latitude.is_none());
	}

	#[test]
	fn create_request_defaults_discount() {
		let req: CreateOrderRequest = serde_json::from_value(json!({
			"restaurantId": "rest-1",
			"paymentMethod": "cash",
			"pickup": { "address": "1 Kitchen Way", "phone": "555-0100" },
			"delivery": { "address": "9 Home St", "phone": "555-0199" },
			"subtotal": "10.00",
			"deliveryFee": "2.00"
		}))
		.unwrap();
		assert_eq!(req.discount, Decimal::ZERO);
	}
}
