//! Request/response mapping around [`PaymentProcessor`].
//!
//! This is the transport-facing side of a payment: it checks the request
//! shape, resolves the order, calls the processor and turns the outcome into a
//! status code plus a JSON body. It knows nothing about sockets or routing.

use crate::application::processor::PaymentProcessor;
use crate::domain::order::{Order, OrderId};
use crate::domain::payment::PaymentResult;
use crate::domain::ports::SharedPaymentStore;
use crate::domain::user::UserId;
use crate::error::{PaymentError, ValidationErrors};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_UNPROCESSABLE: u16 = 422;

const SUCCESS_MESSAGE: &str = "Payment processed successfully.";
const INVALID_DATA_MESSAGE: &str = "The given data was invalid.";

/// A status code and the JSON body to send with it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    fn message(status: u16, message: impl Into<String>) -> Self {
        Self::new(status, json!({ "message": message.into() }))
    }

    fn with_errors(status: u16, message: &str, errors: &ValidationErrors) -> Self {
        Self::new(status, json!({ "message": message, "errors": errors }))
    }
}

/// Public representation of an order.
#[derive(Debug, Serialize)]
pub struct OrderResource<'a> {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_price: String,
    pub status: &'a str,
}

impl<'a> From<&'a Order> for OrderResource<'a> {
    fn from(order: &'a Order) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            total_price: order.total_price.to_string(),
            status: order.status.as_str(),
        }
    }
}

/// Validated body of a pay request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayRequest {
    pub user_id: UserId,
}

impl PayRequest {
    /// Checks the request shape: `user_id` is required and must be a
    /// non-negative integer.
    pub fn from_body(body: &Value) -> Result<Self, ValidationErrors> {
        match body.get("user_id") {
            None | Some(Value::Null) => Err(ValidationErrors::single(
                "user_id",
                "The user id field is required.",
            )),
            Some(value) => value
                .as_u64()
                .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
                .map(|user_id| Self { user_id })
                .ok_or_else(|| {
                    ValidationErrors::single("user_id", "The user id field must be an integer.")
                }),
        }
    }
}

/// Handles `pay` requests for orders held in a store.
pub struct PaymentController {
    store: SharedPaymentStore,
    processor: PaymentProcessor,
}

impl PaymentController {
    pub fn new(store: SharedPaymentStore) -> Self {
        let processor = PaymentProcessor::new(store.clone());
        Self { store, processor }
    }

    /// Pays order `order_id` with the JSON request `body`.
    pub async fn pay(&self, order_id: OrderId, body: &Value) -> ApiResponse {
        let request = match PayRequest::from_body(body) {
            Ok(request) => request,
            Err(errors) => {
                let message = errors.first_message().unwrap_or(INVALID_DATA_MESSAGE);
                return ApiResponse::with_errors(STATUS_UNPROCESSABLE, message, &errors);
            }
        };

        let order = match self.store.order(order_id).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                return ApiResponse::message(
                    STATUS_NOT_FOUND,
                    PaymentError::OrderNotFound(order_id).to_string(),
                );
            }
            Err(e) => return Self::failure(e),
        };

        match self.processor.process_payment(&order, request.user_id).await {
            Ok(result) => Self::success(&result),
            Err(e) => Self::failure(e),
        }
    }

    fn success(result: &PaymentResult) -> ApiResponse {
        ApiResponse::new(
            STATUS_OK,
            json!({
                "message": SUCCESS_MESSAGE,
                "order": OrderResource::from(&result.order),
                "user_credit_points": result.user_credit_points.value(),
            }),
        )
    }

    fn failure(err: PaymentError) -> ApiResponse {
        match err {
            PaymentError::Validation(errors) => {
                ApiResponse::with_errors(STATUS_BAD_REQUEST, INVALID_DATA_MESSAGE, &errors)
            }
            rejected @ (PaymentError::InvalidState { .. } | PaymentError::UserNotFound(_)) => {
                ApiResponse::message(STATUS_BAD_REQUEST, rejected.to_string())
            }
            other => {
                error!(error = %other, "payment failed");
                ApiResponse::message(STATUS_BAD_REQUEST, other.to_string())
            }
        }
    }
}
