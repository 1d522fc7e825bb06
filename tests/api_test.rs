use order_payments::domain::order::OrderStatus;
use order_payments::interfaces::api::PaymentController;
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::Arc;

mod common;
use common::{OWNER, STRANGER, order, points_of, seeded_store, status_of};

#[tokio::test]
async fn test_successful_payment_response() {
    let store = seeded_store(&[order(1, OWNER, dec!(120), OrderStatus::Pending)]).await;
    let controller = PaymentController::new(Arc::new(store.clone()));

    let response = controller.pay(1, &json!({ "user_id": OWNER })).await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body["message"], "Payment processed successfully.");
    assert_eq!(response.body["order"]["status"], "paid");
    assert_eq!(response.body["order"]["id"], 1);
    assert_eq!(response.body["order"]["total_price"], "120");
    assert_eq!(response.body["user_credit_points"], 130);
    assert_eq!(status_of(&store, 1).await, OrderStatus::Paid);
    assert_eq!(points_of(&store, OWNER).await, 130);
}

#[tokio::test]
async fn test_not_pending_returns_bad_request_message() {
    let store = seeded_store(&[order(1, OWNER, dec!(150), OrderStatus::Paid)]).await;
    let controller = PaymentController::new(Arc::new(store));

    let response = controller.pay(1, &json!({ "user_id": OWNER })).await;

    assert_eq!(response.status, 400);
    assert_eq!(
        response.body,
        json!({ "message": "Order status is not pending. Payment cannot be processed." })
    );
}

#[tokio::test]
async fn test_wrong_user_returns_field_errors() {
    let store = seeded_store(&[order(1, STRANGER, dec!(150), OrderStatus::Pending)]).await;
    let controller = PaymentController::new(Arc::new(store.clone()));

    let response = controller.pay(1, &json!({ "user_id": OWNER })).await;

    assert_eq!(response.status, 400);
    assert_eq!(
        response.body,
        json!({
            "message": "The given data was invalid.",
            "errors": { "user_id": ["This order does not belong to the given user."] },
        })
    );
    assert_eq!(status_of(&store, 1).await, OrderStatus::Pending);
}

#[tokio::test]
async fn test_missing_user_id_is_unprocessable() {
    let store = seeded_store(&[order(1, OWNER, dec!(10), OrderStatus::Pending)]).await;
    let controller = PaymentController::new(Arc::new(store.clone()));

    let response = controller.pay(1, &json!({})).await;

    assert_eq!(response.status, 422);
    assert_eq!(response.body["message"], "The user id field is required.");
    assert_eq!(
        response.body["errors"]["user_id"][0],
        "The user id field is required."
    );
    assert_eq!(status_of(&store, 1).await, OrderStatus::Pending);
}

#[tokio::test]
async fn test_shape_is_checked_before_order_lookup() {
    let store = seeded_store(&[]).await;
    let controller = PaymentController::new(Arc::new(store));

    let response = controller.pay(99, &json!({ "user_id": "abc" })).await;

    assert_eq!(response.status, 422);
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let store = seeded_store(&[]).await;
    let controller = PaymentController::new(Arc::new(store));

    let response = controller.pay(99, &json!({ "user_id": OWNER })).await;

    assert_eq!(response.status, 404);
    assert_eq!(response.body["message"], "No query results for order 99.");
}

#[tokio::test]
async fn test_unknown_user_is_bad_request() {
    let store = seeded_store(&[order(1, 77, dec!(10), OrderStatus::Pending)]).await;
    let controller = PaymentController::new(Arc::new(store.clone()));

    let response = controller.pay(1, &json!({ "user_id": 77 })).await;

    assert_eq!(response.status, 400);
    assert_eq!(response.body["message"], "No query results for user 77.");
    assert_eq!(status_of(&store, 1).await, OrderStatus::Pending);
}
