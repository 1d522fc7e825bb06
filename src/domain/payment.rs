use crate::domain::order::Order;
use crate::domain::user::CreditPoints;
use serde::Serialize;

/// Outcome of a successful payment. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentResult {
    /// The order as committed, re-read after the status change.
    pub order: Order,
    pub user_credit_points: CreditPoints,
}
