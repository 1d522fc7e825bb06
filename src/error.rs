use crate::domain::order::OrderId;
use crate::domain::user::UserId;
use miette::Diagnostic;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaymentError>;

/// Field-keyed validation messages, e.g. `{"user_id": ["..."]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an error set holding a single message for `field`.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first message in field order, used as the summary line.
    pub fn first_message(&self) -> Option<&str> {
        self.0
            .values()
            .flat_map(|messages| messages.iter())
            .map(String::as_str)
            .next()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.first_message().unwrap_or("The given data was invalid."))
    }
}

/// Everything that can go wrong while paying for an order.
///
/// `Validation` is the only variant that carries a field-level error map; every
/// other variant is surfaced to callers as its message text.
#[derive(Error, Diagnostic, Debug)]
pub enum PaymentError {
    #[error("{0}")]
    #[diagnostic(code(payments::validation))]
    Validation(ValidationErrors),

    #[error("Order status is not pending. Payment cannot be processed.")]
    #[diagnostic(code(payments::invalid_state))]
    InvalidState { order: OrderId },

    #[error("No query results for user {0}.")]
    #[diagnostic(code(payments::user_not_found))]
    UserNotFound(UserId),

    #[error("No query results for order {0}.")]
    #[diagnostic(code(payments::order_not_found))]
    OrderNotFound(OrderId),

    #[error("Write conflict on {0}; the transaction was rolled back.")]
    #[diagnostic(
        code(payments::conflict),
        help("another payment committed first; reload the order before retrying")
    )]
    Conflict(String),

    #[error("Credit points overflow for user {0}.")]
    #[diagnostic(code(payments::credit_overflow))]
    CreditOverflow(UserId),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    /// The ownership failure: keyed to `user_id`.
    pub fn not_owner() -> Self {
        Self::Validation(ValidationErrors::single(
            "user_id",
            "This order does not belong to the given user.",
        ))
    }
}
