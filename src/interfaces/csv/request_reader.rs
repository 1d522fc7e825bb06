use crate::domain::order::OrderId;
use crate::error::{PaymentError, Result};
use serde::Deserialize;
use serde_json::{Value, json};
use std::io::Read;

/// One row of a payment batch: which order to pay and who claims to pay it.
///
/// `user` is kept as raw text so that missing or malformed values reach the
/// request validation instead of failing the CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentRequestRecord {
    pub order: OrderId,
    #[serde(default)]
    pub user: Option<String>,
}

impl PaymentRequestRecord {
    /// The JSON body a client would have sent for this row.
    pub fn body(&self) -> Value {
        match self.user.as_deref().map(str::trim) {
            None | Some("") => json!({}),
            Some(raw) => match raw.parse::<u64>() {
                Ok(user_id) => json!({ "user_id": user_id }),
                Err(_) => json!({ "user_id": raw }),
            },
        }
    }
}

/// Reads payment requests from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over
/// `Result<PaymentRequestRecord>`. It trims whitespace and accepts short rows.
pub struct PaymentRequestReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> PaymentRequestReader<R> {
    /// Creates a new `PaymentRequestReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes requests.
    pub fn requests(self) -> impl Iterator<Item = Result<PaymentRequestRecord>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PaymentError::from))
    }
}
