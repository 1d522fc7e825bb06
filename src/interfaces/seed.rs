use crate::domain::order::Order;
use crate::domain::ports::PaymentStore;
use crate::domain::user::User;
use crate::error::Result;
use serde::Deserialize;
use std::io::Read;
use tracing::info;

/// Users and orders to load into a store before processing requests.
///
/// ```json
/// { "users": [{ "id": 1, "credit_points": 0 }],
///   "orders": [{ "id": 10, "user_id": 1, "total_price": "120", "status": "pending" }] }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

impl SeedData {
    pub fn from_reader<R: Read>(source: R) -> Result<Self> {
        Ok(serde_json::from_reader(source)?)
    }

    /// Upserts every user and order into `store`.
    pub async fn load_into(self, store: &dyn PaymentStore) -> Result<()> {
        let (users, orders) = (self.users.len(), self.orders.len());
        for user in self.users {
            store.put_user(user).await?;
        }
        for order in self.orders {
            store.put_order(order).await?;
        }
        info!(users, orders, "seed data loaded");
        Ok(())
    }
}
