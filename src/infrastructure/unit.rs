//! Bookkeeping shared by the store backends' units of work.
//!
//! A unit stages its writes in a [`ChangeSet`] and remembers the version of
//! every row it has looked at. Commit validates those versions against the
//! backend and only then applies the staged rows, which gives each unit
//! read-committed isolation with write-conflict detection.

use crate::domain::order::{Order, OrderId};
use crate::domain::user::{User, UserId};
use crate::error::{PaymentError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Version of a row that does not exist.
pub const ABSENT: u64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowKey {
    Order(OrderId),
    User(UserId),
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Order(id) => write!(f, "order {id}"),
            Self::User(id) => write!(f, "user {id}"),
        }
    }
}

/// A stored record together with its write counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub version: u64,
    pub record: T,
}

impl<T> Versioned<T> {
    /// Wraps `record` as the successor of a row currently at `previous`.
    pub fn next(previous: u64, record: T) -> Self {
        Self {
            version: previous + 1,
            record,
        }
    }
}

/// Staged writes plus the read set of one unit of work.
#[derive(Debug, Default)]
pub struct ChangeSet {
    observed: HashMap<RowKey, u64>,
    orders: BTreeMap<OrderId, Order>,
    users: BTreeMap<UserId, User>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn staged_order(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    pub fn staged_user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Records the version of `key` as seen by this unit. Only the first
    /// observation counts; later reads must not mask a concurrent write.
    pub fn observe(&mut self, key: RowKey, version: u64) {
        self.observed.entry(key).or_insert(version);
    }

    pub fn has_observed(&self, key: RowKey) -> bool {
        self.observed.contains_key(&key)
    }

    pub fn stage_order(&mut self, order: Order) {
        self.orders.insert(order.id, order);
    }

    pub fn stage_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    /// True when no writes are staged.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty() && self.users.is_empty()
    }

    /// Fails with [`PaymentError::Conflict`] on the first observed row whose
    /// current version differs from the one this unit saw.
    pub fn validate<F>(&self, mut current_version: F) -> Result<()>
    where
        F: FnMut(RowKey) -> Result<u64>,
    {
        for (key, seen) in &self.observed {
            if current_version(*key)? != *seen {
                return Err(PaymentError::Conflict(key.to_string()));
            }
        }
        Ok(())
    }

    /// Hands the staged rows over for application, leaving the set empty.
    pub fn drain(&mut self) -> (Vec<Order>, Vec<User>) {
        self.observed.clear();
        let orders = std::mem::take(&mut self.orders).into_values().collect();
        let users = std::mem::take(&mut self.users).into_values().collect();
        (orders, users)
    }
}
