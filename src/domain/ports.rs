use super::order::{Order, OrderId};
use super::user::{User, UserId};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Persistence for orders and users.
///
/// Single-record reads and writes go straight to the backend. Anything that
/// must change several records together goes through a [`UnitOfWork`]
/// obtained from [`PaymentStore::begin`].
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn order(&self, id: OrderId) -> Result<Option<Order>>;
    async fn user(&self, id: UserId) -> Result<Option<User>>;
    async fn put_order(&self, order: Order) -> Result<()>;
    async fn put_user(&self, user: User) -> Result<()>;

    /// Opens an atomic unit against this store.
    async fn begin(&self) -> Result<UnitOfWorkBox<'_>>;
}

/// An all-or-nothing group of reads and writes.
///
/// Reads observe the unit's own staged writes. Nothing becomes visible to
/// other readers until [`UnitOfWork::commit`] succeeds; dropping the unit
/// without committing discards every staged write.
///
/// `commit` fails with [`PaymentError::Conflict`](crate::error::PaymentError::Conflict)
/// when any record read or written through the unit was changed by someone
/// else in the meantime.
#[async_trait]
pub trait UnitOfWork: Send {
    async fn order(&mut self, id: OrderId) -> Result<Option<Order>>;
    async fn user(&mut self, id: UserId) -> Result<Option<User>>;
    async fn save_order(&mut self, order: Order) -> Result<()>;
    async fn save_user(&mut self, user: User) -> Result<()>;
    async fn commit(self: Box<Self>) -> Result<()>;
}

pub type SharedPaymentStore = Arc<dyn PaymentStore>;
pub type UnitOfWorkBox<'a> = Box<dyn UnitOfWork + 'a>;
