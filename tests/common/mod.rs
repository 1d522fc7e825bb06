#![allow(dead_code)]

use async_trait::async_trait;
use order_payments::domain::order::{Money, Order, OrderId, OrderStatus};
use order_payments::domain::ports::{PaymentStore, UnitOfWork, UnitOfWorkBox};
use order_payments::domain::user::{User, UserId};
use order_payments::error::{PaymentError, Result};
use order_payments::infrastructure::in_memory::InMemoryPaymentStore;
use rust_decimal::Decimal;

pub const OWNER: UserId = 1;
pub const STRANGER: UserId = 2;

pub fn order(id: OrderId, owner: UserId, total: Decimal, status: OrderStatus) -> Order {
    Order::new(id, owner, Money::new(total).unwrap()).with_status(status)
}

/// A store holding `OWNER` and `STRANGER` with zero points, plus `orders`.
pub async fn seeded_store(orders: &[Order]) -> InMemoryPaymentStore {
    let store = InMemoryPaymentStore::new();
    store.put_user(User::new(OWNER)).await.unwrap();
    store.put_user(User::new(STRANGER)).await.unwrap();
    for order in orders {
        store.put_order(order.clone()).await.unwrap();
    }
    store
}

pub async fn points_of(store: &dyn PaymentStore, user: UserId) -> u64 {
    store.user(user).await.unwrap().unwrap().credit_points.value()
}

pub async fn fetch_order(store: &dyn PaymentStore, id: OrderId) -> Order {
    store.order(id).await.unwrap().unwrap()
}

pub async fn status_of(store: &dyn PaymentStore, id: OrderId) -> OrderStatus {
    fetch_order(store, id).await.status
}

/// Where a [`FaultyStore`] unit of work breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    SaveUser,
    Commit,
}

/// Wraps an in-memory store and makes its units of work fail at one point.
#[derive(Clone)]
pub struct FaultyStore {
    pub inner: InMemoryPaymentStore,
    pub fail_at: FailAt,
}

#[async_trait]
impl PaymentStore for FaultyStore {
    async fn order(&self, id: OrderId) -> Result<Option<Order>> {
        self.inner.order(id).await
    }

    async fn user(&self, id: UserId) -> Result<Option<User>> {
        self.inner.user(id).await
    }

    async fn put_order(&self, order: Order) -> Result<()> {
        self.inner.put_order(order).await
    }

    async fn put_user(&self, user: User) -> Result<()> {
        self.inner.put_user(user).await
    }

    async fn begin(&self) -> Result<UnitOfWorkBox<'_>> {
        Ok(Box::new(FaultyUnit {
            inner: self.inner.begin().await?,
            fail_at: self.fail_at,
        }))
    }
}

struct FaultyUnit<'a> {
    inner: UnitOfWorkBox<'a>,
    fail_at: FailAt,
}

#[async_trait]
impl<'a> UnitOfWork for FaultyUnit<'a> {
    async fn order(&mut self, id: OrderId) -> Result<Option<Order>> {
        self.inner.order(id).await
    }

    async fn user(&mut self, id: UserId) -> Result<Option<User>> {
        self.inner.user(id).await
    }

    async fn save_order(&mut self, order: Order) -> Result<()> {
        self.inner.save_order(order).await
    }

    async fn save_user(&mut self, user: User) -> Result<()> {
        if self.fail_at == FailAt::SaveUser {
            return Err(PaymentError::Internal("DB Error".to_string()));
        }
        self.inner.save_user(user).await
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        if self.fail_at == FailAt::Commit {
            return Err(PaymentError::Internal("DB Error".to_string()));
        }
        self.inner.commit().await
    }
}
