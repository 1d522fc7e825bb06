use crate::domain::order::{Order, OrderId};
use crate::domain::ports::{PaymentStore, UnitOfWork, UnitOfWorkBox};
use crate::domain::user::{User, UserId};
use crate::error::Result;
use crate::infrastructure::unit::{ABSENT, ChangeSet, RowKey, Versioned};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct Tables {
    orders: HashMap<OrderId, Versioned<Order>>,
    users: HashMap<UserId, Versioned<User>>,
}

impl Tables {
    fn version(&self, key: RowKey) -> u64 {
        match key {
            RowKey::Order(id) => self.orders.get(&id).map_or(ABSENT, |row| row.version),
            RowKey::User(id) => self.users.get(&id).map_or(ABSENT, |row| row.version),
        }
    }

    fn write_order(&mut self, order: Order) {
        let previous = self.version(RowKey::Order(order.id));
        self.orders.insert(order.id, Versioned::next(previous, order));
    }

    fn write_user(&mut self, user: User) {
        let previous = self.version(RowKey::User(user.id));
        self.users.insert(user.id, Versioned::next(previous, user));
    }
}

/// A thread-safe in-memory store for orders and users.
///
/// Uses `Arc<RwLock<..>>` so clones share the same tables. Units of work
/// buffer their writes and apply them under the write lock on commit.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryPaymentStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn order(&self, id: OrderId) -> Result<Option<Order>> {
        let tables = self.tables.read().await;
        Ok(tables.orders.get(&id).map(|row| row.record.clone()))
    }

    async fn user(&self, id: UserId) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).map(|row| row.record.clone()))
    }

    async fn put_order(&self, order: Order) -> Result<()> {
        self.tables.write().await.write_order(order);
        Ok(())
    }

    async fn put_user(&self, user: User) -> Result<()> {
        self.tables.write().await.write_user(user);
        Ok(())
    }

    async fn begin(&self) -> Result<UnitOfWorkBox<'_>> {
        Ok(Box::new(InMemoryUnitOfWork {
            tables: Arc::clone(&self.tables),
            changes: ChangeSet::new(),
        }))
    }
}

pub struct InMemoryUnitOfWork {
    tables: Arc<RwLock<Tables>>,
    changes: ChangeSet,
}

impl InMemoryUnitOfWork {
    async fn observe(&mut self, key: RowKey) {
        if !self.changes.has_observed(key) {
            let version = self.tables.read().await.version(key);
            self.changes.observe(key, version);
        }
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn order(&mut self, id: OrderId) -> Result<Option<Order>> {
        if let Some(order) = self.changes.staged_order(id) {
            return Ok(Some(order.clone()));
        }
        let tables = self.tables.read().await;
        let row = tables.orders.get(&id);
        self.changes
            .observe(RowKey::Order(id), row.map_or(ABSENT, |row| row.version));
        Ok(row.map(|row| row.record.clone()))
    }

    async fn user(&mut self, id: UserId) -> Result<Option<User>> {
        if let Some(user) = self.changes.staged_user(id) {
            return Ok(Some(user.clone()));
        }
        let tables = self.tables.read().await;
        let row = tables.users.get(&id);
        self.changes
            .observe(RowKey::User(id), row.map_or(ABSENT, |row| row.version));
        Ok(row.map(|row| row.record.clone()))
    }

    async fn save_order(&mut self, order: Order) -> Result<()> {
        self.observe(RowKey::Order(order.id)).await;
        self.changes.stage_order(order);
        Ok(())
    }

    async fn save_user(&mut self, user: User) -> Result<()> {
        self.observe(RowKey::User(user.id)).await;
        self.changes.stage_user(user);
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<()> {
        let mut tables = self.tables.write().await;
        self.changes.validate(|key| Ok(tables.version(key)))?;

        let (orders, users) = self.changes.drain();
        for order in orders {
            tables.write_order(order);
        }
        for user in users {
            tables.write_user(user);
        }
        Ok(())
    }
}

impl Drop for InMemoryUnitOfWork {
    fn drop(&mut self) {
        if !self.changes.is_empty() {
            debug!("discarding uncommitted in-memory unit of work");
        }
    }
}
