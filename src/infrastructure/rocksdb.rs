use crate::domain::order::{Order, OrderId};
use crate::domain::ports::{PaymentStore, UnitOfWork, UnitOfWorkBox};
use crate::domain::user::{User, UserId};
use crate::error::{PaymentError, Result};
use crate::infrastructure::unit::{ABSENT, ChangeSet, RowKey, Versioned};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Column Family for storing orders.
pub const CF_ORDERS: &str = "orders";
/// Column Family for storing users.
pub const CF_USERS: &str = "users";

/// A persistent store implementation using RocksDB.
///
/// Orders and users live in separate Column Families, keyed by their
/// big-endian id and stored as JSON `Versioned<T>` values. Units of work are
/// committed as a single `WriteBatch`, so a crash can never leave half of a
/// payment on disk.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBPaymentStore {
    db: Arc<DB>,
    /// Serializes version validation and batch writes across units.
    commit_lock: Arc<Mutex<()>>,
}

impl RocksDBPaymentStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("orders" and "users") exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_orders = ColumnFamilyDescriptor::new(CF_ORDERS, Options::default());
        let cf_users = ColumnFamilyDescriptor::new(CF_USERS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_orders, cf_users])?;

        Ok(Self {
            db: Arc::new(db),
            commit_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| PaymentError::Internal(format!("{name} column family not found")))
    }

    fn read<T: DeserializeOwned>(&self, cf_name: &str, id: u64) -> Result<Option<Versioned<T>>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, id.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn version(&self, key: RowKey) -> Result<u64> {
        let version = match key {
            RowKey::Order(id) => self.read::<Order>(CF_ORDERS, id)?.map(|row| row.version),
            RowKey::User(id) => self.read::<User>(CF_USERS, id)?.map(|row| row.version),
        };
        Ok(version.unwrap_or(ABSENT))
    }

    fn stage_put<T: Serialize>(
        &self,
        batch: &mut WriteBatch,
        cf_name: &str,
        id: u64,
        row: &Versioned<T>,
    ) -> Result<()> {
        let cf = self.cf(cf_name)?;
        batch.put_cf(cf, id.to_be_bytes(), serde_json::to_vec(row)?);
        Ok(())
    }

    /// Writes orders and users as one atomic batch, bumping each row's version.
    fn write_rows(&self, orders: Vec<Order>, users: Vec<User>) -> Result<()> {
        let mut batch = WriteBatch::default();
        for order in orders {
            let id = order.id;
            let row = Versioned::next(self.version(RowKey::Order(id))?, order);
            self.stage_put(&mut batch, CF_ORDERS, id, &row)?;
        }
        for user in users {
            let id = user.id;
            let row = Versioned::next(self.version(RowKey::User(id))?, user);
            self.stage_put(&mut batch, CF_USERS, id, &row)?;
        }
        self.db.write(&batch)?;
        Ok(())
    }
}

#[async_trait]
impl PaymentStore for RocksDBPaymentStore {
    async fn order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.read(CF_ORDERS, id)?.map(|row| row.record))
    }

    async fn user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.read(CF_USERS, id)?.map(|row| row.record))
    }

    async fn put_order(&self, order: Order) -> Result<()> {
        let _guard = self.commit_lock.lock().await;
        self.write_rows(vec![order], Vec::new())
    }

    async fn put_user(&self, user: User) -> Result<()> {
        let _guard = self.commit_lock.lock().await;
        self.write_rows(Vec::new(), vec![user])
    }

    async fn begin(&self) -> Result<UnitOfWorkBox<'_>> {
        Ok(Box::new(RocksDBUnitOfWork {
            store: self.clone(),
            changes: ChangeSet::new(),
        }))
    }
}

pub struct RocksDBUnitOfWork {
    store: RocksDBPaymentStore,
    changes: ChangeSet,
}

impl RocksDBUnitOfWork {
    fn observe(&mut self, key: RowKey) -> Result<()> {
        if !self.changes.has_observed(key) {
            let version = self.store.version(key)?;
            self.changes.observe(key, version);
        }
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for RocksDBUnitOfWork {
    async fn order(&mut self, id: OrderId) -> Result<Option<Order>> {
        if let Some(order) = self.changes.staged_order(id) {
            return Ok(Some(order.clone()));
        }
        let row = self.store.read::<Order>(CF_ORDERS, id)?;
        self.changes
            .observe(RowKey::Order(id), row.as_ref().map_or(ABSENT, |row| row.version));
        Ok(row.map(|row| row.record))
    }

    async fn user(&mut self, id: UserId) -> Result<Option<User>> {
        if let Some(user) = self.changes.staged_user(id) {
            return Ok(Some(user.clone()));
        }
        let row = self.store.read::<User>(CF_USERS, id)?;
        self.changes
            .observe(RowKey::User(id), row.as_ref().map_or(ABSENT, |row| row.version));
        Ok(row.map(|row| row.record))
    }

    async fn save_order(&mut self, order: Order) -> Result<()> {
        self.observe(RowKey::Order(order.id))?;
        self.changes.stage_order(order);
        Ok(())
    }

    async fn save_user(&mut self, user: User) -> Result<()> {
        self.observe(RowKey::User(user.id))?;
        self.changes.stage_user(user);
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<()> {
        let store = self.store.clone();
        let _guard = store.commit_lock.lock().await;
        self.changes.validate(|key| store.version(key))?;

        let (orders, users) = self.changes.drain();
        store.write_rows(orders, users)
    }
}

impl Drop for RocksDBUnitOfWork {
    fn drop(&mut self) {
        if !self.changes.is_empty() {
            debug!("discarding uncommitted RocksDB unit of work");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{Money, OrderStatus};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBPaymentStore::open(dir.path()).expect("Failed to open RocksDB");

        // Verify CFs exist
        assert!(store.db.cf_handle(CF_ORDERS).is_some());
        assert!(store.db.cf_handle(CF_USERS).is_some());
    }

    #[tokio::test]
    async fn test_rocksdb_store_roundtrip() {
        let dir = tempdir().unwrap();
        let store = RocksDBPaymentStore::open(dir.path()).unwrap();

        let order = Order::new(1, 7, Money::new(dec!(42.5)).unwrap());
        store.put_order(order.clone()).await.unwrap();
        store.put_user(User::with_points(7, 2)).await.unwrap();

        assert_eq!(store.order(1).await.unwrap(), Some(order));
        assert_eq!(store.user(7).await.unwrap(), Some(User::with_points(7, 2)));
        assert!(store.order(2).await.unwrap().is_none());
        assert_eq!(store.version(RowKey::Order(1)).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rocksdb_unit_commit_and_rollback() {
        let dir = tempdir().unwrap();
        let store = RocksDBPaymentStore::open(dir.path()).unwrap();
        store
            .put_order(Order::new(1, 7, Money::new(dec!(10)).unwrap()))
            .await
            .unwrap();

        {
            let mut unit = store.begin().await.unwrap();
            let paid = unit.order(1).await.unwrap().unwrap().with_status(OrderStatus::Paid);
            unit.save_order(paid).await.unwrap();
        }
        assert!(store.order(1).await.unwrap().unwrap().is_pending());

        let mut unit = store.begin().await.unwrap();
        let paid = unit.order(1).await.unwrap().unwrap().with_status(OrderStatus::Paid);
        unit.save_order(paid).await.unwrap();
        unit.save_user(User::with_points(7, 10)).await.unwrap();
        unit.commit().await.unwrap();

        assert_eq!(
            store.order(1).await.unwrap().unwrap().status,
            OrderStatus::Paid
        );
        assert_eq!(store.user(7).await.unwrap(), Some(User::with_points(7, 10)));
    }

    #[tokio::test]
    async fn test_rocksdb_commit_conflict() {
        let dir = tempdir().unwrap();
        let store = RocksDBPaymentStore::open(dir.path()).unwrap();
        store.put_user(User::new(7)).await.unwrap();

        let mut unit = store.begin().await.unwrap();
        unit.user(7).await.unwrap();
        unit.save_user(User::with_points(7, 5)).await.unwrap();
        store.put_user(User::with_points(7, 1)).await.unwrap();

        assert!(matches!(unit.commit().await, Err(PaymentError::Conflict(_))));
        assert_eq!(store.user(7).await.unwrap(), Some(User::with_points(7, 1)));
    }
}
