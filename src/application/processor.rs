use crate::domain::loyalty;
use crate::domain::order::Order;
use crate::domain::payment::PaymentResult;
use crate::domain::ports::{SharedPaymentStore, UnitOfWork};
use crate::domain::user::UserId;
use crate::error::{PaymentError, Result};
use tracing::{info, instrument, warn};

/// Marks orders as paid and credits the owner's loyalty points.
///
/// `PaymentProcessor` never looks orders up by id: it is handed an order that
/// the caller already resolved, checks it, and then performs the status
/// change and the points credit inside one unit of work on the store.
pub struct PaymentProcessor {
    store: SharedPaymentStore,
}

impl PaymentProcessor {
    /// Creates a new `PaymentProcessor` instance.
    ///
    /// # Arguments
    ///
    /// * `store` - The store holding orders and users.
    pub fn new(store: SharedPaymentStore) -> Self {
        Self { store }
    }

    /// Pays `order` on behalf of `acting_user`.
    ///
    /// Ownership is checked before the status, and both checks run before
    /// anything is written. On any error after that point the unit of work is
    /// dropped uncommitted, leaving the order `pending` and the balance as it
    /// was.
    #[instrument(skip_all, fields(order_id = order.id, user_id = acting_user))]
    pub async fn process_payment(&self, order: &Order, acting_user: UserId) -> Result<PaymentResult> {
        if !order.is_owned_by(acting_user) {
            warn!(owner = order.user_id, "order does not belong to acting user");
            return Err(PaymentError::not_owner());
        }
        if !order.is_pending() {
            warn!(status = %order.status, "order is not pending");
            return Err(PaymentError::InvalidState { order: order.id });
        }

        let mut unit = self.store.begin().await?;
        let result = Self::settle(&mut *unit, order, acting_user).await?;
        unit.commit().await?;

        info!(
            total = %order.total_price,
            balance = result.user_credit_points.value(),
            "payment committed"
        );
        Ok(result)
    }

    async fn settle(
        unit: &mut (dyn UnitOfWork + '_),
        order: &Order,
        acting_user: UserId,
    ) -> Result<PaymentResult> {
        // The caller's snapshot may be stale; the guard must hold on the stored row.
        let mut current = unit
            .order(order.id)
            .await?
            .ok_or(PaymentError::OrderNotFound(order.id))?;
        current.mark_paid()?;
        unit.save_order(current).await?;

        let mut user = unit
            .user(acting_user)
            .await?
            .ok_or(PaymentError::UserNotFound(acting_user))?;
        let points =
            loyalty::points_for(order.total_price).ok_or(PaymentError::CreditOverflow(user.id))?;
        let balance = user.credit(points)?;
        unit.save_user(user).await?;

        let fresh = unit
            .order(order.id)
            .await?
            .ok_or(PaymentError::OrderNotFound(order.id))?;

        Ok(PaymentResult {
            order: fresh,
            user_credit_points: balance,
        })
    }
}
