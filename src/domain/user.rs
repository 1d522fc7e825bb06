use crate::error::{PaymentError, Result};
use serde::{Deserialize, Serialize};

pub type UserId = u64;

/// Accumulated loyalty balance. Whole points, never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreditPoints(pub u64);

impl CreditPoints {
    pub const ZERO: Self = Self(0);

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub credit_points: CreditPoints,
}

impl User {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            credit_points: CreditPoints::ZERO,
        }
    }

    pub fn with_points(id: UserId, points: u64) -> Self {
        Self {
            id,
            credit_points: CreditPoints(points),
        }
    }

    /// Adds `points` to the balance; fails instead of wrapping.
    pub fn credit(&mut self, points: CreditPoints) -> Result<CreditPoints> {
        self.credit_points = self
            .credit_points
            .checked_add(points)
            .ok_or(PaymentError::CreditOverflow(self.id))?;
        Ok(self.credit_points)
    }
}
