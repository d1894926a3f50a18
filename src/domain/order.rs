/// Order - the single trading intent held by the book
///
/// An `Order` is immutable once created by a successful submit. It is a small
/// `Copy` value: the indexes and the priority queues each hold their own copy,
/// and liveness is decided by the owning index, never by the copy itself.

use crate::domain::validation::ValidationError;
use crate::shared::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique, monotonically assigned order identity
pub type OrderId = u64;

/// Identifier of the submitting party
pub type CustomerId = u64;

/// 买卖方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side a new order on `self` is matched against.
    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" | "b" => Ok(Side::Buy),
            "sell" | "s" => Ok(Side::Sell),
            other => Err(ValidationError::InvalidSide(format!(
                "'{}' is not one of buy/sell",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub price: u64,
    pub side: Side,
    /// Capture time at submission, the time-priority tie-breaker
    pub submitted_at: Timestamp,
    /// Good-til-time; `None` never expires
    pub valid_until: Option<Timestamp>,
}

impl Order {
    /// Whether the order is still tradable at `now`.
    ///
    /// A good-til-time equal to `now` has already lapsed.
    #[inline]
    pub fn is_live_at(&self, now: Timestamp) -> bool {
        match self.valid_until {
            None => true,
            Some(valid_until) => valid_until > now,
        }
    }

    #[inline]
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        !self.is_live_at(now)
    }

    /// Price compatibility of `self` (the aggressor) against a resting
    /// `candidate` from the opposite side.
    #[inline]
    pub fn crosses(&self, candidate: &Order) -> bool {
        match self.side {
            Side::Buy => candidate.price <= self.price,
            Side::Sell => candidate.price >= self.price,
        }
    }
}
