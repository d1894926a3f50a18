use crate::domain::order::OrderId;
use crate::domain::validation::ValidationError;
use thiserror::Error;

/// Errors returned synchronously by order book operations.
///
/// A failed call never leaves partial state behind. Expiry is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderBookError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The id never existed, or was already cancelled, matched or expired.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),
}

impl OrderBookError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            OrderBookError::Validation(ValidationError::InvalidPrice(_)) => "invalid_price",
            OrderBookError::Validation(ValidationError::PriceOutOfRange(_)) => "price_out_of_range",
            OrderBookError::Validation(ValidationError::InvalidSide(_)) => "invalid_side",
            OrderBookError::OrderNotFound(_) => "order_not_found",
        }
    }
}
