/// Order Validator - Submit Input Validation
///
/// Rejects malformed submissions before the order book touches any state.
///
/// ## Validation Rules
/// - Price must be positive
/// - Price must lie inside the configured inclusive range
/// - Side text (from an external surface) must name buy or sell
///
/// ## Usage
/// ```rust
/// use order_book::domain::validation::{OrderValidator, ValidationError};
///
/// let validator = OrderValidator::new();
/// assert!(validator.validate_price(100).is_ok());
/// assert!(matches!(validator.validate_price(0), Err(ValidationError::InvalidPrice(_))));
/// ```

use thiserror::Error;

/// Validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Price is zero
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    /// Price falls outside the configured range
    #[error("Price out of range: {0}")]
    PriceOutOfRange(String),

    /// Side is not one of the two valid values
    #[error("Invalid side: {0}")]
    InvalidSide(String),
}

/// Order validation configuration
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Minimum price (inclusive)
    pub min_price: u64,

    /// Maximum price (inclusive)
    pub max_price: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_price: 1,
            max_price: u64::MAX,
        }
    }
}

/// Order validator
#[derive(Debug, Clone, Default)]
pub struct OrderValidator {
    config: ValidationConfig,
}

impl OrderValidator {
    /// Creates a new validator with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new validator with custom configuration
    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validates the price of a submission
    pub fn validate_price(&self, price: u64) -> Result<(), ValidationError> {
        if price == 0 {
            return Err(ValidationError::InvalidPrice(
                "Price must be greater than zero".to_string(),
            ));
        }

        if price < self.config.min_price {
            return Err(ValidationError::PriceOutOfRange(format!(
                "Price {} is below minimum {}",
                price, self.config.min_price
            )));
        }

        if price > self.config.max_price {
            return Err(ValidationError::PriceOutOfRange(format!(
                "Price {} exceeds maximum {}",
                price, self.config.max_price
            )));
        }

        Ok(())
    }
}
