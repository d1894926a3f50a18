/// Domain Layer - Core Business Logic
///
/// Pure matching logic: no I/O, no locking, no logging. Everything here is
/// driven through `&mut OrderBook` and can be tested in isolation.
///
/// ## Modules
/// - `order`: the `Order` value and `Side`
/// - `validation`: submit input rules
/// - `error`: operation errors
/// - `orderbook`: book sides, indexes and the matching engine

pub mod error;
pub mod order;
pub mod orderbook;
pub mod validation;

// Re-export key types
pub use error::OrderBookError;
pub use order::{CustomerId, Order, OrderId, Side};
pub use orderbook::{BookSide, OrderBook, SubmitStatus, Submission};
pub use validation::{OrderValidator, ValidationConfig, ValidationError};
