//! In-memory price-time priority order book.
//!
//! Layers, leaves first:
//! - `shared`: time handling and metrics
//! - `domain`: orders, book sides and the matching engine
//! - `application`: the thread-safe service and the expiry sweeper
//! - `interfaces`: the command-line driver

pub mod application;
pub mod domain;
pub mod interfaces;
pub mod shared;

pub use application::services::{BookSnapshot, ExpirySweeper, MatchingService};
pub use application::use_cases::OrderBookUseCase;
pub use domain::{
    CustomerId, Order, OrderBook, OrderBookError, OrderId, Side, SubmitStatus, Submission,
    ValidationError,
};
