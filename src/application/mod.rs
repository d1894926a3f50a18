/// Application Layer - Use Cases and Services
///
/// Orchestrates the domain order book for concurrent callers: locking,
/// logging, metrics and periodic maintenance live here, never in the domain.
///
/// ## Modules
/// - `use_cases`: the `OrderBookUseCase` operation set
/// - `services`: `MatchingService`, `ExpirySweeper`

pub mod services;
pub mod use_cases;

// Re-export key services
pub use services::{ExpirySweeper, MatchingService};
pub use use_cases::OrderBookUseCase;
