/// Application Services
///
/// - `MatchingService`: the lock-guarded order book shared by all callers
/// - `ExpirySweeper`: fixed-interval driver of the expiry removal entry points

pub mod expiry_sweeper;
pub mod matching_service;

pub use expiry_sweeper::{ExpirySweeper, SweepReport, SweeperHandle, DEFAULT_SWEEP_INTERVAL};
pub use matching_service::{BookSnapshot, MatchingService};
