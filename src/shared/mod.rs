/// Shared utilities used across all layers
///
/// This module contains:
/// - Time handling (timestamps, injectable clocks)
/// - Prometheus metrics

pub mod metrics;
pub mod timestamp;

// Re-export commonly used types
pub use metrics::METRICS;
pub use timestamp::{Clock, ManualClock, SystemClock, Timestamp};
