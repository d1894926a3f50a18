/// Expiry Sweeper - periodic garbage collection of lapsed orders
///
/// A regular client of the order book: on every tick it calls
/// `remove_expired_buy_orders` then `remove_expired_sell_orders`, taking the
/// same write lock as any other mutator. The first tick fires one full
/// interval after `spawn`.
///
/// ## Usage
/// ```rust,ignore
/// let service = Arc::new(MatchingService::new());
/// let handle = ExpirySweeper::new(service.clone(), Duration::from_secs(5)).spawn();
/// // ...
/// handle.shutdown().await;
/// ```

use crate::application::use_cases::OrderBookUseCase;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// 默认清理周期
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Orders destroyed by one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub buy_removed: usize,
    pub sell_removed: usize,
}

impl SweepReport {
    pub fn total(&self) -> usize {
        self.buy_removed + self.sell_removed
    }
}

pub struct ExpirySweeper<S: ?Sized> {
    target: Arc<S>,
    interval: Duration,
}

impl<S> ExpirySweeper<S>
where
    S: OrderBookUseCase + ?Sized + 'static,
{
    /// A zero interval is bumped to one millisecond.
    pub fn new(target: Arc<S>, interval: Duration) -> Self {
        Self {
            target,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs both removals once, synchronously.
    pub fn sweep_once(&self) -> SweepReport {
        SweepReport {
            buy_removed: self.target.remove_expired_buy_orders(),
            sell_removed: self.target.remove_expired_sell_orders(),
        }
    }

    /// Starts the ticker on the current tokio runtime.
    pub fn spawn(self) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let join = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            debug!(interval_ms = self.interval.as_millis() as u64, "expiry sweeper started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let report = self.sweep_once();
                        debug!(
                            buy_removed = report.buy_removed,
                            sell_removed = report.sell_removed,
                            "expiry sweep finished"
                        );
                    }
                    // 发送端发出信号或被丢弃都会结束循环
                    _ = shutdown_rx.changed() => break,
                }
            }

            debug!("expiry sweeper stopped");
        });

        SweeperHandle {
            shutdown: shutdown_tx,
            join,
        }
    }
}

/// Running sweeper. Dropping the handle also stops the task.
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signals the task and waits for it to finish its current tick.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.join.await {
            warn!(error = %e, "expiry sweeper task failed");
        }
    }
}
