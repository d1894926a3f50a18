/// Matching Service - thread-safe front of the order book
///
/// Wraps one `OrderBook` in a `parking_lot::RwLock` so many callers can
/// submit, cancel and query concurrently while seeing one consistent book.
///
/// ## Locking
/// - submit, cancel, remove-expired: write lock for the whole operation,
///   including the matching scan, so partial matches are never observable
/// - query, inspect, snapshot: read lock, concurrent with each other
///
/// Lock acquisition order is the total order of ids and state transitions.
///
/// ## Dependency Injection
/// The service is an ordinary value; share it with `Arc`. Independent books
/// can coexist, and tests inject a `ManualClock`.
///
/// ## Usage
/// ```rust
/// use order_book::application::services::MatchingService;
/// use order_book::application::use_cases::OrderBookUseCase;
/// use order_book::domain::Side;
/// use std::sync::Arc;
///
/// let service = Arc::new(MatchingService::new());
/// let sell = service.submit_order(2, 90, Side::Sell, None).unwrap();
/// let buy = service.submit_order(4, 90, Side::Buy, None).unwrap();
/// assert!(buy.is_matched());
/// assert!(service.cancel_order(sell.order_id()).is_err());
/// ```

use crate::application::use_cases::OrderBookUseCase;
use crate::domain::{
    CustomerId, Order, OrderBook, OrderBookError, OrderId, Side, SubmitStatus, Submission,
};
use crate::shared::metrics::METRICS;
use crate::shared::timestamp::{Clock, SystemClock, Timestamp};
use parking_lot::RwLock;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Point-in-time counts of the book, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookSnapshot {
    /// Buy queue length, tombstones included
    pub buy_depth: usize,
    /// Sell queue length, tombstones included
    pub sell_depth: usize,
    pub live_orders: usize,
    pub customers: usize,
    pub next_order_id: OrderId,
}

pub struct MatchingService<C: Clock = SystemClock> {
    book: RwLock<OrderBook<C>>,
}

impl MatchingService<SystemClock> {
    pub fn new() -> Self {
        Self::with_book(OrderBook::new())
    }
}

impl Default for MatchingService<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MatchingService<C> {
    pub fn with_book(book: OrderBook<C>) -> Self {
        MatchingService {
            book: RwLock::new(book),
        }
    }

    /// Runs `f` against the book under the shared lock.
    pub fn inspect<R>(&self, f: impl FnOnce(&OrderBook<C>) -> R) -> R {
        let book = self.book.read();
        f(&book)
    }

    pub fn snapshot(&self) -> BookSnapshot {
        let book = self.book.read();
        BookSnapshot {
            buy_depth: book.buy_orders().len(),
            sell_depth: book.sell_orders().len(),
            live_orders: book.live_order_count(),
            customers: book.customer_orders().len(),
            next_order_id: book.next_order_id(),
        }
    }

    fn remove_expired(&self, side: Side) -> usize {
        let (removed, depth) = {
            let mut book = self.book.write();
            let removed = book.remove_expired(side);
            (removed, book.side(side).len())
        };

        METRICS.depth.with_label_values(&[side.as_str()]).set(depth as f64);
        if removed > 0 {
            METRICS
                .expired_total
                .with_label_values(&[side.as_str(), "sweep"])
                .inc_by(removed as f64);
            info!(side = %side, removed, depth, "expired orders swept");
        } else {
            debug!(side = %side, depth, "expiry sweep found nothing");
        }

        removed
    }
}

impl<C: Clock + Send + Sync> OrderBookUseCase for MatchingService<C> {
    fn submit_order(
        &self,
        customer_id: CustomerId,
        price: u64,
        side: Side,
        valid_until: Option<Timestamp>,
    ) -> Result<Submission, OrderBookError> {
        let start = Instant::now();

        let (result, buy_depth, sell_depth) = {
            let mut book = self.book.write();
            let result = book.submit(customer_id, price, side, valid_until);
            (result, book.buy_orders().len(), book.sell_orders().len())
        };

        METRICS
            .submit_duration
            .observe(start.elapsed().as_secs_f64() * 1_000_000.0);

        let submission = match result {
            Ok(submission) => submission,
            Err(e) => {
                METRICS.errors_total.with_label_values(&[e.kind()]).inc();
                warn!(customer_id, price, side = %side, error = %e, "order rejected");
                return Err(e);
            }
        };

        METRICS.orders_total.with_label_values(&[side.as_str()]).inc();
        METRICS.depth.with_label_values(&["buy"]).set(buy_depth as f64);
        METRICS.depth.with_label_values(&["sell"]).set(sell_depth as f64);

        if submission.expired_on_scan > 0 {
            METRICS
                .expired_total
                .with_label_values(&[side.opposite().as_str(), "match"])
                .inc_by(submission.expired_on_scan as f64);
            debug!(
                order_id = submission.order_id(),
                expired = submission.expired_on_scan,
                "expired counterparties discarded during match"
            );
        }

        match submission.status {
            SubmitStatus::Matched { counterparty } => {
                METRICS.matches_total.with_label_values(&[side.as_str()]).inc();
                info!(
                    order_id = submission.order_id(),
                    side = %side,
                    customer_id,
                    counterparty_id = counterparty.id,
                    counterparty_customer_id = counterparty.customer_id,
                    price = counterparty.price,
                    "orders matched"
                );
            }
            SubmitStatus::Resting => {
                debug!(order_id = submission.order_id(), side = %side, customer_id, price, "order resting");
            }
            SubmitStatus::Expired => {
                METRICS
                    .expired_total
                    .with_label_values(&[side.as_str(), "submit"])
                    .inc();
                debug!(order_id = submission.order_id(), "order expired before matching");
            }
        }

        Ok(submission)
    }

    fn cancel_order(&self, order_id: OrderId) -> Result<Order, OrderBookError> {
        let result = self.book.write().cancel(order_id);

        match &result {
            Ok(order) => {
                METRICS.cancellations_total.with_label_values(&["ok"]).inc();
                debug!(order_id, customer_id = order.customer_id, "order cancelled");
            }
            Err(e) => {
                METRICS.cancellations_total.with_label_values(&["not_found"]).inc();
                debug!(order_id, error = %e, "cancel rejected");
            }
        }

        result
    }

    fn query_orders(&self, customer_id: CustomerId) -> Vec<Order> {
        self.book.read().query(customer_id)
    }

    fn remove_expired_buy_orders(&self) -> usize {
        self.remove_expired(Side::Buy)
    }

    fn remove_expired_sell_orders(&self) -> usize {
        self.remove_expired(Side::Sell)
    }
}
