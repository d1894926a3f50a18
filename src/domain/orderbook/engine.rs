/// Price-time priority matching engine (single-threaded core)
///
/// Owns both book sides, the live-order indexes and the id counter. All
/// mutators take `&mut self`; callers that need concurrent access wrap the
/// book in a lock (see `application::services::MatchingService`).
///
/// ## Matching
/// A new order is compared against the best opposite-side candidate only.
/// Tombstones are dropped, same-customer candidates are set aside and put back
/// afterwards, expired candidates are destroyed. The first live, eligible
/// candidate either matches (one-for-one, no partial fills) or ends the scan.
///
/// ## Lazy deletion
/// Cancel, match and expiry only touch the indexes. A queue element whose id
/// is no longer in the index is a tombstone and is discarded when popped.

use crate::domain::error::OrderBookError;
use crate::domain::order::{CustomerId, Order, OrderId, Side};
use crate::domain::orderbook::book_side::BookSide;
use crate::domain::orderbook::index::OrderIndex;
use crate::domain::validation::OrderValidator;
use crate::shared::timestamp::{Clock, SystemClock, Timestamp};
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

/// What happened to a submitted order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitStatus {
    /// No counterparty; the order now rests on its own side.
    Resting,
    /// Executed against exactly one resting order, which is destroyed.
    Matched { counterparty: Order },
    /// Good-til-time had already lapsed; the order was discarded.
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub order: Order,
    pub status: SubmitStatus,
    /// Opposite-side orders found expired and destroyed during the scan
    pub expired_on_scan: usize,
}

impl Submission {
    #[inline]
    pub fn order_id(&self) -> OrderId {
        self.order.id
    }

    #[inline]
    pub fn is_matched(&self) -> bool {
        matches!(self.status, SubmitStatus::Matched { .. })
    }
}

#[derive(Debug, Clone)]
pub struct OrderBook<C: Clock = SystemClock> {
    buy_orders: BookSide,
    sell_orders: BookSide,
    index: OrderIndex,
    next_order_id: OrderId,
    validator: OrderValidator,
    clock: C,
}

impl OrderBook<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for OrderBook<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> OrderBook<C> {
    pub fn with_clock(clock: C) -> Self {
        Self::with_validator(OrderValidator::new(), clock)
    }

    pub fn with_validator(validator: OrderValidator, clock: C) -> Self {
        OrderBook {
            buy_orders: BookSide::new(Side::Buy),
            sell_orders: BookSide::new(Side::Sell),
            index: OrderIndex::new(),
            next_order_id: 1,
            validator,
            clock,
        }
    }

    /// Submits a new order and tries to match it immediately.
    ///
    /// Validation happens before the id counter moves, so a rejected submit
    /// leaves no trace. An order whose good-til-time already lapsed still
    /// consumes an id but is never indexed or matched.
    pub fn submit(
        &mut self,
        customer_id: CustomerId,
        price: u64,
        side: Side,
        valid_until: Option<Timestamp>,
    ) -> Result<Submission, OrderBookError> {
        self.validator.validate_price(price)?;

        let now = self.clock.now();
        let order = Order {
            id: self.next_order_id,
            customer_id,
            price,
            side,
            submitted_at: now,
            valid_until,
        };
        self.next_order_id += 1;

        if order.is_expired_at(now) {
            return Ok(Submission {
                order,
                status: SubmitStatus::Expired,
                expired_on_scan: 0,
            });
        }

        let (counterparty, expired_on_scan) = self.match_order(&order, now);
        let status = match counterparty {
            Some(counterparty) => SubmitStatus::Matched { counterparty },
            None => {
                self.rest(order);
                SubmitStatus::Resting
            }
        };

        Ok(Submission {
            order,
            status,
            expired_on_scan,
        })
    }

    /// Cancels a live order. Fails with `OrderNotFound` if the id is not live.
    ///
    /// The queue entry is left in place as a tombstone.
    pub fn cancel(&mut self, order_id: OrderId) -> Result<Order, OrderBookError> {
        self.index
            .remove(order_id)
            .ok_or(OrderBookError::OrderNotFound(order_id))
    }

    /// Live orders of `customer_id` whose validity window is still open,
    /// in submission order.
    pub fn query(&self, customer_id: CustomerId) -> Vec<Order> {
        let now = self.clock.now();
        let mut orders: Vec<Order> = self
            .index
            .customer_orders(customer_id)
            .filter(|order| order.is_live_at(now))
            .copied()
            .collect();
        orders.sort_unstable_by_key(|order| order.id);
        orders
    }

    /// Garbage-collects one side: destroys every expired order and drops
    /// tombstones. No matching happens. Returns the number of orders destroyed.
    pub fn remove_expired(&mut self, side: Side) -> usize {
        let now = self.clock.now();
        let (book, index) = self.split_mut(side);
        let mut removed = 0;

        book.retain(|order| {
            if !index.contains(order.id) {
                return false;
            }
            if order.is_expired_at(now) {
                index.remove(order.id);
                removed += 1;
                return false;
            }
            true
        });

        removed
    }

    pub fn remove_expired_buy_orders(&mut self) -> usize {
        self.remove_expired(Side::Buy)
    }

    pub fn remove_expired_sell_orders(&mut self) -> usize {
        self.remove_expired(Side::Sell)
    }

    /// Scans the opposite side for a counterparty of `order`.
    ///
    /// Returns the destroyed counterparty, if any, and how many expired
    /// candidates were destroyed on the way.
    fn match_order(&mut self, order: &Order, now: Timestamp) -> (Option<Order>, usize) {
        let (opposite, index) = self.split_mut(order.side.opposite());
        let mut skipped: SmallVec<[Order; 8]> = SmallVec::new();
        let mut expired = 0;
        let mut counterparty = None;

        while let Some(candidate) = opposite.pop() {
            // 墓碑：已撤单/已成交/已过期，直接丢弃
            if !index.contains(candidate.id) {
                continue;
            }

            // 自成交保护
            if candidate.customer_id == order.customer_id {
                skipped.push(candidate);
                continue;
            }

            if candidate.is_expired_at(now) {
                index.remove(candidate.id);
                expired += 1;
                continue;
            }

            if order.crosses(&candidate) {
                index.remove(candidate.id);
                counterparty = Some(candidate);
            } else {
                // Best eligible candidate cannot trade, nothing behind it can.
                opposite.push(candidate);
            }
            break;
        }

        opposite.extend(skipped);
        (counterparty, expired)
    }

    fn rest(&mut self, order: Order) {
        let (book, index) = self.split_mut(order.side);
        book.push(order);
        index.insert(order);
    }

    fn split_mut(&mut self, side: Side) -> (&mut BookSide, &mut OrderIndex) {
        let book = match side {
            Side::Buy => &mut self.buy_orders,
            Side::Sell => &mut self.sell_orders,
        };
        (book, &mut self.index)
    }

    // --- introspection (diagnostics and tests) ---

    pub fn next_order_id(&self) -> OrderId {
        self.next_order_id
    }

    pub fn buy_orders(&self) -> &BookSide {
        &self.buy_orders
    }

    pub fn sell_orders(&self) -> &BookSide {
        &self.sell_orders
    }

    pub fn side(&self, side: Side) -> &BookSide {
        match side {
            Side::Buy => &self.buy_orders,
            Side::Sell => &self.sell_orders,
        }
    }

    pub fn orders(&self) -> &HashMap<OrderId, Order> {
        self.index.by_id()
    }

    pub fn customer_orders(&self) -> &HashMap<CustomerId, HashSet<OrderId>> {
        self.index.by_customer()
    }

    pub fn get(&self, order_id: OrderId) -> Option<&Order> {
        self.index.get(order_id)
    }

    pub fn live_order_count(&self) -> usize {
        self.index.len()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn validator(&self) -> &OrderValidator {
        &self.validator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validation::{ValidationConfig, ValidationError};
    use crate::shared::timestamp::ManualClock;
    use std::time::Duration;

    const HOUR: Duration = Duration::from_secs(3600);

    fn book() -> (OrderBook<ManualClock>, ManualClock) {
        let clock = ManualClock::new(1_000_000_000_000);
        (OrderBook::with_clock(clock.clone()), clock)
    }

    fn gtt(clock: &ManualClock) -> Option<Timestamp> {
        Some(clock.after(HOUR))
    }

    #[test]
    fn test_submit_buy_rests() {
        let (mut book, clock) = book();
        let expected_id = book.next_order_id();

        let submission = book.submit(18, 100, Side::Buy, gtt(&clock)).unwrap();

        assert_eq!(submission.order_id(), expected_id);
        assert_eq!(submission.status, SubmitStatus::Resting);
        assert_eq!(book.buy_orders().len(), 1);
        assert!(book.orders().contains_key(&expected_id));
        assert_eq!(book.customer_orders()[&18].len(), 1);
        assert_eq!(book.next_order_id(), expected_id + 1);
    }

    #[test]
    fn test_exact_price_match_destroys_both_legs() {
        let (mut book, clock) = book();
        let sell = book.submit(1995, 90, Side::Sell, gtt(&clock)).unwrap();
        let buy = book.submit(4953, 90, Side::Buy, gtt(&clock)).unwrap();

        match buy.status {
            SubmitStatus::Matched { counterparty } => assert_eq!(counterparty.id, sell.order_id()),
            other => panic!("expected a match, got {:?}", other),
        }
        assert_eq!(book.buy_orders().len(), 0);
        assert_eq!(book.sell_orders().len(), 0);
        assert!(book.get(sell.order_id()).is_none());
        assert!(book.get(buy.order_id()).is_none());
        assert!(book.customer_orders().is_empty());
    }

    #[test]
    fn test_sell_matches_higher_buy() {
        let (mut book, clock) = book();
        book.submit(1, 91, Side::Buy, gtt(&clock)).unwrap();
        let sell = book.submit(2, 89, Side::Sell, gtt(&clock)).unwrap();

        assert!(sell.is_matched());
        assert_eq!(book.live_order_count(), 0);
    }

    #[test]
    fn test_price_gap_rests_both() {
        let (mut book, clock) = book();
        book.submit(2, 100, Side::Sell, gtt(&clock)).unwrap();
        let buy = book.submit(4, 90, Side::Buy, gtt(&clock)).unwrap();

        assert_eq!(buy.status, SubmitStatus::Resting);
        assert_eq!(book.buy_orders().len(), 1);
        assert_eq!(book.sell_orders().len(), 1);
        assert_eq!(book.query(2).len(), 1);
        assert_eq!(book.query(4).len(), 1);
    }

    #[test]
    fn test_best_price_is_matched_first() {
        let (mut book, clock) = book();
        book.submit(1, 95, Side::Sell, gtt(&clock)).unwrap();
        let best = book.submit(2, 90, Side::Sell, gtt(&clock)).unwrap();
        book.submit(3, 92, Side::Sell, gtt(&clock)).unwrap();

        let buy = book.submit(4, 100, Side::Buy, None).unwrap();
        assert_eq!(buy.status, SubmitStatus::Matched { counterparty: best.order });
        assert_eq!(book.sell_orders().len(), 2);
    }

    #[test]
    fn test_equal_price_earlier_order_matched_first() {
        let (mut book, clock) = book();
        let first = book.submit(1, 90, Side::Buy, None).unwrap();
        clock.advance(Duration::from_millis(1));
        let second = book.submit(2, 90, Side::Buy, None).unwrap();

        let sell = book.submit(3, 90, Side::Sell, None).unwrap();
        match sell.status {
            SubmitStatus::Matched { counterparty } => assert_eq!(counterparty.id, first.order_id()),
            other => panic!("expected a match, got {:?}", other),
        }
        assert!(book.get(second.order_id()).is_some());
    }

    #[test]
    fn test_self_trade_is_prevented_and_skipped_orders_restored() {
        let (mut book, clock) = book();
        book.submit(9, 50, Side::Sell, gtt(&clock)).unwrap();
        let buy = book.submit(9, 60, Side::Buy, gtt(&clock)).unwrap();

        assert_eq!(buy.status, SubmitStatus::Resting);
        assert_eq!(book.sell_orders().len(), 1);
        assert_eq!(book.buy_orders().len(), 1);
        assert_eq!(book.query(9).len(), 2);
    }

    #[test]
    fn test_self_trade_skip_reaches_other_customer() {
        let (mut book, clock) = book();
        let own = book.submit(9, 50, Side::Sell, gtt(&clock)).unwrap();
        let other = book.submit(3, 55, Side::Sell, gtt(&clock)).unwrap();

        let buy = book.submit(9, 60, Side::Buy, gtt(&clock)).unwrap();

        match buy.status {
            SubmitStatus::Matched { counterparty } => assert_eq!(counterparty.id, other.order_id()),
            other => panic!("expected a match, got {:?}", other),
        }
        // 被跳过的自有订单放回队列
        assert_eq!(book.sell_orders().len(), 1);
        assert_eq!(book.sell_orders().peek().map(|o| o.id), Some(own.order_id()));
    }

    #[test]
    fn test_cancelled_order_is_tombstone_and_never_matches() {
        let (mut book, clock) = book();
        let buy = book.submit(3456, 95, Side::Buy, gtt(&clock)).unwrap();
        book.cancel(buy.order_id()).unwrap();

        // 撤单不直接动队列
        assert_eq!(book.buy_orders().len(), 1);

        let sell = book.submit(7890, 95, Side::Sell, gtt(&clock)).unwrap();
        assert_eq!(sell.status, SubmitStatus::Resting);
        assert_eq!(book.buy_orders().len(), 0);
        assert_eq!(book.sell_orders().len(), 1);
    }

    #[test]
    fn test_cancel_twice_fails_second_time() {
        let (mut book, clock) = book();
        let id = book.submit(1, 10, Side::Sell, gtt(&clock)).unwrap().order_id();

        assert_eq!(book.cancel(id).map(|o| o.id), Ok(id));
        assert_eq!(book.cancel(id), Err(OrderBookError::OrderNotFound(id)));
        assert!(book.customer_orders().get(&1).is_none());
    }

    #[test]
    fn test_cancel_unknown_and_matched_ids() {
        let (mut book, clock) = book();
        assert_eq!(book.cancel(42), Err(OrderBookError::OrderNotFound(42)));

        let sell = book.submit(1, 10, Side::Sell, gtt(&clock)).unwrap();
        let buy = book.submit(2, 10, Side::Buy, gtt(&clock)).unwrap();
        assert!(book.cancel(sell.order_id()).is_err());
        assert!(book.cancel(buy.order_id()).is_err());
    }

    #[test]
    fn test_validation_failure_changes_nothing() {
        let (mut book, _clock) = book();
        let err = book.submit(1, 0, Side::Buy, None).unwrap_err();

        assert!(matches!(
            err,
            OrderBookError::Validation(ValidationError::InvalidPrice(_))
        ));
        assert_eq!(book.next_order_id(), 1);
        assert!(book.buy_orders().is_empty());
        assert_eq!(book.live_order_count(), 0);
    }

    #[test]
    fn test_configured_price_range_is_enforced() {
        let clock = ManualClock::new(1);
        let validator = OrderValidator::with_config(ValidationConfig {
            min_price: 10,
            max_price: 20,
        });
        let mut book = OrderBook::with_validator(validator, clock);

        assert!(matches!(
            book.submit(1, 21, Side::Sell, None),
            Err(OrderBookError::Validation(ValidationError::PriceOutOfRange(_)))
        ));
        assert!(book.submit(1, 20, Side::Sell, None).is_ok());
    }

    #[test]
    fn test_lapsed_gtt_on_arrival_is_discarded_but_consumes_id() {
        let (mut book, clock) = book();
        let resting = book.submit(1, 70, Side::Buy, gtt(&clock)).unwrap();

        let lapsed = clock.before(Duration::from_secs(1));
        let sell = book.submit(2, 200, Side::Sell, Some(lapsed)).unwrap();

        assert_eq!(sell.status, SubmitStatus::Expired);
        assert_eq!(sell.order_id(), resting.order_id() + 1);
        assert_eq!(book.next_order_id(), sell.order_id() + 1);
        assert_eq!(book.buy_orders().len(), 1);
        assert!(book.sell_orders().is_empty());
        assert!(book.get(sell.order_id()).is_none());
    }

    #[test]
    fn test_lapsed_gtt_never_matches_even_if_price_crosses() {
        let (mut book, clock) = book();
        book.submit(1, 70, Side::Buy, None).unwrap();

        let sell = book.submit(2, 50, Side::Sell, Some(clock.now())).unwrap();
        assert_eq!(sell.status, SubmitStatus::Expired);
        assert_eq!(book.live_order_count(), 1);
    }

    #[test]
    fn test_expired_candidate_destroyed_mid_scan() {
        let (mut book, clock) = book();
        let stale = book
            .submit(1, 90, Side::Sell, Some(clock.after(Duration::from_secs(10))))
            .unwrap();
        let fresh = book.submit(2, 95, Side::Sell, None).unwrap();

        clock.advance(Duration::from_secs(11));
        let buy = book.submit(3, 100, Side::Buy, None).unwrap();

        match buy.status {
            SubmitStatus::Matched { counterparty } => assert_eq!(counterparty.id, fresh.order_id()),
            other => panic!("expected a match, got {:?}", other),
        }
        assert_eq!(buy.expired_on_scan, 1);
        assert!(book.get(stale.order_id()).is_none());
        assert!(book.customer_orders().get(&1).is_none());
        assert!(book.sell_orders().is_empty());
    }

    #[test]
    fn test_scan_stops_at_first_incompatible_candidate() {
        let (mut book, clock) = book();
        book.submit(2, 100, Side::Sell, None).unwrap();
        let deeper = book
            .submit(3, 120, Side::Sell, Some(clock.after(Duration::from_secs(1))))
            .unwrap();
        clock.advance(Duration::from_secs(5));

        let buy = book.submit(4, 90, Side::Buy, None).unwrap();

        assert_eq!(buy.status, SubmitStatus::Resting);
        assert_eq!(buy.expired_on_scan, 0);
        // 扫描提前结束，更深处的过期单尚未被发现
        assert!(book.get(deeper.order_id()).is_some());
        assert_eq!(book.sell_orders().len(), 2);
        // 但查询已经看不到它
        assert!(book.query(3).is_empty());
    }

    #[test]
    fn test_query_filters_expired_and_sorts_by_id() {
        let (mut book, clock) = book();
        let a = book.submit(7, 10, Side::Buy, None).unwrap();
        book.submit(7, 11, Side::Buy, Some(clock.after(Duration::from_secs(1))))
            .unwrap();
        let c = book.submit(7, 500, Side::Sell, gtt(&clock)).unwrap();

        clock.advance(Duration::from_secs(1));
        let ids: Vec<OrderId> = book.query(7).iter().map(|o| o.id).collect();

        assert_eq!(ids, vec![a.order_id(), c.order_id()]);
        assert!(book.query(8).is_empty());
    }

    #[test]
    fn test_remove_expired_sweeps_only_named_side() {
        let (mut book, clock) = book();
        let short = Some(clock.after(Duration::from_secs(1)));
        book.submit(1, 10, Side::Buy, short).unwrap();
        let keep = book.submit(2, 11, Side::Buy, None).unwrap();
        let sell = book.submit(3, 50, Side::Sell, short).unwrap();

        clock.advance(Duration::from_secs(2));

        assert_eq!(book.remove_expired_buy_orders(), 1);
        assert_eq!(book.buy_orders().len(), 1);
        assert_eq!(book.buy_orders().peek().map(|o| o.id), Some(keep.order_id()));
        assert!(book.get(sell.order_id()).is_some());

        assert_eq!(book.remove_expired_sell_orders(), 1);
        assert!(book.sell_orders().is_empty());
        assert_eq!(book.live_order_count(), 1);

        // 幂等
        assert_eq!(book.remove_expired(Side::Buy), 0);
        assert_eq!(book.remove_expired(Side::Sell), 0);
    }

    #[test]
    fn test_remove_expired_drops_tombstones_and_keeps_priority() {
        let (mut book, clock) = book();
        let cancelled = book.submit(1, 30, Side::Sell, None).unwrap();
        for (customer, price) in [(2, 20), (3, 25), (4, 15)] {
            book.submit(customer, price, Side::Sell, gtt(&clock)).unwrap();
        }
        book.cancel(cancelled.order_id()).unwrap();
        assert_eq!(book.sell_orders().len(), 4);

        assert_eq!(book.remove_expired(Side::Sell), 0);

        let prices: Vec<u64> = book.sell_orders().to_sorted_vec().iter().map(|o| o.price).collect();
        assert_eq!(prices, vec![15, 20, 25]);
    }
}
