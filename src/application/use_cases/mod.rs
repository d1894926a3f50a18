/// Use Cases - the operation set the order book offers its callers
///
/// `OrderBookUseCase` is the seam between the thread-safe service and its
/// clients (CLI driver, load generator, expiry sweeper). Every method takes
/// `&self`; implementations own their locking.
///
/// ## Operations
/// - submit / cancel / query: the trading contract
/// - remove expired buy / sell orders: maintenance, driven by a timer

use crate::domain::{CustomerId, Order, OrderBookError, OrderId, Side, Submission};
use crate::shared::timestamp::Timestamp;

pub trait OrderBookUseCase: Send + Sync {
    /// Validates, numbers and tries to match a new order.
    fn submit_order(
        &self,
        customer_id: CustomerId,
        price: u64,
        side: Side,
        valid_until: Option<Timestamp>,
    ) -> Result<Submission, OrderBookError>;

    /// Cancels a live order; the second cancel of the same id fails.
    fn cancel_order(&self, order_id: OrderId) -> Result<Order, OrderBookError>;

    /// Live, currently valid orders of one customer.
    fn query_orders(&self, customer_id: CustomerId) -> Vec<Order>;

    /// Returns the number of orders destroyed.
    fn remove_expired_buy_orders(&self) -> usize;

    /// Returns the number of orders destroyed.
    fn remove_expired_sell_orders(&self) -> usize;
}
