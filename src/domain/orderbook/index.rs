/// Live-order indexes
///
/// `by_id` owns the live orders; `by_customer` only references them by id.
/// An order is live iff it is in `by_id`, and then it is in exactly one
/// customer bucket. Empty buckets are dropped eagerly.

use crate::domain::order::{CustomerId, Order, OrderId};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct OrderIndex {
    by_id: HashMap<OrderId, Order>,
    by_customer: HashMap<CustomerId, HashSet<OrderId>>,
}

impl OrderIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, order: Order) {
        self.by_id.insert(order.id, order);
        self.by_customer
            .entry(order.customer_id)
            .or_default()
            .insert(order.id);
    }

    /// Removes `order_id` from both indexes, returning the order if it was live.
    pub fn remove(&mut self, order_id: OrderId) -> Option<Order> {
        let order = self.by_id.remove(&order_id)?;

        if let Some(bucket) = self.by_customer.get_mut(&order.customer_id) {
            bucket.remove(&order_id);
            if bucket.is_empty() {
                self.by_customer.remove(&order.customer_id);
            }
        }

        Some(order)
    }

    #[inline]
    pub fn contains(&self, order_id: OrderId) -> bool {
        self.by_id.contains_key(&order_id)
    }

    #[inline]
    pub fn get(&self, order_id: OrderId) -> Option<&Order> {
        self.by_id.get(&order_id)
    }

    /// Live orders of one customer, in no particular order.
    pub fn customer_orders(&self, customer_id: CustomerId) -> impl Iterator<Item = &Order> + '_ {
        self.by_customer
            .get(&customer_id)
            .into_iter()
            .flatten()
            .filter_map(move |id| self.by_id.get(id))
    }

    pub fn by_id(&self) -> &HashMap<OrderId, Order> {
        &self.by_id
    }

    pub fn by_customer(&self) -> &HashMap<CustomerId, HashSet<OrderId>> {
        &self.by_customer
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::Side;

    fn order(id: OrderId, customer_id: CustomerId) -> Order {
        Order {
            id,
            customer_id,
            price: 10,
            side: Side::Buy,
            submitted_at: id,
            valid_until: None,
        }
    }

    #[test]
    fn test_insert_populates_both_indexes() {
        let mut index = OrderIndex::new();
        index.insert(order(1, 7));
        index.insert(order(2, 7));
        index.insert(order(3, 8));

        assert_eq!(index.len(), 3);
        assert_eq!(index.by_customer()[&7].len(), 2);
        assert_eq!(index.customer_orders(8).count(), 1);
        assert_eq!(index.customer_orders(99).count(), 0);
    }

    #[test]
    fn test_remove_drops_empty_bucket() {
        let mut index = OrderIndex::new();
        index.insert(order(1, 7));

        assert_eq!(index.remove(1).map(|o| o.customer_id), Some(7));
        assert!(!index.contains(1));
        assert!(!index.by_customer().contains_key(&7));
        assert!(index.is_empty());
    }

    #[test]
    fn test_remove_missing_is_none() {
        let mut index = OrderIndex::new();
        index.insert(order(1, 7));

        assert!(index.remove(2).is_none());
        assert!(index.remove(1).is_some());
        assert!(index.remove(1).is_none());
    }
}
