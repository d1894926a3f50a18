/// Book Side - per-side priority queue of resting orders
///
/// Backed by `std::collections::BinaryHeap` (a max-heap), so the element that
/// compares greatest is the one with the best match priority:
///
/// - Buy side: higher price first
/// - Sell side: lower price first
/// - Equal price: earlier `submitted_at` first, then lower order id
///
/// Removal of arbitrary elements is lazy. The queue itself knows nothing about
/// liveness; the owning index decides whether a popped order is real or a
/// tombstone. `len()` therefore counts tombstones that have not been popped yet.

use crate::domain::order::{Order, Side};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Compares two orders of the same side by match priority.
///
/// Returns `Ordering::Greater` when `a` should be matched before `b`.
#[inline]
pub fn compare_priority(a: &Order, b: &Order) -> Ordering {
    debug_assert_eq!(a.side, b.side);

    let by_price = match a.side {
        Side::Buy => a.price.cmp(&b.price),
        Side::Sell => b.price.cmp(&a.price),
    };

    by_price
        .then_with(|| b.submitted_at.cmp(&a.submitted_at))
        .then_with(|| b.id.cmp(&a.id))
}

/// 堆元素，按撮合优先级排序
#[derive(Debug, Clone, Copy)]
struct Ranked(Order);

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_priority(&self.0, &other.0)
    }
}

#[derive(Debug, Clone)]
pub struct BookSide {
    side: Side,
    heap: BinaryHeap<Ranked>,
}

impl BookSide {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            heap: BinaryHeap::new(),
        }
    }

    pub fn with_capacity(side: Side, capacity: usize) -> Self {
        Self {
            side,
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    /// O(log n)
    #[inline]
    pub fn push(&mut self, order: Order) {
        debug_assert_eq!(order.side, self.side, "order pushed onto the wrong book side");
        self.heap.push(Ranked(order));
    }

    /// Removes the highest-priority element, O(log n).
    #[inline]
    pub fn pop(&mut self) -> Option<Order> {
        self.heap.pop().map(|ranked| ranked.0)
    }

    #[inline]
    pub fn peek(&self) -> Option<&Order> {
        self.heap.peek().map(|ranked| &ranked.0)
    }

    /// Element count, tombstones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Keeps only the orders for which `keep` returns true.
    ///
    /// Every element is visited exactly once; the heap is rebuilt afterwards,
    /// so priority order is preserved even though the internal layout changes.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Order) -> bool,
    {
        self.heap.retain(|ranked| keep(&ranked.0));
    }

    /// Iterates in arbitrary (heap array) order.
    pub fn iter(&self) -> impl Iterator<Item = &Order> + '_ {
        self.heap.iter().map(|ranked| &ranked.0)
    }

    /// Contents in match-priority order, best first. Diagnostics only.
    pub fn to_sorted_vec(&self) -> Vec<Order> {
        let mut sorted: Vec<Order> = self
            .heap
            .clone()
            .into_sorted_vec()
            .into_iter()
            .map(|ranked| ranked.0)
            .collect();
        sorted.reverse();
        sorted
    }
}

impl Extend<Order> for BookSide {
    fn extend<I: IntoIterator<Item = Order>>(&mut self, iter: I) {
        for order in iter {
            self.push(order);
        }
    }
}
