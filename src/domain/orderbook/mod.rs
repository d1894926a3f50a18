/// Domain Layer - OrderBook Module
///
/// The in-memory price-time priority order book.
///
/// ## Components
/// - `book_side`: binary-heap priority queue for one side
/// - `index`: live-order indexes (by id, by customer)
/// - `engine`: the matching state machine tying both together

pub mod book_side;
pub mod engine;
pub mod index;

pub use book_side::{compare_priority, BookSide};
pub use engine::{OrderBook, SubmitStatus, Submission};
pub use index::OrderIndex;
