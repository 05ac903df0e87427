//! Domain types for addresses and orders.
//!
//! These types represent validated domain objects separate from database row
//! types; repositories map rows into them.

pub mod address;
pub mod order;

pub use address::{Address, NewAddress};
pub use order::{LineItem, NewOrder, Order, PriceData, ProductData, total_cents};
