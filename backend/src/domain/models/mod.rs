//! Domain models for the restaurant order core.

pub mod menu_item;
pub mod order;
pub mod order_item;

pub use menu_item::{Category, MenuItem};
pub use order::{compute_totals, Customer, Order, OrderStatus, OrderType, Totals};
pub use order_item::OrderItem;
