//! Storage abstraction for the restaurant order core.
//!
//! The domain services depend on these traits rather than on a concrete
//! backend, so the flat-file implementation under `csv/` can be swapped
//! for an in-memory or failing stub in tests.

pub mod csv;

use crate::domain::models::{MenuItem, Order};
use crate::error::Result;

/// Whole-table persistence for the menu. Each save rewrites the full
/// table atomically; there is no per-row mutation at this layer.
pub trait MenuStorage: Send + Sync {
    /// Load every menu item, recovering from backups when the live file
    /// fails validation.
    fn load(&self) -> Result<Vec<MenuItem>>;

    /// Persist the full menu, replacing the previous table contents.
    fn save(&self, items: &[MenuItem]) -> Result<()>;
}

/// Whole-table persistence for orders.
pub trait OrderStorage: Send + Sync {
    /// Load every order ever stored, recovering from backups when the
    /// live file fails validation.
    fn load(&self) -> Result<Vec<Order>>;

    /// Persist the full order history, replacing the previous contents.
    fn save(&self, orders: &[Order]) -> Result<()>;
}
