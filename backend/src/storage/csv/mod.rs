//! Flat-file CSV storage backend.
//!
//! Human-inspectable tables under a single data directory, rewritten
//! atomically on every save with timestamped backups for recovery.

pub mod connection;
pub mod menu_repository;
pub mod order_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::CsvConnection;
pub use menu_repository::MenuRepository;
pub use order_repository::OrderRepository;
