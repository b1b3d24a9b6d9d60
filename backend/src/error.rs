//! Error taxonomy for the restaurant order core.
//!
//! Every fallible operation in the domain and storage layers returns one
//! of these kinds. Storage-format details never leak past this boundary:
//! repositories translate csv/serde failures into `Corruption` or `Io`
//! before callers see them.

use crate::domain::models::order::OrderStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Bad input shape or range. Recoverable: the caller corrects the
    /// field and resubmits.
    #[error("validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Unknown entity id. Recoverable: the caller should refresh its view.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Illegal status change; the order is left unchanged.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Attempt to edit an order in a terminal status.
    #[error("order {order_id} is {status} and can no longer be edited")]
    InvalidState {
        order_id: String,
        status: OrderStatus,
    },

    /// A store file failed schema validation. Triggers recovery from the
    /// most recent valid backup.
    #[error("{table} table failed validation: {detail}")]
    Corruption { table: String, detail: String },

    /// Underlying filesystem failure (permissions, disk full). The
    /// in-memory mutation is retained and retried on the next auto-save.
    #[error("storage I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn corruption(table: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::Corruption {
            table: table.into(),
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
