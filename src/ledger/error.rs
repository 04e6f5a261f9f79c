use sea_orm::DbErr;
use thiserror::Error;

use crate::entities::sales::Status;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i32 },
    #[error("Quantity must be greater than 0, got {0}")]
    InvalidQuantity(i64),
    #[error("Invalid line item at position {index}: {reason}")]
    InvalidLineItem { index: usize, reason: String },
    #[error("Invalid product: {0}")]
    InvalidProduct(String),
    #[error("Price must be between 0 and 99999999.99")]
    InvalidPrice,
    #[error("Amount exceeds the representable range")]
    AmountOverflow,
    #[error("Insufficient stock for variant {variant_id}: requested {requested}, available {available}")]
    InsufficientStock {
        variant_id: i32,
        requested: i32,
        available: i64,
    },
    #[error("Cannot move sale from {from} to {to}")]
    InvalidTransition { from: Status, to: Status },
    #[error("Sale {id} is {status} and can no longer be changed")]
    SaleClosed { id: i32, status: Status },
    #[error("{entity} {id} is still referenced by {referenced_by}")]
    StillReferenced {
        entity: &'static str,
        id: i32,
        referenced_by: &'static str,
    },
    #[error("Consistency error: {0}")]
    Consistency(String),
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl LedgerError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        LedgerError::NotFound { entity, id }
    }

    pub fn line_item(index: usize, reason: impl Into<String>) -> Self {
        LedgerError::InvalidLineItem {
            index,
            reason: reason.into(),
        }
    }

    /// Caller-supplied data was rejected, as opposed to a storage or bookkeeping fault.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidQuantity(_)
                | LedgerError::InvalidLineItem { .. }
                | LedgerError::InvalidProduct(_)
                | LedgerError::InvalidPrice
                | LedgerError::AmountOverflow
        )
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
