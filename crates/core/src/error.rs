//! Domain error model.

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant names the offending field or identifier so the caller can show a
/// specific message. Store and network failures live in the infra layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required field was missing or malformed.
    #[error("validation failed on `{field}`: {message}")]
    Validation { field: String, message: String },

    /// A money amount that must be strictly positive was not.
    #[error("invalid amount {amount}: must be greater than zero")]
    InvalidAmount { amount: Decimal },

    /// A memo with this number already exists.
    #[error("memo number `{0}` already exists")]
    DuplicateMemoNumber(String),

    /// A sale asked for more units than the product has on hand.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: i64,
        available: i64,
    },

    /// A sale had no line items.
    #[error("memo must contain at least one line item")]
    EmptyMemo,

    /// Customer name or phone was missing on a sale.
    #[error("missing customer information: `{field}` is required")]
    MissingCustomerInfo { field: String },

    /// A referenced record does not exist.
    #[error("{entity} `{id}` not found")]
    NotFound { entity: &'static str, id: String },

    /// The operation conflicts with existing state (e.g. referencing records exist).
    #[error("conflict: {0}")]
    Conflict(String),

    /// An identifier was invalid (e.g. empty or containing reserved characters).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_amount(amount: Decimal) -> Self {
        Self::InvalidAmount { amount }
    }

    pub fn missing_customer_info(field: impl Into<String>) -> Self {
        Self::MissingCustomerInfo {
            field: field.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Stable, machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => "validation_error",
            DomainError::InvalidAmount { .. } => "invalid_amount",
            DomainError::DuplicateMemoNumber(_) => "duplicate_memo_number",
            DomainError::InsufficientStock { .. } => "insufficient_stock",
            DomainError::EmptyMemo => "empty_memo",
            DomainError::MissingCustomerInfo { .. } => "missing_customer_info",
            DomainError::NotFound { .. } => "not_found",
            DomainError::Conflict(_) => "conflict",
            DomainError::InvalidId(_) => "invalid_id",
        }
    }
}
