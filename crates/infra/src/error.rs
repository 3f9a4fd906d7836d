//! Service-level errors: domain failures, store failures, and partial sales.

use thiserror::Error;

use tillbook_core::DomainError;

use crate::store::StoreError;

/// Ordered steps of recording a sale.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SaleStep {
    DecrementStock,
    WriteMemo,
    WriteCashEntry,
}

impl SaleStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStep::DecrementStock => "decrement_stock",
            SaleStep::WriteMemo => "write_memo",
            SaleStep::WriteCashEntry => "write_cash_entry",
        }
    }
}

impl core::fmt::Display for SaleStep {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A sale failed after earlier steps were already applied. Those steps are not
    /// rolled back; `completed` lists them.
    #[error("sale `{memo_number}` incomplete: step {failed} failed after {completed:?}: {source}")]
    SaleIncomplete {
        memo_number: String,
        failed: SaleStep,
        completed: Vec<SaleStep>,
        #[source]
        source: StoreError,
    },
}

impl ServiceError {
    /// Stable, machine-readable code for this error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Domain(e) => e.code(),
            ServiceError::Store(StoreError::Unavailable(_)) => "store_unavailable",
            ServiceError::Store(StoreError::NotFound { .. }) => "not_found",
            ServiceError::Store(StoreError::PreconditionFailed(_)) => "conflict",
            ServiceError::Store(StoreError::Codec { .. }) => "codec_error",
            ServiceError::SaleIncomplete { .. } => "sale_incomplete",
        }
    }

    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            ServiceError::Domain(e) => Some(e),
            _ => None,
        }
    }
}
