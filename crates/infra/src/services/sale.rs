//! Recording a sale.
//!
//! The sale is a best-effort sequence of store writes, not a transaction:
//!
//! ```text
//! validate input        (no writes)
//!   ↓
//! memo number unique?   (equality query on memos)
//!   ↓
//! price lines, check stock against a fresh read of each product, total the memo
//!   ↓
//! 1. decrement stock    (one guarded batch: all products or none)
//!   ↓
//! 2. write memo
//!   ↓
//! 3. write memo_payment cash entry (only when money was given)
//! ```
//!
//! A failure before step 1 leaves the store untouched. A failure at step 2 or 3 is
//! reported as `ServiceError::SaleIncomplete` naming the failed step and the steps that
//! were already applied; nothing is rolled back.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, error, info, warn};

use tillbook_accounting::{CashCategory, CashEntry, CashReference, Direction};
use tillbook_core::{DomainError, MemoId, ProductId, RecordId};
use tillbook_products::Product;
use tillbook_sales::{SaleInput, StockDecrement, merge_lines, plan_stock_decrements, price_lines};

use crate::error::{SaleStep, ServiceError};
use crate::store::codec::{self, fields};
use crate::store::{Collection, GuardedWrite, RecordStore, StoreError};

/// Memo field holding the operator-supplied memo number.
pub const MEMO_NUMBER_FIELD: &str = "memoNumber";

/// What the caller gets back from a recorded sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedMemo {
    pub id: MemoId,
    pub memo_number: String,
}

pub struct SaleService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> SaleService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn create_memo(
        &self,
        mut input: SaleInput,
        now: DateTime<Utc>,
    ) -> Result<CreatedMemo, ServiceError> {
        input.validate()?;
        input.memo_number = input.memo_number.trim().to_string();
        input.lines = merge_lines(&input.lines)?;
        let memo_number = input.memo_number.clone();

        self.ensure_unique_memo_number(&memo_number)?;

        let catalog = self.read_catalog(input.lines.iter().map(|l| &l.product_id))?;
        let items = price_lines(&input.lines, &catalog)?;
        let plan = plan_stock_decrements(&items, &catalog)?;
        let memo = input.into_memo(items, now)?;

        self.decrement_stock(&memo_number, &plan)?;
        debug!(memo_number = %memo_number, products = plan.len(), "stock decremented");

        let memo_id: MemoId = match codec::insert_doc(&self.store, &memo) {
            Ok(id) => id,
            Err(source) => {
                return Err(incomplete(&memo_number, SaleStep::WriteMemo, source));
            }
        };

        if memo.payment_amount > rust_decimal::Decimal::ZERO {
            let entry = CashEntry::record(
                memo.date,
                Direction::In,
                memo.payment_amount,
                CashCategory::MemoPayment,
                format!("Payment for memo {memo_number}"),
                now,
            )?
            .with_reference(CashReference::for_memo(&memo_id, &memo));

            if let Err(source) = codec::insert_doc(&self.store, &entry) {
                return Err(incomplete(&memo_number, SaleStep::WriteCashEntry, source));
            }
        }

        info!(
            memo_number = %memo_number,
            memo_id = %memo_id,
            customer = %memo.customer_phone,
            total_bill = %memo.total_bill,
            credit = %memo.credit,
            "sale recorded"
        );

        Ok(CreatedMemo {
            id: memo_id,
            memo_number,
        })
    }

    fn ensure_unique_memo_number(&self, memo_number: &str) -> Result<(), ServiceError> {
        let existing = self
            .store
            .query_by_equality(Collection::Memos, MEMO_NUMBER_FIELD, &json!(memo_number))?;
        if !existing.is_empty() {
            warn!(memo_number = %memo_number, "duplicate memo number rejected");
            return Err(DomainError::DuplicateMemoNumber(memo_number.to_string()).into());
        }
        Ok(())
    }

    /// Current state of every product on the sale. Unknown products are left out and
    /// reported by pricing.
    fn read_catalog<'a>(
        &self,
        ids: impl Iterator<Item = &'a ProductId>,
    ) -> Result<HashMap<ProductId, Product>, ServiceError> {
        let mut catalog = HashMap::new();
        for id in ids {
            if let Some(product) = codec::load_doc::<Product, _>(&self.store, id)? {
                catalog.insert(id.clone(), product);
            }
        }
        Ok(catalog)
    }

    fn decrement_stock(&self, memo_number: &str, plan: &[StockDecrement]) -> Result<(), ServiceError> {
        let writes: Vec<GuardedWrite> = plan
            .iter()
            .map(|d| GuardedWrite {
                id: RecordId::from(&d.product_id),
                expected: fields([("quantity", json!(d.expected))]),
                fields: fields([("quantity", json!(d.remaining))]),
            })
            .collect();

        match self.store.update_batch(Collection::Products, writes) {
            Ok(()) => Ok(()),
            Err(StoreError::PreconditionFailed(reason)) => {
                // Stock moved since it was read: re-check against the new quantities.
                warn!(memo_number = %memo_number, %reason, "stock changed during sale");
                let ids: Vec<ProductId> = plan.iter().map(|d| d.product_id.clone()).collect();
                let catalog = self.read_catalog(ids.iter())?;
                for d in plan {
                    let product = catalog
                        .get(&d.product_id)
                        .ok_or_else(|| DomainError::not_found("product", d.product_id.to_string()))?;
                    product.remaining_after_sale(&d.product_id, d.expected - d.remaining)?;
                }
                Err(DomainError::conflict(format!(
                    "stock changed while recording memo {memo_number}; submit the sale again"
                ))
                .into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn incomplete(memo_number: &str, failed: SaleStep, source: StoreError) -> ServiceError {
    let completed = match failed {
        SaleStep::DecrementStock => vec![],
        SaleStep::WriteMemo => vec![SaleStep::DecrementStock],
        SaleStep::WriteCashEntry => vec![SaleStep::DecrementStock, SaleStep::WriteMemo],
    };
    error!(
        memo_number = %memo_number,
        step = %failed,
        error = %source,
        "sale left incomplete"
    );
    ServiceError::SaleIncomplete {
        memo_number: memo_number.to_string(),
        failed,
        completed,
        source,
    }
}
