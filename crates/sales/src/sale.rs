//! Pure pricing of a sale before anything is written.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use tillbook_core::money::ensure_non_negative;
use tillbook_core::{DateKey, DomainError, DomainResult, ProductId};
use tillbook_products::Product;

use crate::memo::{LineItem, Memo, MemoTotals};

/// One requested line of a sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleLine {
    pub product_id: ProductId,
    pub quantity: i64,
    /// Takes precedence over the catalog price when present.
    pub unit_price: Option<Decimal>,
}

/// Operator input for a new sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleInput {
    pub memo_number: String,
    pub date: DateKey,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub lines: Vec<SaleLine>,
    /// Money given at sale time.
    pub payment_amount: Decimal,
}

impl SaleInput {
    /// Checks that need no store access: memo number, customer info, lines, payment.
    pub fn validate(&self) -> DomainResult<()> {
        if self.memo_number.trim().is_empty() {
            return Err(DomainError::validation("memoNumber", "memo number is required"));
        }
        if self.customer_name.trim().is_empty() {
            return Err(DomainError::missing_customer_info("customerName"));
        }
        if self.customer_phone.trim().is_empty() {
            return Err(DomainError::missing_customer_info("customerPhone"));
        }
        if self.lines.is_empty() {
            return Err(DomainError::EmptyMemo);
        }
        for line in &self.lines {
            if line.quantity <= 0 {
                return Err(DomainError::validation(
                    "quantity",
                    format!("quantity for product {} must be positive", line.product_id),
                ));
            }
            if let Some(price) = line.unit_price {
                ensure_non_negative("unitPrice", price)?;
            }
        }
        ensure_non_negative("paymentAmount", self.payment_amount)?;
        Ok(())
    }

    /// Build the memo document from priced lines.
    pub fn into_memo(self, products: Vec<LineItem>, now: DateTime<Utc>) -> DomainResult<Memo> {
        let totals = MemoTotals::compute(&products, self.payment_amount)?;
        Ok(Memo {
            memo_number: self.memo_number.trim().to_string(),
            date: self.date,
            customer_name: self.customer_name.trim().to_string(),
            customer_phone: self.customer_phone.trim().to_string(),
            customer_address: self.customer_address.trim().to_string(),
            products,
            total_bill: totals.total_bill,
            payment_amount: self.payment_amount,
            credit: totals.credit,
            created_at: now,
        })
    }
}

/// Collapse repeated products into one line.
///
/// Quantities add up; the latest explicit price wins. First-seen order is kept.
pub fn merge_lines(lines: &[SaleLine]) -> DomainResult<Vec<SaleLine>> {
    let mut merged: Vec<SaleLine> = Vec::with_capacity(lines.len());
    for line in lines {
        match merged.iter_mut().find(|m| m.product_id == line.product_id) {
            Some(existing) => {
                existing.quantity = existing.quantity.checked_add(line.quantity).ok_or_else(|| {
                    DomainError::validation(
                        "quantity",
                        format!("combined quantity for product {} overflows", line.product_id),
                    )
                })?;
                if line.unit_price.is_some() {
                    existing.unit_price = line.unit_price;
                }
            }
            None => merged.push(line.clone()),
        }
    }
    Ok(merged)
}

/// Resolve prices against the catalog and check stock for every line.
///
/// Lines must already be merged, so each product's full requested quantity is checked
/// at once.
pub fn price_lines(
    lines: &[SaleLine],
    catalog: &HashMap<ProductId, Product>,
) -> DomainResult<Vec<LineItem>> {
    lines
        .iter()
        .map(|line| -> DomainResult<LineItem> {
            let product = catalog
                .get(&line.product_id)
                .ok_or_else(|| DomainError::not_found("product", line.product_id.to_string()))?;
            product.remaining_after_sale(&line.product_id, line.quantity)?;
            let price = line.unit_price.unwrap_or(product.price);
            LineItem::new(line.product_id.clone(), product.name.clone(), price, line.quantity)
        })
        .collect()
}

/// Guarded stock write for one product: only applies while `expected` is still current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockDecrement {
    pub product_id: ProductId,
    pub expected: i64,
    pub remaining: i64,
}

/// Plan the stock writes of a sale from the quantities that were read.
pub fn plan_stock_decrements(
    items: &[LineItem],
    catalog: &HashMap<ProductId, Product>,
) -> DomainResult<Vec<StockDecrement>> {
    items
        .iter()
        .map(|item| -> DomainResult<StockDecrement> {
            let product = catalog
                .get(&item.product_id)
                .ok_or_else(|| DomainError::not_found("product", item.product_id.to_string()))?;
            let remaining = product.remaining_after_sale(&item.product_id, item.quantity)?;
            Ok(StockDecrement {
                product_id: item.product_id.clone(),
                expected: product.quantity,
                remaining,
            })
        })
        .collect()
}
