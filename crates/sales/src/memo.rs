use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tillbook_core::money::ensure_positive;
use tillbook_core::{DateKey, DomainError, DomainResult, ProductId, ValueObject};
use tillbook_parties::{CustomerKey, find_customer_correlation_key};

/// One priced line of a memo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product the line was sold from.
    #[serde(rename = "id")]
    pub product_id: ProductId,
    pub name: String,
    /// Unit price at sale time.
    pub price: Decimal,
    pub quantity: i64,
    /// Always `price * quantity`.
    pub subtotal: Decimal,
}

impl LineItem {
    /// Fails when `price * quantity` does not fit in a `Decimal`.
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        price: Decimal,
        quantity: i64,
    ) -> DomainResult<Self> {
        let subtotal = line_subtotal(price, quantity).ok_or_else(|| {
            DomainError::validation(
                "unitPrice",
                format!("subtotal of {quantity} x {price} for product {product_id} overflows"),
            )
        })?;
        Ok(Self {
            product_id,
            name: name.into(),
            price,
            quantity,
            subtotal,
        })
    }
}

fn line_subtotal(price: Decimal, quantity: i64) -> Option<Decimal> {
    price.checked_mul(Decimal::from(quantity))
}

impl ValueObject for LineItem {}

/// Derived totals of a memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoTotals {
    pub total_bill: Decimal,
    pub credit: Decimal,
}

impl MemoTotals {
    /// `total_bill = Σ subtotal`, `credit = total_bill - payment_amount`.
    ///
    /// Credit is negative when the customer overpaid.
    pub fn compute(items: &[LineItem], payment_amount: Decimal) -> DomainResult<Self> {
        let total_bill = items
            .iter()
            .try_fold(Decimal::ZERO, |sum, i| sum.checked_add(i.subtotal))
            .ok_or_else(|| DomainError::validation("totalBill", "memo total overflows"))?;
        let credit = total_bill
            .checked_sub(payment_amount)
            .ok_or_else(|| DomainError::validation("paymentAmount", "memo credit overflows"))?;
        Ok(Self { total_bill, credit })
    }
}

/// Persisted sale record (`memos/{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memo {
    pub memo_number: String,
    pub date: DateKey,
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub customer_address: String,
    pub products: Vec<LineItem>,
    pub total_bill: Decimal,
    /// Money given at sale time plus any later memo-targeted payments.
    pub payment_amount: Decimal,
    pub credit: Decimal,
    pub created_at: DateTime<Utc>,
}

/// New values of the two payment fields after a memo-targeted payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoPayment {
    pub payment_amount: Decimal,
    pub credit: Decimal,
}

impl Memo {
    pub fn totals(&self) -> MemoTotals {
        MemoTotals {
            total_bill: self.total_bill,
            credit: self.credit,
        }
    }

    pub fn customer_key(&self) -> Option<CustomerKey> {
        find_customer_correlation_key(&self.customer_phone)
    }

    /// Whether the stored totals agree with the line items and payment.
    pub fn is_consistent(&self) -> bool {
        let lines_ok = self
            .products
            .iter()
            .all(|i| line_subtotal(i.price, i.quantity) == Some(i.subtotal));
        let expected = MemoTotals::compute(&self.products, self.payment_amount);
        lines_ok && expected.is_ok_and(|t| t == self.totals())
    }

    /// Compute the payment fields after receiving `amount` against this memo.
    ///
    /// Overpayment drives credit negative, which is allowed.
    pub fn apply_payment(&self, amount: Decimal) -> DomainResult<MemoPayment> {
        let amount = ensure_positive(amount)?;
        let overflow = || DomainError::validation("amount", "memo payment overflows");
        let payment_amount = self.payment_amount.checked_add(amount).ok_or_else(overflow)?;
        let credit = self.total_bill.checked_sub(payment_amount).ok_or_else(overflow)?;
        Ok(MemoPayment {
            payment_amount,
            credit,
        })
    }

    /// Outstanding part of this memo, zero when settled or overpaid.
    pub fn outstanding(&self) -> Decimal {
        self.credit.max(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core::str::FromStr;
    use rust_decimal_macros::dec;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap()
    }

    fn pid(s: &str) -> ProductId {
        ProductId::from_str(s).unwrap()
    }

    fn test_memo(payment: Decimal) -> Memo {
        let products = vec![
            LineItem::new(pid("p1"), "Rice", dec!(10.50), 2).unwrap(),
            LineItem::new(pid("p2"), "Oil", dec!(4), 3).unwrap(),
        ];
        let totals = MemoTotals::compute(&products, payment).unwrap();
        Memo {
            memo_number: "M-1001".to_string(),
            date: DateKey::from_ymd(2026, 10, 19).unwrap(),
            customer_name: "karim".to_string(),
            customer_phone: "8801711000000".to_string(),
            customer_address: String::new(),
            products,
            total_bill: totals.total_bill,
            payment_amount: payment,
            credit: totals.credit,
            created_at: test_time(),
        }
    }

    #[test]
    fn line_subtotal_is_price_times_quantity() {
        let line = LineItem::new(pid("p1"), "Rice", dec!(10.25), 4).unwrap();
        assert_eq!(line.subtotal, dec!(41.00));
    }

    #[test]
    fn oversized_subtotal_is_a_validation_error() {
        let err = LineItem::new(pid("p1"), "Gold", Decimal::MAX, 5).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field, .. } if field == "unitPrice"));
    }

    #[test]
    fn oversized_total_is_a_validation_error() {
        let half = Decimal::MAX / dec!(2);
        let products = vec![
            LineItem::new(pid("p1"), "A", half, 1).unwrap(),
            LineItem::new(pid("p2"), "B", half, 1).unwrap(),
            LineItem::new(pid("p3"), "C", half, 1).unwrap(),
        ];
        let err = MemoTotals::compute(&products, dec!(0)).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field, .. } if field == "totalBill"));
    }

    #[test]
    fn oversized_memo_payment_is_a_validation_error() {
        let mut memo = test_memo(dec!(0));
        memo.payment_amount = Decimal::MAX;
        assert!(matches!(
            memo.apply_payment(dec!(1)),
            Err(DomainError::Validation { field, .. }) if field == "amount"
        ));
    }

    #[test]
    fn totals_sum_subtotals_and_derive_credit() {
        let memo = test_memo(dec!(20));
        assert_eq!(memo.total_bill, dec!(33));
        assert_eq!(memo.credit, dec!(13));
        assert!(memo.is_consistent());
    }

    #[test]
    fn apply_payment_updates_payment_and_credit_together() {
        let memo = test_memo(dec!(20));
        let paid = memo.apply_payment(dec!(5)).unwrap();
        assert_eq!(paid.payment_amount, dec!(25));
        assert_eq!(paid.credit, dec!(8));
        assert_eq!(paid.credit, memo.total_bill - paid.payment_amount);
    }

    #[test]
    fn overpayment_leaves_negative_credit() {
        let memo = test_memo(dec!(30));
        let paid = memo.apply_payment(dec!(10)).unwrap();
        assert_eq!(paid.credit, dec!(-7));

        let mut settled = memo.clone();
        settled.payment_amount = paid.payment_amount;
        settled.credit = paid.credit;
        assert_eq!(settled.outstanding(), dec!(0));
    }

    #[test]
    fn apply_payment_rejects_non_positive_amounts() {
        let memo = test_memo(dec!(0));
        assert_eq!(
            memo.apply_payment(dec!(0)).unwrap_err(),
            DomainError::invalid_amount(dec!(0))
        );
        assert!(memo.apply_payment(dec!(-1)).is_err());
    }

    #[test]
    fn serialized_field_names_match_store_layout() {
        let json = serde_json::to_value(test_memo(dec!(20))).unwrap();
        for field in [
            "memoNumber",
            "date",
            "customerName",
            "customerPhone",
            "customerAddress",
            "products",
            "totalBill",
            "paymentAmount",
            "credit",
            "createdAt",
        ] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
        assert_eq!(json["products"][0]["id"], serde_json::json!("p1"));
        assert!(json["totalBill"].is_number());
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let memo = test_memo(dec!(20));
        let back: Memo = serde_json::from_value(serde_json::to_value(&memo).unwrap()).unwrap();
        assert_eq!(back, memo);
    }
}
