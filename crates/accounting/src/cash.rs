use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tillbook_core::money::ensure_positive;
use tillbook_core::{CustomerId, DateKey, DomainError, DomainResult, MemoId, ValueObject};
use tillbook_parties::Customer;
use tillbook_sales::Memo;

/// Which way money moved through the till.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

/// Ledger line category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashCategory {
    Sales,
    Purchase,
    Expense,
    Salary,
    CustomerPayment,
    MemoPayment,
    OpeningBalance,
    #[serde(other)]
    Other,
}

/// Link from a cash entry back to the memo or customer it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo_id: Option<MemoId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<CustomerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<String>,
}

impl CashReference {
    pub fn for_memo(memo_id: &MemoId, memo: &Memo) -> Self {
        Self {
            memo_id: Some(memo_id.clone()),
            memo_number: Some(memo.memo_number.clone()),
            customer_name: Some(memo.customer_name.clone()),
            customer_phone: Some(memo.customer_phone.clone()),
            transaction_type: Some("memo_payment".to_string()),
            ..Self::default()
        }
    }

    pub fn for_customer(customer_id: &CustomerId, customer: &Customer) -> Self {
        Self {
            customer_id: Some(customer_id.clone()),
            customer_name: Some(customer.name.clone()),
            customer_phone: Some(customer.phone.clone()),
            transaction_type: Some("customer_payment".to_string()),
            ..Self::default()
        }
    }
}

impl ValueObject for CashReference {}

/// Persisted ledger line (`cashEntries/{id}`). Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashEntry {
    pub date: DateKey,
    #[serde(rename = "type")]
    pub direction: Direction,
    /// Always > 0; the direction carries the sign.
    pub amount: Decimal,
    pub category: CashCategory,
    #[serde(default)]
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<CashReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CashEntry {
    /// Validate and build a new ledger line.
    pub fn record(
        date: DateKey,
        direction: Direction,
        amount: Decimal,
        category: CashCategory,
        details: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let amount = ensure_positive(amount)?;
        let details = details.into().trim().to_string();
        if details.is_empty() {
            return Err(DomainError::validation("details", "details are required"));
        }

        Ok(Self {
            date,
            direction,
            amount,
            category,
            details,
            reference: None,
            payment_method: None,
            created_at: now,
        })
    }

    pub fn with_reference(mut self, reference: CashReference) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    /// Amount with the direction applied: `+amount` for in, `-amount` for out.
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            Direction::In => self.amount,
            Direction::Out => -self.amount,
        }
    }

    pub fn is_opening_balance_for(&self, date: DateKey) -> bool {
        self.date == date && self.category == CashCategory::OpeningBalance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap()
    }

    fn today() -> DateKey {
        DateKey::from_ymd(2026, 10, 19).unwrap()
    }

    #[test]
    fn record_requires_positive_amount_and_details() {
        assert_eq!(
            CashEntry::record(today(), Direction::In, dec!(0), CashCategory::Sales, "x", test_time())
                .unwrap_err(),
            DomainError::invalid_amount(dec!(0))
        );
        assert!(matches!(
            CashEntry::record(today(), Direction::Out, dec!(5), CashCategory::Expense, "  ", test_time()),
            Err(DomainError::Validation { field, .. }) if field == "details"
        ));
    }

    #[test]
    fn signed_amount_follows_direction() {
        let cash_in =
            CashEntry::record(today(), Direction::In, dec!(7), CashCategory::Sales, "sale", test_time())
                .unwrap();
        let cash_out =
            CashEntry::record(today(), Direction::Out, dec!(7), CashCategory::Salary, "wage", test_time())
                .unwrap();
        assert_eq!(cash_in.signed_amount(), dec!(7));
        assert_eq!(cash_out.signed_amount(), dec!(-7));
    }

    #[test]
    fn direction_is_stored_under_type() {
        let entry =
            CashEntry::record(today(), Direction::Out, dec!(40), CashCategory::Expense, "rent", test_time())
                .unwrap();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], serde_json::json!("out"));
        assert_eq!(json["category"], serde_json::json!("expense"));
        assert_eq!(json["date"], serde_json::json!("2026-10-19"));
        assert!(json.get("reference").is_none());
    }

    #[test]
    fn unknown_categories_read_as_other() {
        let json = serde_json::json!({
            "date": "Mon Oct 19 2026",
            "type": "in",
            "amount": 12.5,
            "category": "lottery",
            "details": "legacy",
            "createdAt": "2026-10-19T09:00:00Z",
        });
        let entry: CashEntry = serde_json::from_value(json).unwrap();
        assert_eq!(entry.category, CashCategory::Other);
        assert_eq!(entry.date, today());
        assert_eq!(entry.amount, dec!(12.5));
    }

    #[test]
    fn memo_reference_carries_memo_number_and_customer_phone() {
        let memo_id: MemoId = "m1".parse().unwrap();
        let memo = Memo {
            memo_number: "M-7".into(),
            date: today(),
            customer_name: "karim".into(),
            customer_phone: "8801711000000".into(),
            customer_address: String::new(),
            products: vec![],
            total_bill: dec!(0),
            payment_amount: dec!(0),
            credit: dec!(0),
            created_at: test_time(),
        };
        let reference = CashReference::for_memo(&memo_id, &memo);
        let json = serde_json::to_value(&reference).unwrap();
        assert_eq!(json["memoId"], serde_json::json!("m1"));
        assert_eq!(json["memoNumber"], serde_json::json!("M-7"));
        assert_eq!(json["customerPhone"], serde_json::json!("8801711000000"));
        assert!(json.get("customerId").is_none());
    }
}
