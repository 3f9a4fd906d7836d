//! Customer payment reconciliation.
//!
//! A payment either goes against the customer's overall credit (a `CustomerPayment`
//! plus a `customer_payment` cash entry) or against one memo (only that memo's
//! `paymentAmount` and `credit` change).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{error, info};

use tillbook_accounting::{
    CashCategory, CashEntry, CashReference, CustomerAggregates, CustomerPayment, Direction,
    customer_aggregates,
};
use tillbook_core::money::ensure_positive;
use tillbook_core::{CustomerId, DateKey, DomainError, MemoId, PaymentId, Record, RecordId};
use tillbook_parties::{CUSTOMER_PHONE_FIELD, Customer, CustomerKey, find_customer_correlation_key};
use tillbook_sales::{Memo, MemoPayment};

use crate::config::Settings;
use crate::error::ServiceError;
use crate::store::codec::{self, fields};
use crate::store::{Collection, RecordStore};

/// A customer's memos and payments with their aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerHistory {
    pub key: CustomerKey,
    /// Newest first.
    pub memos: Vec<Record<MemoId, Memo>>,
    /// Newest first.
    pub payments: Vec<Record<PaymentId, CustomerPayment>>,
    pub aggregates: CustomerAggregates,
}

pub struct PaymentService<S: RecordStore> {
    store: S,
    settings: Settings,
}

impl<S: RecordStore> PaymentService<S> {
    pub fn new(store: S, settings: Settings) -> Self {
        Self { store, settings }
    }

    /// Receive money against a customer's overall credit.
    ///
    /// Writes the payment record, then a `customer_payment` cash entry. No memo changes.
    pub fn record_customer_payment(
        &self,
        customer_id: &CustomerId,
        amount: Decimal,
        date: DateKey,
        payment_method: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<PaymentId, ServiceError> {
        ensure_positive(amount)?;
        let customer: Customer = codec::load_doc(&self.store, customer_id)?
            .ok_or_else(|| DomainError::not_found("customer", customer_id.to_string()))?;

        let method = payment_method.unwrap_or(self.settings.default_payment_method.as_str());
        let payment = CustomerPayment::receive(customer_id.clone(), &customer, amount, date, method, now)?;
        let entry = CashEntry::record(
            date,
            Direction::In,
            amount,
            CashCategory::CustomerPayment,
            format!("Payment from {}", customer.name),
            now,
        )?
        .with_reference(CashReference::for_customer(customer_id, &customer))
        .with_payment_method(payment.payment_method.clone());

        let payment_id: PaymentId = codec::insert_doc(&self.store, &payment)?;
        if let Err(e) = codec::insert_doc(&self.store, &entry) {
            error!(
                payment_id = %payment_id,
                customer = %customer.phone,
                error = %e,
                "payment recorded without its cash entry"
            );
            return Err(e.into());
        }

        info!(
            payment_id = %payment_id,
            customer = %customer.phone,
            amount = %amount,
            method = %payment.payment_method,
            "customer payment recorded"
        );
        Ok(payment_id)
    }

    /// Receive money against one memo.
    ///
    /// Only `paymentAmount` and `credit` are written; the rest of the memo is untouched.
    /// Overpayment leaves a negative credit.
    pub fn apply_payment_to_memo(
        &self,
        memo_id: &MemoId,
        amount: Decimal,
    ) -> Result<MemoPayment, ServiceError> {
        ensure_positive(amount)?;
        let memo: Memo = codec::load_doc(&self.store, memo_id)?
            .ok_or_else(|| DomainError::not_found("memo", memo_id.to_string()))?;

        let paid = memo.apply_payment(amount)?;
        self.store.update_partial(
            Collection::Memos,
            &RecordId::from(memo_id),
            fields([
                ("paymentAmount", codec::encode_value(Collection::Memos, &paid.payment_amount)?),
                ("credit", codec::encode_value(Collection::Memos, &paid.credit)?),
            ]),
        )?;

        info!(
            memo_id = %memo_id,
            memo_number = %memo.memo_number,
            amount = %amount,
            credit = %paid.credit,
            "payment applied to memo"
        );
        Ok(paid)
    }

    /// Everything a customer bought and paid, correlated by phone.
    pub fn customer_history(&self, phone: &str) -> Result<CustomerHistory, ServiceError> {
        let key = find_customer_correlation_key(phone)
            .ok_or_else(|| DomainError::validation("customerPhone", "phone is required"))?;
        let value = json!(key.as_str());

        let mut memos: Vec<Record<MemoId, Memo>> =
            codec::query_docs(&self.store, CUSTOMER_PHONE_FIELD, &value)?;
        let mut payments: Vec<Record<PaymentId, CustomerPayment>> =
            codec::query_docs(&self.store, CUSTOMER_PHONE_FIELD, &value)?;
        memos.sort_by(|a, b| b.data.created_at.cmp(&a.data.created_at).then_with(|| b.id.cmp(&a.id)));
        payments.sort_by(|a, b| b.data.created_at.cmp(&a.data.created_at).then_with(|| b.id.cmp(&a.id)));

        let aggregates = customer_aggregates(
            memos.iter().map(|r| &r.data),
            payments.iter().map(|r| &r.data),
        );
        Ok(CustomerHistory {
            key,
            memos,
            payments,
            aggregates,
        })
    }
}
