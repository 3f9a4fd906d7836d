use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tillbook_core::money::ensure_positive;
use tillbook_core::{CustomerId, DateKey, DomainError, DomainResult};
use tillbook_parties::{Customer, CustomerKey, find_customer_correlation_key};

/// Money received from a customer against their outstanding credit, not tied to a
/// specific memo (`customerPayments/{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayment {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub customer_phone: String,
    pub amount: Decimal,
    pub date: DateKey,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
}

impl CustomerPayment {
    /// Validate and build a payment record with a snapshot of the customer.
    pub fn receive(
        customer_id: CustomerId,
        customer: &Customer,
        amount: Decimal,
        date: DateKey,
        payment_method: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let amount = ensure_positive(amount)?;
        let payment_method = payment_method.trim();
        if payment_method.is_empty() {
            return Err(DomainError::validation(
                "paymentMethod",
                "payment method is required",
            ));
        }

        Ok(Self {
            customer_id,
            customer_name: customer.name.clone(),
            customer_phone: customer.phone.clone(),
            amount,
            date,
            payment_method: payment_method.to_string(),
            created_at: now,
        })
    }

    pub fn customer_key(&self) -> Option<CustomerKey> {
        find_customer_correlation_key(&self.customer_phone)
    }
}
