use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tillbook_core::{DateKey, DomainError, DomainResult, ValueObject};

/// Field that memos, cash-entry references and customer payments use to point back at
/// a customer's `phone`.
pub const CUSTOMER_PHONE_FIELD: &str = "customerPhone";

/// Persisted customer document (`customers/{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Lower-cased for lookup.
    pub name: String,
    /// Unique human key; see [`CustomerKey`].
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(rename = "date", default, skip_serializing_if = "Option::is_none")]
    pub registered_on: Option<DateKey>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Build a new customer document from already-normalized details.
    pub fn register(details: CustomerDetails, now: DateTime<Utc>) -> Self {
        Self {
            name: details.name,
            phone: details.phone,
            address: details.address,
            registered_on: Some(DateKey::from_datetime(now)),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the editable fields in place.
    pub fn apply_details(&mut self, details: CustomerDetails, now: DateTime<Utc>) {
        self.name = details.name;
        self.phone = details.phone;
        self.address = details.address;
        self.updated_at = now;
    }

    pub fn correlation_key(&self) -> CustomerKey {
        CustomerKey(self.phone.trim().to_string())
    }
}

/// Editable customer fields, validated and normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    pub name: String,
    pub phone: String,
    pub address: String,
}

impl CustomerDetails {
    /// Validate raw form input.
    ///
    /// Name and phone are required; the name is lower-cased and the phone must match
    /// `^\+?[1-9]\d{1,14}$`.
    pub fn normalize(name: &str, phone: &str, address: Option<&str>) -> DomainResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name", "name is required"));
        }

        let phone = phone.trim();
        if phone.is_empty() {
            return Err(DomainError::validation("phone", "phone is required"));
        }
        if !is_valid_phone(phone) {
            return Err(DomainError::validation(
                "phone",
                format!("`{phone}` is not a valid phone number"),
            ));
        }

        Ok(Self {
            name: name.to_lowercase(),
            phone: phone.to_string(),
            address: address.map(str::trim).unwrap_or_default().to_string(),
        })
    }
}

/// International phone check: optional `+`, a non-zero leading digit, 2..=15 digits.
pub fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let mut chars = digits.chars();
    match chars.next() {
        Some(first) if ('1'..='9').contains(&first) => {}
        _ => return false,
    }
    let rest = digits.len() - 1;
    (1..=14).contains(&rest) && chars.all(|c| c.is_ascii_digit())
}

/// The value by which memos, payments and cash entries are correlated to a customer.
///
/// There is no enforced foreign key: a record belongs to a customer when its
/// `customerPhone` equals the customer's phone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerKey(String);

impl CustomerKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a stored `customerPhone` value refers to this customer.
    pub fn matches(&self, stored_phone: &str) -> bool {
        self.0 == stored_phone.trim()
    }
}

impl ValueObject for CustomerKey {}

impl core::fmt::Display for CustomerKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve the correlation key for a phone number. Blank input has no key.
pub fn find_customer_correlation_key(phone: &str) -> Option<CustomerKey> {
    let phone = phone.trim();
    if phone.is_empty() {
        None
    } else {
        Some(CustomerKey(phone.to_string()))
    }
}
