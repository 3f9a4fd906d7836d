//! Strongly-typed identifiers used across the domain.
//!
//! Records are keyed by opaque strings assigned by the record store. Freshly generated
//! keys are UUIDv7 strings, so lexical key order follows creation order.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Untyped key of a record inside a store collection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

/// Identifier of a customer record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

/// Identifier of a product (stock item) record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

/// Identifier of a memo (sale) record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoId(String);

/// Identifier of a cash entry record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CashEntryId(String);

/// Identifier of a customer payment record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(String);

const RESERVED_KEY_CHARS: [char; 6] = ['.', '#', '$', '[', ']', '/'];

fn validate_key(name: &str, s: &str) -> Result<(), DomainError> {
    if s.trim().is_empty() {
        return Err(DomainError::invalid_id(format!("{name}: key cannot be empty")));
    }
    if let Some(c) = s.chars().find(|c| RESERVED_KEY_CHARS.contains(c)) {
        return Err(DomainError::invalid_id(format!(
            "{name}: key contains reserved character '{c}'"
        )));
    }
    Ok(())
}

macro_rules! impl_key_newtype {
    ($t:ident, $name:literal) => {
        impl $t {
            /// Generate a fresh, time-ordered key.
            pub fn generate() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                validate_key($name, s)?;
                Ok(Self(s.to_string()))
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

macro_rules! impl_typed_id {
    ($t:ident, $name:literal) => {
        impl_key_newtype!($t, $name);

        impl From<RecordId> for $t {
            fn from(value: RecordId) -> Self {
                Self(value.0)
            }
        }

        impl From<$t> for RecordId {
            fn from(value: $t) -> Self {
                RecordId(value.0)
            }
        }

        impl From<&$t> for RecordId {
            fn from(value: &$t) -> Self {
                RecordId(value.0.clone())
            }
        }
    };
}

impl_key_newtype!(RecordId, "RecordId");
impl_typed_id!(CustomerId, "CustomerId");
impl_typed_id!(ProductId, "ProductId");
impl_typed_id!(MemoId, "MemoId");
impl_typed_id!(CashEntryId, "CashEntryId");
impl_typed_id!(PaymentId, "PaymentId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_are_unique_and_valid() {
        let first = RecordId::generate();
        let second = RecordId::generate();
        assert_ne!(first, second);
        assert!(RecordId::from_str(first.as_str()).is_ok());
    }

    #[test]
    fn parse_rejects_empty_and_reserved_keys() {
        assert!(RecordId::from_str("").is_err());
        assert!(MemoId::from_str("a/b").is_err());
        assert!(matches!(
            ProductId::from_str("p.1"),
            Err(DomainError::InvalidId(msg)) if msg.contains("ProductId")
        ));
        assert_eq!(CustomerId::from_str("-Nx12").unwrap().as_str(), "-Nx12");
    }

    #[test]
    fn typed_ids_convert_through_record_id() {
        let record = RecordId::from_str("k1").unwrap();
        let memo: MemoId = record.clone().into();
        assert_eq!(RecordId::from(&memo), record);
    }
}
