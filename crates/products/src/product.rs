use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tillbook_core::money::ensure_non_negative;
use tillbook_core::{DomainError, DomainResult, ProductId};

/// Persisted stock item (`products/{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    /// Catalog unit price.
    pub price: Decimal,
    /// Units on hand.
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Validate and build a new stock item.
    pub fn create(
        name: &str,
        price: Decimal,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name", "name cannot be empty"));
        }
        ensure_non_negative("price", price)?;
        if quantity < 0 {
            return Err(DomainError::validation("quantity", "quantity cannot be negative"));
        }

        Ok(Self {
            name: name.to_string(),
            price,
            quantity,
            created_at: now,
        })
    }

    /// Quantity after receiving `delta` more units.
    pub fn restocked(&self, delta: i64) -> DomainResult<i64> {
        if delta <= 0 {
            return Err(DomainError::validation("quantity", "restock delta must be positive"));
        }
        self.quantity
            .checked_add(delta)
            .ok_or_else(|| DomainError::validation("quantity", "quantity overflow"))
    }

    /// Quantity left after selling `requested` units.
    pub fn remaining_after_sale(&self, id: &ProductId, requested: i64) -> DomainResult<i64> {
        if requested <= 0 {
            return Err(DomainError::validation("quantity", "quantity must be positive"));
        }
        let remaining = self.quantity - requested;
        if remaining < 0 {
            return Err(DomainError::InsufficientStock {
                product_id: id.to_string(),
                requested,
                available: self.quantity,
            });
        }
        Ok(remaining)
    }

    pub fn level(&self) -> StockLevel {
        StockLevel::of(self.quantity)
    }
}

/// Coarse stock indicator for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    OutOfStock,
    Low,
    InStock,
}

impl StockLevel {
    pub const LOW_THRESHOLD: i64 = 5;

    pub fn of(quantity: i64) -> Self {
        match quantity {
            q if q <= 0 => StockLevel::OutOfStock,
            q if q <= Self::LOW_THRESHOLD => StockLevel::Low,
            _ => StockLevel::InStock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core::str::FromStr;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap()
    }

    fn test_product_id() -> ProductId {
        ProductId::from_str("p-rice").unwrap()
    }

    fn rice(quantity: i64) -> Product {
        Product::create("Rice 5kg", dec!(10.50), quantity, test_time()).unwrap()
    }

    #[test]
    fn create_rejects_empty_name_and_negative_values() {
        assert!(matches!(
            Product::create(" ", dec!(1), 1, test_time()),
            Err(DomainError::Validation { field, .. }) if field == "name"
        ));
        assert!(matches!(
            Product::create("Oil", dec!(-1), 1, test_time()),
            Err(DomainError::Validation { field, .. }) if field == "price"
        ));
        assert!(matches!(
            Product::create("Oil", dec!(1), -1, test_time()),
            Err(DomainError::Validation { field, .. }) if field == "quantity"
        ));
    }

    #[test]
    fn free_items_with_zero_stock_are_allowed() {
        let product = Product::create("Sample", dec!(0), 0, test_time()).unwrap();
        assert_eq!(product.level(), StockLevel::OutOfStock);
    }

    #[test]
    fn sale_cannot_exceed_stock() {
        let err = rice(3).remaining_after_sale(&test_product_id(), 4).unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                product_id: "p-rice".to_string(),
                requested: 4,
                available: 3,
            }
        );
        assert_eq!(rice(3).remaining_after_sale(&test_product_id(), 3).unwrap(), 0);
    }

    #[test]
    fn restock_requires_positive_delta() {
        assert_eq!(rice(3).restocked(7).unwrap(), 10);
        assert!(rice(3).restocked(0).is_err());
    }

    #[test]
    fn price_round_trips_as_a_json_number() {
        let json = serde_json::to_value(rice(3)).unwrap();
        assert!(json["price"].is_number());
        assert!(json["quantity"].is_i64());
        let back: Product = serde_json::from_value(json).unwrap();
        assert_eq!(back, rice(3));
    }

    proptest! {
        #[test]
        fn remaining_stock_is_never_negative(stock in 0i64..1_000, requested in 1i64..2_000) {
            match rice(stock).remaining_after_sale(&test_product_id(), requested) {
                Ok(remaining) => {
                    prop_assert!(remaining >= 0);
                    prop_assert_eq!(remaining, stock - requested);
                }
                Err(DomainError::InsufficientStock { available, .. }) => {
                    prop_assert!(requested > stock);
                    prop_assert_eq!(available, stock);
                }
                Err(other) => prop_assert!(false, "unexpected error {other:?}"),
            }
        }
    }
}
