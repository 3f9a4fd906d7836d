use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::info;

use tillbook_core::{DomainError, ProductId, Record, RecordId};
use tillbook_products::Product;

use crate::error::ServiceError;
use crate::store::codec::{self, fields};
use crate::store::{Collection, GuardedWrite, RecordStore};

pub struct StockService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> StockService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn add_product(
        &self,
        name: &str,
        price: Decimal,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> Result<ProductId, ServiceError> {
        let product = Product::create(name, price, quantity, now)?;
        let id: ProductId = codec::insert_doc(&self.store, &product)?;
        info!(product_id = %id, name = %product.name, quantity, "product added");
        Ok(id)
    }

    /// Receive `delta` more units. Returns the new quantity on hand.
    pub fn restock(&self, id: &ProductId, delta: i64) -> Result<i64, ServiceError> {
        let product: Product = codec::load_doc(&self.store, id)?
            .ok_or_else(|| DomainError::not_found("product", id.to_string()))?;
        let quantity = product.restocked(delta)?;

        self.store.update_batch(
            Collection::Products,
            vec![GuardedWrite {
                id: RecordId::from(id),
                expected: fields([("quantity", json!(product.quantity))]),
                fields: fields([("quantity", json!(quantity))]),
            }],
        )?;
        info!(product_id = %id, delta, quantity, "product restocked");
        Ok(quantity)
    }

    /// All products by name.
    pub fn list(&self) -> Result<Vec<Record<ProductId, Product>>, ServiceError> {
        let mut products: Vec<Record<ProductId, Product>> = codec::load_all(&self.store)?;
        products.sort_by(|a, b| a.data.name.to_lowercase().cmp(&b.data.name.to_lowercase()));
        Ok(products)
    }
}
