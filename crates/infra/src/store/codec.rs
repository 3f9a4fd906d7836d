//! Typed access to store documents.
//!
//! Each domain document knows its collection and key type; the helpers here turn
//! `serde_json` values into `Record<Id, T>` and back, reporting failures as
//! `StoreError::Codec` with the offending collection and key.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use tillbook_accounting::{CashEntry, CustomerPayment};
use tillbook_core::{CashEntryId, CustomerId, MemoId, PaymentId, ProductId, Record, RecordId};
use tillbook_parties::Customer;
use tillbook_products::Product;
use tillbook_sales::Memo;

use super::record_store::{Collection, JsonMap, RecordStore, StoreError};

/// A domain type persisted as one document of a collection.
pub trait StoredDocument: Serialize + DeserializeOwned {
    type Id: From<RecordId> + Into<RecordId> + Clone;

    const COLLECTION: Collection;
}

impl StoredDocument for Customer {
    type Id = CustomerId;
    const COLLECTION: Collection = Collection::Customers;
}

impl StoredDocument for Product {
    type Id = ProductId;
    const COLLECTION: Collection = Collection::Products;
}

impl StoredDocument for Memo {
    type Id = MemoId;
    const COLLECTION: Collection = Collection::Memos;
}

impl StoredDocument for CashEntry {
    type Id = CashEntryId;
    const COLLECTION: Collection = Collection::CashEntries;
}

impl StoredDocument for CustomerPayment {
    type Id = PaymentId;
    const COLLECTION: Collection = Collection::CustomerPayments;
}

pub fn encode<D: StoredDocument>(doc: &D) -> Result<JsonValue, StoreError> {
    serde_json::to_value(doc).map_err(|e| StoreError::Codec {
        collection: D::COLLECTION,
        message: e.to_string(),
    })
}

pub fn decode<D: StoredDocument>(id: &RecordId, value: JsonValue) -> Result<D, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Codec {
        collection: D::COLLECTION,
        message: format!("record `{id}`: {e}"),
    })
}

/// Build a partial-update field map from already-encoded values.
pub fn fields<const N: usize>(pairs: [(&str, JsonValue); N]) -> JsonMap {
    pairs
        .into_iter()
        .map(|(field, value)| (field.to_string(), value))
        .collect()
}

pub fn encode_value<T: Serialize>(collection: Collection, value: &T) -> Result<JsonValue, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Codec {
        collection,
        message: e.to_string(),
    })
}

pub fn insert_doc<D, S>(store: &S, doc: &D) -> Result<D::Id, StoreError>
where
    D: StoredDocument,
    S: RecordStore + ?Sized,
{
    let id = store.insert(D::COLLECTION, encode(doc)?)?;
    Ok(D::Id::from(id))
}

pub fn load_doc<D, S>(store: &S, id: &D::Id) -> Result<Option<D>, StoreError>
where
    D: StoredDocument,
    S: RecordStore + ?Sized,
{
    let key: RecordId = id.clone().into();
    store
        .get(D::COLLECTION, &key)?
        .map(|value| decode(&key, value))
        .transpose()
}

pub fn load_all<D, S>(store: &S) -> Result<Vec<Record<D::Id, D>>, StoreError>
where
    D: StoredDocument,
    S: RecordStore + ?Sized,
{
    store
        .get_all(D::COLLECTION)?
        .into_iter()
        .map(|(key, value)| -> Result<Record<D::Id, D>, StoreError> {
            let doc = decode(&key, value)?;
            Ok(Record::new(D::Id::from(key), doc))
        })
        .collect()
}

pub fn query_docs<D, S>(
    store: &S,
    field: &str,
    value: &JsonValue,
) -> Result<Vec<Record<D::Id, D>>, StoreError>
where
    D: StoredDocument,
    S: RecordStore + ?Sized,
{
    store
        .query_by_equality(D::COLLECTION, field, value)?
        .into_iter()
        .map(|(key, value)| -> Result<Record<D::Id, D>, StoreError> {
            let doc = decode(&key, value)?;
            Ok(Record::new(D::Id::from(key), doc))
        })
        .collect()
}
