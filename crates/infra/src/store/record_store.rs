use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use tillbook_core::RecordId;

/// Field/value pairs of a partial document write.
pub type JsonMap = Map<String, JsonValue>;

/// The keyed collections of the shop database.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Customers,
    Products,
    Memos,
    CashEntries,
    CustomerPayments,
}

impl Collection {
    /// Collection path in the store layout.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Customers => "customers",
            Collection::Products => "products",
            Collection::Memos => "memos",
            Collection::CashEntries => "cashEntries",
            Collection::CustomerPayments => "customerPayments",
        }
    }
}

impl core::fmt::Display for Collection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record store operation error.
///
/// These are storage failures, as opposed to domain errors (validation, stock rules).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// The store could not be reached or failed the call (network, IO, poisoned lock).
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    #[error("record `{id}` not found in {collection}")]
    NotFound { collection: Collection, id: RecordId },

    /// A guarded write found different current values than it expected.
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// A document could not be encoded or decoded.
    #[error("codec error in {collection}: {message}")]
    Codec {
        collection: Collection,
        message: String,
    },
}

/// One write of a guarded batch: apply `fields` to `id` only while every field in
/// `expected` still has the given value.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardedWrite {
    pub id: RecordId,
    pub expected: JsonMap,
    pub fields: JsonMap,
}

/// Keyed JSON document store.
///
/// This is the only dependency the services have on storage. Documents are JSON
/// objects keyed by store-generated ids; there is no schema and no foreign key.
///
/// Guarantees required from an implementation:
/// - `insert` assigns a fresh key that sorts after earlier keys.
/// - `update_partial` touches only the given fields.
/// - `update_batch` is all-or-nothing: either every guard holds and every write is
///   applied, or nothing changes.
pub trait RecordStore: Send + Sync {
    fn insert(&self, collection: Collection, record: JsonValue) -> Result<RecordId, StoreError>;

    fn get_all(&self, collection: Collection) -> Result<BTreeMap<RecordId, JsonValue>, StoreError>;

    fn get(&self, collection: Collection, id: &RecordId) -> Result<Option<JsonValue>, StoreError>;

    /// Records whose top-level `field` equals `value`.
    fn query_by_equality(
        &self,
        collection: Collection,
        field: &str,
        value: &JsonValue,
    ) -> Result<BTreeMap<RecordId, JsonValue>, StoreError>;

    fn update_partial(
        &self,
        collection: Collection,
        id: &RecordId,
        fields: JsonMap,
    ) -> Result<(), StoreError>;

    fn update_batch(&self, collection: Collection, writes: Vec<GuardedWrite>) -> Result<(), StoreError>;

    fn remove(&self, collection: Collection, id: &RecordId) -> Result<(), StoreError>;
}

impl<S> RecordStore for Arc<S>
where
    S: RecordStore + ?Sized,
{
    fn insert(&self, collection: Collection, record: JsonValue) -> Result<RecordId, StoreError> {
        (**self).insert(collection, record)
    }

    fn get_all(&self, collection: Collection) -> Result<BTreeMap<RecordId, JsonValue>, StoreError> {
        (**self).get_all(collection)
    }

    fn get(&self, collection: Collection, id: &RecordId) -> Result<Option<JsonValue>, StoreError> {
        (**self).get(collection, id)
    }

    fn query_by_equality(
        &self,
        collection: Collection,
        field: &str,
        value: &JsonValue,
    ) -> Result<BTreeMap<RecordId, JsonValue>, StoreError> {
        (**self).query_by_equality(collection, field, value)
    }

    fn update_partial(
        &self,
        collection: Collection,
        id: &RecordId,
        fields: JsonMap,
    ) -> Result<(), StoreError> {
        (**self).update_partial(collection, id, fields)
    }

    fn update_batch(&self, collection: Collection, writes: Vec<GuardedWrite>) -> Result<(), StoreError> {
        (**self).update_batch(collection, writes)
    }

    fn remove(&self, collection: Collection, id: &RecordId) -> Result<(), StoreError> {
        (**self).remove(collection, id)
    }
}
