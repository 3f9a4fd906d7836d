use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use serde_json::Value as JsonValue;

use tillbook_core::RecordId;

use super::record_store::{Collection, GuardedWrite, JsonMap, RecordStore, StoreError};

type Documents = BTreeMap<RecordId, JsonValue>;

/// In-memory record store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    collections: RwLock<HashMap<Collection, Documents>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("lock poisoned".to_string())
    }
}

fn as_object_mut<'a>(
    collection: Collection,
    id: &RecordId,
    doc: &'a mut JsonValue,
) -> Result<&'a mut JsonMap, StoreError> {
    doc.as_object_mut().ok_or_else(|| StoreError::Codec {
        collection,
        message: format!("record `{id}` is not an object"),
    })
}

impl RecordStore for InMemoryRecordStore {
    fn insert(&self, collection: Collection, record: JsonValue) -> Result<RecordId, StoreError> {
        if !record.is_object() {
            return Err(StoreError::Codec {
                collection,
                message: "records must be JSON objects".to_string(),
            });
        }

        let mut collections = self.collections.write().map_err(|_| Self::poisoned())?;
        let id = RecordId::generate();
        collections
            .entry(collection)
            .or_default()
            .insert(id.clone(), record);
        Ok(id)
    }

    fn get_all(&self, collection: Collection) -> Result<Documents, StoreError> {
        let collections = self.collections.read().map_err(|_| Self::poisoned())?;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    fn get(&self, collection: Collection, id: &RecordId) -> Result<Option<JsonValue>, StoreError> {
        let collections = self.collections.read().map_err(|_| Self::poisoned())?;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    fn query_by_equality(
        &self,
        collection: Collection,
        field: &str,
        value: &JsonValue,
    ) -> Result<Documents, StoreError> {
        let collections = self.collections.read().map_err(|_| Self::poisoned())?;
        let Some(docs) = collections.get(&collection) else {
            return Ok(Documents::new());
        };

        Ok(docs
            .iter()
            .filter(|(_, doc)| doc.get(field) == Some(value))
            .map(|(id, doc)| (id.clone(), doc.clone()))
            .collect())
    }

    fn update_partial(
        &self,
        collection: Collection,
        id: &RecordId,
        fields: JsonMap,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().map_err(|_| Self::poisoned())?;
        let doc = collections
            .get_mut(&collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.clone(),
            })?;

        let object = as_object_mut(collection, id, doc)?;
        for (field, value) in fields {
            object.insert(field, value);
        }
        Ok(())
    }

    fn update_batch(&self, collection: Collection, writes: Vec<GuardedWrite>) -> Result<(), StoreError> {
        if writes.is_empty() {
            return Ok(());
        }

        let mut collections = self.collections.write().map_err(|_| Self::poisoned())?;
        let docs = collections.entry(collection).or_default();

        // Check every guard before touching anything.
        for write in &writes {
            let doc = docs.get(&write.id).ok_or_else(|| StoreError::NotFound {
                collection,
                id: write.id.clone(),
            })?;
            for (field, expected) in &write.expected {
                let current = doc.get(field).unwrap_or(&JsonValue::Null);
                if current != expected {
                    return Err(StoreError::PreconditionFailed(format!(
                        "{collection}/{}: `{field}` is {current}, expected {expected}",
                        write.id
                    )));
                }
            }
        }

        for write in writes {
            if let Some(doc) = docs.get_mut(&write.id) {
                let object = as_object_mut(collection, &write.id, doc)?;
                for (field, value) in write.fields {
                    object.insert(field, value);
                }
            }
        }
        Ok(())
    }

    fn remove(&self, collection: Collection, id: &RecordId) -> Result<(), StoreError> {
        let mut collections = self.collections.write().map_err(|_| Self::poisoned())?;
        collections
            .get_mut(&collection)
            .and_then(|docs| docs.remove(id))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.clone(),
            })
    }
}
