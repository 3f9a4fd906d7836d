//! Store wrapper that fails chosen operations, for partial-failure tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde_json::Value as JsonValue;

use tillbook_core::RecordId;

use crate::store::{Collection, GuardedWrite, JsonMap, RecordStore, StoreError};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Op {
    Insert,
    GetAll,
    Get,
    Query,
    UpdatePartial,
    UpdateBatch,
    Remove,
}

type BatchHook<S> = Box<dyn FnOnce(&S) + Send>;

pub struct FailingStore<S> {
    inner: S,
    failures: Mutex<Vec<(Op, Collection)>>,
    batch_hooks: Mutex<Vec<(Collection, BatchHook<S>)>>,
}

impl<S: RecordStore> FailingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failures: Mutex::new(Vec::new()),
            batch_hooks: Mutex::new(Vec::new()),
        }
    }

    /// Make every later `op` on `collection` fail with `StoreError::Unavailable`.
    pub fn fail_on(&self, op: Op, collection: Collection) {
        self.failures.lock().unwrap().push((op, collection));
    }

    /// Run `hook` against the inner store right before the next batch on `collection`.
    pub fn before_batch<F>(&self, collection: Collection, hook: F)
    where
        F: FnOnce(&S) + Send + 'static,
    {
        self.batch_hooks
            .lock()
            .unwrap()
            .push((collection, Box::new(hook)));
    }

    fn check(&self, op: Op, collection: Collection) -> Result<(), StoreError> {
        if self.failures.lock().unwrap().contains(&(op, collection)) {
            return Err(StoreError::Unavailable(format!(
                "injected {op:?} failure on {collection}"
            )));
        }
        Ok(())
    }
}

impl<S: RecordStore> RecordStore for FailingStore<S> {
    fn insert(&self, collection: Collection, record: JsonValue) -> Result<RecordId, StoreError> {
        self.check(Op::Insert, collection)?;
        self.inner.insert(collection, record)
    }

    fn get_all(&self, collection: Collection) -> Result<BTreeMap<RecordId, JsonValue>, StoreError> {
        self.check(Op::GetAll, collection)?;
        self.inner.get_all(collection)
    }

    fn get(&self, collection: Collection, id: &RecordId) -> Result<Option<JsonValue>, StoreError> {
        self.check(Op::Get, collection)?;
        self.inner.get(collection, id)
    }

    fn query_by_equality(
        &self,
        collection: Collection,
        field: &str,
        value: &JsonValue,
    ) -> Result<BTreeMap<RecordId, JsonValue>, StoreError> {
        self.check(Op::Query, collection)?;
        self.inner.query_by_equality(collection, field, value)
    }

    fn update_partial(
        &self,
        collection: Collection,
        id: &RecordId,
        fields: JsonMap,
    ) -> Result<(), StoreError> {
        self.check(Op::UpdatePartial, collection)?;
        self.inner.update_partial(collection, id, fields)
    }

    fn update_batch(&self, collection: Collection, writes: Vec<GuardedWrite>) -> Result<(), StoreError> {
        let hooks: Vec<BatchHook<S>> = {
            let mut pending = self.batch_hooks.lock().unwrap();
            let (matching, rest): (Vec<_>, Vec<_>) =
                pending.drain(..).partition(|(c, _)| *c == collection);
            *pending = rest;
            matching.into_iter().map(|(_, hook)| hook).collect()
        };
        for hook in hooks {
            hook(&self.inner);
        }

        self.check(Op::UpdateBatch, collection)?;
        self.inner.update_batch(collection, writes)
    }

    fn remove(&self, collection: Collection, id: &RecordId) -> Result<(), StoreError> {
        self.check(Op::Remove, collection)?;
        self.inner.remove(collection, id)
    }
}
