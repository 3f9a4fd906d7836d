//! Keyed records: a persisted document paired with the key the store assigned to it.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// A stored document together with its collection key.
///
/// The key is not part of the document body; the store keeps it as the map key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record<I, T> {
    pub id: I,
    pub data: T,
}

impl<I, T> Record<I, T> {
    pub fn new(id: I, data: T) -> Self {
        Self { id, data }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Record<I, U> {
        Record {
            id: self.id,
            data: f(self.data),
        }
    }
}

impl<I, T> Entity for Record<I, T>
where
    I: Clone + Eq + core::hash::Hash + core::fmt::Debug,
{
    type Id = I;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
