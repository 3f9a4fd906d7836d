//! Record store abstraction and implementations.

pub mod codec;
pub mod in_memory;
pub mod record_store;

pub use codec::StoredDocument;
pub use in_memory::InMemoryRecordStore;
pub use record_store::{Collection, GuardedWrite, JsonMap, RecordStore, StoreError};
