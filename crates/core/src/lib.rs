//! `tillbook-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod date;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod record;
pub mod value_object;

pub use date::DateKey;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CashEntryId, CustomerId, MemoId, PaymentId, ProductId, RecordId};
pub use money::Decimal;
pub use record::Record;
pub use value_object::ValueObject;
