//! Value object trait: equality by value, not identity.
//!
//! Line items, cash references and date keys are value objects: two of them with the
//! same attributes are interchangeable. Customers, products, memos and cash entries are
//! entities, identified by their record key.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. To "modify" one,
/// build a new value.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
