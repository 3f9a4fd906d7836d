//! Products (stock items) module.
//!
//! Catalog price plus quantity on hand. Quantity never goes negative: sales decrement
//! it, restocks increase it.

pub mod product;

pub use product::{Product, StockLevel};
