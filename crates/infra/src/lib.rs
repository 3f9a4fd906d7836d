//! Infrastructure layer: record store, configuration, and the services that write
//! through it.

pub mod config;
pub mod error;
pub mod services;
pub mod store;

#[cfg(test)]
mod test_support;

pub use config::Settings;
pub use error::{SaleStep, ServiceError};
pub use services::{
    CashBook, CreatedMemo, CustomerHistory, CustomerService, PaymentService, SaleService,
    StockService,
};
pub use store::{Collection, InMemoryRecordStore, RecordStore, StoreError};
