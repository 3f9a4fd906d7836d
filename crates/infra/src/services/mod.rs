//! Application services over a `RecordStore`.
//!
//! Each service owns a store handle (usually a shared `Arc`) and exposes one
//! operation per user action. Validation happens before any write.

pub mod cash_book;
pub mod customers;
pub mod payments;
pub mod sale;
pub mod stock;

pub use cash_book::CashBook;
pub use customers::CustomerService;
pub use payments::{CustomerHistory, PaymentService};
pub use sale::{CreatedMemo, SaleService};
pub use stock::StockService;
