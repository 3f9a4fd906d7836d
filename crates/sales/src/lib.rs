//! Sales memos module.
//!
//! A memo is the invoice of one sale. This crate holds the memo document, the pure
//! pricing of a sale (price resolution, totals, stock checks) and the payment math;
//! it performs no IO.

pub mod memo;
pub mod sale;

pub use memo::{LineItem, Memo, MemoPayment, MemoTotals};
pub use sale::{SaleInput, SaleLine, StockDecrement, merge_lines, plan_stock_decrements, price_lines};
