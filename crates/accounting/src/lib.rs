//! Accounting module: the cash ledger and customer credit.
//!
//! Pure domain logic only: no IO, no persistence concerns. Every aggregate is derived
//! from a snapshot of raw records.

pub mod cash;
pub mod credit;
pub mod ledger;
pub mod payment;

pub use cash::{CashCategory, CashEntry, CashReference, Direction};
pub use credit::{CustomerAggregates, customer_aggregates, outstanding_credit};
pub use ledger::{
    BalanceTone, DayTotals, OPENING_BALANCE_DETAILS, RunningBalance, day_totals, group_by_date,
    net_balance, opening_balance_due, running_balance, running_balances, total_cash_in,
    total_cash_out,
};
pub use payment::CustomerPayment;
