//! Ledger engine: pure aggregates over cash entries.
//!
//! Nothing here touches the store. Callers pass a snapshot of records and get derived
//! figures back; the only write-shaped result is [`opening_balance_due`], which returns
//! the entry to append (if any) and leaves the append to the caller.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use tillbook_core::{CashEntryId, DateKey, Record};

use crate::cash::{CashCategory, CashEntry, Direction};

/// Default `details` text of a carried-forward opening balance.
pub const OPENING_BALANCE_DETAILS: &str = "Opening Balance (carried forward)";

/// Cash in and out for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayTotals {
    pub cash_in: Decimal,
    pub cash_out: Decimal,
}

impl DayTotals {
    pub fn net(&self) -> Decimal {
        self.cash_in - self.cash_out
    }
}

/// Sum the entries dated `date`, split by direction.
pub fn day_totals<'a, I>(entries: I, date: DateKey) -> DayTotals
where
    I: IntoIterator<Item = &'a CashEntry>,
{
    entries
        .into_iter()
        .filter(|e| e.date == date)
        .fold(DayTotals::default(), |mut acc, e| {
            match e.direction {
                Direction::In => acc.cash_in += e.amount,
                Direction::Out => acc.cash_out += e.amount,
            }
            acc
        })
}

pub fn total_cash_in<'a, I>(entries: I) -> Decimal
where
    I: IntoIterator<Item = &'a CashEntry>,
{
    entries
        .into_iter()
        .filter(|e| e.direction == Direction::In)
        .map(|e| e.amount)
        .sum()
}

pub fn total_cash_out<'a, I>(entries: I) -> Decimal
where
    I: IntoIterator<Item = &'a CashEntry>,
{
    entries
        .into_iter()
        .filter(|e| e.direction == Direction::Out)
        .map(|e| e.amount)
        .sum()
}

/// `total_cash_in - total_cash_out` over any entry set, filtered or not.
pub fn net_balance<'a, I>(entries: I) -> Decimal
where
    I: IntoIterator<Item = &'a CashEntry>,
{
    entries.into_iter().map(CashEntry::signed_amount).sum()
}

/// Cumulative balance after one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningBalance {
    pub id: CashEntryId,
    pub balance: Decimal,
}

/// Running balance of every entry, in chronological order.
///
/// Entries are ordered by `created_at`, ties broken by key. Pass the full ledger:
/// a filtered or paginated slice gives balances that do not match the till.
pub fn running_balances(entries: &[Record<CashEntryId, CashEntry>]) -> Vec<RunningBalance> {
    let mut ordered: Vec<&Record<CashEntryId, CashEntry>> = entries.iter().collect();
    ordered.sort_by(|a, b| {
        a.data
            .created_at
            .cmp(&b.data.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut balance = Decimal::ZERO;
    ordered
        .into_iter()
        .map(|record| {
            balance += record.data.signed_amount();
            RunningBalance {
                id: record.id.clone(),
                balance,
            }
        })
        .collect()
}

/// Running balance up to and including `target`, or `None` when it is not in the ledger.
pub fn running_balance(
    entries: &[Record<CashEntryId, CashEntry>],
    target: &CashEntryId,
) -> Option<Decimal> {
    running_balances(entries)
        .into_iter()
        .find(|rb| &rb.id == target)
        .map(|rb| rb.balance)
}

/// The opening-balance entry that should exist for `today`, if one is missing.
///
/// Returns `None` when `today` already has an `opening_balance` entry or when
/// yesterday's net is zero. A negative net is carried as an `out` entry so the amount
/// stays positive.
pub fn opening_balance_due<'a, I>(
    entries: I,
    today: DateKey,
    now: DateTime<Utc>,
    details: &str,
) -> Option<CashEntry>
where
    I: IntoIterator<Item = &'a CashEntry>,
{
    let yesterday = today.previous();
    let mut net = Decimal::ZERO;
    for entry in entries {
        if entry.is_opening_balance_for(today) {
            return None;
        }
        if entry.date == yesterday {
            net += entry.signed_amount();
        }
    }
    if net.is_zero() {
        return None;
    }

    let direction = if net.is_sign_negative() {
        Direction::Out
    } else {
        Direction::In
    };
    let details = if details.trim().is_empty() {
        OPENING_BALANCE_DETAILS
    } else {
        details
    };
    CashEntry::record(
        today,
        direction,
        net.abs(),
        CashCategory::OpeningBalance,
        details,
        now,
    )
    .ok()
}

/// Group entries under their date, newest date first. Order within a day is kept.
pub fn group_by_date<'a, I>(entries: I) -> Vec<(DateKey, Vec<&'a CashEntry>)>
where
    I: IntoIterator<Item = &'a CashEntry>,
{
    let mut groups: BTreeMap<DateKey, Vec<&'a CashEntry>> = BTreeMap::new();
    for entry in entries {
        groups.entry(entry.date).or_default().push(entry);
    }
    groups.into_iter().rev().collect()
}

/// How a balance should be presented. Negative balances are a valid state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceTone {
    Surplus,
    Shortfall,
    Even,
}

impl BalanceTone {
    pub fn of(balance: Decimal) -> Self {
        if balance.is_zero() {
            Self::Even
        } else if balance.is_sign_negative() {
            Self::Shortfall
        } else {
            Self::Surplus
        }
    }
}
