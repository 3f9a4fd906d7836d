//! The till's cash book: manual entries, day summaries, running balances and the daily
//! opening-balance carry-forward.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

use tillbook_accounting::{
    CashCategory, CashEntry, DayTotals, Direction, RunningBalance, day_totals, opening_balance_due,
    running_balances,
};
use tillbook_core::{CashEntryId, DateKey, Record};

use crate::config::Settings;
use crate::error::ServiceError;
use crate::store::RecordStore;
use crate::store::codec;

pub struct CashBook<S: RecordStore> {
    store: S,
    settings: Settings,
}

impl<S: RecordStore> CashBook<S> {
    pub fn new(store: S, settings: Settings) -> Self {
        Self { store, settings }
    }

    /// Record a manual ledger line (expense, salary, purchase, ...).
    pub fn record_entry(
        &self,
        date: DateKey,
        direction: Direction,
        amount: Decimal,
        category: CashCategory,
        details: &str,
        now: DateTime<Utc>,
    ) -> Result<CashEntryId, ServiceError> {
        let entry = CashEntry::record(date, direction, amount, category, details, now)?;
        let id: CashEntryId = codec::insert_doc(&self.store, &entry)?;
        info!(
            entry_id = %id,
            date = %date,
            direction = ?direction,
            category = ?category,
            amount = %amount,
            "cash entry recorded"
        );
        Ok(id)
    }

    /// The full ledger in chronological order.
    pub fn entries(&self) -> Result<Vec<Record<CashEntryId, CashEntry>>, ServiceError> {
        let mut entries: Vec<Record<CashEntryId, CashEntry>> = codec::load_all(&self.store)?;
        entries.sort_by(|a, b| {
            a.data
                .created_at
                .cmp(&b.data.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(entries)
    }

    pub fn day_summary(&self, date: DateKey) -> Result<DayTotals, ServiceError> {
        let entries = self.entries()?;
        Ok(day_totals(entries.iter().map(|r| &r.data), date))
    }

    /// Running balance after every entry, computed over the whole ledger.
    pub fn running_balances(&self) -> Result<Vec<RunningBalance>, ServiceError> {
        Ok(running_balances(&self.entries()?))
    }

    /// Append today's opening balance if it is due. Safe to call on every load: once
    /// today has an opening-balance entry this is a no-op.
    pub fn carry_forward_opening_balance(
        &self,
        today: DateKey,
        now: DateTime<Utc>,
    ) -> Result<Option<CashEntryId>, ServiceError> {
        let entries = self.entries()?;
        let Some(entry) = opening_balance_due(
            entries.iter().map(|r| &r.data),
            today,
            now,
            &self.settings.opening_balance_label,
        ) else {
            debug!(date = %today, "no opening balance due");
            return Ok(None);
        };

        let id: CashEntryId = codec::insert_doc(&self.store, &entry)?;
        info!(
            entry_id = %id,
            date = %today,
            amount = %entry.signed_amount(),
            "opening balance carried forward"
        );
        Ok(Some(id))
    }
}
