use log::debug;
use rust_decimal::Decimal;

use super::changes_errors::ChangeError;
use super::changes_model::{Change, ChangeAudit};
use crate::errors::Result;
use crate::instruments::InstrumentStatus;
use crate::ledger::{LedgerSession, Lot};

/// Applies a validated batch of ownership changes to the ledger session.
///
/// Buys append lots (never merged, even same-day) and sells consume lots
/// oldest-acquisition-first. The session is only mutated after the whole
/// batch validates; any application failure aborts the run and the
/// surrounding transaction discards the partial mutations.
pub struct ChangeApplier;

impl ChangeApplier {
    pub fn new() -> Self {
        Self
    }

    /// Applies all pending changes in date order (stable within a date, so a
    /// buy can enable a sell later in the same batch) and returns one audit
    /// row per applied change.
    pub fn apply_batch(
        &self,
        session: &mut LedgerSession,
        pending: &[Change],
    ) -> Result<Vec<ChangeAudit>> {
        for change in pending {
            change.validate()?;
        }

        let mut ordered: Vec<&Change> = pending.iter().collect();
        ordered.sort_by_key(|c| c.change_date);

        let mut audits = Vec::with_capacity(ordered.len());
        for change in ordered {
            let instrument_id = self.apply_one(session, change)?;
            audits.push(ChangeAudit::new(
                instrument_id,
                change.change_date,
                change.quantity,
                change.unit_price,
            ));
        }
        Ok(audits)
    }

    fn apply_one(&self, session: &mut LedgerSession, change: &Change) -> Result<i32> {
        debug!(
            "Applying change: {} {} x {} @ {}",
            change.change_date, change.ticker, change.quantity, change.unit_price
        );

        if change.is_buy() {
            self.apply_buy(session, change)
        } else if change.is_liquidation() {
            self.apply_liquidation(session, change)
        } else {
            self.apply_sell(session, change)
        }
    }

    fn apply_buy(&self, session: &mut LedgerSession, change: &Change) -> Result<i32> {
        let mut instrument = match session.find_active_by_ticker(&change.ticker) {
            Some(existing) => existing.clone(),
            None => session.create_instrument(&change.name, &change.ticker, change.unit_price),
        };

        session.append_lot(Lot::new(
            instrument.id,
            change.change_date,
            change.quantity,
            change.unit_price,
        ));

        instrument.total_shares = session.shares_held(instrument.id);
        let instrument_id = instrument.id;
        session.update_instrument(instrument);
        Ok(instrument_id)
    }

    fn apply_sell(&self, session: &mut LedgerSession, change: &Change) -> Result<i32> {
        let mut instrument = session
            .find_active_by_ticker(&change.ticker)
            .cloned()
            .ok_or_else(|| ChangeError::InstrumentNotFound(change.ticker.clone()))?;

        let requested = change.quantity.abs();
        let held = session.shares_held(instrument.id);
        if requested > held {
            // Ledger integrity fault; never clamp to zero.
            return Err(ChangeError::InsufficientShares {
                ticker: change.ticker.clone(),
                requested,
                held,
            }
            .into());
        }

        let lots = session.lots_mut(instrument.id);
        let mut remaining = requested;
        for lot in lots.iter_mut() {
            if remaining.is_zero() {
                break;
            }
            let consumed = remaining.min(lot.quantity);
            lot.quantity -= consumed;
            remaining -= consumed;
        }
        lots.retain(|lot| !lot.quantity.is_zero());

        instrument.total_shares = session.shares_held(instrument.id);
        if instrument.total_shares.is_zero() {
            instrument.status = InstrumentStatus::Disabled;
        }
        let instrument_id = instrument.id;
        session.update_instrument(instrument);
        Ok(instrument_id)
    }

    /// Explicit close-out directive: drop every lot regardless of what FIFO
    /// consumption would have left, then disable the instrument.
    fn apply_liquidation(&self, session: &mut LedgerSession, change: &Change) -> Result<i32> {
        let mut instrument = session
            .find_active_by_ticker(&change.ticker)
            .cloned()
            .ok_or_else(|| ChangeError::InstrumentNotFound(change.ticker.clone()))?;

        session.lots_mut(instrument.id).clear();
        instrument.total_shares = Decimal::ZERO;
        instrument.status = InstrumentStatus::Disabled;
        let instrument_id = instrument.id;
        session.update_instrument(instrument);
        Ok(instrument_id)
    }
}

impl Default for ChangeApplier {
    fn default() -> Self {
        Self::new()
    }
}
