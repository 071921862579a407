use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use log::{debug, error, info, warn};

use crate::changes::{Change, ChangeApplier, ChangeRepository};
use crate::db::{get_connection, DbPool, DbTransactionExecutor};
use crate::errors::{Error, Result};
use crate::instruments::{InstrumentRepository, InstrumentStatus};
use crate::ledger::LedgerSession;
use crate::market_data::{ClosePrice, ClosePriceProvider, PriceObservationRepository, PriceReconciler};
use crate::settings::{Settings, SettingsRepository};
use crate::valuation::{
    build_valuation_records, AlertCondition, PortfolioSummary, ProfitTracker, ValuationRepository,
};

use super::pipeline_model::{RunOutcome, RunState};

/// Drives one daily run end to end: ingest the pending change batch,
/// reconcile close prices over the catch-up window, and append the missing
/// valuation rows. Everything that mutates the ledger happens inside a
/// single transaction; the price feed is consulted before it opens.
pub struct PipelineService {
    pool: Arc<DbPool>,
    reconciler: PriceReconciler,
    applier: ChangeApplier,
    instrument_repository: InstrumentRepository,
    change_repository: ChangeRepository,
    observation_repository: PriceObservationRepository,
    valuation_repository: ValuationRepository,
    settings_repository: SettingsRepository,
    profit_tracker: ProfitTracker,
}

impl PipelineService {
    pub fn new(pool: Arc<DbPool>, provider: Arc<dyn ClosePriceProvider>) -> Self {
        Self {
            pool,
            reconciler: PriceReconciler::new(provider),
            applier: ChangeApplier::new(),
            instrument_repository: InstrumentRepository::new(),
            change_repository: ChangeRepository::new(),
            observation_repository: PriceObservationRepository::new(),
            valuation_repository: ValuationRepository::new(),
            settings_repository: SettingsRepository::new(),
            profit_tracker: ProfitTracker::new(),
        }
    }

    /// Runs the daily pipeline for `today`. Returns `Error::AlreadyCurrent`
    /// when the ledger has already been processed through yesterday, which
    /// callers should treat as a no-op rather than a failure.
    ///
    /// Re-running after a partial day (new changes landed since the last
    /// run) is safe: valuation rows already present are left untouched and
    /// only the missing (instrument, date) pairs are appended.
    pub async fn run_daily(&self, pending: &[Change], today: NaiveDate) -> Result<RunOutcome> {
        for change in pending {
            change.validate()?;
        }

        let last_processed = self.resolve_last_processed(pending, today)?;
        let window = PriceReconciler::reconciliation_window(last_processed, today);
        if window.is_empty() {
            return Err(Error::AlreadyCurrent { last_processed });
        }
        let window_start = window[0];
        let window_end = window[window.len() - 1];
        info!(
            "Daily run: {} pending change(s), window {} .. {}",
            pending.len(),
            window_start,
            window_end
        );

        let closes_by_ticker = self
            .prefetch_for_candidates(pending, last_processed, today)
            .await?;

        let tx_result = self.pool.execute(|conn| {
            debug!("Run state: {:?}", RunState::Ingesting);
            let mut session = LedgerSession::load(conn)?;
            let audits = self.applier.apply_batch(&mut session, pending)?;

            debug!("Run state: {:?}", RunState::Reconciling);
            let observations = {
                let actives = session.active_instruments();
                self.reconciler
                    .reconcile(&actives, &window, &closes_by_ticker)?
            };

            for (instrument_id, close) in PriceReconciler::latest_closes(&observations) {
                let updated = session
                    .instruments()
                    .iter()
                    .find(|instrument| instrument.id == instrument_id)
                    .cloned();
                if let Some(mut instrument) = updated {
                    instrument.last_price = close;
                    session.update_instrument(instrument);
                }
            }

            // Instruments created this run must be persisted before the
            // audit, observation and valuation rows that reference them.
            session.flush(conn)?;
            self.change_repository.insert_audits(conn, &audits)?;
            self.observation_repository
                .replace_window(conn, &observations)?;

            debug!("Run state: {:?}", RunState::Valuating);
            let records = build_valuation_records(session.lots(), &observations);
            let inserted = self.valuation_repository.insert_missing(conn, &records)?;

            Ok((audits.len(), inserted))
        });

        let (changes_applied, valuations_inserted) = match tx_result {
            Ok(counts) => counts,
            Err(e) => {
                error!(
                    "Daily run rolled back (state {:?}): {}",
                    RunState::RolledBack,
                    e
                );
                return Err(e);
            }
        };
        info!(
            "Daily run committed: {} change(s) applied, {} valuation row(s) appended",
            changes_applied, valuations_inserted
        );

        let (summary, alerts) = self.post_run_report();

        Ok(RunOutcome {
            state: RunState::Committed,
            window_start,
            window_end,
            changes_applied,
            valuations_inserted,
            last_processed_date: window_end,
            summary,
            alerts,
        })
    }

    /// The last date valuations were appended for. With an empty history the
    /// run bootstraps from the day before the earliest pending change, so
    /// the first window covers the whole holding period.
    fn resolve_last_processed(&self, pending: &[Change], today: NaiveDate) -> Result<NaiveDate> {
        let mut conn = get_connection(&self.pool)?;
        if let Some(date) = self.valuation_repository.last_valuation_date(&mut conn)? {
            return Ok(date);
        }
        match pending.iter().map(|change| change.change_date).min() {
            Some(first_change) => Ok(first_change - Duration::days(1)),
            None => Err(Error::AlreadyCurrent {
                last_processed: today - Duration::days(1),
            }),
        }
    }

    /// Fetches closes for every ticker the run could need: currently active
    /// instruments plus any ticker appearing in the batch. Pulling a few
    /// closes for a ticker that ends the run disabled is harmless; reopening
    /// a feedless window mid-transaction is not an option.
    async fn prefetch_for_candidates(
        &self,
        pending: &[Change],
        last_processed: NaiveDate,
        today: NaiveDate,
    ) -> Result<HashMap<String, Vec<ClosePrice>>> {
        let mut tickers: Vec<String> = {
            let mut conn = get_connection(&self.pool)?;
            self.instrument_repository
                .list_by_status(&mut conn, InstrumentStatus::Active)?
                .into_iter()
                .map(|instrument| instrument.ticker)
                .collect()
        };
        for change in pending {
            if !tickers.contains(&change.ticker) {
                tickers.push(change.ticker.clone());
            }
        }

        Ok(self
            .reconciler
            .prefetch_closes(&tickers, last_processed, today)
            .await)
    }

    /// Summary and alert evaluation run after the commit and never fail the
    /// run; a reporting hiccup is logged and swallowed.
    fn post_run_report(&self) -> (Option<PortfolioSummary>, Vec<AlertCondition>) {
        let mut conn = match get_connection(&self.pool) {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Post-run reporting skipped: {}", e);
                return (None, Vec::new());
            }
        };

        let threshold = match self.settings_repository.get_settings(&mut conn) {
            Ok(settings) => settings.profit_alert_threshold,
            Err(e) => {
                warn!("Falling back to default alert threshold: {}", e);
                Settings::default().profit_alert_threshold
            }
        };

        let summary = match self.profit_tracker.summary(&mut conn) {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Portfolio summary unavailable: {}", e);
                None
            }
        };

        let alerts = match self.profit_tracker.alerts(&mut conn, threshold) {
            Ok(alerts) => alerts,
            Err(e) => {
                warn!("Alert evaluation failed: {}", e);
                Vec::new()
            }
        };

        (summary, alerts)
    }
}
