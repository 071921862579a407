use chrono::NaiveDate;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::valuation_repository::ValuationRepository;
use crate::errors::Result;

/// Portfolio totals for the most recent valuated day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub as_of: NaiveDate,
    pub total_value: Decimal,
    pub total_invested: Decimal,
    pub total_profit: Decimal,
}

/// Day-over-day profit delta for one instrument.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfitGrowth {
    pub instrument_id: i32,
    pub date: NaiveDate,
    pub growth: Decimal,
}

/// Conditions an external notifier may want to deliver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AlertCondition {
    /// Realized profit crossed the configured tax-free cash-out threshold.
    RealizedProfitThreshold {
        profit: Decimal,
        threshold: Decimal,
    },
}

/// Read-only projection over the valuation history. Not separately stateful;
/// delivery of anything derived here is an external collaborator's job.
pub struct ProfitTracker {
    valuation_repository: ValuationRepository,
}

impl ProfitTracker {
    pub fn new() -> Self {
        Self {
            valuation_repository: ValuationRepository::new(),
        }
    }

    pub fn summary(&self, conn: &mut SqliteConnection) -> Result<Option<PortfolioSummary>> {
        let Some(as_of) = self.valuation_repository.last_valuation_date(conn)? else {
            return Ok(None);
        };

        let records = self.valuation_repository.get_for_date(conn, as_of)?;
        let mut summary = PortfolioSummary {
            as_of,
            total_value: Decimal::ZERO,
            total_invested: Decimal::ZERO,
            total_profit: Decimal::ZERO,
        };
        for record in records {
            summary.total_value += record.market_value;
            summary.total_invested += record.invested;
            summary.total_profit += record.profit;
        }
        Ok(Some(summary))
    }

    /// Per-instrument profit deltas between consecutive valuated days,
    /// zero-growth days dropped.
    pub fn daily_growth(&self, conn: &mut SqliteConnection) -> Result<Vec<ProfitGrowth>> {
        let records = self
            .valuation_repository
            .get_history(conn, None, None, None)?;

        let mut by_instrument: BTreeMap<i32, Vec<(NaiveDate, Decimal)>> = BTreeMap::new();
        for record in records {
            by_instrument
                .entry(record.instrument_id)
                .or_default()
                .push((record.valuation_date, record.profit));
        }

        let mut growth = Vec::new();
        for (instrument_id, mut series) in by_instrument {
            series.sort_by_key(|(date, _)| *date);
            let mut previous = Decimal::ZERO;
            for (date, profit) in series {
                let delta = profit - previous;
                if !delta.is_zero() {
                    growth.push(ProfitGrowth {
                        instrument_id,
                        date,
                        growth: delta,
                    });
                }
                previous = profit;
            }
        }
        Ok(growth)
    }

    pub fn alerts(
        &self,
        conn: &mut SqliteConnection,
        threshold: Decimal,
    ) -> Result<Vec<AlertCondition>> {
        let mut alerts = Vec::new();
        if let Some(summary) = self.summary(conn)? {
            if summary.total_profit > threshold {
                alerts.push(AlertCondition::RealizedProfitThreshold {
                    profit: summary.total_profit,
                    threshold,
                });
            }
        }
        Ok(alerts)
    }
}

impl Default for ProfitTracker {
    fn default() -> Self {
        Self::new()
    }
}
