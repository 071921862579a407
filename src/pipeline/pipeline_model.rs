use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::valuation::{AlertCondition, PortfolioSummary};

/// States of one daily run. A run that returns an error has rolled every
/// mutation back (`RolledBack`); `Committed` is only reported after the
/// transaction holding ingestion, reconciliation, and valuation committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Idle,
    Ingesting,
    Reconciling,
    Valuating,
    Committed,
    RolledBack,
}

/// What a completed run produced, for downstream consumers (reporting,
/// archiving the consumed batch, notification).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    pub state: RunState,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub changes_applied: usize,
    pub valuations_inserted: usize,
    pub last_processed_date: NaiveDate,
    pub summary: Option<PortfolioSummary>,
    pub alerts: Vec<AlertCondition>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn outcome_serializes_camel_case_for_downstream_consumers() {
        let outcome = RunOutcome {
            state: RunState::Committed,
            window_start: day(1),
            window_end: day(3),
            changes_applied: 2,
            valuations_inserted: 3,
            last_processed_date: day(3),
            summary: Some(PortfolioSummary {
                as_of: day(3),
                total_value: dec!(1650),
                total_invested: dec!(1000),
                total_profit: dec!(650),
            }),
            alerts: vec![AlertCondition::RealizedProfitThreshold {
                profit: dec!(650),
                threshold: dec!(500),
            }],
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["state"], "Committed");
        assert_eq!(json["windowStart"], "2025-06-01");
        assert_eq!(json["valuationsInserted"], 3);
        assert_eq!(json["summary"]["totalProfit"], 650.0);
        assert_eq!(json["alerts"][0]["kind"], "realizedProfitThreshold");
        assert_eq!(json["alerts"][0]["threshold"], 500.0);
    }
}
