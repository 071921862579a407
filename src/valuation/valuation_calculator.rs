use rust_decimal::Decimal;
use std::collections::HashMap;

use super::valuation_model::ValuationRecord;
use crate::ledger::Lot;
use crate::market_data::PriceObservation;

/// Derives valuation records from the reconciled price grid and the open
/// lots at run time.
///
/// Shares and invested capital for a date sum every lot acquired on or
/// before that date. This is a point-in-time reconstruction from live ledger
/// state, not an event-sourced replay: lots already consumed by a later sell
/// are not counted, which bounds the system to one valuation run per day.
/// Committed history rows are never revised afterwards.
pub fn build_valuation_records(
    lots_by_instrument: &HashMap<i32, Vec<Lot>>,
    observations: &[PriceObservation],
) -> Vec<ValuationRecord> {
    let mut records = Vec::with_capacity(observations.len());

    for obs in observations {
        let Some(close_price) = obs.close_price else {
            continue;
        };

        let mut shares_owned = Decimal::ZERO;
        let mut invested = Decimal::ZERO;
        if let Some(lots) = lots_by_instrument.get(&obs.instrument_id) {
            for lot in lots {
                if lot.acquired_date <= obs.observation_date {
                    shares_owned += lot.quantity;
                    invested += lot.invested();
                }
            }
        }

        records.push(ValuationRecord::new(
            obs.instrument_id,
            obs.observation_date,
            close_price,
            shares_owned,
            invested,
        ));
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn lot(instrument_id: i32, d: u32, qty: Decimal, price: Decimal) -> Lot {
        Lot::new(instrument_id, day(d), qty, price)
    }

    fn obs(instrument_id: i32, d: u32, close: Decimal) -> PriceObservation {
        PriceObservation {
            instrument_id,
            observation_date: day(d),
            close_price: Some(close),
        }
    }

    #[test]
    fn sums_only_lots_acquired_on_or_before_the_observation_date() {
        let mut lots = HashMap::new();
        lots.insert(
            1,
            vec![
                lot(1, 10, dec!(10), dec!(100)),
                lot(1, 12, dec!(5), dec!(120)),
            ],
        );

        let records = build_valuation_records(&lots, &[obs(1, 11, dec!(105))]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].shares_owned, dec!(10));
        assert_eq!(records[0].invested, dec!(1000));
        assert_eq!(records[0].market_value, dec!(1050));
        assert_eq!(records[0].profit, dec!(50));
    }

    #[test]
    fn dates_before_first_acquisition_value_to_zero() {
        let mut lots = HashMap::new();
        lots.insert(1, vec![lot(1, 12, dec!(5), dec!(120))]);

        let records = build_valuation_records(&lots, &[obs(1, 11, dec!(105))]);

        assert_eq!(records[0].shares_owned, Decimal::ZERO);
        assert_eq!(records[0].invested, Decimal::ZERO);
        assert_eq!(records[0].market_value, Decimal::ZERO);
        assert_eq!(records[0].profit, Decimal::ZERO);
    }

    #[test]
    fn profit_reflects_price_against_blended_cost() {
        let mut lots = HashMap::new();
        lots.insert(
            1,
            vec![
                lot(1, 10, dec!(10), dec!(100)),
                lot(1, 11, dec!(5), dec!(120)),
            ],
        );

        let records = build_valuation_records(&lots, &[obs(1, 12, dec!(110))]);

        // value 15 * 110 = 1650; invested 1000 + 600 = 1600
        assert_eq!(records[0].market_value, dec!(1650));
        assert_eq!(records[0].profit, dec!(50));
    }

    #[test]
    fn unfilled_observations_are_skipped() {
        let lots = HashMap::new();
        let blank = PriceObservation {
            instrument_id: 1,
            observation_date: day(11),
            close_price: None,
        };

        assert!(build_valuation_records(&lots, &[blank]).is_empty());
    }
}
