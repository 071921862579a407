use chrono::NaiveDate;
use rust_decimal_macros::dec;

use lotbook_core::instruments::{Instrument, InstrumentRepository, InstrumentStatus};
use lotbook_core::valuation::{ValuationRecord, ValuationRepository};

mod common;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
}

fn record(d: u32) -> ValuationRecord {
    ValuationRecord::new(1, day(d), dec!(100), dec!(10), dec!(1000))
}

#[test]
fn test_rerunning_a_window_inserts_no_additional_rows() {
    let pool = common::get_db_pool("valuation-dedupe");
    let mut conn = pool.get().unwrap();

    let instrument = Instrument {
        id: 1,
        name: "Acme Corp".to_string(),
        ticker: "ACME".to_string(),
        status: InstrumentStatus::Active,
        total_shares: dec!(10),
        last_price: dec!(100),
        color_id: 1,
        created_at: chrono::Utc::now().naive_utc(),
    };
    InstrumentRepository::new()
        .save(&mut conn, &instrument)
        .unwrap();

    let repository = ValuationRepository::new();

    let first = repository
        .insert_missing(&mut conn, &[record(1), record(2)])
        .unwrap();
    assert_eq!(first, 2);

    // The exact same window again: every (instrument, date) pair is already
    // present, so nothing lands.
    let second = repository
        .insert_missing(&mut conn, &[record(1), record(2)])
        .unwrap();
    assert_eq!(second, 0);

    // A wider window overlapping the first: only the new date lands, the
    // committed rows are never revised.
    let third = repository
        .insert_missing(&mut conn, &[record(1), record(2), record(3)])
        .unwrap();
    assert_eq!(third, 1);

    assert_eq!(
        repository.last_valuation_date(&mut conn).unwrap(),
        Some(day(3))
    );
    let history = repository.get_history(&mut conn, Some(1), None, None).unwrap();
    assert_eq!(history.len(), 3);
}
