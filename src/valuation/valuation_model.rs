use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::constants::DECIMAL_PRECISION;

/// One persisted snapshot of an instrument's owned quantity, value, and
/// profit on a given date. Append-only: a (instrument, date) pair is inserted
/// at most once, ever, and never revised by later ledger mutations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValuationRecord {
    pub id: String,
    pub instrument_id: i32,
    pub valuation_date: NaiveDate,
    pub close_price: Decimal,
    pub shares_owned: Decimal,
    pub invested: Decimal,
    pub market_value: Decimal,
    pub profit: Decimal,
    pub calculated_at: DateTime<Utc>,
}

impl ValuationRecord {
    pub fn new(
        instrument_id: i32,
        valuation_date: NaiveDate,
        close_price: Decimal,
        shares_owned: Decimal,
        invested: Decimal,
    ) -> Self {
        let market_value = close_price * shares_owned;
        Self {
            id: Uuid::new_v4().to_string(),
            instrument_id,
            valuation_date,
            close_price,
            shares_owned,
            invested,
            market_value,
            profit: market_value - invested,
            calculated_at: Utc::now(),
        }
    }
}

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Queryable, QueryableByName, Insertable,
)]
#[serde(rename_all = "camelCase")]
#[diesel(table_name = crate::schema::valuation_history)]
pub struct ValuationRecordDb {
    pub id: String,
    pub instrument_id: i32,
    pub valuation_date: NaiveDate,
    pub close_price: String,
    pub shares_owned: String,
    pub invested: String,
    pub market_value: String,
    pub profit: String,
    pub calculated_at: String,
}

impl From<ValuationRecord> for ValuationRecordDb {
    fn from(value: ValuationRecord) -> Self {
        ValuationRecordDb {
            id: value.id,
            instrument_id: value.instrument_id,
            valuation_date: value.valuation_date,
            close_price: value.close_price.round_dp(DECIMAL_PRECISION).to_string(),
            shares_owned: value.shares_owned.round_dp(DECIMAL_PRECISION).to_string(),
            invested: value.invested.round_dp(DECIMAL_PRECISION).to_string(),
            market_value: value.market_value.round_dp(DECIMAL_PRECISION).to_string(),
            profit: value.profit.round_dp(DECIMAL_PRECISION).to_string(),
            calculated_at: value.calculated_at.to_rfc3339(),
        }
    }
}

impl From<ValuationRecordDb> for ValuationRecord {
    fn from(value: ValuationRecordDb) -> Self {
        ValuationRecord {
            id: value.id,
            instrument_id: value.instrument_id,
            valuation_date: value.valuation_date,
            close_price: Decimal::from_str(&value.close_price).unwrap_or_default(),
            shares_owned: Decimal::from_str(&value.shares_owned).unwrap_or_default(),
            invested: Decimal::from_str(&value.invested).unwrap_or_default(),
            market_value: Decimal::from_str(&value.market_value).unwrap_or_default(),
            profit: Decimal::from_str(&value.profit).unwrap_or_default(),
            calculated_at: DateTime::parse_from_rfc3339(&value.calculated_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        }
    }
}
