use chrono::NaiveDate;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::DECIMAL_PRECISION;

/// One closing price returned by an external feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClosePrice {
    pub date: NaiveDate,
    pub close: Decimal,
}

/// One staged observation per (instrument, date) across the reconciliation
/// window. The close stays `None` only during reconciliation; after the fill
/// pass no Active instrument carries a null close.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceObservation {
    pub instrument_id: i32,
    pub observation_date: NaiveDate,
    pub close_price: Option<Decimal>,
}

/// Database model for staged price observations
#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::price_observations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PriceObservationDB {
    pub instrument_id: i32,
    pub observation_date: NaiveDate,
    pub close_price: Option<String>,
}

impl From<PriceObservation> for PriceObservationDB {
    fn from(domain: PriceObservation) -> Self {
        Self {
            instrument_id: domain.instrument_id,
            observation_date: domain.observation_date,
            close_price: domain
                .close_price
                .map(|p| p.round_dp(DECIMAL_PRECISION).to_string()),
        }
    }
}

impl From<PriceObservationDB> for PriceObservation {
    fn from(db: PriceObservationDB) -> Self {
        Self {
            instrument_id: db.instrument_id,
            observation_date: db.observation_date,
            close_price: db
                .close_price
                .and_then(|p| Decimal::from_str(&p).ok()),
        }
    }
}
