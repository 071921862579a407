use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::instruments_errors::InstrumentError;
use crate::constants::DECIMAL_PRECISION;

/// Lifecycle state of a tracked instrument.
///
/// A Disabled instrument is never resurrected: reopening the same ticker
/// later creates a fresh instrument with a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstrumentStatus {
    Active,
    Disabled,
}

impl InstrumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentStatus::Active => "Active",
            InstrumentStatus::Disabled => "Disabled",
        }
    }
}

impl FromStr for InstrumentStatus {
    type Err = InstrumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(InstrumentStatus::Active),
            "Disabled" => Ok(InstrumentStatus::Disabled),
            other => Err(InstrumentError::InvalidData(format!(
                "Unknown instrument status '{}'",
                other
            ))),
        }
    }
}

/// Domain model for a tracked instrument.
///
/// `total_shares` on an Active instrument always equals the sum of its open
/// lot quantities; `last_price` is the most recent reconciled close (the
/// transaction price until the first reconciliation runs).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub id: i32,
    pub name: String,
    pub ticker: String,
    pub status: InstrumentStatus,
    pub total_shares: Decimal,
    pub last_price: Decimal,
    pub color_id: i32,
    pub created_at: NaiveDateTime,
}

impl Instrument {
    pub fn is_active(&self) -> bool {
        self.status == InstrumentStatus::Active
    }
}

/// Database model for instruments
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::instruments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstrumentDB {
    pub id: i32,
    pub name: String,
    pub ticker: String,
    pub status: String,
    pub total_shares: String,
    pub last_price: String,
    pub color_id: i32,
    pub created_at: NaiveDateTime,
}

impl From<Instrument> for InstrumentDB {
    fn from(domain: Instrument) -> Self {
        Self {
            id: domain.id,
            name: domain.name,
            ticker: domain.ticker,
            status: domain.status.as_str().to_string(),
            total_shares: domain.total_shares.round_dp(DECIMAL_PRECISION).to_string(),
            last_price: domain.last_price.round_dp(DECIMAL_PRECISION).to_string(),
            color_id: domain.color_id,
            created_at: domain.created_at,
        }
    }
}

impl From<InstrumentDB> for Instrument {
    fn from(db: InstrumentDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            ticker: db.ticker,
            status: InstrumentStatus::from_str(&db.status).unwrap_or(InstrumentStatus::Disabled),
            total_shares: Decimal::from_str(&db.total_shares).unwrap_or_default(),
            last_price: Decimal::from_str(&db.last_price).unwrap_or_default(),
            color_id: db.color_id,
            created_at: db.created_at,
        }
    }
}
