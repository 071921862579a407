use chrono::NaiveDate;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::constants::DECIMAL_PRECISION;

/// One open cost-basis acquisition, consumed oldest-first on sale.
///
/// Quantity only ever shrinks; unit price is never mutated. A lot whose
/// quantity reaches zero is deleted, not retained.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: String,
    pub instrument_id: i32,
    pub acquired_date: NaiveDate,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl Lot {
    pub fn new(
        instrument_id: i32,
        acquired_date: NaiveDate,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            instrument_id,
            acquired_date,
            quantity,
            unit_price,
        }
    }

    /// Capital invested in this lot at acquisition.
    pub fn invested(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

/// Database model for lots
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::lots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LotDB {
    pub id: String,
    pub instrument_id: i32,
    pub acquired_date: NaiveDate,
    pub quantity: String,
    pub unit_price: String,
}

impl From<Lot> for LotDB {
    fn from(domain: Lot) -> Self {
        Self {
            id: domain.id,
            instrument_id: domain.instrument_id,
            acquired_date: domain.acquired_date,
            quantity: domain.quantity.round_dp(DECIMAL_PRECISION).to_string(),
            unit_price: domain.unit_price.round_dp(DECIMAL_PRECISION).to_string(),
        }
    }
}

impl From<LotDB> for Lot {
    fn from(db: LotDB) -> Self {
        Self {
            id: db.id,
            instrument_id: db.instrument_id,
            acquired_date: db.acquired_date,
            quantity: Decimal::from_str(&db.quantity).unwrap_or_default(),
            unit_price: Decimal::from_str(&db.unit_price).unwrap_or_default(),
        }
    }
}
