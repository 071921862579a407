use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::constants::DECIMAL_PRECISION;
use crate::errors::{Error, Result, ValidationError};

/// One validated ownership change from the pending batch.
///
/// `quantity > 0` is a buy, `< 0` a sell of that magnitude, exactly `0` a
/// directive to liquidate the position entirely and disable the instrument.
/// The sentinel-to-zero normalization is the change source's concern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    pub change_date: NaiveDate,
    pub name: String,
    pub ticker: String,
    pub unit_price: Decimal,
    pub quantity: Decimal,
}

impl Change {
    /// Validates one change record. A batch with any invalid record is
    /// rejected before a single mutation happens.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "name".to_string(),
            )));
        }
        if self.ticker.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "ticker".to_string(),
            )));
        }
        if self.unit_price <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unit price for '{}' must be positive, got {}",
                self.ticker, self.unit_price
            ))));
        }
        Ok(())
    }

    pub fn is_buy(&self) -> bool {
        self.quantity > Decimal::ZERO
    }

    pub fn is_liquidation(&self) -> bool {
        self.quantity.is_zero()
    }
}

/// Audit row recorded for every applied change, keyed to the instrument id
/// the change resolved to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeAudit {
    pub id: String,
    pub instrument_id: i32,
    pub change_date: NaiveDate,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub created_at: NaiveDateTime,
}

impl ChangeAudit {
    pub fn new(
        instrument_id: i32,
        change_date: NaiveDate,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            instrument_id,
            change_date,
            quantity,
            unit_price,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Database model for change audit rows
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::changes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ChangeAuditDB {
    pub id: String,
    pub instrument_id: i32,
    pub change_date: NaiveDate,
    pub quantity: String,
    pub unit_price: String,
    pub created_at: NaiveDateTime,
}

impl From<ChangeAudit> for ChangeAuditDB {
    fn from(domain: ChangeAudit) -> Self {
        Self {
            id: domain.id,
            instrument_id: domain.instrument_id,
            change_date: domain.change_date,
            quantity: domain.quantity.round_dp(DECIMAL_PRECISION).to_string(),
            unit_price: domain.unit_price.round_dp(DECIMAL_PRECISION).to_string(),
            created_at: domain.created_at,
        }
    }
}

impl From<ChangeAuditDB> for ChangeAudit {
    fn from(db: ChangeAuditDB) -> Self {
        Self {
            id: db.id,
            instrument_id: db.instrument_id,
            change_date: db.change_date,
            quantity: Decimal::from_str(&db.quantity).unwrap_or_default(),
            unit_price: Decimal::from_str(&db.unit_price).unwrap_or_default(),
            created_at: db.created_at,
        }
    }
}
