use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use super::market_data_model::{PriceObservation, PriceObservationDB};
use crate::errors::Result;
use crate::schema::price_observations;

/// Repository for the price-observation staging table.
pub struct PriceObservationRepository;

impl PriceObservationRepository {
    pub fn new() -> Self {
        Self
    }

    /// Stages reconciled observations for the window. Re-running the same
    /// window replaces the previous staging rows instead of duplicating them.
    pub fn replace_window(
        &self,
        conn: &mut SqliteConnection,
        records: &[PriceObservation],
    ) -> Result<()> {
        for chunk in records.chunks(1000) {
            let rows: Vec<PriceObservationDB> =
                chunk.iter().cloned().map(PriceObservationDB::from).collect();
            diesel::replace_into(price_observations::table)
                .values(&rows)
                .execute(conn)?;
        }
        Ok(())
    }

    pub fn list_for_window(
        &self,
        conn: &mut SqliteConnection,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceObservation>> {
        let rows = price_observations::table
            .filter(price_observations::observation_date.ge(start))
            .filter(price_observations::observation_date.le(end))
            .order((
                price_observations::instrument_id.asc(),
                price_observations::observation_date.asc(),
            ))
            .load::<PriceObservationDB>(conn)?;
        Ok(rows.into_iter().map(PriceObservation::from).collect())
    }
}

impl Default for PriceObservationRepository {
    fn default() -> Self {
        Self::new()
    }
}
