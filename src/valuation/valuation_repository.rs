use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::collections::HashSet;

use super::valuation_model::{ValuationRecord, ValuationRecordDb};
use crate::errors::Result;
use crate::schema::valuation_history;

/// Repository for the append-only valuation history table.
pub struct ValuationRepository;

impl ValuationRepository {
    pub fn new() -> Self {
        Self
    }

    /// Latest date with valuation rows; the pipeline's `last_processed_date`.
    pub fn last_valuation_date(&self, conn: &mut SqliteConnection) -> Result<Option<NaiveDate>> {
        let result: Option<Option<NaiveDate>> = valuation_history::table
            .select(diesel::dsl::max(valuation_history::valuation_date))
            .first::<Option<NaiveDate>>(conn)
            .optional()?;

        Ok(result.flatten())
    }

    /// Inserts only records whose (instrument, date) pair is not already
    /// present. Re-running a window therefore inserts zero rows the second
    /// time; this is the idempotency guarantee of the whole pipeline.
    pub fn insert_missing(
        &self,
        conn: &mut SqliteConnection,
        records: &[ValuationRecord],
    ) -> Result<usize> {
        let existing: HashSet<(i32, NaiveDate)> = valuation_history::table
            .select((
                valuation_history::instrument_id,
                valuation_history::valuation_date,
            ))
            .load::<(i32, NaiveDate)>(conn)?
            .into_iter()
            .collect();

        let fresh: Vec<ValuationRecordDb> = records
            .iter()
            .filter(|r| !existing.contains(&(r.instrument_id, r.valuation_date)))
            .cloned()
            .map(ValuationRecordDb::from)
            .collect();

        let inserted = fresh.len();
        for chunk in fresh.chunks(1000) {
            diesel::insert_into(valuation_history::table)
                .values(chunk)
                .execute(conn)?;
        }

        debug!(
            "Valuation insert: {} new rows, {} already present",
            inserted,
            records.len() - inserted
        );
        Ok(inserted)
    }

    pub fn get_history(
        &self,
        conn: &mut SqliteConnection,
        instrument_filter: Option<i32>,
        start_date_opt: Option<NaiveDate>,
        end_date_opt: Option<NaiveDate>,
    ) -> Result<Vec<ValuationRecord>> {
        let mut query = valuation_history::table
            .order((
                valuation_history::instrument_id.asc(),
                valuation_history::valuation_date.asc(),
            ))
            .into_boxed();

        if let Some(instrument_id_val) = instrument_filter {
            query = query.filter(valuation_history::instrument_id.eq(instrument_id_val));
        }
        if let Some(start_date_val) = start_date_opt {
            query = query.filter(valuation_history::valuation_date.ge(start_date_val));
        }
        if let Some(end_date_val) = end_date_opt {
            query = query.filter(valuation_history::valuation_date.le(end_date_val));
        }

        let rows = query.load::<ValuationRecordDb>(conn)?;
        Ok(rows.into_iter().map(ValuationRecord::from).collect())
    }

    pub fn get_for_date(
        &self,
        conn: &mut SqliteConnection,
        date: NaiveDate,
    ) -> Result<Vec<ValuationRecord>> {
        let rows = valuation_history::table
            .filter(valuation_history::valuation_date.eq(date))
            .order(valuation_history::instrument_id.asc())
            .load::<ValuationRecordDb>(conn)?;
        Ok(rows.into_iter().map(ValuationRecord::from).collect())
    }
}

impl Default for ValuationRepository {
    fn default() -> Self {
        Self::new()
    }
}
