use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use super::instruments_errors::Result;
use super::instruments_model::{Instrument, InstrumentDB, InstrumentStatus};
use crate::schema::{colors, instruments};

/// Repository for the instrument registry. All methods take an explicit
/// connection so callers can run them inside the pipeline transaction.
pub struct InstrumentRepository;

impl InstrumentRepository {
    pub fn new() -> Self {
        Self
    }

    /// Loads every instrument, Active and Disabled, ordered by id.
    pub fn list_all(&self, conn: &mut SqliteConnection) -> Result<Vec<Instrument>> {
        let rows = instruments::table
            .order(instruments::id.asc())
            .load::<InstrumentDB>(conn)?;
        Ok(rows.into_iter().map(Instrument::from).collect())
    }

    pub fn list_by_status(
        &self,
        conn: &mut SqliteConnection,
        status_filter: InstrumentStatus,
    ) -> Result<Vec<Instrument>> {
        let rows = instruments::table
            .filter(instruments::status.eq(status_filter.as_str()))
            .order(instruments::id.asc())
            .load::<InstrumentDB>(conn)?;
        Ok(rows.into_iter().map(Instrument::from).collect())
    }

    pub fn get_by_id(&self, conn: &mut SqliteConnection, instrument_id: i32) -> Result<Instrument> {
        let row = instruments::table
            .find(instrument_id)
            .first::<InstrumentDB>(conn)?;
        Ok(row.into())
    }

    /// Writes an instrument back, inserting or replacing the existing row.
    pub fn save(&self, conn: &mut SqliteConnection, instrument: &Instrument) -> Result<()> {
        let db: InstrumentDB = instrument.clone().into();
        diesel::replace_into(instruments::table)
            .values(&db)
            .execute(conn)?;
        Ok(())
    }

    pub fn save_all(&self, conn: &mut SqliteConnection, records: &[Instrument]) -> Result<()> {
        for instrument in records {
            self.save(conn, instrument)?;
        }
        Ok(())
    }

    /// Loads the display palette, ordered by color id.
    pub fn palette(&self, conn: &mut SqliteConnection) -> Result<Vec<i32>> {
        let ids = colors::table
            .select(colors::color_id)
            .order(colors::color_id.asc())
            .load::<i32>(conn)?;
        Ok(ids)
    }
}

impl Default for InstrumentRepository {
    fn default() -> Self {
        Self::new()
    }
}
