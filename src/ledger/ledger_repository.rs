use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::collections::HashMap;

use super::ledger_model::{Lot, LotDB};
use crate::errors::Result;
use crate::schema::lots;

/// Repository for open cost-basis lots. The ledger exclusively owns lot rows;
/// consumers read them through the session snapshot.
pub struct LotRepository;

impl LotRepository {
    pub fn new() -> Self {
        Self
    }

    /// Loads every open lot, grouped by instrument, oldest acquisition first.
    /// Ties on the same date keep insertion (rowid) order, which preserves
    /// document order for same-day buys.
    pub fn load_all(&self, conn: &mut SqliteConnection) -> Result<HashMap<i32, Vec<Lot>>> {
        let rows = lots::table
            .order(lots::acquired_date.asc())
            .load::<LotDB>(conn)?;

        let mut by_instrument: HashMap<i32, Vec<Lot>> = HashMap::new();
        for row in rows {
            by_instrument
                .entry(row.instrument_id)
                .or_default()
                .push(row.into());
        }
        Ok(by_instrument)
    }

    pub fn lots_for_instrument(
        &self,
        conn: &mut SqliteConnection,
        id_filter: i32,
    ) -> Result<Vec<Lot>> {
        let rows = lots::table
            .filter(lots::instrument_id.eq(id_filter))
            .order(lots::acquired_date.asc())
            .load::<LotDB>(conn)?;
        Ok(rows.into_iter().map(Lot::from).collect())
    }

    /// Rewrites the full lot set for one instrument: delete then re-insert,
    /// matching the FIFO consumption write-back of the change applier.
    pub fn replace_for_instrument(
        &self,
        conn: &mut SqliteConnection,
        id_filter: i32,
        records: &[Lot],
    ) -> Result<()> {
        diesel::delete(lots::table.filter(lots::instrument_id.eq(id_filter))).execute(conn)?;

        let rows: Vec<LotDB> = records.iter().cloned().map(LotDB::from).collect();
        diesel::insert_into(lots::table)
            .values(&rows)
            .execute(conn)?;

        Ok(())
    }
}

impl Default for LotRepository {
    fn default() -> Self {
        Self::new()
    }
}
