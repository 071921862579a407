use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use super::changes_model::{ChangeAudit, ChangeAuditDB};
use crate::errors::Result;
use crate::schema::changes;

/// Repository for the append-only change audit table.
pub struct ChangeRepository;

impl ChangeRepository {
    pub fn new() -> Self {
        Self
    }

    pub fn insert_audits(
        &self,
        conn: &mut SqliteConnection,
        records: &[ChangeAudit],
    ) -> Result<()> {
        let rows: Vec<ChangeAuditDB> = records.iter().cloned().map(ChangeAuditDB::from).collect();
        diesel::insert_into(changes::table)
            .values(&rows)
            .execute(conn)?;
        Ok(())
    }

    pub fn list_audits(&self, conn: &mut SqliteConnection) -> Result<Vec<ChangeAudit>> {
        let rows = changes::table
            .order((changes::change_date.asc(), changes::created_at.asc()))
            .load::<ChangeAuditDB>(conn)?;
        Ok(rows.into_iter().map(ChangeAudit::from).collect())
    }

    /// Distinct dates on which ownership changed, for downstream reporting.
    pub fn change_dates(&self, conn: &mut SqliteConnection) -> Result<Vec<NaiveDate>> {
        let dates = changes::table
            .select(changes::change_date)
            .distinct()
            .order(changes::change_date.asc())
            .load::<NaiveDate>(conn)?;
        Ok(dates)
    }
}

impl Default for ChangeRepository {
    fn default() -> Self {
        Self::new()
    }
}
