use chrono::Utc;
use diesel::sqlite::SqliteConnection;
use log::debug;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

use super::ledger_model::Lot;
use super::ledger_repository::LotRepository;
use crate::constants::FALLBACK_COLOR_ID;
use crate::errors::Result;
use crate::instruments::{Instrument, InstrumentRepository, InstrumentStatus};

/// In-memory snapshot of the registry and the lot ledger for one run.
///
/// Loaded once at the start of the pipeline transaction, mutated locally by
/// the change applier, and written back with `flush` before commit. Reading
/// the registry once avoids read skew between changes in the same batch.
pub struct LedgerSession {
    instruments: Vec<Instrument>,
    lots: HashMap<i32, Vec<Lot>>,
    palette: Vec<i32>,
    dirty_instruments: HashSet<i32>,
    touched_lots: HashSet<i32>,
}

impl LedgerSession {
    pub fn load(conn: &mut SqliteConnection) -> Result<Self> {
        let instrument_repository = InstrumentRepository::new();
        let lot_repository = LotRepository::new();

        let instruments = instrument_repository.list_all(conn)?;
        let lots = lot_repository.load_all(conn)?;
        let palette = instrument_repository.palette(conn)?;

        debug!(
            "Loaded ledger session: {} instruments, {} instruments with open lots",
            instruments.len(),
            lots.len()
        );

        Ok(Self {
            instruments,
            lots,
            palette,
            dirty_instruments: HashSet::new(),
            touched_lots: HashSet::new(),
        })
    }

    /// A session over explicit state, without touching the store.
    #[cfg(test)]
    pub fn from_parts(
        instruments: Vec<Instrument>,
        lots: HashMap<i32, Vec<Lot>>,
        palette: Vec<i32>,
    ) -> Self {
        Self {
            instruments,
            lots,
            palette,
            dirty_instruments: HashSet::new(),
            touched_lots: HashSet::new(),
        }
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn active_instruments(&self) -> Vec<&Instrument> {
        self.instruments.iter().filter(|i| i.is_active()).collect()
    }

    pub fn find_active_by_ticker(&self, ticker: &str) -> Option<&Instrument> {
        self.instruments
            .iter()
            .find(|i| i.is_active() && i.ticker == ticker)
    }

    pub fn lots(&self) -> &HashMap<i32, Vec<Lot>> {
        &self.lots
    }

    pub fn lots_for(&self, instrument_id: i32) -> &[Lot] {
        self.lots
            .get(&instrument_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn shares_held(&self, instrument_id: i32) -> Decimal {
        self.lots_for(instrument_id)
            .iter()
            .map(|lot| lot.quantity)
            .sum()
    }

    /// Mutable access to an instrument's open lots, oldest-first. Marks the
    /// instrument's lot set for write-back.
    pub fn lots_mut(&mut self, instrument_id: i32) -> &mut Vec<Lot> {
        self.touched_lots.insert(instrument_id);
        self.lots.entry(instrument_id).or_default()
    }

    pub fn append_lot(&mut self, lot: Lot) {
        let instrument_id = lot.instrument_id;
        let lots = self.lots_mut(instrument_id);
        lots.push(lot);
        // Same-day buys stay in document order under a stable sort.
        lots.sort_by_key(|l| l.acquired_date);
    }

    pub fn update_instrument(&mut self, instrument: Instrument) {
        self.dirty_instruments.insert(instrument.id);
        match self.instruments.iter_mut().find(|i| i.id == instrument.id) {
            Some(existing) => *existing = instrument,
            None => self.instruments.push(instrument),
        }
    }

    /// Registers a brand-new Active instrument. Disabled ids are never
    /// resurrected; a reopened ticker always gets a fresh id.
    pub fn create_instrument(
        &mut self,
        name: &str,
        ticker: &str,
        last_price: Decimal,
    ) -> Instrument {
        let id = self
            .instruments
            .iter()
            .map(|i| i.id)
            .max()
            .unwrap_or(0)
            + 1;
        let instrument = Instrument {
            id,
            name: name.to_string(),
            ticker: ticker.to_string(),
            status: InstrumentStatus::Active,
            total_shares: Decimal::ZERO,
            last_price,
            color_id: self.allocate_color(),
            created_at: Utc::now().naive_utc(),
        };
        self.update_instrument(instrument.clone());
        instrument
    }

    /// Color allocation: lowest never-used palette color first; once the
    /// palette is exhausted, reuse the color of the Disabled instrument with
    /// the lowest id. Color reuse across Active instruments past that point
    /// is a documented cosmetic limitation.
    fn allocate_color(&self) -> i32 {
        let used: HashSet<i32> = self.instruments.iter().map(|i| i.color_id).collect();

        if let Some(unused) = self.palette.iter().find(|c| !used.contains(c)) {
            return *unused;
        }

        self.instruments
            .iter()
            .filter(|i| i.status == InstrumentStatus::Disabled)
            .min_by_key(|i| i.id)
            .map(|i| i.color_id)
            .unwrap_or(FALLBACK_COLOR_ID)
    }

    /// Writes mutated instruments and touched lot sets back to the store.
    /// Call inside the run transaction, after the change batch is applied.
    pub fn flush(&self, conn: &mut SqliteConnection) -> Result<()> {
        let instrument_repository = InstrumentRepository::new();
        let lot_repository = LotRepository::new();

        let dirty: Vec<Instrument> = self
            .instruments
            .iter()
            .filter(|i| self.dirty_instruments.contains(&i.id))
            .cloned()
            .collect();
        instrument_repository
            .save_all(conn, &dirty)
            .map_err(crate::errors::Error::from)?;

        for instrument_id in &self.touched_lots {
            let records = self.lots_for(*instrument_id);
            lot_repository.replace_for_instrument(conn, *instrument_id, records)?;
        }

        debug!(
            "Flushed ledger session: {} instruments, {} lot sets",
            dirty.len(),
            self.touched_lots.len()
        );
        Ok(())
    }
}
