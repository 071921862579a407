use chrono::{Duration, NaiveDate, TimeZone, Utc};
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use super::market_data_errors::MarketDataError;
use super::market_data_model::{ClosePrice, PriceObservation};
use super::providers::ClosePriceProvider;
use crate::constants::{FEED_MAX_ATTEMPTS, FEED_RETRY_BASE_DELAY_MS};
use crate::instruments::Instrument;

/// Produces exactly one close price per (active instrument, date) pair for
/// every fully-elapsed day since the last completed run.
///
/// Gaps left by the feed are filled by propagating the most recent known
/// prior price forward, then the nearest later price backward; an instrument
/// the feed knows nothing about falls back to its recorded reference price.
pub struct PriceReconciler {
    provider: Arc<dyn ClosePriceProvider>,
}

impl PriceReconciler {
    pub fn new(provider: Arc<dyn ClosePriceProvider>) -> Self {
        Self { provider }
    }

    /// Dates in `(last_processed, today)`, today exclusive: a market session
    /// still in progress has no final close.
    pub fn reconciliation_window(last_processed: NaiveDate, today: NaiveDate) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut date = last_processed + Duration::days(1);
        while date < today {
            dates.push(date);
            date += Duration::days(1);
        }
        dates
    }

    /// Fetches external closes for each ticker over `[last_processed, today)`,
    /// retrying with bounded backoff. A ticker whose feed keeps failing or
    /// returns nothing simply gets no entry; the fill policy takes over.
    /// One bad feed never aborts the whole window.
    pub async fn prefetch_closes(
        &self,
        tickers: &[String],
        last_processed: NaiveDate,
        today: NaiveDate,
    ) -> HashMap<String, Vec<ClosePrice>> {
        let start = date_to_system_time(last_processed);
        let end = date_to_system_time(today);

        let mut closes_by_ticker = HashMap::new();
        for ticker in tickers {
            let mut attempt = 1;
            loop {
                match self.provider.fetch_closes(ticker, start, end).await {
                    Ok(closes) => {
                        debug!("Fetched {} closes for {}", closes.len(), ticker);
                        if !closes.is_empty() {
                            closes_by_ticker.insert(ticker.clone(), closes);
                        }
                        break;
                    }
                    Err(e) if attempt < FEED_MAX_ATTEMPTS => {
                        warn!(
                            "Price feed attempt {}/{} failed for {}: {}",
                            attempt, FEED_MAX_ATTEMPTS, ticker, e
                        );
                        tokio::time::sleep(std::time::Duration::from_millis(
                            FEED_RETRY_BASE_DELAY_MS * attempt as u64,
                        ))
                        .await;
                        attempt += 1;
                    }
                    Err(e) => {
                        warn!(
                            "Price feed gave up on {} after {} attempts: {}",
                            ticker, FEED_MAX_ATTEMPTS, e
                        );
                        break;
                    }
                }
            }
        }
        closes_by_ticker
    }

    /// Builds the filled observation grid for the window. After this pass no
    /// active instrument has a missing close on any window date.
    pub fn reconcile(
        &self,
        actives: &[&Instrument],
        window: &[NaiveDate],
        closes_by_ticker: &HashMap<String, Vec<ClosePrice>>,
    ) -> Result<Vec<PriceObservation>, MarketDataError> {
        let mut observations = Vec::with_capacity(actives.len() * window.len());

        for instrument in actives {
            let feed = closes_by_ticker
                .get(&instrument.ticker)
                .map(Vec::as_slice)
                .unwrap_or_default();

            let mut grid: Vec<Option<Decimal>> = window
                .iter()
                .map(|date| {
                    feed.iter()
                        .find(|close| close.date == *date)
                        .map(|close| close.close)
                })
                .collect();

            if grid.iter().all(Option::is_none) && !grid.is_empty() {
                // Newly listed or delisted: seed the earliest date with the
                // instrument's recorded reference price.
                if instrument.last_price > Decimal::ZERO {
                    grid[0] = Some(instrument.last_price);
                } else {
                    return Err(MarketDataError::PriceFeedGap(instrument.ticker.clone()));
                }
            }

            forward_fill(&mut grid);
            backward_fill(&mut grid);

            for (date, close) in window.iter().zip(grid) {
                let Some(close) = close else {
                    return Err(MarketDataError::PriceFeedGap(instrument.ticker.clone()));
                };
                observations.push(PriceObservation {
                    instrument_id: instrument.id,
                    observation_date: *date,
                    close_price: Some(close),
                });
            }
        }

        Ok(observations)
    }

    /// Newest reconciled close per instrument, used to refresh the registry's
    /// reference prices at the end of a run.
    pub fn latest_closes(observations: &[PriceObservation]) -> HashMap<i32, Decimal> {
        let mut latest: HashMap<i32, (NaiveDate, Decimal)> = HashMap::new();
        for obs in observations {
            let Some(close) = obs.close_price else {
                continue;
            };
            match latest.get(&obs.instrument_id) {
                Some((date, _)) if *date >= obs.observation_date => {}
                _ => {
                    latest.insert(obs.instrument_id, (obs.observation_date, close));
                }
            }
        }
        latest
            .into_iter()
            .map(|(id, (_, close))| (id, close))
            .collect()
    }
}

fn date_to_system_time(date: NaiveDate) -> SystemTime {
    let datetime = Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap());
    datetime.into()
}

fn forward_fill(grid: &mut [Option<Decimal>]) {
    let mut last_known = None;
    for cell in grid.iter_mut() {
        match cell {
            Some(value) => last_known = Some(*value),
            None => *cell = last_known,
        }
    }
}

fn backward_fill(grid: &mut [Option<Decimal>]) {
    let mut next_known = None;
    for cell in grid.iter_mut().rev() {
        match cell {
            Some(value) => next_known = Some(*value),
            None => *cell = next_known,
        }
    }
}
