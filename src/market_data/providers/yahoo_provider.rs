use async_trait::async_trait;
use chrono::DateTime;
use log::debug;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use std::time::SystemTime;
use yahoo_finance_api as yahoo;

use super::market_data_provider::ClosePriceProvider;
use crate::market_data::market_data_errors::MarketDataError;
use crate::market_data::market_data_model::ClosePrice;

pub struct YahooProvider {
    provider: yahoo::YahooConnector,
}

impl YahooProvider {
    pub fn new() -> Result<Self, MarketDataError> {
        let provider = yahoo::YahooConnector::new()?;
        Ok(YahooProvider { provider })
    }
}

#[async_trait]
impl ClosePriceProvider for YahooProvider {
    /// Fetch daily closes between start and end ([start; end) at the feed).
    async fn fetch_closes(
        &self,
        ticker: &str,
        start: SystemTime,
        end: SystemTime,
    ) -> Result<Vec<ClosePrice>, MarketDataError> {
        let start_offset = start.into();
        let end_offset = end.into();

        let response = self
            .provider
            .get_quote_history(ticker, start_offset, end_offset)
            .await?;

        let mut closes = Vec::new();
        for quote in response.quotes()? {
            let Some(datetime) = DateTime::from_timestamp(quote.timestamp as i64, 0) else {
                debug!("Skipping quote with invalid timestamp for {}", ticker);
                continue;
            };
            let Some(close) = Decimal::from_f64(quote.close) else {
                debug!("Skipping non-finite close for {}", ticker);
                continue;
            };
            closes.push(ClosePrice {
                date: datetime.date_naive(),
                close,
            });
        }

        Ok(closes)
    }
}
