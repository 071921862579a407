use async_trait::async_trait;
use std::time::SystemTime;

use crate::market_data::market_data_errors::MarketDataError;
use crate::market_data::market_data_model::ClosePrice;

/// External daily-close feed. An empty result is a valid response for a
/// newly-listed or delisted ticker, not an error.
#[async_trait]
pub trait ClosePriceProvider: Send + Sync {
    async fn fetch_closes(
        &self,
        ticker: &str,
        start: SystemTime,
        end: SystemTime,
    ) -> Result<Vec<ClosePrice>, MarketDataError>;
}
