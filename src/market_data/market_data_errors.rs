use thiserror::Error;

use crate::errors::DatabaseError;
use yahoo_finance_api::YahooError;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Database error: {0}")]
    DatabaseConnectionError(#[from] DatabaseError),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// No close price at all for an active instrument across the window.
    /// Valuing it anyway would fabricate profit figures, so the run aborts.
    #[error("Price feed gap: no usable close prices for '{0}' across the window")]
    PriceFeedGap(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<YahooError> for MarketDataError {
    fn from(error: YahooError) -> Self {
        match error {
            YahooError::FetchFailed(e) => MarketDataError::ProviderError(e),
            YahooError::NoQuotes => {
                MarketDataError::ProviderError("No quotes found".to_string())
            }
            YahooError::NoResult => MarketDataError::ProviderError("No data found".to_string()),
            _ => MarketDataError::ProviderError(error.to_string()),
        }
    }
}
