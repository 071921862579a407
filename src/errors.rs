use chrono::NaiveDate;
use diesel::result::Error as DieselError;
use thiserror::Error;

use crate::changes::ChangeError;
use crate::instruments::InstrumentError;
use crate::market_data::MarketDataError;

// Create a type alias for Result using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the ledger engine
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Instrument error: {0}")]
    Instrument(#[from] InstrumentError),

    #[error("Change error: {0}")]
    Change(#[from] ChangeError),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    /// Informational early-exit: every fully-elapsed day up to and including
    /// `last_processed` already has valuation rows. Not a failure.
    #[error("Nothing to process: valuation history is current up to {last_processed}")]
    AlreadyCurrent { last_processed: NaiveDate },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(#[from] diesel::result::ConnectionError),

    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(#[from] r2d2::Error),

    #[error("Database query failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Database migration failed: {0}")]
    MigrationFailed(String),
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

// Implement From for DieselError to Error directly
impl From<DieselError> for Error {
    fn from(err: DieselError) -> Self {
        Error::Database(DatabaseError::QueryFailed(err))
    }
}

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<r2d2::Error> for Error {
    fn from(e: r2d2::Error) -> Self {
        Error::Database(DatabaseError::PoolCreationFailed(e))
    }
}

impl Error {
    /// True for outcomes the scheduler treats as a clean no-op rather than
    /// an operator-facing failure.
    pub fn is_informational(&self) -> bool {
        matches!(self, Error::AlreadyCurrent { .. })
    }
}
