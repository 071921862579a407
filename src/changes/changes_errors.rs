use diesel::result::Error as DieselError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Custom error type for change-application failures.
///
/// Any of these aborts the run; the surrounding transaction rolls every
/// ledger mutation back and the pending batch is left for retry.
#[derive(Debug, Error)]
pub enum ChangeError {
    #[error("Instrument not found: no active instrument for ticker '{0}'")]
    InstrumentNotFound(String),

    #[error("Insufficient shares for '{ticker}': requested {requested}, held {held}")]
    InsufficientShares {
        ticker: String,
        requested: Decimal,
        held: Decimal,
    },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<DieselError> for ChangeError {
    fn from(err: DieselError) -> Self {
        ChangeError::DatabaseError(err.to_string())
    }
}

/// Result type for change operations
pub type Result<T> = std::result::Result<T, ChangeError>;
