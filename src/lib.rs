pub mod db;

pub mod changes;
pub mod constants;
pub mod errors;
pub mod instruments;
pub mod ledger;
pub mod market_data;
pub mod pipeline;
pub mod schema;
pub mod settings;
pub mod valuation;

pub use errors::{Error, Result};
pub use pipeline::*;
