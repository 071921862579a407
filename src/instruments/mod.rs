// Module declarations
pub(crate) mod instruments_errors;
pub(crate) mod instruments_model;
pub(crate) mod instruments_repository;

// Re-export the public interface
pub use instruments_model::{Instrument, InstrumentDB, InstrumentStatus};
pub use instruments_repository::InstrumentRepository;

// Re-export error types for convenience
pub use instruments_errors::InstrumentError;
