pub(crate) mod market_data_errors;
pub(crate) mod market_data_model;
pub(crate) mod market_data_repository;
pub(crate) mod market_data_service;
pub(crate) mod providers;

// Re-export the public interface
pub use market_data_model::{ClosePrice, PriceObservation};
pub use market_data_repository::PriceObservationRepository;
pub use market_data_service::PriceReconciler;

// Re-export provider types
pub use providers::{ClosePriceProvider, YahooProvider};

// Re-export error types for convenience
pub use market_data_errors::MarketDataError;
