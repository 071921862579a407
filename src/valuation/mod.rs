pub(crate) mod profit_tracker;
pub(crate) mod valuation_calculator;
pub(crate) mod valuation_model;
pub(crate) mod valuation_repository;

// Re-export the public interface
pub use profit_tracker::{AlertCondition, PortfolioSummary, ProfitGrowth, ProfitTracker};
pub use valuation_calculator::build_valuation_records;
pub use valuation_model::{ValuationRecord, ValuationRecordDb};
pub use valuation_repository::ValuationRepository;
