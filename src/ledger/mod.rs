// Module declarations
pub(crate) mod ledger_model;
pub(crate) mod ledger_repository;
pub(crate) mod ledger_session;

// Re-export the public interface
pub use ledger_model::{Lot, LotDB};
pub use ledger_repository::LotRepository;
pub use ledger_session::LedgerSession;
