// Module declarations
pub(crate) mod changes_errors;
pub(crate) mod changes_model;
pub(crate) mod changes_repository;
pub(crate) mod changes_service;
#[cfg(test)]
mod changes_service_tests;

// Re-export the public interface
pub use changes_model::{Change, ChangeAudit, ChangeAuditDB};
pub use changes_repository::ChangeRepository;
pub use changes_service::ChangeApplier;

// Re-export error types for convenience
pub use changes_errors::ChangeError;
