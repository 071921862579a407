pub(crate) mod pipeline_model;
pub(crate) mod pipeline_service;

pub use pipeline_model::{RunOutcome, RunState};
pub use pipeline_service::PipelineService;
