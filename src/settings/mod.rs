pub(crate) mod settings_model;
pub(crate) mod settings_repository;

pub use settings_model::{AppSetting, Settings};
pub use settings_repository::SettingsRepository;
