use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::constants::SETTING_PROFIT_ALERT_THRESHOLD;
use crate::errors::{Error, Result};
use crate::schema::app_settings::dsl::*;
use crate::settings::settings_model::{AppSetting, Settings};

pub struct SettingsRepository;

impl SettingsRepository {
    pub fn new() -> Self {
        Self
    }

    pub fn get_settings(&self, conn: &mut SqliteConnection) -> Result<Settings> {
        let all_settings: Vec<(String, String)> = app_settings
            .select((setting_key, setting_value))
            .load::<(String, String)>(conn)
            .map_err(Error::from)?;

        let mut settings = Settings::default();
        for (key, value) in all_settings {
            if key == SETTING_PROFIT_ALERT_THRESHOLD {
                if let Ok(threshold) = Decimal::from_str(&value) {
                    settings.profit_alert_threshold = threshold;
                }
            }
            // Unknown settings are ignored
        }

        Ok(settings)
    }

    pub fn get_setting(
        &self,
        conn: &mut SqliteConnection,
        setting_key_param: &str,
    ) -> Result<Option<String>> {
        let result = app_settings
            .filter(setting_key.eq(setting_key_param))
            .select(setting_value)
            .first::<String>(conn)
            .optional()
            .map_err(Error::from)?;
        Ok(result)
    }

    pub fn update_setting(
        &self,
        conn: &mut SqliteConnection,
        setting_key_param: &str,
        setting_value_param: &str,
    ) -> Result<()> {
        diesel::replace_into(app_settings)
            .values(AppSetting {
                setting_key: setting_key_param.to_string(),
                setting_value: setting_value_param.to_string(),
            })
            .execute(conn)
            .map_err(Error::from)?;
        Ok(())
    }
}

impl Default for SettingsRepository {
    fn default() -> Self {
        Self::new()
    }
}
