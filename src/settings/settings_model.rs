use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::constants::DEFAULT_PROFIT_ALERT_THRESHOLD;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub profit_alert_threshold: Decimal,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            profit_alert_threshold: Decimal::from_str(DEFAULT_PROFIT_ALERT_THRESHOLD)
                .unwrap_or_default(),
        }
    }
}

#[derive(Queryable, Insertable, Serialize, Deserialize, Debug)]
#[diesel(table_name = crate::schema::app_settings)]
#[serde(rename_all = "camelCase")]
pub struct AppSetting {
    pub setting_key: String,
    pub setting_value: String,
}
