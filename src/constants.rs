/// Decimal precision for persisted valuation figures
pub const DECIMAL_PRECISION: u32 = 6;

/// Settings key for the realized-profit alert threshold
pub const SETTING_PROFIT_ALERT_THRESHOLD: &str = "profit_alert_threshold";

/// Default realized-profit alert threshold (tax-free cash-out limit)
pub const DEFAULT_PROFIT_ALERT_THRESHOLD: &str = "500";

/// Fallback color id once the palette is exhausted and no Disabled
/// instrument's color can be reused
pub const FALLBACK_COLOR_ID: i32 = 0;

/// Price feed retry policy
pub const FEED_MAX_ATTEMPTS: u32 = 3;
pub const FEED_RETRY_BASE_DELAY_MS: u64 = 500;
