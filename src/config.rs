//! Engine configuration, loaded from the environment or built from defaults.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long a computed breakdown stays cached
    pub cache_ttl: Duration,
    pub cache_max_capacity: u64,
    pub currency: String,
    pub multi_day_discount_percent: Decimal,
    /// Minimum number of days before the multi-day discount applies
    pub multi_day_min_days: u32,
    /// Upgrades are recommended when the extra cost per hour stays below this
    pub upgrade_hourly_threshold: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(5 * 60),
            cache_max_capacity: 1_000,
            currency: "GBP".to_string(),
            multi_day_discount_percent: dec!(15),
            multi_day_min_days: 3,
            upgrade_hourly_threshold: dec!(20),
        }
    }
}

impl EngineConfig {
    /// Load configuration from the environment (and `.env` if present).
    ///
    /// Unset variables fall back to [`EngineConfig::default`].
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            cache_ttl: parse_var::<u64>("PRICING_CACHE_TTL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            cache_max_capacity: parse_var("PRICING_CACHE_MAX_CAPACITY")?
                .unwrap_or(defaults.cache_max_capacity),
            currency: env::var("PRICING_CURRENCY").unwrap_or(defaults.currency),
            multi_day_discount_percent: parse_var("PRICING_MULTI_DAY_DISCOUNT_PERCENT")?
                .unwrap_or(defaults.multi_day_discount_percent),
            multi_day_min_days: parse_var("PRICING_MULTI_DAY_MIN_DAYS")?
                .unwrap_or(defaults.multi_day_min_days),
            upgrade_hourly_threshold: parse_var("PRICING_UPGRADE_HOURLY_THRESHOLD")?
                .unwrap_or(defaults.upgrade_hourly_threshold),
        })
    }
}

fn parse_var<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(None),
    }
}
