//! Error handling for the pricing engine and booking form

use rust_decimal::Decimal;

/// Pricing engine errors.
///
/// These signal integration mistakes (a request the UI should never have built)
/// and are kept apart from the user-facing validation errors of the form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("Unknown service tier: {service_id}")]
    UnknownService { service_id: String },

    #[error("Unknown experience package: {package_id}")]
    UnknownPackage { package_id: String },

    #[error("Invalid duration: {hours} hours (must be positive and within pricing range)")]
    InvalidDuration { hours: Decimal },
}

/// Failures of the form auto-persistence adapter
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Invalid engine configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, PricingError>;
