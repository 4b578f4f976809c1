//! Chauffeur booking pricing and form validation.
//!
//! [`PricingEngine`] prices requests against an injected [`PricingCatalog`]
//! and memoizes the results; [`BookingFormCoordinator`] drives one customer's
//! booking form on top of it.

pub mod booking;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod pricing;

pub use booking::{BookingFormCoordinator, BookingFormState, FieldUpdate, FormField, UpdateOptions};
pub use config::EngineConfig;
pub use error::{PersistenceError, PricingError};
pub use pricing::{BookingRequest, PriceBreakdown, PricingCatalog, PricingEngine};
