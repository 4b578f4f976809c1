//! Pricing engine module.
//!
//! Prices chauffeur bookings against an injected catalog of hourly service
//! tiers and fixed-price experience packages.

pub mod calculators;
pub mod catalog;
pub mod models;
pub mod recommendations;
pub mod requests;
pub mod responses;
pub mod services;

// Re-export commonly used items
pub use calculators::round_money;
pub use catalog::PricingCatalog;
pub use models::{ExperiencePackage, MembershipLevel, PackagePrice, ServiceKind, ServiceTier};
pub use requests::BookingRequest;
pub use responses::{PriceBreakdown, RequestValidation};
pub use services::PricingEngine;
pub use crate::error::PricingError;
