//! Pricing output: breakdowns, line items, recommendations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::models::ServiceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    Bulk,
    Membership,
    MultiDay,
}

/// One discount, computed against the seasonally adjusted subtotal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountApplication {
    pub kind: DiscountKind,
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub percentage: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub applied_to_amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Charge,
    Seasonal,
    Discount,
    MinimumCharge,
    Quote,
}

/// Human-auditable line of a breakdown. Discounts carry negative amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceComponent {
    pub kind: ComponentKind,
    pub label: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
}

impl PriceComponent {
    pub fn new(kind: ComponentKind, label: impl Into<String>, amount: Decimal) -> Self {
        Self {
            kind,
            label: label.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    UpgradeTier,
    ExtendDuration,
}

/// Advisory upsell. Never changes the price it is attached to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRecommendation {
    pub kind: RecommendationKind,
    pub message: String,
    pub service_id: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub duration_hours: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub estimated_price: Decimal,
    /// Extra cost per hour for upgrades, saving per hour for extensions
    #[serde(with = "rust_decimal::serde::str")]
    pub hourly_delta: Decimal,
}

/// Itemized result of a pricing computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub service_id: String,
    pub service_kind: ServiceKind,
    pub currency: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_hours: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub seasonal_multiplier: Decimal,
    /// After the seasonal adjustment, before discounts
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
    pub discounts: Vec<DiscountApplication>,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_discount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub final_price: Decimal,
    pub line_items: Vec<PriceComponent>,
    #[serde(default)]
    pub recommendations: Vec<PricingRecommendation>,
    /// Set for quote-only packages; every monetary field is then zero
    #[serde(default)]
    pub requires_quote: bool,
}

impl PriceBreakdown {
    pub fn discount(&self, kind: DiscountKind) -> Option<&DiscountApplication> {
        self.discounts.iter().find(|d| d.kind == kind)
    }

    /// Final price divided by billed hours
    pub fn effective_hourly_rate(&self) -> Decimal {
        if self.total_hours.is_zero() {
            Decimal::ZERO
        } else {
            self.final_price / self.total_hours
        }
    }
}

/// Outcome of a non-failing request check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}
