//! Catalog models for pricing.
//!
//! Tiers, packages and seasonal rules are immutable once a catalog is built.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which catalog a service id refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    #[default]
    Tier,
    Package,
}

/// Customer loyalty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipLevel {
    Free,
    Family,
    Ambassador,
}

impl MembershipLevel {
    pub fn label(&self) -> &'static str {
        match self {
            MembershipLevel::Free => "Free",
            MembershipLevel::Family => "Family",
            MembershipLevel::Ambassador => "Ambassador",
        }
    }
}

/// Duration discount unlocked at `min_hours`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountTier {
    pub min_hours: Decimal,
    pub percentage: Decimal,
}

/// Membership discount, optionally capped at an absolute amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipDiscount {
    pub level: MembershipLevel,
    pub percentage: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub max_absolute_discount: Option<Decimal>,
}

/// Per-hour service level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceTier {
    pub id: String,
    pub name: String,
    /// Absolute minimum charge for any booking of this tier
    pub base_price: Decimal,
    pub hourly_rate: Decimal,
    pub minimum_hours: Decimal,
    pub maximum_hours: Decimal,
    pub discount_tiers: Vec<DiscountTier>,
    pub membership_discounts: Vec<MembershipDiscount>,
}

impl ServiceTier {
    /// Clamp into the tier's range. An inverted range resolves to the maximum.
    pub fn clamp_hours(&self, hours: Decimal) -> Decimal {
        hours.max(self.minimum_hours).min(self.maximum_hours)
    }

    pub fn membership_discount(&self, level: MembershipLevel) -> Option<&MembershipDiscount> {
        self.membership_discounts.iter().find(|d| d.level == level)
    }
}

/// Package price: a fixed amount, or quote-only
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackagePrice {
    Fixed(Decimal),
    Custom,
}

/// Fixed-duration bundled experience
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperiencePackage {
    pub id: String,
    pub name: String,
    pub base_price: PackagePrice,
    pub duration_hours: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub additional_hour_rate: Option<Decimal>,
    #[serde(default)]
    pub membership_discounts: Vec<MembershipDiscount>,
}

impl ExperiencePackage {
    pub fn is_custom(&self) -> bool {
        matches!(self.base_price, PackagePrice::Custom)
    }

    pub fn membership_discount(&self, level: MembershipLevel) -> Option<&MembershipDiscount> {
        self.membership_discounts.iter().find(|d| d.level == level)
    }
}

/// Month and day of month, ordered calendar-wise within a year
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    pub const fn new(month: u32, day: u32) -> Self {
        Self { month, day }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::new(date.month(), date.day())
    }
}

/// Date-range price adjustment applied before discounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalMultiplier {
    pub name: String,
    pub start: MonthDay,
    pub end: MonthDay,
    pub multiplier: Decimal,
}

impl SeasonalMultiplier {
    /// Inclusive on both ends. A range whose start is after its end wraps the
    /// year boundary (e.g. Dec 20 -> Jan 5).
    pub fn contains(&self, date: NaiveDate) -> bool {
        let day = MonthDay::of(date);
        if self.start <= self.end {
            self.start <= day && day <= self.end
        } else {
            day >= self.start || day <= self.end
        }
    }
}
