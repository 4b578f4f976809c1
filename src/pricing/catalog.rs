//! Service catalogs injected into the pricing engine.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::models::{
    DiscountTier, ExperiencePackage, MembershipDiscount, MembershipLevel, MonthDay, PackagePrice,
    SeasonalMultiplier, ServiceKind, ServiceTier,
};

/// Immutable pricing configuration: tiers, packages and seasonal rules.
///
/// Seasonal rules are matched in the order given here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingCatalog {
    tiers: Vec<ServiceTier>,
    packages: Vec<ExperiencePackage>,
    seasons: Vec<SeasonalMultiplier>,
}

impl PricingCatalog {
    pub fn new(
        tiers: Vec<ServiceTier>,
        packages: Vec<ExperiencePackage>,
        seasons: Vec<SeasonalMultiplier>,
    ) -> Self {
        Self {
            tiers,
            packages,
            seasons,
        }
    }

    pub fn tiers(&self) -> &[ServiceTier] {
        &self.tiers
    }

    pub fn packages(&self) -> &[ExperiencePackage] {
        &self.packages
    }

    pub fn seasons(&self) -> &[SeasonalMultiplier] {
        &self.seasons
    }

    pub fn find_tier(&self, id: &str) -> Option<&ServiceTier> {
        self.tiers.iter().find(|t| t.id == id)
    }

    pub fn find_package(&self, id: &str) -> Option<&ExperiencePackage> {
        self.packages.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, kind: ServiceKind, id: &str) -> bool {
        match kind {
            ServiceKind::Tier => self.find_tier(id).is_some(),
            ServiceKind::Package => self.find_package(id).is_some(),
        }
    }

    /// Tier with the lowest hourly rate
    pub fn lowest_tier(&self) -> Option<&ServiceTier> {
        self.tiers.iter().min_by(|a, b| a.hourly_rate.cmp(&b.hourly_rate))
    }

    /// Cheapest tier whose hourly rate is above `tier`'s
    pub fn next_tier_up(&self, tier: &ServiceTier) -> Option<&ServiceTier> {
        self.tiers
            .iter()
            .filter(|t| t.hourly_rate > tier.hourly_rate)
            .min_by(|a, b| a.hourly_rate.cmp(&b.hourly_rate))
    }

    /// The chauffeur catalog offered on the public booking pages
    pub fn standard() -> Self {
        Self::new(standard_tiers(), standard_packages(), standard_seasons())
    }
}

impl Default for PricingCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn tier_discounts(pairs: &[(Decimal, Decimal)]) -> Vec<DiscountTier> {
    pairs
        .iter()
        .map(|&(min_hours, percentage)| DiscountTier {
            min_hours,
            percentage,
        })
        .collect()
}

fn membership(family: Decimal, ambassador: Decimal, cap: Option<Decimal>) -> Vec<MembershipDiscount> {
    vec![
        MembershipDiscount {
            level: MembershipLevel::Family,
            percentage: family,
            max_absolute_discount: cap,
        },
        MembershipDiscount {
            level: MembershipLevel::Ambassador,
            percentage: ambassador,
            max_absolute_discount: cap,
        },
    ]
}

fn standard_tiers() -> Vec<ServiceTier> {
    vec![
        ServiceTier {
            id: "essential".to_string(),
            name: "Essential Private Transport".to_string(),
            base_price: dec!(90),
            hourly_rate: dec!(45),
            minimum_hours: dec!(2),
            maximum_hours: dec!(12),
            discount_tiers: tier_discounts(&[(dec!(4), dec!(5)), (dec!(8), dec!(10))]),
            membership_discounts: membership(dec!(5), dec!(10), None),
        },
        ServiceTier {
            id: "premium".to_string(),
            name: "Premium Security".to_string(),
            base_price: dec!(130),
            hourly_rate: dec!(65),
            minimum_hours: dec!(2),
            maximum_hours: dec!(16),
            discount_tiers: tier_discounts(&[
                (dec!(4), dec!(5)),
                (dec!(8), dec!(12)),
                (dec!(12), dec!(18)),
            ]),
            membership_discounts: membership(dec!(10), dec!(20), Some(dec!(250))),
        },
        ServiceTier {
            id: "vip".to_string(),
            name: "VIP Cultural Experience".to_string(),
            base_price: dec!(255),
            hourly_rate: dec!(85),
            minimum_hours: dec!(3),
            maximum_hours: dec!(20),
            discount_tiers: tier_discounts(&[
                (dec!(6), dec!(8)),
                (dec!(10), dec!(15)),
                (dec!(16), dec!(20)),
            ]),
            membership_discounts: membership(dec!(10), dec!(15), Some(dec!(300))),
        },
        ServiceTier {
            id: "elite".to_string(),
            name: "Elite Protection".to_string(),
            base_price: dec!(480),
            hourly_rate: dec!(120),
            minimum_hours: dec!(4),
            maximum_hours: dec!(24),
            discount_tiers: tier_discounts(&[
                (dec!(8), dec!(10)),
                (dec!(12), dec!(15)),
                (dec!(16), dec!(22)),
            ]),
            membership_discounts: membership(dec!(10), dec!(20), Some(dec!(400))),
        },
    ]
}

fn standard_packages() -> Vec<ExperiencePackage> {
    let package = |id: &str, name: &str, price: Decimal, hours: Decimal, extra: Decimal| {
        ExperiencePackage {
            id: id.to_string(),
            name: name.to_string(),
            base_price: PackagePrice::Fixed(price),
            duration_hours: hours,
            additional_hour_rate: Some(extra),
            membership_discounts: membership(dec!(8), dec!(15), None),
        }
    };

    vec![
        package("tea-ritz", "Tea at The Ritz VIP Ride", dec!(180), dec!(3), dec!(55)),
        package("mayfair-night", "Mayfair by Night", dec!(240), dec!(4), dec!(60)),
        package("london-landmarks", "VIP London Landmarks", dec!(240), dec!(4), dec!(60)),
        package("harry-potter", "Harry Potter Studio Tour", dec!(290), dec!(6), dec!(50)),
        package("james-bond", "James Bond London Drive", dec!(290), dec!(5), dec!(55)),
        package("royal-london", "Royal London Experience", dec!(240), dec!(4), dec!(60)),
        package("airport-vip", "Airport VIP Transfer", dec!(95), dec!(2), dec!(45)),
        package(
            "shopping",
            "Shopping Experience at Harrods & Bond Street",
            dec!(320),
            dec!(6),
            dec!(50),
        ),
        ExperiencePackage {
            id: "bespoke".to_string(),
            name: "Bespoke London Experience".to_string(),
            base_price: PackagePrice::Custom,
            duration_hours: dec!(4),
            additional_hour_rate: None,
            membership_discounts: membership(dec!(10), dec!(20), None),
        },
    ]
}

fn standard_seasons() -> Vec<SeasonalMultiplier> {
    let season = |name: &str, start: MonthDay, end: MonthDay, multiplier: Decimal| {
        SeasonalMultiplier {
            name: name.to_string(),
            start,
            end,
            multiplier,
        }
    };

    // New Year's Eve sits inside the Christmas range, so it must come first.
    vec![
        season("New Year's Eve", MonthDay::new(12, 31), MonthDay::new(1, 1), dec!(1.5)),
        season("Christmas", MonthDay::new(12, 20), MonthDay::new(1, 5), dec!(1.3)),
        season("Summer peak", MonthDay::new(7, 1), MonthDay::new(8, 31), dec!(1.15)),
        season("Quiet season", MonthDay::new(1, 16), MonthDay::new(2, 29), dec!(0.9)),
    ]
}
