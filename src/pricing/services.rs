//! The pricing engine.
//!
//! Looks requests up in the injected catalog, runs the tier or package pricing
//! path and memoizes results in the price cache.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

use crate::cache::{CacheStats, PriceCache, PriceCacheKey};
use crate::config::EngineConfig;
use crate::error::{PricingError, Result};

use super::calculators::{
    apply_floor, best_duration_discount, find_season, membership_discount_amount,
    package_subtotal, percent_label, percent_of, round_money,
};
use super::catalog::PricingCatalog;
use super::models::{
    ExperiencePackage, MembershipDiscount, PackagePrice, ServiceKind, ServiceTier,
};
use super::recommendations;
use super::requests::BookingRequest;
use super::responses::{
    ComponentKind, DiscountApplication, DiscountKind, PriceBreakdown, PriceComponent,
    RequestValidation,
};

/// Computes price breakdowns against one immutable catalog.
///
/// Safe to share between sessions behind an `Arc`; the cache is the only
/// mutable state.
pub struct PricingEngine {
    catalog: Arc<PricingCatalog>,
    config: EngineConfig,
    cache: PriceCache,
}

/// Catalog entry a request resolved to
enum Service<'a> {
    Tier(&'a ServiceTier),
    Package(&'a ExperiencePackage),
}

impl PricingEngine {
    pub fn new(catalog: PricingCatalog, config: EngineConfig) -> Self {
        let cache = PriceCache::new(config.cache_ttl, config.cache_max_capacity);
        Self {
            catalog: Arc::new(catalog),
            config,
            cache,
        }
    }

    pub fn catalog(&self) -> &PricingCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Price a booking request.
    ///
    /// Identical requests inside the cache TTL return the same `Arc` without
    /// recomputation.
    ///
    /// # Errors
    /// * `UnknownService` / `UnknownPackage` - id not in the catalog for the requested kind
    /// * `InvalidDuration` - duration is zero or negative, or too large to price
    pub fn compute_price(&self, request: &BookingRequest) -> Result<Arc<PriceBreakdown>> {
        self.resolve(request)?;

        let key = PriceCacheKey::for_request(request);
        if let Some(cached) = self.cache.get(&key) {
            debug!("Cache HIT for price: {:?}", key);
            return Ok(cached);
        }
        debug!("Cache MISS for price: {:?}", key);

        self.cache
            .get_or_try_insert(key, || {
                let mut breakdown = self.price_uncached(request)?;
                breakdown.recommendations = recommendations::recommend(self, request, &breakdown);
                Ok::<_, PricingError>(Arc::new(breakdown))
            })
            .map_err(|e| (*e).clone())
    }

    /// Price a request without touching the cache or computing recommendations
    pub(crate) fn price_uncached(&self, request: &BookingRequest) -> Result<PriceBreakdown> {
        match self.resolve(request)? {
            Service::Tier(tier) => self.price_tier(tier, request),
            Service::Package(package) => self.price_package(package, request),
        }
    }

    pub fn clear_cache(&self) {
        self.cache.invalidate_all();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn list_service_tiers(&self) -> &[ServiceTier] {
        self.catalog.tiers()
    }

    pub fn list_experience_packages(&self) -> &[ExperiencePackage] {
        self.catalog.packages()
    }

    /// Report every problem with a request without failing.
    ///
    /// Durations outside a tier's range are reported here even though
    /// `compute_price` clamps them.
    pub fn validate_request(&self, request: &BookingRequest) -> RequestValidation {
        let mut errors = Vec::new();

        if request.duration_hours <= Decimal::ZERO {
            errors.push(format!(
                "Duration must be positive, got {} hours",
                request.duration_hours
            ));
        }

        match request.service_kind {
            ServiceKind::Tier => match self.catalog.find_tier(&request.service_id) {
                Some(tier) => {
                    let hours = request.duration_hours;
                    if hours > Decimal::ZERO
                        && (hours < tier.minimum_hours || hours > tier.maximum_hours)
                    {
                        errors.push(format!(
                            "{} bookings must be between {} and {} hours, got {}",
                            tier.name, tier.minimum_hours, tier.maximum_hours, hours
                        ));
                    }
                }
                None => errors.push(format!("Unknown service tier: {}", request.service_id)),
            },
            ServiceKind::Package => {
                if self.catalog.find_package(&request.service_id).is_none() {
                    errors.push(format!("Unknown experience package: {}", request.service_id));
                }
            }
        }

        if request.is_multi_day {
            match request.number_of_days {
                None => errors.push("Multi-day bookings need a number of days".to_string()),
                Some(days) if days < 2 => errors.push(format!(
                    "Multi-day bookings need at least 2 days, got {}",
                    days
                )),
                Some(_) => {}
            }
        }

        RequestValidation {
            valid: errors.is_empty(),
            errors,
        }
    }

    fn resolve(&self, request: &BookingRequest) -> Result<Service<'_>> {
        let service = match request.service_kind {
            ServiceKind::Tier => self
                .catalog
                .find_tier(&request.service_id)
                .map(Service::Tier)
                .ok_or_else(|| PricingError::UnknownService {
                    service_id: request.service_id.clone(),
                })?,
            ServiceKind::Package => self
                .catalog
                .find_package(&request.service_id)
                .map(Service::Package)
                .ok_or_else(|| PricingError::UnknownPackage {
                    package_id: request.service_id.clone(),
                })?,
        };

        if request.duration_hours <= Decimal::ZERO {
            return Err(PricingError::InvalidDuration {
                hours: request.duration_hours,
            });
        }

        Ok(service)
    }

    fn price_tier(&self, tier: &ServiceTier, request: &BookingRequest) -> Result<PriceBreakdown> {
        let hours = tier.clamp_hours(request.duration_hours);
        let raw = round_money(
            tier.hourly_rate
                .checked_mul(hours)
                .ok_or_else(|| out_of_range(request))?,
            2,
        );

        let mut line_items = vec![PriceComponent::new(
            ComponentKind::Charge,
            format!("{} ({} hours at {}/hour)", tier.name, hours.normalize(), tier.hourly_rate),
            raw,
        )];
        let (subtotal, multiplier) = self
            .apply_season(raw, request.date, &mut line_items)
            .ok_or_else(|| out_of_range(request))?;

        let mut discounts = Vec::new();
        if let Some(bulk) = best_duration_discount(&tier.discount_tiers, hours) {
            discounts.push(DiscountApplication {
                kind: DiscountKind::Bulk,
                name: format!("{}+ hour booking", bulk.min_hours.normalize()),
                amount: percent_of(subtotal, bulk.percentage),
                percentage: bulk.percentage,
                applied_to_amount: subtotal,
            });
        }
        let membership = request
            .membership_level
            .and_then(|level| tier.membership_discount(level));
        discounts.extend(membership_application(membership, subtotal));
        discounts.extend(self.multi_day_application(request, subtotal));

        finish(
            Breakdown {
                service_id: &tier.id,
                service_kind: ServiceKind::Tier,
                currency: &self.config.currency,
                base_price: tier.base_price,
                total_hours: hours,
                seasonal_multiplier: multiplier,
                subtotal,
                floor: tier.base_price,
            },
            discounts,
            line_items,
        )
        .ok_or_else(|| out_of_range(request))
    }

    fn price_package(&self, package: &ExperiencePackage, request: &BookingRequest) -> Result<PriceBreakdown> {
        let base_price = match package.base_price {
            PackagePrice::Fixed(price) => price,
            PackagePrice::Custom => return Ok(quote_only(package, request, &self.config.currency)),
        };

        let hours = request.duration_hours;
        let raw = round_money(
            package_subtotal(base_price, package.duration_hours, hours, package.additional_hour_rate)
                .ok_or_else(|| out_of_range(request))?,
            2,
        );

        let mut line_items = vec![PriceComponent::new(
            ComponentKind::Charge,
            format!("{} ({} hours)", package.name, package.duration_hours.normalize()),
            base_price,
        )];
        if raw > base_price {
            line_items.push(PriceComponent::new(
                ComponentKind::Charge,
                format!(
                    "Additional {} hours",
                    (hours - package.duration_hours).normalize()
                ),
                raw - base_price,
            ));
        }
        let (subtotal, multiplier) = self
            .apply_season(raw, request.date, &mut line_items)
            .ok_or_else(|| out_of_range(request))?;

        // Bulk and multi-day discounts do not apply to fixed packages
        let membership = request
            .membership_level
            .and_then(|level| package.membership_discount(level));
        let discounts = membership_application(membership, subtotal).into_iter().collect();

        finish(
            Breakdown {
                service_id: &package.id,
                service_kind: ServiceKind::Package,
                currency: &self.config.currency,
                base_price,
                total_hours: hours.max(package.duration_hours),
                seasonal_multiplier: multiplier,
                subtotal,
                floor: Decimal::ZERO,
            },
            discounts,
            line_items,
        )
        .ok_or_else(|| out_of_range(request))
    }

    /// Returns the adjusted amount and the multiplier used (1 when no rule
    /// matches), or `None` if the adjusted amount overflows
    fn apply_season(
        &self,
        amount: Decimal,
        date: NaiveDate,
        line_items: &mut Vec<PriceComponent>,
    ) -> Option<(Decimal, Decimal)> {
        match find_season(self.catalog.seasons(), date) {
            Some(season) if season.multiplier != Decimal::ONE => {
                let adjusted = round_money(amount.checked_mul(season.multiplier)?, 2);
                line_items.push(PriceComponent::new(
                    ComponentKind::Seasonal,
                    format!("{} (x{})", season.name, season.multiplier.normalize()),
                    adjusted - amount,
                ));
                Some((adjusted, season.multiplier))
            }
            _ => Some((amount, Decimal::ONE)),
        }
    }

    fn multi_day_application(
        &self,
        request: &BookingRequest,
        subtotal: Decimal,
    ) -> Option<DiscountApplication> {
        let days = request.number_of_days.unwrap_or(0);
        let percentage = self.config.multi_day_discount_percent;
        if !request.is_multi_day || days < self.config.multi_day_min_days || percentage.is_zero() {
            return None;
        }

        Some(DiscountApplication {
            kind: DiscountKind::MultiDay,
            name: format!("Multi-day booking ({} days)", days),
            amount: percent_of(subtotal, percentage),
            percentage,
            applied_to_amount: subtotal,
        })
    }
}

fn membership_application(
    discount: Option<&MembershipDiscount>,
    subtotal: Decimal,
) -> Option<DiscountApplication> {
    let discount = discount.filter(|d| d.percentage > Decimal::ZERO)?;
    Some(DiscountApplication {
        kind: DiscountKind::Membership,
        name: format!("{} membership", discount.level.label()),
        amount: membership_discount_amount(discount, subtotal),
        percentage: discount.percentage,
        applied_to_amount: subtotal,
    })
}

/// Pricing facts shared by both paths, before discounts are totalled
struct Breakdown<'a> {
    service_id: &'a str,
    service_kind: ServiceKind,
    currency: &'a str,
    base_price: Decimal,
    total_hours: Decimal,
    seasonal_multiplier: Decimal,
    subtotal: Decimal,
    floor: Decimal,
}

/// A duration whose price cannot be represented
fn out_of_range(request: &BookingRequest) -> PricingError {
    PricingError::InvalidDuration {
        hours: request.duration_hours,
    }
}

/// Total the discounts and apply the floor. `None` if the total overflows.
fn finish(
    facts: Breakdown<'_>,
    discounts: Vec<DiscountApplication>,
    mut line_items: Vec<PriceComponent>,
) -> Option<PriceBreakdown> {
    let total_discount = discounts
        .iter()
        .try_fold(Decimal::ZERO, |total, d| total.checked_add(d.amount))?;

    for discount in &discounts {
        line_items.push(PriceComponent::new(
            ComponentKind::Discount,
            format!("{} (-{})", discount.name, percent_label(discount.percentage)),
            -discount.amount,
        ));
    }

    let (final_price, floor_adjustment) = apply_floor(facts.subtotal, total_discount, facts.floor);
    if floor_adjustment > Decimal::ZERO {
        line_items.push(PriceComponent::new(
            ComponentKind::MinimumCharge,
            "Minimum charge adjustment",
            floor_adjustment,
        ));
    }

    Some(PriceBreakdown {
        service_id: facts.service_id.to_string(),
        service_kind: facts.service_kind,
        currency: facts.currency.to_string(),
        base_price: facts.base_price,
        total_hours: facts.total_hours,
        seasonal_multiplier: facts.seasonal_multiplier,
        subtotal: facts.subtotal,
        discounts,
        total_discount,
        final_price: round_money(final_price, 2),
        line_items,
        recommendations: Vec::new(),
        requires_quote: false,
    })
}

fn quote_only(package: &ExperiencePackage, request: &BookingRequest, currency: &str) -> PriceBreakdown {
    PriceBreakdown {
        service_id: package.id.clone(),
        service_kind: ServiceKind::Package,
        currency: currency.to_string(),
        base_price: Decimal::ZERO,
        total_hours: request.duration_hours,
        seasonal_multiplier: Decimal::ONE,
        subtotal: Decimal::ZERO,
        discounts: Vec::new(),
        total_discount: Decimal::ZERO,
        final_price: Decimal::ZERO,
        line_items: vec![PriceComponent::new(
            ComponentKind::Quote,
            format!("{} requires a manual quote", package.name),
            Decimal::ZERO,
        )],
        recommendations: Vec::new(),
        requires_quote: true,
    }
}
