//! Upsell recommendations attached to tier breakdowns.
//!
//! Recommendations are advisory: they price alternative requests but never
//! change the breakdown they are attached to.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::calculators::round_money;
use super::models::ServiceKind;
use super::requests::BookingRequest;
use super::responses::{PriceBreakdown, PricingRecommendation, RecommendationKind};
use super::services::PricingEngine;

/// Bookings this long on the cheapest tier are offered the next tier up
const UPGRADE_MIN_HOURS: Decimal = dec!(6);
/// Shorter bookings are offered an extension to this many hours
const EXTENSION_TARGET_HOURS: Decimal = dec!(4);
const EXTENSION_MIN_RATE_DROP_PERCENT: Decimal = dec!(5);

pub fn recommend(
    engine: &PricingEngine,
    request: &BookingRequest,
    current: &PriceBreakdown,
) -> Vec<PricingRecommendation> {
    if request.service_kind != ServiceKind::Tier || current.requires_quote {
        return Vec::new();
    }

    upgrade(engine, request, current)
        .into_iter()
        .chain(extension(engine, request, current))
        .collect()
}

fn upgrade(
    engine: &PricingEngine,
    request: &BookingRequest,
    current: &PriceBreakdown,
) -> Option<PricingRecommendation> {
    // billed hours, after the current tier's clamp
    let hours = current.total_hours;
    if hours < UPGRADE_MIN_HOURS {
        return None;
    }

    let catalog = engine.catalog();
    let tier = catalog.find_tier(&request.service_id)?;
    if catalog.lowest_tier()?.id != tier.id {
        return None;
    }
    let next = catalog.next_tier_up(tier)?;

    let upgraded = engine
        .price_uncached(&request.with_hours(hours).with_service(&next.id))
        .ok()?;
    let extra_per_hour = round_money((upgraded.final_price - current.final_price) / hours, 2);

    if extra_per_hour >= engine.config().upgrade_hourly_threshold {
        return None;
    }

    Some(PricingRecommendation {
        kind: RecommendationKind::UpgradeTier,
        message: format!(
            "Upgrade to {} for only {} {} more per hour",
            next.name, extra_per_hour, upgraded.currency
        ),
        service_id: next.id.clone(),
        duration_hours: hours,
        estimated_price: upgraded.final_price,
        hourly_delta: extra_per_hour,
    })
}

fn extension(
    engine: &PricingEngine,
    request: &BookingRequest,
    current: &PriceBreakdown,
) -> Option<PricingRecommendation> {
    if current.total_hours >= EXTENSION_TARGET_HOURS {
        return None;
    }

    let current_rate = current.effective_hourly_rate();
    if current_rate.is_zero() {
        return None;
    }

    let extended = engine
        .price_uncached(&request.with_hours(EXTENSION_TARGET_HOURS))
        .ok()?;
    let extended_rate = extended.effective_hourly_rate();
    let drop_percent = (current_rate - extended_rate) / current_rate * Decimal::ONE_HUNDRED;

    if drop_percent < EXTENSION_MIN_RATE_DROP_PERCENT {
        return None;
    }

    let saving_per_hour = round_money(current_rate - extended_rate, 2);
    Some(PricingRecommendation {
        kind: RecommendationKind::ExtendDuration,
        message: format!(
            "Book {} hours and save {} {} per hour",
            EXTENSION_TARGET_HOURS, saving_per_hour, extended.currency
        ),
        service_id: request.service_id.clone(),
        duration_hours: EXTENSION_TARGET_HOURS,
        estimated_price: extended.final_price,
        hourly_delta: saving_per_hour,
    })
}
