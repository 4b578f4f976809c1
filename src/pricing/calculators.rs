//! Core pricing calculation functions.
//!
//! Pure functions for pricing math - no catalog lookups, no caching.

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use super::models::{DiscountTier, MembershipDiscount, SeasonalMultiplier};

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// Banker's rounding rounds to the nearest even number when the value is exactly
/// halfway between two possibilities. This reduces cumulative rounding bias.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use chauffeur_booking::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));   // rounds to even
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// `percentage`% of `amount`, rounded to cents.
///
/// The rate is scaled first so that any percentage up to 100 stays within
/// `amount`'s magnitude.
pub fn percent_of(amount: Decimal, percentage: Decimal) -> Decimal {
    round_money(amount * (percentage / Decimal::ONE_HUNDRED), 2)
}

/// First seasonal rule (in declaration order) covering `date`.
///
/// Overlapping ranges do not stack: a New Year's Eve rule declared before a
/// wider Christmas rule wins on Dec 31.
pub fn find_season(seasons: &[SeasonalMultiplier], date: NaiveDate) -> Option<&SeasonalMultiplier> {
    seasons.iter().find(|s| s.contains(date))
}

/// Highest percentage among the tiers unlocked by `hours`.
///
/// List order is irrelevant; only the maximum percentage counts.
pub fn best_duration_discount(tiers: &[DiscountTier], hours: Decimal) -> Option<&DiscountTier> {
    tiers
        .iter()
        .filter(|t| t.min_hours <= hours && t.percentage > Decimal::ZERO)
        .max_by(|a, b| a.percentage.cmp(&b.percentage))
}

/// Membership discount amount against `subtotal`, capped when the discount has
/// an absolute maximum.
pub fn membership_discount_amount(discount: &MembershipDiscount, subtotal: Decimal) -> Decimal {
    let amount = percent_of(subtotal, discount.percentage);
    match discount.max_absolute_discount {
        Some(cap) => amount.min(cap),
        None => amount,
    }
}

/// Fixed package price plus overage beyond the nominal duration.
///
/// Returns `None` when the overage charge does not fit in a `Decimal`.
pub fn package_subtotal(
    base_price: Decimal,
    nominal_hours: Decimal,
    booked_hours: Decimal,
    additional_hour_rate: Option<Decimal>,
) -> Option<Decimal> {
    let overage_hours = booked_hours.checked_sub(nominal_hours)?.max(Decimal::ZERO);
    let rate = additional_hour_rate.unwrap_or(Decimal::ZERO);
    base_price.checked_add(overage_hours.checked_mul(rate)?)
}

/// Subtract discounts, never going below `floor`.
///
/// Returns the final price and the amount added back by the floor.
pub fn apply_floor(subtotal: Decimal, total_discount: Decimal, floor: Decimal) -> (Decimal, Decimal) {
    let discounted = subtotal - total_discount;
    if discounted < floor {
        (floor, floor - discounted)
    } else {
        (discounted, Decimal::ZERO)
    }
}

/// Human-readable percent label ("15%", "12.5%")
pub fn percent_label(percentage: Decimal) -> String {
    format!("{}%", percentage.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::models::{MembershipLevel, MonthDay};
    use rust_decimal_macros::dec;

    // ==================== round_money tests ====================

    #[test]
    fn test_round_money_bankers_rounding_to_even() {
        assert_eq!(round_money(dec!(2.5), 0), dec!(2));
        assert_eq!(round_money(dec!(3.5), 0), dec!(4));
        assert_eq!(round_money(dec!(4.5), 0), dec!(4));
        assert_eq!(round_money(dec!(5.5), 0), dec!(6));
    }

    #[test]
    fn test_round_money_decimal_places() {
        assert_eq!(round_money(dec!(2.25), 1), dec!(2.2));
        assert_eq!(round_money(dec!(2.35), 1), dec!(2.4));
        assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
        assert_eq!(round_money(dec!(1.236), 2), dec!(1.24));
    }

    #[test]
    fn test_round_money_zero_and_negative() {
        assert_eq!(round_money(dec!(0), 2), dec!(0));
        assert_eq!(round_money(dec!(-2.5), 0), dec!(-2));
        assert_eq!(round_money(dec!(-1.234), 2), dec!(-1.23));
    }

    // ==================== percent_of tests ====================

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(dec!(360), dec!(10)), dec!(36));
        assert_eq!(percent_of(dec!(780), dec!(18)), dec!(140.4));
        assert_eq!(percent_of(dec!(780), dec!(0)), dec!(0));
        assert_eq!(percent_of(dec!(10.01), dec!(50)), dec!(5.00)); // 5.005 -> even
        assert_eq!(percent_of(Decimal::MAX, dec!(100)), Decimal::MAX);
    }

    // ==================== find_season tests ====================

    fn seasons() -> Vec<SeasonalMultiplier> {
        vec![
            SeasonalMultiplier {
                name: "New Year's Eve".to_string(),
                start: MonthDay::new(12, 31),
                end: MonthDay::new(1, 1),
                multiplier: dec!(1.5),
            },
            SeasonalMultiplier {
                name: "Christmas".to_string(),
                start: MonthDay::new(12, 20),
                end: MonthDay::new(1, 5),
                multiplier: dec!(1.3),
            },
        ]
    }

    #[test]
    fn test_find_season_first_match_wins() {
        let seasons = seasons();
        let nye = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();
        assert_eq!(find_season(&seasons, nye).unwrap().multiplier, dec!(1.5));

        let boxing_day = NaiveDate::from_ymd_opt(2026, 12, 26).unwrap();
        assert_eq!(find_season(&seasons, boxing_day).unwrap().multiplier, dec!(1.3));
    }

    #[test]
    fn test_find_season_declaration_order_matters() {
        let mut seasons = seasons();
        seasons.reverse();
        let nye = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();
        assert_eq!(find_season(&seasons, nye).unwrap().multiplier, dec!(1.3));
    }

    #[test]
    fn test_find_season_none() {
        let march = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        assert!(find_season(&seasons(), march).is_none());
    }

    // ==================== best_duration_discount tests ====================

    #[test]
    fn test_best_duration_discount_picks_highest_unlocked() {
        // Deliberately unsorted
        let tiers = vec![
            DiscountTier { min_hours: dec!(8), percentage: dec!(10) },
            DiscountTier { min_hours: dec!(4), percentage: dec!(5) },
            DiscountTier { min_hours: dec!(12), percentage: dec!(18) },
        ];
        assert!(best_duration_discount(&tiers, dec!(3)).is_none());
        assert_eq!(best_duration_discount(&tiers, dec!(4)).unwrap().percentage, dec!(5));
        assert_eq!(best_duration_discount(&tiers, dec!(11.5)).unwrap().percentage, dec!(10));
        assert_eq!(best_duration_discount(&tiers, dec!(16)).unwrap().percentage, dec!(18));
    }

    #[test]
    fn test_best_duration_discount_highest_percentage_not_list_order() {
        // A lower threshold with a higher percentage still wins
        let tiers = vec![
            DiscountTier { min_hours: dec!(10), percentage: dec!(8) },
            DiscountTier { min_hours: dec!(6), percentage: dec!(12) },
        ];
        assert_eq!(best_duration_discount(&tiers, dec!(10)).unwrap().percentage, dec!(12));
    }

    #[test]
    fn test_best_duration_discount_ignores_zero_percent() {
        let tiers = vec![DiscountTier { min_hours: dec!(1), percentage: dec!(0) }];
        assert!(best_duration_discount(&tiers, dec!(5)).is_none());
    }

    // ==================== membership_discount_amount tests ====================

    #[test]
    fn test_membership_discount_uncapped() {
        let discount = MembershipDiscount {
            level: MembershipLevel::Ambassador,
            percentage: dec!(20),
            max_absolute_discount: None,
        };
        assert_eq!(membership_discount_amount(&discount, dec!(780)), dec!(156));
    }

    #[test]
    fn test_membership_discount_capped() {
        let discount = MembershipDiscount {
            level: MembershipLevel::Ambassador,
            percentage: dec!(20),
            max_absolute_discount: Some(dec!(100)),
        };
        assert_eq!(membership_discount_amount(&discount, dec!(780)), dec!(100));
        assert_eq!(membership_discount_amount(&discount, dec!(300)), dec!(60));
    }

    // ==================== package_subtotal tests ====================

    #[test]
    fn test_package_subtotal_with_overage() {
        assert_eq!(package_subtotal(dec!(240), dec!(4), dec!(6), Some(dec!(55))), Some(dec!(350)));
    }

    #[test]
    fn test_package_subtotal_under_nominal_charges_base() {
        assert_eq!(package_subtotal(dec!(240), dec!(4), dec!(2), Some(dec!(55))), Some(dec!(240)));
    }

    #[test]
    fn test_package_subtotal_without_overage_rate() {
        assert_eq!(package_subtotal(dec!(180), dec!(3), dec!(5), None), Some(dec!(180)));
    }

    #[test]
    fn test_package_subtotal_overflow_is_none() {
        assert_eq!(package_subtotal(dec!(180), dec!(3), Decimal::MAX, Some(dec!(55))), None);
    }

    // ==================== apply_floor tests ====================

    #[test]
    fn test_apply_floor_not_binding() {
        assert_eq!(apply_floor(dec!(780), dec!(296.4), dec!(130)), (dec!(483.6), dec!(0)));
    }

    #[test]
    fn test_apply_floor_binding() {
        assert_eq!(apply_floor(dec!(200), dec!(150), dec!(90)), (dec!(90), dec!(40)));
        // Discounts larger than the subtotal never go negative
        assert_eq!(apply_floor(dec!(200), dec!(260), dec!(90)), (dec!(90), dec!(150)));
    }

    #[test]
    fn test_percent_label() {
        assert_eq!(percent_label(dec!(15)), "15%");
        assert_eq!(percent_label(dec!(12.50)), "12.5%");
    }
}
