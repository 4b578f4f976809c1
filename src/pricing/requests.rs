//! Pricing request input.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::models::{MembershipLevel, ServiceKind};

/// Request to price one booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub service_id: String,
    #[serde(default)]
    pub service_kind: ServiceKind,
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::str")]
    pub duration_hours: Decimal,
    #[serde(default)]
    pub membership_level: Option<MembershipLevel>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub is_multi_day: bool,
    #[serde(default)]
    pub number_of_days: Option<u32>,
}

impl BookingRequest {
    /// Tier request with no membership and no multi-day flags
    pub fn tier(service_id: impl Into<String>, date: NaiveDate, duration_hours: Decimal) -> Self {
        Self {
            service_id: service_id.into(),
            service_kind: ServiceKind::Tier,
            date,
            duration_hours,
            membership_level: None,
            event_type: None,
            is_multi_day: false,
            number_of_days: None,
        }
    }

    pub fn package(service_id: impl Into<String>, date: NaiveDate, duration_hours: Decimal) -> Self {
        Self {
            service_kind: ServiceKind::Package,
            ..Self::tier(service_id, date, duration_hours)
        }
    }

    pub fn with_membership(mut self, level: MembershipLevel) -> Self {
        self.membership_level = Some(level);
        self
    }

    pub fn with_days(mut self, number_of_days: u32) -> Self {
        self.is_multi_day = true;
        self.number_of_days = Some(number_of_days);
        self
    }

    pub fn with_hours(&self, duration_hours: Decimal) -> Self {
        Self {
            duration_hours,
            ..self.clone()
        }
    }

    pub fn with_service(&self, service_id: &str) -> Self {
        Self {
            service_id: service_id.to_string(),
            ..self.clone()
        }
    }
}
