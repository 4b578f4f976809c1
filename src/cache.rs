//! In-memory caching using moka
//!
//! Memoizes price breakdowns for a fixed TTL. Catalogs are immutable, so
//! entries only leave through expiry or an explicit clear.

use chrono::NaiveDate;
use moka::sync::Cache;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::pricing::models::{MembershipLevel, ServiceKind};
use crate::pricing::requests::BookingRequest;
use crate::pricing::responses::PriceBreakdown;

/// Everything in a request that can change its price
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PriceCacheKey {
    pub service_id: String,
    pub service_kind: ServiceKind,
    pub duration_hours: Decimal,
    pub date: NaiveDate,
    pub membership_level: Option<MembershipLevel>,
    pub is_multi_day: bool,
    pub number_of_days: Option<u32>,
}

impl PriceCacheKey {
    pub fn for_request(request: &BookingRequest) -> Self {
        Self {
            service_id: request.service_id.clone(),
            service_kind: request.service_kind,
            // 8 and 8.0 must share an entry
            duration_hours: request.duration_hours.normalize(),
            date: request.date,
            membership_level: request.membership_level,
            is_multi_day: request.is_multi_day,
            number_of_days: request.number_of_days,
        }
    }
}

/// Concurrent TTL cache of computed breakdowns
#[derive(Clone)]
pub struct PriceCache {
    breakdowns: Cache<PriceCacheKey, Arc<PriceBreakdown>>,
}

impl PriceCache {
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        Self {
            breakdowns: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub fn get(&self, key: &PriceCacheKey) -> Option<Arc<PriceBreakdown>> {
        self.breakdowns.get(key)
    }

    /// Return the cached breakdown, or run `init` once and cache its result.
    ///
    /// Concurrent callers with the same key wait on a single `init`. Errors are
    /// not cached.
    pub fn get_or_try_insert<E, F>(&self, key: PriceCacheKey, init: F) -> Result<Arc<PriceBreakdown>, Arc<E>>
    where
        E: Send + Sync + 'static,
        F: FnOnce() -> Result<Arc<PriceBreakdown>, E>,
    {
        self.breakdowns.try_get_with(key, init)
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        self.breakdowns.run_pending_tasks();
        CacheStats {
            breakdowns_size: self.breakdowns.entry_count(),
        }
    }

    /// Invalidate all cached breakdowns
    pub fn invalidate_all(&self) {
        self.breakdowns.invalidate_all();
        info!("Price cache invalidated");
    }
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub breakdowns_size: u64,
}
