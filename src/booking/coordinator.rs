//! Booking form coordinator
//!
//! Owns one customer's form state. Every update runs field validation, reprices
//! when a price-relevant field changed and then notifies listeners with a
//! snapshot.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::observers::{ListenerRegistry, Subscription};
use super::persistence::{self, AutoPersist, KeyValueStore};
use super::state::{BookingFormState, FieldUpdate, FormField};
use super::steps::{FormStep, StepStatus};
use super::validation::{self, ValidationContext, ValidationError};
use crate::clock::{Clock, SystemClock};
use crate::pricing::responses::PriceBreakdown;
use crate::pricing::services::PricingEngine;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    pub skip_validation: bool,
    pub skip_pricing: bool,
}

pub struct BookingFormCoordinator {
    engine: Arc<PricingEngine>,
    clock: Arc<dyn Clock>,
    state: BookingFormState,
    errors: BTreeMap<FormField, ValidationError>,
    listeners: ListenerRegistry,
    pricing_revision: u64,
}

impl BookingFormCoordinator {
    pub fn new(engine: Arc<PricingEngine>) -> Self {
        Self::with_clock(engine, Arc::new(SystemClock))
    }

    pub fn with_clock(engine: Arc<PricingEngine>, clock: Arc<dyn Clock>) -> Self {
        Self {
            engine,
            clock,
            state: BookingFormState::default(),
            errors: BTreeMap::new(),
            listeners: ListenerRegistry::new(),
            pricing_revision: 0,
        }
    }

    pub fn update_field(&mut self, update: FieldUpdate, opts: UpdateOptions) {
        self.update_fields([update], opts);
    }

    /// Apply several updates, then validate, reprice at most once and notify
    pub fn update_fields<I>(&mut self, updates: I, opts: UpdateOptions)
    where
        I: IntoIterator<Item = FieldUpdate>,
    {
        let mut touched = BTreeSet::new();
        for update in updates {
            touched.insert(update.field());
            self.state.apply(update);
        }
        if touched.is_empty() {
            return;
        }

        if !opts.skip_validation {
            for &field in &touched {
                self.revalidate(field);
                for &dependent in field.dependents() {
                    if touched.contains(&dependent) {
                        continue;
                    }
                    // only surface errors the customer has already engaged with
                    if self.state.is_filled(dependent) || self.errors.contains_key(&dependent) {
                        self.revalidate(dependent);
                    }
                }
            }
        }

        if !opts.skip_pricing && touched.iter().any(FormField::is_price_relevant) {
            self.refresh_pricing();
        }

        self.notify();
    }

    /// Validate one field and record the outcome. Returns whether it passed.
    pub fn validate_field(&mut self, field: FormField) -> bool {
        self.revalidate(field)
    }

    /// Validate every field with a rule. Returns whether all passed.
    pub fn validate_all(&mut self) -> bool {
        validation::validated_fields()
            .map(|field| self.revalidate(field))
            .fold(true, |all, ok| all && ok)
    }

    pub fn get_steps(&self) -> Vec<StepStatus> {
        FormStep::ALL
            .iter()
            .map(|&step| {
                let fields = step.fields(&self.state);
                StepStatus {
                    step,
                    is_valid: fields.iter().all(|&f| self.check(f).is_none()),
                    is_complete: fields.iter().all(|&f| self.state.is_filled(f)),
                }
            })
            .collect()
    }

    /// Register a listener, called after every update and reset
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&BookingFormState) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    /// Replace the form with `seed` (or an empty form), clear errors and
    /// reprice
    pub fn reset(&mut self, seed: Option<BookingFormState>) {
        self.state = seed.map(|s| s.without_pricing()).unwrap_or_default();
        self.errors.clear();
        self.refresh_pricing();
        self.notify();
    }

    /// Restore a stored snapshot under `key`, if any, then write a snapshot on
    /// every change
    pub fn enable_auto_persist(&mut self, store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> AutoPersist {
        let key = key.into();

        match persistence::load_snapshot(store.as_ref(), &key) {
            Ok(Some(snapshot)) => {
                debug!(key = %key, "Restoring booking form snapshot");
                self.errors.clear();
                self.update_fields(
                    snapshot.to_updates(),
                    UpdateOptions {
                        skip_validation: true,
                        skip_pricing: false,
                    },
                );
            }
            Ok(None) => {}
            Err(e) => warn!(key = %key, error = %e, "Failed to load booking form snapshot"),
        }

        let subscription = self
            .listeners
            .subscribe(persistence::snapshot_writer(Arc::clone(&store), key.clone()));
        info!(key = %key, "Booking form auto-persist enabled");
        AutoPersist::new(store, key, subscription)
    }

    /// Owned copy of the current state
    pub fn get_data(&self) -> BookingFormState {
        self.state.clone()
    }

    pub fn get_errors(&self) -> &BTreeMap<FormField, ValidationError> {
        &self.errors
    }

    pub fn get_field_error(&self, field: FormField) -> Option<&ValidationError> {
        self.errors.get(&field)
    }

    /// Whether every rule passes against the current state
    pub fn is_valid(&self) -> bool {
        validation::validated_fields().all(|field| self.check(field).is_none())
    }

    pub fn pricing(&self) -> Option<&Arc<PriceBreakdown>> {
        self.state.pricing_breakdown.as_ref()
    }

    /// Bumped every time pricing is recomputed or cleared
    pub fn pricing_revision(&self) -> u64 {
        self.pricing_revision
    }

    pub fn engine(&self) -> &Arc<PricingEngine> {
        &self.engine
    }

    fn check(&self, field: FormField) -> Option<ValidationError> {
        let ctx = ValidationContext {
            catalog: self.engine.catalog(),
            today: self.clock.today(),
        };
        validation::validate_field(field, &self.state, &ctx)
    }

    fn revalidate(&mut self, field: FormField) -> bool {
        match self.check(field) {
            Some(error) => {
                self.errors.insert(field, error);
                false
            }
            None => {
                self.errors.remove(&field);
                true
            }
        }
    }

    fn refresh_pricing(&mut self) {
        self.pricing_revision += 1;
        let Some(request) = self.state.pricing_request() else {
            self.state.pricing_breakdown = None;
            return;
        };

        self.state.pricing_breakdown = match self.engine.compute_price(&request) {
            Ok(breakdown) => Some(breakdown),
            Err(e) => {
                warn!(service_id = %request.service_id, error = %e, "Reactive pricing failed");
                None
            }
        };
    }

    fn notify(&self) {
        self.listeners.notify(&self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::EngineConfig;
    use crate::pricing::catalog::PricingCatalog;
    use crate::pricing::models::{MembershipLevel, ServiceKind};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    fn coordinator() -> BookingFormCoordinator {
        let engine = Arc::new(PricingEngine::new(PricingCatalog::standard(), EngineConfig::default()));
        BookingFormCoordinator::with_clock(engine, Arc::new(FixedClock(today())))
    }

    fn select_essential(form: &mut BookingFormCoordinator, hours: rust_decimal::Decimal) {
        form.update_fields(
            [
                FieldUpdate::ServiceId(Some("essential".to_string())),
                FieldUpdate::Date(NaiveDate::from_ymd_opt(2027, 3, 10)),
                FieldUpdate::Duration(Some(hours)),
            ],
            UpdateOptions::default(),
        );
    }

    // ==================== validation tests ====================

    #[test]
    fn test_update_records_and_clears_error() {
        let mut form = coordinator();
        form.update_field(FieldUpdate::Email("ana".into()), UpdateOptions::default());
        assert_eq!(
            form.get_field_error(FormField::Email).unwrap().message,
            "Invalid email format"
        );

        form.update_field(FieldUpdate::Email("ana@example.com".into()), UpdateOptions::default());
        assert!(form.get_field_error(FormField::Email).is_none());
    }

    #[test]
    fn test_skip_validation_leaves_errors_alone() {
        let mut form = coordinator();
        let opts = UpdateOptions {
            skip_validation: true,
            ..UpdateOptions::default()
        };
        form.update_field(FieldUpdate::Email("ana".into()), opts);
        assert!(form.get_errors().is_empty());
        assert!(!form.validate_field(FormField::Email));
        assert!(form.get_field_error(FormField::Email).is_some());
    }

    #[test]
    fn test_service_change_revalidates_duration() {
        let mut form = coordinator();
        select_essential(&mut form, dec!(2));
        assert!(form.get_field_error(FormField::Duration).is_none());

        // vip needs at least 3 hours
        form.update_field(FieldUpdate::ServiceId(Some("vip".into())), UpdateOptions::default());
        assert!(form.get_field_error(FormField::Duration).is_some());
    }

    #[test]
    fn test_leaving_multi_day_clears_days_error() {
        let mut form = coordinator();
        form.update_field(FieldUpdate::IsMultiDay(true), UpdateOptions::default());
        form.update_field(FieldUpdate::NumberOfDays(Some(1)), UpdateOptions::default());
        assert!(form.get_field_error(FormField::NumberOfDays).is_some());

        form.update_field(FieldUpdate::IsMultiDay(false), UpdateOptions::default());
        assert!(form.get_field_error(FormField::NumberOfDays).is_none());
    }

    #[test]
    fn test_validate_all_and_is_valid() {
        let mut form = coordinator();
        assert!(!form.is_valid());
        assert!(!form.validate_all());
        assert!(form.get_field_error(FormField::AcceptedTerms).is_some());
        assert!(form.get_field_error(FormField::AdditionalNotes).is_none());

        select_essential(&mut form, dec!(4));
        form.update_fields(
            [
                FieldUpdate::FullName("Ana Silva".into()),
                FieldUpdate::Email("ana@example.com".into()),
                FieldUpdate::Phone("+351 912 345 678".into()),
                FieldUpdate::Time(chrono::NaiveTime::from_hms_opt(18, 30, 0)),
                FieldUpdate::PickupLocation("The Savoy".into()),
                FieldUpdate::Destinations("Tower Bridge".into()),
                FieldUpdate::AcceptedTerms(true),
            ],
            UpdateOptions::default(),
        );
        assert!(form.validate_all());
        assert!(form.is_valid());
        assert!(form.get_errors().is_empty());
    }

    // ==================== pricing tests ====================

    #[test]
    fn test_pricing_follows_price_fields() {
        let mut form = coordinator();
        select_essential(&mut form, dec!(8));
        assert_eq!(form.pricing().unwrap().final_price, dec!(324));
        assert_eq!(form.pricing_revision(), 1);

        form.update_field(
            FieldUpdate::MembershipLevel(Some(MembershipLevel::Ambassador)),
            UpdateOptions::default(),
        );
        // 720 - 10% bulk - 10% ambassador
        assert_eq!(form.pricing().unwrap().final_price, dec!(288));
        assert_eq!(form.pricing_revision(), 2);
    }

    #[test]
    fn test_pricing_cleared_until_inputs_present() {
        let mut form = coordinator();
        select_essential(&mut form, dec!(8));
        form.update_field(FieldUpdate::Duration(None), UpdateOptions::default());
        assert!(form.pricing().is_none());
    }

    #[test]
    fn test_engine_error_clears_pricing() {
        let mut form = coordinator();
        select_essential(&mut form, dec!(8));
        form.update_field(FieldUpdate::ServiceId(Some("limo".into())), UpdateOptions::default());
        assert!(form.pricing().is_none());
        assert!(form.get_field_error(FormField::ServiceId).is_some());
    }

    #[test]
    fn test_unpriceable_package_duration_clears_pricing() {
        let mut form = coordinator();
        form.update_fields(
            [
                FieldUpdate::ServiceKind(ServiceKind::Package),
                FieldUpdate::ServiceId(Some("tea-ritz".into())),
                FieldUpdate::Date(NaiveDate::from_ymd_opt(2027, 3, 10)),
                FieldUpdate::Duration(Some(rust_decimal::Decimal::MAX)),
            ],
            UpdateOptions::default(),
        );
        assert!(form.pricing().is_none());
        assert!(form.get_field_error(FormField::Duration).is_some());

        form.update_field(FieldUpdate::Duration(Some(dec!(5))), UpdateOptions::default());
        // 180 + 2 extra hours at 55
        assert_eq!(form.pricing().unwrap().final_price, dec!(290));
    }

    #[test]
    fn test_skip_pricing_keeps_previous_breakdown() {
        let mut form = coordinator();
        select_essential(&mut form, dec!(8));
        let opts = UpdateOptions {
            skip_pricing: true,
            ..UpdateOptions::default()
        };
        form.update_field(FieldUpdate::Duration(Some(dec!(4))), opts);
        assert_eq!(form.pricing().unwrap().total_hours, dec!(8));
        assert_eq!(form.pricing_revision(), 1);
    }

    #[test]
    fn test_package_selection_prices_package() {
        let mut form = coordinator();
        form.update_fields(
            [
                FieldUpdate::ServiceKind(ServiceKind::Package),
                FieldUpdate::ServiceId(Some("bespoke".into())),
                FieldUpdate::Date(NaiveDate::from_ymd_opt(2027, 3, 10)),
                FieldUpdate::Duration(Some(dec!(4))),
            ],
            UpdateOptions::default(),
        );
        assert!(form.pricing().unwrap().requires_quote);
        assert!(form.get_field_error(FormField::ServiceId).is_none());
    }

    // ==================== persistence tests ====================

    /// Holds a corrupt snapshot and rejects every write
    struct FailingStore {
        snapshot: Option<String>,
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, crate::error::PersistenceError> {
            match &self.snapshot {
                Some(raw) => Ok(Some(raw.clone())),
                None => Err(crate::error::PersistenceError::Storage("disk offline".to_string())),
            }
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), crate::error::PersistenceError> {
            Err(crate::error::PersistenceError::Storage("quota exceeded".to_string()))
        }
        fn delete(&self, _key: &str) -> Result<(), crate::error::PersistenceError> {
            Err(crate::error::PersistenceError::Storage("read only".to_string()))
        }
    }

    #[test]
    fn test_corrupt_snapshot_leaves_form_empty() {
        let mut form = coordinator();
        let store = Arc::new(FailingStore {
            snapshot: Some("{\"fullName\": 42".to_string()),
        });
        let persist = form.enable_auto_persist(store, "booking");

        assert_eq!(form.get_data(), BookingFormState::default());
        assert!(form.pricing().is_none());
        persist.disable();
    }

    #[test]
    fn test_updates_succeed_while_writes_fail() {
        let mut form = coordinator();
        let persist = form.enable_auto_persist(Arc::new(FailingStore { snapshot: None }), "booking");

        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let _sub = form.subscribe(move |_| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        });

        select_essential(&mut form, dec!(8));
        form.update_field(FieldUpdate::FullName("Ana Silva".into()), UpdateOptions::default());

        assert_eq!(form.get_data().full_name, "Ana Silva");
        assert_eq!(form.pricing().unwrap().final_price, dec!(324));
        // listeners after the failing writer still run
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
        persist.disable();
    }

    // ==================== steps and reset tests ====================

    #[test]
    fn test_steps_report_validity_and_completeness() {
        let mut form = coordinator();
        form.update_fields(
            [
                FieldUpdate::FullName("Ana Silva".into()),
                FieldUpdate::Email("ana.example.com".into()),
                FieldUpdate::Phone("+44 20 7946 0958".into()),
            ],
            UpdateOptions::default(),
        );

        let personal = form.get_steps()[0];
        assert_eq!(personal.step, FormStep::PersonalInfo);
        assert!(personal.is_complete);
        assert!(!personal.is_valid);

        // steps are not gated: later steps report on their own fields
        select_essential(&mut form, dec!(4));
        let service = form.get_steps()[2];
        assert!(service.is_valid);
        assert!(service.is_complete);
    }

    #[test]
    fn test_reset_restores_seed_and_notifies() {
        let mut form = coordinator();
        select_essential(&mut form, dec!(8));
        form.update_field(FieldUpdate::Email("bad".into()), UpdateOptions::default());

        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let _sub = form.subscribe(move |_| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        });

        form.reset(None);
        assert_eq!(form.get_data(), BookingFormState::default());
        assert!(form.get_errors().is_empty());
        assert!(form.pricing().is_none());

        let seed = BookingFormState {
            full_name: "Ana Silva".into(),
            service_id: Some("essential".into()),
            date: NaiveDate::from_ymd_opt(2027, 3, 10),
            duration_hours: Some(dec!(8)),
            ..BookingFormState::default()
        };
        form.reset(Some(seed));
        assert_eq!(form.get_data().full_name, "Ana Silva");
        assert_eq!(form.pricing().unwrap().final_price, dec!(324));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }
}
