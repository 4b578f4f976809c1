//! Booking form state and typed field updates.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::pricing::models::{MembershipLevel, ServiceKind};
use crate::pricing::requests::BookingRequest;
use crate::pricing::responses::PriceBreakdown;

/// Names of the booking form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    FullName,
    Email,
    Phone,
    Date,
    Time,
    PickupLocation,
    Destinations,
    ServiceKind,
    ServiceId,
    Duration,
    MembershipLevel,
    EventType,
    IsMultiDay,
    NumberOfDays,
    SpecialRequirements,
    AdditionalNotes,
    AcceptedTerms,
}

impl FormField {
    pub const ALL: [FormField; 17] = [
        FormField::FullName,
        FormField::Email,
        FormField::Phone,
        FormField::Date,
        FormField::Time,
        FormField::PickupLocation,
        FormField::Destinations,
        FormField::ServiceKind,
        FormField::ServiceId,
        FormField::Duration,
        FormField::MembershipLevel,
        FormField::EventType,
        FormField::IsMultiDay,
        FormField::NumberOfDays,
        FormField::SpecialRequirements,
        FormField::AdditionalNotes,
        FormField::AcceptedTerms,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FormField::FullName => "fullName",
            FormField::Email => "email",
            FormField::Phone => "phone",
            FormField::Date => "date",
            FormField::Time => "time",
            FormField::PickupLocation => "pickupLocation",
            FormField::Destinations => "destinations",
            FormField::ServiceKind => "serviceKind",
            FormField::ServiceId => "serviceId",
            FormField::Duration => "duration",
            FormField::MembershipLevel => "membershipLevel",
            FormField::EventType => "eventType",
            FormField::IsMultiDay => "isMultiDay",
            FormField::NumberOfDays => "numberOfDays",
            FormField::SpecialRequirements => "specialRequirements",
            FormField::AdditionalNotes => "additionalNotes",
            FormField::AcceptedTerms => "acceptedTerms",
        }
    }

    /// Updating one of these fields re-runs pricing
    pub fn is_price_relevant(&self) -> bool {
        matches!(
            self,
            FormField::ServiceId
                | FormField::ServiceKind
                | FormField::Date
                | FormField::Duration
                | FormField::MembershipLevel
                | FormField::EventType
                | FormField::IsMultiDay
                | FormField::NumberOfDays
        )
    }

    /// Fields whose validity depends on this field's value
    pub fn dependents(&self) -> &'static [FormField] {
        match self {
            FormField::ServiceId | FormField::ServiceKind => {
                &[FormField::ServiceId, FormField::Duration]
            }
            FormField::IsMultiDay => &[FormField::NumberOfDays],
            _ => &[],
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A new value for one form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum FieldUpdate {
    FullName(String),
    Email(String),
    Phone(String),
    Date(Option<NaiveDate>),
    Time(Option<NaiveTime>),
    PickupLocation(String),
    Destinations(String),
    ServiceKind(ServiceKind),
    ServiceId(Option<String>),
    Duration(Option<Decimal>),
    MembershipLevel(Option<MembershipLevel>),
    EventType(Option<String>),
    IsMultiDay(bool),
    NumberOfDays(Option<u32>),
    SpecialRequirements(BTreeSet<String>),
    AdditionalNotes(String),
    AcceptedTerms(bool),
}

impl FieldUpdate {
    pub fn field(&self) -> FormField {
        match self {
            FieldUpdate::FullName(_) => FormField::FullName,
            FieldUpdate::Email(_) => FormField::Email,
            FieldUpdate::Phone(_) => FormField::Phone,
            FieldUpdate::Date(_) => FormField::Date,
            FieldUpdate::Time(_) => FormField::Time,
            FieldUpdate::PickupLocation(_) => FormField::PickupLocation,
            FieldUpdate::Destinations(_) => FormField::Destinations,
            FieldUpdate::ServiceKind(_) => FormField::ServiceKind,
            FieldUpdate::ServiceId(_) => FormField::ServiceId,
            FieldUpdate::Duration(_) => FormField::Duration,
            FieldUpdate::MembershipLevel(_) => FormField::MembershipLevel,
            FieldUpdate::EventType(_) => FormField::EventType,
            FieldUpdate::IsMultiDay(_) => FormField::IsMultiDay,
            FieldUpdate::NumberOfDays(_) => FormField::NumberOfDays,
            FieldUpdate::SpecialRequirements(_) => FormField::SpecialRequirements,
            FieldUpdate::AdditionalNotes(_) => FormField::AdditionalNotes,
            FieldUpdate::AcceptedTerms(_) => FormField::AcceptedTerms,
        }
    }
}

/// Everything the customer has entered, plus the latest computed price.
///
/// The breakdown is transient: it is never serialized and is recomputed after
/// a restore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookingFormState {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub pickup_location: String,
    pub destinations: String,
    pub service_kind: ServiceKind,
    pub service_id: Option<String>,
    pub duration_hours: Option<Decimal>,
    pub membership_level: Option<MembershipLevel>,
    pub event_type: Option<String>,
    pub is_multi_day: bool,
    pub number_of_days: Option<u32>,
    pub special_requirements: BTreeSet<String>,
    pub additional_notes: String,
    pub accepted_terms: bool,
    #[serde(skip)]
    pub pricing_breakdown: Option<Arc<PriceBreakdown>>,
}

impl BookingFormState {
    pub fn apply(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::FullName(v) => self.full_name = v,
            FieldUpdate::Email(v) => self.email = v,
            FieldUpdate::Phone(v) => self.phone = v,
            FieldUpdate::Date(v) => self.date = v,
            FieldUpdate::Time(v) => self.time = v,
            FieldUpdate::PickupLocation(v) => self.pickup_location = v,
            FieldUpdate::Destinations(v) => self.destinations = v,
            FieldUpdate::ServiceKind(v) => self.service_kind = v,
            FieldUpdate::ServiceId(v) => self.service_id = v,
            FieldUpdate::Duration(v) => self.duration_hours = v,
            FieldUpdate::MembershipLevel(v) => self.membership_level = v,
            FieldUpdate::EventType(v) => self.event_type = v,
            FieldUpdate::IsMultiDay(v) => self.is_multi_day = v,
            FieldUpdate::NumberOfDays(v) => self.number_of_days = v,
            FieldUpdate::SpecialRequirements(v) => self.special_requirements = v,
            FieldUpdate::AdditionalNotes(v) => self.additional_notes = v,
            FieldUpdate::AcceptedTerms(v) => self.accepted_terms = v,
        }
    }

    /// Whether the field holds a non-empty value. Flags count as filled only
    /// when set.
    pub fn is_filled(&self, field: FormField) -> bool {
        match field {
            FormField::FullName => !self.full_name.trim().is_empty(),
            FormField::Email => !self.email.trim().is_empty(),
            FormField::Phone => !self.phone.trim().is_empty(),
            FormField::Date => self.date.is_some(),
            FormField::Time => self.time.is_some(),
            FormField::PickupLocation => !self.pickup_location.trim().is_empty(),
            FormField::Destinations => !self.destinations.trim().is_empty(),
            FormField::ServiceKind => true,
            FormField::ServiceId => self.service_id.as_deref().is_some_and(|id| !id.is_empty()),
            FormField::Duration => self.duration_hours.is_some(),
            FormField::MembershipLevel => self.membership_level.is_some(),
            FormField::EventType => self.event_type.as_deref().is_some_and(|e| !e.is_empty()),
            FormField::IsMultiDay => self.is_multi_day,
            FormField::NumberOfDays => self.number_of_days.is_some(),
            FormField::SpecialRequirements => !self.special_requirements.is_empty(),
            FormField::AdditionalNotes => !self.additional_notes.trim().is_empty(),
            FormField::AcceptedTerms => self.accepted_terms,
        }
    }

    /// Field values as updates, in form order
    pub fn to_updates(&self) -> Vec<FieldUpdate> {
        vec![
            FieldUpdate::FullName(self.full_name.clone()),
            FieldUpdate::Email(self.email.clone()),
            FieldUpdate::Phone(self.phone.clone()),
            FieldUpdate::Date(self.date),
            FieldUpdate::Time(self.time),
            FieldUpdate::PickupLocation(self.pickup_location.clone()),
            FieldUpdate::Destinations(self.destinations.clone()),
            FieldUpdate::ServiceKind(self.service_kind),
            FieldUpdate::ServiceId(self.service_id.clone()),
            FieldUpdate::Duration(self.duration_hours),
            FieldUpdate::MembershipLevel(self.membership_level),
            FieldUpdate::EventType(self.event_type.clone()),
            FieldUpdate::IsMultiDay(self.is_multi_day),
            FieldUpdate::NumberOfDays(self.number_of_days),
            FieldUpdate::SpecialRequirements(self.special_requirements.clone()),
            FieldUpdate::AdditionalNotes(self.additional_notes.clone()),
            FieldUpdate::AcceptedTerms(self.accepted_terms),
        ]
    }

    /// Pricing request for the current selection, once service, date and
    /// duration are all present
    pub fn pricing_request(&self) -> Option<BookingRequest> {
        let service_id = self.service_id.as_deref().filter(|id| !id.is_empty())?;
        Some(BookingRequest {
            service_id: service_id.to_string(),
            service_kind: self.service_kind,
            date: self.date?,
            duration_hours: self.duration_hours?,
            membership_level: self.membership_level,
            event_type: self.event_type.clone(),
            is_multi_day: self.is_multi_day,
            number_of_days: self.number_of_days,
        })
    }

    /// A copy with the transient breakdown dropped
    pub fn without_pricing(&self) -> Self {
        Self {
            pricing_breakdown: None,
            ..self.clone()
        }
    }
}
