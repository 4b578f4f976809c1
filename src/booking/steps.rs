//! Form steps and their status.

use serde::Serialize;

use super::state::{BookingFormState, FormField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FormStep {
    PersonalInfo,
    TripDetails,
    ServicePreferences,
    Review,
}

impl FormStep {
    pub const ALL: [FormStep; 4] = [
        FormStep::PersonalInfo,
        FormStep::TripDetails,
        FormStep::ServicePreferences,
        FormStep::Review,
    ];

    /// Fields the step is made of. Number of days belongs to the service step
    /// only for multi-day bookings.
    pub fn fields(&self, state: &BookingFormState) -> Vec<FormField> {
        match self {
            FormStep::PersonalInfo => vec![FormField::FullName, FormField::Email, FormField::Phone],
            FormStep::TripDetails => vec![
                FormField::Date,
                FormField::Time,
                FormField::PickupLocation,
                FormField::Destinations,
            ],
            FormStep::ServicePreferences => {
                let mut fields = vec![FormField::ServiceId, FormField::Duration];
                if state.is_multi_day {
                    fields.push(FormField::NumberOfDays);
                }
                fields
            }
            FormStep::Review => vec![FormField::AcceptedTerms],
        }
    }
}

/// Where a step stands right now. Steps are not gated on each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStatus {
    pub step: FormStep,
    /// Every field passes its rule
    pub is_valid: bool,
    /// Every field has a value
    pub is_complete: bool,
}
