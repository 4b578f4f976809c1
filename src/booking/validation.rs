//! Per-field validation rules for the booking form.
//!
//! Each field has at most one rule. A rule reads the whole state so that
//! cross-field checks (duration against the selected tier, days against the
//! multi-day flag) live beside the field they report on.

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::state::{BookingFormState, FormField};
use crate::pricing::catalog::PricingCatalog;
use crate::pricing::models::ServiceKind;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email pattern")
});

static PHONE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // UK
        r"^\+44\s?\d{2,4}\s?\d{3,4}\s?\d{3,4}$",
        // Portugal
        r"^\+351\s?\d{3}\s?\d{3}\s?\d{3}$",
        // Brazil
        r"^\+55\s?\(\d{2}\)\s?\d{4,5}-\d{4}$",
        r"^\+\d{1,3}\s?[\d\s\-\(\)]{7,15}$",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("valid phone pattern"))
    .collect()
});

const MIN_NAME_LEN: usize = 2;
const MIN_LOCATION_LEN: usize = 3;
const MIN_MULTI_DAY_DAYS: u32 = 2;
/// Packages are single-day experiences
const MAX_PACKAGE_HOURS: Decimal = dec!(24);

/// A failed rule, with the message in English and Portuguese
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub field: FormField,
    pub message: String,
    pub message_pt: String,
}

impl ValidationError {
    pub fn new(field: FormField, message: impl Into<String>, message_pt: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
            message_pt: message_pt.into(),
        }
    }
}

/// What rules may consult besides the state itself
pub struct ValidationContext<'a> {
    pub catalog: &'a PricingCatalog,
    pub today: NaiveDate,
}

type Rule = fn(&BookingFormState, &ValidationContext<'_>) -> Option<ValidationError>;

const RULES: &[(FormField, Rule)] = &[
    (FormField::FullName, full_name),
    (FormField::Email, email),
    (FormField::Phone, phone),
    (FormField::Date, date),
    (FormField::Time, time),
    (FormField::PickupLocation, pickup_location),
    (FormField::Destinations, destinations),
    (FormField::ServiceId, service_id),
    (FormField::Duration, duration),
    (FormField::NumberOfDays, number_of_days),
    (FormField::AcceptedTerms, accepted_terms),
];

/// Run the rule for `field`. Fields without a rule always pass.
pub fn validate_field(
    field: FormField,
    state: &BookingFormState,
    ctx: &ValidationContext<'_>,
) -> Option<ValidationError> {
    RULES
        .iter()
        .find(|(f, _)| *f == field)
        .and_then(|(_, rule)| rule(state, ctx))
}

/// Fields that have a validation rule
pub fn validated_fields() -> impl Iterator<Item = FormField> {
    RULES.iter().map(|(f, _)| *f)
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value.trim())
}

pub fn is_valid_phone(value: &str) -> bool {
    let value = value.trim();
    PHONE_PATTERNS.iter().any(|re| re.is_match(value))
}

fn full_name(state: &BookingFormState, _: &ValidationContext<'_>) -> Option<ValidationError> {
    let name = state.full_name.trim();
    if name.is_empty() {
        return Some(ValidationError::new(
            FormField::FullName,
            "Full name is required",
            "Nome completo é obrigatório",
        ));
    }
    (name.chars().count() < MIN_NAME_LEN).then(|| {
        ValidationError::new(
            FormField::FullName,
            "Full name must be at least 2 characters",
            "Nome completo deve ter pelo menos 2 caracteres",
        )
    })
}

fn email(state: &BookingFormState, _: &ValidationContext<'_>) -> Option<ValidationError> {
    if state.email.trim().is_empty() {
        return Some(ValidationError::new(
            FormField::Email,
            "Email is required",
            "Email é obrigatório",
        ));
    }
    (!is_valid_email(&state.email))
        .then(|| ValidationError::new(FormField::Email, "Invalid email format", "Email inválido"))
}

fn phone(state: &BookingFormState, _: &ValidationContext<'_>) -> Option<ValidationError> {
    if state.phone.trim().is_empty() {
        return Some(ValidationError::new(
            FormField::Phone,
            "Phone number is required",
            "Telefone é obrigatório",
        ));
    }
    (!is_valid_phone(&state.phone)).then(|| {
        ValidationError::new(
            FormField::Phone,
            "Invalid phone number",
            "Número de telefone inválido",
        )
    })
}

fn date(state: &BookingFormState, ctx: &ValidationContext<'_>) -> Option<ValidationError> {
    match state.date {
        None => Some(ValidationError::new(
            FormField::Date,
            "Date is required",
            "Data é obrigatória",
        )),
        Some(date) if date < ctx.today => Some(ValidationError::new(
            FormField::Date,
            "Date cannot be in the past",
            "A data não pode estar no passado",
        )),
        Some(_) => None,
    }
}

fn time(state: &BookingFormState, _: &ValidationContext<'_>) -> Option<ValidationError> {
    state
        .time
        .is_none()
        .then(|| ValidationError::new(FormField::Time, "Time is required", "Hora é obrigatória"))
}

fn pickup_location(state: &BookingFormState, _: &ValidationContext<'_>) -> Option<ValidationError> {
    (state.pickup_location.trim().chars().count() < MIN_LOCATION_LEN).then(|| {
        ValidationError::new(
            FormField::PickupLocation,
            "Pickup location is required",
            "Local de recolha é obrigatório",
        )
    })
}

fn destinations(state: &BookingFormState, _: &ValidationContext<'_>) -> Option<ValidationError> {
    (state.destinations.trim().chars().count() < MIN_LOCATION_LEN).then(|| {
        ValidationError::new(
            FormField::Destinations,
            "Destinations are required",
            "Destinos são obrigatórios",
        )
    })
}

fn service_id(state: &BookingFormState, ctx: &ValidationContext<'_>) -> Option<ValidationError> {
    let Some(id) = state.service_id.as_deref().filter(|id| !id.is_empty()) else {
        return Some(ValidationError::new(
            FormField::ServiceId,
            "Please select a service",
            "Por favor selecione um serviço",
        ));
    };
    (!ctx.catalog.contains(state.service_kind, id)).then(|| {
        ValidationError::new(
            FormField::ServiceId,
            "Selected service is not available",
            "O serviço selecionado não está disponível",
        )
    })
}

fn duration(state: &BookingFormState, ctx: &ValidationContext<'_>) -> Option<ValidationError> {
    let hours = match state.duration_hours {
        None => {
            return Some(ValidationError::new(
                FormField::Duration,
                "Duration is required",
                "Duração é obrigatória",
            ))
        }
        Some(hours) if hours <= Decimal::ZERO => {
            return Some(ValidationError::new(
                FormField::Duration,
                "Duration must be greater than zero",
                "A duração deve ser maior que zero",
            ))
        }
        Some(hours) => hours,
    };

    if state.service_kind == ServiceKind::Package {
        return (hours > MAX_PACKAGE_HOURS).then(|| {
            ValidationError::new(
                FormField::Duration,
                format!("Experience packages are limited to {} hours", MAX_PACKAGE_HOURS),
                format!("As experiências estão limitadas a {} horas", MAX_PACKAGE_HOURS),
            )
        });
    }
    let tier = state
        .service_id
        .as_deref()
        .and_then(|id| ctx.catalog.find_tier(id))?;

    (hours < tier.minimum_hours || hours > tier.maximum_hours).then(|| {
        ValidationError::new(
            FormField::Duration,
            format!(
                "{} bookings must be between {} and {} hours",
                tier.name, tier.minimum_hours, tier.maximum_hours
            ),
            format!(
                "As reservas {} devem ter entre {} e {} horas",
                tier.name, tier.minimum_hours, tier.maximum_hours
            ),
        )
    })
}

fn number_of_days(state: &BookingFormState, _: &ValidationContext<'_>) -> Option<ValidationError> {
    if !state.is_multi_day {
        return None;
    }
    match state.number_of_days {
        Some(days) if days >= MIN_MULTI_DAY_DAYS => None,
        _ => Some(ValidationError::new(
            FormField::NumberOfDays,
            "Multi-day bookings need at least 2 days",
            "Reservas de vários dias precisam de pelo menos 2 dias",
        )),
    }
}

fn accepted_terms(state: &BookingFormState, _: &ValidationContext<'_>) -> Option<ValidationError> {
    (!state.accepted_terms).then(|| {
        ValidationError::new(
            FormField::AcceptedTerms,
            "You must accept the terms and conditions",
            "Deve aceitar os termos e condições",
        )
    })
}
