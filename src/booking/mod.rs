//! Booking form module.
//!
//! Field-level state, validation, step status, change listeners and
//! snapshot persistence for one customer's booking session.

pub mod coordinator;
pub mod observers;
pub mod persistence;
pub mod state;
pub mod steps;
pub mod validation;

pub use coordinator::{BookingFormCoordinator, UpdateOptions};
pub use observers::Subscription;
pub use persistence::{AutoPersist, InMemoryStore, KeyValueStore};
pub use state::{BookingFormState, FieldUpdate, FormField};
pub use steps::{FormStep, StepStatus};
pub use validation::ValidationError;
