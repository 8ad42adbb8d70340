//! Booking & payment orchestration engine for mentor sessions.
//!
//! One `BookingWizard` per attempt drives the `Details → Payment →
//! Confirmed` flow: pricing with best-effort currency conversion, payment
//! authorization sized to the live quote, meeting provisioning with a
//! fallback link, and post-capture persistence + notification that can
//! never roll the success state back. Presentation shells (the full-page
//! and modal booking flows) consume this crate through [`BookingWizard`].

pub mod config;
pub mod confirmation;
pub mod error;
pub mod http;
pub mod models;
pub mod payment;
pub mod ports;
pub mod pricing;
pub mod provisioning;
pub mod wizard;

pub use config::EngineConfig;
pub use error::BookingError;
pub use models::{
    BookingDraft, ConfirmedBooking, LearnerIdentity, MeetingKind, MeetingLinkState, MentorProfile,
    PaymentAuthorization, Quote, SessionDuration,
};
pub use wizard::{BookingWizard, Collaborators, WizardState};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Console tracing setup for shells and integration tests.
/// `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let fmt_layer = tracing_subscriber::fmt::layer();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .ok();
}
