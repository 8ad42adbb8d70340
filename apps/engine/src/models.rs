use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Session parameters ──

/// Bookable session lengths. Anything else is rejected at the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum SessionDuration {
    Min30,
    Min60,
    Min90,
    Min120,
}

impl SessionDuration {
    pub const ALL: [SessionDuration; 4] = [
        SessionDuration::Min30,
        SessionDuration::Min60,
        SessionDuration::Min90,
        SessionDuration::Min120,
    ];

    pub fn minutes(self) -> i64 {
        match self {
            SessionDuration::Min30 => 30,
            SessionDuration::Min60 => 60,
            SessionDuration::Min90 => 90,
            SessionDuration::Min120 => 120,
        }
    }
}

impl TryFrom<i64> for SessionDuration {
    type Error = String;

    fn try_from(minutes: i64) -> Result<Self, Self::Error> {
        match minutes {
            30 => Ok(SessionDuration::Min30),
            60 => Ok(SessionDuration::Min60),
            90 => Ok(SessionDuration::Min90),
            120 => Ok(SessionDuration::Min120),
            other => Err(format!("unsupported session duration: {} minutes", other)),
        }
    }
}

impl From<SessionDuration> for i64 {
    fn from(d: SessionDuration) -> i64 {
        d.minutes()
    }
}

/// Where the session takes place. Exactly one non-call option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeetingKind {
    GoogleMeet,
    Zoom,
    InPerson,
}

impl MeetingKind {
    /// Call-based kinds need a join link; in-person sessions never do.
    pub fn needs_link(self) -> bool {
        !matches!(self, MeetingKind::InPerson)
    }
}

/// Provisioning outcome for a draft. `Fallback` means the provider was
/// unavailable and a synthesized placeholder link is in use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "url", rename_all = "camelCase")]
pub enum MeetingLinkState {
    Unprovisioned,
    Provisioned(String),
    Fallback(String),
}

impl MeetingLinkState {
    pub fn url(&self) -> Option<&str> {
        match self {
            MeetingLinkState::Unprovisioned => None,
            MeetingLinkState::Provisioned(url) | MeetingLinkState::Fallback(url) => Some(url),
        }
    }

    pub fn is_set(&self) -> bool {
        self.url().is_some()
    }
}

// ── Collaborator inputs ──

/// Mentor data as supplied by the mentor directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorProfile {
    pub id: String,
    pub display_name: String,
    /// Hourly rate in `currency`, e.g. 100 USD.
    pub hourly_rate: Decimal,
    pub currency: String,
    pub rating: Option<f32>,
}

/// Authenticated learner as supplied by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerIdentity {
    pub id: String,
    pub display_name: String,
    pub email: String,
    /// ISO 3166 alpha-2 country code, when known. Drives currency display.
    pub country: Option<String>,
}

// ── Booking draft ──

/// In-progress booking parameters, owned by one wizard attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub mentor_id: String,
    pub learner_id: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub duration: SessionDuration,
    pub topic: String,
    pub notes: Option<String>,
    pub meeting_kind: MeetingKind,
    pub meeting_link: MeetingLinkState,
}

impl BookingDraft {
    pub fn new(mentor_id: impl Into<String>, learner_id: impl Into<String>) -> Self {
        Self {
            mentor_id: mentor_id.into(),
            learner_id: learner_id.into(),
            date: None,
            time: None,
            duration: SessionDuration::Min60,
            topic: String::new(),
            notes: None,
            meeting_kind: MeetingKind::GoogleMeet,
            meeting_link: MeetingLinkState::Unprovisioned,
        }
    }

    /// Snapshot of the scheduling fields, available once the draft is
    /// complete enough to be priced and provisioned.
    pub fn session_summary(&self) -> Option<SessionSummary> {
        let date = self.date?;
        let time = self.time?;
        if self.topic.trim().is_empty() {
            return None;
        }
        Some(SessionSummary {
            mentor_id: self.mentor_id.clone(),
            date,
            time,
            duration_minutes: self.duration.minutes(),
            topic: self.topic.trim().to_string(),
        })
    }
}

/// The scheduling fields every collaborator sees: provisioning metadata,
/// payment reconciliation, confirmation emails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub mentor_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: i64,
    pub topic: String,
}

// ── Quote ──

/// Priced, currency-resolved snapshot of what a draft will cost.
/// `total` is kept unrounded; rounding happens only at display/charge time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub hourly_source_amount: Decimal,
    pub source_currency: String,
    pub target_currency: String,
    pub conversion_rate: Decimal,
    pub total: Decimal,
}

impl Quote {
    /// Charge/display amount, rounded to 2 decimal places.
    pub fn display_total(&self) -> Decimal {
        self.total
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

// ── Payment ──

/// Publishable key for bootstrapping the payment collection widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfig {
    pub publishable_key: String,
}

/// Reconciliation metadata attached to every payment intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMetadata {
    pub mentor_id: String,
    pub session_date: NaiveDate,
    pub session_time: NaiveTime,
    pub topic: String,
}

/// Wire request for `POST create-payment-intent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    pub metadata: PaymentMetadata,
}

/// Processor-issued authorization, immutable once created. A changed
/// quote always means a brand-new authorization, never an amount patch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAuthorization {
    pub handle: String,
    pub amount: Decimal,
    pub currency: String,
    pub metadata: PaymentMetadata,
}

// ── Confirmed booking ──

/// Terminal, append-only record created exactly once after capture
/// success. Its existence is the source of truth that payment cleared,
/// independent of whether persistence or notification later fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedBooking {
    pub booking_id: Uuid,
    pub mentor_id: String,
    pub learner_id: String,
    pub draft: BookingDraft,
    pub authorization_handle: String,
    pub amount_charged: Decimal,
    pub currency: String,
    pub confirmed_at: DateTime<Utc>,
}

/// Wire request for `POST send-confirmation`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRequest {
    pub mentor_name: String,
    pub learner_email: String,
    pub session: SessionSummary,
    pub amount: Decimal,
    pub currency: String,
    pub meeting_link: Option<String>,
}

/// Human-readable amount for logs and payment descriptions ("150.00 USD").
pub fn format_amount(amount: Decimal, currency: &str) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    // Decimal keeps trailing scale, so normalize through f64 for display
    match rounded.to_f64() {
        Some(v) => format!("{:.2} {}", v, currency),
        None => format!("{} {}", rounded, currency),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_duration_roundtrip() {
        for d in SessionDuration::ALL {
            assert_eq!(SessionDuration::try_from(d.minutes()).unwrap(), d);
        }
        assert!(SessionDuration::try_from(45).is_err());
    }

    #[test]
    fn test_in_person_needs_no_link() {
        assert!(!MeetingKind::InPerson.needs_link());
        assert!(MeetingKind::GoogleMeet.needs_link());
        assert!(MeetingKind::Zoom.needs_link());
    }

    #[test]
    fn test_session_summary_requires_fields() {
        let mut draft = BookingDraft::new("mentor-1", "learner-1");
        assert!(draft.session_summary().is_none());

        draft.date = Some(NaiveDate::from_ymd_opt(2026, 9, 14).unwrap());
        draft.time = Some(NaiveTime::from_hms_opt(15, 0, 0).unwrap());
        assert!(draft.session_summary().is_none()); // topic still empty

        draft.topic = "  rust ownership  ".into();
        let summary = draft.session_summary().unwrap();
        assert_eq!(summary.topic, "rust ownership");
        assert_eq!(summary.duration_minutes, 60);
    }

    #[test]
    fn test_display_total_rounds_half_up() {
        let quote = Quote {
            hourly_source_amount: dec!(100),
            source_currency: "USD".into(),
            target_currency: "USD".into(),
            conversion_rate: dec!(1),
            total: dec!(149.995),
        };
        assert_eq!(quote.display_total(), dec!(150.00));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(150), "USD"), "150.00 USD");
        assert_eq!(format_amount(dec!(37.125), "EUR"), "37.13 EUR");
    }
}
