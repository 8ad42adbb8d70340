use chrono::{NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::BookingError;
use crate::models::{
    BookingDraft, ConfirmationRequest, ConfirmedBooking, LearnerIdentity, MeetingKind,
    MeetingLinkState, MentorProfile, PaymentAuthorization, PaymentConfig, Quote, SessionDuration,
};
use crate::ports::{BookingBackend, ExchangeRates, MeetingProvisioner, PaymentProcessor};
use crate::{confirmation, payment, pricing, provisioning};

// ── Collaborators ──

/// The external services one booking attempt orchestrates.
#[derive(Clone)]
pub struct Collaborators {
    pub payments: Arc<dyn PaymentProcessor>,
    pub meetings: Arc<dyn MeetingProvisioner>,
    pub backend: Arc<dyn BookingBackend>,
    pub rates: Arc<dyn ExchangeRates>,
}

impl Collaborators {
    /// Wire all four collaborators over HTTP per the engine config.
    pub fn over_http(config: &EngineConfig) -> anyhow::Result<Self> {
        let client = crate::http::http_client(config.http_timeout)?;
        Ok(Self {
            payments: Arc::new(crate::http::HttpPaymentProcessor::new(
                client.clone(),
                config.api_base_url.clone(),
            )),
            meetings: Arc::new(crate::http::HttpMeetingProvisioner::new(
                client.clone(),
                config.api_base_url.clone(),
            )),
            backend: Arc::new(crate::http::HttpBookingBackend::new(
                client.clone(),
                config.api_base_url.clone(),
            )),
            rates: Arc::new(crate::http::HttpExchangeRates::new(
                client,
                config.rates_base_url.clone(),
            )),
        })
    }
}

// ── State machine ──

/// Wizard states. Linear except for the explicit `Payment → Details` back
/// transition; `Confirmed` is terminal for the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    Details,
    Payment,
    Confirmed,
}

/// The booking wizard: owns exactly one `BookingDraft` and at most one
/// in-flight `PaymentAuthorization` per attempt. Presentation shells
/// (full-page and modal flows) drive it through the methods below.
pub struct BookingWizard {
    config: EngineConfig,
    deps: Collaborators,
    mentor: MentorProfile,
    learner: LearnerIdentity,
    draft: BookingDraft,
    /// Resolved at most once per wizard: (target currency, rate).
    conversion: Option<(String, Decimal)>,
    quote: Quote,
    authorization: Option<PaymentAuthorization>,
    state: WizardState,
    in_flight: bool,
}

impl BookingWizard {
    pub fn new(
        mentor: MentorProfile,
        learner: LearnerIdentity,
        deps: Collaborators,
        config: EngineConfig,
    ) -> Self {
        let draft = BookingDraft::new(mentor.id.clone(), learner.id.clone());
        let quote = pricing::compute_quote(mentor.hourly_rate, &mentor.currency, draft.duration, None);
        Self {
            config,
            deps,
            mentor,
            learner,
            draft,
            conversion: None,
            quote,
            authorization: None,
            state: WizardState::Details,
            in_flight: false,
        }
    }

    // ── Accessors ──

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn quote(&self) -> &Quote {
        &self.quote
    }

    pub fn authorization(&self) -> Option<&PaymentAuthorization> {
        self.authorization.as_ref()
    }

    // ── Draft editing (Details state only) ──

    pub fn set_date(&mut self, date: NaiveDate) -> Result<(), BookingError> {
        self.editable()?;
        self.draft.date = Some(date);
        Ok(())
    }

    pub fn set_time(&mut self, time: NaiveTime) -> Result<(), BookingError> {
        self.editable()?;
        self.draft.time = Some(time);
        Ok(())
    }

    pub fn set_topic(&mut self, topic: &str) -> Result<(), BookingError> {
        self.editable()?;
        self.draft.topic = topic.to_string();
        Ok(())
    }

    pub fn set_notes(&mut self, notes: Option<String>) -> Result<(), BookingError> {
        self.editable()?;
        self.draft.notes = notes;
        Ok(())
    }

    /// Change the session length. The quote is recomputed immediately so a
    /// later authorization is always sized to what the user sees.
    pub fn set_duration(&mut self, duration: SessionDuration) -> Result<(), BookingError> {
        self.editable()?;
        self.draft.duration = duration;
        self.recompute_quote();
        Ok(())
    }

    /// Change where the session happens. Switching kind invalidates any
    /// cached meeting link; the next provisioning call regenerates it for
    /// the new kind.
    pub fn set_meeting_kind(&mut self, kind: MeetingKind) -> Result<(), BookingError> {
        self.editable()?;
        if self.draft.meeting_kind != kind {
            self.draft.meeting_kind = kind;
            self.draft.meeting_link = MeetingLinkState::Unprovisioned;
        }
        Ok(())
    }

    fn editable(&self) -> Result<(), BookingError> {
        match self.state {
            WizardState::Details => Ok(()),
            _ => Err(BookingError::InvalidTransition(
                "draft fields can only change in the Details state",
            )),
        }
    }

    // ── Pricing ──

    /// One-shot conversion-rate resolution for the learner's locale.
    /// Subsequent calls are no-ops; a failed lookup sticks at
    /// source-currency display rather than retrying mid-flow.
    pub async fn resolve_rates(&mut self) {
        if self.conversion.is_some() {
            return;
        }
        let resolved = pricing::resolve_conversion(
            self.deps.rates.as_ref(),
            &self.mentor.currency,
            self.learner.country.as_deref(),
            self.config.rates_timeout,
        )
        .await;
        self.conversion = Some(resolved);
        self.recompute_quote();
    }

    fn recompute_quote(&mut self) {
        let conversion = self
            .conversion
            .as_ref()
            .map(|(currency, rate)| (currency.as_str(), *rate));
        self.quote = pricing::compute_quote(
            self.mentor.hourly_rate,
            &self.mentor.currency,
            self.draft.duration,
            conversion,
        );
    }

    // ── Meeting link ──

    /// Resolve the meeting link for the current draft, if not already set.
    /// Idempotent per `(meeting_kind, date, time, topic)`: once set, the
    /// cached link is returned without touching the provider again.
    pub async fn provision_meeting(&mut self) -> Result<&MeetingLinkState, BookingError> {
        if !self.draft.meeting_kind.needs_link() {
            return Ok(&self.draft.meeting_link);
        }
        if self.draft.meeting_link.is_set() {
            return Ok(&self.draft.meeting_link);
        }
        let session = self
            .draft
            .session_summary()
            .ok_or(BookingError::Validation("draft is incomplete"))?;
        self.draft.meeting_link = provisioning::resolve_meeting_link(
            self.deps.meetings.as_ref(),
            self.draft.meeting_kind,
            &session,
            self.config.provisioning_timeout,
        )
        .await;
        Ok(&self.draft.meeting_link)
    }

    // ── Payment bootstrap ──

    /// Publishable key for the shell's payment collection widget.
    pub async fn payment_config(&self) -> Result<PaymentConfig, BookingError> {
        payment::payment_config(self.deps.payments.as_ref()).await
    }

    // ── Transitions ──

    /// `Details → Payment`: validate the draft, request an authorization
    /// sized to the current quote, and advance. On processor failure the
    /// wizard stays in `Details` with no partial state.
    pub async fn advance_to_payment(&mut self) -> Result<PaymentAuthorization, BookingError> {
        if self.state != WizardState::Details {
            return Err(BookingError::InvalidTransition(
                "advance is only valid from the Details state",
            ));
        }
        if self.in_flight {
            return Err(BookingError::InvalidTransition(
                "an authorization request is already in flight",
            ));
        }
        if self.draft.date.is_none() {
            return Err(BookingError::Validation("date is required"));
        }
        if self.draft.time.is_none() {
            return Err(BookingError::Validation("time is required"));
        }
        if self.draft.topic.trim().is_empty() {
            return Err(BookingError::Validation("topic is required"));
        }

        self.in_flight = true;
        let result = payment::authorize(
            self.deps.payments.as_ref(),
            &self.quote,
            &self.draft,
            &self.mentor,
            &self.learner,
        )
        .await;
        self.in_flight = false;

        let auth = result?;
        self.state = WizardState::Payment;
        self.authorization = Some(auth.clone());
        Ok(auth)
    }

    /// `Payment → Details`: permitted any time before capture. Discards
    /// the authorization (a later advance creates a brand-new one, never a
    /// re-used stale amount) and preserves every other draft field.
    pub fn back_to_details(&mut self) -> Result<(), BookingError> {
        if self.state != WizardState::Payment {
            return Err(BookingError::InvalidTransition(
                "back navigation is only valid from the Payment state",
            ));
        }
        if let Some(auth) = self.authorization.take() {
            tracing::info!("discarding authorization {} after back navigation", auth.handle);
        }
        self.state = WizardState::Details;
        Ok(())
    }

    /// `Payment → Confirmed`: the capture-success callback. Unconditional
    /// once capture is reported — the user's money has moved, so nothing
    /// downstream (provisioning, persistence, notification) can prevent or
    /// revert this transition. Returns the terminal `ConfirmedBooking`;
    /// persistence and notification are dispatched on a background task.
    pub async fn capture_succeeded(&mut self) -> Result<ConfirmedBooking, BookingError> {
        if self.state != WizardState::Payment {
            return Err(BookingError::InvalidTransition(
                "capture success is only valid from the Payment state",
            ));
        }
        let session = self
            .draft
            .session_summary()
            .ok_or(BookingError::InvalidTransition(
                "draft lost required fields after authorization",
            ))?;
        let auth = self
            .authorization
            .take()
            .ok_or(BookingError::InvalidTransition(
                "no authorization on record for this attempt",
            ))?;

        // Point of no return: state flips before any downstream call.
        self.state = WizardState::Confirmed;

        // Step A: make sure the record and the email carry a link, real or
        // fallback, before persistence fires.
        if self.draft.meeting_kind.needs_link() && !self.draft.meeting_link.is_set() {
            self.draft.meeting_link = provisioning::resolve_meeting_link(
                self.deps.meetings.as_ref(),
                self.draft.meeting_kind,
                &session,
                self.config.provisioning_timeout,
            )
            .await;
        }

        let booking = ConfirmedBooking {
            booking_id: Uuid::new_v4(),
            mentor_id: self.mentor.id.clone(),
            learner_id: self.learner.id.clone(),
            draft: self.draft.clone(),
            authorization_handle: auth.handle.clone(),
            amount_charged: auth.amount,
            currency: auth.currency.clone(),
            confirmed_at: Utc::now(),
        };

        let note = ConfirmationRequest {
            mentor_name: self.mentor.display_name.clone(),
            learner_email: self.learner.email.clone(),
            session,
            amount: auth.amount,
            currency: auth.currency,
            meeting_link: self.draft.meeting_link.url().map(str::to_string),
        };

        // Steps B + C: best-effort, off the success path.
        let backend = Arc::clone(&self.deps.backend);
        let record = booking.clone();
        tokio::spawn(async move {
            confirmation::dispatch(backend, record, note).await;
        });

        tracing::info!(
            "booking {} confirmed for mentor {} / learner {}",
            booking.booking_id,
            booking.mentor_id,
            booking.learner_id
        );
        Ok(booking)
    }

    /// Begin a fresh attempt with a new draft. The resolved conversion
    /// context is kept; the learner's locale has not changed.
    pub fn reset(&mut self) {
        self.draft = BookingDraft::new(self.mentor.id.clone(), self.learner.id.clone());
        self.authorization = None;
        self.state = WizardState::Details;
        self.in_flight = false;
        self.recompute_quote();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfirmationRequest, PaymentConfig, PaymentIntentRequest, SessionSummary};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    // ── Test doubles ──

    #[derive(Default)]
    struct MockProcessor {
        intents: Mutex<Vec<PaymentIntentRequest>>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl PaymentProcessor for MockProcessor {
        async fn payment_config(&self) -> anyhow::Result<PaymentConfig> {
            Ok(PaymentConfig {
                publishable_key: "pk_test_abc".into(),
            })
        }

        async fn create_intent(&self, req: &PaymentIntentRequest) -> anyhow::Result<String> {
            if self.fail.load(Ordering::SeqCst) {
                anyhow::bail!("processor rejected the request")
            }
            let mut intents = self.intents.lock().unwrap();
            intents.push(req.clone());
            Ok(format!("pi_{}", intents.len()))
        }
    }

    enum ProvisionMode {
        Ok,
        Hang,
    }

    struct MockProvisioner {
        mode: ProvisionMode,
        calls: AtomicUsize,
    }

    impl MockProvisioner {
        fn ok() -> Self {
            Self {
                mode: ProvisionMode::Ok,
                calls: AtomicUsize::new(0),
            }
        }

        fn hanging() -> Self {
            Self {
                mode: ProvisionMode::Hang,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MeetingProvisioner for MockProvisioner {
        async fn provision(
            &self,
            kind: MeetingKind,
            _session: &SessionSummary,
        ) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.mode {
                ProvisionMode::Ok => Ok(match kind {
                    MeetingKind::GoogleMeet => "https://meet.google.com/abc-defg-hij".into(),
                    MeetingKind::Zoom => "https://zoom.us/j/123456789".into(),
                    MeetingKind::InPerson => unreachable!(),
                }),
                ProvisionMode::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    unreachable!()
                }
            }
        }
    }

    #[derive(Default)]
    struct MockBackend {
        save_fails: AtomicBool,
        saves: AtomicUsize,
        notes: Mutex<Vec<ConfirmationRequest>>,
    }

    #[async_trait]
    impl BookingBackend for MockBackend {
        async fn save_booking(&self, _booking: &ConfirmedBooking) -> anyhow::Result<()> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            if self.save_fails.load(Ordering::SeqCst) {
                anyhow::bail!("persistence unavailable")
            }
            Ok(())
        }

        async fn send_confirmation(&self, req: &ConfirmationRequest) -> anyhow::Result<()> {
            self.notes.lock().unwrap().push(req.clone());
            Ok(())
        }
    }

    struct MockRates {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ExchangeRates for MockRates {
        async fn rate(&self, _from: &str, _to: &str) -> anyhow::Result<Decimal> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(dec!(0.92))
        }
    }

    struct TestEnv {
        processor: Arc<MockProcessor>,
        provisioner: Arc<MockProvisioner>,
        backend: Arc<MockBackend>,
        rates: Arc<MockRates>,
    }

    impl TestEnv {
        fn new(provisioner: MockProvisioner) -> Self {
            Self {
                processor: Arc::new(MockProcessor::default()),
                provisioner: Arc::new(provisioner),
                backend: Arc::new(MockBackend::default()),
                rates: Arc::new(MockRates {
                    calls: AtomicUsize::new(0),
                }),
            }
        }

        fn wizard(&self, learner_country: Option<&str>) -> BookingWizard {
            let mentor = MentorProfile {
                id: "mentor-7".into(),
                display_name: "Ada".into(),
                hourly_rate: dec!(100),
                currency: "USD".into(),
                rating: Some(4.9),
            };
            let learner = LearnerIdentity {
                id: "learner-3".into(),
                display_name: "Sam".into(),
                email: "sam@example.com".into(),
                country: learner_country.map(str::to_string),
            };
            let deps = Collaborators {
                payments: self.processor.clone(),
                meetings: self.provisioner.clone(),
                backend: self.backend.clone(),
                rates: self.rates.clone(),
            };
            let config = EngineConfig {
                provisioning_timeout: Duration::from_millis(30),
                rates_timeout: Duration::from_millis(30),
                ..EngineConfig::default()
            };
            BookingWizard::new(mentor, learner, deps, config)
        }
    }

    fn fill_draft(wizard: &mut BookingWizard) {
        wizard
            .set_date(NaiveDate::from_ymd_opt(2026, 9, 14).unwrap())
            .unwrap();
        wizard
            .set_time(NaiveTime::from_hms_opt(15, 0, 0).unwrap())
            .unwrap();
        wizard.set_topic("rust ownership").unwrap();
    }

    /// Let the spawned confirmation dispatch run (current-thread runtime).
    async fn drain_dispatch() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    // ── Guards ──

    #[tokio::test]
    async fn test_empty_topic_blocks_advance() {
        let env = TestEnv::new(MockProvisioner::ok());
        let mut wizard = env.wizard(None);
        wizard
            .set_date(NaiveDate::from_ymd_opt(2026, 9, 14).unwrap())
            .unwrap();
        wizard
            .set_time(NaiveTime::from_hms_opt(15, 0, 0).unwrap())
            .unwrap();
        wizard.set_topic("   ").unwrap();

        let err = wizard.advance_to_payment().await.unwrap_err();
        assert!(matches!(err, BookingError::Validation("topic is required")));
        assert_eq!(wizard.state(), WizardState::Details);
        assert!(env.processor.intents.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_date_blocks_advance() {
        let env = TestEnv::new(MockProvisioner::ok());
        let mut wizard = env.wizard(None);
        wizard.set_topic("rust ownership").unwrap();

        let err = wizard.advance_to_payment().await.unwrap_err();
        assert!(matches!(err, BookingError::Validation("date is required")));
    }

    #[tokio::test]
    async fn test_capture_from_details_is_invalid() {
        let env = TestEnv::new(MockProvisioner::ok());
        let mut wizard = env.wizard(None);
        let err = wizard.capture_succeeded().await.unwrap_err();
        assert!(matches!(err, BookingError::InvalidTransition(_)));
        assert_eq!(wizard.state(), WizardState::Details);
    }

    #[tokio::test]
    async fn test_editing_blocked_outside_details() {
        let env = TestEnv::new(MockProvisioner::ok());
        let mut wizard = env.wizard(None);
        fill_draft(&mut wizard);
        wizard.advance_to_payment().await.unwrap();

        let err = wizard.set_duration(SessionDuration::Min120).unwrap_err();
        assert!(matches!(err, BookingError::InvalidTransition(_)));
    }

    // ── Authorization ──

    #[tokio::test]
    async fn test_advance_authorizes_current_quote() {
        let env = TestEnv::new(MockProvisioner::ok());
        let mut wizard = env.wizard(None);
        fill_draft(&mut wizard);
        wizard.set_duration(SessionDuration::Min90).unwrap();

        let auth = wizard.advance_to_payment().await.unwrap();
        assert_eq!(auth.amount, dec!(150.00));
        assert_eq!(wizard.state(), WizardState::Payment);
        assert_eq!(wizard.authorization().unwrap().handle, "pi_1");

        // widget bootstrap is available in the Payment state
        let config = wizard.payment_config().await.unwrap();
        assert_eq!(config.publishable_key, "pk_test_abc");
    }

    #[tokio::test]
    async fn test_processor_error_keeps_details_state() {
        let env = TestEnv::new(MockProvisioner::ok());
        env.processor.fail.store(true, Ordering::SeqCst);
        let mut wizard = env.wizard(None);
        fill_draft(&mut wizard);

        let err = wizard.advance_to_payment().await.unwrap_err();
        assert!(matches!(err, BookingError::Authorization(_)));
        assert_eq!(wizard.state(), WizardState::Details);
        assert!(wizard.authorization().is_none());
    }

    #[tokio::test]
    async fn test_back_and_duration_change_reauthorizes() {
        let env = TestEnv::new(MockProvisioner::ok());
        let mut wizard = env.wizard(None);
        fill_draft(&mut wizard);

        let first = wizard.advance_to_payment().await.unwrap();
        assert_eq!(first.amount, dec!(100.00)); // 60 min default

        wizard.back_to_details().unwrap();
        assert!(wizard.authorization().is_none());
        assert_eq!(wizard.draft().topic, "rust ownership"); // fields preserved

        wizard.set_duration(SessionDuration::Min90).unwrap();
        let second = wizard.advance_to_payment().await.unwrap();
        assert_eq!(second.amount, dec!(150.00));
        assert_ne!(first.handle, second.handle);

        let intents = env.processor.intents.lock().unwrap();
        assert_eq!(intents.len(), 2);
        assert_eq!(intents[0].amount, dec!(100.00));
        assert_eq!(intents[1].amount, dec!(150.00));
    }

    // ── Conversion ──

    #[tokio::test]
    async fn test_rates_resolved_once_and_applied() {
        let env = TestEnv::new(MockProvisioner::ok());
        let mut wizard = env.wizard(Some("DE"));

        wizard.resolve_rates().await;
        wizard.resolve_rates().await; // no-op
        assert_eq!(env.rates.calls.load(Ordering::SeqCst), 1);

        let quote = wizard.quote();
        assert_eq!(quote.target_currency, "EUR");
        assert_eq!(quote.conversion_rate, dec!(0.92));
        assert_eq!(quote.total, dec!(92)); // 100 × 1h × 0.92
    }

    // ── Meeting link ──

    #[tokio::test]
    async fn test_link_provisioned_once_per_kind() {
        let env = TestEnv::new(MockProvisioner::ok());
        let mut wizard = env.wizard(None);
        fill_draft(&mut wizard);

        wizard.provision_meeting().await.unwrap();
        wizard.provision_meeting().await.unwrap(); // cached
        assert_eq!(env.provisioner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_kind_change_clears_and_reprovisions() {
        let env = TestEnv::new(MockProvisioner::ok());
        let mut wizard = env.wizard(None);
        fill_draft(&mut wizard);

        wizard.provision_meeting().await.unwrap();
        assert!(wizard.draft().meeting_link.is_set());

        wizard.set_meeting_kind(MeetingKind::Zoom).unwrap();
        assert_eq!(wizard.draft().meeting_link, MeetingLinkState::Unprovisioned);

        let link = wizard.provision_meeting().await.unwrap();
        assert_eq!(link.url(), Some("https://zoom.us/j/123456789"));
        assert_eq!(env.provisioner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_in_person_never_carries_link() {
        let env = TestEnv::new(MockProvisioner::ok());
        let mut wizard = env.wizard(None);
        fill_draft(&mut wizard);
        wizard.set_meeting_kind(MeetingKind::InPerson).unwrap();

        wizard.provision_meeting().await.unwrap();
        wizard.advance_to_payment().await.unwrap();
        let booking = wizard.capture_succeeded().await.unwrap();

        assert_eq!(booking.draft.meeting_link, MeetingLinkState::Unprovisioned);
        assert_eq!(env.provisioner.calls.load(Ordering::SeqCst), 0);
    }

    // ── Capture & confirmation ──

    #[tokio::test]
    async fn test_provisioning_timeout_still_confirms_with_fallback() {
        let env = TestEnv::new(MockProvisioner::hanging());
        let mut wizard = env.wizard(None);
        fill_draft(&mut wizard);
        wizard.advance_to_payment().await.unwrap();

        let booking = wizard.capture_succeeded().await.unwrap();
        assert_eq!(wizard.state(), WizardState::Confirmed);
        match &booking.draft.meeting_link {
            MeetingLinkState::Fallback(url) => assert!(!url.is_empty()),
            other => panic!("expected fallback link, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_persistence_failure_keeps_confirmed() {
        let env = TestEnv::new(MockProvisioner::ok());
        env.backend.save_fails.store(true, Ordering::SeqCst);
        let mut wizard = env.wizard(None);
        fill_draft(&mut wizard);
        wizard.advance_to_payment().await.unwrap();

        let result = wizard.capture_succeeded().await;
        assert!(result.is_ok());
        assert_eq!(wizard.state(), WizardState::Confirmed);

        drain_dispatch().await;
        assert_eq!(env.backend.saves.load(Ordering::SeqCst), 1); // attempted, logged
        // notification still went out with the session summary
        assert_eq!(env.backend.notes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_confirmation_email_carries_meeting_link() {
        let env = TestEnv::new(MockProvisioner::ok());
        let mut wizard = env.wizard(None);
        fill_draft(&mut wizard);
        wizard.advance_to_payment().await.unwrap();
        let booking = wizard.capture_succeeded().await.unwrap();

        drain_dispatch().await;
        let notes = env.backend.notes.lock().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].meeting_link.as_deref(), booking.draft.meeting_link.url());
        assert_eq!(notes[0].amount, dec!(100.00));
    }

    #[tokio::test]
    async fn test_capture_amount_matches_authorization() {
        let env = TestEnv::new(MockProvisioner::ok());
        let mut wizard = env.wizard(None);
        fill_draft(&mut wizard);
        wizard.set_duration(SessionDuration::Min120).unwrap();
        let auth = wizard.advance_to_payment().await.unwrap();

        let booking = wizard.capture_succeeded().await.unwrap();
        assert_eq!(booking.amount_charged, auth.amount);
        assert_eq!(booking.authorization_handle, auth.handle);
    }

    #[tokio::test]
    async fn test_reset_begins_fresh_attempt() {
        let env = TestEnv::new(MockProvisioner::ok());
        let mut wizard = env.wizard(None);
        fill_draft(&mut wizard);
        wizard.advance_to_payment().await.unwrap();
        wizard.capture_succeeded().await.unwrap();

        wizard.reset();
        assert_eq!(wizard.state(), WizardState::Details);
        assert!(wizard.draft().date.is_none());
        assert!(wizard.draft().topic.is_empty());
        assert!(wizard.authorization().is_none());
        assert_eq!(wizard.quote().total, dec!(100)); // back to the 60-min default
    }

    #[tokio::test]
    async fn test_confirmed_is_terminal() {
        let env = TestEnv::new(MockProvisioner::ok());
        let mut wizard = env.wizard(None);
        fill_draft(&mut wizard);
        wizard.advance_to_payment().await.unwrap();
        wizard.capture_succeeded().await.unwrap();

        assert!(matches!(
            wizard.advance_to_payment().await.unwrap_err(),
            BookingError::InvalidTransition(_)
        ));
        assert!(matches!(
            wizard.back_to_details().unwrap_err(),
            BookingError::InvalidTransition(_)
        ));
        assert!(matches!(
            wizard.capture_succeeded().await.unwrap_err(),
            BookingError::InvalidTransition(_)
        ));
    }
}
