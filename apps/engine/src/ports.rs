use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::models::{
    ConfirmationRequest, ConfirmedBooking, MeetingKind, PaymentConfig, PaymentIntentRequest,
    SessionSummary,
};

/// Payment processor collaborator: widget bootstrap + intent creation.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn payment_config(&self) -> anyhow::Result<PaymentConfig>;

    /// Returns the opaque authorization handle for a freshly sized intent.
    async fn create_intent(&self, req: &PaymentIntentRequest) -> anyhow::Result<String>;
}

/// Meeting provisioning collaborator. Returns a joinable URL or fails;
/// callers translate failure into the fallback link, never into a blocked
/// flow.
#[async_trait]
pub trait MeetingProvisioner: Send + Sync {
    async fn provision(&self, kind: MeetingKind, session: &SessionSummary)
        -> anyhow::Result<String>;
}

/// Persistence + notification collaborator. Both calls are best-effort
/// after capture; errors are logged by the confirmation pipeline.
#[async_trait]
pub trait BookingBackend: Send + Sync {
    async fn save_booking(&self, booking: &ConfirmedBooking) -> anyhow::Result<()>;
    async fn send_confirmation(&self, req: &ConfirmationRequest) -> anyhow::Result<()>;
}

/// Conversion-rate lookup for learner-local currency display.
#[async_trait]
pub trait ExchangeRates: Send + Sync {
    async fn rate(&self, from: &str, to: &str) -> anyhow::Result<Decimal>;
}
