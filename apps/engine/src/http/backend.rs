use async_trait::async_trait;

use crate::models::{ConfirmationRequest, ConfirmedBooking};
use crate::ports::BookingBackend;

/// Persistence + notification client. Both endpoints are called after
/// capture, so callers treat errors as operational alerts only.
pub struct HttpBookingBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBookingBackend {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl BookingBackend for HttpBookingBackend {
    async fn save_booking(&self, booking: &ConfirmedBooking) -> anyhow::Result<()> {
        let resp = self
            .client
            .post(format!("{}/save-booking", self.base_url))
            .json(booking)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("save-booking error: {} - {}", status, text);
        }
        Ok(())
    }

    async fn send_confirmation(&self, req: &ConfirmationRequest) -> anyhow::Result<()> {
        let resp = self
            .client
            .post(format!("{}/send-confirmation", self.base_url))
            .json(req)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("send-confirmation error: {} - {}", status, text);
        }
        Ok(())
    }
}
