use async_trait::async_trait;
use serde::Deserialize;

use crate::models::{PaymentConfig, PaymentIntentRequest};
use crate::ports::PaymentProcessor;

/// Payment processor client for the booking API's payment endpoints.
pub struct HttpPaymentProcessor {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateIntentResponse {
    authorization_handle: String,
}

impl HttpPaymentProcessor {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PaymentProcessor for HttpPaymentProcessor {
    async fn payment_config(&self) -> anyhow::Result<PaymentConfig> {
        let resp = self
            .client
            .get(format!("{}/payment-config", self.base_url))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            tracing::error!("payment-config fetch failed: {} - {}", status, text);
            anyhow::bail!("payment-config error: {}", status);
        }

        Ok(resp.json::<PaymentConfig>().await?)
    }

    async fn create_intent(&self, req: &PaymentIntentRequest) -> anyhow::Result<String> {
        let resp = self
            .client
            .post(format!("{}/create-payment-intent", self.base_url))
            .json(req)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            tracing::error!("payment intent creation failed: {} - {}", status, text);
            anyhow::bail!("payment processor error: {}", status);
        }

        let body: CreateIntentResponse = resp.json().await?;
        if body.authorization_handle.is_empty() {
            anyhow::bail!("payment processor returned an empty authorization handle");
        }

        tracing::info!("payment intent created: {}", body.authorization_handle);
        Ok(body.authorization_handle)
    }
}
