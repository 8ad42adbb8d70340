use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

use crate::ports::ExchangeRates;

/// Exchange-rate client (open.er-api.com response shape).
pub struct HttpExchangeRates {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: HashMap<String, Decimal>,
}

impl HttpExchangeRates {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ExchangeRates for HttpExchangeRates {
    async fn rate(&self, from: &str, to: &str) -> anyhow::Result<Decimal> {
        let resp = self
            .client
            .get(format!("{}/latest/{}", self.base_url, from))
            .send()
            .await?;

        if !resp.status().is_success() {
            anyhow::bail!("rate lookup error: {}", resp.status());
        }

        let body: RatesResponse = resp.json().await?;
        body.rates
            .get(to)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("no rate published for {}", to))
    }
}
