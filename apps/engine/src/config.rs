use std::time::Duration;

/// Engine configuration, read from the environment with sensible defaults.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the booking API (payment-config, create-payment-intent,
    /// provision-meeting, save-booking, send-confirmation).
    pub api_base_url: String,
    /// Base URL of the exchange-rate service.
    pub rates_base_url: String,
    /// Per-request timeout for the underlying HTTP client.
    pub http_timeout: Duration,
    /// Bound on a single meeting-provisioning attempt before falling back.
    pub provisioning_timeout: Duration,
    /// Bound on the one-shot conversion-rate lookup.
    pub rates_timeout: Duration,
}

/// Meeting provisioning fallback fires after this many seconds by default.
const DEFAULT_PROVISIONING_TIMEOUT_SECS: u64 = 5;
/// Conversion lookup is cosmetic; keep its budget short.
const DEFAULT_RATES_TIMEOUT_SECS: u64 = 3;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

impl EngineConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_base_url = std::env::var("BOOKING_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000/api".into());
        let rates_base_url = std::env::var("EXCHANGE_RATES_URL")
            .unwrap_or_else(|_| "https://open.er-api.com/v6".into());

        Self {
            api_base_url,
            rates_base_url,
            http_timeout: Duration::from_secs(env_secs(
                "HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )),
            provisioning_timeout: Duration::from_secs(env_secs(
                "PROVISIONING_TIMEOUT_SECS",
                DEFAULT_PROVISIONING_TIMEOUT_SECS,
            )),
            rates_timeout: Duration::from_secs(env_secs(
                "RATES_TIMEOUT_SECS",
                DEFAULT_RATES_TIMEOUT_SECS,
            )),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/api".into(),
            rates_base_url: "https://open.er-api.com/v6".into(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            provisioning_timeout: Duration::from_secs(DEFAULT_PROVISIONING_TIMEOUT_SECS),
            rates_timeout: Duration::from_secs(DEFAULT_RATES_TIMEOUT_SECS),
        }
    }
}

fn env_secs(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("{} is not a number ({}), using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
