use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Duration;

use crate::models::{Quote, SessionDuration};
use crate::ports::ExchangeRates;

// ── Quote computation ──

/// Build a quote from a mentor's hourly rate and the chosen duration.
///
/// Pure and idempotent: identical inputs yield an identical `Quote`.
/// `conversion` is the already-resolved `(target_currency, rate)` context;
/// `None` means no conversion applies and the quote stays in the source
/// currency. The total is left unrounded; `Quote::display_total()` rounds
/// once, at display/charge time.
pub fn compute_quote(
    hourly_rate: Decimal,
    source_currency: &str,
    duration: SessionDuration,
    conversion: Option<(&str, Decimal)>,
) -> Quote {
    let (target_currency, conversion_rate) = match conversion {
        Some((currency, rate)) => (currency.to_string(), rate),
        None => (source_currency.to_string(), dec!(1)),
    };

    let hours = Decimal::from(duration.minutes()) / dec!(60);
    let total = hourly_rate * hours * conversion_rate;

    Quote {
        hourly_source_amount: hourly_rate,
        source_currency: source_currency.to_string(),
        target_currency,
        conversion_rate,
        total,
    }
}

// ── Conversion-rate resolution ──

/// Resolve the learner's display currency and conversion rate, once per
/// attempt. Pricing must never block or error out the booking flow, so any
/// failure (unknown country, lookup error, timeout, nonsense rate) degrades
/// to source-currency display at rate 1.0.
pub async fn resolve_conversion(
    rates: &dyn ExchangeRates,
    source_currency: &str,
    country: Option<&str>,
    timeout: Duration,
) -> (String, Decimal) {
    let source = (source_currency.to_string(), dec!(1));

    let target = match country.and_then(currency_for_country) {
        Some(currency) if currency != source_currency => currency,
        _ => return source,
    };

    match tokio::time::timeout(timeout, rates.rate(source_currency, target)).await {
        Ok(Ok(rate)) if rate > dec!(0) => (target.to_string(), rate),
        Ok(Ok(rate)) => {
            tracing::warn!("ignoring non-positive conversion rate {} for {}", rate, target);
            source
        }
        Ok(Err(e)) => {
            tracing::warn!("conversion lookup {}→{} failed: {}", source_currency, target, e);
            source
        }
        Err(_) => {
            tracing::warn!("conversion lookup {}→{} timed out", source_currency, target);
            source
        }
    }
}

/// Display currency for a learner's country (ISO 3166 alpha-2).
/// Unlisted countries fall back to the mentor's source currency.
pub fn currency_for_country(country: &str) -> Option<&'static str> {
    let code = match country.to_ascii_uppercase().as_str() {
        "US" => "USD",
        "GB" => "GBP",
        "CA" => "CAD",
        "AU" => "AUD",
        "IN" => "INR",
        "JP" => "JPY",
        "BR" => "BRL",
        "CH" => "CHF",
        "SE" => "SEK",
        "NO" => "NOK",
        "DK" => "DKK",
        "PL" => "PLN",
        "NG" => "NGN",
        "KE" => "KES",
        "ZA" => "ZAR",
        "MX" => "MXN",
        "AT" | "BE" | "DE" | "ES" | "FI" | "FR" | "GR" | "IE" | "IT" | "NL" | "PT" => "EUR",
        _ => return None,
    };
    Some(code)
}
