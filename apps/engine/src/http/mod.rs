//! `reqwest`-backed implementations of the collaborator ports, one file
//! per external service. All of them speak camelCase JSON and treat any
//! non-2xx status as an error with the response body in the log.

mod backend;
mod payments;
mod provisioning;
mod rates;

pub use backend::HttpBookingBackend;
pub use payments::HttpPaymentProcessor;
pub use provisioning::HttpMeetingProvisioner;
pub use rates::HttpExchangeRates;

use std::time::Duration;

/// Shared client builder so every collaborator carries the same timeout.
pub fn http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(Into::into)
}
