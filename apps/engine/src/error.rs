use thiserror::Error;

/// Errors a presentation shell can see before capture. Post-capture
/// failures are deliberately absent: once money has moved they are logged
/// and reconciled out-of-band, never surfaced as a user-facing error.
#[derive(Debug, Error)]
pub enum BookingError {
    /// A required draft field is missing or empty. Blocks the
    /// `Details → Payment` transition; shown inline, retry allowed.
    #[error("validation failed: {0}")]
    Validation(&'static str),

    /// The payment processor rejected or failed the authorization
    /// request. The wizard stays in `Details`; retry allowed.
    #[error("payment authorization failed: {0}")]
    Authorization(String),

    /// The shell drove the wizard through an illegal transition.
    #[error("invalid wizard transition: {0}")]
    InvalidTransition(&'static str),
}
