use std::sync::Arc;

use crate::models::{ConfirmationRequest, ConfirmedBooking};
use crate::ports::BookingBackend;

/// Outcome of the post-capture dispatch, for out-of-band reconciliation.
/// A `false` here is an operational alert, never a user-facing failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub persisted: bool,
    pub notified: bool,
}

/// Persist the booking and request the confirmation notification.
///
/// Runs strictly after the wizard has entered `Confirmed` and the meeting
/// link has been resolved: money has already moved, so both steps are
/// best-effort. Failures are logged with enough detail for manual
/// recovery; nothing here can flip the wizard back out of `Confirmed`.
pub async fn dispatch(
    backend: Arc<dyn BookingBackend>,
    booking: ConfirmedBooking,
    note: ConfirmationRequest,
) -> DispatchReport {
    let persisted = match backend.save_booking(&booking).await {
        Ok(()) => {
            tracing::info!("booking {} persisted", booking.booking_id);
            true
        }
        Err(e) => {
            tracing::error!(
                "PAID BOOKING NOT PERSISTED: booking={}, authorization={}, amount={} {}: {}",
                booking.booking_id,
                booking.authorization_handle,
                booking.amount_charged,
                booking.currency,
                e
            );
            false
        }
    };

    let notified = match backend.send_confirmation(&note).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                "confirmation email to {} failed for booking {}: {}",
                note.learner_email,
                booking.booking_id,
                e
            );
            false
        }
    };

    DispatchReport { persisted, notified }
}
