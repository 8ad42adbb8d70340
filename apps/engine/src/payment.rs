use crate::error::BookingError;
use crate::models::{
    format_amount, BookingDraft, LearnerIdentity, MentorProfile, PaymentAuthorization,
    PaymentConfig, PaymentIntentRequest, PaymentMetadata, Quote,
};
use crate::ports::PaymentProcessor;

/// Fetch the processor's publishable key for the collection widget.
pub async fn payment_config(
    processor: &dyn PaymentProcessor,
) -> Result<PaymentConfig, BookingError> {
    processor
        .payment_config()
        .await
        .map_err(|e| BookingError::Authorization(e.to_string()))
}

/// Request an authorization sized to the current quote.
///
/// The amount sent is always the freshly computed `display_total()` —
/// never a stale or client-supplied figure. Reconciliation metadata
/// (mentor, date, time, topic) rides along so the processor side can match
/// charges to sessions. Processor failure maps to
/// `BookingError::Authorization` and the caller stays in `Details`.
pub async fn authorize(
    processor: &dyn PaymentProcessor,
    quote: &Quote,
    draft: &BookingDraft,
    mentor: &MentorProfile,
    learner: &LearnerIdentity,
) -> Result<PaymentAuthorization, BookingError> {
    let session = draft
        .session_summary()
        .ok_or(BookingError::Validation("draft is incomplete"))?;

    let amount = quote.display_total();
    let metadata = PaymentMetadata {
        mentor_id: mentor.id.clone(),
        session_date: session.date,
        session_time: session.time,
        topic: session.topic.clone(),
    };

    let req = PaymentIntentRequest {
        amount,
        currency: quote.target_currency.clone(),
        description: format!(
            "Mentor session with {} on {} ({} min)",
            mentor.display_name, session.date, session.duration_minutes
        ),
        metadata: metadata.clone(),
    };

    let handle = processor.create_intent(&req).await.map_err(|e| {
        tracing::error!(
            "payment intent creation failed for mentor {} / learner {}: {}",
            mentor.id,
            learner.id,
            e
        );
        BookingError::Authorization(e.to_string())
    })?;

    tracing::info!(
        "payment authorized: handle={}, amount={}",
        handle,
        format_amount(amount, &quote.target_currency)
    );

    Ok(PaymentAuthorization {
        handle,
        amount,
        currency: quote.target_currency.clone(),
        metadata,
    })
}
