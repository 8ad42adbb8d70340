use sha2::{Digest, Sha256};
use std::time::Duration;

use crate::models::{MeetingKind, MeetingLinkState, SessionSummary};
use crate::ports::MeetingProvisioner;

// ── Link resolution ──

/// Obtain a join link for the session, bounded by `timeout`.
///
/// In-person sessions return `Unprovisioned` without any call. For
/// call-based kinds, a provider failure of any shape (timeout, non-2xx,
/// malformed response) degrades to a synthesized `Fallback` link so that a
/// provider outage never blocks the booking from completing. Callers only
/// invoke this while the draft link is still `Unprovisioned`; a change of
/// meeting kind clears the cached link first (wizard-enforced).
pub async fn resolve_meeting_link(
    provisioner: &dyn MeetingProvisioner,
    kind: MeetingKind,
    session: &SessionSummary,
    timeout: Duration,
) -> MeetingLinkState {
    if !kind.needs_link() {
        return MeetingLinkState::Unprovisioned;
    }

    match tokio::time::timeout(timeout, provisioner.provision(kind, session)).await {
        Ok(Ok(url)) => {
            tracing::info!("meeting provisioned for mentor {}: {}", session.mentor_id, url);
            MeetingLinkState::Provisioned(url)
        }
        Ok(Err(e)) => {
            tracing::warn!("meeting provisioning failed, using fallback link: {}", e);
            MeetingLinkState::Fallback(fallback_link(kind, session))
        }
        Err(_) => {
            tracing::warn!(
                "meeting provisioning timed out after {:?}, using fallback link",
                timeout
            );
            MeetingLinkState::Fallback(fallback_link(kind, session))
        }
    }
}

// ── Fallback synthesis ──

/// Placeholder join URL with a session token in a kind-specific template.
/// The token is derived from the session fields, so retrying the same draft
/// yields the same link instead of churning new ones.
///
/// Panics if called for `InPerson`; those drafts never carry a link.
pub fn fallback_link(kind: MeetingKind, session: &SessionSummary) -> String {
    let token = session_token(kind, session);
    match kind {
        MeetingKind::GoogleMeet => format!("https://meet.google.com/lookup/{}", token),
        MeetingKind::Zoom => format!("https://zoom.us/wc/join/{}", token),
        MeetingKind::InPerson => unreachable!("in-person sessions never carry a link"),
    }
}

fn session_token(kind: MeetingKind, session: &SessionSummary) -> String {
    let mut hasher = Sha256::new();
    hasher.update(match kind {
        MeetingKind::GoogleMeet => b"google-meet".as_slice(),
        MeetingKind::Zoom => b"zoom".as_slice(),
        MeetingKind::InPerson => b"in-person".as_slice(),
    });
    hasher.update(session.mentor_id.as_bytes());
    hasher.update(session.date.to_string().as_bytes());
    hasher.update(session.time.to_string().as_bytes());
    hasher.update(session.topic.as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..6])
}
