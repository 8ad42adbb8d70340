use async_trait::async_trait;
use serde::Serialize;

use crate::models::{MeetingKind, SessionSummary};
use crate::ports::MeetingProvisioner;

/// Meeting provisioning client. Failures here are expected to be absorbed
/// by the adapter's fallback path, never shown to the user.
pub struct HttpMeetingProvisioner {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProvisionRequest<'a> {
    meeting_kind: MeetingKind,
    session_metadata: &'a SessionSummary,
}

impl HttpMeetingProvisioner {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl MeetingProvisioner for HttpMeetingProvisioner {
    async fn provision(
        &self,
        kind: MeetingKind,
        session: &SessionSummary,
    ) -> anyhow::Result<String> {
        let resp = self
            .client
            .post(format!("{}/provision-meeting", self.base_url))
            .json(&ProvisionRequest {
                meeting_kind: kind,
                session_metadata: session,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            tracing::warn!("provision-meeting failed: {} - {}", status, text);
            anyhow::bail!("provisioning error: {}", status);
        }

        let body: serde_json::Value = resp.json().await?;
        let join_url = body["joinUrl"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("missing joinUrl in provisioning response"))?;

        // Reject malformed URLs here so the caller falls back instead of
        // persisting garbage.
        url::Url::parse(join_url)?;

        Ok(join_url.to_string())
    }
}
