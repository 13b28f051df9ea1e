//! ServiceDesk Plus REST client.

use std::time::Duration;

use alertdesk_core::ticket::TicketDraft;
use async_trait::async_trait;

use crate::error::DeskError;
use crate::models::{CreatedRequest, CreationEnvelope, CreationResponse};

/// Creates tickets in the service desk.
///
/// Implementations must only return `Ok` after the desk confirmed the
/// request with an id.
#[async_trait]
pub trait DeskClient: Send + Sync {
    async fn create_request(
        &self,
        template_id: i64,
        ticket: &TicketDraft,
    ) -> Result<CreatedRequest, DeskError>;
}

/// Connection settings for [`SdpClient`].
#[derive(Debug, Clone)]
pub struct SdpConfig {
    /// Base URL of the desk, e.g. `https://desk.example.com:8443`.
    pub base_url: String,
    pub api_version: String,
    /// Technician API key sent as the `authtoken` header.
    pub secret: String,
    pub timeout: Duration,
    pub verify_tls: bool,
    pub requester_id: i64,
    pub requester_name: String,
}

/// HTTP client for a single ServiceDesk Plus instance.
pub struct SdpClient {
    client: reqwest::Client,
    config: SdpConfig,
}

impl SdpClient {
    pub fn new(config: SdpConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;
        Ok(Self { client, config })
    }

    fn requests_url(&self) -> String {
        format!(
            "{}/api/{}/requests",
            self.config.base_url.trim_end_matches('/'),
            self.config.api_version
        )
    }
}

#[async_trait]
impl DeskClient for SdpClient {
    async fn create_request(
        &self,
        template_id: i64,
        ticket: &TicketDraft,
    ) -> Result<CreatedRequest, DeskError> {
        let envelope = CreationEnvelope::new(
            template_id,
            ticket,
            self.config.requester_id,
            &self.config.requester_name,
        );
        let input_data = serde_json::to_string(&envelope)
            .map_err(|e| DeskError::InvalidPayload(e.to_string()))?;

        tracing::debug!(template_id, subject = %ticket.subject, "Creating desk request");

        let response = self
            .client
            .post(self.requests_url())
            .header("authtoken", &self.config.secret)
            .header(reqwest::header::ACCEPT, "application/vnd.manageengine.sdp.v3+json")
            .form(&[("input_data", input_data)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeskError::Timeout(self.config.timeout)
                } else {
                    DeskError::Request(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeskError::from_status(status.as_u16(), body));
        }

        let body = response.text().await?;
        let parsed: CreationResponse = serde_json::from_str(&body)
            .map_err(|e| DeskError::BadResponse(format!("{e}: {body}")))?;
        let created = parsed
            .into_created()
            .ok_or_else(|| DeskError::BadResponse(format!("no request id in {body}")))?;

        tracing::info!(
            request_id = created.id,
            status = created.status.as_deref().unwrap_or("-"),
            "Desk request created",
        );
        Ok(created)
    }
}
