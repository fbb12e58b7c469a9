use crate::config::ElevenLabsConfig;
use crate::error::VoiceError;
use serde_json::Value;

/// Issues signed WebSocket URLs for the conversational voice agent.
#[derive(Debug, Clone)]
pub struct ConversationService {
    config: ElevenLabsConfig,
    http: reqwest::Client,
}

impl ConversationService {
    pub fn new(config: ElevenLabsConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.api_key().is_some()
    }

    /// Picks the agent to issue a URL for: the caller's choice if non-blank,
    /// otherwise the configured default.
    pub fn resolve_agent_id<'a>(&'a self, requested: Option<&'a str>) -> Option<&'a str> {
        requested
            .filter(|id| !id.trim().is_empty())
            .or_else(|| self.config.agent_id.as_deref().filter(|id| !id.trim().is_empty()))
    }

    /// Requests a signed conversation URL from ElevenLabs.
    ///
    /// The API key is checked before the agent id so that a misconfigured
    /// deployment reports the key problem first.
    pub async fn signed_url(&self, requested_agent: Option<&str>) -> Result<String, VoiceError> {
        let api_key = self.config.api_key().ok_or(VoiceError::MissingApiKey)?;
        let agent_id = self
            .resolve_agent_id(requested_agent)
            .ok_or(VoiceError::MissingAgentId)?;

        let resp = self
            .http
            .get(self.config.endpoint("/v1/convai/conversation/get-signed-url"))
            .query(&[("agent_id", agent_id)])
            .header("xi-api-key", api_key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), agent_id, "signed url request rejected upstream");
            return Err(VoiceError::Upstream {
                status: status.as_u16(),
                detail,
            });
        }

        let body: Value = resp.json().await?;
        extract_signed_url(&body)
            .ok_or_else(|| VoiceError::InvalidResponse("missing signed_url".to_string()))
    }
}

/// Reads the signed URL out of an upstream response body.
///
/// `signed_url` wins when present and non-null; `signedUrl` is only
/// consulted when `signed_url` is absent or null. The value must be a string.
pub fn extract_signed_url(body: &Value) -> Option<String> {
    let value = match body.get("signed_url") {
        Some(v) if !v.is_null() => v,
        _ => body.get("signedUrl")?,
    };
    value.as_str().map(str::to_string)
}
