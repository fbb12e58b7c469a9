//! Chat-completion relay to an OpenRouter-compatible API.

use crate::api::{parse_json_body, ApiError, RelayedResponse};
use crate::config::ChatConfig;
use crate::AppState;
use axum::{body::Bytes, extract::Extension};
use serde_json::Value;
use std::sync::Arc;

/// Forwards chat-completion requests with the server-side API key.
#[derive(Debug, Clone)]
pub struct ChatRelay {
    config: ChatConfig,
    http: reqwest::Client,
}

impl ChatRelay {
    pub fn new(config: ChatConfig, http: reqwest::Client) -> Self {
        if config.api_key().is_none() {
            tracing::warn!("OPENROUTER_API_KEY not set; /api/chat will answer 500");
        }
        Self { config, http }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.api_key().is_some()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base_url.trim_end_matches('/')
        )
    }

    /// Sends `payload` upstream, adding the default model if none is named.
    pub async fn forward(&self, mut payload: Value) -> Result<RelayedResponse, ApiError> {
        let api_key = self.config.api_key().ok_or_else(|| {
            ApiError::InternalServerError(
                "OPENROUTER_API_KEY not configured in environment".to_string(),
            )
        })?;

        let obj = payload.as_object_mut().ok_or_else(|| {
            ApiError::BadRequest("Request body must be a JSON object".to_string())
        })?;
        if obj.get("model").map_or(true, Value::is_null) {
            obj.insert(
                "model".to_string(),
                Value::String(self.config.default_model.clone()),
            );
        }

        let mut req = self.http.post(self.endpoint()).bearer_auth(api_key).json(&payload);
        if let Some(referer) = self.config.referer.as_deref() {
            req = req.header("HTTP-Referer", referer);
        }
        if let Some(title) = self.config.title.as_deref() {
            req = req.header("X-Title", title);
        }

        let resp = req.send().await.map_err(|e| {
            tracing::error!(error = %e, "chat upstream request failed");
            ApiError::InternalServerError(e.to_string())
        })?;
        tracing::debug!(status = %resp.status(), "chat upstream responded");
        RelayedResponse::from_upstream(resp).await
    }
}

/// Handler for `POST /api/chat`.
pub async fn chat_handler(
    Extension(state): Extension<Arc<AppState>>,
    body: Bytes,
) -> Result<RelayedResponse, ApiError> {
    let payload = parse_json_body(&body)?;
    state.chat.forward(payload).await
}
