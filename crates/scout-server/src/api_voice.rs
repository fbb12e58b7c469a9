//! ElevenLabs relays: conversation signed URLs and text-to-speech.

use crate::api::{parse_request, ApiError};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Extension, Json, Query},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Query for `GET /api/eleven-signed-url`. Both spellings are accepted.
#[derive(Debug, Default, Deserialize)]
pub struct SignedUrlQuery {
    pub agent_id: Option<String>,
    #[serde(rename = "agentId")]
    pub agent_id_camel: Option<String>,
}

impl SignedUrlQuery {
    fn requested_agent(&self) -> Option<&str> {
        [&self.agent_id, &self.agent_id_camel]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .find(|v| !v.trim().is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignedUrlResponse {
    #[serde(rename = "signedUrl")]
    pub signed_url: String,
}

/// Handler for `GET /api/eleven-signed-url`.
pub async fn signed_url_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<SignedUrlQuery>,
) -> Result<Json<SignedUrlResponse>, ApiError> {
    let signed_url = state
        .conversation
        .signed_url(query.requested_agent())
        .await?;
    Ok(Json(SignedUrlResponse { signed_url }))
}

/// Body for `POST /api/tts`.
#[derive(Debug, Default, Deserialize)]
pub struct TtsRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "voiceId", alias = "voice_id")]
    pub voice_id: Option<String>,
    #[serde(default, rename = "modelId", alias = "model_id")]
    pub model_id: Option<String>,
}

/// Handler for `POST /api/tts`. Responds with the raw audio bytes.
pub async fn tts_handler(
    Extension(state): Extension<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: TtsRequest = parse_request(&body)?;
    let audio = state
        .tts
        .synthesize(
            request.text.as_deref().unwrap_or_default(),
            request.voice_id.as_deref(),
            request.model_id.as_deref(),
        )
        .await?;

    let content_type = HeaderValue::from_str(&audio.content_type)
        .unwrap_or(HeaderValue::from_static("audio/mpeg"));
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type)],
        audio.bytes,
    )
        .into_response())
}
