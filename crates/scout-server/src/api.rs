//! Shared API plumbing: the error type, JSON body parsing and upstream
//! pass-through responses.

use axum::{
    body::Bytes,
    extract::Json,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use scout_intel::IntelError;
use scout_voice::VoiceError;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;

/// API error type mapping to HTTP status codes.
///
/// Every variant renders as `{"error": message}`; [`ApiError::Upstream`]
/// adds the upstream response text as `detail`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("upstream error: {detail}")]
    Upstream { detail: String },
    #[error("bad gateway: {0}")]
    BadGateway(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                json!({ "error": "Method not allowed" }),
            ),
            ApiError::Upstream { detail } => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": "Upstream error", "detail": detail }),
            ),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, json!({ "error": msg })),
            ApiError::InternalServerError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<VoiceError> for ApiError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::MissingAgentId => ApiError::BadRequest(err.to_string()),
            VoiceError::InvalidInput(msg) => ApiError::BadRequest(msg),
            VoiceError::Upstream { status, detail } => {
                tracing::warn!(status, "voice upstream returned an error");
                ApiError::Upstream { detail }
            }
            VoiceError::InvalidResponse(_) => ApiError::BadGateway(err.to_string()),
            VoiceError::MissingApiKey | VoiceError::Transport(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<IntelError> for ApiError {
    fn from(err: IntelError) -> Self {
        match err {
            IntelError::TeamNotFound(team) => {
                ApiError::NotFound(format!("could not find team: {team}"))
            }
            IntelError::InvalidRange(msg) => ApiError::BadRequest(msg),
            IntelError::Http(_) | IntelError::Upstream { .. } => {
                tracing::warn!(error = %err, "intel upstream failed");
                ApiError::BadGateway(err.to_string())
            }
        }
    }
}

/// Parses a request body as JSON. An empty or whitespace-only body is `{}`.
pub fn parse_json_body(body: &Bytes) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(json!({}));
    }
    serde_json::from_slice(body).map_err(|_| ApiError::BadRequest("Invalid JSON body".to_string()))
}

/// Parses a request body into `T`, with the same empty-body rule as
/// [`parse_json_body`]. Shape errors (missing fields, wrong types) are `400`.
pub fn parse_request<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    let value = parse_json_body(body)?;
    serde_json::from_value(value).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// An upstream response passed through to the caller unchanged.
#[derive(Debug)]
pub struct RelayedResponse {
    pub status: StatusCode,
    pub content_type: String,
    pub body: Bytes,
}

impl RelayedResponse {
    /// Buffers an upstream response. A missing content type becomes
    /// `application/json`.
    pub async fn from_upstream(resp: reqwest::Response) -> Result<Self, ApiError> {
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/json")
            .to_string();
        let body = resp
            .bytes()
            .await
            .map_err(|e| ApiError::InternalServerError(e.to_string()))?;
        Ok(Self {
            status,
            content_type,
            body,
        })
    }
}

impl IntoResponse for RelayedResponse {
    fn into_response(self) -> Response {
        let content_type = HeaderValue::from_str(&self.content_type)
            .unwrap_or(HeaderValue::from_static("application/json"));
        (self.status, [(header::CONTENT_TYPE, content_type)], self.body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct TeamRequest {
        team: String,
        #[serde(default)]
        days_back: Option<u32>,
    }

    #[test]
    fn empty_body_is_an_empty_object() {
        assert_eq!(parse_json_body(&Bytes::from_static(b"")).unwrap(), json!({}));
        assert_eq!(parse_json_body(&Bytes::from_static(b" \n")).unwrap(), json!({}));
    }

    #[test]
    fn malformed_body_is_bad_request() {
        let err = parse_json_body(&Bytes::from_static(b"{not json")).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg == "Invalid JSON body"));
    }

    #[test]
    fn missing_field_is_bad_request() {
        let err = parse_request::<TeamRequest>(&Bytes::from_static(b"{}")).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(msg) if msg.contains("team")));

        let ok: TeamRequest =
            parse_request(&Bytes::from_static(br#"{"team":"Cubs","days_back":3}"#)).unwrap();
        assert_eq!(ok.team, "Cubs");
        assert_eq!(ok.days_back, Some(3));
    }

    #[test]
    fn voice_errors_map_to_statuses() {
        let cases = [
            (VoiceError::MissingApiKey, StatusCode::INTERNAL_SERVER_ERROR),
            (VoiceError::MissingAgentId, StatusCode::BAD_REQUEST),
            (
                VoiceError::InvalidInput("Missing text".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                VoiceError::Upstream {
                    status: 401,
                    detail: "bad key".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                VoiceError::InvalidResponse("missing signed_url".into()),
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn team_not_found_is_404() {
        let response = ApiError::from(IntelError::TeamNotFound("Nowhere".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_range_is_400() {
        let response =
            ApiError::from(IntelError::InvalidRange("days_back 9 is too large".into()))
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
