//! Gateway tool proxy: forwards `POST /api/tools/{operation}` to the tool
//! backend with the shared token attached.

use crate::api::{parse_json_body, ApiError, RelayedResponse};
use crate::middleware::TOOL_TOKEN_HEADER;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Extension, Path},
    http::HeaderMap,
};
use scout_types::ToolOperation;
use serde_json::Value;
use std::sync::Arc;

/// Picks the token to forward: body `tool_token`, then the caller's
/// `x-tool-token` header, then the configured token. Blank values are skipped.
pub fn resolve_tool_token<'a>(
    payload: &'a Value,
    headers: &'a HeaderMap,
    configured: Option<&'a str>,
) -> Option<&'a str> {
    let from_body = payload.get("tool_token").and_then(Value::as_str);
    let from_header = headers
        .get(TOOL_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());

    [from_body, from_header, configured]
        .into_iter()
        .flatten()
        .find(|t| !t.trim().is_empty())
}

/// Backend URL for `operation`.
pub fn tool_url(backend_base_url: &str, operation: ToolOperation) -> String {
    format!("{}/tools/{}", backend_base_url.trim_end_matches('/'), operation)
}

/// Handler for `POST /api/tools/{operation}`.
pub async fn tool_proxy_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(operation): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<RelayedResponse, ApiError> {
    let operation: ToolOperation = operation
        .parse()
        .map_err(|_| ApiError::NotFound(format!("Unknown tool: {operation}")))?;
    let payload = parse_json_body(&body)?;

    let url = tool_url(&state.tools.backend_base_url, operation);
    let mut req = state.http.post(&url).json(&payload);
    if let Some(token) = resolve_tool_token(&payload, &headers, state.tools.token()) {
        req = req.header(TOOL_TOKEN_HEADER, token);
    }

    tracing::debug!(%operation, %url, "forwarding tool call");
    let resp = req.send().await.map_err(|e| {
        tracing::error!(%operation, error = %e, "tool backend unreachable");
        ApiError::InternalServerError(e.to_string())
    })?;
    RelayedResponse::from_upstream(resp).await
}
