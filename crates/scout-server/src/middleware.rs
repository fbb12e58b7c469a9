use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::ApiError;
use crate::AppState;

/// Header carrying the shared tool-backend secret.
pub const TOOL_TOKEN_HEADER: &str = "x-tool-token";

/// CORS headers attached to every response of one gateway function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorsPolicy {
    pub allow_methods: &'static str,
    pub allow_headers: &'static str,
    /// Adds `Cache-Control: no-store` when set.
    pub no_store: bool,
}

pub const SIGNED_URL_CORS: CorsPolicy = CorsPolicy {
    allow_methods: "GET, OPTIONS",
    allow_headers: "Content-Type, Authorization",
    no_store: true,
};

pub const CHAT_CORS: CorsPolicy = CorsPolicy {
    allow_methods: "POST, OPTIONS",
    allow_headers: "Content-Type, Authorization",
    no_store: false,
};

pub const TTS_CORS: CorsPolicy = CHAT_CORS;

pub const TOOL_PROXY_CORS: CorsPolicy = CorsPolicy {
    allow_methods: "POST, OPTIONS",
    allow_headers: "Content-Type, Authorization, x-tool-token",
    no_store: true,
};

impl CorsPolicy {
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(self.allow_headers),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(self.allow_methods),
        );
        if self.no_store {
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        }
    }
}

/// Per-function CORS handling for the gateway.
///
/// `OPTIONS` is answered here with `200` and an empty body before the
/// handler runs. Every other response, errors included, gets the policy's
/// headers on the way out.
pub async fn function_cors(
    State(policy): State<CorsPolicy>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if req.method() == Method::OPTIONS {
        let mut response = StatusCode::OK.into_response();
        policy.apply(response.headers_mut());
        return response;
    }

    let mut response = next.run(req).await;
    policy.apply(response.headers_mut());
    response
}

/// Method fallback for gateway functions.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Requires a matching `x-tool-token` header on tool routes when a token is
/// configured. With no token configured every request passes.
pub async fn tool_token_middleware(req: Request<Body>, next: Next) -> Result<Response, ApiError> {
    let state = req
        .extensions()
        .get::<Arc<AppState>>()
        .ok_or_else(|| ApiError::InternalServerError("app state missing".to_string()))?
        .clone();

    if let Some(expected) = state.tools.token() {
        let presented = req
            .headers()
            .get(TOOL_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());
        if presented != Some(expected) {
            tracing::warn!(path = %req.uri().path(), "rejected tool request with bad token");
            return Err(ApiError::Unauthorized(
                "invalid or missing tool token".to_string(),
            ));
        }
    }

    Ok(next.run(req).await)
}
