//! Scout server library logic.
//!
//! One binary serves two route groups, selected by [`ServerRole`]:
//!
//! - the **gateway**: browser-facing relays that attach server-side API keys
//!   (`/api/eleven-signed-url`, `/api/chat`, `/api/tts`) and the tool proxy
//!   (`/api/tools/{operation}`);
//! - the **backend**: `/health` and the sports-intel tools under
//!   `/tools/{operation}`.

pub mod api;
pub mod api_chat;
pub mod api_proxy;
pub mod api_tools;
pub mod api_voice;
pub mod config;
pub mod middleware;

use api_chat::ChatRelay;
use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, MethodRouter},
    Extension, Json, Router,
};
use config::{Config, ServerRole, ToolsConfig};
use middleware::{
    function_cors, method_not_allowed, CorsPolicy, CHAT_CORS, SIGNED_URL_CORS, TOOL_PROXY_CORS,
    TTS_CORS,
};
use scout_intel::{IntelService, MlbClient, NewsClient, YoutubeClient};
use scout_voice::{ConversationService, TtsService};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Maximum request body size (1 MiB).
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Prefixes the gateway functions are mounted under. The second keeps
/// clients written against the hosted function paths working.
const FUNCTION_PREFIXES: [&str; 2] = ["/api", "/.netlify/functions"];

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Outbound HTTP client shared by every relay and data source.
    pub http: reqwest::Client,
    /// Tool proxy target and shared token.
    pub tools: ToolsConfig,
    /// ElevenLabs conversation signed-URL issuer.
    pub conversation: Arc<ConversationService>,
    /// ElevenLabs text-to-speech.
    pub tts: Arc<TtsService>,
    /// Chat-completion relay.
    pub chat: Arc<ChatRelay>,
    /// News and video aggregation.
    pub intel: Arc<IntelService>,
    /// MLB Stats API client with its cached team list.
    pub mlb: Arc<MlbClient>,
}

impl AppState {
    /// Builds every service from `config`, sharing one HTTP client.
    ///
    /// Fails only when the HTTP client cannot be built (for example, no
    /// usable TLS backend).
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let http = build_http_client(config.server.upstream_timeout())?;
        let intel = &config.intel;

        Ok(Self {
            tools: config.tools.clone(),
            conversation: Arc::new(ConversationService::new(
                config.elevenlabs.clone(),
                http.clone(),
            )),
            tts: Arc::new(TtsService::new(config.elevenlabs.clone(), http.clone())),
            chat: Arc::new(ChatRelay::new(config.chat.clone(), http.clone())),
            intel: Arc::new(IntelService::new(
                NewsClient::new(
                    http.clone(),
                    &intel.news_base_url,
                    intel.news_api_key.clone(),
                ),
                YoutubeClient::new(
                    http.clone(),
                    &intel.youtube_base_url,
                    intel.youtube_api_key.clone(),
                ),
            )),
            mlb: Arc::new(MlbClient::new(http.clone(), &intel.mlb_base_url)),
            http,
        })
    }
}

/// Builds the shared outbound client (rustls, fixed timeout).
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("scout-server/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Health check handler.
///
/// Returns `200 OK` with server status and version.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Wraps a gateway function with its CORS policy and the JSON 405 fallback.
fn function(route: MethodRouter, policy: CorsPolicy) -> MethodRouter {
    route
        .fallback(method_not_allowed)
        .layer(from_fn_with_state(policy, function_cors))
}

fn gateway_routes() -> Router {
    let mut router = Router::new();
    for prefix in FUNCTION_PREFIXES {
        router = router
            .route(
                &format!("{prefix}/eleven-signed-url"),
                function(get(api_voice::signed_url_handler), SIGNED_URL_CORS),
            )
            .route(
                &format!("{prefix}/chat"),
                function(post(api_chat::chat_handler), CHAT_CORS),
            )
            .route(
                &format!("{prefix}/tts"),
                function(post(api_voice::tts_handler), TTS_CORS),
            );
    }
    router.route(
        "/api/tools/{operation}",
        function(post(api_proxy::tool_proxy_handler), TOOL_PROXY_CORS),
    )
}

fn backend_routes() -> Router {
    let tools = Router::new()
        .route("/tools/{operation}", post(api_tools::tool_handler))
        .route_layer(from_fn(middleware::tool_token_middleware));

    Router::new()
        .route("/health", get(health))
        .merge(tools)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Builds the application router for `role`.
pub fn app(state: AppState, role: ServerRole) -> Router {
    let mut router = Router::new();
    if role.serves_gateway() {
        router = router.merge(gateway_routes());
    }
    if role.serves_backend() {
        router = router.merge(backend_routes());
    }

    router
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}
