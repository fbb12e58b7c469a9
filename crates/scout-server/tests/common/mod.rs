#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body, Bytes},
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use scout_server::{app, config::Config, AppState};
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

/// Nothing listens on the discard port, so requests fail fast.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Defaults with every upstream pointed at [`UNREACHABLE`] and no keys.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.elevenlabs.api_base_url = UNREACHABLE.to_string();
    config.chat.api_base_url = UNREACHABLE.to_string();
    config.tools.backend_base_url = UNREACHABLE.to_string();
    config.intel.news_base_url = UNREACHABLE.to_string();
    config.intel.youtube_base_url = UNREACHABLE.to_string();
    config.intel.mlb_base_url = UNREACHABLE.to_string();
    config
}

pub fn build_app(config: &Config) -> Router {
    app(AppState::from_config(config).unwrap(), config.server.role)
}

pub async fn send(router: Router, req: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = router.oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body)
}

pub fn json(body: &Bytes) -> Value {
    serde_json::from_slice(body).unwrap()
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}
