mod common;

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use common::{build_app, get as get_req, json, post_json, send, spawn_upstream, test_config};
use serde_json::{json, Value};
use std::collections::HashMap;

async fn signed_url_upstream(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    if headers.get("xi-api-key").and_then(|v| v.to_str().ok()) != Some("xi-test") {
        return (StatusCode::UNAUTHORIZED, "invalid api key").into_response();
    }
    match params.get("agent_id").map(String::as_str) {
        Some("agent-missing") => (StatusCode::NOT_FOUND, "agent not found").into_response(),
        Some("agent-odd") => Json(json!({ "url": "wss://nope" })).into_response(),
        Some(agent) => Json(json!({ "signed_url": format!("wss://signed/{agent}") })).into_response(),
        None => (StatusCode::BAD_REQUEST, "agent_id required").into_response(),
    }
}

async fn tts_upstream(Path(voice): Path<String>, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    if voice == "quota" {
        return (StatusCode::TOO_MANY_REQUESTS, "quota exceeded").into_response();
    }
    let payload: Value = serde_json::from_slice(&body).unwrap();
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let audio = format!(
        "{voice}|{}|{}|{accept}",
        payload["model_id"].as_str().unwrap_or_default(),
        payload["text"].as_str().unwrap_or_default()
    );
    ([(header::CONTENT_TYPE, "audio/mpeg")], audio).into_response()
}

async fn chat_upstream(headers: HeaderMap, Json(payload): Json<Value>) -> impl IntoResponse {
    if payload["model"] == "busy/model" {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::CONTENT_TYPE, "text/plain")],
            "slow down",
        )
            .into_response();
    }
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "model": payload["model"],
        "messages": payload["messages"],
        "authorization": header_str("authorization"),
        "referer": header_str("http-referer"),
        "title": header_str("x-title"),
    }))
    .into_response()
}

async fn eleven_base() -> String {
    spawn_upstream(
        Router::new()
            .route(
                "/v1/convai/conversation/get-signed-url",
                get(signed_url_upstream),
            )
            .route("/v1/text-to-speech/{voice}", post(tts_upstream)),
    )
    .await
}

fn eleven_config(base: &str) -> scout_server::config::Config {
    let mut config = test_config();
    config.elevenlabs.api_base_url = base.to_string();
    config.elevenlabs.api_key = Some("xi-test".to_string());
    config.elevenlabs.agent_id = Some("agent-env".to_string());
    config
}

#[tokio::test]
async fn signed_url_success_paths() {
    let base = eleven_base().await;
    let config = eleven_config(&base);

    let (status, headers, body) = send(build_app(&config), get_req("/api/eleven-signed-url")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!({ "signedUrl": "wss://signed/agent-env" }));
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    assert_eq!(headers[header::CACHE_CONTROL], "no-store");

    let (_, _, body) = send(
        build_app(&config),
        get_req("/api/eleven-signed-url?agentId=agent-camel"),
    )
    .await;
    assert_eq!(json(&body)["signedUrl"], "wss://signed/agent-camel");

    let (_, _, body) = send(
        build_app(&config),
        get_req("/api/eleven-signed-url?agent_id=agent-snake&agentId=agent-camel"),
    )
    .await;
    assert_eq!(json(&body)["signedUrl"], "wss://signed/agent-snake");
}

#[tokio::test]
async fn signed_url_error_paths() {
    let base = eleven_base().await;
    let mut config = eleven_config(&base);

    let (status, _, body) = send(
        build_app(&config),
        get_req("/api/eleven-signed-url?agent_id=agent-missing"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        json(&body),
        json!({ "error": "Upstream error", "detail": "agent not found" })
    );

    let (status, _, body) = send(
        build_app(&config),
        get_req("/api/eleven-signed-url?agent_id=agent-odd"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        json(&body)["error"],
        "Invalid upstream response: missing signed_url"
    );

    config.elevenlabs.agent_id = None;
    let (status, _, body) = send(build_app(&config), get_req("/api/eleven-signed-url")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json(&body)["error"],
        "Missing ELEVEN_AGENT_ID (or pass ?agent_id=)"
    );
}

#[tokio::test]
async fn signed_url_transport_failure_is_500() {
    let mut config = test_config();
    config.elevenlabs.api_key = Some("xi-test".to_string());
    config.elevenlabs.agent_id = Some("agent-env".to_string());

    let (status, _, body) = send(build_app(&config), get_req("/api/eleven-signed-url")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json(&body)["error"].is_string());
}

#[tokio::test]
async fn tts_returns_audio_bytes() {
    let base = eleven_base().await;
    let config = eleven_config(&base);

    let (status, headers, body) = send(
        build_app(&config),
        post_json(
            "/api/tts",
            r#"{"text":"Play ball","voiceId":"voiceA","modelId":"eleven_turbo_v2"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(&body[..], b"voiceA|eleven_turbo_v2|Play ball|audio/mpeg");

    let (_, _, body) = send(
        build_app(&config),
        post_json("/api/tts", r#"{"text":"Hi","voice_id":"voiceB"}"#),
    )
    .await;
    assert_eq!(&body[..], b"voiceB|eleven_multilingual_v2|Hi|audio/mpeg");
}

#[tokio::test]
async fn tts_rejects_bad_input() {
    let base = eleven_base().await;
    let config = eleven_config(&base);

    let (status, _, body) = send(build_app(&config), post_json("/api/tts", "{oops")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["error"], "Invalid JSON body");

    let (status, _, body) =
        send(build_app(&config), post_json("/api/tts", r#"{"text":"   "}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["error"], "Missing text");

    let (status, _, body) = send(
        build_app(&config),
        post_json("/api/tts", r#"{"text":"hi","voiceId":"quota"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json(&body)["detail"], "quota exceeded");
}

#[tokio::test]
async fn chat_relay_injects_key_and_default_model() {
    let base = spawn_upstream(Router::new().route("/chat/completions", post(chat_upstream))).await;
    let mut config = test_config();
    config.chat.api_base_url = format!("{base}/");
    config.chat.api_key = Some("or-key".to_string());
    config.chat.default_model = "default/model".to_string();
    config.chat.referer = Some("https://scout.example".to_string());
    config.chat.title = Some("Scout".to_string());

    let (status, headers, body) = send(
        build_app(&config),
        post_json("/api/chat", r#"{"messages":[{"role":"user","content":"hi"}]}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let body = json(&body);
    assert_eq!(body["model"], "default/model");
    assert_eq!(body["messages"][0]["content"], "hi");
    assert_eq!(body["authorization"], "Bearer or-key");
    assert_eq!(body["referer"], "https://scout.example");
    assert_eq!(body["title"], "Scout");

    let (_, _, body) = send(
        build_app(&config),
        post_json("/api/chat", r#"{"model":"caller/model"}"#),
    )
    .await;
    assert_eq!(json(&body)["model"], "caller/model");
}

#[tokio::test]
async fn chat_relay_passes_upstream_errors_through() {
    let base = spawn_upstream(Router::new().route("/chat/completions", post(chat_upstream))).await;
    let mut config = test_config();
    config.chat.api_base_url = base;
    config.chat.api_key = Some("or-key".to_string());

    let (status, headers, body) = send(
        build_app(&config),
        post_json("/api/chat", r#"{"model":"busy/model"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
    assert_eq!(&body[..], b"slow down");

    let (status, _, body) = send(build_app(&config), post_json("/api/chat", "not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["error"], "Invalid JSON body");
}
