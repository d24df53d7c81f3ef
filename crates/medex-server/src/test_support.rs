//! Local stand-in for an OpenAI-compatible chat endpoint.

use std::time::Duration;

use axum::{routing::post, Json, Router};
use medex_common::chat::{ChatClient, ChatClientConfig};
use serde_json::json;

/// Serve `POST /v1/chat/completions` on an ephemeral port, always answering with `content`
/// as the completion text. Returns the base URL to hand to `ChatClientConfig`.
pub async fn spawn_chat_endpoint(content: &str) -> String {
    let body = json!({
        "id": "chatcmpl-local",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    });
    let app = Router::new().route(
        "/v1/chat/completions",
        post(move || {
            let body = body.clone();
            async move { Json(body) }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind chat endpoint");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("chat endpoint");
    });
    format!("http://{addr}/v1")
}

pub fn chat_client(base_url: String) -> ChatClient {
    ChatClient::new(ChatClientConfig {
        base_url,
        timeout: Duration::from_secs(5),
        max_retries: 0,
        ..ChatClientConfig::default()
    })
    .expect("client")
}
