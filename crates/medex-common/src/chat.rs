//! Minimal client for OpenAI-compatible chat completion endpoints.
//!
//! Only the non-streaming `POST /chat/completions` call is needed. Transient failures
//! (timeouts, connection errors, 429 and 5xx) are retried with capped exponential backoff.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Clone, Debug)]
pub struct ChatClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub max_error_body_bytes: usize,
}

impl Default for ChatClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001/v1".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_millis(5_000),
            max_error_body_bytes: 8 * 1024,
        }
    }
}

impl ChatClientConfig {
    /// Optional:
    /// - `OPENAI_BASE_URL` (default: "http://localhost:8001/v1")
    /// - `OPENAI_TIMEOUT_SECS` (default: 30)
    /// - `OPENAI_MAX_RETRIES` (default: 2)
    /// - `OPENAI_RETRY_INITIAL_MS` / `OPENAI_RETRY_MAX_MS` (default: 200 / 5000)
    /// - `OPENAI_MAX_ERROR_BODY_BYTES` (default: 8192)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url = std::env::var("OPENAI_BASE_URL").unwrap_or(defaults.base_url);

        let timeout = env_parse::<u64>("OPENAI_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let max_retries = env_parse::<u32>("OPENAI_MAX_RETRIES").unwrap_or(defaults.max_retries);

        let initial_backoff = env_parse::<u64>("OPENAI_RETRY_INITIAL_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.initial_backoff);

        let max_backoff = env_parse::<u64>("OPENAI_RETRY_MAX_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.max_backoff);

        let max_error_body_bytes = env_parse::<usize>("OPENAI_MAX_ERROR_BODY_BYTES")
            .unwrap_or(defaults.max_error_body_bytes);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            max_retries,
            initial_backoff,
            max_backoff,
            max_error_body_bytes,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse::<T>().ok())
}

#[derive(Debug, thiserror::Error)]
pub enum ChatClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("upstream returned error: status={status} message={message}")]
    Upstream { status: StatusCode, message: String },

    #[error("upstream returned non-JSON error: status={status} body={body}")]
    UpstreamBody { status: StatusCode, body: String },

    #[error("completion had no message content")]
    EmptyCompletion,
}

impl ChatClientError {
    /// True when the endpoint could not be reached or refused to serve, as opposed to
    /// answering with something unusable.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            ChatClientError::Request(_)
                | ChatClientError::Upstream { .. }
                | ChatClientError::UpstreamBody { .. }
        )
    }
}

#[derive(Clone)]
pub struct ChatClient {
    config: ChatClientConfig,
    http: reqwest::Client,
}

impl ChatClient {
    pub fn new(config: ChatClientConfig) -> Result<Self, ChatClientError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("medex/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { config, http })
    }

    pub async fn chat_completions(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ChatClientError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        self.request_with_retry(|| async {
            let resp = self
                .http
                .post(&url)
                .timeout(self.config.timeout)
                .json(request)
                .send()
                .await?;
            Self::parse_json_response(resp, self.config.max_error_body_bytes).await
        })
        .await
    }

    /// Run a completion and return the first choice's message text.
    pub async fn complete(&self, request: &ChatCompletionRequest) -> Result<String, ChatClientError> {
        let response = self.chat_completions(request).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ChatClientError::EmptyCompletion)
    }

    async fn parse_json_response<T: for<'de> Deserialize<'de>>(
        resp: reqwest::Response,
        max_error_body_bytes: usize,
    ) -> Result<T, ChatClientError> {
        if resp.status().is_success() {
            let bytes = resp.bytes().await?;
            return Ok(serde_json::from_slice(&bytes)?);
        }
        Err(Self::to_upstream_error(resp, max_error_body_bytes).await)
    }

    async fn to_upstream_error(resp: reqwest::Response, max_error_body_bytes: usize) -> ChatClientError {
        let status = resp.status();
        let body = read_limited_text(resp, max_error_body_bytes).await;
        match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(parsed) => ChatClientError::Upstream {
                status,
                message: parsed
                    .error
                    .message
                    .unwrap_or_else(|| "unknown upstream error".to_string()),
            },
            Err(_) => ChatClientError::UpstreamBody { status, body },
        }
    }

    async fn request_with_retry<T, Fut, F>(&self, mut f: F) -> Result<T, ChatClientError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, ChatClientError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match f().await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    if attempt > self.config.max_retries || !should_retry(&e) {
                        return Err(e);
                    }
                    let delay = backoff_delay(
                        self.config.initial_backoff,
                        self.config.max_backoff,
                        attempt - 1,
                    );
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis(),
                        error = %e,
                        "chat request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

fn should_retry(err: &ChatClientError) -> bool {
    match err {
        ChatClientError::Request(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        ChatClientError::Upstream { status, .. } | ChatClientError::UpstreamBody { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
        }
        ChatClientError::InvalidJson(_) | ChatClientError::EmptyCompletion => false,
    }
}

fn backoff_delay(initial: Duration, max: Duration, exponent: u32) -> Duration {
    let mult = 1u128.checked_shl(exponent).unwrap_or(u128::MAX);
    let base_ms = initial.as_millis().saturating_mul(mult);
    let capped_ms = std::cmp::min(base_ms, max.as_millis()) as u64;
    let jitter_cap = std::cmp::max(1, capped_ms / 4);
    Duration::from_millis(capped_ms.saturating_add(pseudo_jitter_ms(jitter_cap)))
}

fn pseudo_jitter_ms(max_inclusive: u64) -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64)
        .unwrap_or(0);
    nanos % (max_inclusive + 1)
}

async fn read_limited_text(resp: reqwest::Response, max_bytes: usize) -> String {
    match resp.bytes().await {
        Ok(mut b) => {
            b.truncate(max_bytes);
            String::from_utf8_lossy(&b).to_string()
        }
        Err(e) => {
            warn!(error = %e, "failed to read upstream error body");
            "<failed to read error body>".to_string()
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorObject,
}

#[derive(Debug, Deserialize)]
struct ErrorObject {
    message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChoice {
    pub message: ChatCompletionMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionMessage {
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_and_caps() {
        let initial = Duration::from_millis(100);
        let max = Duration::from_millis(1_000);

        let first = backoff_delay(initial, max, 0);
        assert!(first >= initial && first <= Duration::from_millis(125));

        let third = backoff_delay(initial, max, 2);
        assert!(third >= Duration::from_millis(400) && third <= Duration::from_millis(500));

        let capped = backoff_delay(initial, max, 40);
        assert!(capped >= max && capped <= Duration::from_millis(1_250));
    }

    #[test]
    fn retry_policy_by_status() {
        let busy = ChatClientError::Upstream {
            status: StatusCode::TOO_MANY_REQUESTS,
            message: "slow down".to_string(),
        };
        let down = ChatClientError::UpstreamBody {
            status: StatusCode::BAD_GATEWAY,
            body: "bad gateway".to_string(),
        };
        let bad_request = ChatClientError::Upstream {
            status: StatusCode::BAD_REQUEST,
            message: "unknown model".to_string(),
        };
        assert!(should_retry(&busy));
        assert!(should_retry(&down));
        assert!(!should_retry(&bad_request));
        assert!(!should_retry(&ChatClientError::EmptyCompletion));
    }

    #[test]
    fn unavailable_excludes_bad_answers() {
        let down = ChatClientError::UpstreamBody {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: String::new(),
        };
        assert!(down.is_unavailable());
        assert!(!ChatClientError::EmptyCompletion.is_unavailable());
        let json_err = serde_json::from_str::<ChatCompletionResponse>("{").unwrap_err();
        assert!(!ChatClientError::InvalidJson(json_err).is_unavailable());
    }

    #[test]
    fn request_omits_unset_fields() {
        let request = ChatCompletionRequest {
            model: "local".to_string(),
            messages: vec![Message::user("hi")],
            temperature: None,
            max_tokens: Some(16),
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert!(json.get("temperature").is_none());
        assert_eq!(json["max_tokens"], 16);
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn response_tolerates_extra_fields() {
        let body = r#"{"id":"x","object":"chat.completion","choices":[
            {"index":0,"message":{"role":"assistant","content":"{}"},"finish_reason":"stop"}],
            "usage":{"total_tokens":3}}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).expect("parse");
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("{}"));
    }
}
