/// LLM Client: the single point of entry for all model calls in the service.
///
/// ARCHITECTURAL RULE: No other module may call the chat completions API directly.
/// All LLM interactions MUST go through this module.
///
/// Speaks the OpenAI-compatible chat completions protocol (OpenRouter by default).
/// Constructed once at startup and carried in `AppState`.
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
/// The model used for all LLM calls. Hardcoded so analyses stay comparable across versions.
pub const MODEL: &str = "x-ai/grok-4-fast:free";
const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 2000;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl LlmResponse {
    /// Returns the content of the first choice, if it is non-blank.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// The single LLM client used by all services.
/// Wraps the chat completions API with retry logic and structured output helpers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: String) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Makes a raw call to the model, returning the full response object.
    /// Retries on 429 (rate limit), 5xx and transport errors with exponential backoff.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        // Overwritten by every failed attempt; a run ending on 429 stays RateLimited.
        let mut last_error = LlmError::RateLimited {
            retries: MAX_RETRIES,
        };

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(self.completions_url())
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = LlmError::Http(e);
                    continue;
                }
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                warn!("LLM API rate limited the request");
                last_error = LlmError::RateLimited {
                    retries: MAX_RETRIES,
                };
                continue;
            }

            if status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = LlmError::Api {
                    status: status.as_u16(),
                    message: api_error_message(body),
                };
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: api_error_message(body),
                });
            }

            let llm_response: LlmResponse = response.json().await?;

            if let Some(usage) = &llm_response.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            return Ok(llm_response);
        }

        Err(last_error)
    }

    /// Convenience method that calls the LLM and deserializes the text response as JSON.
    /// The prompt must instruct the model to return valid JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let response = self.call(prompt, system).await?;
        parse_json_content(&response)
    }
}

fn parse_json_content<T: DeserializeOwned>(response: &LlmResponse) -> Result<T, LlmError> {
    let text = response.text().ok_or(LlmError::EmptyContent)?;

    // Strip markdown code fences if the model wraps JSON in them
    let text = strip_json_fences(text);

    serde_json::from_str(text).map_err(LlmError::Parse)
}

/// Pulls `error.message` out of a provider error body, falling back to the raw body.
fn api_error_message(body: String) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn response_with(content: Option<&str>) -> LlmResponse {
        LlmResponse {
            choices: vec![Choice {
                message: ResponseMessage {
                    content: content.map(String::from),
                },
            }],
            usage: None,
        }
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_response_deserializes_chat_completion() {
        let body = r#"{
            "id": "gen-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "{\"score\": 7}"}}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 40, "total_tokens": 160}
        }"#;
        let response: LlmResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text(), Some("{\"score\": 7}"));
        assert_eq!(response.usage.unwrap().completion_tokens, 40);
    }

    #[test]
    fn test_text_is_none_for_missing_or_blank_content() {
        assert!(response_with(None).text().is_none());
        assert!(response_with(Some("  \n")).text().is_none());
        let empty = LlmResponse {
            choices: vec![],
            usage: None,
        };
        assert!(empty.text().is_none());
    }

    #[test]
    fn test_parse_json_content_strips_fences() {
        let response = response_with(Some("```json\n{\"score\": 7}\n```"));
        let value: Value = parse_json_content(&response).unwrap();
        assert_eq!(value["score"], 7);
    }

    #[test]
    fn test_parse_json_content_empty_is_error() {
        let err = parse_json_content::<Value>(&response_with(None)).unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }

    #[test]
    fn test_api_error_message_prefers_provider_message() {
        let body = r#"{"error": {"message": "Invalid API key", "code": 401}}"#.to_string();
        assert_eq!(api_error_message(body), "Invalid API key");
        assert_eq!(api_error_message("Bad Gateway".to_string()), "Bad Gateway");
    }

    /// Serves `status` and `body` for every chat completion request.
    async fn stub_provider(status: u16, body: &'static str) -> String {
        use axum::{http::StatusCode as AxumStatus, routing::post, Router};

        let app = Router::new().route(
            "/chat/completions",
            post(move || async move { (AxumStatus::from_u16(status).unwrap(), body) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_persistent_429_is_rate_limited() {
        let base_url = stub_provider(429, "slow down").await;
        let client = LlmClient::new("key".to_string(), base_url).unwrap();
        let err = client.call("prompt", "system").await.unwrap_err();
        assert!(matches!(err, LlmError::RateLimited { retries: MAX_RETRIES }));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let base_url =
            stub_provider(401, r#"{"error": {"message": "Invalid API key", "code": 401}}"#).await;
        let client = LlmClient::new("key".to_string(), base_url).unwrap();
        let err = client.call("prompt", "system").await.unwrap_err();
        assert!(matches!(
            err,
            LlmError::Api { status: 401, ref message } if message == "Invalid API key"
        ));
    }

    #[test]
    fn test_completions_url_joins_base() {
        let client = LlmClient::new("key".to_string(), "https://example.test/v1/".to_string())
            .unwrap();
        assert_eq!(
            client.completions_url(),
            "https://example.test/v1/chat/completions"
        );
    }
}
