use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::{Value, json};
use screener_lib::{CompletionRequest, CompletionService, ScreenerConfig, ServiceError};

const REQUEST_TIMEOUT_SECS: u64 = 120;
const CONNECT_TIMEOUT_SECS: u64 = 15;

/// Blocking client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionClient {
    api_base_url: String,
    client: Client,
}

impl ChatCompletionClient {
    pub fn new(api_base_url: &str, client: Client) -> Self {
        ChatCompletionClient {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn from_config(config: &ScreenerConfig) -> Result<Self, anyhow::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        return Ok(Self::new(&config.api_base_url, client));
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base_url)
    }
}

pub fn build_request_body(request: &CompletionRequest) -> Value {
    json!({
        "model": request.model,
        "messages": [
            { "role": "system", "content": request.system_prompt },
            { "role": "user", "content": request.user_prompt }
        ],
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
    })
}

/// `choices[0].message.content` of a chat completion response.
pub fn extract_completion_text(body: &Value) -> Result<String, ServiceError> {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|content| !content.trim().is_empty())
        .map(str::to_string)
        .ok_or(ServiceError::EmptyCompletion)
}

impl CompletionService for ChatCompletionClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&request.api_key)
            .json(&build_request_body(request))
            .send()
            .map_err(|e| ServiceError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ServiceError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| ServiceError::Request(format!("invalid response body: {}", e)))?;
        return extract_completion_text(&value);
    }
}
