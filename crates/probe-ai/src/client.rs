//! Blocking (non-streaming) Messages API client
//!
//! One call is one HTTP round trip. Provider differences between the
//! direct Anthropic API and Bedrock (auth header, endpoint path, model
//! naming) live entirely in this module.

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    types::{Content, Message, StopReason, ToolSpec, Usage},
};

/// Beta flag required for the computer-use tool family
const COMPUTER_USE_BETA_FLAG: &str = "computer-use-2024-10-22";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const BEDROCK_ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Which API surface to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiProvider {
    Anthropic,
    Bedrock,
}

impl ApiProvider {
    /// Default computer-use capable model for this provider
    pub fn default_model(&self) -> &'static str {
        match self {
            ApiProvider::Anthropic => "claude-3-5-sonnet-20241022",
            ApiProvider::Bedrock => "anthropic.claude-3-5-sonnet-20241022-v2:0",
        }
    }

    /// Default base URL for this provider
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ApiProvider::Anthropic => "https://api.anthropic.com",
            ApiProvider::Bedrock => "https://bedrock-runtime.us-east-1.amazonaws.com",
        }
    }

    /// Environment variable holding the API key
    pub fn api_key_env_var(&self) -> &'static str {
        match self {
            ApiProvider::Anthropic => "ANTHROPIC_API_KEY",
            ApiProvider::Bedrock => "AWS_BEARER_TOKEN_BEDROCK",
        }
    }
}

/// A parsed model response
#[derive(Debug, Clone)]
pub struct ModelResponse {
    /// The assistant message (ordered text and tool-use blocks)
    pub message: Message,
    pub stop_reason: Option<StopReason>,
    pub usage: Usage,
}

/// Messages API client
pub struct ModelClient {
    http: reqwest::Client,
    provider: ApiProvider,
    api_key: String,
    base_url: String,
    model: String,
}

impl ModelClient {
    /// Create a new client with an explicit API key
    pub fn new(provider: ApiProvider, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            provider,
            api_key: api_key.into(),
            base_url: provider.default_base_url().to_string(),
            model: provider.default_model().to_string(),
        }
    }

    /// Create a client from the provider's environment variable
    pub fn from_env(provider: ApiProvider) -> Result<Self> {
        let api_key =
            std::env::var(provider.api_key_env_var()).map_err(|_| Error::InvalidApiKey)?;
        Ok(Self::new(provider, api_key))
    }

    /// Override the base URL (regional Bedrock endpoints, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// The model identifier this client will request
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one conversation state and wait for the full response.
    pub async fn complete(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[ToolSpec],
        max_tokens: u32,
    ) -> Result<ModelResponse> {
        let system = vec![SystemBlock {
            block_type: "text".to_string(),
            text: system_prompt.to_string(),
        }];

        let request = match self.provider {
            ApiProvider::Anthropic => {
                let body = ApiRequest {
                    model: Some(self.model.clone()),
                    anthropic_version: None,
                    anthropic_beta: None,
                    max_tokens,
                    system,
                    messages: messages.to_vec(),
                    tools: tools.to_vec(),
                };
                self.http
                    .post(format!("{}/v1/messages", self.base_url))
                    .header("x-api-key", &self.api_key)
                    .header("anthropic-version", ANTHROPIC_VERSION)
                    .header("anthropic-beta", COMPUTER_USE_BETA_FLAG)
                    .json(&body)
            }
            ApiProvider::Bedrock => {
                let body = ApiRequest {
                    model: None,
                    anthropic_version: Some(BEDROCK_ANTHROPIC_VERSION.to_string()),
                    anthropic_beta: Some(vec![COMPUTER_USE_BETA_FLAG.to_string()]),
                    max_tokens,
                    system,
                    messages: messages.to_vec(),
                    tools: tools.to_vec(),
                };
                self.http
                    .post(format!("{}/model/{}/invoke", self.base_url, self.model))
                    .header("Authorization", format!("Bearer {}", self.api_key))
                    .json(&body)
            }
        };

        tracing::debug!(model = %self.model, messages = messages.len(), "sending model request");

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(Error::RateLimited { retry_after });
            }
            if let Ok(err) = serde_json::from_str::<ErrorResponse>(&text) {
                return Err(Error::api(err.error.error_type, err.error.message));
            }
            return Err(Error::api(status.as_str().to_string(), text));
        }

        let parsed: ApiResponse = response.json().await?;
        if parsed.content.is_empty() {
            return Err(Error::UnexpectedResponse(
                "response carried no content blocks".to_string(),
            ));
        }

        tracing::debug!(
            stop_reason = ?parsed.stop_reason,
            blocks = parsed.content.len(),
            "model response received"
        );

        Ok(ModelResponse {
            message: Message::assistant(parsed.content),
            stop_reason: parsed.stop_reason,
            usage: parsed.usage,
        })
    }
}

#[derive(Debug, Serialize)]
struct ApiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    anthropic_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    anthropic_beta: Option<Vec<String>>,
    max_tokens: u32,
    system: Vec<SystemBlock>,
    messages: Vec<Message>,
    tools: Vec<ToolSpec>,
}

#[derive(Debug, Serialize)]
struct SystemBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<Content>,
    stop_reason: Option<StopReason>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_models() {
        assert!(ApiProvider::Anthropic.default_model().starts_with("claude"));
        assert!(ApiProvider::Bedrock.default_model().starts_with("anthropic."));
    }

    #[test]
    fn test_response_parsing() {
        let raw = serde_json::json!({
            "id": "msg_01",
            "content": [
                {"type": "text", "text": "Clicking the button."},
                {"type": "tool_use", "id": "toolu_01", "name": "computer",
                 "input": {"action": "left_click"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 120, "output_tokens": 34}
        });
        let parsed: ApiResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.stop_reason, Some(StopReason::ToolUse));
        assert_eq!(parsed.usage.input_tokens, 120);
        let msg = Message::assistant(parsed.content);
        assert_eq!(msg.tool_uses().len(), 1);
        assert_eq!(msg.first_text(), Some("Clicking the button."));
    }

    #[test]
    fn test_error_response_parsing() {
        let raw = r#"{"type":"error","error":{"type":"invalid_request_error","message":"bad"}}"#;
        let parsed: ErrorResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.error.error_type, "invalid_request_error");
    }

    #[test]
    fn test_request_shape_direct() {
        let body = ApiRequest {
            model: Some("claude-3-5-sonnet-20241022".to_string()),
            anthropic_version: None,
            anthropic_beta: None,
            max_tokens: 4096,
            system: vec![SystemBlock {
                block_type: "text".to_string(),
                text: "You are a test runner.".to_string(),
            }],
            messages: vec![Message::user("Run the test")],
            tools: vec![ToolSpec::computer(1280, 800)],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("anthropic_version").is_none());
        assert_eq!(json["tools"][0]["type"], "computer_20241022");
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
