//! Transport abstraction over the model API
//!
//! The trait is the seam the sampling loop is tested through. The
//! production implementation wraps `ModelClient` with a per-call
//! deadline and retry with exponential backoff.

use std::time::Duration;

use async_trait::async_trait;

use probe_ai::{Message, ModelClient, ModelResponse, Result, ToolSpec};

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay between retries
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Calculate delay for a given attempt (0-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_secs =
            self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(attempt as i32);
        Duration::from_secs_f64(delay_secs.min(self.max_delay.as_secs_f64()))
    }
}

/// Transport for one blocking model call
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send conversation state and wait for the full response
    async fn complete(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[ToolSpec],
        max_tokens: u32,
    ) -> Result<ModelResponse>;
}

/// Default model-call deadline
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(180);

/// Production transport wrapping the API client
pub struct ProviderTransport {
    client: ModelClient,
    retry_config: RetryConfig,
    call_timeout: Duration,
}

impl ProviderTransport {
    /// Create a transport around an API client
    pub fn new(client: ModelClient) -> Self {
        Self {
            client,
            retry_config: RetryConfig::default(),
            call_timeout: DEFAULT_MODEL_TIMEOUT,
        }
    }

    /// Set retry configuration
    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Set the per-call deadline
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}

#[async_trait]
impl Transport for ProviderTransport {
    async fn complete(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[ToolSpec],
        max_tokens: u32,
    ) -> Result<ModelResponse> {
        let mut attempt = 0u32;
        loop {
            let call = self
                .client
                .complete(system_prompt, messages, tools, max_tokens);
            let result = match tokio::time::timeout(self.call_timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(probe_ai::Error::Timeout(self.call_timeout)),
            };

            match result {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.retry_config.max_retries && e.is_retryable() => {
                    let delay = self.retry_config.delay_for_attempt(attempt);
                    tracing::warn!(
                        "Model call failed (attempt {}/{}): {}. Retrying in {:?}...",
                        attempt + 1,
                        self.retry_config.max_retries + 1,
                        e,
                        delay
                    );
                    attempt += 1;
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
