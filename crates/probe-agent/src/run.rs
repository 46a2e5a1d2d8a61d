//! The sampling loop
//!
//! One run drives one test: seed the conversation with the test
//! description, call the model, dispatch every tool-use block in the
//! order the model emitted it, append the encoded results as a single
//! user message, and repeat until a response carries no tool use. The
//! first text block of that final response is the verdict. A failed
//! model call ends the run without a verdict.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::{
    encode::encode_outcome,
    events::LoopEvent,
    outcome::ToolOutcome,
    registry::ToolRegistry,
    transport::Transport,
};
use probe_ai::{Message, Usage};

/// Configuration for one sampling-loop run
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// System prompt sent with every model call
    pub system_prompt: String,
    /// Maximum output tokens per model call
    pub max_tokens: u32,
    /// Safety bound on model turns before giving up
    pub max_turns: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            system_prompt: String::new(),
            max_tokens: 4096,
            max_turns: 50,
        }
    }
}

/// How a run ended.
///
/// `Inconclusive` is not a failed test: the model never delivered a
/// verdict. Callers must keep the two apart.
#[derive(Debug)]
pub enum RunOutcome {
    /// The model terminated with a plain text message
    Verdict {
        message: String,
        conversation: Vec<Message>,
        usage: Usage,
    },
    /// The run aborted before any verdict (transport failure, turn cap)
    Inconclusive {
        error: String,
        conversation: Vec<Message>,
    },
}

impl RunOutcome {
    /// Whether the run produced a verdict
    pub fn is_conclusive(&self) -> bool {
        matches!(self, RunOutcome::Verdict { .. })
    }
}

/// Orchestrates one test execution
pub struct SamplingLoop {
    transport: Arc<dyn Transport>,
    registry: ToolRegistry,
    config: LoopConfig,
    event_tx: broadcast::Sender<LoopEvent>,
}

impl SamplingLoop {
    /// Create a loop over a transport and a tool registry
    pub fn new(transport: Arc<dyn Transport>, registry: ToolRegistry, config: LoopConfig) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            transport,
            registry,
            config,
            event_tx,
        }
    }

    /// Subscribe to loop events
    pub fn subscribe(&self) -> broadcast::Receiver<LoopEvent> {
        self.event_tx.subscribe()
    }

    /// Drive one test description to a terminal state.
    ///
    /// The conversation is owned by this call and returned with the
    /// outcome; nothing persists across runs.
    pub async fn run(&self, test_description: &str) -> RunOutcome {
        let mut conversation = vec![Message::user(test_description)];
        let mut usage = Usage::default();
        let mut turn = 0u32;
        let tools = self.registry.specs();

        let _ = self.event_tx.send(LoopEvent::LoopStart);

        loop {
            turn += 1;
            if turn > self.config.max_turns {
                let error = format!("gave up after {} model turns", self.config.max_turns);
                tracing::warn!(%error, "run aborted");
                let _ = self.event_tx.send(LoopEvent::TransportError {
                    message: error.clone(),
                });
                return RunOutcome::Inconclusive {
                    error,
                    conversation,
                };
            }

            let response = match self
                .transport
                .complete(
                    &self.config.system_prompt,
                    &conversation,
                    &tools,
                    self.config.max_tokens,
                )
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    // Abnormal termination: no verdict, not a failed test.
                    let error = e.to_string();
                    tracing::error!(%error, "model call failed");
                    let _ = self.event_tx.send(LoopEvent::TransportError {
                        message: error.clone(),
                    });
                    return RunOutcome::Inconclusive {
                        error,
                        conversation,
                    };
                }
            };

            usage.add(response.usage);
            let _ = self.event_tx.send(LoopEvent::AssistantMessage {
                message: response.message.clone(),
            });

            let tool_uses: Vec<(String, String, serde_json::Value)> = response
                .message
                .tool_uses()
                .into_iter()
                .map(|(id, name, input)| (id.to_string(), name.to_string(), input.clone()))
                .collect();
            let verdict = response.message.first_text().map(str::to_string);
            conversation.push(response.message);

            if tool_uses.is_empty() {
                let _ = self.event_tx.send(LoopEvent::LoopEnd { turns: turn, usage });
                return RunOutcome::Verdict {
                    message: verdict.unwrap_or_default(),
                    conversation,
                    usage,
                };
            }

            // Dispatch strictly in emission order, one at a time.
            let mut results = Vec::with_capacity(tool_uses.len());
            for (id, name, input) in tool_uses {
                let _ = self.event_tx.send(LoopEvent::ToolDispatchStart {
                    tool_use_id: id.clone(),
                    tool_name: name.clone(),
                    input: input.clone(),
                });

                let outcome = self.registry.dispatch(&name, input).await;

                let _ = self.event_tx.send(LoopEvent::ToolDispatchEnd {
                    tool_use_id: id.clone(),
                    tool_name: name,
                    is_error: outcome.is_failure(),
                    summary: summarize(&outcome),
                });

                results.push(encode_outcome(&outcome, &id));
            }

            conversation.push(Message::user_with_content(results));
        }
    }
}

/// One-line description of an outcome for event consumers
fn summarize(outcome: &ToolOutcome) -> String {
    match outcome {
        ToolOutcome::Empty => String::new(),
        ToolOutcome::Success { output, image, .. } => match (output, image) {
            (Some(text), Some(_)) if !text.is_empty() => format!("{text} [image]"),
            (Some(text), None) => text.clone(),
            (_, Some(_)) => "[image]".to_string(),
            _ => String::new(),
        },
        ToolOutcome::Failure { error, .. } => error.clone(),
    }
}
