//! Loop event types

use serde::{Deserialize, Serialize};

use probe_ai::{Message, Usage};

/// Events emitted during one sampling-loop run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoopEvent {
    /// The loop started
    LoopStart,

    /// A full assistant message arrived from the model
    AssistantMessage { message: Message },

    /// A tool dispatch started
    ToolDispatchStart {
        tool_use_id: String,
        tool_name: String,
        input: serde_json::Value,
    },

    /// A tool dispatch completed
    ToolDispatchEnd {
        tool_use_id: String,
        tool_name: String,
        is_error: bool,
        summary: String,
    },

    /// The model call failed; the run ends without a verdict
    TransportError { message: String },

    /// The loop reached a terminal state
    LoopEnd { turns: u32, usage: Usage },
}
