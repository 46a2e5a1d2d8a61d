//! Wire types for the Messages API

use serde::{Deserialize, Serialize};

/// Message roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A base64 image payload in the shape the API expects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub media_type: String,
    pub data: String,
}

/// Content blocks within messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    /// Plain text
    Text { text: String },
    /// Base64-encoded image
    Image { source: ImageSource },
    /// A tool-use request produced by the model
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// A tool result fed back to the model
    ToolResult {
        tool_use_id: String,
        content: Vec<Content>,
        is_error: bool,
    },
}

impl Content {
    /// Create a text block
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a PNG image block from base64 data
    pub fn png_image(data: impl Into<String>) -> Self {
        Self::Image {
            source: ImageSource {
                source_type: "base64".to_string(),
                media_type: "image/png".to_string(),
                data: data.into(),
            },
        }
    }

    /// Create a tool-use block
    pub fn tool_use(
        id: impl Into<String>,
        name: impl Into<String>,
        input: serde_json::Value,
    ) -> Self {
        Self::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// Get text if this is a text block
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Check if this is a tool-use block
    pub fn is_tool_use(&self) -> bool {
        matches!(self, Self::ToolUse { .. })
    }
}

/// One message in a conversation: a role plus ordered content blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<Content>,
}

impl Message {
    /// Create a user message with a single text block
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![Content::text(text)],
        }
    }

    /// Create a user message with multiple content blocks
    pub fn user_with_content(content: Vec<Content>) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }

    /// Create an assistant message
    pub fn assistant(content: Vec<Content>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// Extract all tool-use blocks in emission order
    pub fn tool_uses(&self) -> Vec<(&str, &str, &serde_json::Value)> {
        self.content
            .iter()
            .filter_map(|c| match c {
                Content::ToolUse { id, name, input } => {
                    Some((id.as_str(), name.as_str(), input))
                }
                _ => None,
            })
            .collect()
    }

    /// Text of the first text block, if any
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|c| c.as_text())
    }
}

/// Reason why generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ToolUse,
    StopSequence,
    #[serde(other)]
    Other,
}

/// Token usage for one model call
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Usage {
    /// Accumulate another call's usage into this one
    pub fn add(&mut self, other: Usage) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
    }
}

/// A tool declaration sent with each model call
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ToolSpec {
    /// Anthropic-defined computer-use capability
    ComputerUse {
        #[serde(rename = "type")]
        kind: String,
        name: String,
        display_width_px: u32,
        display_height_px: u32,
        display_number: u32,
    },
    /// A custom tool with a JSON Schema for its input
    Custom {
        name: String,
        description: String,
        input_schema: serde_json::Value,
    },
}

impl ToolSpec {
    /// Declare the computer-use tool for a given display size
    pub fn computer(display_width_px: u32, display_height_px: u32) -> Self {
        Self::ComputerUse {
            kind: "computer_20241022".to_string(),
            name: "computer".to_string(),
            display_width_px,
            display_height_px,
            display_number: 1,
        }
    }

    /// Create a custom tool declaration
    pub fn custom(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        Self::Custom {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }

    /// The tool's declared name
    pub fn name(&self) -> &str {
        match self {
            Self::ComputerUse { name, .. } => name,
            Self::Custom { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_uses_preserves_order() {
        let msg = Message::assistant(vec![
            Content::text("Taking a screenshot first."),
            Content::tool_use("id_1", "computer", serde_json::json!({"action": "screenshot"})),
            Content::tool_use("id_2", "computer", serde_json::json!({"action": "left_click"})),
        ]);
        let uses = msg.tool_uses();
        assert_eq!(uses.len(), 2);
        assert_eq!(uses[0].0, "id_1");
        assert_eq!(uses[1].0, "id_2");
    }

    #[test]
    fn test_first_text_skips_tool_use() {
        let msg = Message::assistant(vec![
            Content::tool_use("id_1", "computer", serde_json::json!({})),
            Content::text("Success"),
        ]);
        assert_eq!(msg.first_text(), Some("Success"));
    }

    #[test]
    fn test_computer_spec_shape() {
        let spec = ToolSpec::computer(1280, 800);
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["type"], "computer_20241022");
        assert_eq!(value["name"], "computer");
        assert_eq!(value["display_width_px"], 1280);
        assert_eq!(value["display_number"], 1);
    }

    #[test]
    fn test_content_block_roundtrip() {
        let block = Content::ToolResult {
            tool_use_id: "id_9".to_string(),
            content: vec![Content::text("clicked"), Content::png_image("aGVsbG8=")],
            is_error: false,
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "tool_result");
        assert_eq!(json["content"][1]["source"]["media_type"], "image/png");
        let back: Content = serde_json::from_value(json).unwrap();
        assert!(matches!(back, Content::ToolResult { ref content, .. } if content.len() == 2));
    }

    #[test]
    fn test_stop_reason_unknown_value() {
        let reason: StopReason = serde_json::from_str("\"pause_turn\"").unwrap();
        assert_eq!(reason, StopReason::Other);
    }

    #[test]
    fn test_usage_saturating_add() {
        let mut usage = Usage {
            input_tokens: u32::MAX - 1,
            output_tokens: 10,
        };
        usage.add(Usage {
            input_tokens: 5,
            output_tokens: 7,
        });
        assert_eq!(usage.input_tokens, u32::MAX);
        assert_eq!(usage.output_tokens, 17);
    }
}
