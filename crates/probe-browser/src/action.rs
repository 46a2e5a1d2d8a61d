//! Structured browser actions
//!
//! The model sends `{ "action": "...", "text": ..., "coordinate": ... }`
//! inputs. Parsing happens once, up front, into a closed enum; argument
//! violations surface as `InvalidArgument` before any browser state is
//! touched.

use fantoccini::key::Key;
use probe_agent::ToolError;
use serde_json::Value;

/// One recognized browser action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Press a named key (or type an unmapped string literally)
    Key { text: String },
    /// Type into the focused text element
    Type { text: String },
    /// Move the pointer to an absolute viewport position
    MouseMove { x: u32, y: u32 },
    LeftClick,
    RightClick,
    MiddleClick,
    DoubleClick,
    Screenshot,
    CursorPosition,
}

impl Action {
    /// Parse and validate a tool input value
    pub fn parse(input: &Value) -> Result<Self, ToolError> {
        let name = input
            .get("action")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::InvalidArgument("action is required".to_string()))?;

        match name {
            "key" => Ok(Self::Key {
                text: require_text(input, name)?,
            }),
            "type" => Ok(Self::Type {
                text: require_text(input, name)?,
            }),
            "mouse_move" => {
                if input.get("text").is_some_and(|t| !t.is_null()) {
                    return Err(ToolError::InvalidArgument(
                        "text is not accepted for mouse_move".to_string(),
                    ));
                }
                let (x, y) = require_coordinate(input)?;
                Ok(Self::MouseMove { x, y })
            }
            "left_click" => Ok(Self::LeftClick),
            "right_click" => Ok(Self::RightClick),
            "middle_click" => Ok(Self::MiddleClick),
            "double_click" => Ok(Self::DoubleClick),
            "screenshot" => Ok(Self::Screenshot),
            "cursor_position" => Ok(Self::CursorPosition),
            other => Err(ToolError::InvalidAction(other.to_string())),
        }
    }

    /// Action label used in logs and screenshot file names
    pub fn name(&self) -> &'static str {
        match self {
            Self::Key { .. } => "key",
            Self::Type { .. } => "type",
            Self::MouseMove { .. } => "mouse_move",
            Self::LeftClick => "left_click",
            Self::RightClick => "right_click",
            Self::MiddleClick => "middle_click",
            Self::DoubleClick => "double_click",
            Self::Screenshot => "screenshot",
            Self::CursorPosition => "cursor_position",
        }
    }
}

fn require_text(input: &Value, action: &str) -> Result<String, ToolError> {
    input
        .get("text")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ToolError::InvalidArgument(format!("text is required for {action}")))
}

fn require_coordinate(input: &Value) -> Result<(u32, u32), ToolError> {
    let pair = input
        .get("coordinate")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ToolError::InvalidArgument("coordinate is required for mouse_move".to_string())
        })?;
    if pair.len() != 2 {
        return Err(ToolError::InvalidArgument(format!(
            "coordinate must have exactly 2 elements, got {}",
            pair.len()
        )));
    }
    // as_u64 rejects negatives and non-integers in one check
    let parse = |v: &Value| {
        v.as_u64()
            .filter(|n| *n <= u32::MAX as u64)
            .map(|n| n as u32)
            .ok_or_else(|| {
                ToolError::InvalidArgument(format!(
                    "coordinate values must be non-negative integers, got {v}"
                ))
            })
    };
    Ok((parse(&pair[0])?, parse(&pair[1])?))
}

/// Map a well-known key name to its WebDriver control code.
///
/// Lookup is case-insensitive; anything unmapped passes through
/// literally, which lets the model type multi-character strings as a
/// key action.
pub fn webdriver_key(name: &str) -> String {
    match name.to_ascii_lowercase().as_str() {
        "return" => Key::Enter.to_string(),
        "tab" => Key::Tab.to_string(),
        "space" => Key::Space.to_string(),
        "backspace" => Key::Backspace.to_string(),
        "escape" => Key::Escape.to_string(),
        "page_down" => Key::PageDown.to_string(),
        "page_up" => Key::PageUp.to_string(),
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_mouse_move() {
        let action = Action::parse(&json!({"action": "mouse_move", "coordinate": [640, 400]}));
        assert_eq!(action.unwrap(), Action::MouseMove { x: 640, y: 400 });
    }

    #[test]
    fn test_mouse_move_rejects_negative_coordinate() {
        let err = Action::parse(&json!({"action": "mouse_move", "coordinate": [-1, 400]}));
        assert!(matches!(err, Err(ToolError::InvalidArgument(_))));
    }

    #[test]
    fn test_mouse_move_rejects_short_coordinate() {
        let err = Action::parse(&json!({"action": "mouse_move", "coordinate": [640]}));
        assert!(matches!(err, Err(ToolError::InvalidArgument(_))));
    }

    #[test]
    fn test_mouse_move_rejects_fractional_coordinate() {
        let err = Action::parse(&json!({"action": "mouse_move", "coordinate": [640.5, 400]}));
        assert!(matches!(err, Err(ToolError::InvalidArgument(_))));
    }

    #[test]
    fn test_mouse_move_rejects_text() {
        let err = Action::parse(&json!({
            "action": "mouse_move",
            "coordinate": [1, 2],
            "text": "hello"
        }));
        assert!(matches!(err, Err(ToolError::InvalidArgument(_))));
    }

    #[test]
    fn test_key_requires_text() {
        let err = Action::parse(&json!({"action": "key"}));
        assert!(matches!(err, Err(ToolError::InvalidArgument(_))));
    }

    #[test]
    fn test_empty_text_rejected() {
        let err = Action::parse(&json!({"action": "key", "text": ""}));
        assert!(matches!(err, Err(ToolError::InvalidArgument(_))));
        let err = Action::parse(&json!({"action": "type", "text": ""}));
        assert!(matches!(err, Err(ToolError::InvalidArgument(_))));
    }

    #[test]
    fn test_unknown_action_is_invalid_action() {
        let err = Action::parse(&json!({"action": "teleport"}));
        assert_eq!(err, Err(ToolError::InvalidAction("teleport".to_string())));
    }

    #[test]
    fn test_missing_action_is_invalid_argument() {
        let err = Action::parse(&json!({"coordinate": [1, 2]}));
        assert!(matches!(err, Err(ToolError::InvalidArgument(_))));
    }

    #[test]
    fn test_key_map_known_names() {
        assert_eq!(webdriver_key("return"), Key::Enter.to_string());
        assert_eq!(webdriver_key("Tab"), Key::Tab.to_string());
        assert_eq!(webdriver_key("page_down"), Key::PageDown.to_string());
    }

    #[test]
    fn test_key_map_passthrough() {
        assert_eq!(webdriver_key("F5"), "F5");
        assert_eq!(webdriver_key("hello"), "hello");
    }
}
