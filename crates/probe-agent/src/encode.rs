//! Encoding tool outcomes into tool-result content blocks

use crate::outcome::ToolOutcome;
use probe_ai::Content;

/// Convert an outcome into the tool-result block the API expects.
///
/// Failures become error blocks carrying the error text. Successes
/// carry a text sub-block and/or a PNG image sub-block. An empty
/// outcome yields a block with empty content, which is permitted.
pub fn encode_outcome(outcome: &ToolOutcome, tool_use_id: &str) -> Content {
    let (content, is_error) = match outcome {
        ToolOutcome::Empty => (vec![], false),
        ToolOutcome::Failure { error, system } => {
            (vec![Content::text(prepend_system(system.as_deref(), error))], true)
        }
        ToolOutcome::Success {
            output,
            image,
            system,
        } => {
            let mut blocks = vec![];
            if let Some(text) = output.as_deref().filter(|t| !t.is_empty()) {
                blocks.push(Content::text(prepend_system(system.as_deref(), text)));
            }
            if let Some(data) = image {
                blocks.push(Content::png_image(data.clone()));
            }
            (blocks, false)
        }
    };

    Content::ToolResult {
        tool_use_id: tool_use_id.to_string(),
        content,
        is_error,
    }
}

fn prepend_system(system: Option<&str>, text: &str) -> String {
    match system {
        Some(system) => format!("<system>{system}</system>\n{text}"),
        None => text.to_string(),
    }
}
