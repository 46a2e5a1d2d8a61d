//! Console rendering of loop events

use probe_agent::LoopEvent;
use probe_ai::Content;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Print one loop event in simple stdout form
pub fn print_event(event: &LoopEvent) {
    match event {
        LoopEvent::LoopStart => {}
        LoopEvent::AssistantMessage { message } => {
            for block in &message.content {
                if let Content::Text { text } = block {
                    if !text.is_empty() {
                        println!("{}", text);
                    }
                }
            }
        }
        LoopEvent::ToolDispatchStart {
            tool_name, input, ..
        } => {
            let action = input
                .get("action")
                .and_then(|v| v.as_str())
                .unwrap_or("?");
            println!("[Running {} {}...]", tool_name, action);
        }
        LoopEvent::ToolDispatchEnd {
            tool_name,
            is_error,
            summary,
            ..
        } => {
            if *is_error {
                println!("[{} failed: {}]", tool_name, summary);
            } else if !summary.is_empty() {
                println!("[{}: {}]", tool_name, truncate_chars(summary, 200));
            }
        }
        LoopEvent::TransportError { message } => {
            eprintln!("Error: {}", message);
        }
        LoopEvent::LoopEnd { turns, usage } => {
            println!(
                "\n[Turns: {} | Tokens: {} in, {} out]",
                turns, usage.input_tokens, usage.output_tokens
            );
        }
    }
}

/// Print a verdict banner the way the original runner did
pub fn print_verdict(passed: bool) {
    if passed {
        println!("{}Test Passed{}", GREEN, RESET);
    } else {
        println!("{}Test Failed{}", RED, RESET);
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string_unchanged() {
        assert_eq!(truncate_chars("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let truncated = truncate_chars("ééééé", 3);
        assert_eq!(truncated, "ééé...");
    }
}
