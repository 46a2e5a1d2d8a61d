//! Verdict extraction
//!
//! The system prompt instructs the model to end its final message with
//! a single word, Success or Fail. Only the last line counts, so a
//! message that merely mentions "success" earlier cannot pass.

/// Whether the model's final message is a pass verdict
pub fn is_pass(final_message: &str) -> bool {
    final_message
        .trim_end()
        .lines()
        .next_back()
        .is_some_and(|line| line.to_lowercase().contains("success"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_word_verdicts() {
        assert!(is_pass("Success"));
        assert!(!is_pass("Fail"));
    }

    #[test]
    fn test_only_last_line_counts() {
        assert!(is_pass("The button was found and clicked.\nSuccess"));
        assert!(!is_pass("Success was not achieved for this step.\nFail"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(is_pass("SUCCESS"));
        assert!(is_pass("The assertion was met: success"));
    }

    #[test]
    fn test_trailing_newline_ignored() {
        assert!(is_pass("Success\n"));
    }

    #[test]
    fn test_empty_message_fails() {
        assert!(!is_pass(""));
        assert!(!is_pass("\n\n"));
    }
}
