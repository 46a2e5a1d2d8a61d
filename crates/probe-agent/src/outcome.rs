//! Tool execution outcomes
//!
//! An outcome is an explicit tri-state: nothing to relay, a success
//! with optional text/image payloads, or a failure with an error
//! message. `system` text, when present, is prepended inside
//! `<system>` tags at encoding time.

use serde::{Deserialize, Serialize};

/// The result of executing one tool dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolOutcome {
    /// No content to relay
    Empty,
    /// Successful execution
    Success {
        output: Option<String>,
        /// Base64-encoded PNG
        image: Option<String>,
        system: Option<String>,
    },
    /// Failed execution; the model sees the error and may retry
    Failure {
        error: String,
        system: Option<String>,
    },
}

impl ToolOutcome {
    /// A success carrying only output text
    pub fn output(text: impl Into<String>) -> Self {
        Self::Success {
            output: Some(text.into()),
            image: None,
            system: None,
        }
    }

    /// A success carrying only an image
    pub fn image(data: impl Into<String>) -> Self {
        Self::Success {
            output: None,
            image: Some(data.into()),
            system: None,
        }
    }

    /// A failure with an error message
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
            system: None,
        }
    }

    /// Whether this outcome has no content to relay
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Success {
                output,
                image,
                system,
            } => {
                output.as_deref().is_none_or(str::is_empty)
                    && image.is_none()
                    && system.is_none()
            }
            Self::Failure { .. } => false,
        }
    }

    /// Whether this outcome is a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// Combine two outcomes left-to-right.
    ///
    /// Text fields concatenate; the first non-empty image wins (images
    /// never merge); `Empty` is the identity. If either side is a
    /// failure, the combined outcome is a failure: the error text is
    /// the result and any success-side image is dropped.
    pub fn combine(self, other: ToolOutcome) -> ToolOutcome {
        match (self, other) {
            (ToolOutcome::Empty, right) => right,
            (left, ToolOutcome::Empty) => left,
            (
                ToolOutcome::Success {
                    output: o1,
                    image: i1,
                    system: s1,
                },
                ToolOutcome::Success {
                    output: o2,
                    image: i2,
                    system: s2,
                },
            ) => ToolOutcome::Success {
                output: concat_opt(o1, o2),
                image: i1.or(i2),
                system: concat_opt(s1, s2),
            },
            (
                ToolOutcome::Failure {
                    error: e1,
                    system: s1,
                },
                ToolOutcome::Failure {
                    error: e2,
                    system: s2,
                },
            ) => ToolOutcome::Failure {
                error: format!("{e1}{e2}"),
                system: concat_opt(s1, s2),
            },
            (ToolOutcome::Failure { error, system }, ToolOutcome::Success { system: s2, .. }) => {
                ToolOutcome::Failure {
                    error,
                    system: concat_opt(system, s2),
                }
            }
            (ToolOutcome::Success { system: s1, .. }, ToolOutcome::Failure { error, system }) => {
                ToolOutcome::Failure {
                    error,
                    system: concat_opt(s1, system),
                }
            }
        }
    }

    /// Attach system context to this outcome
    pub fn with_system(self, text: impl Into<String>) -> Self {
        match self {
            Self::Empty => Self::Success {
                output: None,
                image: None,
                system: Some(text.into()),
            },
            Self::Success { output, image, .. } => Self::Success {
                output,
                image,
                system: Some(text.into()),
            },
            Self::Failure { error, .. } => Self::Failure {
                error,
                system: Some(text.into()),
            },
        }
    }
}

fn concat_opt(a: Option<String>, b: Option<String>) -> Option<String> {
    match (a, b) {
        (Some(a), Some(b)) => Some(format!("{a}{b}")),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_concatenates_output_left_to_right() {
        let combined = ToolOutcome::output("first ").combine(ToolOutcome::output("second"));
        assert_eq!(combined, ToolOutcome::output("first second"));
    }

    #[test]
    fn test_combine_single_image_preserved() {
        let combined = ToolOutcome::output("moved").combine(ToolOutcome::image("cGln"));
        match combined {
            ToolOutcome::Success { output, image, .. } => {
                assert_eq!(output.as_deref(), Some("moved"));
                assert_eq!(image.as_deref(), Some("cGln"));
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn test_combine_keeps_first_image_only() {
        let combined = ToolOutcome::image("first").combine(ToolOutcome::image("second"));
        match combined {
            ToolOutcome::Success { image, .. } => assert_eq!(image.as_deref(), Some("first")),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_is_identity() {
        let out = ToolOutcome::output("hello");
        assert_eq!(ToolOutcome::Empty.combine(out.clone()), out);
        assert_eq!(out.clone().combine(ToolOutcome::Empty), out);
    }

    #[test]
    fn test_empty_outcome_is_empty() {
        assert!(ToolOutcome::Empty.is_empty());
        assert!(
            ToolOutcome::Success {
                output: Some(String::new()),
                image: None,
                system: None
            }
            .is_empty()
        );
        assert!(!ToolOutcome::output("x").is_empty());
        assert!(!ToolOutcome::failure("boom").is_empty());
    }

    #[test]
    fn test_failure_absorbs_success_image() {
        let combined = ToolOutcome::failure("boom").combine(ToolOutcome::image("cGln"));
        assert_eq!(combined, ToolOutcome::failure("boom"));
    }

    #[test]
    fn test_failure_errors_concatenate() {
        let combined = ToolOutcome::failure("a; ").combine(ToolOutcome::failure("b"));
        assert_eq!(combined, ToolOutcome::failure("a; b"));
    }
}
