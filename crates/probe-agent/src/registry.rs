//! Tool registry: name-keyed dispatch that never lets an error escape

use std::collections::HashMap;
use std::time::Duration;

use crate::{
    error::{Error, Result},
    outcome::ToolOutcome,
    tool::SharedTool,
};
use probe_ai::ToolSpec;

/// Default per-dispatch deadline. A hung browser command becomes a
/// failure outcome instead of blocking the loop forever.
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(120);

/// An immutable map from tool name to tool instance
pub struct ToolRegistry {
    tools: Vec<SharedTool>,
    by_name: HashMap<String, usize>,
    dispatch_timeout: Duration,
}

impl ToolRegistry {
    /// Build a registry from a list of tools.
    ///
    /// Duplicate names are a construction-time error.
    pub fn new(tools: Vec<SharedTool>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(tools.len());
        for (idx, tool) in tools.iter().enumerate() {
            if by_name.insert(tool.name().to_string(), idx).is_some() {
                return Err(Error::DuplicateTool(tool.name().to_string()));
            }
        }
        Ok(Self {
            tools,
            by_name,
            dispatch_timeout: DEFAULT_DISPATCH_TIMEOUT,
        })
    }

    /// Set the per-dispatch timeout
    pub fn with_dispatch_timeout(mut self, timeout: Duration) -> Self {
        self.dispatch_timeout = timeout;
        self
    }

    /// Declared capability schemas for every registered tool
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    /// Dispatch one tool-use request.
    ///
    /// Every failure mode is represented as data: unknown names, tool
    /// errors, and timeouts all come back as `ToolOutcome::Failure`.
    pub async fn dispatch(&self, name: &str, input: serde_json::Value) -> ToolOutcome {
        let Some(&idx) = self.by_name.get(name) else {
            return ToolOutcome::failure(format!("Tool '{name}' is invalid"));
        };
        let tool = &self.tools[idx];

        match tokio::time::timeout(self.dispatch_timeout, tool.invoke(input)).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                tracing::warn!(tool = name, error = %err, "tool dispatch failed");
                ToolOutcome::failure(err.to_string())
            }
            Err(_) => {
                tracing::warn!(tool = name, timeout = ?self.dispatch_timeout, "tool dispatch timed out");
                ToolOutcome::failure(format!(
                    "Unexpected error: tool '{name}' timed out after {:?}",
                    self.dispatch_timeout
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{Tool, ToolError};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct StubTool {
        tool_name: &'static str,
        behavior: StubBehavior,
    }

    enum StubBehavior {
        Succeed,
        Fail(ToolError),
        Hang,
    }

    #[async_trait]
    impl Tool for StubTool {
        fn name(&self) -> &str {
            self.tool_name
        }
        fn spec(&self) -> ToolSpec {
            ToolSpec::custom(self.tool_name, "stub", serde_json::json!({"type": "object"}))
        }
        async fn invoke(
            &self,
            _input: serde_json::Value,
        ) -> std::result::Result<ToolOutcome, ToolError> {
            match &self.behavior {
                StubBehavior::Succeed => Ok(ToolOutcome::output("ok")),
                StubBehavior::Fail(err) => Err(err.clone()),
                StubBehavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(ToolOutcome::Empty)
                }
            }
        }
    }

    fn stub(name: &'static str, behavior: StubBehavior) -> SharedTool {
        Arc::new(StubTool {
            tool_name: name,
            behavior,
        })
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = ToolRegistry::new(vec![
            stub("computer", StubBehavior::Succeed),
            stub("computer", StubBehavior::Succeed),
        ]);
        assert!(matches!(result, Err(Error::DuplicateTool(name)) if name == "computer"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_failure_with_name() {
        let registry = ToolRegistry::new(vec![stub("computer", StubBehavior::Succeed)]).unwrap();
        let outcome = registry.dispatch("keyboard", serde_json::json!({})).await;
        match outcome {
            ToolOutcome::Failure { error, .. } => {
                assert_eq!(error, "Tool 'keyboard' is invalid");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_tool_error_captured_as_failure() {
        let registry = ToolRegistry::new(vec![stub(
            "computer",
            StubBehavior::Fail(ToolError::InvalidArgument("coordinate required".into())),
        )])
        .unwrap();
        let outcome = registry.dispatch("computer", serde_json::json!({})).await;
        match outcome {
            ToolOutcome::Failure { error, .. } => {
                assert!(error.contains("coordinate required"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_dispatch_becomes_failure() {
        let registry = ToolRegistry::new(vec![stub("computer", StubBehavior::Hang)])
            .unwrap()
            .with_dispatch_timeout(Duration::from_secs(5));
        let outcome = registry.dispatch("computer", serde_json::json!({})).await;
        match outcome {
            ToolOutcome::Failure { error, .. } => assert!(error.contains("timed out")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_specs_exported_in_order() {
        let registry = ToolRegistry::new(vec![
            stub("alpha", StubBehavior::Succeed),
            stub("beta", StubBehavior::Succeed),
        ])
        .unwrap();
        let names: Vec<_> = registry.specs().iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }
}
