//! Tool trait and tool-level errors

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::outcome::ToolOutcome;
use probe_ai::ToolSpec;

/// Errors a tool may raise during one dispatch.
///
/// All variants are recoverable: the registry converts them into
/// failure outcomes that flow back to the model as error tool results.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// Unrecognized action name
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Missing or malformed argument for an action
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The focused element cannot accept the requested input
    #[error("Unsupported target: {0}")]
    UnsupportedTarget(String),

    /// The browser driver rejected or failed a command
    #[error("Driver error: {0}")]
    Driver(String),

    /// Anything else that went wrong during dispatch
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Trait for executable tools
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (used in dispatch and API declarations)
    fn name(&self) -> &str;

    /// The capability declaration sent to the model
    fn spec(&self) -> ToolSpec;

    /// Execute the tool with the given structured input
    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutcome, ToolError>;
}

/// Type alias for a shared tool
pub type SharedTool = Arc<dyn Tool>;
