//! Error types for probe-agent

use thiserror::Error;

/// Result type alias using probe-agent Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while assembling a run
#[derive(Error, Debug)]
pub enum Error {
    /// Two tools were registered under the same name
    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),

    /// An error from the model API layer
    #[error(transparent)]
    Ai(#[from] probe_ai::Error),
}
