//! Driver-level errors

use probe_agent::ToolError;
use thiserror::Error;

/// Errors from the browser session
#[derive(Error, Debug)]
pub enum Error {
    /// TLS connector setup failed
    #[error("failed to build TLS connector: {0}")]
    Tls(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// WebDriver session could not be established
    #[error("failed to start WebDriver session: {0}")]
    Session(#[from] fantoccini::error::NewSessionError),

    /// A WebDriver command failed
    #[error("WebDriver command failed: {0}")]
    Command(#[from] fantoccini::error::CmdError),

    /// An injected script returned a value we could not interpret
    #[error("script returned an unexpected value: {0}")]
    Script(String),

    /// Screenshot file I/O
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for ToolError {
    fn from(e: Error) -> Self {
        ToolError::Driver(e.to_string())
    }
}
