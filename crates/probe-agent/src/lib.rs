//! probe-agent: the sampling loop that drives one test run
//!
//! The loop sends conversation state to the model, dispatches each
//! tool-use block it gets back through the registry, feeds encoded
//! results into the next call, and terminates on a plain text message
//! with no tool use.

pub mod encode;
pub mod error;
pub mod events;
pub mod outcome;
pub mod registry;
pub mod run;
pub mod tool;
pub mod transport;

pub use encode::encode_outcome;
pub use error::{Error, Result};
pub use events::LoopEvent;
pub use outcome::ToolOutcome;
pub use registry::ToolRegistry;
pub use run::{LoopConfig, RunOutcome, SamplingLoop};
pub use tool::{SharedTool, Tool, ToolError};
pub use transport::{ProviderTransport, RetryConfig, Transport};
