//! probe-ai: Anthropic Messages API boundary
//!
//! This crate owns the wire shapes of the Messages API (content blocks,
//! tool declarations, usage accounting) and a blocking request/response
//! client. Provider quirks (direct API vs. Bedrock) are confined here.

pub mod client;
pub mod error;
pub mod types;

pub use client::{ApiProvider, ModelClient, ModelResponse};
pub use error::{Error, Result};
pub use types::*;
