//! Test file loading
//!
//! Two formats: a YAML suite (`website` plus a `tests` list) and a
//! single-case YAML file (`website` plus `description`).

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

/// One named test in a suite
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestCase {
    pub name: String,
    /// Natural-language test steps, ending with an assertion
    pub prompt: String,
    /// What a correct run should observe; informational only
    #[serde(default)]
    pub expected_response: Option<String>,
}

/// A suite of tests against one site
#[derive(Debug, Clone, Deserialize)]
pub struct TestSuite {
    /// Site under test; may be overridden by --url
    #[serde(default)]
    pub website: Option<String>,
    pub tests: Vec<TestCase>,
}

/// A single test case file
#[derive(Debug, Clone, Deserialize)]
pub struct SingleCase {
    pub website: String,
    pub description: String,
}

pub fn load_suite(path: &Path) -> anyhow::Result<TestSuite> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read test file {}", path.display()))?;
    let suite: TestSuite = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse test file {}", path.display()))?;
    Ok(suite)
}

pub fn load_single(path: &Path) -> anyhow::Result<SingleCase> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read test case {}", path.display()))?;
    let case: SingleCase = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse test case {}", path.display()))?;
    Ok(case)
}
