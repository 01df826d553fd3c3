//! Fixture loading from YAML files

use serde::Deserialize;
use std::path::Path;

/// A single rendering case from a fixture file
#[derive(Debug, Clone, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub desc: String,
    /// Markup fed to the tokenizer
    pub input: String,
    /// Expected serialization of the rendered tree
    pub html: String,
    /// Expected node structure, when text-node granularity matters
    #[serde(default)]
    pub shape: Option<String>,
}

/// An SSE replay case: raw stream text and the payloads it should yield
#[derive(Debug, Clone, Deserialize)]
pub struct StreamCase {
    pub id: String,
    pub desc: String,
    pub stream: String,
    pub records: Vec<ExpectedRecord>,
}

/// Expected record - either bare data (type `message`) or [type, data]
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExpectedRecord {
    Message(String),
    Typed(String, String),
}

impl ExpectedRecord {
    pub fn event_type(&self) -> &str {
        match self {
            ExpectedRecord::Message(_) => "message",
            ExpectedRecord::Typed(event_type, _) => event_type,
        }
    }

    pub fn data(&self) -> &str {
        match self {
            ExpectedRecord::Message(data) => data,
            ExpectedRecord::Typed(_, data) => data,
        }
    }
}

fn load<T: for<'de> Deserialize<'de>>(name: &str) -> Vec<T> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(format!("{}.yaml", name));
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture file {:?}: {}", path, e));
    serde_yaml::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture file {:?}: {}", path, e))
}

/// Load rendering cases from the standard fixtures directory
pub fn load_fixtures_by_name(name: &str) -> Vec<TestCase> {
    load(name)
}

/// Load SSE replay cases from the standard fixtures directory
#[allow(dead_code)]
pub fn load_streams_by_name(name: &str) -> Vec<StreamCase> {
    load(name)
}
