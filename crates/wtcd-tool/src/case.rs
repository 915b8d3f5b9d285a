use serde::{Deserialize, Serialize};

pub const TESTCASE_SCHEMA_V1: &str = "wtcd-tool-case.v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub schema_version: String,
    #[serde(default = "default_entry")]
    pub entry: String,
    #[serde(default = "default_random_seed")]
    pub random_seed: String,
    #[serde(default)]
    pub actions: Vec<TestAction>,
    #[serde(default)]
    pub expected_events: Vec<ExpectedEvent>,
}

fn default_entry() -> String {
    "main".to_string()
}

fn default_random_seed() -> String {
    "wtcd-tool".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TestAction {
    Choose { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExpectedEvent {
    /// Text of one step, one entry per rendered block.
    Content {
        paragraphs: Vec<String>,
    },
    Choices {
        choices: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        disabled: Vec<usize>,
    },
    /// Runtime failure; an expected `message` matches as a prefix.
    Error {
        code: String,
        message: String,
    },
    End,
}
