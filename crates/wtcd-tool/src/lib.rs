mod case;
mod runner;
mod source;

pub use case::{ExpectedEvent, TestAction, TestCase, TESTCASE_SCHEMA_V1};
pub use runner::{assert_case, event_matches, run_case, RunReport};
pub use source::{find_story_dirs, read_story_source, read_test_case};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WtcdToolError {
    #[error("Failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse testcase {path}: {source}")]
    ParseCase {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid testcase schema version \"{found}\", expected \"{expected}\".")]
    InvalidSchemaVersion { expected: String, found: String },
    #[error("Story {entry}.wtcd not found under {path}.")]
    StoryNotFound { path: PathBuf, entry: String },
    #[error("Interpreter error: {0}")]
    Wtcd(#[from] wtcd_core::WtcdError),
    #[error("Story offered choices at event index {event_index}, but no choose action is left.")]
    MissingChoice { event_index: usize },
    #[error("Story ended after {used} of {total} choose actions.")]
    UnusedActions { used: usize, total: usize },
    #[error("Story did not end within {max_steps} steps.")]
    GuardExceeded { max_steps: usize },
    #[error("Expected {expected} events, observed {actual}:\n{observed}")]
    EventCountMismatch {
        expected: usize,
        actual: usize,
        observed: String,
    },
    #[error("Event {index} differs. expected={expected} actual={actual}")]
    EventMismatch {
        index: usize,
        expected: String,
        actual: String,
    },
    #[error("Failed to serialize event for diff: {0}")]
    EventSerialize(serde_json::Error),
}
