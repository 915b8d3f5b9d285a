use std::path::Path;

use tracing::debug;
use wtcd_api::{content_to_lines, create_interpreter, step_error_to_wtcd, CreateInterpreterOptions};
use wtcd_runtime::StepError;

use crate::source::{read_story_source, read_test_case};
use crate::{ExpectedEvent, TestAction, TestCase, WtcdToolError};

const MAX_STEPS: usize = 5_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub observed_events: Vec<ExpectedEvent>,
    pub consumed_actions: usize,
    pub steps: usize,
}

pub fn run_case(story_dir: &Path, case: &TestCase) -> Result<RunReport, WtcdToolError> {
    let source = read_story_source(story_dir, &case.entry)?;
    let (mut interpreter, _) = create_interpreter(CreateInterpreterOptions {
        source,
        random_seed: Some(case.random_seed.clone()),
        feature_provider: None,
    })?;

    let mut observed_events = Vec::new();
    let mut action_index = 0usize;
    let mut choice = None;

    for step_count in 1..=MAX_STEPS {
        let step = match interpreter.resume(choice) {
            Ok(step) => step,
            Err(StepError::Runtime(error)) => {
                debug!(code = %error.code, "story stopped with a runtime error");
                observed_events.push(ExpectedEvent::Error {
                    code: error.code,
                    message: error.message,
                });
                return finish(observed_events, case, action_index, step_count);
            }
            Err(other) => return Err(step_error_to_wtcd(other).into()),
        };

        let paragraphs = content_to_lines(&step.output().content);
        if !paragraphs.is_empty() {
            observed_events.push(ExpectedEvent::Content { paragraphs });
        }

        if step.is_finished() {
            observed_events.push(ExpectedEvent::End);
            return finish(observed_events, case, action_index, step_count);
        }

        let choices = &step.output().choices;
        observed_events.push(ExpectedEvent::Choices {
            choices: choices.iter().map(|item| item.content.clone()).collect(),
            disabled: choices
                .iter()
                .enumerate()
                .filter(|(_, item)| item.disabled)
                .map(|(index, _)| index)
                .collect(),
        });
        let event_index = observed_events.len() - 1;
        let TestAction::Choose { index } = case
            .actions
            .get(action_index)
            .ok_or(WtcdToolError::MissingChoice { event_index })?;
        choice = Some(*index);
        action_index += 1;
    }

    Err(WtcdToolError::GuardExceeded {
        max_steps: MAX_STEPS,
    })
}

fn finish(
    observed_events: Vec<ExpectedEvent>,
    case: &TestCase,
    consumed_actions: usize,
    steps: usize,
) -> Result<RunReport, WtcdToolError> {
    if consumed_actions != case.actions.len() {
        return Err(WtcdToolError::UnusedActions {
            used: consumed_actions,
            total: case.actions.len(),
        });
    }
    Ok(RunReport {
        observed_events,
        consumed_actions,
        steps,
    })
}

/// Exact comparison, except error messages match by prefix so cases can
/// leave out source positions.
pub fn event_matches(expected: &ExpectedEvent, actual: &ExpectedEvent) -> bool {
    match (expected, actual) {
        (
            ExpectedEvent::Error { code, message },
            ExpectedEvent::Error {
                code: actual_code,
                message: actual_message,
            },
        ) => code == actual_code && actual_message.starts_with(message.as_str()),
        _ => expected == actual,
    }
}

pub fn assert_case(story_dir: &Path, case_path: &Path) -> Result<(), WtcdToolError> {
    let case = read_test_case(case_path)?;
    let report = run_case(story_dir, &case)?;

    if report.observed_events.len() != case.expected_events.len() {
        let observed = serde_json::to_string_pretty(&report.observed_events)
            .map_err(WtcdToolError::EventSerialize)?;
        return Err(WtcdToolError::EventCountMismatch {
            expected: case.expected_events.len(),
            actual: report.observed_events.len(),
            observed,
        });
    }

    for (index, (expected, actual)) in case
        .expected_events
        .iter()
        .zip(report.observed_events.iter())
        .enumerate()
    {
        if !event_matches(expected, actual) {
            let expected = serde_json::to_string(expected).map_err(WtcdToolError::EventSerialize)?;
            let actual = serde_json::to_string(actual).map_err(WtcdToolError::EventSerialize)?;
            return Err(WtcdToolError::EventMismatch {
                index,
                expected,
                actual,
            });
        }
    }

    Ok(())
}
