use std::fmt;

use thiserror::Error;
use wtcd_core::error::{CODE_NATIVE, CODE_RUNTIME};
use wtcd_core::{SourceLocation, WtcdError};

pub const CODE_INVALID_CHOICE: &str = "WTCD_INVALID_CHOICE";
pub const CODE_CHOICE_REQUIRED: &str = "WTCD_CHOICE_REQUIRED";
pub const CODE_FINISHED: &str = "WTCD_FINISHED";

/// Non-local transfer raised by `yield`, `return`, `break` and `continue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Yield,
    Return,
    Break,
    Continue,
}

impl ControlFlow {
    pub fn as_str(self) -> &'static str {
        match self {
            ControlFlow::Yield => "yield",
            ControlFlow::Return => "return",
            ControlFlow::Break => "break",
            ControlFlow::Continue => "continue",
        }
    }
}

impl fmt::Display for ControlFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything that can unwind out of an evaluation.
#[derive(Debug, Clone, Error)]
pub enum EvalError {
    #[error(transparent)]
    Runtime(#[from] WtcdError),
    #[error("Uncaught BubbleSignal with type \"{0}\".")]
    Signal(ControlFlow),
    /// Raised by invocation itself; the invoking expression attaches its location.
    #[error("{0}")]
    Invocation(String),
    /// Raised inside a native function body.
    #[error("{0}")]
    Native(String),
}

impl EvalError {
    pub fn runtime(message: impl AsRef<str>, location: Option<&SourceLocation>) -> Self {
        EvalError::Runtime(WtcdError::runtime(message, location))
    }

    pub fn native(message: impl Into<String>) -> Self {
        EvalError::Native(message.into())
    }

    /// Collapses whatever escaped to the top level into a located error.
    pub fn into_wtcd_error(self) -> WtcdError {
        match self {
            EvalError::Runtime(error) => error,
            EvalError::Signal(signal) => WtcdError::at_unknown(
                CODE_RUNTIME,
                format!("Uncaught BubbleSignal with type \"{signal}\"."),
            ),
            EvalError::Invocation(message) | EvalError::Native(message) => {
                WtcdError::at_unknown(CODE_NATIVE, message)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid choice {choice}.")]
pub struct InvalidChoiceError {
    pub choice: usize,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepError {
    #[error(transparent)]
    Runtime(#[from] WtcdError),
    #[error(transparent)]
    InvalidChoice(#[from] InvalidChoiceError),
    #[error("The interpreter is waiting for a choice.")]
    ChoiceRequired,
    #[error("Interpretation has already finished.")]
    Finished,
}

impl StepError {
    pub fn code(&self) -> &str {
        match self {
            StepError::Runtime(error) => &error.code,
            StepError::InvalidChoice(_) => CODE_INVALID_CHOICE,
            StepError::ChoiceRequired => CODE_CHOICE_REQUIRED,
            StepError::Finished => CODE_FINISHED,
        }
    }

    /// Message plus the WTCD stack for runtime errors.
    pub fn detail(&self) -> String {
        match self {
            StepError::Runtime(error) => error.wtcd_stack_trace(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn escaped_signals_become_unknown_location_errors() {
        let error = EvalError::Signal(ControlFlow::Break).into_wtcd_error();
        assert_eq!(error.code, CODE_RUNTIME);
        assert!(error
            .message
            .starts_with("Uncaught BubbleSignal with type \"break\". at unknown location."));
    }

    #[test]
    fn step_errors_expose_codes() {
        let invalid = StepError::from(InvalidChoiceError { choice: 4 });
        assert_eq!(invalid.to_string(), "Invalid choice 4.");
        assert_eq!(invalid.code(), CODE_INVALID_CHOICE);
        let runtime = StepError::from(
            WtcdError::runtime("Boom", None).with_wtcd_stack("initialization", None),
        );
        assert_eq!(runtime.code(), CODE_RUNTIME);
        assert!(runtime.detail().ends_with("\n    at initialization"));
    }
}
