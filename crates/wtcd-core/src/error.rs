use crate::types::SourceLocation;
use thiserror::Error;

pub const CODE_LEX: &str = "WTCD_LEX";
pub const CODE_PARSE: &str = "WTCD_PARSE";
pub const CODE_RUNTIME: &str = "WTCD_RUNTIME";
pub const CODE_NATIVE: &str = "WTCD_NATIVE";
pub const CODE_INTERNAL: &str = "WTCD_INTERNAL";

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{code}: {message}")]
pub struct WtcdError {
    pub code: String,
    pub message: String,
    pub location: Option<SourceLocation>,
    pub wtcd_stack: Vec<String>,
}

impl WtcdError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            location: None,
            wtcd_stack: Vec::new(),
        }
    }

    /// For errors that are raised at a position the parser knows exactly.
    pub fn at_line_column(
        code: impl Into<String>,
        message: impl AsRef<str>,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            code: code.into(),
            message: format!("{} at {line}:{column}.", message.as_ref()),
            location: Some(SourceLocation { line, column }),
            wtcd_stack: Vec::new(),
        }
    }

    /// `location` is `None` when the document was parsed without a source map.
    pub fn at_location(
        code: impl Into<String>,
        message: impl AsRef<str>,
        location: Option<&SourceLocation>,
    ) -> Self {
        match location {
            Some(location) => {
                Self::at_line_column(code, message, location.line, location.column)
            }
            None => Self::new(
                code,
                format!(
                    "{} at unknown location. (Try recompile in debug mode to enable source map)",
                    message.as_ref()
                ),
            ),
        }
    }

    pub fn at_unknown(code: impl Into<String>, message: impl AsRef<str>) -> Self {
        Self::new(
            code,
            format!(
                "{} at unknown location. (Location info is not available for this type of error)",
                message.as_ref()
            ),
        )
    }

    pub fn runtime(message: impl AsRef<str>, location: Option<&SourceLocation>) -> Self {
        Self::at_location(CODE_RUNTIME, message, location)
    }

    pub fn internal(message: impl AsRef<str>) -> Self {
        Self::at_unknown(CODE_INTERNAL, message)
    }

    pub fn push_wtcd_stack(&mut self, info: impl AsRef<str>, location: Option<&SourceLocation>) {
        let mut entry = format!("    at {}", info.as_ref());
        if let Some(location) = location {
            entry.push_str(&format!(":{}:{}", location.line, location.column));
        }
        self.wtcd_stack.push(entry);
    }

    pub fn with_wtcd_stack(
        mut self,
        info: impl AsRef<str>,
        location: Option<&SourceLocation>,
    ) -> Self {
        self.push_wtcd_stack(info, location);
        self
    }

    /// Message followed by the stack entries, innermost first.
    pub fn wtcd_stack_trace(&self) -> String {
        let mut out = self.message.clone();
        for entry in &self.wtcd_stack {
            out.push('\n');
            out.push_str(entry);
        }
        out
    }
}
