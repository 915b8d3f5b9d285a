use std::fmt::Display;

use serde::Serialize;
use wtcd_core::WtcdError;

fn map_error(code: &'static str, error: impl Display) -> WtcdError {
    WtcdError::new(code, error.to_string())
}

pub(crate) fn json_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// One entry of a WTCD stack, split into what ran and where it was declared.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct StackFrame {
    pub(crate) at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) column: Option<usize>,
}

/// Reads back an entry written by `WtcdError::push_wtcd_stack`:
/// `    at <info>` with an optional `:line:column` suffix.
pub(crate) fn parse_stack_entry(entry: &str) -> StackFrame {
    let trimmed = entry.trim_start();
    let info = trimmed.strip_prefix("at ").unwrap_or(trimmed);
    let mut parts = info.rsplitn(3, ':');
    if let (Some(column), Some(line), Some(at)) = (parts.next(), parts.next(), parts.next()) {
        if let (Ok(line), Ok(column)) = (line.parse(), column.parse()) {
            return StackFrame {
                at: at.to_string(),
                line: Some(line),
                column: Some(column),
            };
        }
    }
    StackFrame {
        at: info.to_string(),
        line: None,
        column: None,
    }
}

/// Agent-protocol lines describing `error`, innermost stack frame first.
pub(crate) fn error_envelope(error: &WtcdError) -> Vec<String> {
    let mut lines = vec![
        "RESULT:ERROR".to_string(),
        format!("ERROR_CODE:{}", error.code),
        format!("ERROR_MSG_JSON:{}", json_string(&error.message)),
    ];
    if let Some(location) = &error.location {
        lines.push(format!("ERROR_LOCATION:{}:{}", location.line, location.column));
    }
    for entry in &error.wtcd_stack {
        let frame = parse_stack_entry(entry);
        let payload = serde_json::to_string(&frame)
            .unwrap_or_else(|_| json_string(entry.trim_start()));
        lines.push(format!("ERROR_STACK_JSON:{payload}"));
    }
    lines
}

pub(crate) fn emit_error(error: WtcdError) -> i32 {
    for line in error_envelope(&error) {
        println!("{line}");
    }
    1
}

pub(crate) fn map_tui_io(error: std::io::Error) -> WtcdError {
    map_error("TUI_IO", error)
}

pub(crate) fn map_cli_source_path(error: std::io::Error) -> WtcdError {
    map_error("CLI_SOURCE_PATH", error)
}

pub(crate) fn map_cli_source_read(error: std::io::Error) -> WtcdError {
    map_error("CLI_SOURCE_READ", error)
}

pub(crate) fn map_cli_state_write(error: std::io::Error) -> WtcdError {
    map_error("CLI_STATE_WRITE", error)
}

pub(crate) fn map_cli_state_read(error: std::io::Error) -> WtcdError {
    map_error("CLI_STATE_READ", error)
}

pub(crate) fn map_cli_state_invalid(error: serde_json::Error) -> WtcdError {
    map_error("CLI_STATE_INVALID", error)
}
