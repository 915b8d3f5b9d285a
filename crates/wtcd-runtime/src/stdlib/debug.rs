use std::time::Instant;

use tracing::info;

use crate::engine::InterpreterHandle;
use crate::error::EvalError;
use crate::value::{NativeFunction, RuntimeValue};

use super::utils::{arg_boolean, arg_function, arg_string, assert_args_length, NativeResult};

pub(crate) const DEBUG_FUNCTIONS: &[(&str, NativeFunction)] = &[
    ("print", print),
    ("assert", assert),
    ("assertError", assert_error),
    ("timeStart", time_start),
    ("timeEnd", time_end),
];

fn print(args: &[RuntimeValue], _: &mut InterpreterHandle) -> NativeResult {
    for (index, arg) in args.iter().enumerate() {
        info!(target: "wtcd::print", "[{index}] {}", arg.describe());
    }
    Ok(RuntimeValue::Null)
}

fn assert(args: &[RuntimeValue], _: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 1, 1)?;
    if !arg_boolean(args, 0, None)? {
        return Err(EvalError::native("Assertion failed"));
    }
    Ok(RuntimeValue::Null)
}

fn assert_error(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 1, 1)?;
    let function = arg_function(args, 0)?;
    match handle.invoke_function(&function, &[]) {
        Err(EvalError::Runtime(_) | EvalError::Invocation(_)) => Ok(RuntimeValue::Null),
        Err(error) => Err(error),
        Ok(_) => Err(EvalError::native("Assertion failed, no error is thrown")),
    }
}

fn time_start(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 0, 1)?;
    let name = arg_string(args, 0, Some("default"))?;
    if handle.timers_mut().contains_key(&name) {
        return Err(EvalError::native(format!("Timer \"{name}\" already existed.")));
    }
    handle.timers_mut().insert(name, Instant::now());
    Ok(RuntimeValue::Null)
}

fn time_end(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 0, 1)?;
    let name = arg_string(args, 0, Some("default"))?;
    let Some(start) = handle.timers_mut().remove(&name) else {
        return Err(EvalError::native(format!("Cannot find timer \"{name}\".")));
    };
    info!(
        target: "wtcd::print",
        timer = %name,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "timer ended"
    );
    Ok(RuntimeValue::Null)
}
