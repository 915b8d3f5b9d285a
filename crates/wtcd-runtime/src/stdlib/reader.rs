use crate::engine::InterpreterHandle;
use crate::value::{NativeFunction, RuntimeValue};

use super::utils::{arg_function, arg_string, assert_args_length, NativeResult};

pub(crate) const READER_FUNCTIONS: &[(&str, NativeFunction)] = &[
    ("readerSetPinned", reader_set_pinned),
    ("readerUnsetPinned", reader_unset_pinned),
    ("readerSetStateDesc", reader_set_state_desc),
    ("readerUnsetStateDesc", reader_unset_state_desc),
];

fn reader_set_pinned(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 1, 1)?;
    let function = arg_function(args, 0)?;
    handle.set_pinned_function(Some(function));
    Ok(RuntimeValue::Null)
}

fn reader_unset_pinned(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 0, 0)?;
    handle.set_pinned_function(None);
    Ok(RuntimeValue::Null)
}

fn reader_set_state_desc(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 1, 1)?;
    let state_desc = arg_string(args, 0, None)?;
    handle.set_state_desc(Some(state_desc));
    Ok(RuntimeValue::Null)
}

fn reader_unset_state_desc(
    args: &[RuntimeValue],
    handle: &mut InterpreterHandle,
) -> NativeResult {
    assert_args_length(args, 0, 0)?;
    handle.set_state_desc(None);
    Ok(RuntimeValue::Null)
}
