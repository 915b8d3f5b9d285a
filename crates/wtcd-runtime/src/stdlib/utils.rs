use std::rc::Rc;

use wtcd_core::ValueType;

use crate::error::EvalError;
use crate::value::{format_number, FunctionValue, RuntimeValue};

pub(crate) type NativeResult = Result<RuntimeValue, EvalError>;

pub(crate) fn assert_args_length(
    args: &[RuntimeValue],
    min: usize,
    max: usize,
) -> Result<(), EvalError> {
    if args.len() < min {
        return Err(EvalError::native(format!(
            "Too few arguments are provided. Minimum number of arguments: {min}, received: {}",
            args.len()
        )));
    }
    if args.len() > max {
        return Err(EvalError::native(format!(
            "Too many arguments are provided. Maximum number of arguments: {max}, received: {}",
            args.len()
        )));
    }
    Ok(())
}

/// Missing arguments read as null.
pub(crate) fn nullify(args: &[RuntimeValue], index: usize) -> RuntimeValue {
    args.get(index).cloned().unwrap_or(RuntimeValue::Null)
}

fn assert_arg_type<T>(
    args: &[RuntimeValue],
    index: usize,
    expected: ValueType,
    default: Option<T>,
    extract: impl FnOnce(RuntimeValue) -> Option<T>,
) -> Result<T, EvalError> {
    let value = nullify(args, index);
    if let (RuntimeValue::Null, Some(default)) = (&value, default) {
        return Ok(default);
    }
    let description = value.describe();
    extract(value).ok_or_else(|| {
        EvalError::native(format!(
            "The argument with index = {index} of invocation has wrong type. Expected: {expected}, received: {description}"
        ))
    })
}

pub(crate) fn arg_number(
    args: &[RuntimeValue],
    index: usize,
    default: Option<f64>,
) -> Result<f64, EvalError> {
    assert_arg_type(args, index, ValueType::Number, default, |value| match value {
        RuntimeValue::Number(value) => Some(value),
        _ => None,
    })
}

pub(crate) fn arg_boolean(
    args: &[RuntimeValue],
    index: usize,
    default: Option<bool>,
) -> Result<bool, EvalError> {
    assert_arg_type(args, index, ValueType::Boolean, default, |value| match value {
        RuntimeValue::Boolean(value) => Some(value),
        _ => None,
    })
}

pub(crate) fn arg_string(
    args: &[RuntimeValue],
    index: usize,
    default: Option<&str>,
) -> Result<String, EvalError> {
    assert_arg_type(
        args,
        index,
        ValueType::String,
        default.map(str::to_string),
        |value| match value {
            RuntimeValue::String(value) => Some(value),
            _ => None,
        },
    )
}

pub(crate) fn arg_list(
    args: &[RuntimeValue],
    index: usize,
    default: Option<Vec<RuntimeValue>>,
) -> Result<Rc<Vec<RuntimeValue>>, EvalError> {
    assert_arg_type(
        args,
        index,
        ValueType::List,
        default.map(Rc::new),
        |value| match value {
            RuntimeValue::List(list) => Some(list),
            _ => None,
        },
    )
}

pub(crate) fn arg_function(
    args: &[RuntimeValue],
    index: usize,
) -> Result<Rc<FunctionValue>, EvalError> {
    assert_arg_type(args, index, ValueType::Function, None, |value| match value {
        RuntimeValue::Function(function) => Some(function),
        _ => None,
    })
}

pub(crate) fn is_integer(value: f64) -> bool {
    value % 1.0 == 0.0
}

/// Number text as documents print it, for use inside messages.
pub(crate) fn num(value: f64) -> String {
    format_number(value)
}
