use crate::engine::InterpreterHandle;
use crate::value::{NativeFunction, RuntimeValue};

use super::utils::{arg_number, assert_args_length, NativeResult};

pub(crate) const MATH_FUNCTIONS: &[(&str, NativeFunction)] = &[
    ("mathMin", math_min),
    ("mathMax", math_max),
    ("mathFloor", math_floor),
    ("mathCeil", math_ceil),
];

fn math_min(args: &[RuntimeValue], _: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 1, usize::MAX)?;
    let mut min = f64::INFINITY;
    for index in 0..args.len() {
        let value = arg_number(args, index, None)?;
        if value < min {
            min = value;
        }
    }
    Ok(RuntimeValue::Number(min))
}

fn math_max(args: &[RuntimeValue], _: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 1, usize::MAX)?;
    let mut max = f64::NEG_INFINITY;
    for index in 0..args.len() {
        let value = arg_number(args, index, None)?;
        if value > max {
            max = value;
        }
    }
    Ok(RuntimeValue::Number(max))
}

fn math_floor(args: &[RuntimeValue], _: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 1, 1)?;
    Ok(RuntimeValue::Number(arg_number(args, 0, None)?.floor()))
}

fn math_ceil(args: &[RuntimeValue], _: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 1, 1)?;
    Ok(RuntimeValue::Number(arg_number(args, 0, None)?.ceil()))
}
