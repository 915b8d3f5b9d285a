use std::f64::consts::PI;

use crate::engine::InterpreterHandle;
use crate::error::EvalError;
use crate::value::{NativeFunction, RuntimeValue};

use super::utils::{arg_number, assert_args_length, NativeResult};

pub(crate) const RANDOM_FUNCTIONS: &[(&str, NativeFunction)] = &[
    ("random", random),
    ("randomInt", random_int),
    ("randomBoolean", random_boolean),
    ("randomBiased", random_biased),
];

fn random(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 0, 2)?;
    let low = arg_number(args, 0, Some(0.0))?;
    let high = arg_number(args, 1, Some(1.0))?;
    Ok(RuntimeValue::Number(handle.random().next(low, high)))
}

fn random_int(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 2, 2)?;
    let low = arg_number(args, 0, None)?;
    let high = arg_number(args, 1, None)?;
    Ok(RuntimeValue::Number(handle.random().next_int(low, high)))
}

fn random_boolean(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 0, 1)?;
    let true_chance = arg_number(args, 0, Some(0.5))?;
    Ok(RuntimeValue::Boolean(handle.random().next_unit() < true_chance))
}

/// Normal distribution around `bias`, redrawn until it lands in `[low, high)`.
fn random_biased(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 0, 4)?;
    let low = arg_number(args, 0, Some(0.0))?;
    let high = arg_number(args, 1, Some(1.0))?;
    let bias = arg_number(args, 2, Some((low + high) / 2.0))?;
    let influence = arg_number(args, 3, Some(4.0))?;
    if low >= high {
        return Err(EvalError::native(
            "Low cannot be larger than or equal to high.",
        ));
    }
    if bias < low || bias > high {
        return Err(EvalError::native("Bias has to be between low and high."));
    }
    loop {
        let random = handle.random();
        let radius = (-2.0 * random.next_unit().ln()).sqrt();
        let angle = (2.0 * PI * random.next_unit()).cos();
        let norm = bias + (high - low) / influence * radius * angle;
        if norm >= low && norm < high {
            return Ok(RuntimeValue::Number(norm));
        }
    }
}
