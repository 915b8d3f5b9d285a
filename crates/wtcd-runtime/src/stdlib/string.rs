use crate::engine::InterpreterHandle;
use crate::error::EvalError;
use crate::value::{format_number, NativeFunction, RuntimeValue};

use super::utils::{arg_number, arg_string, assert_args_length, is_integer, num, NativeResult};

pub(crate) const STRING_FUNCTIONS: &[(&str, NativeFunction)] = &[
    ("stringLength", string_length),
    ("stringFormatNumberFixed", string_format_number_fixed),
    ("stringFormatNumberPrecision", string_format_number_precision),
    ("stringSplit", string_split),
    ("stringSubByLength", string_sub_by_length),
    ("stringSubByIndex", string_sub_by_index),
];

// Lengths and indices count UTF-16 code units.
fn code_units(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

fn string_length(args: &[RuntimeValue], _: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 1, 1)?;
    let text = arg_string(args, 0, None)?;
    Ok(RuntimeValue::Number(text.encode_utf16().count() as f64))
}

/// Exact decimal digits of `magnitude` and the length of its integer part.
fn exact_digits(magnitude: f64) -> (Vec<u8>, usize) {
    // 1074 fraction digits hold every finite f64 without rounding.
    let text = format!("{magnitude:.1074}");
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let mut digits = integer.as_bytes().to_vec();
    digits.extend_from_slice(fraction.as_bytes());
    (digits, integer.len())
}

/// Keeps the first `keep` digits, rounding a tie away from zero. Returns
/// whether the carry added a leading digit.
fn round_half_up(digits: &mut Vec<u8>, keep: usize) -> bool {
    if digits.len() <= keep {
        digits.resize(keep, b'0');
        return false;
    }
    let round_up = digits[keep] >= b'5';
    digits.truncate(keep);
    if !round_up {
        return false;
    }
    for digit in digits.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            return false;
        }
    }
    digits.insert(0, b'1');
    true
}

fn sign_of(value: f64) -> &'static str {
    if value < 0.0 {
        "-"
    } else {
        ""
    }
}

/// Fixed-point text with `digits` fraction digits.
pub(crate) fn to_fixed(value: f64, digits: usize) -> String {
    if !value.is_finite() || value.abs() >= 1e21 {
        return format_number(value);
    }
    let (mut expansion, mut integer_len) = exact_digits(value.abs());
    if round_half_up(&mut expansion, integer_len + digits) {
        integer_len += 1;
    }
    let text = String::from_utf8_lossy(&expansion);
    let (integer, fraction) = text.split_at(integer_len);
    if fraction.is_empty() {
        format!("{}{integer}", sign_of(value))
    } else {
        format!("{}{integer}.{fraction}", sign_of(value))
    }
}

/// Text with `precision` significant digits, switching to exponent notation
/// when the exponent falls below -6 or reaches `precision`.
pub(crate) fn to_precision(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return format_number(value);
    }
    let (mantissa, exponent) = if value == 0.0 {
        ("0".repeat(precision), 0)
    } else {
        let (expansion, integer_len) = exact_digits(value.abs());
        let lead = expansion
            .iter()
            .position(|digit| *digit != b'0')
            .unwrap_or(0);
        let mut exponent = integer_len as i32 - 1 - lead as i32;
        let mut significant = expansion[lead..].to_vec();
        if round_half_up(&mut significant, precision) {
            significant.truncate(precision);
            exponent += 1;
        }
        (String::from_utf8_lossy(&significant).into_owned(), exponent)
    };
    let sign = sign_of(value);
    if exponent < -6 || exponent >= precision as i32 {
        let (first, rest) = mantissa.split_at(1);
        let exponent_sign = if exponent < 0 { '-' } else { '+' };
        let fraction = if rest.is_empty() {
            String::new()
        } else {
            format!(".{rest}")
        };
        return format!("{sign}{first}{fraction}e{exponent_sign}{}", exponent.abs());
    }
    if exponent < 0 {
        let zeros = "0".repeat((-exponent - 1) as usize);
        return format!("{sign}0.{zeros}{mantissa}");
    }
    let (integer, fraction) = mantissa.split_at(exponent as usize + 1);
    if fraction.is_empty() {
        format!("{sign}{integer}")
    } else {
        format!("{sign}{integer}.{fraction}")
    }
}

fn string_format_number_fixed(args: &[RuntimeValue], _: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 1, 2)?;
    let value = arg_number(args, 0, None)?;
    let digits = arg_number(args, 1, Some(0.0))?;
    if !(0.0..=100.0).contains(&digits) || !is_integer(digits) {
        return Err(EvalError::native(format!(
            "Digits must be an integer between 0 and 100, received: {}",
            num(digits)
        )));
    }
    Ok(RuntimeValue::String(to_fixed(value, digits as usize)))
}

fn string_format_number_precision(
    args: &[RuntimeValue],
    _: &mut InterpreterHandle,
) -> NativeResult {
    assert_args_length(args, 2, 2)?;
    let value = arg_number(args, 0, None)?;
    let digits = arg_number(args, 1, None)?;
    if !(1.0..=100.0).contains(&digits) || !is_integer(digits) {
        return Err(EvalError::native(format!(
            "Digits must be an integer between 1 and 100, received: {}",
            num(digits)
        )));
    }
    Ok(RuntimeValue::String(to_precision(value, digits as usize)))
}

fn string_split(args: &[RuntimeValue], _: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 2, 2)?;
    let text = arg_string(args, 0, None)?;
    let separator = arg_string(args, 1, None)?;
    let parts = if separator.is_empty() {
        text.encode_utf16()
            .map(|unit| RuntimeValue::String(String::from_utf16_lossy(&[unit])))
            .collect()
    } else {
        text.split(separator.as_str()).map(RuntimeValue::string).collect()
    };
    Ok(RuntimeValue::list(parts))
}

fn check_start_index(start: f64, length: usize) -> Result<usize, EvalError> {
    if start < 0.0 || !is_integer(start) {
        return Err(EvalError::native(format!(
            "Start index must be an nonnegative integer, received: {}",
            num(start)
        )));
    }
    if start > length as f64 {
        return Err(EvalError::native(format!(
            "Start cannot be larger than str length. startIndex={}, str length={length}",
            num(start)
        )));
    }
    Ok(start as usize)
}

fn string_sub_by_length(args: &[RuntimeValue], _: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 2, 3)?;
    let units = code_units(&arg_string(args, 0, None)?);
    let start = arg_number(args, 1, None)?;
    let length = arg_number(args, 2, Some(units.len() as f64 - start))?;
    let start = check_start_index(start, units.len())?;
    if length < 0.0 || !is_integer(length) {
        return Err(EvalError::native(format!(
            "Length must be an nonnegative integer, received: {}",
            num(length)
        )));
    }
    if start as f64 + length > units.len() as f64 {
        return Err(EvalError::native(format!(
            "Index out of bounds. startIndex={start}, length={}, str length={}.",
            num(length),
            units.len()
        )));
    }
    let end = start + length as usize;
    Ok(RuntimeValue::String(String::from_utf16_lossy(&units[start..end])))
}

fn string_sub_by_index(args: &[RuntimeValue], _: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 2, 3)?;
    let units = code_units(&arg_string(args, 0, None)?);
    let start = arg_number(args, 1, None)?;
    let end = arg_number(args, 2, Some(units.len() as f64))?;
    let start = check_start_index(start, units.len())?;
    if end < 0.0 || !is_integer(end) {
        return Err(EvalError::native(format!(
            "End index must be an nonnegative integer, received: {}",
            num(end)
        )));
    }
    if end < start as f64 || end > units.len() as f64 {
        return Err(EvalError::native(format!(
            "End index cannot be smaller than start index nor larger than the length of str. endIndex={}, startIndex={start}, str length={}",
            num(end),
            units.len()
        )));
    }
    Ok(RuntimeValue::String(String::from_utf16_lossy(
        &units[start..end as usize],
    )))
}

#[cfg(test)]
mod string_tests {
    use super::*;

    #[test]
    fn fixed_formatting_pads_and_rounds() {
        assert_eq!(to_fixed(3.14159, 2), "3.14");
        assert_eq!(to_fixed(2.0, 3), "2.000");
        assert_eq!(to_fixed(-0.0, 1), "0.0");
        assert_eq!(to_fixed(1e21, 2), "1e+21");
    }

    #[test]
    fn precision_switches_to_exponent_form() {
        assert_eq!(to_precision(123.456, 4), "123.5");
        assert_eq!(to_precision(0.000123, 2), "0.00012");
        assert_eq!(to_precision(123456.0, 2), "1.2e+5");
        assert_eq!(to_precision(0.0, 3), "0.00");
        assert_eq!(to_precision(1.5e-7, 2), "1.5e-7");
    }

    #[test]
    fn ties_round_away_from_zero() {
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(0.5, 0), "1");
        assert_eq!(to_fixed(-1.5, 0), "-2");
        assert_eq!(to_fixed(1.25, 1), "1.3");
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(to_precision(2.5, 1), "3");
        assert_eq!(to_precision(0.125, 2), "0.13");
        assert_eq!(to_precision(-2.5, 1), "-3");
    }

    #[test]
    fn rounding_follows_the_exact_binary_value() {
        assert_eq!(to_fixed(1.005, 2), "1.00");
        assert_eq!(to_fixed(1.45, 1), "1.4");
        assert_eq!(to_fixed(9.995, 2), "9.99");
        assert_eq!(to_fixed(9.96, 1), "10.0");
        assert_eq!(to_fixed(-0.0001, 2), "-0.00");
        assert_eq!(to_precision(99.96, 3), "100");
        assert_eq!(to_precision(9.96, 2), "10");
        assert_eq!(to_precision(999.6, 3), "1.00e+3");
    }
}
