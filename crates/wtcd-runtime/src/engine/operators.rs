use std::rc::Rc;

use wtcd_core::{
    BinaryOperator, Expression, ExpressionKind, SourceLocation, UnaryOperator, WtcdError,
};

use super::eval::EvalResult;
use super::scope::assign_value_to_variable;
use super::InterpreterHandle;
use crate::error::EvalError;
use crate::value::{format_number, is_equal, FunctionValue, RuntimeValue};

impl InterpreterHandle {
    pub(crate) fn evaluate_unary(
        &mut self,
        operator: UnaryOperator,
        arg: &Expression,
        location: Option<&SourceLocation>,
    ) -> EvalResult {
        let value = self.evaluate(arg)?;
        match (operator, value) {
            (UnaryOperator::Negate, RuntimeValue::Number(value)) => {
                Ok(RuntimeValue::Number(-value))
            }
            (UnaryOperator::Not, RuntimeValue::Boolean(value)) => Ok(RuntimeValue::Boolean(!value)),
            (operator, other) => {
                let expected = match operator {
                    UnaryOperator::Negate => "a number",
                    UnaryOperator::Not => "a boolean",
                };
                Err(EvalError::runtime(
                    format!(
                        "Unary operator \"{}\" can only be applied to {expected}, received: {}",
                        operator.symbol(),
                        other.describe()
                    ),
                    location,
                ))
            }
        }
    }

    pub(crate) fn evaluate_binary(
        &mut self,
        operator: BinaryOperator,
        arg0: &Expression,
        arg1: &Expression,
        location: Option<&SourceLocation>,
    ) -> EvalResult {
        use BinaryOperator as Op;
        match operator {
            Op::Assign => self.evaluate_assign(arg0, arg1, location),
            Op::AddAssign => self.evaluate_add_assign(arg0, arg1, location),
            Op::SubAssign | Op::MulAssign | Op::DivAssign | Op::IntDivAssign | Op::RemAssign => {
                self.evaluate_op_assign(operator, arg0, arg1, location)
            }
            Op::Or | Op::And => self.evaluate_logical(operator, arg0, arg1, location),
            Op::NullishStrict => {
                let left = self.evaluate(arg0)?;
                if !left.is_null() {
                    return Ok(left);
                }
                let right = self.evaluate(arg1)?;
                if right.is_null() {
                    return Err(EvalError::runtime(
                        "Right side of binary operator \"?!\" cannot be null. If returning null is desired in this case, please use \"??\" instead",
                        location,
                    ));
                }
                Ok(right)
            }
            Op::Nullish => {
                let left = self.evaluate(arg0)?;
                if !left.is_null() {
                    return Ok(left);
                }
                self.evaluate(arg1)
            }
            Op::NullableIndex | Op::NullableIndexOrNull | Op::NullableInvoke => {
                let left = self.evaluate(arg0)?;
                if left.is_null() {
                    return Ok(left);
                }
                let right = self.evaluate(arg1)?;
                self.apply_binary(operator, left, right, location)
            }
            _ => {
                let left = self.evaluate(arg0)?;
                let right = self.evaluate(arg1)?;
                self.apply_binary(operator, left, right, location)
            }
        }
    }

    /// Operators whose operands are both evaluated up front.
    fn apply_binary(
        &mut self,
        operator: BinaryOperator,
        left: RuntimeValue,
        right: RuntimeValue,
        location: Option<&SourceLocation>,
    ) -> EvalResult {
        use BinaryOperator as Op;
        match operator {
            Op::Eq => Ok(RuntimeValue::Boolean(is_equal(&left, &right))),
            Op::NotEq => Ok(RuntimeValue::Boolean(!is_equal(&left, &right))),
            Op::Add => match (&left, &right) {
                (RuntimeValue::Number(l), RuntimeValue::Number(r)) => {
                    Ok(RuntimeValue::Number(l + r))
                }
                (RuntimeValue::String(l), RuntimeValue::String(r)) => {
                    Ok(RuntimeValue::String(format!("{l}{r}")))
                }
                _ => Err(EvalError::runtime(
                    format!(
                        "Binary operator \"+\" can only be applied to two strings or two numbers, received: {} (left) and {} (right)",
                        left.describe(),
                        right.describe()
                    ),
                    location,
                )),
            },
            Op::Lt | Op::LtEq | Op::Gt | Op::GtEq | Op::Sub | Op::Mul | Op::Div | Op::IntDiv
            | Op::Rem | Op::Pow => {
                let (RuntimeValue::Number(l), RuntimeValue::Number(r)) = (&left, &right) else {
                    return Err(EvalError::runtime(
                        format!(
                            "Binary operator \"{}\" can only be applied to two numbers, received: {} (left) and {} (right)",
                            operator.symbol(),
                            left.describe(),
                            right.describe()
                        ),
                        location,
                    ));
                };
                Ok(match operator {
                    Op::Lt => RuntimeValue::Boolean(l < r),
                    Op::LtEq => RuntimeValue::Boolean(l <= r),
                    Op::Gt => RuntimeValue::Boolean(l > r),
                    Op::GtEq => RuntimeValue::Boolean(l >= r),
                    _ => RuntimeValue::Number(numeric(operator, *l, *r)),
                })
            }
            Op::Index | Op::IndexOrNull | Op::NullableIndex | Op::NullableIndexOrNull => {
                index_list(operator, &left, &right, location)
            }
            Op::Invoke | Op::NullableInvoke => {
                self.regular_invocation(operator, left, right, location)
            }
            Op::Pipeline => {
                let RuntimeValue::Function(function) = &right else {
                    return Err(EvalError::runtime(
                        format!(
                            "Right side of pipeline invocation \"|>\" is expected to be a function, received: {}",
                            right.describe()
                        ),
                        location,
                    ));
                };
                let result = self.invoke_function(function, &[left.clone()]);
                located_invocation(operator, result, location)
            }
            Op::ReverseInvoke => {
                let RuntimeValue::List(args) = &left else {
                    return Err(EvalError::runtime(
                        format!(
                            "Left side of reverse invocation \"|::\" is expected to be a list, received: {}",
                            left.describe()
                        ),
                        location,
                    ));
                };
                let RuntimeValue::Function(function) = &right else {
                    return Err(EvalError::runtime(
                        format!(
                            "Right side of reverse invocation \"|::\" is expected to be a function, received: {}",
                            right.describe()
                        ),
                        location,
                    ));
                };
                let result = self.invoke_function(function, args);
                located_invocation(operator, result, location)
            }
            Op::PartialLeft | Op::PartialRight => partially_apply(operator, left, right, location),
            Op::Assign
            | Op::AddAssign
            | Op::SubAssign
            | Op::MulAssign
            | Op::DivAssign
            | Op::IntDivAssign
            | Op::RemAssign
            | Op::Or
            | Op::And
            | Op::NullishStrict
            | Op::Nullish => Err(unexpected_lazy_operator(operator)),
        }
    }

    fn regular_invocation(
        &mut self,
        operator: BinaryOperator,
        left: RuntimeValue,
        right: RuntimeValue,
        location: Option<&SourceLocation>,
    ) -> EvalResult {
        let RuntimeValue::Function(function) = &left else {
            return Err(EvalError::runtime(
                format!(
                    "Left side of function invocation \"{}\" is expected to be a function, received: {}",
                    operator.symbol(),
                    left.describe()
                ),
                location,
            ));
        };
        let RuntimeValue::List(args) = &right else {
            return Err(EvalError::runtime(
                format!(
                    "Right side of function invocation \"{}\" is expected to be a list, received: {}",
                    operator.symbol(),
                    right.describe()
                ),
                location,
            ));
        };
        let result = self.invoke_function(function, args);
        located_invocation(operator, result, location)
    }

    fn evaluate_assign(
        &mut self,
        arg0: &Expression,
        arg1: &Expression,
        location: Option<&SourceLocation>,
    ) -> EvalResult {
        let name = variable_reference_name(BinaryOperator::Assign, arg0, location)?;
        let cell = self.resolve_variable_reference(name)?;
        let value = self.evaluate(arg1)?;
        assign_value_to_variable(&mut cell.borrow_mut(), value.clone(), location, name)?;
        Ok(value)
    }

    fn evaluate_add_assign(
        &mut self,
        arg0: &Expression,
        arg1: &Expression,
        location: Option<&SourceLocation>,
    ) -> EvalResult {
        let name = variable_reference_name(BinaryOperator::AddAssign, arg0, location)?;
        let cell = self.resolve_variable_reference(name)?;
        let current = cell.borrow().value.clone();
        if !matches!(current, RuntimeValue::Number(_) | RuntimeValue::String(_)) {
            return Err(EvalError::runtime(
                format!(
                    "Left side of binary operator \"+=\" has to be a variable of type number or string, actual type: {}",
                    current.value_type()
                ),
                location,
            ));
        }
        let right = self.evaluate(arg1)?;
        let updated = match (&current, &right) {
            (RuntimeValue::Number(l), RuntimeValue::Number(r)) => RuntimeValue::Number(l + r),
            (RuntimeValue::String(l), RuntimeValue::String(r)) => {
                RuntimeValue::String(format!("{l}{r}"))
            }
            _ => {
                return Err(EvalError::runtime(
                    format!(
                        "Right side of binary operator \"+=\" has to  be a {}, received: {}",
                        current.value_type(),
                        right.describe()
                    ),
                    location,
                ))
            }
        };
        cell.borrow_mut().value = updated.clone();
        Ok(updated)
    }

    fn evaluate_op_assign(
        &mut self,
        operator: BinaryOperator,
        arg0: &Expression,
        arg1: &Expression,
        location: Option<&SourceLocation>,
    ) -> EvalResult {
        let name = variable_reference_name(operator, arg0, location)?;
        let cell = self.resolve_variable_reference(name)?;
        let current = cell.borrow().value.clone();
        let RuntimeValue::Number(current) = current else {
            return Err(EvalError::runtime(
                format!(
                    "Left side of binary operator \"{}\" has to be a variable of type number, actual type: {}",
                    operator.symbol(),
                    current.value_type()
                ),
                location,
            ));
        };
        let right = self.evaluate(arg1)?;
        let RuntimeValue::Number(right) = right else {
            return Err(EvalError::runtime(
                format!(
                    "Right side of binary operator \"{}\"  has to be a number, received: {}",
                    operator.symbol(),
                    right.describe()
                ),
                location,
            ));
        };
        let base = match operator {
            BinaryOperator::SubAssign => BinaryOperator::Sub,
            BinaryOperator::MulAssign => BinaryOperator::Mul,
            BinaryOperator::DivAssign => BinaryOperator::Div,
            BinaryOperator::IntDivAssign => BinaryOperator::IntDiv,
            _ => BinaryOperator::Rem,
        };
        let updated = RuntimeValue::Number(numeric(base, current, right));
        cell.borrow_mut().value = updated.clone();
        Ok(updated)
    }

    fn evaluate_logical(
        &mut self,
        operator: BinaryOperator,
        arg0: &Expression,
        arg1: &Expression,
        location: Option<&SourceLocation>,
    ) -> EvalResult {
        let short_circuit = operator == BinaryOperator::Or;
        let symbol = operator.symbol();
        match self.evaluate(arg0)? {
            RuntimeValue::Boolean(value) if value == short_circuit => {
                return Ok(RuntimeValue::Boolean(value))
            }
            RuntimeValue::Boolean(_) => {}
            other => {
                return Err(EvalError::runtime(
                    format!(
                        "Left side of binary operator \"{symbol}\" has to be a boolean. Received {}",
                        other.describe()
                    ),
                    location,
                ))
            }
        }
        match self.evaluate(arg1)? {
            RuntimeValue::Boolean(value) => Ok(RuntimeValue::Boolean(value)),
            other => Err(EvalError::runtime(
                format!(
                    "Right side of binary operator \"{symbol}\" has to be a boolean. Received {}",
                    other.describe()
                ),
                location,
            )),
        }
    }
}

fn unexpected_lazy_operator(operator: BinaryOperator) -> EvalError {
    WtcdError::internal(format!(
        "Operator \"{}\" cannot be applied to evaluated operands",
        operator.symbol()
    ))
    .into()
}

fn numeric(operator: BinaryOperator, left: f64, right: f64) -> f64 {
    match operator {
        BinaryOperator::Sub => left - right,
        BinaryOperator::Mul => left * right,
        BinaryOperator::Div => left / right,
        BinaryOperator::IntDiv => (left / right).trunc(),
        BinaryOperator::Rem => left % right,
        BinaryOperator::Pow => left.powf(right),
        _ => left + right,
    }
}

fn variable_reference_name<'e>(
    operator: BinaryOperator,
    arg0: &'e Expression,
    location: Option<&SourceLocation>,
) -> EvalResult<&'e str> {
    match &arg0.kind {
        ExpressionKind::VariableReference { variable_name } => Ok(variable_name),
        _ => Err(EvalError::runtime(
            format!(
                "Left side of binary operator \"{}\" has to be a variable reference",
                operator.symbol()
            ),
            location,
        )),
    }
}

fn index_list(
    operator: BinaryOperator,
    left: &RuntimeValue,
    right: &RuntimeValue,
    location: Option<&SourceLocation>,
) -> EvalResult {
    use BinaryOperator as Op;
    let symbol = operator.symbol();
    let nullable_left = matches!(operator, Op::NullableIndex | Op::NullableIndexOrNull);
    let RuntimeValue::List(list) = left else {
        let expected = if nullable_left { "a list or null" } else { "a list" };
        return Err(EvalError::runtime(
            format!(
                "Left side of binary operator \"{symbol}\" is expected to be {expected}. Received: {}",
                left.describe()
            ),
            location,
        ));
    };
    let index = match right {
        RuntimeValue::Number(index) if index % 1.0 == 0.0 => *index,
        other => {
            return Err(EvalError::runtime(
                format!(
                    "Right side of binary operator \"{symbol}\" is expected to be an integer. Received: {}",
                    other.describe()
                ),
                location,
            ))
        }
    };
    let element = if index >= 0.0 {
        list.get(index as usize).cloned()
    } else {
        None
    };
    match (element, operator) {
        (Some(element), _) => Ok(element),
        (None, Op::IndexOrNull | Op::NullableIndexOrNull) => Ok(RuntimeValue::Null),
        (None, _) => {
            let alternative = if nullable_left { "?.?" } else { ".?" };
            Err(EvalError::runtime(
                format!(
                    "List does not have an element at {}. If return null is desired, use \"{alternative}\" instead. List contents: {}",
                    format_number(index),
                    left.describe()
                ),
                location,
            ))
        }
    }
}

/// `.:` keeps its arguments on the left of later ones, `:.` on the right.
fn partially_apply(
    operator: BinaryOperator,
    left: RuntimeValue,
    right: RuntimeValue,
    location: Option<&SourceLocation>,
) -> EvalResult {
    let symbol = operator.symbol();
    let RuntimeValue::Function(target) = &left else {
        return Err(EvalError::runtime(
            format!(
                "Left side of binary operator \"{symbol}\" is expected to be a function. Received: {}",
                left.describe()
            ),
            location,
        ));
    };
    let RuntimeValue::List(applied) = &right else {
        return Err(EvalError::runtime(
            format!(
                "Right side of binary operator \"{symbol}\" is expected to be a list. Received: {}",
                right.describe()
            ),
            location,
        ));
    };
    if applied.is_empty() {
        return Ok(RuntimeValue::Function(Rc::clone(target)));
    }
    Ok(RuntimeValue::Function(Rc::new(FunctionValue::Partial {
        is_left: operator == BinaryOperator::PartialLeft,
        applied: applied.to_vec(),
        target: Rc::clone(target),
    })))
}

/// Attaches the invoking expression to whatever the invocation raised.
fn located_invocation(
    operator: BinaryOperator,
    result: EvalResult,
    location: Option<&SourceLocation>,
) -> EvalResult {
    match result {
        Err(EvalError::Invocation(message)) => Err(EvalError::runtime(message, location)),
        Err(EvalError::Runtime(mut error)) => {
            error.push_wtcd_stack(format!("\"{}\" invocation", operator.symbol()), location);
            Err(EvalError::Runtime(error))
        }
        other => other,
    }
}
