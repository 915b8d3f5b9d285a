use std::rc::Rc;

use wtcd_core::{variable_type_accepts, FunctionExpression, RegisterName, ValueType};

use super::eval::EvalResult;
use super::{InterpreterHandle, RuntimeScope};
use crate::error::{ControlFlow, EvalError};
use crate::value::{FunctionValue, RuntimeValue, Variable};

impl InterpreterHandle {
    /// Calls `function` without attaching any location. Failures of the call
    /// itself come back as [`EvalError::Invocation`].
    pub fn invoke_function(
        &mut self,
        function: &Rc<FunctionValue>,
        args: &[RuntimeValue],
    ) -> EvalResult {
        match function.as_ref() {
            FunctionValue::Native { name, function } => match function(args, self) {
                Err(EvalError::Native(reason)) => Err(EvalError::Invocation(format!(
                    "Failed to call native function \"{name}\". Reason: {reason}"
                ))),
                other => other,
            },
            FunctionValue::Wtcd {
                expression,
                captured,
            } => {
                let mut scope = RuntimeScope::with_register(RegisterName::Return);
                for (name, cell) in captured {
                    scope.add_cell(name, Rc::clone(cell));
                }
                self.push_scope(scope);
                let result = self.invoke_wtcd_body(expression, args);
                let scope = self.pop_scope();
                match result {
                    Ok(evaluated) => {
                        let returned = scope.register(RegisterName::Return);
                        Ok(if returned.is_null() { evaluated } else { returned })
                    }
                    Err(EvalError::Signal(ControlFlow::Return)) => {
                        Ok(scope.register(RegisterName::Return))
                    }
                    Err(error) => Err(error),
                }
            }
            FunctionValue::Partial { .. } => {
                let mut left_applied = Vec::new();
                let mut right_applied = Vec::new();
                let mut current = function;
                while let FunctionValue::Partial {
                    is_left,
                    applied,
                    target,
                } = current.as_ref()
                {
                    if *is_left {
                        left_applied.splice(0..0, applied.iter().cloned());
                    } else {
                        right_applied.extend(applied.iter().cloned());
                    }
                    current = target;
                }
                let mut flattened = left_applied;
                flattened.extend_from_slice(args);
                flattened.extend(right_applied);
                self.invoke_function(current, &flattened)
            }
        }
    }

    fn invoke_wtcd_body(
        &mut self,
        expression: &FunctionExpression,
        args: &[RuntimeValue],
    ) -> EvalResult {
        for (index, argument) in expression.arguments.iter().enumerate() {
            let value = match args.get(index) {
                Some(value) if !value.is_null() => value.clone(),
                _ => match &argument.default_value {
                    Some(default_value) => self.evaluate(default_value)?,
                    None if variable_type_accepts(&argument.types, ValueType::Null) => {
                        RuntimeValue::Null
                    }
                    None => {
                        return Err(EvalError::Invocation(format!(
                            "The argument with index = {index} of invocation is omitted, but it does not have a default value and it does not allow null values"
                        )))
                    }
                },
            };
            if !variable_type_accepts(&argument.types, value.value_type()) {
                let expected = argument
                    .types
                    .as_deref()
                    .unwrap_or_default()
                    .iter()
                    .map(|ty| ty.as_str())
                    .collect::<Vec<_>>()
                    .join(",");
                return Err(EvalError::Invocation(format!(
                    "The argument with index = {index} of invocation has wrong type. Expected: {expected}, received: {}",
                    value.describe()
                )));
            }
            let ty = value.value_type();
            self.current_scope_mut()?
                .add_variable(&argument.name, Variable::new(Some(vec![ty]), value));
        }
        if let Some(rest_arg_name) = &expression.rest_arg_name {
            let rest = args
                .get(expression.arguments.len()..)
                .unwrap_or_default()
                .to_vec();
            self.current_scope_mut()?.add_variable(
                rest_arg_name,
                Variable::new(Some(vec![ValueType::List]), RuntimeValue::list(rest)),
            );
        }
        self.evaluate(&expression.expression)
    }
}
