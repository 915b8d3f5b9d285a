use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wtcd_core::error::CODE_INTERNAL;
use wtcd_core::{variable_type_accepts, RegisterName, SourceLocation, WtcdError};

use super::InterpreterHandle;
use crate::error::EvalError;
use crate::value::{RuntimeValue, Variable};

#[derive(Debug, Default)]
pub(crate) struct RuntimeScope {
    variables: HashMap<String, Rc<RefCell<Variable>>>,
    registers: HashMap<RegisterName, RuntimeValue>,
}

impl RuntimeScope {
    pub(crate) fn with_register(register: RegisterName) -> Self {
        let mut scope = Self::default();
        scope.registers.insert(register, RuntimeValue::Null);
        scope
    }

    pub(crate) fn add_variable(&mut self, name: &str, variable: Variable) {
        self.add_cell(name, variable.into_cell());
    }

    pub(crate) fn add_cell(&mut self, name: &str, cell: Rc<RefCell<Variable>>) {
        self.variables.insert(name.to_string(), cell);
    }

    pub(crate) fn register(&self, register: RegisterName) -> RuntimeValue {
        self.registers
            .get(&register)
            .cloned()
            .unwrap_or(RuntimeValue::Null)
    }
}

impl InterpreterHandle {
    pub(crate) fn push_scope(&mut self, scope: RuntimeScope) {
        self.scopes.push(scope);
    }

    pub(crate) fn pop_scope(&mut self) -> RuntimeScope {
        self.scopes.pop().unwrap_or_default()
    }

    pub(crate) fn current_scope_mut(&mut self) -> Result<&mut RuntimeScope, EvalError> {
        self.scopes
            .last_mut()
            .ok_or_else(|| WtcdError::internal("No runtime scope is active").into())
    }

    pub(crate) fn resolve_variable_reference(
        &self,
        name: &str,
    ) -> Result<Rc<RefCell<Variable>>, EvalError> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.variables.get(name))
            .cloned()
            .ok_or_else(|| {
                WtcdError::at_unknown(
                    CODE_INTERNAL,
                    format!(
                        "Cannot resolve variable reference \"{name}\". This is most likely caused by WTCD compiler's error or the compiled output has been modified"
                    ),
                )
                .into()
            })
    }

    pub(crate) fn set_register(
        &mut self,
        register: RegisterName,
        value: RuntimeValue,
    ) -> Result<(), EvalError> {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.registers.get_mut(&register) {
                *slot = value;
                return Ok(());
            }
        }
        Err(WtcdError::at_unknown(
            CODE_INTERNAL,
            format!(
                "Cannot resolve register reference \"{register}\". This is mostly likely caused by WTCD compiler's error or the compiled output has been modified"
            ),
        )
        .into())
    }
}

/// Stores `value` after checking it against the variable's declared types.
pub(crate) fn assign_value_to_variable(
    variable: &mut Variable,
    value: RuntimeValue,
    location: Option<&SourceLocation>,
    name: &str,
) -> Result<(), EvalError> {
    if !variable_type_accepts(&variable.types, value.value_type()) {
        let allowed = variable
            .types
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|ty| ty.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(EvalError::runtime(
            format!(
                "Cannot assign value ({}) to variable \"{name}\". \"{name}\" can only store these types: {allowed}",
                value.describe()
            ),
            location,
        ));
    }
    variable.value = value;
    Ok(())
}
