use std::rc::Rc;

use wtcd_core::{
    describe_variable_type, variable_type_accepts, Expression, ExpressionKind, FunctionExpression,
    ListElement, OneVariableDeclaration, RegisterName, SourceLocation, Statement, StatementKind,
    SwitchCase, ValueType,
};

use super::{InterpreterHandle, RuntimeScope};
use crate::error::{ControlFlow, EvalError};
use crate::value::{is_equal, ActionValue, ChoiceValue, FunctionValue, RuntimeValue, Variable};

pub(crate) type EvalResult<T = RuntimeValue> = Result<T, EvalError>;

impl InterpreterHandle {
    pub(crate) fn evaluate(&mut self, expr: &Expression) -> EvalResult {
        let location = expr.location();
        match &expr.kind {
            ExpressionKind::NumberLiteral { value } => Ok(RuntimeValue::Number(*value)),
            ExpressionKind::BooleanLiteral { value } => Ok(RuntimeValue::Boolean(*value)),
            ExpressionKind::StringLiteral { value } => Ok(RuntimeValue::String(value.clone())),
            ExpressionKind::NullLiteral => Ok(RuntimeValue::Null),
            ExpressionKind::Binary {
                operator,
                arg0,
                arg1,
            } => self.evaluate_binary(*operator, arg0, arg1, location),
            ExpressionKind::Unary { operator, arg } => {
                self.evaluate_unary(*operator, arg, location)
            }
            ExpressionKind::Conditional {
                condition,
                then,
                otherwise,
            } => match self.evaluate(condition)? {
                RuntimeValue::Boolean(true) => self.evaluate(then),
                RuntimeValue::Boolean(false) => self.evaluate(otherwise),
                other => Err(EvalError::runtime(
                    format!(
                        "First argument of a conditional expression is expected to be a boolean, received: {}",
                        other.describe()
                    ),
                    location,
                )),
            },
            ExpressionKind::GotoAction { sections } => {
                Ok(RuntimeValue::action(ActionValue::Goto {
                    sections: sections.clone(),
                }))
            }
            ExpressionKind::ExitAction => Ok(RuntimeValue::action(ActionValue::Exit)),
            ExpressionKind::Selection { choices } => self.evaluate_selection(choices, location),
            ExpressionKind::Choice { text, action } => {
                self.evaluate_choice(text, action, location)
            }
            ExpressionKind::Block { statements } => self.evaluate_block(statements),
            ExpressionKind::VariableReference { variable_name } => {
                let cell = self.resolve_variable_reference(variable_name)?;
                let value = cell.borrow().value.clone();
                Ok(value)
            }
            ExpressionKind::Function(function) => self.evaluate_function_expression(function),
            ExpressionKind::List { elements } => self.evaluate_list(elements),
            ExpressionKind::Switch {
                expression,
                cases,
                default_case,
            } => self.evaluate_switch(expression, cases, default_case.as_deref(), location),
            ExpressionKind::While {
                pre_expr,
                condition,
                post_expr,
            } => self.evaluate_while(
                pre_expr.as_deref(),
                condition,
                post_expr.as_deref(),
                location,
            ),
            ExpressionKind::If {
                condition,
                then,
                otherwise,
            } => match self.evaluate(condition)? {
                RuntimeValue::Boolean(true) => self.evaluate(then),
                RuntimeValue::Boolean(false) => match otherwise {
                    Some(otherwise) => self.evaluate(otherwise),
                    None => Ok(RuntimeValue::Null),
                },
                other => Err(EvalError::runtime(
                    format!(
                        "The condition of an if expression is expected to be a boolean. Received: {}",
                        other.describe()
                    ),
                    location,
                )),
            },
            ExpressionKind::Tag { name } => {
                Ok(RuntimeValue::list(vec![RuntimeValue::String(name.clone())]))
            }
        }
    }

    pub(crate) fn execute_statements(&mut self, statements: &[Statement]) -> EvalResult<()> {
        for statement in statements {
            self.execute_statement(statement)?;
        }
        Ok(())
    }

    pub(crate) fn execute_statement(&mut self, statement: &Statement) -> EvalResult<()> {
        match &statement.kind {
            StatementKind::Declaration { declarations } => {
                for declaration in declarations {
                    self.execute_declaration(declaration, statement.location.as_ref())?;
                }
                Ok(())
            }
            StatementKind::Expression { expression } => {
                self.evaluate(expression)?;
                Ok(())
            }
            StatementKind::Yield { value } => {
                self.set_register_from(RegisterName::Yield, value)?;
                Err(EvalError::Signal(ControlFlow::Yield))
            }
            StatementKind::SetYield { value } => self.set_register_from(RegisterName::Yield, value),
            StatementKind::Return { value } => {
                self.set_register_from(RegisterName::Return, value)?;
                Err(EvalError::Signal(ControlFlow::Return))
            }
            StatementKind::SetReturn { value } => {
                self.set_register_from(RegisterName::Return, value)
            }
            StatementKind::Break { value } => {
                self.set_register_from(RegisterName::Break, value)?;
                Err(EvalError::Signal(ControlFlow::Break))
            }
            StatementKind::SetBreak { value } => self.set_register_from(RegisterName::Break, value),
            StatementKind::Continue => Err(EvalError::Signal(ControlFlow::Continue)),
        }
    }

    fn set_register_from(&mut self, register: RegisterName, value: &Expression) -> EvalResult<()> {
        let value = self.evaluate(value)?;
        self.set_register(register, value)
    }

    fn execute_declaration(
        &mut self,
        declaration: &OneVariableDeclaration,
        location: Option<&SourceLocation>,
    ) -> EvalResult<()> {
        let value = match &declaration.initial_value {
            Some(initial_value) => self.evaluate(initial_value)?,
            None => default_initial_value(declaration, location)?,
        };
        if !variable_type_accepts(&declaration.variable_type, value.value_type()) {
            let types = declaration
                .variable_type
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|ty| ty.as_str())
                .collect::<Vec<_>>()
                .join(",");
            return Err(EvalError::runtime(
                format!(
                    "The type of variable {} is {types}, thus cannot hold {}",
                    declaration.variable_name,
                    value.describe()
                ),
                location,
            ));
        }
        self.current_scope_mut()?.add_variable(
            &declaration.variable_name,
            Variable::new(declaration.variable_type.clone(), value),
        );
        Ok(())
    }

    fn evaluate_block(&mut self, statements: &[Statement]) -> EvalResult {
        self.push_scope(RuntimeScope::with_register(RegisterName::Yield));
        let result = self.execute_statements(statements);
        let scope = self.pop_scope();
        match result {
            Ok(()) | Err(EvalError::Signal(ControlFlow::Yield)) => {
                Ok(scope.register(RegisterName::Yield))
            }
            Err(error) => Err(error),
        }
    }

    fn evaluate_selection(
        &mut self,
        choices: &Expression,
        location: Option<&SourceLocation>,
    ) -> EvalResult {
        let list = match self.evaluate(choices)? {
            RuntimeValue::List(list) => list,
            other => {
                return Err(EvalError::runtime(
                    format!(
                        "Expression after selection is expected to be a list of choices, received: {}",
                        other.describe()
                    ),
                    location,
                ))
            }
        };
        let mut selected = Vec::new();
        for choice in list.iter().filter(|choice| !choice.is_null()) {
            let RuntimeValue::Choice(choice) = choice else {
                return Err(EvalError::runtime(
                    format!(
                        "Choice at index {} is expected to be a choice, received: {}",
                        selected.len(),
                        choice.describe()
                    ),
                    location,
                ));
            };
            selected.push(Rc::clone(choice));
        }
        Ok(RuntimeValue::action(ActionValue::Selection { choices: selected }))
    }

    fn evaluate_choice(
        &mut self,
        text: &Expression,
        action: &Expression,
        location: Option<&SourceLocation>,
    ) -> EvalResult {
        let text = match self.evaluate(text)? {
            RuntimeValue::String(text) => text,
            other => {
                return Err(EvalError::runtime(
                    format!(
                        "First argument of choice is expected to be a string, received: {}",
                        other.describe()
                    ),
                    location,
                ))
            }
        };
        let action = match self.evaluate(action)? {
            RuntimeValue::Function(function) => RuntimeValue::action(ActionValue::Function {
                function,
                creator: location.copied(),
            }),
            value @ (RuntimeValue::Action(_) | RuntimeValue::Null) => value,
            other => {
                return Err(EvalError::runtime(
                    format!(
                        "Second argument of choice is expected to be an action, a function, or null, received: {}",
                        other.describe()
                    ),
                    location,
                ))
            }
        };
        Ok(RuntimeValue::Choice(Rc::new(ChoiceValue { text, action })))
    }

    fn evaluate_function_expression(&mut self, function: &Rc<FunctionExpression>) -> EvalResult {
        let captured = function
            .captures
            .iter()
            .map(|name| Ok((name.clone(), self.resolve_variable_reference(name)?)))
            .collect::<EvalResult<Vec<_>>>()?;
        Ok(RuntimeValue::Function(Rc::new(FunctionValue::Wtcd {
            expression: Rc::clone(function),
            captured,
        })))
    }

    fn evaluate_list(&mut self, elements: &[ListElement]) -> EvalResult {
        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                ListElement::Item { expression } => values.push(self.evaluate(expression)?),
                ListElement::Spread {
                    expression,
                    location,
                } => match self.evaluate(expression)? {
                    RuntimeValue::List(list) => values.extend(list.iter().cloned()),
                    other => {
                        return Err(EvalError::runtime(
                            format!(
                                "Spread operator \"...\" can only be used before a list, received: {}",
                                other.describe()
                            ),
                            location.as_ref(),
                        ))
                    }
                },
            }
        }
        Ok(RuntimeValue::list(values))
    }

    fn evaluate_switch(
        &mut self,
        expression: &Expression,
        cases: &[SwitchCase],
        default_case: Option<&Expression>,
        location: Option<&SourceLocation>,
    ) -> EvalResult {
        let subject = self.evaluate(expression)?;
        for case in cases {
            let matches = match self.evaluate(&case.matches)? {
                RuntimeValue::List(matches) => matches,
                other => {
                    return Err(EvalError::runtime(
                        format!(
                            "Value to match for each case is expected to be a list, received: {}",
                            other.describe()
                        ),
                        case.matches.location(),
                    ))
                }
            };
            if matches.iter().any(|candidate| is_equal(candidate, &subject)) {
                return self.evaluate(&case.returns);
            }
        }
        match default_case {
            Some(default_case) => self.evaluate(default_case),
            None => Err(EvalError::runtime(
                "None of the cases matched and no default case is provided",
                location,
            )),
        }
    }

    fn evaluate_while(
        &mut self,
        pre_expr: Option<&Expression>,
        condition: &Expression,
        post_expr: Option<&Expression>,
        location: Option<&SourceLocation>,
    ) -> EvalResult {
        self.push_scope(RuntimeScope::with_register(RegisterName::Break));
        let result = self.run_while_loop(pre_expr, condition, post_expr, location);
        let scope = self.pop_scope();
        match result {
            Ok(()) | Err(EvalError::Signal(ControlFlow::Break)) => {
                Ok(scope.register(RegisterName::Break))
            }
            Err(error) => Err(error),
        }
    }

    fn run_while_loop(
        &mut self,
        pre_expr: Option<&Expression>,
        condition: &Expression,
        post_expr: Option<&Expression>,
        location: Option<&SourceLocation>,
    ) -> EvalResult<()> {
        let mut continued = false;
        loop {
            if let (false, Some(pre_expr)) = (continued, pre_expr) {
                catch_continue(self.evaluate(pre_expr))?;
            }
            continued = false;
            match self.evaluate(condition)? {
                RuntimeValue::Boolean(true) => {}
                RuntimeValue::Boolean(false) => return Ok(()),
                other => {
                    return Err(EvalError::runtime(
                        format!(
                            "Condition expression of a while loop is expected to return a boolean. Received: {}",
                            other.describe()
                        ),
                        location,
                    ))
                }
            }
            if let Some(post_expr) = post_expr {
                continued = catch_continue(self.evaluate(post_expr))?;
            }
        }
    }
}

/// `Ok(true)` when the evaluation was cut short by `continue`.
fn catch_continue(result: EvalResult) -> EvalResult<bool> {
    match result {
        Ok(_) => Ok(false),
        Err(EvalError::Signal(ControlFlow::Continue)) => Ok(true),
        Err(error) => Err(error),
    }
}

fn default_initial_value(
    declaration: &OneVariableDeclaration,
    location: Option<&SourceLocation>,
) -> EvalResult {
    let Some(types) = &declaration.variable_type else {
        return Ok(RuntimeValue::Null);
    };
    match types.as_slice() {
        [ValueType::Boolean] => Ok(RuntimeValue::Boolean(false)),
        [ValueType::Number] => Ok(RuntimeValue::Number(0.0)),
        [ValueType::String] => Ok(RuntimeValue::String(String::new())),
        [ValueType::List] => Ok(RuntimeValue::list(Vec::new())),
        [single] => Err(EvalError::runtime(
            format!("Variable type \"{single}\" does not have a default initial value"),
            location,
        )),
        multiple if multiple.contains(&ValueType::Null) => Ok(RuntimeValue::Null),
        _ => Err(EvalError::runtime(
            format!(
                "Variable type \"{}\" does not have a default initial value",
                describe_variable_type(&declaration.variable_type)
            ),
            location,
        )),
    }
}
