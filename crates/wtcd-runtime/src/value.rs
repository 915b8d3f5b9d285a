use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use wtcd_core::{FunctionExpression, SourceLocation, ValueType, VariableType};

use crate::engine::InterpreterHandle;
use crate::error::EvalError;

pub type NativeFunction =
    fn(&[RuntimeValue], &mut InterpreterHandle) -> Result<RuntimeValue, EvalError>;

/// Immutable runtime value. Lists and compound values are shared behind `Rc`.
#[derive(Debug, Clone)]
pub enum RuntimeValue {
    Number(f64),
    Boolean(bool),
    String(String),
    Null,
    List(Rc<Vec<RuntimeValue>>),
    Choice(Rc<ChoiceValue>),
    Action(Rc<ActionValue>),
    Function(Rc<FunctionValue>),
}

#[derive(Debug, Clone)]
pub struct ChoiceValue {
    pub text: String,
    /// Either an action or null; null renders the choice disabled.
    pub action: RuntimeValue,
}

#[derive(Debug, Clone)]
pub enum ActionValue {
    Goto {
        sections: Vec<String>,
    },
    Exit,
    Selection {
        choices: Vec<Rc<ChoiceValue>>,
    },
    Function {
        function: Rc<FunctionValue>,
        creator: Option<SourceLocation>,
    },
}

pub enum FunctionValue {
    Wtcd {
        expression: Rc<FunctionExpression>,
        captured: Vec<(String, Rc<RefCell<Variable>>)>,
    },
    Native {
        name: &'static str,
        function: NativeFunction,
    },
    Partial {
        is_left: bool,
        applied: Vec<RuntimeValue>,
        target: Rc<FunctionValue>,
    },
}

// Captured cells may point back at the function itself, so debug output
// stays at the describe level.
impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe_function(self))
    }
}

/// Mutable cell behind every declared name.
#[derive(Debug, Clone)]
pub struct Variable {
    pub types: VariableType,
    pub value: RuntimeValue,
}

impl Variable {
    pub fn new(types: VariableType, value: RuntimeValue) -> Self {
        Self { types, value }
    }

    pub fn into_cell(self) -> Rc<RefCell<Variable>> {
        Rc::new(RefCell::new(self))
    }
}

impl RuntimeValue {
    pub fn string(value: impl Into<String>) -> Self {
        RuntimeValue::String(value.into())
    }

    pub fn list(values: Vec<RuntimeValue>) -> Self {
        RuntimeValue::List(Rc::new(values))
    }

    pub fn action(action: ActionValue) -> Self {
        RuntimeValue::Action(Rc::new(action))
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            RuntimeValue::Number(_) => ValueType::Number,
            RuntimeValue::Boolean(_) => ValueType::Boolean,
            RuntimeValue::String(_) => ValueType::String,
            RuntimeValue::Null => ValueType::Null,
            RuntimeValue::List(_) => ValueType::List,
            RuntimeValue::Choice(_) => ValueType::Choice,
            RuntimeValue::Action(_) => ValueType::Action,
            RuntimeValue::Function(_) => ValueType::Function,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RuntimeValue::Null)
    }

    /// Diagnostic rendering used in every error message.
    pub fn describe(&self) -> String {
        match self {
            RuntimeValue::Number(value) => format!("number (value = {})", format_number(*value)),
            RuntimeValue::Boolean(value) => format!("boolean (value = {value})"),
            RuntimeValue::String(value) => format!("string (value = \"{value}\")"),
            RuntimeValue::Null => "null".to_string(),
            RuntimeValue::List(elements) => {
                format!("list (elements = [{}])", describe_all(elements))
            }
            RuntimeValue::Choice(choice) => describe_choice(choice),
            RuntimeValue::Action(action) => describe_action(action),
            RuntimeValue::Function(function) => describe_function(function),
        }
    }

    /// Text substituted into section content for `<$ name $>` references.
    pub fn display_text(&self) -> String {
        match self {
            RuntimeValue::Number(value) => format_number(*value),
            RuntimeValue::Boolean(value) => value.to_string(),
            RuntimeValue::String(value) => value.clone(),
            RuntimeValue::Null => "null".to_string(),
            other => other.describe(),
        }
    }
}

fn describe_all(values: &[RuntimeValue]) -> String {
    values
        .iter()
        .map(RuntimeValue::describe)
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_choice(choice: &ChoiceValue) -> String {
    format!(
        "choice (action = {}, label = \"{}\")",
        choice.action.describe(),
        choice.text
    )
}

fn describe_action(action: &ActionValue) -> String {
    match action {
        ActionValue::Goto { sections } => {
            format!("action (type = goto, target = {})", sections.join(","))
        }
        ActionValue::Exit => "action (type = exit)".to_string(),
        ActionValue::Selection { choices } => format!(
            "action (type = selection, choices = [{}])",
            choices
                .iter()
                .map(|choice| describe_choice(choice))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        ActionValue::Function { function, .. } => {
            format!("action (type = function, fn = {})", describe_function(function))
        }
    }
}

fn describe_function(function: &FunctionValue) -> String {
    match function {
        FunctionValue::Native { name, .. } => format!("function (native {name})"),
        FunctionValue::Wtcd { expression, .. } => format!(
            "function (arguments = [{}])",
            expression
                .arguments
                .iter()
                .map(|argument| argument.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
        FunctionValue::Partial {
            is_left,
            applied,
            target,
        } => format!(
            "function (partial {}, applied = [{}], targetFn = {})",
            if *is_left { "left" } else { "right" },
            describe_all(applied),
            describe_function(target)
        ),
    }
}

/// Structural equality. Functions compare by identity.
pub fn is_equal(left: &RuntimeValue, right: &RuntimeValue) -> bool {
    match (left, right) {
        (RuntimeValue::Number(l), RuntimeValue::Number(r)) => l == r,
        (RuntimeValue::Boolean(l), RuntimeValue::Boolean(r)) => l == r,
        (RuntimeValue::String(l), RuntimeValue::String(r)) => l == r,
        (RuntimeValue::Null, RuntimeValue::Null) => true,
        (RuntimeValue::List(l), RuntimeValue::List(r)) => lists_equal(l, r),
        (RuntimeValue::Choice(l), RuntimeValue::Choice(r)) => choices_equal(l, r),
        (RuntimeValue::Action(l), RuntimeValue::Action(r)) => actions_equal(l, r),
        (RuntimeValue::Function(l), RuntimeValue::Function(r)) => functions_equal(l, r),
        _ => false,
    }
}

fn lists_equal(left: &[RuntimeValue], right: &[RuntimeValue]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(l, r)| is_equal(l, r))
}

fn choices_equal(left: &ChoiceValue, right: &ChoiceValue) -> bool {
    left.text == right.text && is_equal(&left.action, &right.action)
}

fn actions_equal(left: &ActionValue, right: &ActionValue) -> bool {
    match (left, right) {
        (ActionValue::Exit, ActionValue::Exit) => true,
        (ActionValue::Goto { sections: l }, ActionValue::Goto { sections: r }) => l == r,
        (ActionValue::Selection { choices: l }, ActionValue::Selection { choices: r }) => {
            l.len() == r.len() && l.iter().zip(r).all(|(l, r)| choices_equal(l, r))
        }
        (
            ActionValue::Function { function: l, .. },
            ActionValue::Function { function: r, .. },
        ) => functions_equal(l, r),
        _ => false,
    }
}

fn functions_equal(left: &FunctionValue, right: &FunctionValue) -> bool {
    match (left, right) {
        (FunctionValue::Native { name: l, .. }, FunctionValue::Native { name: r, .. }) => l == r,
        (
            FunctionValue::Wtcd {
                expression: l_expr,
                captured: l_captured,
            },
            FunctionValue::Wtcd {
                expression: r_expr,
                captured: r_captured,
            },
        ) => {
            Rc::ptr_eq(l_expr, r_expr)
                && l_captured.len() == r_captured.len()
                && l_captured
                    .iter()
                    .zip(r_captured)
                    .all(|((l_name, l_cell), (r_name, r_cell))| {
                        l_name == r_name && Rc::ptr_eq(l_cell, r_cell)
                    })
        }
        (
            FunctionValue::Partial {
                is_left: l_left,
                applied: l_applied,
                target: l_target,
            },
            FunctionValue::Partial {
                is_left: r_left,
                applied: r_applied,
                target: r_target,
            },
        ) => {
            l_left == r_left
                && functions_equal(l_target, r_target)
                && lists_equal(l_applied, r_applied)
        }
        _ => false,
    }
}

/// Formats a number the way documents expect to read it: integers without a
/// fraction, exponent notation below 1e-6 and from 1e21 on.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let scientific = format!("{:e}", value.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let digits = mantissa.replace('.', "");
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let k = digits.len() as i32;
    let n = exponent + 1;
    let body = if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int_part, frac_part) = digits.split_at(n as usize);
        format!("{int_part}.{frac_part}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat((-n) as usize))
    } else {
        let exp_sign = if n - 1 < 0 { "-" } else { "+" };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{first}e{exp_sign}{}", (n - 1).abs())
        } else {
            format!("{first}.{rest}e{exp_sign}{}", (n - 1).abs())
        }
    };
    format!("{sign}{body}")
}
