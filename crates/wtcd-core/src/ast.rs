use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::operators::{BinaryOperator, UnaryOperator};
use crate::types::{SourceLocation, VariableType, WtcdVersion};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    #[serde(flatten)]
    pub kind: ExpressionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl Expression {
    pub fn new(kind: ExpressionKind, location: Option<SourceLocation>) -> Self {
        Self { kind, location }
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ExpressionKind {
    NumberLiteral {
        value: f64,
    },
    BooleanLiteral {
        value: bool,
    },
    StringLiteral {
        value: String,
    },
    NullLiteral,
    #[serde(rename = "binaryExpression")]
    Binary {
        operator: BinaryOperator,
        arg0: Box<Expression>,
        arg1: Box<Expression>,
    },
    #[serde(rename = "unaryExpression")]
    Unary {
        operator: UnaryOperator,
        arg: Box<Expression>,
    },
    #[serde(rename = "conditionalExpression")]
    Conditional {
        condition: Box<Expression>,
        then: Box<Expression>,
        otherwise: Box<Expression>,
    },
    GotoAction {
        sections: Vec<String>,
    },
    ExitAction,
    Selection {
        choices: Box<Expression>,
    },
    #[serde(rename = "choiceExpression")]
    Choice {
        text: Box<Expression>,
        action: Box<Expression>,
    },
    Block {
        statements: Vec<Statement>,
    },
    VariableReference {
        variable_name: String,
    },
    /// Shared so closures created at runtime can point back at their definition.
    Function(Rc<FunctionExpression>),
    List {
        elements: Vec<ListElement>,
    },
    Switch {
        expression: Box<Expression>,
        cases: Vec<SwitchCase>,
        default_case: Option<Box<Expression>>,
    },
    While {
        pre_expr: Option<Box<Expression>>,
        condition: Box<Expression>,
        post_expr: Option<Box<Expression>>,
    },
    If {
        condition: Box<Expression>,
        then: Box<Expression>,
        otherwise: Option<Box<Expression>>,
    },
    Tag {
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionExpression {
    pub arguments: Vec<FunctionArgument>,
    pub rest_arg_name: Option<String>,
    /// Names resolved outside the function body, in first-use order.
    pub captures: Vec<String>,
    pub expression: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionArgument {
    pub name: String,
    #[serde(rename = "type")]
    pub types: VariableType,
    pub default_value: Option<Expression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ListElement {
    Item {
        expression: Expression,
    },
    Spread {
        expression: Expression,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location: Option<SourceLocation>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    pub matches: Expression,
    pub returns: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(flatten)]
    pub kind: StatementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl Statement {
    pub fn new(kind: StatementKind, location: Option<SourceLocation>) -> Self {
        Self { kind, location }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StatementKind {
    Declaration {
        declarations: Vec<OneVariableDeclaration>,
    },
    Expression {
        expression: Expression,
    },
    Yield {
        value: Expression,
    },
    SetYield {
        value: Expression,
    },
    Return {
        value: Expression,
    },
    SetReturn {
        value: Expression,
    },
    Break {
        value: Expression,
    },
    SetBreak {
        value: Expression,
    },
    Continue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneVariableDeclaration {
    pub variable_name: String,
    pub variable_type: VariableType,
    pub initial_value: Option<Expression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentVariable {
    pub element_class: String,
    pub variable_name: String,
}

/// One rendered variant of a section, chosen by the section's enter count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleSectionContent {
    pub html: String,
    pub variables: Vec<ContentVariable>,
    pub lower_bound: Option<u64>,
    pub upper_bound: Option<u64>,
}

impl SingleSectionContent {
    pub fn accepts_enter_count(&self, enter_count: u64) -> bool {
        self.lower_bound.map_or(true, |lower| enter_count >= lower)
            && self.upper_bound.map_or(true, |upper| enter_count <= upper)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub name: String,
    pub executes: Option<Expression>,
    pub then: Expression,
    pub content: Vec<SingleSectionContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WtcdRoot {
    #[serde(default)]
    pub version: WtcdVersion,
    pub init_statements: Vec<Statement>,
    pub sections: Vec<Section>,
}

impl WtcdRoot {
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name == name)
    }
}
