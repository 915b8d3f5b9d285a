use std::fmt;

use serde::{Deserialize, Serialize};

pub const CONDITIONAL_OPERATOR_PRECEDENCE: u8 = 4;
pub const UNARY_OPERATOR_PRECEDENCE: u8 = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    #[serde(rename = "=")]
    Assign,
    #[serde(rename = "+=")]
    AddAssign,
    #[serde(rename = "-=")]
    SubAssign,
    #[serde(rename = "*=")]
    MulAssign,
    #[serde(rename = "/=")]
    DivAssign,
    #[serde(rename = "~/=")]
    IntDivAssign,
    #[serde(rename = "%=")]
    RemAssign,
    #[serde(rename = "|>")]
    Pipeline,
    #[serde(rename = "|::")]
    ReverseInvoke,
    #[serde(rename = "||")]
    Or,
    #[serde(rename = "?!")]
    NullishStrict,
    #[serde(rename = "??")]
    Nullish,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    LtEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    GtEq,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "~/")]
    IntDiv,
    #[serde(rename = "%")]
    Rem,
    #[serde(rename = "**")]
    Pow,
    #[serde(rename = ".")]
    Index,
    #[serde(rename = ".?")]
    IndexOrNull,
    #[serde(rename = "?.")]
    NullableIndex,
    #[serde(rename = "?.?")]
    NullableIndexOrNull,
    #[serde(rename = "::")]
    Invoke,
    #[serde(rename = "?::")]
    NullableInvoke,
    #[serde(rename = ".:")]
    PartialLeft,
    #[serde(rename = ":.")]
    PartialRight,
}

impl BinaryOperator {
    pub const ALL: [BinaryOperator; 34] = [
        BinaryOperator::Assign,
        BinaryOperator::AddAssign,
        BinaryOperator::SubAssign,
        BinaryOperator::MulAssign,
        BinaryOperator::DivAssign,
        BinaryOperator::IntDivAssign,
        BinaryOperator::RemAssign,
        BinaryOperator::Pipeline,
        BinaryOperator::ReverseInvoke,
        BinaryOperator::Or,
        BinaryOperator::NullishStrict,
        BinaryOperator::Nullish,
        BinaryOperator::And,
        BinaryOperator::Eq,
        BinaryOperator::NotEq,
        BinaryOperator::Lt,
        BinaryOperator::LtEq,
        BinaryOperator::Gt,
        BinaryOperator::GtEq,
        BinaryOperator::Add,
        BinaryOperator::Sub,
        BinaryOperator::Mul,
        BinaryOperator::Div,
        BinaryOperator::IntDiv,
        BinaryOperator::Rem,
        BinaryOperator::Pow,
        BinaryOperator::Index,
        BinaryOperator::IndexOrNull,
        BinaryOperator::NullableIndex,
        BinaryOperator::NullableIndexOrNull,
        BinaryOperator::Invoke,
        BinaryOperator::NullableInvoke,
        BinaryOperator::PartialLeft,
        BinaryOperator::PartialRight,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Assign => "=",
            BinaryOperator::AddAssign => "+=",
            BinaryOperator::SubAssign => "-=",
            BinaryOperator::MulAssign => "*=",
            BinaryOperator::DivAssign => "/=",
            BinaryOperator::IntDivAssign => "~/=",
            BinaryOperator::RemAssign => "%=",
            BinaryOperator::Pipeline => "|>",
            BinaryOperator::ReverseInvoke => "|::",
            BinaryOperator::Or => "||",
            BinaryOperator::NullishStrict => "?!",
            BinaryOperator::Nullish => "??",
            BinaryOperator::And => "&&",
            BinaryOperator::Eq => "==",
            BinaryOperator::NotEq => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::LtEq => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::GtEq => ">=",
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::IntDiv => "~/",
            BinaryOperator::Rem => "%",
            BinaryOperator::Pow => "**",
            BinaryOperator::Index => ".",
            BinaryOperator::IndexOrNull => ".?",
            BinaryOperator::NullableIndex => "?.",
            BinaryOperator::NullableIndexOrNull => "?.?",
            BinaryOperator::Invoke => "::",
            BinaryOperator::NullableInvoke => "?::",
            BinaryOperator::PartialLeft => ".:",
            BinaryOperator::PartialRight => ":.",
        }
    }

    /// Higher binds tighter.
    pub fn precedence(self) -> u8 {
        use BinaryOperator::*;
        match self {
            Assign | AddAssign | SubAssign | MulAssign | DivAssign | IntDivAssign | RemAssign => 3,
            Pipeline | ReverseInvoke => 5,
            Or | NullishStrict | Nullish => 6,
            And => 7,
            Eq | NotEq => 11,
            Lt | LtEq | Gt | GtEq => 12,
            Add | Sub => 14,
            Mul | Div | IntDiv | Rem => 15,
            Pow => 16,
            Index | IndexOrNull | NullableIndex | NullableIndexOrNull => 19,
            Invoke | NullableInvoke | PartialLeft | PartialRight => 20,
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    #[serde(rename = "-")]
    Negate,
    #[serde(rename = "!")]
    Not,
}

impl UnaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Negate => "-",
            UnaryOperator::Not => "!",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "-" => Some(UnaryOperator::Negate),
            "!" => Some(UnaryOperator::Not),
            _ => None,
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Every symbol the lexer accepts as an operator token.
pub fn is_known_operator(symbol: &str) -> bool {
    matches!(symbol, "?" | ":" | "...")
        || UnaryOperator::from_symbol(symbol).is_some()
        || BinaryOperator::from_symbol(symbol).is_some()
}
