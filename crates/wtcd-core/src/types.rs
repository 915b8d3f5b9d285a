use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Type tag of every runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Number,
    Boolean,
    String,
    Null,
    List,
    Choice,
    Action,
    Function,
}

impl ValueType {
    pub const ALL: [ValueType; 8] = [
        ValueType::Number,
        ValueType::Boolean,
        ValueType::String,
        ValueType::Null,
        ValueType::List,
        ValueType::Choice,
        ValueType::Action,
        ValueType::Function,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::String => "string",
            ValueType::Null => "null",
            ValueType::List => "list",
            ValueType::Choice => "choice",
            ValueType::Action => "action",
            ValueType::Function => "function",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.as_str() == keyword)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `None` accepts every type.
pub type VariableType = Option<Vec<ValueType>>;

pub fn variable_type_accepts(variable_type: &VariableType, ty: ValueType) -> bool {
    match variable_type {
        None => true,
        Some(types) => types.contains(&ty),
    }
}

/// Space separated list of the allowed types, or `any`.
pub fn describe_variable_type(variable_type: &VariableType) -> String {
    match variable_type {
        None => "any".to_string(),
        Some(types) => types
            .iter()
            .map(|ty| ty.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegisterName {
    Yield,
    Return,
    Break,
}

impl RegisterName {
    pub fn as_str(self) -> &'static str {
        match self {
            RegisterName::Yield => "yield",
            RegisterName::Return => "return",
            RegisterName::Break => "break",
        }
    }
}

impl fmt::Display for RegisterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WtcdVersion {
    pub major: u32,
    pub minor: u32,
}

pub const PARSER_VERSION: WtcdVersion = WtcdVersion { major: 1, minor: 3 };

impl Default for WtcdVersion {
    fn default() -> Self {
        PARSER_VERSION
    }
}

impl fmt::Display for WtcdVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod types_tests {
    use super::*;

    #[test]
    fn value_type_keywords_round_trip_through_lookup() {
        for ty in ValueType::ALL {
            assert_eq!(ValueType::from_keyword(ty.as_str()), Some(ty));
        }
        assert_eq!(ValueType::from_keyword("declare"), None);
        assert_eq!(
            serde_json::to_string(&ValueType::Function).expect("serialize"),
            "\"function\""
        );
    }

    #[test]
    fn variable_type_helpers() {
        let any: VariableType = None;
        let numeric: VariableType = Some(vec![ValueType::Number, ValueType::Null]);
        assert!(variable_type_accepts(&any, ValueType::Choice));
        assert!(variable_type_accepts(&numeric, ValueType::Null));
        assert!(!variable_type_accepts(&numeric, ValueType::String));
        assert_eq!(describe_variable_type(&numeric), "number null");
        assert_eq!(describe_variable_type(&any), "any");
    }

    #[test]
    fn versions_order_by_major_then_minor() {
        assert!(WtcdVersion { major: 1, minor: 4 } > PARSER_VERSION);
        assert!(WtcdVersion { major: 0, minor: 9 } < PARSER_VERSION);
        assert_eq!(PARSER_VERSION.to_string(), "1.3");
    }
}
