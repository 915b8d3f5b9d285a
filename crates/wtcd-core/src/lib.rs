pub mod ast;
pub mod error;
pub mod operators;
pub mod stdlib;
pub mod types;

pub use ast::*;
pub use error::WtcdError;
pub use operators::{
    is_known_operator, BinaryOperator, UnaryOperator, CONDITIONAL_OPERATOR_PRECEDENCE,
    UNARY_OPERATOR_PRECEDENCE,
};
pub use stdlib::STD_FUNCTION_NAMES;
pub use types::*;
