pub mod canvas;
pub mod content;
pub mod engine;
pub mod error;
pub mod interpreter;
pub mod random;
mod stdlib;
pub mod value;

pub use canvas::{
    CanvasSnapshot, ChainedCanvas, DefaultFeatureProvider, DrawCommand, FeatureProvider,
};
pub use content::{escape_html, ChoiceOutput, ContentNode, ContentOutput};
pub use engine::InterpreterHandle;
pub use error::{ControlFlow, EvalError, InvalidChoiceError, StepError};
pub use interpreter::{Interpreter, InterpreterOptions, Step};
pub use random::Random;
pub use value::{
    format_number, is_equal, ActionValue, ChoiceValue, FunctionValue, NativeFunction,
    RuntimeValue, Variable,
};
