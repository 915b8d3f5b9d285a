mod canvas;
mod content;
mod debug;
mod list;
mod math;
mod random;
mod reader;
mod string;
mod utils;

use crate::value::NativeFunction;

/// Every native function in registration order.
pub(crate) fn std_functions() -> impl Iterator<Item = (&'static str, NativeFunction)> {
    [
        content::CONTENT_FUNCTIONS,
        debug::DEBUG_FUNCTIONS,
        list::LIST_FUNCTIONS,
        math::MATH_FUNCTIONS,
        random::RANDOM_FUNCTIONS,
        reader::READER_FUNCTIONS,
        string::STRING_FUNCTIONS,
        canvas::CANVAS_FUNCTIONS,
    ]
    .into_iter()
    .flatten()
    .copied()
}
