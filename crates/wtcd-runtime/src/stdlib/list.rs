use std::rc::Rc;

use crate::engine::InterpreterHandle;
use crate::error::EvalError;
use crate::value::{is_equal, FunctionValue, NativeFunction, RuntimeValue};

use super::utils::{
    arg_function, arg_list, arg_number, assert_args_length, is_integer, nullify, num,
    NativeResult,
};

pub(crate) const LIST_FUNCTIONS: &[(&str, NativeFunction)] = &[
    ("listSet", list_set),
    ("listForEach", list_for_each),
    ("listMap", list_map),
    ("listCreateFilled", list_create_filled),
    ("listChunk", list_chunk),
    ("listFilter", list_filter),
    ("listSplice", list_splice),
    ("listSlice", list_slice),
    ("listLength", list_length),
    ("listIndexOf", list_index_of),
    ("listIncludes", list_includes),
    ("listFindIndex", list_find_index),
];

/// Largest length a list may be created with.
const MAX_LIST_LENGTH: f64 = 4_294_967_295.0;

/// Calls `function(element, index)` on behalf of the list function `name`.
fn apply_to_element(
    handle: &mut InterpreterHandle,
    name: &str,
    function: &Rc<FunctionValue>,
    element: &RuntimeValue,
    index: usize,
) -> NativeResult {
    handle
        .invoke_function(function, &[element.clone(), RuntimeValue::Number(index as f64)])
        .map_err(|error| match error {
            EvalError::Invocation(message) => EvalError::native(format!(
                "Failed to apply function to the element with index = {index} of list: {message}"
            )),
            EvalError::Runtime(mut error) => {
                error.push_wtcd_stack(format!("{name} (index = {index})"), None);
                EvalError::Runtime(error)
            }
            other => other,
        })
}

fn test_element(
    handle: &mut InterpreterHandle,
    name: &str,
    predicate: &Rc<FunctionValue>,
    element: &RuntimeValue,
    index: usize,
) -> Result<bool, EvalError> {
    match apply_to_element(handle, name, predicate, element, index)? {
        RuntimeValue::Boolean(value) => Ok(value),
        other => Err(EvalError::native(format!(
            "Predicate is expected to return booleans, but {} is returned for element with index = {index}",
            other.describe()
        ))),
    }
}

fn list_set(args: &[RuntimeValue], _: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 3, 3)?;
    let list = arg_list(args, 0, None)?;
    let index = arg_number(args, 1, None)?;
    if !is_integer(index) {
        return Err(EvalError::native(format!(
            "Index ({}) has to be an integer",
            num(index)
        )));
    }
    if index < 0.0 {
        return Err(EvalError::native(format!(
            "Index ({}) cannot be negative",
            num(index)
        )));
    }
    if index >= list.len() as f64 {
        return Err(EvalError::native(format!(
            "Index ({}) out of bounds. List length is {}",
            num(index),
            list.len()
        )));
    }
    let mut updated = list.as_ref().clone();
    updated[index as usize] = args[2].clone();
    Ok(RuntimeValue::list(updated))
}

fn list_for_each(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 2, 2)?;
    let list = arg_list(args, 0, None)?;
    let function = arg_function(args, 1)?;
    for (index, element) in list.iter().enumerate() {
        apply_to_element(handle, "listForEach", &function, element, index)?;
    }
    Ok(RuntimeValue::Null)
}

fn list_map(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 2, 2)?;
    let list = arg_list(args, 0, None)?;
    let function = arg_function(args, 1)?;
    let mapped = list
        .iter()
        .enumerate()
        .map(|(index, element)| apply_to_element(handle, "listMap", &function, element, index))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RuntimeValue::list(mapped))
}

fn list_create_filled(args: &[RuntimeValue], _: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 1, 2)?;
    let length = arg_number(args, 0, None)?;
    let value = nullify(args, 1);
    if !is_integer(length) {
        return Err(EvalError::native(format!(
            "Length ({}) has to be an integer.",
            num(length)
        )));
    }
    if length < 0.0 {
        return Err(EvalError::native(format!(
            "Length ({}) cannot be negative.",
            num(length)
        )));
    }
    if length > MAX_LIST_LENGTH {
        return Err(EvalError::native(format!(
            "Length ({}) is too large.",
            num(length)
        )));
    }
    let length = length as usize;
    let mut filled = Vec::new();
    filled
        .try_reserve_exact(length)
        .map_err(|_| EvalError::native(format!("Length ({length}) is too large.")))?;
    filled.resize(length, value);
    Ok(RuntimeValue::list(filled))
}

fn list_chunk(args: &[RuntimeValue], _: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 2, 2)?;
    let list = arg_list(args, 0, None)?;
    let chunk_size = arg_number(args, 1, None)?;
    if !is_integer(chunk_size) || chunk_size < 1.0 {
        return Err(EvalError::native(format!(
            "Chunk size ({}) has to be a positive integer.",
            num(chunk_size)
        )));
    }
    let chunks = list
        .chunks(chunk_size as usize)
        .map(|chunk| RuntimeValue::list(chunk.to_vec()))
        .collect();
    Ok(RuntimeValue::list(chunks))
}

fn list_filter(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 2, 2)?;
    let list = arg_list(args, 0, None)?;
    let predicate = arg_function(args, 1)?;
    let mut kept = Vec::new();
    for (index, element) in list.iter().enumerate() {
        if test_element(handle, "listFilter", &predicate, element, index)? {
            kept.push(element.clone());
        }
    }
    Ok(RuntimeValue::list(kept))
}

fn check_start(start: f64, length: usize) -> Result<usize, EvalError> {
    if !is_integer(start) {
        return Err(EvalError::native(format!(
            "Start index must be an integer, provided: {}",
            num(start)
        )));
    }
    if start < 0.0 || start > length as f64 {
        return Err(EvalError::native(format!(
            "Start index must be in the bounds of the list given (0 - {length}), provided: {}",
            num(start)
        )));
    }
    Ok(start as usize)
}

fn list_splice(args: &[RuntimeValue], _: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 3, 4)?;
    let source = arg_list(args, 0, None)?;
    let start = arg_number(args, 1, None)?;
    let length = arg_number(args, 2, None)?;
    let new_items = arg_list(args, 3, Some(Vec::new()))?;
    let start = check_start(start, source.len())?;
    if !is_integer(length) {
        return Err(EvalError::native("Length must be an integer."));
    }
    if length < 0.0 {
        return Err(EvalError::native("Length must be nonnegative."));
    }
    if start as f64 + length > source.len() as f64 {
        return Err(EvalError::native("Length is too large and causes overflow."));
    }
    let mut result = source.as_ref().clone();
    result.splice(start..start + length as usize, new_items.iter().cloned());
    Ok(RuntimeValue::list(result))
}

fn list_slice(args: &[RuntimeValue], _: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 2, 3)?;
    let source = arg_list(args, 0, None)?;
    let start = arg_number(args, 1, None)?;
    let end = arg_number(args, 2, Some(source.len() as f64))?;
    let start = check_start(start, source.len())?;
    if !is_integer(end) {
        return Err(EvalError::native(format!(
            "End index must be an integer, provided: {}",
            num(end)
        )));
    }
    if end < 0.0 || end > source.len() as f64 {
        return Err(EvalError::native(format!(
            "End index must be in the bounds of the list given (0 - {}), provided: {}",
            source.len(),
            num(end)
        )));
    }
    let end = end as usize;
    if end < start {
        return Err(EvalError::native(format!(
            "End index must be larger or equal to start index. Provided start = {start}, end = {end}"
        )));
    }
    Ok(RuntimeValue::list(source[start..end].to_vec()))
}

fn list_length(args: &[RuntimeValue], _: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 1, 1)?;
    Ok(RuntimeValue::Number(arg_list(args, 0, None)?.len() as f64))
}

fn list_index_of(args: &[RuntimeValue], _: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 2, 2)?;
    let list = arg_list(args, 0, None)?;
    let position = list.iter().position(|item| is_equal(item, &args[1]));
    Ok(RuntimeValue::Number(position.map_or(-1.0, |index| index as f64)))
}

fn list_includes(args: &[RuntimeValue], _: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 2, 2)?;
    let list = arg_list(args, 0, None)?;
    Ok(RuntimeValue::Boolean(
        list.iter().any(|item| is_equal(item, &args[1])),
    ))
}

fn list_find_index(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 2, 2)?;
    let list = arg_list(args, 0, None)?;
    let predicate = arg_function(args, 1)?;
    for (index, element) in list.iter().enumerate() {
        if test_element(handle, "listFindIndex", &predicate, element, index)? {
            return Ok(RuntimeValue::Number(index as f64));
        }
    }
    Ok(RuntimeValue::Number(-1.0))
}

#[cfg(test)]
mod list_tests {
    use super::*;
    use crate::canvas::DefaultFeatureProvider;
    use crate::random::Random;
    use pretty_assertions::assert_eq;

    fn call(function: NativeFunction, args: Vec<RuntimeValue>) -> NativeResult {
        let mut handle =
            InterpreterHandle::new(Random::new("list"), Rc::new(DefaultFeatureProvider));
        function(&args, &mut handle)
    }

    fn numbers(values: &[f64]) -> RuntimeValue {
        RuntimeValue::list(values.iter().copied().map(RuntimeValue::Number).collect())
    }

    fn described(result: NativeResult) -> String {
        result.expect("list call").describe()
    }

    fn failure(result: NativeResult) -> String {
        result.expect_err("list call should fail").to_string()
    }

    fn is_two(args: &[RuntimeValue], _: &mut InterpreterHandle) -> NativeResult {
        Ok(RuntimeValue::Boolean(
            matches!(args[0], RuntimeValue::Number(value) if value == 2.0),
        ))
    }

    fn index_of_element(args: &[RuntimeValue], _: &mut InterpreterHandle) -> NativeResult {
        Ok(args[1].clone())
    }

    fn native(name: &'static str, function: NativeFunction) -> RuntimeValue {
        RuntimeValue::Function(Rc::new(FunctionValue::Native { name, function }))
    }

    #[test]
    fn splice_accepts_the_end_of_the_list() {
        let spliced = call(
            list_splice,
            vec![
                numbers(&[1.0, 2.0]),
                RuntimeValue::Number(2.0),
                RuntimeValue::Number(0.0),
                numbers(&[3.0]),
            ],
        );
        assert_eq!(described(spliced), numbers(&[1.0, 2.0, 3.0]).describe());

        let empty = call(
            list_splice,
            vec![numbers(&[]), RuntimeValue::Number(0.0), RuntimeValue::Number(0.0)],
        );
        assert_eq!(described(empty), numbers(&[]).describe());

        let overflow = call(
            list_splice,
            vec![numbers(&[1.0, 2.0]), RuntimeValue::Number(2.0), RuntimeValue::Number(1.0)],
        );
        assert_eq!(failure(overflow), "Length is too large and causes overflow.");

        let past_end = call(
            list_splice,
            vec![numbers(&[1.0, 2.0]), RuntimeValue::Number(3.0), RuntimeValue::Number(0.0)],
        );
        assert_eq!(
            failure(past_end),
            "Start index must be in the bounds of the list given (0 - 2), provided: 3"
        );
    }

    #[test]
    fn slice_checks_start_and_end_order() {
        let list = numbers(&[1.0, 2.0, 3.0]);
        let at_end = call(list_slice, vec![list.clone(), RuntimeValue::Number(3.0)]);
        assert_eq!(described(at_end), numbers(&[]).describe());

        let empty = call(list_slice, vec![numbers(&[]), RuntimeValue::Number(0.0)]);
        assert_eq!(described(empty), numbers(&[]).describe());

        let reversed = call(
            list_slice,
            vec![list.clone(), RuntimeValue::Number(2.0), RuntimeValue::Number(1.0)],
        );
        assert_eq!(
            failure(reversed),
            "End index must be larger or equal to start index. Provided start = 2, end = 1"
        );

        let too_far = call(
            list_slice,
            vec![list, RuntimeValue::Number(0.0), RuntimeValue::Number(4.0)],
        );
        assert_eq!(
            failure(too_far),
            "End index must be in the bounds of the list given (0 - 3), provided: 4"
        );
    }

    #[test]
    fn chunk_sizes_from_one_to_past_the_length() {
        let list = numbers(&[1.0, 2.0, 3.0]);
        let singles = call(list_chunk, vec![list.clone(), RuntimeValue::Number(1.0)]);
        assert_eq!(
            described(singles),
            RuntimeValue::list(vec![numbers(&[1.0]), numbers(&[2.0]), numbers(&[3.0])]).describe()
        );

        for size in [3.0, 5.0] {
            let whole = call(list_chunk, vec![list.clone(), RuntimeValue::Number(size)]);
            assert_eq!(
                described(whole),
                RuntimeValue::list(vec![numbers(&[1.0, 2.0, 3.0])]).describe()
            );
        }

        let empty = call(list_chunk, vec![numbers(&[]), RuntimeValue::Number(2.0)]);
        assert_eq!(described(empty), numbers(&[]).describe());

        let zero = call(list_chunk, vec![list, RuntimeValue::Number(0.0)]);
        assert_eq!(failure(zero), "Chunk size (0) has to be a positive integer.");
    }

    #[test]
    fn find_index_reports_missing_and_non_boolean_predicates() {
        let found = call(
            list_find_index,
            vec![numbers(&[1.0, 2.0, 2.0]), native("isTwo", is_two)],
        );
        assert_eq!(described(found), "number (value = 1)");

        let empty = call(list_find_index, vec![numbers(&[]), native("isTwo", is_two)]);
        assert_eq!(described(empty), "number (value = -1)");

        let not_boolean = call(
            list_find_index,
            vec![numbers(&[5.0]), native("indexOfElement", index_of_element)],
        );
        assert_eq!(
            failure(not_boolean),
            "Predicate is expected to return booleans, but number (value = 0) is returned for element with index = 0"
        );
    }

    #[test]
    fn filled_lists_are_bounded() {
        let empty = call(list_create_filled, vec![RuntimeValue::Number(0.0)]);
        assert_eq!(described(empty), numbers(&[]).describe());

        let too_large = call(list_create_filled, vec![RuntimeValue::Number(4_294_967_296.0)]);
        assert_eq!(failure(too_large), "Length (4294967296) is too large.");
    }
}
