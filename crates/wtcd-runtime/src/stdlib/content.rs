use crate::content::{escape_html, text_element, ContentNode};
use crate::engine::InterpreterHandle;
use crate::error::EvalError;
use crate::value::{NativeFunction, RuntimeValue};

use super::utils::{arg_list, arg_number, arg_string, assert_args_length, num, NativeResult};

pub(crate) const CONTENT_FUNCTIONS: &[(&str, NativeFunction)] = &[
    ("contentAddParagraph", content_add_paragraph),
    ("contentAddImage", content_add_image),
    ("contentAddUnorderedList", content_add_unordered_list),
    ("contentAddOrderedList", content_add_ordered_list),
    ("contentAddHeader", content_add_header),
    ("contentAddTable", content_add_table),
    ("contentAddHorizontalRule", content_add_horizontal_rule),
];

fn content_add_paragraph(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 1, 1)?;
    let text = arg_string(args, 0, None)?;
    handle.push_content(ContentNode::Html(text_element("p", &text)));
    Ok(RuntimeValue::Null)
}

fn content_add_image(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 1, 1)?;
    let src = arg_string(args, 0, None)?;
    handle.push_content(ContentNode::Html(format!("<img src=\"{}\">", escape_html(&src))));
    Ok(RuntimeValue::Null)
}

fn list_items(args: &[RuntimeValue]) -> Result<String, EvalError> {
    (0..args.len())
        .map(|index| Ok(text_element("li", &arg_string(args, index, None)?)))
        .collect()
}

fn content_add_unordered_list(
    args: &[RuntimeValue],
    handle: &mut InterpreterHandle,
) -> NativeResult {
    let items = list_items(args)?;
    handle.push_content(ContentNode::Html(format!("<ul>{items}</ul>")));
    Ok(RuntimeValue::Null)
}

fn content_add_ordered_list(
    args: &[RuntimeValue],
    handle: &mut InterpreterHandle,
) -> NativeResult {
    let items = list_items(args)?;
    handle.push_content(ContentNode::Html(format!("<ol>{items}</ol>")));
    Ok(RuntimeValue::Null)
}

fn content_add_header(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 1, 2)?;
    let level = arg_number(args, 1, Some(1.0))?;
    if ![1.0, 2.0, 3.0, 4.0, 5.0, 6.0].contains(&level) {
        return Err(EvalError::native(format!(
            "There is no header with level {}",
            num(level)
        )));
    }
    let text = arg_string(args, 0, None)?;
    handle.push_content(ContentNode::Html(text_element(&format!("h{level}"), &text)));
    Ok(RuntimeValue::Null)
}

fn content_add_table(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 1, usize::MAX)?;
    let rows = (0..args.len())
        .map(|index| arg_list(args, index, None))
        .collect::<Result<Vec<_>, _>>()?;
    let width = rows[0].len();
    let mut cells = Vec::with_capacity(rows.len());
    for (row_index, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(EvalError::native(format!(
                "Row with index = {row_index} has incorrect number of items. Expecting {width}, received {}",
                row.len()
            )));
        }
        let mut texts = Vec::with_capacity(width);
        for (column_index, item) in row.iter().enumerate() {
            let RuntimeValue::String(text) = item else {
                return Err(EvalError::native(format!(
                    "Item in row with index = {row_index}, and column with index = {column_index} is expected to be a string, received: {}",
                    item.describe()
                )));
            };
            texts.push(text.as_str());
        }
        cells.push(texts);
    }
    let mut html = String::from("<table><thead><tr>");
    for text in &cells[0] {
        html.push_str(&text_element("th", text));
    }
    html.push_str("</tr></thead><tbody>");
    for row in &cells[1..] {
        html.push_str("<tr>");
        for text in row {
            html.push_str(&text_element("td", text));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    handle.push_content(ContentNode::Html(html));
    Ok(RuntimeValue::Null)
}

fn content_add_horizontal_rule(
    args: &[RuntimeValue],
    handle: &mut InterpreterHandle,
) -> NativeResult {
    assert_args_length(args, 0, 0)?;
    handle.push_content(ContentNode::Html("<hr>".to_string()));
    Ok(RuntimeValue::Null)
}
