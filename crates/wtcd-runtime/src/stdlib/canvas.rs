use crate::canvas::{ChainedCanvas, DrawCommand};
use crate::content::ContentNode;
use crate::engine::InterpreterHandle;
use crate::error::EvalError;
use crate::value::{NativeFunction, RuntimeValue};

use super::utils::{arg_number, arg_string, assert_args_length, is_integer, num, NativeResult};

pub(crate) const CANVAS_FUNCTIONS: &[(&str, NativeFunction)] = &[
    ("canvasCreate", canvas_create),
    ("canvasOutput", canvas_output),
    ("canvasClear", canvas_clear),
    ("canvasPutImage", canvas_put_image),
    ("canvasPutImagePart", canvas_put_image_part),
    ("canvasSetFont", canvas_set_font),
    ("canvasSetFillStyle", canvas_set_fill_style),
    ("canvasFillText", canvas_fill_text),
    ("canvasFillRect", canvas_fill_rect),
    ("canvasSetStrokeStyle", canvas_set_stroke_style),
    ("canvasSetLineWidth", canvas_set_line_width),
    ("canvasStrokeText", canvas_stroke_text),
];

const H_ALIGNS: &[&str] = &["left", "center", "right", "start", "end"];
const V_ALIGNS: &[&str] = &["top", "hanging", "middle", "alphabetic", "ideographic", "bottom"];

fn obtain_canvas<'a>(
    handle: &'a mut InterpreterHandle,
    id: &str,
) -> Result<&'a mut ChainedCanvas, EvalError> {
    handle
        .canvases_mut()
        .get_mut(id)
        .ok_or_else(|| EvalError::native(format!("Canvas with id=\"{id}\" does not exist.")))
}

/// Queues `command` on the canvas named by the first argument.
fn queue(handle: &mut InterpreterHandle, id: &str, command: DrawCommand) -> NativeResult {
    obtain_canvas(handle, id)?.update(command);
    Ok(RuntimeValue::Null)
}

fn check_dimension(label: &str, value: f64) -> Result<u32, EvalError> {
    if !is_integer(value) {
        return Err(EvalError::native(format!(
            "{label} ({}) has to be an integer",
            num(value)
        )));
    }
    if value <= 0.0 {
        return Err(EvalError::native(format!(
            "{label} ({}) must be positive",
            num(value)
        )));
    }
    Ok(value as u32)
}

fn text_alignment(args: &[RuntimeValue]) -> Result<(String, String), EvalError> {
    let h_align = arg_string(args, 4, Some("start"))?;
    let v_align = arg_string(args, 5, Some("alphabetic"))?;
    if !H_ALIGNS.contains(&h_align.as_str()) {
        return Err(EvalError::native(format!("Unknown text hAlign: {h_align}")));
    }
    if !V_ALIGNS.contains(&v_align.as_str()) {
        return Err(EvalError::native(format!("Unknown text vAlign: {v_align}")));
    }
    Ok((h_align, v_align))
}

/// Optional width/height pair; negative means "not given".
fn optional_size(width: f64, height: f64, message: &str) -> Result<Option<(f64, f64)>, EvalError> {
    if (width < 0.0) != (height < 0.0) {
        return Err(EvalError::native(message));
    }
    Ok((width >= 0.0).then_some((width, height)))
}

fn canvas_create(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 3, 3)?;
    let id = arg_string(args, 0, None)?;
    let width = arg_number(args, 1, None)?;
    let height = arg_number(args, 2, None)?;
    if handle.canvases_mut().contains_key(&id) {
        return Err(EvalError::native(format!(
            "Canvas with id=\"{id}\" already exists"
        )));
    }
    let width = check_dimension("Width", width)?;
    let height = check_dimension("Height", height)?;
    handle
        .canvases_mut()
        .insert(id, ChainedCanvas::new(width, height));
    Ok(RuntimeValue::Null)
}

fn canvas_output(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    let id = arg_string(args, 0, None)?;
    let provider = handle.feature_provider();
    let snapshot = obtain_canvas(handle, &id)?.resolve(&id, provider.as_ref());
    handle.push_content(ContentNode::Canvas(snapshot));
    Ok(RuntimeValue::Null)
}

fn canvas_clear(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    let id = arg_string(args, 0, None)?;
    queue(handle, &id, DrawCommand::Clear)
}

fn canvas_put_image(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 4, 6)?;
    let id = arg_string(args, 0, None)?;
    let source = arg_string(args, 1, None)?;
    let x = arg_number(args, 2, None)?;
    let y = arg_number(args, 3, None)?;
    let width = arg_number(args, 4, Some(-1.0))?;
    let height = arg_number(args, 5, Some(-1.0))?;
    let size = optional_size(
        width,
        height,
        "Width and height must be provided at the same time.",
    )?;
    queue(handle, &id, DrawCommand::PutImage { source, x, y, size })
}

fn canvas_put_image_part(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 8, 10)?;
    let id = arg_string(args, 0, None)?;
    let source = arg_string(args, 1, None)?;
    let source_rect = (
        arg_number(args, 2, None)?,
        arg_number(args, 3, None)?,
        arg_number(args, 4, None)?,
        arg_number(args, 5, None)?,
    );
    let dest_x = arg_number(args, 6, None)?;
    let dest_y = arg_number(args, 7, None)?;
    let dest_width = arg_number(args, 8, Some(-1.0))?;
    let dest_height = arg_number(args, 9, Some(-1.0))?;
    let dest_size = optional_size(
        dest_width,
        dest_height,
        "destWidth and destHeight must be provided at the same time.",
    )?
    .or(Some((source_rect.2, source_rect.3)));
    queue(
        handle,
        &id,
        DrawCommand::PutImagePart {
            source,
            source_rect,
            dest_x,
            dest_y,
            dest_size,
        },
    )
}

fn canvas_set_font(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 3, 3)?;
    let id = arg_string(args, 0, None)?;
    let size = arg_number(args, 1, None)?;
    let font = arg_string(args, 2, None)?;
    queue(handle, &id, DrawCommand::SetFont { size, font })
}

fn canvas_set_fill_style(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 2, 2)?;
    let id = arg_string(args, 0, None)?;
    let color = arg_string(args, 1, None)?;
    queue(handle, &id, DrawCommand::SetFillStyle { color })
}

fn canvas_fill_text(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 4, 6)?;
    let id = arg_string(args, 0, None)?;
    let text = arg_string(args, 1, None)?;
    let x = arg_number(args, 2, None)?;
    let y = arg_number(args, 3, None)?;
    obtain_canvas(handle, &id)?;
    let (h_align, v_align) = text_alignment(args)?;
    queue(
        handle,
        &id,
        DrawCommand::FillText {
            text,
            x,
            y,
            h_align,
            v_align,
        },
    )
}

fn canvas_fill_rect(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 5, 5)?;
    let id = arg_string(args, 0, None)?;
    let x = arg_number(args, 1, None)?;
    let y = arg_number(args, 2, None)?;
    let width = arg_number(args, 3, None)?;
    let height = arg_number(args, 4, None)?;
    queue(
        handle,
        &id,
        DrawCommand::FillRect {
            x,
            y,
            width,
            height,
        },
    )
}

fn canvas_set_stroke_style(
    args: &[RuntimeValue],
    handle: &mut InterpreterHandle,
) -> NativeResult {
    assert_args_length(args, 2, 2)?;
    let id = arg_string(args, 0, None)?;
    let color = arg_string(args, 1, None)?;
    queue(handle, &id, DrawCommand::SetStrokeStyle { color })
}

fn canvas_set_line_width(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 2, 2)?;
    let id = arg_string(args, 0, None)?;
    let width = arg_number(args, 1, None)?;
    queue(handle, &id, DrawCommand::SetLineWidth { width })
}

fn canvas_stroke_text(args: &[RuntimeValue], handle: &mut InterpreterHandle) -> NativeResult {
    assert_args_length(args, 4, 6)?;
    let id = arg_string(args, 0, None)?;
    let text = arg_string(args, 1, None)?;
    let x = arg_number(args, 2, None)?;
    let y = arg_number(args, 3, None)?;
    obtain_canvas(handle, &id)?;
    let (h_align, v_align) = text_alignment(args)?;
    queue(
        handle,
        &id,
        DrawCommand::StrokeText {
            text,
            x,
            y,
            h_align,
            v_align,
        },
    )
}
