use wtcd_api::content_to_lines;
use wtcd_runtime::{Interpreter, Step};

use crate::{json_string, BoundaryEvent, BoundaryResult, ChoiceRow};

/// Snapshot of what the reader sees after a step.
pub(crate) fn boundary_from_step(step: &Step, interpreter: &Interpreter) -> BoundaryResult {
    let output = step.output();
    let event = if step.is_finished() {
        BoundaryEvent::End
    } else {
        BoundaryEvent::Choices
    };
    BoundaryResult {
        event,
        texts: content_to_lines(&output.content),
        choices: output
            .choices
            .iter()
            .enumerate()
            .map(|(index, choice)| ChoiceRow {
                index,
                text: choice.content.clone(),
                disabled: choice.disabled,
            })
            .collect(),
        state_desc: interpreter.state_desc().map(str::to_string),
        pinned: content_to_lines(interpreter.pinned()),
    }
}

pub(crate) fn boundary_lines(boundary: &BoundaryResult, state_out: Option<&str>) -> Vec<String> {
    let mut lines = vec!["RESULT:OK".to_string()];
    lines.push(match boundary.event {
        BoundaryEvent::Choices => "EVENT:CHOICES".to_string(),
        BoundaryEvent::End => "EVENT:END".to_string(),
    });

    for text in &boundary.texts {
        lines.push(format!("TEXT_JSON:{}", json_string(text)));
    }

    if let Some(state_desc) = &boundary.state_desc {
        lines.push(format!("STATE_DESC_JSON:{}", json_string(state_desc)));
    }

    for text in &boundary.pinned {
        lines.push(format!("PINNED_JSON:{}", json_string(text)));
    }

    for choice in &boundary.choices {
        let tag = if choice.disabled {
            "CHOICE_DISABLED"
        } else {
            "CHOICE"
        };
        lines.push(format!("{}:{}|{}", tag, choice.index, json_string(&choice.text)));
    }

    lines.push(format!("STATE_OUT:{}", state_out.unwrap_or("NONE")));
    lines
}

pub(crate) fn emit_boundary(boundary: &BoundaryResult, state_out: Option<&str>) {
    for line in boundary_lines(boundary, state_out) {
        println!("{}", line);
    }
}
