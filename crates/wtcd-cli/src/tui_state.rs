use crate::{BoundaryEvent, BoundaryResult, ChoiceRow};

#[derive(Debug, Default)]
pub(crate) struct TuiUiState {
    pub(crate) rendered_lines: Vec<String>,
    pub(crate) pending_lines: Vec<String>,
    pub(crate) typing_line: Option<String>,
    pub(crate) typing_chars: usize,
    pub(crate) choices: Vec<ChoiceRow>,
    pub(crate) state_desc: Option<String>,
    pub(crate) pinned: Vec<String>,
    pub(crate) selected_choice_index: usize,
    pub(crate) choice_scroll_offset: usize,
    pub(crate) ended: bool,
    pub(crate) help_visible: bool,
    pub(crate) status: String,
}

impl TuiUiState {
    pub(crate) fn typing_in_progress(&self) -> bool {
        self.typing_line.is_some() || !self.pending_lines.is_empty()
    }

    pub(crate) fn set_boundary_state(&mut self, boundary: BoundaryResult) {
        self.state_desc = boundary.state_desc;
        self.pinned = boundary.pinned;
        self.ended = boundary.event == BoundaryEvent::End;
        self.choices = boundary.choices;
        self.selected_choice_index = self
            .choices
            .iter()
            .position(|choice| !choice.disabled)
            .unwrap_or(0);
        self.choice_scroll_offset = 0;
    }

    pub(crate) fn append_boundary(&mut self, mut boundary: BoundaryResult) {
        if !boundary.texts.is_empty() {
            self.pending_lines.push(String::new());
            self.pending_lines.append(&mut boundary.texts);
        }
        self.set_boundary_state(boundary);
    }

    pub(crate) fn replace_boundary(&mut self, mut boundary: BoundaryResult) {
        self.rendered_lines.clear();
        self.pending_lines = std::mem::take(&mut boundary.texts);
        self.typing_line = None;
        self.typing_chars = 0;
        self.set_boundary_state(boundary);
    }

    /// Reveals one more character; returns false once everything is shown.
    pub(crate) fn advance_typewriter(&mut self) -> bool {
        let Some(line) = &self.typing_line else {
            if self.pending_lines.is_empty() {
                return false;
            }
            let next_line = self.pending_lines.remove(0);
            if next_line.is_empty() {
                self.rendered_lines.push(next_line);
                return true;
            }
            self.typing_line = Some(next_line);
            self.typing_chars = 1;
            return true;
        };

        if self.typing_chars >= line.chars().count() {
            let finished = line.clone();
            self.rendered_lines.push(finished);
            self.typing_line = None;
            self.typing_chars = 0;
            return true;
        }
        self.typing_chars += 1;
        true
    }

    pub(crate) fn skip_typewriter(&mut self) {
        if let Some(line) = self.typing_line.take() {
            self.rendered_lines.push(line);
        }
        self.rendered_lines.append(&mut self.pending_lines);
        self.typing_chars = 0;
    }
}
