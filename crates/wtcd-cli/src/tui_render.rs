#![cfg(not(coverage))]

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use crate::tui_actions::CHOICE_VIEWPORT_ROWS;
use crate::tui_state::TuiUiState;
use crate::LoadedStory;

const ELLIPSIS: &str = "…";

pub(crate) fn render_tui(
    frame: &mut Frame<'_>,
    ui: &TuiUiState,
    story: &LoadedStory,
    state_file: &str,
) {
    let terminal_width = frame.area().width as usize;
    let terminal_rows = frame.area().height as usize;
    let content_width = (terminal_width.saturating_sub(2)).max(16);

    let mut lines = ui.rendered_lines.clone();
    if let Some(typing) = &ui.typing_line {
        lines.push(typing.chars().take(ui.typing_chars).collect());
    }
    let wrapped_text_rows = lines
        .iter()
        .flat_map(|line| wrap_line_to_width(line, content_width))
        .collect::<Vec<_>>();

    let choice_display_enabled = !ui.typing_in_progress() && !ui.choices.is_empty();
    let pinned_rows = ui
        .pinned
        .iter()
        .map(|line| truncate_to_width(line, content_width))
        .collect::<Vec<_>>();

    let mut reserved_rows = 3 + 1 + CHOICE_VIEWPORT_ROWS + 1 + 1 + pinned_rows.len();
    if ui.ended {
        reserved_rows += 1;
    }
    if ui.help_visible {
        reserved_rows += 1;
    }
    let visible_text_rows = terminal_rows.saturating_sub(reserved_rows).max(1);
    let clipped_text_rows = if wrapped_text_rows.len() <= visible_text_rows {
        wrapped_text_rows
    } else {
        wrapped_text_rows[wrapped_text_rows.len() - visible_text_rows..].to_vec()
    };

    let choice_text_width = content_width.saturating_sub(2).max(8);
    let visible_choice_rows = (0..CHOICE_VIEWPORT_ROWS)
        .map(|row_index| {
            let absolute_index = ui.choice_scroll_offset + row_index;
            match ui.choices.get(absolute_index) {
                Some(choice) if choice_display_enabled => (
                    truncate_to_width(&choice.text, choice_text_width),
                    absolute_index == ui.selected_choice_index,
                    choice.disabled,
                ),
                _ => (" ".to_string(), false, false),
            }
        })
        .collect::<Vec<_>>();

    let choice_window_text = if choice_display_enabled && ui.choices.len() > CHOICE_VIEWPORT_ROWS {
        let window_end = (ui.choice_scroll_offset + CHOICE_VIEWPORT_ROWS).min(ui.choices.len());
        format!(
            "window {}-{} / {}",
            ui.choice_scroll_offset + 1,
            window_end,
            ui.choices.len()
        )
    } else {
        " ".to_string()
    };

    let header_text = match &ui.state_desc {
        Some(state_desc) => format!("{} | {}", story.title, state_desc),
        None => story.title.clone(),
    };
    let header_text = truncate_to_width(&header_text, content_width);
    let state_text = truncate_to_width(&format!("state: {}", state_file), content_width);
    let status_text = truncate_to_width(&format!("status: {}", ui.status), content_width);
    let divider_line = "─".repeat(content_width);
    let key_text = truncate_to_width(
        "keys: up/down move | enter choose/skip | s save | l load | u undo | r restart | h help | q quit",
        content_width,
    );
    let help_text = truncate_to_width(
        "saves keep the seed and every choice; loading replays them from the start.",
        content_width,
    );

    let gray = Style::default().fg(Color::Gray);
    let mut lines_out: Vec<Line<'_>> = vec![
        Line::from(header_text),
        Line::from(Span::styled(state_text, gray)),
        Line::from(Span::styled(status_text, gray)),
    ];
    for row in pinned_rows {
        lines_out.push(Line::from(Span::styled(row, Style::default().fg(Color::Cyan))));
    }
    lines_out.extend(clipped_text_rows.into_iter().map(Line::from));
    lines_out.push(Line::from(Span::styled(divider_line, gray)));
    for (text, selected, disabled) in visible_choice_rows {
        let prefix = if selected { "> " } else { "  " };
        let style = if disabled {
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::CROSSED_OUT)
        } else if selected {
            Style::default().fg(Color::Green)
        } else {
            Style::default()
        };
        lines_out.push(Line::from(Span::styled(format!("{}{}", prefix, text), style)));
    }
    lines_out.push(Line::from(Span::styled(
        truncate_to_width(&choice_window_text, content_width),
        gray,
    )));
    if ui.ended {
        lines_out.push(Line::from(Span::styled(
            "[end]".to_string(),
            Style::default().fg(Color::Green),
        )));
    }
    lines_out.push(Line::from(Span::styled(
        key_text,
        Style::default().fg(Color::Yellow),
    )));
    if ui.help_visible {
        lines_out.push(Line::from(Span::styled(
            help_text,
            Style::default().fg(Color::Magenta),
        )));
    }

    let paragraph = Paragraph::new(lines_out).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, frame.area());
}

fn truncate_to_width(value: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let chars = value.chars().collect::<Vec<_>>();
    if chars.len() <= width {
        return value.to_string();
    }
    if width == 1 {
        return ELLIPSIS.to_string();
    }
    let mut out = chars.into_iter().take(width - 1).collect::<String>();
    out.push_str(ELLIPSIS);
    out
}

fn wrap_line_to_width(value: &str, width: usize) -> Vec<String> {
    let chars = value.chars().collect::<Vec<_>>();
    if width == 0 || chars.is_empty() {
        return vec![String::new()];
    }
    chars.chunks(width).map(|chunk| chunk.iter().collect()).collect()
}

#[cfg(test)]
mod tui_render_tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use crate::{BoundaryEvent, BoundaryResult, ChoiceRow};

    #[test]
    fn width_helpers_truncate_and_wrap_by_characters() {
        assert_eq!(truncate_to_width("abcdef", 4), "abc…");
        assert_eq!(truncate_to_width("abc", 4), "abc");
        assert_eq!(truncate_to_width("abc", 1), "…");
        assert_eq!(wrap_line_to_width("abcde", 2), vec!["ab", "cd", "e"]);
        assert_eq!(wrap_line_to_width("", 2), vec![String::new()]);
    }

    #[test]
    fn frame_shows_title_state_and_choices() {
        let story = LoadedStory {
            id: "wtcd-file:/tmp/tale.wtcd".to_string(),
            title: "tale".to_string(),
            source: String::new(),
        };
        let mut ui = TuiUiState::default();
        ui.replace_boundary(BoundaryResult {
            event: BoundaryEvent::Choices,
            texts: vec!["Hello".to_string()],
            choices: vec![ChoiceRow {
                index: 0,
                text: "Go".to_string(),
                disabled: false,
            }],
            state_desc: Some("HP 3".to_string()),
            pinned: vec!["Map".to_string()],
        });
        ui.skip_typewriter();

        let mut terminal = Terminal::new(TestBackend::new(60, 20)).expect("terminal");
        terminal
            .draw(|frame| render_tui(frame, &ui, &story, "save.json"))
            .expect("draw");
        let screen = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>();
        assert!(screen.contains("tale | HP 3"));
        assert!(screen.contains("Map"));
        assert!(screen.contains("Hello"));
        assert!(screen.contains("> Go"));
    }
}
