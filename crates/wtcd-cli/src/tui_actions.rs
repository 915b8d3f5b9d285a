use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use wtcd_core::WtcdError;

use crate::tui_state::TuiUiState;
use crate::{
    load_session_from_state_for_story, save_session_state, start_session, undo_session,
    PlaySession, TuiCommandContext,
};

pub(crate) const CHOICE_VIEWPORT_ROWS: usize = 5;

/// Applies one key press; returns true when the player should quit.
pub(crate) fn handle_key(
    key: KeyEvent,
    context: &TuiCommandContext<'_>,
    session: &mut PlaySession,
    ui: &mut TuiUiState,
) -> Result<bool, WtcdError> {
    if key.code == KeyCode::Esc || matches!(key.code, KeyCode::Char('q')) {
        return Ok(true);
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(true);
    }

    match key.code {
        KeyCode::Char('h') => {
            ui.help_visible = !ui.help_visible;
            return Ok(false);
        }
        KeyCode::Char('r') => {
            let (restarted, boundary) = start_session(context.story, context.seed)?;
            *session = restarted;
            ui.replace_boundary(boundary);
            ui.status = "restarted".to_string();
            return Ok(false);
        }
        KeyCode::Char('s') => {
            save_session_state(Path::new(context.state_file), session, &context.story.id)?;
            ui.status = format!("saved to {}", context.state_file);
            return Ok(false);
        }
        KeyCode::Char('l') => {
            let (resumed, boundary) =
                load_session_from_state_for_story(Path::new(context.state_file), context.story)?;
            *session = resumed;
            ui.replace_boundary(boundary);
            ui.status = format!("loaded from {}", context.state_file);
            return Ok(false);
        }
        KeyCode::Char('u') => {
            match undo_session(context.story, session)? {
                Some((undone, boundary)) => {
                    *session = undone;
                    ui.replace_boundary(boundary);
                    ui.status = "undone".to_string();
                }
                None => ui.status = "nothing to undo".to_string(),
            }
            return Ok(false);
        }
        _ => {}
    }

    if ui.typing_in_progress() {
        if key.code == KeyCode::Enter || key.code == KeyCode::Char(' ') {
            ui.skip_typewriter();
        } else {
            ui.status = "text streaming...".to_string();
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Up | KeyCode::Down if ui.choices.is_empty() => {
            ui.status = "no pending choice".to_string();
        }
        KeyCode::Up => {
            ui.selected_choice_index = ui.selected_choice_index.saturating_sub(1);
            if ui.selected_choice_index < ui.choice_scroll_offset {
                ui.choice_scroll_offset = ui.selected_choice_index;
            }
        }
        KeyCode::Down => {
            let last = ui.choices.len().saturating_sub(1);
            ui.selected_choice_index = (ui.selected_choice_index + 1).min(last);
            if ui.choices.len() > CHOICE_VIEWPORT_ROWS
                && ui.selected_choice_index >= ui.choice_scroll_offset + CHOICE_VIEWPORT_ROWS
            {
                ui.choice_scroll_offset = ui.selected_choice_index - CHOICE_VIEWPORT_ROWS + 1;
            }
        }
        KeyCode::Enter => {
            let Some(selected) = ui.choices.get(ui.selected_choice_index) else {
                ui.status = "no pending choice".to_string();
                return Ok(false);
            };
            if selected.disabled {
                ui.status = "choice is disabled".to_string();
                return Ok(false);
            }
            let index = selected.index;
            let boundary = session.choose(index)?;
            ui.append_boundary(boundary);
            ui.status = format!("chose {}", index);
        }
        _ => {}
    }

    Ok(false)
}

#[cfg(test)]
mod tui_actions_tests {
    use super::*;
    use crate::cli_test_support::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn keys_move_choose_and_quit() {
        let story = story_file("tui-keys", SIMPLE_STORY);
        let state = temp_path("tui-keys.json");
        let state_file = state.to_string_lossy().to_string();
        let context = TuiCommandContext {
            state_file: &state_file,
            story: &story,
            seed: Some("fixed"),
        };
        let (mut session, boundary) = start_session(&story, context.seed).expect("start");
        let mut ui = TuiUiState::default();
        ui.replace_boundary(boundary);

        assert!(!handle_key(press(KeyCode::Down), &context, &mut session, &mut ui).expect("key"));
        assert_eq!(ui.status, "text streaming...");
        handle_key(press(KeyCode::Enter), &context, &mut session, &mut ui).expect("skip");
        assert!(!ui.typing_in_progress());

        handle_key(press(KeyCode::Down), &context, &mut session, &mut ui).expect("down");
        handle_key(press(KeyCode::Enter), &context, &mut session, &mut ui).expect("enter");
        assert_eq!(ui.status, "choice is disabled");

        handle_key(press(KeyCode::Up), &context, &mut session, &mut ui).expect("up");
        handle_key(press(KeyCode::Char('s')), &context, &mut session, &mut ui).expect("save");
        assert!(state.exists());
        handle_key(press(KeyCode::Enter), &context, &mut session, &mut ui).expect("choose");
        assert_eq!(ui.status, "chose 0");
        assert!(ui.ended);

        handle_key(press(KeyCode::Char('u')), &context, &mut session, &mut ui).expect("undo");
        assert_eq!(ui.status, "undone");
        assert!(!ui.ended);
        assert!(
            handle_key(press(KeyCode::Char('q')), &context, &mut session, &mut ui).expect("quit")
        );
    }
}
