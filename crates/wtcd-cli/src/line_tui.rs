use std::io::{self, BufRead, Write};
use std::path::Path;

use wtcd_core::WtcdError;

use crate::{
    load_session_from_state_for_story, map_tui_io, save_session_state, start_session,
    undo_session, BoundaryEvent, BoundaryResult, LoadedStory, PlaySession, TuiCommandAction,
    TuiCommandContext,
};

const HELP_TEXT: &str = "commands: :help :save :load :undo :restart :quit";

pub(crate) fn run_tui_line_mode(
    context: &TuiCommandContext<'_>,
    session: &mut PlaySession,
    boundary: BoundaryResult,
) -> Result<i32, WtcdError> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut writer = io::stdout();
    run_tui_line_mode_with_io(context, session, boundary, &mut reader, &mut writer)
}

pub(crate) fn run_tui_line_mode_with_io(
    context: &TuiCommandContext<'_>,
    session: &mut PlaySession,
    mut boundary: BoundaryResult,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<i32, WtcdError> {
    writeln!(writer, "WTCD player: {}", context.story.title).map_err(map_tui_io)?;
    writeln!(writer, "{}", HELP_TEXT).map_err(map_tui_io)?;

    loop {
        write_boundary(writer, &boundary)?;
        if boundary.event == BoundaryEvent::End {
            return Ok(0);
        }

        loop {
            let Some(raw) = prompt_input_from("> ", reader, writer)? else {
                return Ok(0);
            };
            let mut emit = |line: String| writeln!(writer, "{}", line).map_err(map_tui_io);
            match handle_tui_command(raw.trim(), context, session, &mut emit)? {
                TuiCommandAction::Continue => continue,
                TuiCommandAction::Refresh(next) => {
                    boundary = next;
                    break;
                }
                TuiCommandAction::Quit => return Ok(0),
                TuiCommandAction::NotHandled => {}
            }
            let Ok(choice) = raw.trim().parse::<usize>() else {
                writeln!(writer, "invalid choice index: {}", raw).map_err(map_tui_io)?;
                continue;
            };
            match session.choose(choice) {
                Ok(next) => {
                    boundary = next;
                    break;
                }
                Err(error) if error.code == "WTCD_INVALID_CHOICE" => {
                    writeln!(writer, "{}", error.message).map_err(map_tui_io)?;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

fn write_boundary(writer: &mut dyn Write, boundary: &BoundaryResult) -> Result<(), WtcdError> {
    if let Some(state_desc) = &boundary.state_desc {
        writeln!(writer, "[{}]", state_desc).map_err(map_tui_io)?;
    }
    for line in &boundary.pinned {
        writeln!(writer, "| {}", line).map_err(map_tui_io)?;
    }
    for text in &boundary.texts {
        writeln!(writer).map_err(map_tui_io)?;
        writeln!(writer, "{}", text).map_err(map_tui_io)?;
    }
    writeln!(writer).map_err(map_tui_io)?;
    match boundary.event {
        BoundaryEvent::Choices => {
            for choice in &boundary.choices {
                let marker = if choice.disabled { " (disabled)" } else { "" };
                writeln!(writer, "  [{}] {}{}", choice.index, choice.text, marker)
                    .map_err(map_tui_io)?;
            }
        }
        BoundaryEvent::End => writeln!(writer, "[END]").map_err(map_tui_io)?,
    }
    Ok(())
}

pub(crate) fn handle_tui_command(
    raw: &str,
    context: &TuiCommandContext<'_>,
    session: &mut PlaySession,
    emit: &mut dyn FnMut(String) -> Result<(), WtcdError>,
) -> Result<TuiCommandAction, WtcdError> {
    match raw {
        ":help" => {
            emit(HELP_TEXT.to_string())?;
            Ok(TuiCommandAction::Continue)
        }
        ":save" => {
            save_session_state(Path::new(context.state_file), session, &context.story.id)?;
            emit(format!("saved: {}", context.state_file))?;
            Ok(TuiCommandAction::Continue)
        }
        ":load" => {
            let (resumed, boundary) =
                load_session_from_state_for_story(Path::new(context.state_file), context.story)?;
            *session = resumed;
            emit(format!("loaded: {}", context.state_file))?;
            Ok(TuiCommandAction::Refresh(boundary))
        }
        ":undo" => match undo_session(context.story, session)? {
            Some((undone, boundary)) => {
                *session = undone;
                emit("undone".to_string())?;
                Ok(TuiCommandAction::Refresh(boundary))
            }
            None => {
                emit("nothing to undo".to_string())?;
                Ok(TuiCommandAction::Continue)
            }
        },
        ":restart" => {
            let (restarted, boundary) = start_session(context.story, context.seed)?;
            *session = restarted;
            emit("restarted".to_string())?;
            Ok(TuiCommandAction::Refresh(boundary))
        }
        ":quit" => {
            emit("bye".to_string())?;
            Ok(TuiCommandAction::Quit)
        }
        _ => Ok(TuiCommandAction::NotHandled),
    }
}

/// Reads one line after printing `prefix`; `None` at end of input.
pub(crate) fn prompt_input_from(
    prefix: &str,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<Option<String>, WtcdError> {
    write!(writer, "{}", prefix).map_err(map_tui_io)?;
    writer.flush().map_err(map_tui_io)?;
    let mut input = String::new();
    if reader.read_line(&mut input).map_err(map_tui_io)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim_end_matches(&['\r', '\n'][..]).to_string()))
}

#[cfg(test)]
mod line_tui_tests {
    use super::*;
    use crate::cli_test_support::*;

    fn play(story: &LoadedStory, state_file: &str, input: &str) -> (i32, String) {
        let context = TuiCommandContext {
            state_file,
            story,
            seed: Some("fixed"),
        };
        let (mut session, boundary) = start_session(story, context.seed).expect("start");
        let mut reader = io::Cursor::new(input.as_bytes().to_vec());
        let mut writer = Vec::new();
        let code =
            run_tui_line_mode_with_io(&context, &mut session, boundary, &mut reader, &mut writer)
                .expect("line mode should run");
        (code, String::from_utf8(writer).expect("utf-8 output"))
    }

    #[test]
    fn line_mode_plays_until_the_end() {
        let story = story_file("line-end", SIMPLE_STORY);
        let state = temp_path("line-end.json");
        let (code, output) = play(&story, &state.to_string_lossy(), "1\n0\n");
        assert_eq!(code, 0);
        assert!(output.contains("[lantern lit]"));
        assert!(output.contains("  [1] Climb the wall (disabled)"));
        assert!(output.contains("Invalid choice 1."));
        assert!(output.contains("Daylight."));
        assert!(output.trim_end().ends_with("[END]"));
    }

    #[test]
    fn line_mode_commands_save_undo_and_load() {
        let story = story_file("line-commands", COUNTER_STORY);
        let state = temp_path("line-commands.json");
        let state_path = state.to_string_lossy().to_string();
        let (code, output) = play(
            &story,
            &state_path,
            "0\n:save\n0\n:undo\n:undo\n:undo\n:load\nabc\n:help\n:quit\n",
        );
        assert_eq!(code, 0);
        assert!(output.contains(&format!("saved: {}", state_path)));
        assert!(output.contains("Visit 3."));
        assert_eq!(output.matches("undone").count(), 2);
        assert!(output.contains("nothing to undo"));
        assert!(output.contains(&format!("loaded: {}", state_path)));
        assert!(output.contains("invalid choice index: abc"));
        assert!(output.contains(HELP_TEXT));
        assert!(output.trim_end().ends_with("bye"));
    }

    #[test]
    fn end_of_input_quits_quietly() {
        let story = story_file("line-eof", COUNTER_STORY);
        let state = temp_path("line-eof.json");
        let (code, output) = play(&story, &state.to_string_lossy(), "");
        assert_eq!(code, 0);
        assert!(output.contains("Visit 1."));
    }

    #[test]
    fn restart_begins_a_fresh_session() {
        let story = story_file("line-restart", COUNTER_STORY);
        let state = temp_path("line-restart.json");
        let (_, output) = play(&story, &state.to_string_lossy(), "0\n:restart\n:quit\n");
        assert!(output.contains("restarted"));
        assert_eq!(output.matches("Visit 1.").count(), 2);
    }
}
