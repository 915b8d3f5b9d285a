use std::ffi::OsString;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wtcd_core::WtcdError;

mod agent;
mod boundary_runner;
mod cli_args;
mod error_map;
mod line_tui;
mod models;
mod session_ops;
mod source_loader;
mod state_store;
mod tui;
mod tui_actions;
mod tui_render;
mod tui_state;

pub(crate) use boundary_runner::{boundary_from_step, emit_boundary};
pub(crate) use cli_args::{AgentArgs, AgentCommand, ChooseArgs, Cli, Mode, PlayArgs, StartArgs};
pub(crate) use error_map::{
    emit_error, json_string, map_cli_source_path, map_cli_source_read, map_cli_state_invalid,
    map_cli_state_read, map_cli_state_write, map_tui_io,
};
pub(crate) use line_tui::run_tui_line_mode;
pub(crate) use models::{
    BoundaryEvent, BoundaryResult, ChoiceRow, LoadedStory, PlayerStateV1, TuiCommandAction,
    TuiCommandContext, PLAYER_STATE_SCHEMA,
};
pub(crate) use session_ops::{
    emit_boundary_with_saved_state, load_session_from_state_for_ref,
    load_session_from_state_for_story, save_session_state, start_session, undo_session,
    PlaySession,
};
pub(crate) use source_loader::{load_story_by_ref, load_story_by_source};
pub(crate) use state_store::{load_player_state, save_player_state};

const DEFAULT_STATE_FILE: &str = ".wtcd/save.json";

/// Logs go to stderr, filtered by `WTCD_LOG` (default `warn`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("WTCD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .with(filter)
        .try_init();
}

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, WtcdError> {
    match cli.command {
        Mode::Agent(args) => agent::run_agent(args),
        Mode::Play(args) => run_play(args),
    }
}

fn run_play(args: PlayArgs) -> Result<i32, WtcdError> {
    let state_file = args
        .state_file
        .unwrap_or_else(|| DEFAULT_STATE_FILE.to_string());
    let story = load_story_by_source(&args.source, args.entry.as_deref())?;
    let context = TuiCommandContext {
        state_file: &state_file,
        story: &story,
        seed: args.seed.as_deref(),
    };
    let (mut session, boundary) = start_session(&story, context.seed)?;

    if args.rich {
        tui::run_tui_rich_mode(&context, &mut session, boundary)
    } else {
        run_tui_line_mode(&context, &mut session, boundary)
    }
}

#[cfg(test)]
mod cli_test_support;
