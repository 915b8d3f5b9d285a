use std::path::Path;

use tracing::debug;
use wtcd_core::WtcdError;

use crate::{
    emit_boundary_with_saved_state, load_session_from_state_for_ref, load_story_by_source,
    start_session, AgentArgs, AgentCommand, ChooseArgs, StartArgs,
};

pub(super) fn run_agent(args: AgentArgs) -> Result<i32, WtcdError> {
    match args.command {
        AgentCommand::Start(args) => run_start(args),
        AgentCommand::Choose(args) => run_choose(args),
    }
}

pub(super) fn run_start(args: StartArgs) -> Result<i32, WtcdError> {
    let story = load_story_by_source(&args.source, args.entry.as_deref())?;
    let (session, boundary) = start_session(&story, args.seed.as_deref())?;
    debug!(story = %story.id, seed = %session.random_seed, "agent start");
    emit_boundary_with_saved_state(&session, &boundary, &args.state_out, &story.id)
}

pub(super) fn run_choose(args: ChooseArgs) -> Result<i32, WtcdError> {
    let (story, mut session, _) = load_session_from_state_for_ref(Path::new(&args.state_in))?;
    let boundary = session.choose(args.choice)?;
    debug!(story = %story.id, choice = args.choice, "agent choose");
    emit_boundary_with_saved_state(&session, &boundary, &args.state_out, &story.id)
}
