use std::path::Path;

use tracing::debug;
use wtcd_api::{
    create_interpreter, replay_interpreter, step_error_to_wtcd, CreateInterpreterOptions,
    ReplayInterpreterOptions,
};
use wtcd_core::WtcdError;
use wtcd_runtime::Interpreter;

use crate::{
    boundary_from_step, emit_boundary, load_player_state, load_story_by_ref, save_player_state,
    BoundaryEvent, BoundaryResult, LoadedStory, PlayerStateV1, PLAYER_STATE_SCHEMA,
};

/// A running story plus everything needed to rebuild it.
pub(crate) struct PlaySession {
    pub(crate) interpreter: Interpreter,
    pub(crate) random_seed: String,
    pub(crate) decisions: Vec<usize>,
}

impl PlaySession {
    pub(crate) fn choose(&mut self, choice: usize) -> Result<BoundaryResult, WtcdError> {
        let step = self
            .interpreter
            .resume(Some(choice))
            .map_err(step_error_to_wtcd)?;
        self.decisions.push(choice);
        Ok(boundary_from_step(&step, &self.interpreter))
    }

    pub(crate) fn to_state(&self, story_id: &str) -> PlayerStateV1 {
        PlayerStateV1 {
            schema_version: PLAYER_STATE_SCHEMA.to_string(),
            story_id: story_id.to_string(),
            random_seed: self.random_seed.clone(),
            decisions: self.decisions.clone(),
        }
    }
}

pub(crate) fn start_session(
    story: &LoadedStory,
    seed: Option<&str>,
) -> Result<(PlaySession, BoundaryResult), WtcdError> {
    let (mut interpreter, random_seed) = create_interpreter(CreateInterpreterOptions {
        source: story.source.clone(),
        random_seed: seed.map(str::to_string),
        feature_provider: None,
    })?;
    let step = interpreter.resume(None).map_err(step_error_to_wtcd)?;
    let boundary = boundary_from_step(&step, &interpreter);
    Ok((
        PlaySession {
            interpreter,
            random_seed,
            decisions: Vec::new(),
        },
        boundary,
    ))
}

pub(crate) fn replay_session(
    story: &LoadedStory,
    random_seed: &str,
    decisions: &[usize],
) -> Result<(PlaySession, BoundaryResult), WtcdError> {
    debug!(story = %story.id, decisions = decisions.len(), "replaying session");
    let replayed = replay_interpreter(ReplayInterpreterOptions {
        source: story.source.clone(),
        random_seed: random_seed.to_string(),
        decisions: decisions.to_vec(),
        feature_provider: None,
    })?;
    let boundary = boundary_from_step(&replayed.last_step, &replayed.interpreter);
    Ok((
        PlaySession {
            interpreter: replayed.interpreter,
            random_seed: replayed.random_seed,
            decisions: decisions.to_vec(),
        },
        boundary,
    ))
}

/// Rebuilds the session without its latest decision. `None` when nothing was chosen yet.
pub(crate) fn undo_session(
    story: &LoadedStory,
    session: &PlaySession,
) -> Result<Option<(PlaySession, BoundaryResult)>, WtcdError> {
    let Some((_, earlier)) = session.decisions.split_last() else {
        return Ok(None);
    };
    replay_session(story, &session.random_seed, earlier).map(Some)
}

pub(crate) fn save_session_state(
    path: &Path,
    session: &PlaySession,
    story_id: &str,
) -> Result<(), WtcdError> {
    save_player_state(path, &session.to_state(story_id))
}

pub(crate) fn load_session_from_state_for_ref(
    path: &Path,
) -> Result<(LoadedStory, PlaySession, BoundaryResult), WtcdError> {
    let state = load_player_state(path)?;
    let story = load_story_by_ref(&state.story_id)?;
    let (session, boundary) = replay_session(&story, &state.random_seed, &state.decisions)?;
    Ok((story, session, boundary))
}

pub(crate) fn load_session_from_state_for_story(
    path: &Path,
    story: &LoadedStory,
) -> Result<(PlaySession, BoundaryResult), WtcdError> {
    let state = load_player_state(path)?;
    if state.story_id != story.id {
        return Err(WtcdError::new(
            "CLI_STATE_STORY_MISMATCH",
            format!(
                "State story mismatch. expected={} actual={}",
                story.id, state.story_id
            ),
        ));
    }
    replay_session(story, &state.random_seed, &state.decisions)
}

pub(crate) fn emit_boundary_with_saved_state(
    session: &PlaySession,
    boundary: &BoundaryResult,
    state_out: &str,
    story_id: &str,
) -> Result<i32, WtcdError> {
    if boundary.event == BoundaryEvent::Choices {
        save_session_state(Path::new(state_out), session, story_id)?;
        emit_boundary(boundary, Some(state_out));
        return Ok(0);
    }

    emit_boundary(boundary, None);
    Ok(0)
}
