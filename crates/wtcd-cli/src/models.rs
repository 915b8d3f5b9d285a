use serde::{Deserialize, Serialize};

pub(crate) const PLAYER_STATE_SCHEMA: &str = "wtcd-player-state.v1";

#[derive(Debug, Clone)]
pub(crate) struct LoadedStory {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) source: String,
}

/// Saved progress: a story is restored by replaying `decisions` under `random_seed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlayerStateV1 {
    pub(crate) schema_version: String,
    pub(crate) story_id: String,
    pub(crate) random_seed: String,
    pub(crate) decisions: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BoundaryEvent {
    Choices,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChoiceRow {
    pub(crate) index: usize,
    pub(crate) text: String,
    pub(crate) disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BoundaryResult {
    pub(crate) event: BoundaryEvent,
    pub(crate) texts: Vec<String>,
    pub(crate) choices: Vec<ChoiceRow>,
    pub(crate) state_desc: Option<String>,
    pub(crate) pinned: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TuiCommandAction {
    NotHandled,
    Continue,
    Refresh(BoundaryResult),
    Quit,
}

pub(crate) struct TuiCommandContext<'a> {
    pub(crate) state_file: &'a str,
    pub(crate) story: &'a LoadedStory,
    pub(crate) seed: Option<&'a str>,
}
