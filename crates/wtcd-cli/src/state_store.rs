use std::fs;
use std::path::Path;

use wtcd_core::WtcdError;

use crate::{
    map_cli_state_invalid, map_cli_state_read, map_cli_state_write, PlayerStateV1,
    PLAYER_STATE_SCHEMA,
};

pub(crate) fn save_player_state(path: &Path, state: &PlayerStateV1) -> Result<(), WtcdError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(map_cli_state_write)?;

    let payload = serde_json::to_string_pretty(state).map_err(map_cli_state_invalid)?;
    fs::write(path, payload).map_err(map_cli_state_write)
}

pub(crate) fn load_player_state(path: &Path) -> Result<PlayerStateV1, WtcdError> {
    if !path.exists() {
        return Err(WtcdError::new(
            "CLI_STATE_NOT_FOUND",
            format!("State file does not exist: {}", path.display()),
        ));
    }

    let raw = fs::read_to_string(path).map_err(map_cli_state_read)?;

    let state: PlayerStateV1 = serde_json::from_str(&raw).map_err(map_cli_state_invalid)?;

    if state.schema_version != PLAYER_STATE_SCHEMA {
        return Err(WtcdError::new(
            "CLI_STATE_SCHEMA",
            format!("Unsupported player state schema: {}", state.schema_version),
        ));
    }

    Ok(state)
}

#[cfg(test)]
mod state_store_tests {
    use super::*;
    use crate::cli_test_support::*;

    fn sample_state() -> PlayerStateV1 {
        PlayerStateV1 {
            schema_version: PLAYER_STATE_SCHEMA.to_string(),
            story_id: "wtcd-file:/tmp/demo.wtcd".to_string(),
            random_seed: "seed".to_string(),
            decisions: vec![0, 2, 1],
        }
    }

    #[test]
    fn save_and_load_keep_seed_and_decisions() {
        let state_path = temp_path("state").join("nested").join("player.json");
        let state = sample_state();
        save_player_state(&state_path, &state).expect("save should pass");
        let raw = fs::read_to_string(&state_path).expect("state should exist");
        assert!(raw.contains("\"schemaVersion\": \"wtcd-player-state.v1\""));
        assert!(raw.contains("\"randomSeed\": \"seed\""));
        assert_eq!(load_player_state(&state_path).expect("load should pass"), state);
    }

    #[test]
    fn load_rejects_missing_invalid_and_foreign_schema_files() {
        let missing = temp_path("missing-state.json");
        let error = load_player_state(&missing).expect_err("missing file should fail");
        assert_eq!(error.code, "CLI_STATE_NOT_FOUND");

        let invalid = temp_path("invalid-state.json");
        write_file(&invalid, "{");
        let error = load_player_state(&invalid).expect_err("invalid json should fail");
        assert_eq!(error.code, "CLI_STATE_INVALID");

        let foreign = temp_path("foreign-state.json");
        let mut state = sample_state();
        state.schema_version = "player-state.v3".to_string();
        save_player_state(&foreign, &state).expect("save should pass");
        let error = load_player_state(&foreign).expect_err("bad schema should fail");
        assert_eq!(error.code, "CLI_STATE_SCHEMA");
    }

    #[test]
    fn save_reports_write_failures() {
        let error = save_player_state(Path::new("/"), &sample_state())
            .expect_err("writing root should fail");
        assert_eq!(error.code, "CLI_STATE_WRITE");
    }
}
