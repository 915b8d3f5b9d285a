use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

fn demos_root() -> PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("demos")
}

fn run_agent(args: &[&str]) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_wtcd-cli");
    Command::new(bin)
        .arg("agent")
        .args(args)
        .output()
        .expect("agent command should run")
}

fn parse_state_out(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("STATE_OUT:").map(|v| v.to_string()))
        .filter(|value| value != "NONE")
}

fn start_hall(state_out: &Path) -> String {
    let scenario = demos_root().join("02-hall-loop");
    let start = run_agent(&[
        "start",
        "--source",
        scenario.to_str().expect("path should be utf-8"),
        "--state-out",
        state_out.to_str().expect("path should be utf-8"),
        "--seed",
        "roundtrip",
    ]);
    assert!(start.status.success(), "start failed");
    String::from_utf8_lossy(&start.stdout).to_string()
}

#[test]
fn agent_choice_flow_reaches_end() {
    let state_1 = std::env::temp_dir().join("wtcd-cli-agent-choice-1.json");
    let state_2 = std::env::temp_dir().join("wtcd-cli-agent-choice-2.json");
    let state_3 = std::env::temp_dir().join("wtcd-cli-agent-choice-3.json");

    let start_stdout = start_hall(&state_1);
    assert!(start_stdout.contains("RESULT:OK"));
    assert!(start_stdout.contains("EVENT:CHOICES"));
    assert!(start_stdout.contains("STATE_DESC_JSON:\"Visits: 1\""));
    assert!(start_stdout.contains("CHOICE_DISABLED:1|\"Open the gate\""));
    assert!(parse_state_out(&start_stdout).is_some());

    let search = run_agent(&[
        "choose",
        "--state-in",
        state_1.to_str().expect("path should be utf-8"),
        "--choice",
        "0",
        "--state-out",
        state_2.to_str().expect("path should be utf-8"),
    ]);
    assert!(search.status.success(), "first choose failed");
    let search_stdout = String::from_utf8_lossy(&search.stdout);
    assert!(search_stdout.contains("EVENT:CHOICES"));
    assert!(search_stdout.contains("TEXT_JSON:\"The hall again. Visit 2.\""));
    assert!(search_stdout.contains("CHOICE:1|\"Open the gate\""));

    let gate = run_agent(&[
        "choose",
        "--state-in",
        state_2.to_str().expect("path should be utf-8"),
        "--choice",
        "1",
        "--state-out",
        state_3.to_str().expect("path should be utf-8"),
    ]);
    assert!(gate.status.success(), "second choose failed");
    let gate_stdout = String::from_utf8_lossy(&gate.stdout);
    assert!(gate_stdout.contains("RESULT:OK"));
    assert!(gate_stdout.contains("EVENT:END"));
    assert!(gate_stdout.contains("STATE_OUT:NONE"));
}

#[test]
fn agent_choose_with_disabled_choice_returns_error() {
    let state = std::env::temp_dir().join("wtcd-cli-agent-disabled-choice.json");
    start_hall(&state);

    let choose = run_agent(&[
        "choose",
        "--state-in",
        state.to_str().expect("path should be utf-8"),
        "--choice",
        "1",
        "--state-out",
        "/tmp/unreachable.json",
    ]);
    assert!(!choose.status.success(), "disabled choice should fail");
    let stdout = String::from_utf8_lossy(&choose.stdout);
    assert!(stdout.contains("RESULT:ERROR"));
    assert!(stdout.contains("ERROR_CODE:WTCD_INVALID_CHOICE"));
}

#[test]
fn agent_runtime_error_is_reported_with_stack() {
    let scenario = demos_root().join("05-runtime-error");
    let state = std::env::temp_dir().join("wtcd-cli-agent-runtime-error.json");

    let start = run_agent(&[
        "start",
        "--source",
        scenario.to_str().expect("path should be utf-8"),
        "--state-out",
        state.to_str().expect("path should be utf-8"),
    ]);
    assert!(start.status.success(), "start failed");

    let choose = run_agent(&[
        "choose",
        "--state-in",
        state.to_str().expect("path should be utf-8"),
        "--choice",
        "0",
        "--state-out",
        "/tmp/unreachable.json",
    ]);
    assert!(!choose.status.success(), "failing section should fail");
    let stdout = String::from_utf8_lossy(&choose.stdout);
    assert!(stdout.contains("ERROR_CODE:WTCD_RUNTIME"));
    assert!(stdout.contains("ERROR_LOCATION:"));
    assert!(stdout.contains("ERROR_STACK_JSON:{\"at\":"));
    assert!(stdout.contains("section \\\"burn\\\""));
}

#[test]
fn agent_start_missing_source_returns_error_envelope() {
    let output = run_agent(&[
        "start",
        "--source",
        "/path/does/not/exist",
        "--state-out",
        "/tmp/none.json",
    ]);
    assert!(!output.status.success(), "start should fail for missing source");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("RESULT:ERROR"));
    assert!(stdout.contains("ERROR_CODE:CLI_SOURCE_NOT_FOUND"));
}

#[test]
fn play_line_mode_supports_commands_and_reaches_end() {
    let bin = env!("CARGO_BIN_EXE_wtcd-cli");
    let scenario = demos_root().join("02-hall-loop");
    let state_file = std::env::temp_dir().join("wtcd-cli-play-state.json");
    let _ = std::fs::remove_file(&state_file);

    let mut child = Command::new(bin)
        .arg("play")
        .arg("--source")
        .arg(scenario.to_str().expect("path should be utf-8"))
        .arg("--state-file")
        .arg(state_file.to_str().expect("path should be utf-8"))
        .arg("--seed")
        .arg("play")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("player should spawn");

    {
        let stdin = child.stdin.as_mut().expect("stdin should be piped");
        stdin
            .write_all(b":help\n1\nnope\n0\n:save\n:restart\n:load\n1\n")
            .expect("should write commands");
    }

    let output = child.wait_with_output().expect("player should complete");
    assert!(output.status.success(), "player should exit with success");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("commands: :help :save :load :undo :restart :quit"));
    assert!(stdout.contains("Invalid choice 1."));
    assert!(stdout.contains("invalid choice index: nope"));
    assert!(stdout.contains("saved:"));
    assert!(stdout.contains("restarted"));
    assert!(stdout.contains("loaded:"));
    assert!(stdout.contains("The gate creaks open."));
    assert!(stdout.contains("[END]"));
}
