use std::path::PathBuf;

use wtcd_tool::{assert_case, find_story_dirs, read_test_case, run_case, ExpectedEvent};

fn demos_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("demos")
}

#[test]
fn every_demo_matches_its_testcase() {
    let directories = find_story_dirs(&demos_root());
    assert!(!directories.is_empty(), "expected demo stories");

    for directory in directories {
        if let Err(error) = assert_case(&directory, &directory.join("testcase.json")) {
            panic!("demo {} failed: {error}", directory.display());
        }
    }
}

#[test]
fn runtime_error_demo_stops_after_the_failing_choice() {
    let directory = demos_root().join("05-runtime-error");
    let case = read_test_case(&directory.join("testcase.json")).expect("testcase should load");
    let report = run_case(&directory, &case).expect("case should run");

    assert_eq!(report.consumed_actions, 1);
    assert_eq!(report.steps, 2);
    assert!(matches!(
        report.observed_events.last(),
        Some(ExpectedEvent::Error { code, .. }) if code == "WTCD_RUNTIME"
    ));
}
