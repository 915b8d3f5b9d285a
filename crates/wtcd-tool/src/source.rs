use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{TestCase, WtcdToolError, TESTCASE_SCHEMA_V1};

pub const TESTCASE_FILE: &str = "testcase.json";

pub fn read_story_source(story_dir: &Path, entry: &str) -> Result<String, WtcdToolError> {
    let path = story_dir.join(format!("{}.wtcd", entry));
    if !path.is_file() {
        return Err(WtcdToolError::StoryNotFound {
            path: story_dir.to_path_buf(),
            entry: entry.to_string(),
        });
    }
    fs::read_to_string(&path).map_err(|source| WtcdToolError::ReadFile { path, source })
}

pub fn read_test_case(case_path: &Path) -> Result<TestCase, WtcdToolError> {
    let raw = fs::read_to_string(case_path).map_err(|source| WtcdToolError::ReadFile {
        path: case_path.to_path_buf(),
        source,
    })?;
    let parsed: TestCase =
        serde_json::from_str(&raw).map_err(|source| WtcdToolError::ParseCase {
            path: case_path.to_path_buf(),
            source,
        })?;

    if parsed.schema_version != TESTCASE_SCHEMA_V1 {
        return Err(WtcdToolError::InvalidSchemaVersion {
            expected: TESTCASE_SCHEMA_V1.to_string(),
            found: parsed.schema_version,
        });
    }

    Ok(parsed)
}

/// Directories under `root` holding a `testcase.json`, sorted by path.
pub fn find_story_dirs(root: &Path) -> Vec<PathBuf> {
    let mut dirs = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == TESTCASE_FILE)
        .filter_map(|entry| entry.path().parent().map(Path::to_path_buf))
        .collect::<Vec<_>>();
    dirs.sort();
    dirs
}
