use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use wtcd_api::{create_interpreter, CreateInterpreterOptions};
use wtcd_runtime::Interpreter;

use crate::{load_story_by_source, LoadedStory};

pub(crate) const SIMPLE_STORY: &str = "WTCD 1.3
section hall {
  readerSetStateDesc::[\"lantern lit\"]
} then selection [
  choice \"Open the door\" goto yard
  choice \"Climb the wall\" null
]
section yard then exit
---<<< hall >>>---
A dark hall.
---<<< yard >>>---
Daylight.
";

pub(crate) const COUNTER_STORY: &str = "WTCD 1.3
declare number visits = 0
section hall {
  visits += 1
} then selection [choice \"Stay\" goto hall choice \"Leave\" exit]
---<<< hall >>>---
# Hall

Visit <$ visits $>.
";

pub(crate) fn temp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time should be monotonic")
        .as_nanos();
    std::env::temp_dir().join(format!("wtcd-rs-{}-{}", name, nanos))
}

pub(crate) fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent should be created");
    }
    fs::write(path, content).expect("file should be written");
}

/// Writes `source` to a fresh `main.wtcd` and loads it.
pub(crate) fn story_file(name: &str, source: &str) -> LoadedStory {
    let path = temp_path(name).join("main.wtcd");
    write_file(&path, source);
    load_story_by_source(&path.to_string_lossy(), None).expect("story should load")
}

pub(crate) fn interpreter_for(source: &str, seed: &str) -> (Interpreter, String) {
    create_interpreter(CreateInterpreterOptions {
        source: source.to_string(),
        random_seed: Some(seed.to_string()),
        feature_provider: None,
    })
    .expect("interpreter should build")
}
