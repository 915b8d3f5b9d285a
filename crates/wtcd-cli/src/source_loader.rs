use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use wtcd_core::WtcdError;

use crate::{map_cli_source_path, map_cli_source_read, LoadedStory};

const STORY_REF_PREFIX: &str = "wtcd-file:";
const STORY_EXTENSION: &str = "wtcd";

/// Loads a story from a `.wtcd` file, or from `<entry>.wtcd` somewhere under a directory.
pub(crate) fn load_story_by_source(
    source: &str,
    entry: Option<&str>,
) -> Result<LoadedStory, WtcdError> {
    let path = resolve_source_path(source)?;
    let file = if path.is_dir() {
        find_entry_file(&path, entry.unwrap_or("main"))?
    } else {
        path
    };
    load_story_file(&file)
}

pub(crate) fn load_story_by_ref(story_ref: &str) -> Result<LoadedStory, WtcdError> {
    let Some(raw) = story_ref.strip_prefix(STORY_REF_PREFIX) else {
        return Err(WtcdError::new(
            "CLI_SOURCE_REF_INVALID",
            format!("Unsupported story ref: {}", story_ref),
        ));
    };
    load_story_file(Path::new(raw))
}

pub(crate) fn resolve_source_path(source: &str) -> Result<PathBuf, WtcdError> {
    let path = PathBuf::from(source);
    let absolute = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .map_err(map_cli_source_path)?
            .join(path)
    };

    if !absolute.exists() {
        return Err(WtcdError::new(
            "CLI_SOURCE_NOT_FOUND",
            format!("source does not exist: {}", absolute.display()),
        ));
    }

    Ok(absolute)
}

pub(crate) fn find_entry_file(root: &Path, entry: &str) -> Result<PathBuf, WtcdError> {
    let file_name = format!("{}.{}", entry, STORY_EXTENSION);
    let mut candidates = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|item| item.file_type().is_file())
        .map(|item| item.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == STORY_EXTENSION))
        .collect::<Vec<_>>();

    if candidates.is_empty() {
        return Err(WtcdError::new(
            "CLI_SOURCE_EMPTY",
            format!("No .{} files under {}", STORY_EXTENSION, root.display()),
        ));
    }

    candidates.sort_by_key(|path| path.components().count());
    candidates
        .into_iter()
        .find(|path| path.file_name().is_some_and(|name| name == file_name.as_str()))
        .ok_or_else(|| {
            WtcdError::new(
                "CLI_SOURCE_ENTRY_NOT_FOUND",
                format!("Entry {} not found under {}", file_name, root.display()),
            )
        })
}

fn load_story_file(path: &Path) -> Result<LoadedStory, WtcdError> {
    if !path.is_file() {
        return Err(WtcdError::new(
            "CLI_SOURCE_NOT_FOUND",
            format!("story file does not exist: {}", path.display()),
        ));
    }
    let source = fs::read_to_string(path).map_err(map_cli_source_read)?;
    let title = path
        .file_stem()
        .and_then(|name| name.to_str())
        .unwrap_or("unknown")
        .to_string();
    Ok(LoadedStory {
        id: make_story_id(path),
        title,
        source,
    })
}

pub(crate) fn make_story_id(path: &Path) -> String {
    format!("{}{}", STORY_REF_PREFIX, path.display())
}
