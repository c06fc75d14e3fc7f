//! Deterministic enumeration of the files an extractor consumes.

use camino::{Utf8Path, Utf8PathBuf};
use walkdir::WalkDir;

const LOG_TARGET: &str = "   listing";

/// Immediate children of `dir`, sorted by file name.
///
/// A missing or unreadable directory yields nothing. Entries whose names are not UTF-8 are skipped.
pub fn children(dir: &Utf8Path) -> Vec<Utf8PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }

    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.into_path()),
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Could not read an entry of '{dir}': {e:#}");
                None
            }
        })
        .filter_map(|path| match Utf8PathBuf::from_path_buf(path) {
            Ok(path) => Some(path),
            Err(path) => {
                log::debug!(target: LOG_TARGET, "Skipping non UTF-8 path '{}'", path.display());
                None
            }
        })
        .collect()
}

/// Regular files directly inside `dir` whose name ends with `suffix`, sorted by file name.
pub fn files_ending_with(dir: &Utf8Path, suffix: &str) -> Vec<Utf8PathBuf> {
    children(dir)
        .into_iter()
        .filter(|path| path.is_file() && path.file_name().is_some_and(|name| name.ends_with(suffix)))
        .collect()
}
