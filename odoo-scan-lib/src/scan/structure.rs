use super::listing;
use camino::Utf8Path;
use serde::Serialize;

/// Names of the immediate children of a module root, hidden entries excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectoryStructure {
    pub directories: Vec<String>,
    pub files: Vec<String>,
}

/// List `root`. Symlinks to directories count as directories; everything else, broken links
/// included, counts as a file.
#[must_use]
pub fn inspect_structure(root: &Utf8Path) -> DirectoryStructure {
    let mut structure = DirectoryStructure::default();

    for path in listing::children(root) {
        let Some(name) = path.file_name() else {
            continue;
        };

        if name.starts_with('.') {
            continue;
        }

        if path.is_dir() {
            structure.directories.push(name.to_string());
        } else {
            structure.files.push(name.to_string());
        }
    }

    structure
}
