use super::literal;
use super::python::{PythonSource, named_children};
use crate::Result;
use camino::Utf8Path;
use ohno::bail;
use serde_json::{Map, Value};

const LOG_TARGET: &str = "  manifest";

/// Name of the metadata file every module carries at its root.
pub const MANIFEST_FILE: &str = "__manifest__.py";

/// Load the module's metadata mapping.
///
/// An absent, unreadable or malformed manifest yields an empty mapping.
#[must_use]
pub fn load_manifest(module_root: &Utf8Path) -> Map<String, Value> {
    let path = module_root.join(MANIFEST_FILE);
    if !path.is_file() {
        return Map::new();
    }

    match PythonSource::read(&path).and_then(|source| evaluate_manifest(&source)) {
        Ok(manifest) => manifest,
        Err(e) => {
            log::warn!(target: LOG_TARGET, "Ignoring manifest '{path}': {e:#}");
            Map::new()
        }
    }
}

/// The manifest must be a single expression statement evaluating to a dictionary.
fn evaluate_manifest(source: &PythonSource) -> Result<Map<String, Value>> {
    let [statement] = named_children(source.root())[..] else {
        bail!("expected exactly one expression");
    };

    if statement.kind() != "expression_statement" {
        bail!("expected an expression, found {}", statement.kind());
    }

    let [expression] = named_children(statement)[..] else {
        bail!("expected exactly one expression");
    };

    match literal::evaluate(source, expression)? {
        Value::Object(map) => Ok(map),
        other => bail!("expected a dictionary, found {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use serde_json::json;
    use std::fs;

    fn module_with_manifest(text: &str) -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("temp dir should be UTF-8");
        fs::write(root.join(MANIFEST_FILE), text).unwrap();
        (dir, root)
    }

    #[test]
    fn test_loads_manifest_with_comments() {
        let (_guard, root) = module_with_manifest(
            "# -*- coding: utf-8 -*-\n{\n    'name': 'Library',\n    'version': '17.0.1.0.0',\n    # deps\n    'depends': ['base'],\n    'application': True,\n}\n",
        );

        let manifest = load_manifest(&root);
        assert_eq!(
            Value::Object(manifest),
            json!({"name": "Library", "version": "17.0.1.0.0", "depends": ["base"], "application": true})
        );
    }

    #[test]
    fn test_missing_manifest_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        assert!(load_manifest(&root).is_empty());
    }

    #[test]
    fn test_malformed_manifests_are_empty() {
        for text in [
            "{'name': 'x'",
            "{'name': compute()}",
            "['not', 'a', 'dict']",
            "x = {'name': 'x'}",
            "{'a': 1}\n{'b': 2}\n",
            "",
        ] {
            let (_guard, root) = module_with_manifest(text);
            assert!(load_manifest(&root).is_empty(), "{text:?} should yield an empty manifest");
        }
    }
}
