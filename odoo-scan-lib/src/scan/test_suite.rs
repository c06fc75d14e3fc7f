use super::listing;
use super::python::{PythonSource, body_statements, docstring, truncate_chars, unwrap_decorated};
use super::unit_result::{Unit, parse_each};
use camino::Utf8Path;
use serde::Serialize;
use tree_sitter::Node;

const TEST_METHOD_PREFIX: &str = "test_";
const TEST_DOCSTRING_LIMIT: usize = 100;

/// The test files, classes and methods of a module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TestInfo {
    pub test_files: Vec<String>,
    pub test_classes: Vec<TestClass>,
    pub test_methods: Vec<TestMethod>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestClass {
    pub name: String,
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestMethod {
    pub name: String,

    #[serde(rename = "class")]
    pub class_name: String,

    pub docstring: Option<String>,
}

/// Scan the Python files in `dir` whose name starts with `prefix`.
///
/// Every matching file is listed, even one that fails to parse.
#[must_use]
pub fn extract_tests(dir: &Utf8Path, prefix: &str) -> TestInfo {
    let paths = listing::files_ending_with(dir, ".py")
        .into_iter()
        .filter(|path| path.file_name().is_some_and(|name| name.starts_with(prefix)));

    let mut info = TestInfo::default();
    for Unit { file_name, result } in parse_each(paths, PythonSource::read) {
        if let Some(source) = result.into_parsed() {
            collect_tests(&source, &file_name, &mut info);
        }

        info.test_files.push(file_name);
    }

    info
}

fn collect_tests(source: &PythonSource, file_name: &str, info: &mut TestInfo) {
    for statement in body_statements(source.root()) {
        let (class, _) = unwrap_decorated(statement);
        if class.kind() != "class_definition" {
            continue;
        }

        let class_name = name_of(source, class);
        info.test_classes.push(TestClass {
            name: class_name.to_string(),
            file: file_name.to_string(),
        });

        for member in body_statements(class) {
            let (method, _) = unwrap_decorated(member);
            if method.kind() != "function_definition" {
                continue;
            }

            let name = name_of(source, method);
            if name.starts_with(TEST_METHOD_PREFIX) {
                info.test_methods.push(TestMethod {
                    name: name.to_string(),
                    class_name: class_name.to_string(),
                    docstring: docstring(source, method).map(|doc| truncate_chars(&doc, TEST_DOCSTRING_LIMIT)),
                });
            }
        }
    }
}

fn name_of<'s>(source: &'s PythonSource, definition: Node<'_>) -> &'s str {
    definition.child_by_field_name("name").map(|name| source.text(name)).unwrap_or_default()
}
