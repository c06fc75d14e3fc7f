//! Python source parsing and the syntax-tree queries shared by the source extractors.

use super::literal;
use super::tree::TreeNode;
use crate::Result;
use camino::Utf8Path;
use ohno::{IntoAppError, bail};
use std::fs;
use tree_sitter::{Node, Parser, Tree};

const LEGACY_STATEMENTS: [&str; 2] = ["print_statement", "exec_statement"];

/// A Python source file that parsed without syntax errors.
pub struct PythonSource {
    text: String,
    tree: Tree,
}

impl core::fmt::Debug for PythonSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PythonSource")
            .field("len", &self.text.len())
            .finish_non_exhaustive()
    }
}

impl PythonSource {
    /// Parse Python source text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text contains any syntax error.
    pub fn parse(text: &str) -> Result<Self> {
        // Line endings are normalized the way Python's text mode reads files
        let text = text.replace("\r\n", "\n");

        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .into_app_err("loading the Python grammar")?;
        let tree = parser.parse(&text, None).into_app_err("the Python parser produced no syntax tree")?;

        let root = tree.root_node();
        if root.has_error() {
            let line = TreeNode::Syntax(root)
                .descendants()
                .filter_map(TreeNode::as_syntax)
                .find(|node| node.is_error() || node.is_missing())
                .map_or_else(|| line_of(root), line_of);
            bail!("syntax error near line {line}");
        }

        // Statements only Python 2 accepts
        if let Some(legacy) = TreeNode::Syntax(root)
            .descendants()
            .filter_map(TreeNode::as_syntax)
            .find(|node| LEGACY_STATEMENTS.contains(&node.kind()))
        {
            bail!("{} is not valid Python 3 near line {}", legacy.kind(), line_of(legacy));
        }

        Ok(Self { text, tree })
    }

    /// Read and parse a Python source file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read as UTF-8 or does not parse.
    pub fn read(path: &Utf8Path) -> Result<Self> {
        let text = fs::read_to_string(path).into_app_err_with(|| format!("reading '{path}'"))?;
        Self::parse(&text)
    }

    #[must_use]
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// The source text spanned by `node`.
    #[must_use]
    pub fn text(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.text.as_bytes()).unwrap_or_default()
    }
}

/// 1-based line on which `node` starts.
#[must_use]
pub fn line_of(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

/// Named children of `node`, comments excluded.
#[must_use]
pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).filter(|child| !child.is_extra()).collect()
}

/// The statements of a module, or of the body block of a class or function definition.
#[must_use]
pub fn body_statements(node: Node<'_>) -> Vec<Node<'_>> {
    if node.kind() == "module" {
        return named_children(node);
    }

    node.child_by_field_name("body").map(named_children).unwrap_or_default()
}

/// Split a `decorated_definition` into its definition and decorators; other statements pass through.
#[must_use]
pub fn unwrap_decorated(statement: Node<'_>) -> (Node<'_>, Vec<Node<'_>>) {
    if statement.kind() != "decorated_definition" {
        return (statement, Vec::new());
    }

    let decorators = named_children(statement)
        .into_iter()
        .filter(|child| child.kind() == "decorator")
        .collect();

    (statement.child_by_field_name("definition").unwrap_or(statement), decorators)
}

/// The target and value of a statement of the form `name = value`.
///
/// Chained, annotated, augmented and destructuring assignments are not single-target assignments.
#[must_use]
pub fn single_assignment(statement: Node<'_>) -> Option<(Node<'_>, Node<'_>)> {
    if statement.kind() != "expression_statement" {
        return None;
    }

    let [assignment] = named_children(statement)[..] else {
        return None;
    };

    if assignment.kind() != "assignment" || assignment.child_by_field_name("type").is_some() {
        return None;
    }

    let target = assignment.child_by_field_name("left")?;
    let value = assignment.child_by_field_name("right")?;
    (target.kind() == "identifier" && value.kind() != "assignment").then_some((target, value))
}

/// Render `a`, `a.b`, `a.b.c` references; any other expression yields `None`.
#[must_use]
pub fn dotted_name(source: &PythonSource, node: Node<'_>) -> Option<String> {
    match node.kind() {
        "identifier" => Some(source.text(node).to_string()),
        "attribute" => {
            let object = dotted_name(source, node.child_by_field_name("object")?)?;
            let attribute = source.text(node.child_by_field_name("attribute")?);
            Some(format!("{object}.{attribute}"))
        }
        _ => None,
    }
}

/// Last segment of a call's callee: `Char` for both `fields.Char(...)` and `Char(...)`.
#[must_use]
pub fn callee_name<'s>(source: &'s PythonSource, call: Node<'_>) -> Option<&'s str> {
    let function = call.child_by_field_name("function")?;
    match function.kind() {
        "identifier" => Some(source.text(function)),
        "attribute" => Some(source.text(function.child_by_field_name("attribute")?)),
        _ => None,
    }
}

/// The cleaned docstring of a class or function definition, if its body starts with one.
#[must_use]
pub fn docstring(source: &PythonSource, definition: Node<'_>) -> Option<String> {
    let first = *body_statements(definition).first()?;
    if first.kind() != "expression_statement" {
        return None;
    }

    let [expression] = named_children(first)[..] else {
        return None;
    };

    let raw = literal::string_value(source, expression)?;
    let cleaned = clean_docstring(&raw);
    (!cleaned.is_empty()).then_some(cleaned)
}

/// First `max_chars` characters of `text`.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Normalize docstring indentation: strip the first line, remove the common margin of the
/// remaining lines, and drop leading and trailing blank lines.
fn clean_docstring(raw: &str) -> String {
    let lines: Vec<String> = raw.split('\n').map(expand_tabs).collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim_start().is_empty())
        .map(|line| line.chars().count() - line.trim_start().chars().count())
        .min();

    let mut cleaned: Vec<String> = lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            if index == 0 {
                line.trim_start().to_string()
            } else {
                margin.map_or_else(|| line.clone(), |margin| line.chars().skip(margin).collect())
            }
        })
        .collect();

    while cleaned.last().is_some_and(String::is_empty) {
        let _ = cleaned.pop();
    }

    let leading_blank = cleaned.iter().take_while(|line| line.is_empty()).count();
    cleaned[leading_blank..].join("\n")
}

fn expand_tabs(line: &str) -> String {
    const TAB_SIZE: usize = 8;

    let mut expanded = String::with_capacity(line.len());
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let spaces = TAB_SIZE - column % TAB_SIZE;
            expanded.extend(core::iter::repeat_n(' ', spaces));
            column += spaces;
        } else {
            expanded.push(c);
            column += 1;
        }
    }

    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_statement(source: &PythonSource) -> Node<'_> {
        body_statements(source.root())[0]
    }

    #[test]
    fn test_parse_rejects_syntax_errors() {
        let result = PythonSource::parse("class Broken(:\n    pass\n");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("syntax error"));
    }

    #[test]
    fn test_parse_rejects_python2_statements() {
        for text in ["print 'hello'\n", "def f():\n    exec code\n", "print >>sys.stderr, 'x'\n"] {
            let result = PythonSource::parse(text);
            assert!(result.is_err(), "{text:?} should not parse");
            assert!(result.unwrap_err().to_string().contains("not valid Python 3"));
        }
    }

    #[test]
    fn test_parse_accepts_print_and_exec_calls() {
        let source = PythonSource::parse("print('hello')\nprint(1, 2, sep='')\nexec('x = 1')\n").unwrap();
        assert_eq!(body_statements(source.root()).len(), 3);
    }

    #[test]
    fn test_parse_accepts_crlf_sources() {
        let source = PythonSource::parse("x = 1\r\ny = 2\r\n").unwrap();
        assert_eq!(body_statements(source.root()).len(), 2);
    }

    #[test]
    fn test_single_assignment_forms() {
        let source = PythonSource::parse("a = 1\nb = c = 2\nd: int = 3\ne, f = 4, 5\ng += 1\nh\n").unwrap();
        let statements = body_statements(source.root());

        let (target, value) = single_assignment(statements[0]).unwrap();
        assert_eq!(source.text(target), "a");
        assert_eq!(source.text(value), "1");

        for statement in &statements[1..] {
            assert!(single_assignment(*statement).is_none(), "{}", source.text(*statement));
        }
    }

    #[test]
    fn test_unwrap_decorated() {
        let source = PythonSource::parse("@api.model\n@tools.ormcache('x')\ndef f(self):\n    pass\n").unwrap();
        let (definition, decorators) = unwrap_decorated(first_statement(&source));
        assert_eq!(definition.kind(), "function_definition");
        assert_eq!(decorators.len(), 2);
        assert_eq!(line_of(definition), 3);
    }

    #[test]
    fn test_dotted_name_and_callee() {
        let source = PythonSource::parse("x = odoo.models.Model\ny = fields.Char()\nz = Char()\nw = f()()\n").unwrap();
        let statements = body_statements(source.root());

        let (_, value) = single_assignment(statements[0]).unwrap();
        assert_eq!(dotted_name(&source, value).as_deref(), Some("odoo.models.Model"));

        let (_, value) = single_assignment(statements[1]).unwrap();
        assert_eq!(callee_name(&source, value), Some("Char"));

        let (_, value) = single_assignment(statements[2]).unwrap();
        assert_eq!(callee_name(&source, value), Some("Char"));

        let (_, value) = single_assignment(statements[3]).unwrap();
        assert_eq!(callee_name(&source, value), None);
    }

    #[test]
    fn test_docstring_is_cleaned() {
        let source = PythonSource::parse(
            "def f():\n    \"\"\"\n    Summary line.\n\n        Indented detail.\n    \"\"\"\n    return 1\n",
        )
        .unwrap();
        let doc = docstring(&source, first_statement(&source)).unwrap();
        assert_eq!(doc, "Summary line.\n\n    Indented detail.");
    }

    #[test]
    fn test_docstring_after_comment() {
        let source = PythonSource::parse("def f():\n    # comment\n    'Doc.'\n").unwrap();
        assert_eq!(docstring(&source, first_statement(&source)).as_deref(), Some("Doc."));
    }

    #[test]
    fn test_no_docstring() {
        let source = PythonSource::parse("def f():\n    x = 'not a docstring'\n\ndef g():\n    ''\n").unwrap();
        let statements = body_statements(source.root());
        assert_eq!(docstring(&source, statements[0]), None);
        assert_eq!(docstring(&source, statements[1]), None);
    }

    #[test]
    fn test_clean_docstring_tabs_and_blank_edges() {
        assert_eq!(clean_docstring("\n\n  first\n\tsecond\n\n"), "first\n      second");
        assert_eq!(clean_docstring("one line"), "one line");
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
