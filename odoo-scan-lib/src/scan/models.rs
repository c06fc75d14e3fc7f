use super::declarations::{Decorator, FieldAttributes, FieldDeclaration, FieldType, MethodDeclaration, ModelDeclaration, is_public_name};
use super::listing;
use super::literal;
use super::python::{
    PythonSource, body_statements, callee_name, docstring, dotted_name, line_of, named_children, single_assignment, truncate_chars,
    unwrap_decorated,
};
use super::tree::TreeNode;
use super::unit_result::{Unit, parse_each};
use camino::Utf8Path;
use core::str::FromStr;
use serde_json::Value;
use tree_sitter::Node;

const PACKAGE_INIT_FILE: &str = "__init__.py";
const METHOD_DOCSTRING_LIMIT: usize = 200;

/// Extract the model declarations of every Python file directly inside `dir`.
///
/// Files are visited in name order and classes in source order. A file that cannot be read or
/// parsed contributes nothing. When `wizard` is set every declaration is flagged as a wizard.
#[must_use]
pub fn extract_declarations(dir: &Utf8Path, wizard: bool) -> Vec<ModelDeclaration> {
    let paths = listing::files_ending_with(dir, ".py")
        .into_iter()
        .filter(|path| path.file_name() != Some(PACKAGE_INIT_FILE));

    parse_each(paths, PythonSource::read)
        .into_iter()
        .flat_map(|Unit { file_name, result }| {
            result
                .into_parsed()
                .map(|source| declarations_in(&source, &file_name, wizard))
                .unwrap_or_default()
        })
        .collect()
}

fn declarations_in(source: &PythonSource, file_name: &str, wizard: bool) -> Vec<ModelDeclaration> {
    TreeNode::Syntax(source.root())
        .find_all("class_definition")
        .filter_map(TreeNode::as_syntax)
        .map(|class| declaration_of(source, class, file_name, wizard))
        .filter(ModelDeclaration::is_component)
        .collect()
}

fn declaration_of(source: &PythonSource, class: Node<'_>, file_name: &str, wizard: bool) -> ModelDeclaration {
    let mut declaration = ModelDeclaration {
        class_name: class.child_by_field_name("name").map(|name| source.text(name)).unwrap_or_default().to_string(),
        file: file_name.to_string(),
        line: line_of(class),
        model_name: None,
        inherit: Vec::new(),
        description: None,
        fields: Vec::new(),
        methods: Vec::new(),
        is_transient: is_transient(source, class),
        is_wizard: wizard,
    };

    for statement in body_statements(class) {
        let (definition, decorators) = unwrap_decorated(statement);
        if definition.kind() == "function_definition" {
            declaration.methods.push(method_of(source, definition, &decorators));
            continue;
        }

        let Some((target, value)) = single_assignment(statement) else {
            continue;
        };

        let name = source.text(target);
        match name {
            "_name" => declaration.model_name = literal::string_value(source, value).or(declaration.model_name),
            "_description" => declaration.description = literal::string_value(source, value).or(declaration.description),
            "_inherit" => {
                if let Some(inherit) = inherited_models(source, value) {
                    declaration.inherit = inherit;
                }
            }
            _ => {}
        }

        if let Some(field) = field_of(source, name, statement, value) {
            declaration.fields.push(field);
        }
    }

    declaration
}

fn is_transient(source: &PythonSource, class: Node<'_>) -> bool {
    class
        .child_by_field_name("superclasses")
        .map(named_children)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|base| dotted_name(source, base))
        .any(|base| base.contains("TransientModel"))
}

/// `_inherit = 'a'` or `_inherit = ['a', 'b']`; other forms leave the declaration unchanged.
fn inherited_models(source: &PythonSource, value: Node<'_>) -> Option<Vec<String>> {
    if let Some(single) = literal::string_value(source, value) {
        return Some(vec![single]);
    }

    (value.kind() == "list").then(|| {
        named_children(value)
            .into_iter()
            .filter_map(|element| literal::string_value(source, element))
            .collect()
    })
}

fn field_of(source: &PythonSource, name: &str, statement: Node<'_>, value: Node<'_>) -> Option<FieldDeclaration> {
    if value.kind() != "call" {
        return None;
    }

    let field_type = FieldType::from_str(callee_name(source, value)?).ok()?;
    let mut attributes = FieldAttributes::default();
    let mut first_positional = None;

    for argument in value.child_by_field_name("arguments").map(named_children).unwrap_or_default() {
        match argument.kind() {
            "keyword_argument" => {
                let (Some(keyword), Some(keyword_value)) = (argument.child_by_field_name("name"), argument.child_by_field_name("value"))
                else {
                    continue;
                };

                if let Some(slot) = attributes.slot_mut(source.text(keyword))
                    && let Some(constant) = literal::constant(source, keyword_value)
                {
                    *slot = Some(constant);
                }
            }
            "dictionary_splat" => {}
            _ => {
                if first_positional.is_none() {
                    first_positional = Some(argument);
                }
            }
        }
    }

    if field_type.is_relational() && attributes.comodel_name.is_none() {
        attributes.comodel_name = first_positional
            .and_then(|argument| literal::string_value(source, argument))
            .map(Value::String);
    }

    Some(FieldDeclaration {
        name: name.to_string(),
        field_type,
        line: line_of(statement),
        attributes,
    })
}

fn method_of(source: &PythonSource, definition: Node<'_>, decorators: &[Node<'_>]) -> MethodDeclaration {
    let name = definition.child_by_field_name("name").map(|name| source.text(name)).unwrap_or_default();

    MethodDeclaration {
        name: name.to_string(),
        line: line_of(definition),
        decorators: decorators.iter().map(|&decorator| Decorator::from_node(source, decorator)).collect(),
        docstring: docstring(source, definition).map(|doc| truncate_chars(&doc, METHOD_DOCSTRING_LIMIT)),
        is_public: is_public_name(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use serde_json::json;
    use std::fs;

    fn declarations(code: &str) -> Vec<ModelDeclaration> {
        let source = PythonSource::parse(code).unwrap();
        declarations_in(&source, "sample.py", false)
    }

    #[test]
    fn test_model_with_fields_and_methods() {
        let models = declarations(
            r#"from odoo import api, fields, models


class LibraryBook(models.Model):
    """A book."""

    _name = 'library.book'
    _description = 'Library Book'

    title = fields.Char(string="Title", required=True)
    pages = fields.Integer(help='Page count', default=0)
    author_id = fields.Many2one('res.partner', ondelete='cascade')
    total = fields.Float(compute='_compute_total', store=True, readonly=flag)

    @api.depends('pages')
    def _compute_total(self):
        """Compute the total.

        Longer explanation.
        """
        pass

    async def action_open(self):
        return True
"#,
        );

        assert_eq!(models.len(), 1);
        let book = &models[0];
        assert_eq!(book.class_name, "LibraryBook");
        assert_eq!(book.file, "sample.py");
        assert_eq!(book.line, 4);
        assert_eq!(book.model_name.as_deref(), Some("library.book"));
        assert_eq!(book.description.as_deref(), Some("Library Book"));
        assert!(!book.is_transient);

        let fields = serde_json::to_value(&book.fields).unwrap();
        assert_eq!(
            fields,
            json!([
                {"name": "title", "type": "Char", "line": 10, "string": "Title", "required": true},
                {"name": "pages", "type": "Integer", "line": 11, "help": "Page count"},
                {"name": "author_id", "type": "Many2one", "line": 12, "comodel_name": "res.partner"},
                {"name": "total", "type": "Float", "line": 13, "compute": "_compute_total", "store": true},
            ])
        );

        let methods = serde_json::to_value(&book.methods).unwrap();
        assert_eq!(
            methods,
            json!([
                {
                    "name": "_compute_total",
                    "line": 16,
                    "decorators": ["@api.depends('pages')"],
                    "docstring": "Compute the total.\n\nLonger explanation.",
                    "is_public": false,
                },
                {"name": "action_open", "line": 23, "decorators": [], "docstring": null, "is_public": true},
            ])
        );
    }

    #[test]
    fn test_plain_classes_are_excluded() {
        let models = declarations("class Helper:\n    x = 1\n\nclass Named(models.Model):\n    _name = 'a.b'\n");
        let names: Vec<_> = models.iter().map(|m| m.class_name.as_str()).collect();
        assert_eq!(names, vec!["Named"]);
    }

    #[test]
    fn test_inherit_forms() {
        let models = declarations(
            "class A(models.Model):\n    _inherit = 'res.partner'\n\nclass B(models.Model):\n    _inherit = ['mail.thread', 42, 'mail.activity.mixin']\n\nclass C(models.Model):\n    _inherit = SOME_CONSTANT\n",
        );

        assert_eq!(models.len(), 2);
        assert_eq!(models[0].inherit, vec!["res.partner"]);
        assert_eq!(models[1].inherit, vec!["mail.thread", "mail.activity.mixin"]);
    }

    #[test]
    fn test_non_literal_name_is_ignored() {
        let models = declarations("class A(models.Model):\n    _name = PREFIX + '.a'\n    _inherit = 'base'\n");
        assert_eq!(models[0].model_name, None);
    }

    #[test]
    fn test_transient_detection() {
        let models = declarations(
            "class W(models.TransientModel):\n    _name = 'w'\n\nclass V(TransientModel):\n    _name = 'v'\n\nclass M(models.Model, metaclass=Meta):\n    _name = 'm'\n",
        );

        let transient: Vec<_> = models.iter().map(|m| m.is_transient).collect();
        assert_eq!(transient, vec![true, true, false]);
    }

    #[test]
    fn test_nested_classes_in_source_order() {
        let models = declarations(
            "class Outer(models.Model):\n    _name = 'outer'\n\n    class Inner(models.Model):\n        _name = 'inner'\n\nclass Last(models.Model):\n    _name = 'last'\n",
        );

        let names: Vec<_> = models.iter().map(|m| m.class_name.as_str()).collect();
        assert_eq!(names, vec!["Outer", "Inner", "Last"]);
    }

    #[test]
    fn test_field_edge_cases() {
        let models = declarations(
            r"class A(models.Model):
    _name = 'a'
    bare = Char('Bare')
    other = fields.Reference(string='x')
    chained = also = fields.Char()
    annotated: str = fields.Char()
    tags = fields.Many2many(comodel_name='x.tag', string='Tags')
    lines = fields.One2many('x.line', 'parent_id', string='Lines')
    computed = fields.Char(string=_('Translated'))
    nested = fields.Char(default=lambda self: fields.Char())
",
        );

        let fields = serde_json::to_value(&models[0].fields).unwrap();
        assert_eq!(
            fields,
            json!([
                {"name": "bare", "type": "Char", "line": 3},
                {"name": "tags", "type": "Many2many", "line": 7, "string": "Tags", "comodel_name": "x.tag"},
                {"name": "lines", "type": "One2many", "line": 8, "string": "Lines", "comodel_name": "x.line"},
                {"name": "computed", "type": "Char", "line": 9},
                {"name": "nested", "type": "Char", "line": 10},
            ])
        );
    }

    #[test]
    fn test_extract_declarations_skips_broken_and_init_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        fs::write(root.join("__init__.py"), "class I(models.Model):\n    _name = 'init'\n").unwrap();
        fs::write(root.join("b.py"), "class B(models.TransientModel):\n    _name = 'b'\n").unwrap();
        fs::write(root.join("a.py"), "class A(models.TransientModel):\n    _name = 'a'\n").unwrap();
        fs::write(root.join("broken.py"), "class Broken(models.Model:\n").unwrap();

        let wizards = extract_declarations(&root, true);
        let names: Vec<_> = wizards.iter().map(|m| (m.file.as_str(), m.class_name.as_str(), m.is_wizard)).collect();
        assert_eq!(names, vec![("a.py", "A", true), ("b.py", "B", true)]);
    }
}
