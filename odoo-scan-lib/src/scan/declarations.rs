//! Records describing the component classes found in a module's Python sources.

use super::python::{PythonSource, dotted_name, named_children};
use serde::{Serialize, Serializer};
use serde_json::Value;
use strum::{Display, EnumString};

/// A class that declares or extends a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDeclaration {
    pub class_name: String,
    pub file: String,
    pub line: usize,
    pub model_name: Option<String>,
    pub inherit: Vec<String>,
    pub description: Option<String>,
    pub fields: Vec<FieldDeclaration>,
    pub methods: Vec<MethodDeclaration>,
    pub is_transient: bool,

    /// Set for classes found in the wizard directory.
    #[serde(skip_serializing_if = "core::ops::Not::not")]
    pub is_wizard: bool,
}

impl ModelDeclaration {
    /// Only classes that name a model or inherit from one are reported.
    #[must_use]
    pub const fn is_component(&self) -> bool {
        self.model_name.is_some() || !self.inherit.is_empty()
    }

    #[must_use]
    pub fn inherits(&self, model: &str) -> bool {
        self.inherit.iter().any(|name| name == model)
    }
}

/// A class attribute assigned from a field constructor such as `fields.Char(...)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDeclaration {
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    pub line: usize,

    #[serde(flatten)]
    pub attributes: FieldAttributes,
}

/// The field constructors that are recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
pub enum FieldType {
    Char,
    Text,
    Integer,
    Float,
    Boolean,
    Date,
    Datetime,
    Binary,
    Html,
    Selection,
    Many2one,
    One2many,
    Many2many,
    Monetary,
}

impl FieldType {
    /// Relational fields take their target model as the first positional argument.
    #[must_use]
    pub const fn is_relational(self) -> bool {
        matches!(self, Self::Many2one | Self::One2many | Self::Many2many)
    }
}

/// Keyword arguments captured from a field constructor call.
///
/// A slot is filled only when the keyword's value is a literal constant.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comodel_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inverse_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compute: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readonly: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Value>,
}

impl FieldAttributes {
    /// The slot for a keyword argument, or `None` for keywords that are not captured.
    pub fn slot_mut(&mut self, keyword: &str) -> Option<&mut Option<Value>> {
        match keyword {
            "string" => Some(&mut self.string),
            "help" => Some(&mut self.help),
            "comodel_name" => Some(&mut self.comodel_name),
            "inverse_name" => Some(&mut self.inverse_name),
            "related" => Some(&mut self.related),
            "compute" => Some(&mut self.compute),
            "store" => Some(&mut self.store),
            "readonly" => Some(&mut self.readonly),
            "required" => Some(&mut self.required),
            _ => None,
        }
    }
}

/// A function defined directly in a class body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodDeclaration {
    pub name: String,
    pub line: usize,
    pub decorators: Vec<Decorator>,
    pub docstring: Option<String>,
    pub is_public: bool,
}

/// Methods are private when their name has a single leading underscore; dunder methods are public.
#[must_use]
pub fn is_public_name(name: &str) -> bool {
    !name.starts_with('_') || name.starts_with("__")
}

/// A decorator applied to a method, rendered as a label such as `@api.depends`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decorator {
    /// `@name`
    Name(String),

    /// `@object.attribute`, where the object may itself be dotted.
    Attribute { object: String, attribute: String },

    /// Any other decorator expression, kept as written.
    Opaque(String),
}

impl Decorator {
    /// Classify a `decorator` node. Calls and every other expression form are kept verbatim.
    #[must_use]
    pub fn from_node(source: &PythonSource, decorator: tree_sitter::Node<'_>) -> Self {
        let verbatim = || Self::Opaque(source.text(decorator).trim_start_matches('@').trim().to_string());

        let Some(&expression) = named_children(decorator).first() else {
            return verbatim();
        };

        match expression.kind() {
            "identifier" => Self::Name(source.text(expression).to_string()),
            "attribute" => {
                let object = expression.child_by_field_name("object").and_then(|object| dotted_name(source, object));
                let attribute = expression.child_by_field_name("attribute").map(|attribute| source.text(attribute));
                match (object, attribute) {
                    (Some(object), Some(attribute)) => Self::Attribute {
                        object,
                        attribute: attribute.to_string(),
                    },
                    _ => verbatim(),
                }
            }
            _ => verbatim(),
        }
    }
}

impl core::fmt::Display for Decorator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Name(name) => write!(f, "@{name}"),
            Self::Attribute { object, attribute } => write!(f, "@{object}.{attribute}"),
            Self::Opaque(text) => write!(f, "@{text}"),
        }
    }
}

impl Serialize for Decorator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
