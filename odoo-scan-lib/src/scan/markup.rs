use super::listing;
use super::tree::TreeNode;
use super::unit_result::{Unit, UnitResult, parse_each};
use crate::Result;
use camino::Utf8Path;
use ohno::IntoAppError;
use roxmltree::{Document, Node, ParsingOptions};
use serde::Serialize;
use std::fs;

/// Marker reported in place of the records of a file that could not be parsed.
pub const PARSE_ERROR_MARKER: &str = "XML parse error";

const VIEW_MODEL: &str = "ir.ui.view";
const ACTION_MODEL: &str = "ir.actions.act_window";
const CRON_MODEL: &str = "ir.cron";
const UNKNOWN_INTERVAL_PART: &str = "?";
const LATIN1_LABELS: [&str; 5] = ["iso-8859-1", "iso8859-1", "iso_8859-1", "latin-1", "latin1"];

/// The outcome of scanning one markup file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MarkupFileReport {
    Parsed(MarkupRecords),
    Failed { file: String, error: String },
}

impl MarkupFileReport {
    #[must_use]
    pub fn file(&self) -> &str {
        match self {
            Self::Parsed(records) => &records.file,
            Self::Failed { file, .. } => file,
        }
    }

    #[must_use]
    pub const fn records(&self) -> Option<&MarkupRecords> {
        match self {
            Self::Parsed(records) => Some(records),
            Self::Failed { .. } => None,
        }
    }

    /// View records; empty for a file that failed to parse.
    #[must_use]
    pub fn views(&self) -> &[ViewRecord] {
        self.records().map_or(&[], |records| &records.views)
    }

    #[must_use]
    pub fn menus(&self) -> &[MenuEntry] {
        self.records().map_or(&[], |records| &records.menus)
    }

    #[must_use]
    pub fn crons(&self) -> &[CronRecord] {
        self.records().map_or(&[], |records| &records.crons)
    }
}

/// Records classified from one markup file.
///
/// Every `record` element lands in exactly one of `records`, `actions`, `views` or `crons`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarkupRecords {
    pub file: String,
    pub records: Vec<RecordRef>,
    pub menus: Vec<MenuEntry>,
    pub actions: Vec<ActionRecord>,
    pub views: Vec<ViewRecord>,
    pub crons: Vec<CronRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub model: Option<String>,
    pub inherits: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub res_model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CronRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub code: Option<String>,

    /// `"<interval_number> <interval_type>"`, with `?` standing in for a missing part.
    pub interval: String,
}

/// A record of any other model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordRef {
    pub id: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub id: Option<String>,
    pub name: Option<String>,
    pub parent: Option<String>,
    pub action: Option<String>,
    pub sequence: Option<String>,
    pub groups: Option<String>,
}

/// Scan every `*.xml` file directly inside `dir`, in file-name order.
#[must_use]
pub fn extract_markup(dir: &Utf8Path) -> Vec<MarkupFileReport> {
    parse_each(listing::files_ending_with(dir, ".xml"), |path| with_document(path, classify))
        .into_iter()
        .map(|Unit { file_name, result }| match result {
            UnitResult::Parsed(mut records) => {
                records.file = file_name;
                MarkupFileReport::Parsed(records)
            }
            UnitResult::Failed(_) => MarkupFileReport::Failed {
                file: file_name,
                error: PARSE_ERROR_MARKER.to_string(),
            },
        })
        .collect()
}

/// Read and parse a markup file, then hand the document to `extract`.
///
/// # Errors
///
/// Returns an error if the file cannot be read and decoded or is not well-formed.
pub fn with_document<T>(path: &Utf8Path, extract: impl FnOnce(&Document<'_>) -> T) -> Result<T> {
    let bytes = fs::read(path).into_app_err_with(|| format!("reading '{path}'"))?;
    let text = decode(path, bytes)?;
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };

    let document = Document::parse_with_options(&text, options).into_app_err_with(|| format!("parsing '{path}'"))?;
    Ok(extract(&document))
}

/// UTF-8 text, or ISO-8859-1 when the XML declaration names it.
fn decode(path: &Utf8Path, bytes: Vec<u8>) -> Result<String> {
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) if declared_encoding(e.as_bytes()).is_some_and(|label| LATIN1_LABELS.contains(&label.as_str())) => {
            Ok(e.as_bytes().iter().copied().map(char::from).collect())
        }
        Err(e) => Err(e).into_app_err_with(|| format!("'{path}' is neither UTF-8 nor declared as ISO-8859-1")),
    }
}

/// The lowercased `encoding` pseudo-attribute of a leading `<?xml ...?>` declaration.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let declaration = bytes.strip_prefix(b"<?xml")?;
    let end = declaration.windows(2).position(|pair| pair == b"?>")?;
    let declaration = String::from_utf8_lossy(declaration.get(..end)?).to_ascii_lowercase();

    let (_, rest) = declaration.split_once("encoding")?;
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| matches!(c, '"' | '\''))?;
    let (label, _) = rest.get(1..)?.split_once(quote)?;
    Some(label.to_string())
}

/// All `record` elements of the document, at any depth, in document order.
pub fn record_elements<'a>(document: &'a Document<'a>) -> impl Iterator<Item = Node<'a, 'a>> {
    TreeNode::Markup(document.root_element())
        .find_all("record")
        .filter_map(TreeNode::as_markup)
}

fn classify(document: &Document<'_>) -> MarkupRecords {
    let mut records = MarkupRecords::default();

    for record in record_elements(document) {
        let id = attribute(record, "id");
        match record.attribute("model") {
            Some(VIEW_MODEL) => records.views.push(ViewRecord {
                id,
                name: field_text(record, "name"),
                model: field_text(record, "model"),
                inherits: field(record, "inherit_id").and_then(|inherit| attribute(inherit, "ref")),
            }),
            Some(ACTION_MODEL) => records.actions.push(ActionRecord {
                id,
                name: field_text(record, "name"),
                res_model: field_text(record, "res_model"),
            }),
            Some(CRON_MODEL) => {
                let number = field_text(record, "interval_number");
                let unit = field_text(record, "interval_type");
                records.crons.push(CronRecord {
                    id,
                    name: field_text(record, "name"),
                    code: field_text(record, "code"),
                    interval: format!(
                        "{} {}",
                        number.as_deref().unwrap_or(UNKNOWN_INTERVAL_PART),
                        unit.as_deref().unwrap_or(UNKNOWN_INTERVAL_PART)
                    ),
                });
            }
            model => records.records.push(RecordRef {
                id,
                model: model.map(str::to_string),
            }),
        }
    }

    records.menus = TreeNode::Markup(document.root_element())
        .find_all("menuitem")
        .filter_map(TreeNode::as_markup)
        .map(|menu| MenuEntry {
            id: attribute(menu, "id"),
            name: attribute(menu, "name"),
            parent: attribute(menu, "parent"),
            action: attribute(menu, "action"),
            sequence: attribute(menu, "sequence"),
            groups: attribute(menu, "groups"),
        })
        .collect();

    records
}

fn attribute(node: Node<'_, '_>, name: &str) -> Option<String> {
    node.attribute(name).map(str::to_string)
}

/// The first descendant `<field name="...">` of a record.
fn field<'a>(record: Node<'a, 'a>, name: &str) -> Option<Node<'a, 'a>> {
    TreeNode::Markup(record)
        .find_all("field")
        .filter_map(TreeNode::as_markup)
        .find(|field| field.attribute("name") == Some(name))
}

fn field_text<'a>(record: Node<'a, 'a>, name: &str) -> Option<String> {
    field(record, name).and_then(|field| field.text()).map(str::to_string)
}
