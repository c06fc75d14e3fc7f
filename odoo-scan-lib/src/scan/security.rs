use super::listing;
use super::markup::{record_elements, with_document};
use super::unit_result::parse_each;
use camino::Utf8Path;
use csv::ReaderBuilder;
use serde::Serialize;
use serde_json::{Map, Value};

const LOG_TARGET: &str = "  security";

const SECURITY_RECORD_MODELS: [&str; 2] = ["ir.rule", "res.groups"];

/// Access rules and security records declared by a module.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SecurityInfo {
    /// One entry per data row of the access file, keyed by the header columns in header order.
    pub access_rules: Vec<Map<String, Value>>,

    /// Record rules and groups declared in the security markup.
    pub groups: Vec<SecurityRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityRecord {
    pub id: Option<String>,
    pub model: String,
}

/// Load the access rules in `dir/access_file` and the security records of the markup files in `dir`.
#[must_use]
pub fn load_security(dir: &Utf8Path, access_file: &str) -> SecurityInfo {
    SecurityInfo {
        access_rules: load_access_rules(&dir.join(access_file)),
        groups: security_records(dir),
    }
}

fn load_access_rules(path: &Utf8Path) -> Vec<Map<String, Value>> {
    if !path.is_file() {
        return Vec::new();
    }

    let mut reader = match ReaderBuilder::new().flexible(true).from_path(path) {
        Ok(reader) => reader,
        Err(e) => {
            log::warn!(target: LOG_TARGET, "Could not open access file '{path}': {e:#}");
            return Vec::new();
        }
    };

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(e) => {
            log::warn!(target: LOG_TARGET, "Could not read the header of '{path}': {e:#}");
            return Vec::new();
        }
    };

    reader
        .records()
        .filter_map(|row| match row {
            Ok(row) => Some(
                headers
                    .iter()
                    .enumerate()
                    .map(|(index, column)| (column.to_string(), row.get(index).map_or(Value::Null, |cell| Value::String(cell.to_string()))))
                    .collect(),
            ),
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Skipping unreadable row of '{path}': {e:#}");
                None
            }
        })
        .collect()
}

fn security_records(dir: &Utf8Path) -> Vec<SecurityRecord> {
    let units = parse_each(listing::files_ending_with(dir, ".xml"), |path| {
        with_document(path, |document| {
            record_elements(document)
                .filter_map(|record| {
                    let model = record.attribute("model").filter(|model| SECURITY_RECORD_MODELS.contains(model))?;
                    Some(SecurityRecord {
                        id: record.attribute("id").map(str::to_string),
                        model: model.to_string(),
                    })
                })
                .collect::<Vec<_>>()
        })
    });

    units.into_iter().filter_map(|unit| unit.result.into_parsed()).flatten().collect()
}
