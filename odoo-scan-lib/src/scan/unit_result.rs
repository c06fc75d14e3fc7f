use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};

const LOG_TARGET: &str = "     units";

/// Outcome of reading and parsing one input file.
///
/// Extractors fold these into their output: a failed unit is skipped or marked, never fatal to the run.
#[derive(Debug)]
pub enum UnitResult<T> {
    /// The file was read and parsed.
    Parsed(T),

    /// The file could not be read or parsed.
    Failed(ohno::AppError),
}

impl<T> UnitResult<T> {
    /// The parsed data, or `None` for a failed unit.
    #[must_use]
    pub fn into_parsed(self) -> Option<T> {
        match self {
            Self::Parsed(data) => Some(data),
            Self::Failed(_) => None,
        }
    }
}

impl<T> From<Result<T>> for UnitResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::Parsed(data),
            Err(e) => Self::Failed(e),
        }
    }
}

/// A parsed (or failed) file together with its name.
#[derive(Debug)]
pub struct Unit<T> {
    pub file_name: String,
    pub result: UnitResult<T>,
}

/// Run `parse` over every path, in order, isolating each file's failure.
pub fn parse_each<T>(paths: impl IntoIterator<Item = Utf8PathBuf>, parse: impl Fn(&Utf8Path) -> Result<T>) -> Vec<Unit<T>> {
    paths
        .into_iter()
        .map(|path| {
            let result = UnitResult::from(parse(&path));
            if let UnitResult::Failed(e) = &result {
                log::warn!(target: LOG_TARGET, "Could not parse '{path}': {e:#}");
            } else {
                log::debug!(target: LOG_TARGET, "Parsed '{path}'");
            }

            Unit {
                file_name: path.file_name().unwrap_or_default().to_string(),
                result,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ohno::app_err;

    #[test]
    fn test_into_parsed_for_parsed_variant() {
        let result: UnitResult<String> = UnitResult::Parsed("data".to_string());
        assert_eq!(result.into_parsed(), Some("data".to_string()));
    }

    #[test]
    fn test_into_parsed_for_failed_variant() {
        let result: UnitResult<String> = UnitResult::Failed(app_err!("broken"));
        assert_eq!(result.into_parsed(), None);
    }

    #[test]
    fn test_from_result() {
        let ok: UnitResult<u32> = Ok(7).into();
        assert_eq!(ok.into_parsed(), Some(7));

        let err: UnitResult<u32> = Err(app_err!("nope")).into();
        assert!(matches!(err, UnitResult::Failed(_)));
    }

    #[test]
    fn test_parse_each_isolates_failures() {
        let paths = vec![
            Utf8PathBuf::from("dir/a.xml"),
            Utf8PathBuf::from("dir/bad.xml"),
            Utf8PathBuf::from("dir/c.xml"),
        ];

        let units = parse_each(paths, |path| {
            if path.as_str().contains("bad") {
                Err(app_err!("malformed"))
            } else {
                Ok(path.as_str().len())
            }
        });

        let names: Vec<_> = units.iter().map(|unit| unit.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.xml", "bad.xml", "c.xml"]);
        let parsed: Vec<_> = units.into_iter().map(|unit| unit.result.into_parsed()).collect();
        assert_eq!(parsed, vec![Some(9), None, Some(9)]);
    }
}
