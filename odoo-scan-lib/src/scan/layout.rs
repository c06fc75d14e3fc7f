use crate::Result;
use camino::{Utf8Component, Utf8Path};
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;

/// The default layout TOML content, embedded from `default_layout.toml`
pub const DEFAULT_LAYOUT_TOML: &str = include_str!("../../default_layout.toml");

/// Where each kind of artifact lives, relative to the module root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleLayout {
    /// Directory of Python sources declaring models
    #[serde(default = "default_models_dir")]
    pub models_dir: String,

    /// Directory of Python sources declaring wizards
    #[serde(default = "default_wizard_dir")]
    pub wizard_dir: String,

    /// Directory of view markup
    #[serde(default = "default_views_dir")]
    pub views_dir: String,

    /// Directory of data markup
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Directory holding the access file and security markup
    #[serde(default = "default_security_dir")]
    pub security_dir: String,

    /// Name of the access file inside the security directory
    #[serde(default = "default_access_file")]
    pub access_file: String,

    /// Directory of test sources
    #[serde(default = "default_tests_dir")]
    pub tests_dir: String,

    /// Only test files whose name starts with this prefix are scanned
    #[serde(default = "default_test_prefix")]
    pub test_prefix: String,
}

fn default_models_dir() -> String {
    "models".to_string()
}

fn default_wizard_dir() -> String {
    "wizard".to_string()
}

fn default_views_dir() -> String {
    "views".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_security_dir() -> String {
    "security".to_string()
}

fn default_access_file() -> String {
    "ir.model.access.csv".to_string()
}

fn default_tests_dir() -> String {
    "tests".to_string()
}

fn default_test_prefix() -> String {
    "test_".to_string()
}

impl ModuleLayout {
    /// Load a layout from a file, or use the defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or names an invalid location
    pub fn load(layout_path: Option<&Utf8Path>) -> Result<Self> {
        let Some(path) = layout_path else {
            return Ok(Self::default());
        };

        let text = fs::read_to_string(path).into_app_err_with(|| format!("reading layout file '{path}'"))?;
        let layout: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing layout file '{path}'"))?;
        layout.validate()?;

        Ok(layout)
    }

    /// Every location must be a non-empty relative path that stays inside the module.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending entry
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("models_dir", &self.models_dir),
            ("wizard_dir", &self.wizard_dir),
            ("views_dir", &self.views_dir),
            ("data_dir", &self.data_dir),
            ("security_dir", &self.security_dir),
            ("access_file", &self.access_file),
            ("tests_dir", &self.tests_dir),
        ] {
            let path = Utf8Path::new(value);
            if value.trim().is_empty() {
                return Err(app_err!("{key} must not be empty"));
            }

            if path.is_absolute() || path.components().any(|c| !matches!(c, Utf8Component::Normal(_) | Utf8Component::CurDir)) {
                return Err(app_err!("{key} must be a relative path inside the module, got '{value}'"));
            }
        }

        if self.test_prefix.contains(['/', '\\']) {
            return Err(app_err!("test_prefix must be a file name prefix, got '{}'", self.test_prefix));
        }

        Ok(())
    }
}

impl Default for ModuleLayout {
    fn default() -> Self {
        toml::from_str(DEFAULT_LAYOUT_TOML).expect("default_layout.toml should be valid TOML that deserializes to ModuleLayout")
    }
}
