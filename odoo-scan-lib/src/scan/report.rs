use super::declarations::ModelDeclaration;
use super::markup::MarkupFileReport;
use super::security::SecurityInfo;
use super::structure::DirectoryStructure;
use super::test_suite::TestInfo;
use serde::Serialize;
use serde_json::{Map, Value};

const CONFIG_SETTINGS_MODEL: &str = "res.config.settings";

/// The result of analyzing a module path: either a full report or a single error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Invalid(InvalidModule),
    Report(Box<ModuleReport>),
}

/// Why a path could not be analyzed at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidModule {
    pub error: String,
}

/// Everything extracted from one module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleReport {
    pub module_path: String,
    pub module_name: String,
    pub manifest: Map<String, Value>,
    pub structure: DirectoryStructure,
    pub models: Vec<ModelDeclaration>,
    pub wizards: Vec<ModelDeclaration>,
    pub views: Vec<MarkupFileReport>,
    pub data: Vec<MarkupFileReport>,
    pub security: SecurityInfo,
    pub tests: TestInfo,
    pub summary: SummaryCounters,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryCounters {
    pub total_models: usize,
    pub total_wizards: usize,
    pub total_fields: usize,
    pub total_methods: usize,
    pub total_views: usize,
    pub total_menus: usize,
    pub total_crons: usize,
    pub total_tests: usize,
    pub has_config_settings: bool,
}

impl SummaryCounters {
    /// Fields and methods are counted over models only; menus over view files and crons over data files.
    #[must_use]
    pub fn compute(
        models: &[ModelDeclaration],
        wizards: &[ModelDeclaration],
        views: &[MarkupFileReport],
        data: &[MarkupFileReport],
        tests: &TestInfo,
    ) -> Self {
        Self {
            total_models: models.len(),
            total_wizards: wizards.len(),
            total_fields: models.iter().map(|model| model.fields.len()).sum(),
            total_methods: models.iter().map(|model| model.methods.len()).sum(),
            total_views: views.iter().map(|file| file.views().len()).sum(),
            total_menus: views.iter().map(|file| file.menus().len()).sum(),
            total_crons: data.iter().map(|file| file.crons().len()).sum(),
            total_tests: tests.test_methods.len(),
            has_config_settings: models.iter().any(|model| model.inherits(CONFIG_SETTINGS_MODEL)),
        }
    }
}
