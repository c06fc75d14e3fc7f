use super::layout::ModuleLayout;
use super::manifest::{MANIFEST_FILE, load_manifest};
use super::markup::extract_markup;
use super::models::extract_declarations;
use super::report::{AnalysisOutcome, InvalidModule, ModuleReport, SummaryCounters};
use super::security::load_security;
use super::structure::inspect_structure;
use super::test_suite::extract_tests;
use camino::Utf8Path;

const LOG_TARGET: &str = "  analyzer";

/// Analyze the module at `module_path` using the default layout.
#[must_use]
pub fn analyze_module(module_path: impl AsRef<Utf8Path>) -> AnalysisOutcome {
    analyze_module_with(module_path, &ModuleLayout::default())
}

/// Analyze the module at `module_path`.
///
/// A missing path or a directory without a manifest yields [`AnalysisOutcome::Invalid`]; every
/// other problem is absorbed by the individual extractors, so a report is always produced for
/// a valid module.
#[must_use]
pub fn analyze_module_with(module_path: impl AsRef<Utf8Path>, layout: &ModuleLayout) -> AnalysisOutcome {
    let given = module_path.as_ref();
    let root = given.canonicalize_utf8().unwrap_or_else(|_| given.to_path_buf());

    if !root.exists() {
        return invalid(format!("Module path does not exist: {given}"));
    }

    if !root.join(MANIFEST_FILE).exists() {
        return invalid(format!("Not a valid Odoo module (missing {MANIFEST_FILE}): {given}"));
    }

    log::info!(target: LOG_TARGET, "Analyzing module at '{root}'");

    let models = extract_declarations(&root.join(&layout.models_dir), false);
    let wizards = extract_declarations(&root.join(&layout.wizard_dir), true);
    let views = extract_markup(&root.join(&layout.views_dir));
    let data = extract_markup(&root.join(&layout.data_dir));
    let tests = extract_tests(&root.join(&layout.tests_dir), &layout.test_prefix);
    let summary = SummaryCounters::compute(&models, &wizards, &views, &data, &tests);

    log::info!(
        target: LOG_TARGET,
        "Found {} models, {} wizards, {} views and {} tests",
        summary.total_models,
        summary.total_wizards,
        summary.total_views,
        summary.total_tests
    );

    AnalysisOutcome::Report(Box::new(ModuleReport {
        module_path: root.to_string(),
        module_name: root.file_name().unwrap_or_default().to_string(),
        manifest: load_manifest(&root),
        structure: inspect_structure(&root),
        models,
        wizards,
        views,
        data,
        security: load_security(&root.join(&layout.security_dir), &layout.access_file),
        tests,
        summary,
    }))
}

fn invalid(error: String) -> AnalysisOutcome {
    log::warn!(target: LOG_TARGET, "{error}");
    AnalysisOutcome::Invalid(InvalidModule { error })
}
