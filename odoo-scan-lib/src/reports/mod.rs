//! Report rendering for analysis outcomes
//!
//! An [`AnalysisOutcome`](crate::scan::AnalysisOutcome) is rendered as a single JSON document,
//! either compact or indented by two spaces. Object keys appear in declaration order, and the
//! manifest and access-rule mappings keep the order found in the module's files.

mod json;

pub use json::generate as generate_json;
