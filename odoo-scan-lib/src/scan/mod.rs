//! Static extraction of an Odoo module's shape
//!
//! This module reads the artifacts of a module directory without executing any of them and
//! assembles a [`ModuleReport`] describing what the module declares.
//!
//! # Implementation Model
//!
//! Independent extractors each handle one kind of artifact:
//! - **Manifest**: `__manifest__.py`, evaluated as a restricted Python literal
//! - **Declarations**: model and wizard classes, their fields and methods, from Python syntax trees
//! - **Markup**: view and data XML files, classified into views, actions, scheduled jobs,
//!   generic records and menu entries
//! - **Security**: the access-rule CSV file and security records in XML
//! - **Tests**: test classes and test methods
//! - **Structure**: the immediate children of the module root
//!
//! Every input file is parsed on its own into a [`UnitResult`], so a malformed file is logged
//! and skipped (or marked, for markup) without affecting its siblings. Python sources are parsed
//! with tree-sitter and markup with roxmltree; both trees are searched through the same
//! pre-order [`TreeNode`] traversal.
//!
//! The analyzer validates the module root, runs the extractors in a fixed order over
//! name-sorted directory listings, and computes the [`SummaryCounters`]. Directory locations come
//! from a [`ModuleLayout`], which defaults to the standard Odoo layout.

mod analyzer;
mod declarations;
mod layout;
mod listing;
mod literal;
mod manifest;
mod markup;
mod models;
mod python;
mod report;
mod security;
mod structure;
mod test_suite;
mod tree;
mod unit_result;

pub use analyzer::{analyze_module, analyze_module_with};
pub use declarations::{Decorator, FieldAttributes, FieldDeclaration, FieldType, MethodDeclaration, ModelDeclaration};
pub use layout::{DEFAULT_LAYOUT_TOML, ModuleLayout};
pub use manifest::{MANIFEST_FILE, load_manifest};
pub use markup::{ActionRecord, CronRecord, MarkupFileReport, MarkupRecords, MenuEntry, PARSE_ERROR_MARKER, RecordRef, ViewRecord, extract_markup};
pub use models::extract_declarations;
pub use report::{AnalysisOutcome, InvalidModule, ModuleReport, SummaryCounters};
pub use security::{SecurityInfo, SecurityRecord, load_security};
pub use structure::{DirectoryStructure, inspect_structure};
pub use test_suite::{TestClass, TestInfo, TestMethod, extract_tests};
pub use tree::TreeNode;
pub use unit_result::UnitResult;
