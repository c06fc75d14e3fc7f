#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for odoo-scan
//!
//! This library statically analyzes an Odoo module directory and describes its manifest,
//! models, wizards, markup records, security rules and tests as a single JSON document.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface and output handling
//! - [`scan`]: Extraction of the module's declarations and the aggregated report
//! - [`reports`]: JSON rendering of analysis outcomes

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

pub mod reports;
pub mod scan;

pub use crate::commands::{Host, run};
pub use crate::scan::{AnalysisOutcome, ModuleLayout, analyze_module, analyze_module_with};
