//! Command-line interface for odoo-scan
//!
//! The `run` function parses the command line with clap, sets up logging, loads the optional
//! module layout file, runs the analysis, and writes the JSON report either to the host's
//! output stream or to a file.
//!
//! Output goes through the [`Host`] trait so tests can capture it in memory.

mod host;
mod logging;
mod run;

pub use host::Host;
pub use run::run;
