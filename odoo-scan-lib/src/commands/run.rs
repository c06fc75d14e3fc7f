//! Command-line entry point for odoo-scan

use super::logging::{LogLevel, init_logging};
use crate::reports::generate_json;
use crate::scan::{ModuleLayout, analyze_module_with};
use crate::{Host, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use ohno::IntoAppError;
use std::fs;
use std::io::Write;

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "odoo-scan", author, version, long_about = None)]
#[command(about = "Analyze an Odoo module and extract structural information")]
#[command(styles = CLAP_STYLES)]
struct Args {
    /// Path to the Odoo module directory
    #[arg(value_name = "MODULE_PATH")]
    module_path: Utf8PathBuf,

    /// Output JSON file path (default: stdout)
    #[arg(long, short = 'o', value_name = "PATH")]
    output: Option<Utf8PathBuf>,

    /// Pretty print JSON output
    #[arg(long, short = 'p')]
    pretty: bool,

    /// TOML file overriding where artifacts are looked for inside the module
    #[arg(long, value_name = "PATH")]
    layout: Option<Utf8PathBuf>,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none", env = "ODOO_SCAN_LOG_LEVEL")]
    log_level: LogLevel,
}

/// Parse the command line, analyze the module, and emit the JSON report
///
/// Analysis problems are part of the report; only an unusable layout file or a failure to write
/// the report is returned as an error.
///
/// # Arguments
///
/// * `args` - An iterator of command-line arguments (typically from `std::env::args()`)
///
/// # Errors
///
/// Returns an error if the layout file is invalid or if the report cannot be written
pub fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    let args = Args::parse_from(args);
    init_logging(args.log_level);

    let layout = ModuleLayout::load(args.layout.as_deref())?;
    let outcome = analyze_module_with(&args.module_path, &layout);

    let mut json = String::new();
    generate_json(&outcome, args.pretty, &mut json)?;

    if let Some(path) = &args.output {
        fs::write(path, json).into_app_err_with(|| format!("writing report to '{path}'"))?;
        let _ = writeln!(host.error(), "Output written to: {path}");
    } else {
        writeln!(host.output(), "{json}").into_app_err("writing report to standard output")?;
    }

    Ok(())
}
