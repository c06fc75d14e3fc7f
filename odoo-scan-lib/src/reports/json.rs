use crate::Result;
use crate::scan::AnalysisOutcome;
use core::fmt::Write;

pub fn generate<W: Write>(outcome: &AnalysisOutcome, pretty: bool, writer: &mut W) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(outcome)?
    } else {
        serde_json::to_string(outcome)?
    };

    write!(writer, "{text}")?;
    Ok(())
}
