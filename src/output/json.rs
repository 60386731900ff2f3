use crate::Result;
use crate::report::UnifiedReport;
use core::fmt::Write;
use ohno::AppError;

/// Write `report` as a pretty-printed JSON object with exactly the six report fields.
pub fn generate<W: Write>(report: &UnifiedReport, writer: &mut W) -> Result<(), AppError> {
    writeln!(writer, "{}", serde_json::to_string_pretty(report)?)?;
    Ok(())
}
