use crate::Result;
use crate::report::{UnifiedReport, Week};
use core::fmt::Write;
use ohno::AppError;
use owo_colors::OwoColorize;

/// Write a short human-readable summary of `report`.
pub fn generate<W: Write>(report: &UnifiedReport, use_colors: bool, writer: &mut W) -> Result<(), AppError> {
    heading(writer, "Visitors", use_colors)?;
    writeln!(writer, "  this week : {}", report.visitors(Week::This))?;
    writeln!(writer, "  last week : {}", report.visitors(Week::Last))?;

    if let Some(change) = report.visitor_change_percent() {
        let text = format!("{change:+.1}%");
        let text = if !use_colors {
            text
        } else if change < 0.0 {
            text.red().to_string()
        } else {
            text.green().to_string()
        };
        writeln!(writer, "  change    : {text}")?;
    }

    for week in [Week::This, Week::Last] {
        writeln!(writer)?;
        heading(writer, &format!("Most visited pages, {}", week_label(week)), use_colors)?;
        entries(writer, report.pages(week).iter().map(|p| (p.page.as_str(), p.visitors)))?;
    }

    for week in [Week::This, Week::Last] {
        writeln!(writer)?;
        heading(writer, &format!("Top sources, {}", week_label(week)), use_colors)?;
        entries(writer, report.sources(week).iter().map(|s| (s.source.as_str(), s.visitors)))?;
    }

    Ok(())
}

const fn week_label(week: Week) -> &'static str {
    match week {
        Week::This => "this week",
        Week::Last => "last week",
    }
}

fn heading<W: Write>(writer: &mut W, title: &str, use_colors: bool) -> Result<(), AppError> {
    if use_colors {
        writeln!(writer, "{}", title.bold())?;
    } else {
        writeln!(writer, "{title}")?;
    }

    Ok(())
}

fn entries<'a, W: Write>(writer: &mut W, rows: impl Iterator<Item = (&'a str, u64)>) -> Result<(), AppError> {
    let rows: Vec<_> = rows.collect();
    if rows.is_empty() {
        writeln!(writer, "  (none)")?;
        return Ok(());
    }

    let width = rows.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);
    for (label, visitors) in rows {
        writeln!(writer, "  {label:<width$} : {visitors}")?;
    }

    Ok(())
}
