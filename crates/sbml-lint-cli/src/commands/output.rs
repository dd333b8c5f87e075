//! Shared output formatting for check results.

use anyhow::Result;
use sbml_lint_core::{Diagnostic, Severity};
use std::io::{self, Write};

use super::check::FileReport;
use crate::OutputFormat;

/// Print check results in the specified format.
pub fn print(reports: &[FileReport], format: OutputFormat) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_reports(&mut out, reports, format)
}

fn write_reports(out: &mut dyn Write, reports: &[FileReport], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => write_text(out, reports)?,
        OutputFormat::Json => write_json(out, reports)?,
        OutputFormat::Compact => write_compact(out, reports)?,
    }
    Ok(())
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Fatal => "\x1b[1;31mfatal\x1b[0m",
        Severity::Error => "\x1b[31merror\x1b[0m",
        Severity::Warning => "\x1b[33mwarning\x1b[0m",
        Severity::Info => "\x1b[34minfo\x1b[0m",
    }
}

fn write_diagnostic(out: &mut dyn Write, file: &str, d: &Diagnostic) -> io::Result<()> {
    let location = d
        .location()
        .map_or_else(|| file.to_string(), |loc| format!("{file}:{loc}"));
    write!(out, "{} {} at {location}", d.code(), d.category())?;
    if let Some(element) = d.element() {
        match d.object_id() {
            Some(id) => write!(out, " ({element} '{id}')")?,
            None => write!(out, " ({element})")?,
        }
    }
    writeln!(out)?;
    writeln!(out, "  {}: {}", severity_label(d.severity()), d.message())?;
    writeln!(out)
}

fn write_text(out: &mut dyn Write, reports: &[FileReport]) -> io::Result<()> {
    let mut counts = [0usize; 4];
    for report in reports {
        let file = report.path.display().to_string();
        if let Some(error) = &report.error {
            writeln!(out, "{file}")?;
            writeln!(out, "  {}: {error}", severity_label(Severity::Fatal))?;
            writeln!(out)?;
            counts[0] += 1;
        }
        for d in report.log.iter().flat_map(|log| log.entries()) {
            write_diagnostic(out, &file, d)?;
            counts[severity_slot(d.severity())] += 1;
        }
    }

    let [fatals, errors, warnings, infos] = counts;
    let summary_color = if fatals + errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };
    writeln!(
        out,
        "{summary_color}Found {fatals} fatal(s), {errors} error(s), {warnings} warning(s), {infos} info(s) in {} file(s)\x1b[0m",
        reports.len()
    )
}

fn severity_slot(severity: Severity) -> usize {
    match severity {
        Severity::Fatal => 0,
        Severity::Error => 1,
        Severity::Warning => 2,
        Severity::Info => 3,
    }
}

fn write_json(out: &mut dyn Write, reports: &[FileReport]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, reports)?;
    writeln!(out)?;
    Ok(())
}

fn write_compact(out: &mut dyn Write, reports: &[FileReport]) -> io::Result<()> {
    for report in reports {
        let file = report.path.display();
        if let Some(error) = &report.error {
            writeln!(out, "{file}: fatal {error}")?;
        }
        for d in report.log.iter().flat_map(|log| log.entries()) {
            if d.location().is_some() {
                writeln!(out, "{file}:{d}")?;
            } else {
                writeln!(out, "{file}: {d}")?;
            }
        }
    }
    Ok(())
}
