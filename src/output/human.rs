#![forbid(unsafe_code)]

//! Human-readable output for compliance reports

use crate::engine::{ComplianceReport, Verdict};
use crate::model::Document;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Human-readable formatter for compliance reports
pub struct HumanFormatter;

impl HumanFormatter {
    pub fn new() -> Self {
        HumanFormatter
    }

    /// Renders the report without color
    pub fn format(&self, report: &ComplianceReport) -> String {
        let mut buffer = termcolor::NoColor::new(Vec::new());
        // Writing to an in-memory buffer cannot fail
        let _ = self.write(report, &mut buffer);
        String::from_utf8_lossy(&buffer.into_inner()).into_owned()
    }

    /// Writes the report, coloring the verdict when `out` supports it
    pub fn write(&self, report: &ComplianceReport, out: &mut dyn WriteColor) -> io::Result<()> {
        write!(out, "Rulebase {}: ", report.rulebase)?;
        let (color, label) = match report.verdict() {
            Verdict::Compliant => (Color::Green, "✓ COMPLIANT"),
            Verdict::NonCompliant => (Color::Red, "✗ NON_COMPLIANT"),
        };
        out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(out, "{}", label)?;
        out.reset()?;
        writeln!(out)?;

        if report.compliant {
            return Ok(());
        }

        writeln!(out)?;
        if report.documents.is_empty() {
            writeln!(
                out,
                "No evidence at offset {}{}",
                report.offset,
                total_suffix(report.total)
            )?;
            return Ok(());
        }

        let first = report.offset + 1;
        let last = report.offset + report.documents.len();
        writeln!(
            out,
            "Evidence {}-{}{}:",
            first,
            last,
            total_suffix(report.total)
        )?;
        for doc in &report.documents {
            write_document(out, doc)?;
        }
        Ok(())
    }

    /// Writes the report to stdout
    pub fn write_to_stdout(&self, report: &ComplianceReport, color: ColorChoice) -> io::Result<()> {
        let mut stdout = StandardStream::stdout(color);
        self.write(report, &mut stdout)?;
        stdout.flush()
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn total_suffix(total: Option<usize>) -> String {
    match total {
        Some(total) => format!(" of {}", total),
        None => String::new(),
    }
}

fn write_document(out: &mut dyn WriteColor, doc: &Document) -> io::Result<()> {
    writeln!(out, "  {}", doc.label())?;
    if let Some(revision) = &doc.revision {
        writeln!(out, "    Revision: {}", revision)?;
    }
    if !doc.tags.is_empty() {
        writeln!(out, "    Tags: {}", doc.tags.join(", "))?;
    }
    for statement in &doc.statements {
        writeln!(out, "    - {}", statement)?;
    }
    Ok(())
}
