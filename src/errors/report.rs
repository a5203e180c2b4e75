// src/errors/report.rs
//! Rendering utilities for miette diagnostics.
//!
//! Terminal output uses the unicode/ansi theme; tests use an ascii
//! theme with no colors so assertions stay stable.

use miette::{
    Diagnostic, GraphicalReportHandler, GraphicalTheme, NamedSource, Report, ThemeCharacters,
    ThemeStyles,
};
use std::io::IsTerminal;

/// Create a handler for terminal output.
fn terminal_handler() -> GraphicalReportHandler {
    let styles = if std::io::stderr().is_terminal() {
        ThemeStyles::ansi()
    } else {
        ThemeStyles::none()
    };
    let theme = GraphicalTheme {
        characters: ThemeCharacters::unicode(),
        styles,
    };
    GraphicalReportHandler::new_themed(theme)
}

/// Create a handler for testing (ascii + no colors).
fn plain_handler() -> GraphicalReportHandler {
    let theme = GraphicalTheme {
        characters: ThemeCharacters::ascii(),
        styles: ThemeStyles::none(),
    };
    GraphicalReportHandler::new_themed(theme)
}

/// Attach a file's source text to a diagnostic so labels render with
/// the offending lines.
pub fn with_source<E>(error: E, file: &str, source: &str) -> Report
where
    E: Diagnostic + Send + Sync + 'static,
{
    Report::new(error).with_source_code(NamedSource::new(file, source.to_string()))
}

/// Render a report to stderr.
pub fn render_to_stderr(report: &Report) {
    let handler = terminal_handler();
    let mut output = String::new();
    if handler.render_report(&mut output, report.as_ref()).is_ok() {
        eprintln!("{output}");
    }
}

/// Render a report to a string without colors (for tests).
pub fn render_to_string(report: &Report) -> String {
    let handler = plain_handler();
    let mut output = String::new();
    let _ = handler.render_report(&mut output, report.as_ref());
    output
}
