//! Human-readable diagnostic output.
#![allow(clippy::print_stderr)]

use colored::Colorize;

use symgen_common::{Diagnostic, DiagnosticCategory};

/// Prints diagnostics to stderr, most useful context first, and returns the
/// error count.
pub fn report(diagnostics: &[Diagnostic]) -> usize {
    let mut errors = 0usize;
    for diagnostic in diagnostics {
        let label = match diagnostic.category {
            DiagnosticCategory::Error => {
                errors += 1;
                "error".red().bold()
            }
            DiagnosticCategory::Warning => "warning".yellow().bold(),
            DiagnosticCategory::Message => "note".normal(),
        };
        eprintln!("{label}: {diagnostic}");
    }
    errors
}
