use serde::Serialize;

use crate::error::Error;
use crate::types::{Severity, SourceLocation};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// A warning or error attributed to one node of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub location: SourceLocation,
    pub message: String,
    pub severity: Severity,
}

/// Collects diagnostics for one run and mirrors each one as a `tracing`
/// debug event; the caller decides how to present the collected entries.
/// Reporting never fails and never stops processing.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Record a diagnostic against `location`.
    pub fn report(&mut self, location: &SourceLocation, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(file = %location.file.display(), line = location.line, %severity, "{message}");
        self.entries.push(Diagnostic {
            location: location.clone(),
            message,
            severity,
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}

/// One line per diagnostic: severity padded to a column, location, message.
pub fn render_diagnostic(d: &Diagnostic) -> String {
    let label = match d.severity {
        Severity::Warn => "WARN",
        Severity::Error => "ERROR",
    };
    format!("{label:<7} {} {}", d.location, d.message)
}

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic: what happened and,
/// where there is one, how to fix it.
pub fn render_error(e: &Error) -> String {
    match e {
        Error::ContentRootNotFound { path } => format!("\
# Error: Content Root Not Found

`{}` does not exist or is not a directory.

## Fix

Point `--root` at the directory that holds `.docxref.toml`.
", path.display()),

        Error::DocumentNotFound { id } => render_document_not_found(id),

        Error::InvalidStubPattern { pattern, reason } => format!("\
# Error: Invalid Stub Pattern

`{pattern}` is not a valid regular expression:

{reason}

## Fix

Correct or remove the entry in the `stub` list of `.docxref.toml`.
"),

        Error::ParseFailed { document, reason } => format!("\
# Error: Parse Failed

Could not parse `{document}`: {reason}
"),

        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}
"),

        _ => format!("\
# Error

{e}
"),
    }
}

fn render_document_not_found(id: &str) -> String {
    let mut out = format!("\
# Error: Document Not Found

No page matches `{id}`.
");
    out.push_str("\
\n## Fix

Use a page identifier such as:

    docxref show index.adoc
    docxref show module:path/page.adoc
    docxref show 1.0@component:module:page.adoc
");
    out
}
