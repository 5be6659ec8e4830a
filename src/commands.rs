//! CLI commands: check, show.

use std::path::Path;
use std::process::ExitCode;

use docxref::Error;
use docxref::asciidoc::AsciiDocParser;
use docxref::catalog::{Catalog, ContentCatalog};
use docxref::config::Config;
use docxref::diagnostics::{Diagnostic, render_diagnostic};
use docxref::pipeline::{Converted, Converter};
use docxref::types::Severity;
use docxref::xref::XrefProcessor;
use serde::Serialize;

/// How `check` prints its report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Json,
    Text,
}

/// Machine-readable output of `check --format json`.
#[derive(Serialize)]
struct CheckReport<'a> {
    diagnostics: &'a [Diagnostic],
    /// Number of pages converted.
    documents: usize,
    errors: usize,
    warnings: usize,
}

/// Load config and content under `root`.
///
/// # Errors
///
/// Returns config and catalog errors.
fn load_content(root: &Path) -> Result<(ContentCatalog, Config), Error> {
    let config = Config::load(root)?;
    let catalog = ContentCatalog::load(root, &config)?;
    return Ok((catalog, config));
}

/// Build a converter over `catalog` using the site config.
///
/// # Errors
///
/// Returns `Error::InvalidStubPattern` if a configured stub does not compile.
fn converter<'a>(catalog: &'a ContentCatalog, config: &Config) -> Result<Converter<'a, AsciiDocParser>, Error> {
    let processor = XrefProcessor::new(config.xref())?;
    return Ok(Converter::new(catalog, AsciiDocParser, config.asciidoc().clone()).with_processor(processor));
}

/// Count of (errors, warnings).
fn tally(diagnostics: &[Diagnostic]) -> (usize, usize) {
    let errors = diagnostics.iter().filter(|d| return d.severity == Severity::Error).count();
    return (errors, diagnostics.len().saturating_sub(errors));
}

/// Exit code priority: errors (2) > warnings (1) > clean (0).
fn exit_code(errors: usize, warnings: usize) -> ExitCode {
    if errors > 0 {
        return ExitCode::from(2);
    } else if warnings > 0 {
        return ExitCode::from(1);
    } else {
        return ExitCode::SUCCESS;
    }
}

/// Resolve every page and report what the xref processor found.
///
/// # Errors
///
/// Returns errors from loading config or content, or from writing JSON.
pub fn check(root: &Path, format: Format) -> Result<ExitCode, Error> {
    let (catalog, config) = load_content(root)?;
    let converted = converter(&catalog, &config)?.convert_all(catalog.pages());
    let documents = converted.len();
    let diagnostics: Vec<Diagnostic> = converted.into_iter().flat_map(|c| c.diagnostics).collect();
    let (errors, warnings) = tally(&diagnostics);

    match format {
        Format::Json => {
            let report = CheckReport {
                diagnostics: &diagnostics,
                documents,
                errors,
                warnings,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        },
        Format::Text => {
            for d in &diagnostics {
                println!("{}", render_diagnostic(d));
            }
            if diagnostics.is_empty() {
                println!("All {documents} documents clean");
            } else {
                println!();
                println!("{errors} errors, {warnings} warnings");
            }
        },
    }

    return Ok(exit_code(errors, warnings));
}

/// Convert one page and print its rewritten text, one line per source line.
///
/// # Errors
///
/// Returns `Error::DocumentNotFound` if `id` names no page, plus the load
/// errors of `check`.
pub fn show(root: &Path, id: &str) -> Result<ExitCode, Error> {
    let (catalog, config) = load_content(root)?;
    let not_found = || return Error::DocumentNotFound { id: id.to_string() };
    let context = catalog.root_context().ok_or_else(not_found)?;
    let document = catalog.resolve(id, &context).ok_or_else(not_found)?;

    let Converted { diagnostics, tree, .. } = converter(&catalog, &config)?.convert(document);
    if let Some(tree) = &tree {
        for (line, text) in tree.text() {
            let first = usize::try_from(line).unwrap_or(usize::MAX);
            for (offset, part) in text.lines().enumerate() {
                println!("{:>5}  {part}", first.saturating_add(offset));
            }
        }
    }
    for d in &diagnostics {
        eprintln!("{}", render_diagnostic(d));
    }

    let (errors, warnings) = tally(&diagnostics);
    return Ok(exit_code(errors, warnings));
}
