#![allow(clippy::implicit_return, reason = "short accessors and builders read as single expressions")]
#![allow(clippy::arbitrary_source_item_ordering, reason = "items are grouped by pipeline stage")]

mod commands;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use docxref::diagnostics;
use tracing_subscriber::EnvFilter;

use crate::commands::Format;

#[derive(Parser)]
#[command(name = "docxref", about = "Check and complete AsciiDoc xref fragments")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve every page and report broken or questionable xref fragments
    Check {
        /// Content root holding .docxref.toml
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Print the rewritten text of one page
    Show {
        /// Page identifier, e.g. `guide.adoc` or `1.0@comp:mod:guide.adoc`
        id: String,
        /// Content root holding .docxref.toml
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

/// Log to stderr so reports on stdout stay machine-readable. Diagnostics
/// are the report itself and are logged at debug, below the default level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| return EnvFilter::new("docxref=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { root, format } => commands::check(&root, format),
        Commands::Show { id, root } => commands::show(&root, &id),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    }
}
