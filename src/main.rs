// LogSlice - main.rs
//
// CLI entry point. Handles:
// 1. Argument parsing
// 2. Logging initialisation (debug mode support)
// 3. Loading the log on the background loader
// 4. Reporting fragments, search matches, and exports on stdout

use clap::Parser;
use logslice::app::state::AppState;
use logslice::core::export;
use logslice::core::model::{LogContent, MarkupKind};
use logslice::core::search::TextSearch;
use logslice::util;
use logslice::util::error::ExportError;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// LogSlice - log viewer core with embedded XML/JSON fragment detection.
///
/// Loads a log file, indexes embedded XML and JSON fragments, and
/// optionally searches the text or pretty-prints a fragment.
#[derive(Parser, Debug)]
#[command(name = "logslice", version, about)]
struct Cli {
    /// Log file to load.
    path: PathBuf,

    /// List matches for this query after loading.
    #[arg(short = 's', long = "search")]
    search: Option<String>,

    /// Match the search query case-sensitively.
    #[arg(long = "case-sensitive")]
    case_sensitive: bool,

    /// Pretty-print the fragment covering this line (first line is 1).
    #[arg(short = 'l', long = "line")]
    line: Option<usize>,

    /// Write the fragment index to this path as JSON.
    #[arg(short = 'e', long = "export")]
    export: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    util::logging::init(cli.debug);

    tracing::info!(
        version = util::constants::APP_VERSION,
        file = %cli.path.display(),
        "LogSlice starting"
    );

    let mut state = AppState::new();
    state.start_load(cli.path.clone());

    // Pump loader messages until the load settles. The background
    // thread reports at the ingestion cadence; surface those at debug.
    let mut reported = None;
    while state.load_in_progress {
        state.pump();
        if state.last_progress != reported {
            reported = state.last_progress;
            if let Some((processed, total)) = reported {
                tracing::debug!(processed, total, "Loading");
            }
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    let Some(content) = state.content.clone() else {
        eprintln!("Error: {}", state.status_message);
        std::process::exit(1);
    };

    print_summary(&cli.path, &content);

    if let Some(line) = cli.line {
        print_fragment_at(&content, line);
    }

    if let Some(query) = &cli.search {
        print_matches(&content, query, cli.case_sensitive);
    }

    if let Some(export_path) = &cli.export {
        if let Err(e) = export_fragments(&content, export_path) {
            tracing::error!(error = %e, "Export failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        println!("Exported fragment index to '{}'", export_path.display());
    }
}

/// One-line-per-fragment overview of the loaded log.
fn print_summary(path: &Path, content: &LogContent) {
    println!("{}: {} lines", path.display(), content.line_count());

    let fragments = content.index().fragments();
    if fragments.is_empty() {
        println!("No embedded XML or JSON fragments found.");
        return;
    }

    println!("{} fragment(s):", fragments.len());
    for fragment in fragments {
        println!(
            "  {:4} lines {}-{} ({} bytes)",
            fragment.kind.label(),
            fragment.start_line + 1,
            fragment.end_line + 1,
            fragment.raw_text.len()
        );
    }
}

/// Pretty-print the fragment covering a 1-based line number.
/// XML takes priority when both kinds cover the line.
fn print_fragment_at(content: &LogContent, display_line: usize) {
    if display_line == 0 || display_line > content.line_count() {
        eprintln!(
            "Error: line {display_line} out of range (1 to {})",
            content.line_count()
        );
        std::process::exit(1);
    }
    let line = display_line - 1;

    let fragment = content
        .fragment(line, MarkupKind::Xml)
        .or_else(|| content.fragment(line, MarkupKind::Json));

    match fragment {
        Some(fragment) => {
            println!(
                "{} fragment, lines {}-{}:",
                fragment.kind,
                fragment.start_line + 1,
                fragment.end_line + 1
            );
            println!("{}", fragment.pretty_text());
        }
        None => println!("No fragment covers line {display_line}."),
    }
}

/// List every match with its location and the matching line's text.
fn print_matches(content: &LogContent, query: &str, case_sensitive: bool) {
    let search = TextSearch::new(content.store(), query, case_sensitive);
    if search.match_count() == 0 {
        println!("No matches for '{query}'.");
        return;
    }

    println!("{} match(es) for '{query}':", search.match_count());
    for location in search.matches() {
        println!(
            "  {}:{}: {}",
            location.line + 1,
            location.column,
            content.line(location.line).unwrap_or_default()
        );
    }
}

/// Write the fragment index as JSON.
fn export_fragments(content: &LogContent, path: &Path) -> Result<usize, ExportError> {
    let file = std::fs::File::create(path).map_err(|e| ExportError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    export::export_json(content.index(), file, path)
}
