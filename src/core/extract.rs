// LogSlice - core/extract.rs
//
// Extraction driver and ingestion pass.
//
// The driver makes a single forward pass over a LineStore, trying the
// XML extractor first and the JSON extractor second on each uncovered
// line. On success every line of the fragment is covered for that kind
// and scanning resumes after the fragment; on failure the driver
// advances one line. Retries inside the extractors are bounded by the
// scan window, never restart the file, so the pass stays amortised
// O(total characters).
//
// Ingestion is synchronous: it reports to a progress-sink capability at
// a fixed line cadence and polls a cancel flag at the same cadence. The
// app layer (app/loader.rs) runs it on a background thread.

use crate::core::json;
use crate::core::model::{LineStore, LogContent, MarkupIndex, MarkupKind};
use crate::core::xml;
use crate::util::constants;
use crate::util::error::LoadError;
use std::sync::atomic::{AtomicBool, Ordering};

// =============================================================================
// Configuration
// =============================================================================

/// Tunables for the ingestion/extraction pass.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Maximum lines a fragment candidate may scan ahead of its start line.
    pub scan_window_lines: usize,

    /// Progress-sink cadence in lines.
    pub progress_cadence: usize,

    /// Cancel-flag polling cadence in lines during the driver pass.
    pub cancel_check_lines: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            scan_window_lines: constants::DEFAULT_SCAN_WINDOW_LINES,
            progress_cadence: constants::PROGRESS_LINE_CADENCE,
            cancel_check_lines: constants::EXTRACT_CANCEL_CHECK_LINES,
        }
    }
}

// =============================================================================
// Progress sink
// =============================================================================

/// Capability through which ingestion reports coarse-grained progress.
///
/// Called every `progress_cadence` lines and once finally with
/// `lines_processed == total_lines`.
pub trait ProgressSink {
    fn on_progress(&mut self, lines_processed: usize, total_lines: usize);
}

impl<F: FnMut(usize, usize)> ProgressSink for F {
    fn on_progress(&mut self, lines_processed: usize, total_lines: usize) {
        self(lines_processed, total_lines)
    }
}

/// Sink for callers that do not care about progress.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_progress(&mut self, _lines_processed: usize, _total_lines: usize) {}
}

// =============================================================================
// Ingestion
// =============================================================================

/// Ingest raw log text into a fully built `LogContent`.
///
/// Fills a LineStore line by line, then runs the extraction driver over
/// it. Either the complete content is returned or an error; no partial
/// state escapes on cancellation.
pub fn ingest_text(
    text: &str,
    config: &ExtractConfig,
    sink: &mut dyn ProgressSink,
    cancel: &AtomicBool,
) -> Result<LogContent, LoadError> {
    let total_lines = text.lines().count();
    let cadence = config.progress_cadence.max(1);

    let mut store = LineStore::new();
    for (idx, line) in text.lines().enumerate() {
        store.push_line(line.to_string());
        let processed = idx + 1;
        if processed % cadence == 0 {
            sink.on_progress(processed, total_lines);
            if cancel.load(Ordering::SeqCst) {
                return Err(LoadError::Cancelled);
            }
        }
    }

    let index = build_markup_index(&store, config, cancel)?;

    // Final report: processed == total, regardless of cadence alignment.
    sink.on_progress(total_lines, total_lines);

    tracing::debug!(
        lines = total_lines,
        xml = index.count(MarkupKind::Xml),
        json = index.count(MarkupKind::Json),
        "Ingestion complete"
    );

    Ok(LogContent::new(store, index))
}

// =============================================================================
// Extraction driver
// =============================================================================

/// Single forward pass over the store, producing per-line, per-kind
/// fragment coverage.
///
/// Guarantees that fragments of the same kind never overlap: on success
/// the pass resumes after the fragment, and the coverage check skips
/// lines a prior fragment already claimed.
pub fn build_markup_index(
    store: &LineStore,
    config: &ExtractConfig,
    cancel: &AtomicBool,
) -> Result<MarkupIndex, LoadError> {
    let mut index = MarkupIndex::new();
    let check = config.cancel_check_lines.max(1);

    let mut line = 0;
    while line < store.line_count() {
        if line % check == 0 && cancel.load(Ordering::SeqCst) {
            return Err(LoadError::Cancelled);
        }

        if index.has_fragment(line, MarkupKind::Xml) || index.has_fragment(line, MarkupKind::Json)
        {
            line += 1;
            continue;
        }

        // Fixed priority: XML first, JSON only when XML found nothing.
        if let Some(fragment) = xml::extract(store, line, config.scan_window_lines) {
            let next = fragment.end_line + 1;
            index.insert(fragment);
            line = next;
        } else if let Some(fragment) = json::extract(store, line, config.scan_window_lines) {
            let next = fragment.end_line + 1;
            index.insert(fragment);
            line = next;
        } else {
            line += 1;
        }
    }

    Ok(index)
}

// =============================================================================
// Scan-window helpers (shared by both extractors)
// =============================================================================

/// Join the scan window into one string with '\n' separators, recording
/// each line's start offset for offset→line translation.
pub(crate) fn window_text(
    store: &LineStore,
    start: usize,
    window_lines: usize,
) -> (String, Vec<usize>) {
    let end = store.line_count().min(start + window_lines.max(1));
    let window = store.slice(start..end);

    let mut text = String::new();
    let mut line_starts = Vec::with_capacity(window.len());
    for (i, line) in window.iter().enumerate() {
        if i > 0 {
            text.push('\n');
        }
        line_starts.push(text.len());
        text.push_str(line);
    }
    (text, line_starts)
}

/// Window-relative line index containing byte `offset`.
pub(crate) fn line_of(line_starts: &[usize], offset: usize) -> usize {
    line_starts.partition_point(|&s| s <= offset) - 1
}
