// LogSlice - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers.

use serde::Serialize;
use std::collections::HashMap;
use std::ops::Range;

// =============================================================================
// Line store
// =============================================================================

/// Ordered, 0-indexed collection of raw log lines.
///
/// Lines are appended exactly once, in increasing index order, during
/// ingestion and are immutable afterwards. All extraction and search
/// operations borrow this store; nothing mutates it after the load
/// completes.
#[derive(Debug, Clone, Default)]
pub struct LineStore {
    lines: Vec<String>,
}

impl LineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next line. Index assignment is implicit and sequential.
    pub fn push_line(&mut self, text: String) {
        self.lines.push(text);
    }

    /// Number of lines held.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The text of line `index`, or None past the end.
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Borrow a contiguous range of lines. Out-of-range bounds are clamped.
    pub fn slice(&self, range: Range<usize>) -> &[String] {
        let start = range.start.min(self.lines.len());
        let end = range.end.min(self.lines.len());
        &self.lines[start..end]
    }

    /// All lines in order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Full text, lines joined with '\n'. Allocates.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl FromIterator<String> for LineStore {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// Markup kinds and fragments
// =============================================================================

/// The two structured-fragment syntaxes recognised in log lines.
///
/// Selected by fixed priority (XML before JSON) in the extraction driver;
/// the two kinds keep fully independent line coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupKind {
    Xml,
    Json,
}

impl MarkupKind {
    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            MarkupKind::Xml => "XML",
            MarkupKind::Json => "JSON",
        }
    }
}

impl std::fmt::Display for MarkupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A contiguous line-range extract of embedded XML or JSON found within
/// otherwise unstructured log lines.
///
/// Invariant: `start_line <= end_line < line_count` of the store the
/// fragment was extracted from. `raw_text` is the exact sourced text:
/// the relevant sub-range of the start and end lines and the full text
/// of any lines between, joined with '\n'.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    pub kind: MarkupKind,

    /// First line (inclusive) covered by this fragment.
    pub start_line: usize,

    /// Last line (inclusive) covered by this fragment.
    pub end_line: usize,

    /// Exact sourced text of the fragment.
    pub raw_text: String,
}

impl Fragment {
    /// Formatted rendering of the fragment, derived from `raw_text`.
    ///
    /// Never fails: content that does not actually parse as XML/JSON
    /// (the extractors only balance delimiters) degrades to best-effort
    /// or raw output.
    pub fn pretty_text(&self) -> String {
        match self.kind {
            MarkupKind::Xml => crate::core::pretty::pretty_xml(&self.raw_text),
            MarkupKind::Json => crate::core::pretty::pretty_json(&self.raw_text),
        }
    }

    /// Number of lines covered.
    pub fn line_span(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}

// =============================================================================
// Markup index
// =============================================================================

/// Per-line, per-kind fragment coverage for a loaded log.
///
/// Fragments of the same kind never overlap in line range; a line may
/// carry both an XML and a JSON fragment since the kinds do not share
/// coverage state.
#[derive(Debug, Clone, Default)]
pub struct MarkupIndex {
    fragments: Vec<Fragment>,
    xml_by_line: HashMap<usize, usize>,
    json_by_line: HashMap<usize, usize>,
}

impl MarkupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fragment, marking every line in its range as covered
    /// for the fragment's kind.
    pub fn insert(&mut self, fragment: Fragment) {
        let idx = self.fragments.len();
        let by_line = match fragment.kind {
            MarkupKind::Xml => &mut self.xml_by_line,
            MarkupKind::Json => &mut self.json_by_line,
        };
        for line in fragment.start_line..=fragment.end_line {
            by_line.insert(line, idx);
        }
        self.fragments.push(fragment);
    }

    /// True when `line` is covered by a fragment of `kind`.
    pub fn has_fragment(&self, line: usize, kind: MarkupKind) -> bool {
        self.by_line(kind).contains_key(&line)
    }

    /// The fragment of `kind` covering `line`, if any.
    pub fn fragment(&self, line: usize, kind: MarkupKind) -> Option<&Fragment> {
        self.by_line(kind)
            .get(&line)
            .map(|&idx| &self.fragments[idx])
    }

    /// All recorded fragments, in discovery order.
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Count of fragments of one kind.
    pub fn count(&self, kind: MarkupKind) -> usize {
        self.fragments.iter().filter(|f| f.kind == kind).count()
    }

    fn by_line(&self, kind: MarkupKind) -> &HashMap<usize, usize> {
        match kind {
            MarkupKind::Xml => &self.xml_by_line,
            MarkupKind::Json => &self.json_by_line,
        }
    }
}

// =============================================================================
// Log content (aggregate)
// =============================================================================

/// A fully loaded log: the line store plus its markup index.
///
/// Created once per load by the ingestion pass, read-only afterwards,
/// and discarded wholesale on the next load. The app layer installs a
/// completed `LogContent` atomically; no partially built content is
/// ever visible.
#[derive(Debug, Clone, Default)]
pub struct LogContent {
    store: LineStore,
    index: MarkupIndex,
}

impl LogContent {
    pub fn new(store: LineStore, index: MarkupIndex) -> Self {
        Self { store, index }
    }

    pub fn line_count(&self) -> usize {
        self.store.line_count()
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.store.line(index)
    }

    pub fn has_fragment(&self, line: usize, kind: MarkupKind) -> bool {
        self.index.has_fragment(line, kind)
    }

    pub fn fragment(&self, line: usize, kind: MarkupKind) -> Option<&Fragment> {
        self.index.fragment(line, kind)
    }

    pub fn store(&self) -> &LineStore {
        &self.store
    }

    pub fn index(&self) -> &MarkupIndex {
        &self.index
    }

    /// Full text, lines joined with '\n'. Allocates.
    pub fn text(&self) -> String {
        self.store.text()
    }
}

// =============================================================================
// Load progress (for host updates)
// =============================================================================

/// Progress messages sent from the load thread to the host.
#[derive(Debug)]
pub enum LoadProgress {
    /// Ingestion started; `total_lines` is the line-count hint.
    Started { total_lines: usize },

    /// Periodic progress at the configured line cadence. A final message
    /// always reports `lines_processed == total_lines`.
    Progress {
        lines_processed: usize,
        total_lines: usize,
    },

    /// Load finished; the fully built content is ready to install.
    Completed { content: LogContent },

    /// Load failed. Previously visible content must be retained.
    Failed { error: String },

    /// Load was cancelled before completion. No partial state escapes.
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(kind: MarkupKind, start: usize, end: usize) -> Fragment {
        Fragment {
            kind,
            start_line: start,
            end_line: end,
            raw_text: String::from("{}"),
        }
    }

    #[test]
    fn test_line_store_push_and_access() {
        let mut store = LineStore::new();
        store.push_line("alpha".to_string());
        store.push_line("beta".to_string());

        assert_eq!(store.line_count(), 2);
        assert_eq!(store.line(0), Some("alpha"));
        assert_eq!(store.line(1), Some("beta"));
        assert_eq!(store.line(2), None);
        assert_eq!(store.text(), "alpha\nbeta");
    }

    #[test]
    fn test_line_store_slice_clamps() {
        let store: LineStore = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(store.slice(1..3).len(), 2);
        assert_eq!(store.slice(2..10).len(), 1);
        assert_eq!(store.slice(5..9).len(), 0);
    }

    #[test]
    fn test_index_kinds_do_not_share_coverage() {
        let mut index = MarkupIndex::new();
        index.insert(fragment(MarkupKind::Xml, 1, 3));
        index.insert(fragment(MarkupKind::Json, 2, 2));

        assert!(index.has_fragment(2, MarkupKind::Xml));
        assert!(index.has_fragment(2, MarkupKind::Json));
        assert!(!index.has_fragment(0, MarkupKind::Xml));
        assert!(!index.has_fragment(3, MarkupKind::Json));
        assert_eq!(index.count(MarkupKind::Xml), 1);
        assert_eq!(index.count(MarkupKind::Json), 1);
    }

    #[test]
    fn test_index_fragment_lookup_covers_whole_range() {
        let mut index = MarkupIndex::new();
        index.insert(fragment(MarkupKind::Json, 4, 6));

        for line in 4..=6 {
            let found = index.fragment(line, MarkupKind::Json).unwrap();
            assert_eq!(found.start_line, 4);
            assert_eq!(found.end_line, 6);
        }
        assert!(index.fragment(7, MarkupKind::Json).is_none());
    }
}
