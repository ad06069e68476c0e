// LogSlice - core/search.rs
//
// Cyclic text search over a loaded log.
//
// A TextSearch computes its full ordered match list eagerly at
// construction; navigation is a lookup into that list with wrap-around
// at both ends. The engine holds no mutable state, performs no I/O, and
// is safe to drive directly from the interactive thread.

use crate::core::model::LineStore;
use serde::Serialize;

// =============================================================================
// Location
// =============================================================================

/// A match's span within the log text.
///
/// `column` and `length` are byte offsets into the original line text
/// (case-insensitive matching folds per character, so both always land
/// on character boundaries). Immutable value, produced fresh per query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub length: usize,
}

impl Location {
    /// Ordering key: position of the match start in the text.
    fn key(&self) -> (usize, usize) {
        (self.line, self.column)
    }
}

// =============================================================================
// TextSearch
// =============================================================================

/// Search engine over the full text of a loaded log.
///
/// Matches never overlap: after each match, scanning resumes at
/// `column + length`. An empty query, or a query with no occurrences,
/// yields none from every navigation method.
#[derive(Debug, Clone)]
pub struct TextSearch {
    matches: Vec<Location>,
}

impl TextSearch {
    /// Build the ordered match list for `query` over the whole store.
    pub fn new(store: &LineStore, query: &str, case_sensitive: bool) -> Self {
        let mut matches = Vec::new();
        if !query.is_empty() {
            for (line_idx, line) in store.lines().iter().enumerate() {
                let mut from = 0;
                while let Some((column, length)) = find_from(line, query, from, case_sensitive) {
                    matches.push(Location {
                        line: line_idx,
                        column,
                        length,
                    });
                    from = column + length;
                }
            }
        }
        Self { matches }
    }

    /// All matches in text order.
    pub fn matches(&self) -> &[Location] {
        &self.matches
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// The first match in the text, if any.
    pub fn first_match(&self) -> Option<Location> {
        self.matches.first().copied()
    }

    /// The last match in the text, if any.
    pub fn last_match(&self) -> Option<Location> {
        self.matches.last().copied()
    }

    /// The match after `location`, wrapping to the first match when
    /// `location` is at or past the last one.
    pub fn next_match_to(&self, location: Location) -> Option<Location> {
        self.matches
            .iter()
            .find(|m| m.key() > location.key())
            .copied()
            .or_else(|| self.first_match())
    }

    /// The match before `location`, wrapping to the last match when
    /// `location` is at or before the first one.
    pub fn previous_match_to(&self, location: Location) -> Option<Location> {
        self.matches
            .iter()
            .rev()
            .find(|m| m.key() < location.key())
            .copied()
            .or_else(|| self.last_match())
    }
}

/// Find the next occurrence of `query` in `line` at or after byte
/// offset `from`. Returns (column, length) in bytes of the original line.
fn find_from(
    line: &str,
    query: &str,
    from: usize,
    case_sensitive: bool,
) -> Option<(usize, usize)> {
    let tail = line.get(from..)?;
    if case_sensitive {
        return tail.find(query).map(|i| (from + i, query.len()));
    }
    for (start, _) in tail.char_indices() {
        if let Some(length) = folded_prefix_len(&tail[start..], query) {
            return Some((from + start, length));
        }
    }
    None
}

/// Byte length of the prefix of `haystack` that equals `needle` under
/// per-character case folding, or None if it does not match.
fn folded_prefix_len(haystack: &str, needle: &str) -> Option<usize> {
    let mut hay = haystack.char_indices();
    let mut need = needle.chars();
    loop {
        let Some(n) = need.next() else {
            // Needle consumed: the prefix ends where the next haystack
            // character begins.
            return Some(hay.next().map_or(haystack.len(), |(i, _)| i));
        };
        let (_, h) = hay.next()?;
        if !h.to_lowercase().eq(n.to_lowercase()) {
            return None;
        }
    }
}

// =============================================================================
// SearchNavigator
// =============================================================================

/// One navigation step: the previously highlighted span to clear and the
/// new span to set. Consumed by the rendering layer; the core never
/// touches presentation state itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStep {
    pub clear: Option<Location>,
    pub set: Option<Location>,
}

/// Tracks the current position within a TextSearch.
///
/// Navigation never starts implicitly: `next()`/`previous()` before
/// `begin()` return an empty step, and it is the caller's job to call
/// `begin()` first.
#[derive(Debug)]
pub struct SearchNavigator {
    search: TextSearch,
    current: Option<Location>,
}

impl SearchNavigator {
    pub fn new(search: TextSearch) -> Self {
        Self {
            search,
            current: None,
        }
    }

    /// Position on the first match (if any), clearing whatever was
    /// highlighted before.
    pub fn begin(&mut self) -> SearchStep {
        let clear = self.current.take();
        self.current = self.search.first_match();
        SearchStep {
            clear,
            set: self.current,
        }
    }

    /// Advance to the next match, wrapping past the last.
    pub fn next(&mut self) -> SearchStep {
        let Some(current) = self.current else {
            return SearchStep::default();
        };
        self.current = self.search.next_match_to(current);
        SearchStep {
            clear: Some(current),
            set: self.current,
        }
    }

    /// Step back to the previous match, wrapping before the first.
    pub fn previous(&mut self) -> SearchStep {
        let Some(current) = self.current else {
            return SearchStep::default();
        };
        self.current = self.search.previous_match_to(current);
        SearchStep {
            clear: Some(current),
            set: self.current,
        }
    }

    pub fn current(&self) -> Option<Location> {
        self.current
    }

    pub fn search(&self) -> &TextSearch {
        &self.search
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(lines: &[&str]) -> LineStore {
        lines.iter().map(|s| s.to_string()).collect()
    }

    fn loc(line: usize, column: usize, length: usize) -> Location {
        Location {
            line,
            column,
            length,
        }
    }

    #[test]
    fn test_absent_query_yields_none_everywhere() {
        let search = TextSearch::new(&store(&["alpha", "beta"]), "gamma", true);
        assert_eq!(search.first_match(), None);
        assert_eq!(search.next_match_to(loc(0, 0, 1)), None);
        assert_eq!(search.previous_match_to(loc(0, 0, 1)), None);
    }

    #[test]
    fn test_empty_query_yields_none() {
        let search = TextSearch::new(&store(&["alpha"]), "", true);
        assert_eq!(search.match_count(), 0);
        assert_eq!(search.first_match(), None);
    }

    #[test]
    fn test_matches_are_ordered_across_lines() {
        let search = TextSearch::new(&store(&["a cat", "no", "cat cat"]), "cat", true);
        assert_eq!(
            search.matches(),
            &[loc(0, 2, 3), loc(2, 0, 3), loc(2, 4, 3)]
        );
    }

    #[test]
    fn test_matches_do_not_overlap() {
        // "aaaa" contains "aa" at 0 and 2 only; position 1 would overlap.
        let search = TextSearch::new(&store(&["aaaa"]), "aa", true);
        assert_eq!(search.matches(), &[loc(0, 0, 2), loc(0, 2, 2)]);
    }

    #[test]
    fn test_case_sensitivity_flag() {
        let lines = store(&["Error then ERROR then error"]);
        assert_eq!(TextSearch::new(&lines, "error", true).match_count(), 1);
        assert_eq!(TextSearch::new(&lines, "error", false).match_count(), 3);
    }

    #[test]
    fn test_case_insensitive_locations_index_original_text() {
        let search = TextSearch::new(&store(&["xx FAILED xx"]), "failed", false);
        assert_eq!(search.matches(), &[loc(0, 3, 6)]);
    }

    #[test]
    fn test_next_wraps_past_last_match() {
        let search = TextSearch::new(&store(&["cat", "cat"]), "cat", true);
        let last = search.last_match().unwrap();
        assert_eq!(search.next_match_to(last), search.first_match());
    }

    #[test]
    fn test_previous_wraps_before_first_match() {
        let search = TextSearch::new(&store(&["cat", "cat"]), "cat", true);
        let first = search.first_match().unwrap();
        assert_eq!(search.previous_match_to(first), search.last_match());
    }

    #[test]
    fn test_single_match_cycles_onto_itself() {
        let search = TextSearch::new(&store(&["one cat"]), "cat", true);
        let only = search.first_match().unwrap();
        assert_eq!(search.next_match_to(only), Some(only));
        assert_eq!(search.previous_match_to(only), Some(only));
    }

    #[test]
    fn test_navigator_begin_then_cycle() {
        let search = TextSearch::new(&store(&["cat cat"]), "cat", true);
        let mut nav = SearchNavigator::new(search);

        let step = nav.begin();
        assert_eq!(step, SearchStep { clear: None, set: Some(loc(0, 0, 3)) });

        let step = nav.next();
        assert_eq!(step.clear, Some(loc(0, 0, 3)));
        assert_eq!(step.set, Some(loc(0, 4, 3)));

        // Wraps back to the first match, clearing the last.
        let step = nav.next();
        assert_eq!(step.clear, Some(loc(0, 4, 3)));
        assert_eq!(step.set, Some(loc(0, 0, 3)));

        let step = nav.previous();
        assert_eq!(step.clear, Some(loc(0, 0, 3)));
        assert_eq!(step.set, Some(loc(0, 4, 3)));
    }

    #[test]
    fn test_navigator_does_not_start_implicitly() {
        let search = TextSearch::new(&store(&["cat"]), "cat", true);
        let mut nav = SearchNavigator::new(search);
        assert_eq!(nav.next(), SearchStep::default());
        assert_eq!(nav.previous(), SearchStep::default());
        assert_eq!(nav.current(), None);
    }

    #[test]
    fn test_navigator_begin_with_no_matches() {
        let search = TextSearch::new(&store(&["dog"]), "cat", true);
        let mut nav = SearchNavigator::new(search);
        assert_eq!(nav.begin(), SearchStep::default());
        assert_eq!(nav.next(), SearchStep::default());
    }
}
