// LogSlice - app/state.rs
//
// Application state management. Holds the visible log content, the
// load manager, and the active search session. Owned by the host
// (the CLI here; a GUI would own it the same way).

use crate::app::loader::LoadManager;
use crate::core::model::{LoadProgress, LogContent};
use crate::core::search::{SearchNavigator, SearchStep, TextSearch};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level application state.
pub struct AppState {
    /// The currently visible content. Replaced only when a load fully
    /// completes (atomic swap); a failed or cancelled load leaves the
    /// previous content untouched.
    pub content: Option<Arc<LogContent>>,

    /// Background load manager.
    pub loader: LoadManager,

    /// Whether a load is currently in flight.
    pub load_in_progress: bool,

    /// Most recent progress report (lines_processed, total_lines).
    pub last_progress: Option<(usize, usize)>,

    /// Status message for the host to display.
    pub status_message: String,

    /// Active search session over `content`, if any.
    search: Option<SearchNavigator>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            content: None,
            loader: LoadManager::new(),
            load_in_progress: false,
            last_progress: None,
            status_message: "Ready. Open a log file to begin.".to_string(),
            search: None,
        }
    }

    /// Start loading a log file, cancelling any load in flight.
    pub fn start_load(&mut self, path: PathBuf) {
        self.loader.start_load(path);
        self.load_in_progress = true;
        self.last_progress = None;
        self.status_message = "Loading...".to_string();
    }

    /// Start ingesting pasted log text.
    pub fn start_load_text(&mut self, text: String) {
        self.loader.start_load_text(text);
        self.load_in_progress = true;
        self.last_progress = None;
        self.status_message = "Loading pasted text...".to_string();
    }

    /// Request cancellation of the in-flight load.
    pub fn cancel_load(&mut self) {
        self.loader.cancel_load();
    }

    /// Apply pending loader messages. Returns true when the visible
    /// content changed (a load completed).
    pub fn pump(&mut self) -> bool {
        let mut swapped = false;
        for msg in self.loader.poll_progress() {
            match msg {
                LoadProgress::Started { total_lines } => {
                    self.last_progress = Some((0, total_lines));
                }
                LoadProgress::Progress {
                    lines_processed,
                    total_lines,
                } => {
                    self.last_progress = Some((lines_processed, total_lines));
                }
                LoadProgress::Completed { content } => {
                    // The one mutation point: swap in the fully built
                    // content and drop the stale search session.
                    self.status_message = format!("Loaded {} lines", content.line_count());
                    self.content = Some(Arc::new(content));
                    self.search = None;
                    self.load_in_progress = false;
                    swapped = true;
                }
                LoadProgress::Failed { error } => {
                    // Previously visible content stays as it was.
                    self.status_message = error;
                    self.load_in_progress = false;
                }
                LoadProgress::Cancelled => {
                    self.status_message = "Load cancelled".to_string();
                    self.load_in_progress = false;
                }
            }
        }
        swapped
    }

    /// Start a new search over the visible content and position on its
    /// first match. Returns the highlight step for the renderer.
    pub fn begin_search(&mut self, query: &str, case_sensitive: bool) -> SearchStep {
        let Some(content) = &self.content else {
            return SearchStep::default();
        };
        let search = TextSearch::new(content.store(), query, case_sensitive);
        let mut navigator = SearchNavigator::new(search);
        let step = navigator.begin();
        self.search = Some(navigator);
        step
    }

    /// Advance the active search to its next match (cyclic).
    pub fn search_next(&mut self) -> SearchStep {
        self.search
            .as_mut()
            .map(SearchNavigator::next)
            .unwrap_or_default()
    }

    /// Step the active search back to its previous match (cyclic).
    pub fn search_previous(&mut self) -> SearchStep {
        self.search
            .as_mut()
            .map(SearchNavigator::previous)
            .unwrap_or_default()
    }

    /// The active search session, if any.
    pub fn search(&self) -> Option<&SearchNavigator> {
        self.search.as_ref()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::MarkupKind;
    use std::time::{Duration, Instant};

    /// Pump until the in-flight load settles or the deadline passes.
    fn pump_until_settled(state: &mut AppState) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while state.load_in_progress && Instant::now() < deadline {
            state.pump();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_completed_load_swaps_content() {
        let mut state = AppState::new();
        state.start_load_text("foo\n{\"a\":1}\nbar".to_string());
        pump_until_settled(&mut state);

        let content = state.content.as_ref().expect("content installed");
        assert_eq!(content.line_count(), 3);
        assert!(content.has_fragment(1, MarkupKind::Json));
        assert_eq!(state.status_message, "Loaded 3 lines");
    }

    #[test]
    fn test_failed_load_retains_previous_content() {
        let mut state = AppState::new();
        state.start_load_text("first content".to_string());
        pump_until_settled(&mut state);
        assert!(state.content.is_some());

        state.start_load(PathBuf::from("/nonexistent/logslice-test.log"));
        pump_until_settled(&mut state);

        let content = state.content.as_ref().expect("previous content retained");
        assert_eq!(content.line(0), Some("first content"));
        assert!(!state.load_in_progress);
    }

    #[test]
    fn test_new_load_replaces_old_content() {
        let mut state = AppState::new();
        state.start_load_text("old".to_string());
        pump_until_settled(&mut state);

        state.start_load_text("new line one\nnew line two".to_string());
        pump_until_settled(&mut state);

        let content = state.content.as_ref().unwrap();
        assert_eq!(content.line_count(), 2);
        assert_eq!(content.line(0), Some("new line one"));
    }

    #[test]
    fn test_search_requires_content() {
        let mut state = AppState::new();
        assert_eq!(state.begin_search("cat", false), SearchStep::default());
        assert_eq!(state.search_next(), SearchStep::default());
    }

    #[test]
    fn test_search_session_over_loaded_content() {
        let mut state = AppState::new();
        state.start_load_text("cat\ndog\ncat".to_string());
        pump_until_settled(&mut state);

        let step = state.begin_search("cat", false);
        let first = step.set.expect("first match");
        assert_eq!(first.line, 0);

        let step = state.search_next();
        assert_eq!(step.clear, Some(first));
        assert_eq!(step.set.map(|l| l.line), Some(2));

        // Wraps back to the first match.
        let step = state.search_next();
        assert_eq!(step.set, Some(first));
    }

    #[test]
    fn test_completed_load_drops_stale_search() {
        let mut state = AppState::new();
        state.start_load_text("cat".to_string());
        pump_until_settled(&mut state);
        state.begin_search("cat", false);
        assert!(state.search().is_some());

        state.start_load_text("dog".to_string());
        pump_until_settled(&mut state);
        assert!(state.search().is_none());
    }
}
