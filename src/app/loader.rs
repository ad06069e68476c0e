// LogSlice - app/loader.rs
//
// Load lifecycle management. Runs ingestion + extraction on a
// background thread, sending progress messages to the host thread via
// an mpsc channel.
//
// Architecture:
//   - `LoadManager` lives on the host thread; `run_load` runs on a
//     background thread.
//   - An `Arc<AtomicBool>` cancel flag stops the load cooperatively;
//     the core ingestion pass polls it at its progress cadence.
//   - All cross-thread communication is via `LoadProgress` messages.
//   - Only one load is active at a time: starting a new load cancels
//     the previous one, and the host installs content only from a
//     `Completed` message, so a failed or cancelled load never
//     disturbs the visible content.

use crate::core::extract::{self, ExtractConfig};
use crate::core::model::LoadProgress;
use crate::util::constants;
use crate::util::error::LoadError;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

// =============================================================================
// LoadManager
// =============================================================================

/// The source of one load operation.
#[derive(Debug)]
pub enum LoadSource {
    /// Read from a file on disk.
    File(PathBuf),

    /// Text already in memory (e.g. pasted by the user).
    Text(String),
}

/// Manages a load operation on a background thread.
pub struct LoadManager {
    /// Channel receiver for the host to poll progress messages.
    pub progress_rx: Option<mpsc::Receiver<LoadProgress>>,

    /// Cancel flag shared with the background thread.
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl LoadManager {
    pub fn new() -> Self {
        Self {
            progress_rx: None,
            cancel_flag: None,
        }
    }

    /// Start loading a log file. Any load already in flight is
    /// cancelled first; progress arrives over the channel.
    pub fn start_load(&mut self, path: PathBuf) {
        self.start(LoadSource::File(path));
    }

    /// Start ingesting in-memory log text (paste-style ingestion).
    pub fn start_load_text(&mut self, text: String) {
        self.start(LoadSource::Text(text));
    }

    fn start(&mut self, source: LoadSource) {
        self.cancel_load();

        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));

        self.progress_rx = Some(rx);
        self.cancel_flag = Some(Arc::clone(&cancel));

        std::thread::spawn(move || {
            run_load(source, tx, cancel);
        });

        tracing::info!("Load started");
    }

    /// Request cancellation of the running load.
    /// The background thread will send `LoadProgress::Cancelled` and exit.
    pub fn cancel_load(&mut self) {
        if let Some(flag) = &self.cancel_flag {
            flag.store(true, Ordering::SeqCst);
        }
        self.cancel_flag = None;
    }

    /// Poll for progress messages without blocking. Returns all pending
    /// messages.
    pub fn poll_progress(&self) -> Vec<LoadProgress> {
        let mut messages = Vec::new();
        if let Some(ref rx) = self.progress_rx {
            while let Ok(msg) = rx.try_recv() {
                messages.push(msg);
            }
        }
        messages
    }
}

impl Default for LoadManager {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Background load pipeline
// =============================================================================

/// Full load pipeline: read → ingest lines → extract fragments.
///
/// Runs on a background thread. Sends `LoadProgress` messages to `tx`.
fn run_load(source: LoadSource, tx: mpsc::Sender<LoadProgress>, cancel: Arc<AtomicBool>) {
    macro_rules! send {
        ($msg:expr) => {
            if tx.send($msg).is_err() {
                return; // Receiver dropped (host gone); exit quietly.
            }
        };
    }

    let text = match source {
        LoadSource::File(path) => match read_log_file(&path) {
            Ok(text) => text,
            Err(e) => {
                let err = LoadError::Io {
                    path: Some(path),
                    source: e,
                };
                tracing::warn!(error = %err, "Load failed");
                send!(LoadProgress::Failed {
                    error: err.to_string(),
                });
                return;
            }
        },
        LoadSource::Text(text) => text,
    };

    let total_lines = text.lines().count();
    send!(LoadProgress::Started { total_lines });

    // Forward core progress reports onto the channel. Non-fatal: a
    // closed channel is detected on the next send! below.
    let tx_progress = tx.clone();
    let mut sink = |lines_processed: usize, total_lines: usize| {
        let _ = tx_progress.send(LoadProgress::Progress {
            lines_processed,
            total_lines,
        });
    };

    match extract::ingest_text(&text, &ExtractConfig::default(), &mut sink, &cancel) {
        Ok(content) => {
            tracing::info!(lines = content.line_count(), "Load complete");
            send!(LoadProgress::Completed { content });
        }
        Err(LoadError::Cancelled) => {
            tracing::info!("Load cancelled");
            send!(LoadProgress::Cancelled);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Load failed");
            send!(LoadProgress::Failed {
                error: e.to_string(),
            });
        }
    }
}

// =============================================================================
// File reading
// =============================================================================

/// Read the whole log file into a UTF-8 string.
///
/// Files at or above `LARGE_FILE_THRESHOLD` are memory-mapped and
/// validated in place, so the bytes are copied once instead of twice.
/// Smaller files go through `fs::read_to_string`, retried with backoff
/// when the filesystem reports a transient condition -- network shares
/// serving live logs intermittently return WouldBlock or TimedOut.
fn read_log_file(path: &Path) -> io::Result<String> {
    if std::fs::metadata(path)?.len() >= constants::LARGE_FILE_THRESHOLD {
        let file = std::fs::File::open(path)?;
        // SAFETY: read-only mapping, never mutated through the map. The
        // producer may still be appending to the file while it is
        // mapped; for viewing already-written log content that risk is
        // accepted.
        let mmap = unsafe { memmap2::Mmap::map(&file)? };
        return match std::str::from_utf8(&mmap) {
            Ok(text) => Ok(text.to_string()),
            Err(e) => Err(io::Error::new(io::ErrorKind::InvalidData, e)),
        };
    }

    let mut delays = constants::READ_RETRY_DELAYS_MS.iter();
    loop {
        match std::fs::read_to_string(path) {
            Ok(text) => return Ok(text),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock
                        | io::ErrorKind::Interrupted
                        | io::ErrorKind::TimedOut
                ) =>
            {
                // Retries are bounded by the backoff schedule.
                let Some(&delay_ms) = delays.next() else {
                    return Err(e);
                };
                tracing::debug!(
                    file = %path.display(),
                    delay_ms,
                    error = %e,
                    "Transient read error, retrying"
                );
                std::thread::sleep(Duration::from_millis(delay_ms));
            }
            Err(e) => return Err(e), // Permanent error; do not retry.
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::MarkupKind;
    use std::time::Instant;

    /// Drain messages until a terminal one arrives or the deadline passes.
    fn collect_until_terminal(manager: &LoadManager) -> Vec<LoadProgress> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut messages = Vec::new();
        while Instant::now() < deadline {
            for msg in manager.poll_progress() {
                let terminal = matches!(
                    msg,
                    LoadProgress::Completed { .. }
                        | LoadProgress::Failed { .. }
                        | LoadProgress::Cancelled
                );
                messages.push(msg);
                if terminal {
                    return messages;
                }
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        messages
    }

    #[test]
    fn test_text_load_completes_with_content() {
        let mut manager = LoadManager::new();
        manager.start_load_text("foo\n{\"a\":1}\nbar".to_string());

        let messages = collect_until_terminal(&manager);
        assert!(matches!(
            messages.first(),
            Some(LoadProgress::Started { total_lines: 3 })
        ));

        let Some(LoadProgress::Completed { content }) = messages.last() else {
            panic!("expected Completed, got {:?}", messages.last());
        };
        assert_eq!(content.line_count(), 3);
        assert!(content.has_fragment(1, MarkupKind::Json));
    }

    #[test]
    fn test_missing_file_fails_load() {
        let mut manager = LoadManager::new();
        manager.start_load(PathBuf::from("/nonexistent/logslice-test.log"));

        let messages = collect_until_terminal(&manager);
        assert!(matches!(
            messages.last(),
            Some(LoadProgress::Failed { .. })
        ));
    }

    #[test]
    fn test_file_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "one\n<a>two</a>\nthree").unwrap();

        let mut manager = LoadManager::new();
        manager.start_load(path);

        let messages = collect_until_terminal(&manager);
        let Some(LoadProgress::Completed { content }) = messages.last() else {
            panic!("expected Completed, got {:?}", messages.last());
        };
        assert_eq!(content.line_count(), 3);
        assert!(content.has_fragment(1, MarkupKind::Xml));
    }
}
