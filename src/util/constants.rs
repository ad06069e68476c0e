// LogSlice - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogSlice";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Ingestion
// =============================================================================

/// How often (in lines) the ingestion pass reports progress to its sink
/// and polls the cancel flag. A final report is always made with
/// `lines_processed == total_lines` regardless of cadence alignment.
pub const PROGRESS_LINE_CADENCE: usize = 100;

/// File size in bytes above which the loader reads via memory mapping
/// instead of copying the whole file into a heap buffer.
pub const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100 MB

/// Backoff schedule for transient I/O errors while reading a log file.
/// The number of entries bounds the number of retries.
pub const READ_RETRY_DELAYS_MS: [u64; 3] = [50, 100, 200];

// =============================================================================
// Extraction
// =============================================================================

/// Maximum number of lines a fragment candidate may scan ahead of its
/// start line before the candidate is abandoned as unbalanced. Bounds the
/// cost of red herrings in pathological files; a genuine fragment larger
/// than this window is reported as "no fragment".
pub const DEFAULT_SCAN_WINDOW_LINES: usize = 200;

/// How often (in lines) the extraction driver polls the cancel flag.
pub const EXTRACT_CANCEL_CHECK_LINES: usize = 100;

// =============================================================================
// Pretty rendering
// =============================================================================

/// Indentation width (spaces) per nesting level in pretty-printed XML.
pub const PRETTY_XML_INDENT: usize = 2;

// =============================================================================
// Logging
// =============================================================================

/// Default log level when neither RUST_LOG nor --debug is given.
pub const DEFAULT_LOG_LEVEL: &str = "info";
