// LogSlice - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation; all errors keep the causal
// chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all LogSlice operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum LogSliceError {
    /// Loading or ingesting a log failed (or was cancelled).
    Load(LoadError),

    /// Exporting the fragment index failed.
    Export(ExportError),
}

impl fmt::Display for LogSliceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(e) => write!(f, "Load error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
        }
    }
}

impl std::error::Error for LogSliceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(e) => Some(e),
            Self::Export(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

/// Errors raised while reading and ingesting a log.
///
/// Per-line extraction failures are NOT errors: an unbalanced tag or
/// bracket simply means "no fragment at this line" and the pass continues.
#[derive(Debug)]
pub enum LoadError {
    /// The source could not be read. Fatal to this load; previously
    /// visible content (if any) is left untouched.
    Io {
        path: Option<PathBuf>,
        source: io::Error,
    },

    /// The load was cancelled cooperatively. A normal abort path: no
    /// partial line store or markup index is ever exposed.
    Cancelled,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path: Some(p), source } => {
                write!(f, "Cannot read '{}': {source}", p.display())
            }
            Self::Io { path: None, source } => {
                write!(f, "Cannot read log text: {source}")
            }
            Self::Cancelled => write!(f, "Load cancelled"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Cancelled => None,
        }
    }
}

impl From<LoadError> for LogSliceError {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors raised while exporting the fragment index.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for LogSliceError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

/// Convenience type alias for LogSlice results.
pub type Result<T> = std::result::Result<T, LogSliceError>;
