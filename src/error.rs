//! Error types for harness scanning, configuration and verifier output.

use std::path::PathBuf;

use serde::Serialize;

/// Recorded harness position no longer matches the source text.
///
/// Raised when the line at `row` does not equal the function line captured
/// at extraction time. Downstream consumers target harnesses by line, so a
/// desync must never be silently mapped onto the wrong line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("harness '{harness}' desynced at line {}: expected `{expected}`, found `{found}`", .row + 1)]
pub struct HarnessDesyncError {
    /// Name of the harness whose position is stale.
    pub harness: String,
    /// Zero-based row recorded for the harness.
    pub row: usize,
    /// The function line captured at extraction time.
    pub expected: String,
    /// The trimmed text actually found at `row` (empty if out of range).
    pub found: String,
}

/// Errors that can occur while reading a file for scanning.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur when loading a verifier configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures reported by the verifier itself rather than by a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum VerifierOutputError {
    /// The harness filter matched nothing. Callers retry with the
    /// unqualified harness name when they see this.
    #[error("no harness matched the filter `{filter}`")]
    NoHarnessMatched { filter: String },

    /// The crate under verification failed to compile.
    #[error("compilation failed: {message}")]
    CompilationFailed { message: String },
}
