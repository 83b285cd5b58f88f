//! # kani-harness-parser
//!
//! Finds Kani proof harnesses in Rust source and describes them for
//! verifier tooling.
//!
//! This crate provides:
//! - Harness extraction from a tree-sitter syntax tree, covering stacked
//!   `#[kani::*]` attributes and composite `#[cfg_attr(kani, ...)]` forms
//! - Module path resolution and qualified names for `--harness` targeting
//! - `cargo kani` verify and concrete-playback command descriptions, and a
//!   parser for verifier output
//! - CLI tool (`cargo kani-harnesses`) for listing harnesses in a tree
//!
//! ## Usage
//!
//! ```rust
//! use kani_harness_parser::{scan_source, ScanOptions};
//!
//! let source = "#[kani::proof]\n#[kani::unwind(4)]\nfn check() {}\n";
//! let scan = scan_source(source, ScanOptions::default());
//!
//! assert_eq!(scan.harnesses.len(), 1);
//! assert_eq!(scan.harnesses[0].name, "check");
//! assert_eq!(scan.harnesses[0].args.unwind.and_then(|u| u.value()), Some(4));
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod naming;
pub mod parser;
pub mod report;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

pub use command::{HarnessAction, VerifierCommand};
pub use config::{ModulePathStrategy, ScanOptions, VerifierConfig};
pub use error::{ConfigError, HarnessDesyncError, ScanError, VerifierOutputError};
pub use naming::{build_qualified_name, HarnessTarget, QualifiedName};
pub use parser::{HarnessMetadata, Position, SyntaxNode, SyntaxTree};
pub use report::{detect_output_error, parse_verifier_output, VerificationReport};

use parser::attributes::PROOF_MARKER;
use parser::syntax::kinds;

/// Result of scanning one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileScan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Valid harnesses ordered by line.
    pub harnesses: Vec<HarnessMetadata>,
    /// Harnesses whose recorded line did not match the text.
    pub desyncs: Vec<HarnessDesyncError>,
}

impl FileScan {
    pub fn has_desyncs(&self) -> bool {
        !self.desyncs.is_empty()
    }
}

/// Run the full pipeline over `text`. Malformed source yields an empty scan.
pub fn scan_source(text: &str, options: ScanOptions) -> FileScan {
    let tree = SyntaxTree::parse(text);
    let Some(root) = tree.root() else {
        return FileScan::default();
    };

    let mut harnesses = parser::extract_harnesses(&root);
    parser::normalize::attach_modules(&mut harnesses, &root, options.module_paths);
    let normalized = parser::normalize(harnesses, text);

    FileScan {
        path: None,
        harnesses: normalized.harnesses,
        desyncs: normalized.desyncs,
    }
}

/// [`scan_source`] for text already read from `path`.
pub fn scan_file(path: &Path, text: &str, options: ScanOptions) -> FileScan {
    let scan = scan_source(text, options);
    debug!(
        "scanned {}: {} harnesses, {} desyncs",
        path.display(),
        scan.harnesses.len(),
        scan.desyncs.len()
    );
    FileScan {
        path: Some(path.to_path_buf()),
        ..scan
    }
}

/// Read `path` and scan it.
pub fn scan_path(path: &Path, options: ScanOptions) -> Result<FileScan, ScanError> {
    let text = std::fs::read_to_string(path).map_err(|source| ScanError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(scan_file(path, &text, options))
}

/// Quick check for whether `text` carries any proof-marker attribute.
pub fn check_text_for_proofs(text: &str) -> bool {
    let tree = SyntaxTree::parse(text);
    tree.root().is_some_and(|root| {
        root.descendants_of_type(kinds::ATTRIBUTE_ITEM)
            .iter()
            .any(|attribute| attribute.text().contains(PROOF_MARKER))
    })
}
