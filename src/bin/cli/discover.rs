//! Source discovery
//!
//! Walks the given paths for `.rs` files and scans each one.

use std::path::{Path, PathBuf};

use kani_harness_parser::{scan_path, FileScan, ScanError, ScanOptions};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

const SKIPPED_DIRS: [&str; 3] = ["target", ".git", ".cargo"];

/// Scans of every discovered file, plus the files that could not be read.
#[derive(Debug, Default)]
pub struct Discovery {
    pub scans: Vec<FileScan>,
    pub errors: Vec<ScanError>,
}

/// All `.rs` files under `roots`, sorted. A root that is itself a file is
/// taken as is.
pub fn discover_sources(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for root in roots {
        for entry in WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e))
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("skipping unreadable entry: {}", err);
                    None
                }
            })
        {
            if entry.file_type().is_file() && is_rust_source(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }

    files.sort();
    files.dedup();
    files
}

/// Scan every source under `roots`. Files without harnesses or desyncs are
/// left out of `scans`.
pub fn scan_sources(roots: &[PathBuf], options: ScanOptions) -> Discovery {
    let mut discovery = Discovery::default();

    for path in discover_sources(roots) {
        match scan_path(&path, options) {
            Ok(scan) if scan.harnesses.is_empty() && scan.desyncs.is_empty() => {
                debug!("no harnesses in {}", path.display());
            }
            Ok(scan) => discovery.scans.push(scan),
            Err(e) => {
                warn!("{}", e);
                discovery.errors.push(e);
            }
        }
    }

    discovery
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

fn is_rust_source(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("rs")
}
