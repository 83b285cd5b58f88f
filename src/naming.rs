//! Qualified harness names for verifier targeting
//!
//! A bare harness name may match several functions in a crate, so the
//! verifier is first given a narrower candidate built from the file stem and
//! module path. The candidate is a heuristic and can miss; the bare name is
//! always available as the fallback.

use std::path::Path;

use serde::Serialize;

use crate::parser::HarnessMetadata;

/// File stems that sit at the root of their module and add no path segment.
const ROOT_FILE_STEMS: [&str; 3] = ["main", "lib", "mod"];

/// A qualified harness name candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualifiedName {
    pub candidate: String,
    /// Whether the module path contributed to `candidate`.
    pub used_module: bool,
}

/// Build the qualified name for `name` declared in `file`.
pub fn build_qualified_name(name: &str, module: Option<&str>, file: &Path) -> QualifiedName {
    let module = module.filter(|m| !m.is_empty());
    let stem = file
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty() && !ROOT_FILE_STEMS.contains(s));

    let mut segments = Vec::with_capacity(3);
    segments.extend(stem);
    segments.extend(module);
    segments.push(name);

    QualifiedName {
        candidate: segments.join("::"),
        used_module: module.is_some(),
    }
}

/// Both names a harness can be targeted by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarnessTarget {
    pub qualified: QualifiedName,
    pub unqualified: String,
}

impl HarnessTarget {
    pub fn new(harness: &HarnessMetadata, file: &Path) -> Self {
        HarnessTarget {
            qualified: build_qualified_name(&harness.name, harness.module.as_deref(), file),
            unqualified: harness.name.clone(),
        }
    }

    /// Names to try, in order. The bare name is only listed when it differs
    /// from the qualified candidate.
    pub fn attempts(&self) -> Vec<&str> {
        let mut attempts = vec![self.qualified.candidate.as_str()];
        if self.unqualified != self.qualified.candidate {
            attempts.push(self.unqualified.as_str());
        }
        attempts
    }
}
