//! Metadata normalization
//!
//! Joins extracted harnesses with their module paths, orders them by line,
//! fills in the typed unwind and solver arguments, and checks every record
//! against the text it was parsed from.

use tracing::warn;

use super::attributes::{AttributeKind, HarnessAttribute};
use super::harness::{DerivedArgs, HarnessMetadata};
use super::modules::{ancestor_module_paths, resolve_modules};
use super::syntax::SyntaxNode;
use crate::config::ModulePathStrategy;
use crate::error::HarnessDesyncError;

/// Harnesses that passed validation and the ones that did not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    pub harnesses: Vec<HarnessMetadata>,
    pub desyncs: Vec<HarnessDesyncError>,
}

/// Sort, derive arguments and validate against `text`.
///
/// Records are ordered by row (stable for ties). A record whose line no
/// longer matches is moved to `desyncs`; the others are still returned.
pub fn normalize(mut harnesses: Vec<HarnessMetadata>, text: &str) -> Normalized {
    harnesses.sort_by_key(|harness| harness.end_position.row);

    let mut normalized = Normalized::default();
    for mut harness in harnesses {
        harness.args = derive_args(&harness.attributes);
        match validate_harness(&harness, text) {
            Ok(()) => normalized.harnesses.push(harness),
            Err(desync) => {
                warn!("{}", desync);
                normalized.desyncs.push(desync);
            }
        }
    }

    normalized
}

/// Fold the unwind and solver directives of `attributes` into typed
/// arguments. Later directives override earlier ones.
pub fn derive_args(attributes: &[String]) -> DerivedArgs {
    let mut args = DerivedArgs::default();

    for attribute in attributes {
        for directive in HarnessAttribute::new(attribute.as_str()).directives() {
            match directive {
                AttributeKind::UnwindBound(bound) => args.unwind = Some(bound),
                AttributeKind::SolverChoice(solver) => args.solver = Some(solver),
                _ => {}
            }
        }
    }

    args
}

/// Check that the line at the harness's recorded row still holds its
/// function declaration.
pub fn validate_harness(harness: &HarnessMetadata, text: &str) -> Result<(), HarnessDesyncError> {
    let row = harness.end_position.row;
    let found = text.lines().nth(row).map(str::trim).unwrap_or("");

    if found == harness.full_line {
        Ok(())
    } else {
        Err(HarnessDesyncError {
            harness: harness.name.clone(),
            row,
            expected: harness.full_line.clone(),
            found: found.to_string(),
        })
    }
}

/// Set each harness's `module` using the given strategy. Harnesses at file
/// top level keep `None`.
pub fn attach_modules<N: SyntaxNode>(
    harnesses: &mut [HarnessMetadata],
    root: &N,
    strategy: ModulePathStrategy,
) {
    match strategy {
        ModulePathStrategy::ReverseIndex => {
            let paths = resolve_modules(root);
            for harness in harnesses {
                harness.module = paths.get(&harness.name).cloned();
            }
        }
        ModulePathStrategy::AncestorChain => {
            let paths = ancestor_module_paths(root);
            for harness in harnesses {
                harness.module = paths.get(&harness.end_position).cloned();
            }
        }
    }
}
