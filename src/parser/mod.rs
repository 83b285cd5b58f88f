//! Harness parser
//!
//! This module contains:
//! - `syntax`: tree-sitter backed syntax tree and the `SyntaxNode` trait
//! - `attributes`: classifies Kani attributes and reads their arguments
//! - `harness`: finds proof harnesses and their attribute runs
//! - `modules`: resolves the module path enclosing each harness
//! - `normalize`: sorts, derives arguments and validates against the text

pub mod attributes;
pub mod harness;
pub mod modules;
pub mod normalize;
pub mod syntax;

pub use attributes::{
    classify, extract_solver_value, extract_unwind_value, AttributeKind, HarnessAttribute,
    UnwindBound, PROOF_MARKER,
};
pub use harness::{extract_harnesses, DerivedArgs, HarnessFlags, HarnessMetadata};
pub use modules::{concatenate_module_names, resolve_modules, ModuleMembership};
pub use normalize::{derive_args, normalize, validate_harness, Normalized};
pub use syntax::{Position, RustNode, SyntaxNode, SyntaxTree};
