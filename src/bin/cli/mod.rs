//! CLI module for cargo-kani-harnesses
//!
//! Handles source discovery, harness filtering, and output formatting

pub mod discover;
pub mod filters;
pub mod output;

pub use discover::*;
pub use filters::*;
pub use output::*;
