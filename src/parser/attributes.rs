//! Kani attribute classification
//!
//! Decides what a single attribute means for a harness: the proof marker
//! itself, a modifier (unwind bound, solver, stub, should-panic, cover), a
//! unit-test marker, or something unrecognized that is kept verbatim.
//!
//! Composite attributes such as
//! `#[cfg_attr(kani, kani::proof, kani::unwind(4))]` bundle several
//! directives in one node. They are split with `syn` and every directive is
//! classified on its own.

use std::sync::OnceLock;

use proc_macro2::TokenStream;
use quote::ToTokens;
use regex::Regex;
use serde::Serialize;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ExprLit, Ident, Lit, LitStr, Meta, MetaNameValue, Token};

/// Substring marking a function as a verification harness.
pub const PROOF_MARKER: &str = "kani::proof";
/// Prefix shared by every verifier attribute.
pub const TOOL_PREFIX: &str = "kani::";

const UNWIND_MARKER: &str = "kani::unwind";
const SOLVER_MARKER: &str = "kani::solver";
const STUB_MARKER: &str = "kani::stub";
const SHOULD_PANIC_MARKER: &str = "kani::should_panic";
const COVER_MARKER: &str = "kani::cover";

static UNWIND_RE: OnceLock<Regex> = OnceLock::new();
static SOLVER_RE: OnceLock<Regex> = OnceLock::new();
static DIGITS_RE: OnceLock<Regex> = OnceLock::new();

fn unwind_re() -> &'static Regex {
    UNWIND_RE.get_or_init(|| Regex::new(r"unwind\s*\(([^)]*)\)").expect("valid regex"))
}

fn solver_re() -> &'static Regex {
    SOLVER_RE.get_or_init(|| Regex::new(r"solver\s*\(([^)]*)\)").expect("valid regex"))
}

fn digits_re() -> &'static Regex {
    DIGITS_RE.get_or_init(|| Regex::new(r"\d+").expect("valid regex"))
}

/// Loop unwinding bound requested by a harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnwindBound {
    Bounded(u32),
    /// `unwind` was present but carried no usable number.
    Unspecified,
}

impl UnwindBound {
    pub fn value(&self) -> Option<u32> {
        match self {
            UnwindBound::Bounded(n) => Some(*n),
            UnwindBound::Unspecified => None,
        }
    }
}

/// What a single (possibly decomposed) attribute means for a harness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    ProofMarker,
    TestMarker,
    UnwindBound(UnwindBound),
    SolverChoice(String),
    StubDirective,
    ShouldPanic,
    CoverDirective,
    Unrecognized,
}

/// Classify attribute text. Composite attributes are not split here; use
/// [`HarnessAttribute::directives`] for that.
pub fn classify(text: &str) -> AttributeKind {
    if text.contains(PROOF_MARKER) {
        AttributeKind::ProofMarker
    } else if text.contains(UNWIND_MARKER) && unwind_re().is_match(text) {
        AttributeKind::UnwindBound(extract_unwind_value(text))
    } else if text.contains(SOLVER_MARKER) {
        AttributeKind::SolverChoice(extract_solver_value(text).unwrap_or_default())
    } else if text.contains(STUB_MARKER) {
        AttributeKind::StubDirective
    } else if text.contains(SHOULD_PANIC_MARKER) {
        AttributeKind::ShouldPanic
    } else if text.contains(COVER_MARKER) {
        AttributeKind::CoverDirective
    } else if is_test_marker(text) {
        AttributeKind::TestMarker
    } else {
        AttributeKind::Unrecognized
    }
}

/// Extract the unwind bound from text containing `unwind(...)`.
///
/// The bound is the first run of digits inside the parentheses. Anything
/// else, including a missing marker, is [`UnwindBound::Unspecified`].
pub fn extract_unwind_value(text: &str) -> UnwindBound {
    let Some(payload) = unwind_re()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
    else {
        return UnwindBound::Unspecified;
    };

    digits_re()
        .find(payload)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .map_or(UnwindBound::Unspecified, UnwindBound::Bounded)
}

/// Extract the solver name from text containing `solver(...)`.
///
/// Accepts a bare name (`kissat`), a string literal (`"kissat"`) or a
/// binary (`bin = "kissat"`) and returns the name or literal value. A
/// payload in none of those forms is returned trimmed. `None` when there is
/// no solver marker.
pub fn extract_solver_value(text: &str) -> Option<String> {
    let payload = solver_re().captures(text)?.get(1)?.as_str().trim();
    Some(parse_solver_payload(payload).unwrap_or_else(|| payload.to_string()))
}

fn parse_solver_payload(payload: &str) -> Option<String> {
    if let Ok(lit) = syn::parse_str::<LitStr>(payload) {
        return Some(lit.value());
    }
    if let Ok(ident) = syn::parse_str::<Ident>(payload) {
        return Some(ident.to_string());
    }

    let MetaNameValue { path, value, .. } = syn::parse_str::<MetaNameValue>(payload).ok()?;
    if !path.is_ident("bin") {
        return None;
    }
    match value {
        Expr::Lit(ExprLit {
            lit: Lit::Str(lit), ..
        }) => Some(lit.value()),
        _ => None,
    }
}

/// True for a conventional unit-test marker: `#[test]` or a bare `test`
/// directive taken out of a composite attribute.
pub fn is_test_marker(text: &str) -> bool {
    if let Some(attr) = parse_attribute(text) {
        return matches!(attr.meta, Meta::Path(ref path) if path.is_ident("test"));
    }
    compact(text) == "test" || compact(text) == "#[test]"
}

/// A single attribute attached to a harness, exactly as written in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessAttribute {
    raw_text: String,
}

impl HarnessAttribute {
    pub fn new(raw_text: impl Into<String>) -> Self {
        HarnessAttribute {
            raw_text: raw_text.into(),
        }
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn into_raw_text(self) -> String {
        self.raw_text
    }

    /// Classification of the attribute as a whole.
    pub fn kind(&self) -> AttributeKind {
        classify(&self.raw_text)
    }

    /// Whether this is a `cfg_attr` bundling verifier directives.
    pub fn is_composite(&self) -> bool {
        composite_directives(&self.raw_text).is_some()
    }

    /// One kind per logical directive: the constituents of a composite
    /// attribute, or the attribute itself otherwise.
    pub fn directives(&self) -> Vec<AttributeKind> {
        match composite_directives(&self.raw_text) {
            Some(directives) => directives.iter().map(|d| classify(d)).collect(),
            None => vec![self.kind()],
        }
    }

    /// True only for a plain `#[kani::proof]`.
    ///
    /// Bare markers are not recorded in a harness's attribute list;
    /// composites carrying the marker are.
    pub fn is_bare_proof_marker(&self) -> bool {
        match parse_attribute(&self.raw_text) {
            Some(attr) => {
                matches!(attr.meta, Meta::Path(ref path) if path_matches(path, &["kani", "proof"]))
            }
            None => compact(&self.raw_text) == "#[kani::proof]",
        }
    }
}

/// Directives bundled inside a `#[cfg_attr(predicate, d1, d2, ...)]` that
/// mentions the verifier, rendered as compact text. The predicate is not
/// included.
///
/// Returns `None` for anything that is not such a composite, including
/// attributes `syn` cannot parse.
pub fn composite_directives(text: &str) -> Option<Vec<String>> {
    if !text.contains(TOOL_PREFIX) {
        return None;
    }

    let attr = parse_attribute(text)?;
    if !attr.path().is_ident("cfg_attr") {
        return None;
    }

    let metas = attr
        .parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
        .ok()?;

    Some(
        metas
            .iter()
            .skip(1)
            .map(|meta| compact_tokens(&meta.to_token_stream()))
            .collect(),
    )
}

/// Parse text holding exactly one outer attribute.
fn parse_attribute(text: &str) -> Option<Attribute> {
    let attrs = syn::parse::Parser::parse_str(Attribute::parse_outer, text.trim()).ok()?;
    let mut iter = attrs.into_iter();
    let attr = iter.next()?;
    if iter.next().is_some() {
        return None;
    }
    Some(attr)
}

fn path_matches(path: &syn::Path, segments: &[&str]) -> bool {
    path.segments.len() == segments.len()
        && path
            .segments
            .iter()
            .zip(segments)
            .all(|(segment, expected)| segment.ident == expected)
}

fn compact_tokens(tokens: &TokenStream) -> String {
    compact(&tokens.to_string())
}

fn compact(text: &str) -> String {
    text.split_whitespace().collect()
}
