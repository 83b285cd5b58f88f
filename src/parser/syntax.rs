//! Concrete syntax tree access
//!
//! Wraps tree-sitter's Rust grammar behind the small [`SyntaxNode`] capability
//! set the extractor and module resolver are written against. The grammar is
//! loaded once per process; parsers are cheap and created per call.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use tree_sitter::{Language, Node, Parser, Point, Tree};

/// Node kinds of the tree-sitter Rust grammar used by the parser.
pub mod kinds {
    pub const ATTRIBUTE_ITEM: &str = "attribute_item";
    pub const FUNCTION_ITEM: &str = "function_item";
    pub const MOD_ITEM: &str = "mod_item";
}

static RUST_LANGUAGE: OnceLock<Language> = OnceLock::new();

/// Zero-based source location. `column` is a byte offset within the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl From<Point> for Position {
    fn from(point: Point) -> Self {
        Position {
            row: point.row,
            column: point.column,
        }
    }
}

/// The capabilities the harness parser needs from a syntax tree node.
///
/// Any parser binding can back the extractor by implementing this trait.
pub trait SyntaxNode: Clone {
    /// Grammar node kind, e.g. `function_item`.
    fn kind(&self) -> &str;

    /// Source text covered by the node.
    fn text(&self) -> &str;

    fn start_position(&self) -> Position;

    fn end_position(&self) -> Position;

    /// Named children in source order.
    fn named_children(&self) -> Vec<Self>;

    fn child_by_field_name(&self, field: &str) -> Option<Self>;

    /// The whole source line holding the start of this node, without its
    /// line break.
    fn line_text(&self) -> &str;

    /// All named descendants of the given kind in preorder, excluding `self`.
    ///
    /// Walks with an explicit stack so deeply nested input cannot overflow
    /// the call stack.
    fn descendants_of_type(&self, kind: &str) -> Vec<Self> {
        let mut found = Vec::new();
        let mut stack: Vec<Self> = self.named_children().into_iter().rev().collect();

        while let Some(node) = stack.pop() {
            if node.kind() == kind {
                found.push(node.clone());
            }
            stack.extend(node.named_children().into_iter().rev());
        }

        found
    }
}

/// A tree-sitter node paired with the source it was parsed from.
#[derive(Debug, Clone, Copy)]
pub struct RustNode<'tree> {
    node: Node<'tree>,
    source: &'tree str,
}

impl<'tree> RustNode<'tree> {
    pub fn inner(&self) -> Node<'tree> {
        self.node
    }
}

impl SyntaxNode for RustNode<'_> {
    fn kind(&self) -> &str {
        self.node.kind()
    }

    fn text(&self) -> &str {
        self.source.get(self.node.byte_range()).unwrap_or("")
    }

    fn start_position(&self) -> Position {
        self.node.start_position().into()
    }

    fn end_position(&self) -> Position {
        self.node.end_position().into()
    }

    fn named_children(&self) -> Vec<Self> {
        let mut cursor = self.node.walk();
        self.node
            .named_children(&mut cursor)
            .map(|node| RustNode {
                node,
                source: self.source,
            })
            .collect()
    }

    fn child_by_field_name(&self, field: &str) -> Option<Self> {
        self.node.child_by_field_name(field).map(|node| RustNode {
            node,
            source: self.source,
        })
    }

    fn line_text(&self) -> &str {
        let start = self.node.start_byte();
        let (Some(before), Some(after)) = (self.source.get(..start), self.source.get(start..))
        else {
            return "";
        };
        let begin = before.rfind('\n').map_or(0, |i| i + 1);
        let end = after.find('\n').map_or(self.source.len(), |i| start + i);
        self.source
            .get(begin..end)
            .unwrap_or("")
            .trim_end_matches('\r')
    }
}

/// Parsed source file.
///
/// A tree that could not be produced is represented as a degenerate tree
/// with no root; callers treat it exactly like a file without harnesses.
pub struct SyntaxTree<'src> {
    source: &'src str,
    tree: Option<Tree>,
}

impl<'src> SyntaxTree<'src> {
    /// Parse `source` with the Rust grammar. Never fails.
    pub fn parse(source: &'src str) -> Self {
        let tree = new_parser().and_then(|mut parser| parser.parse(source, None));
        if tree.is_none() {
            warn!("tree-sitter produced no tree; treating source as empty");
        }
        SyntaxTree { source, tree }
    }

    /// Root node, or `None` for a degenerate tree.
    pub fn root(&self) -> Option<RustNode<'_>> {
        self.tree.as_ref().map(|tree| RustNode {
            node: tree.root_node(),
            source: self.source,
        })
    }

    /// True when the tree has no named children at all.
    pub fn is_empty(&self) -> bool {
        self.root()
            .map(|root| root.inner().named_child_count() == 0)
            .unwrap_or(true)
    }
}

/// The process-wide Rust grammar, loaded on first use.
pub fn rust_language() -> &'static Language {
    RUST_LANGUAGE.get_or_init(|| {
        debug!("loading tree-sitter Rust grammar");
        tree_sitter_rust::LANGUAGE.into()
    })
}

fn new_parser() -> Option<Parser> {
    let mut parser = Parser::new();
    match parser.set_language(rust_language()) {
        Ok(()) => Some(parser),
        Err(e) => {
            warn!("failed to load Rust grammar: {}", e);
            None
        }
    }
}
