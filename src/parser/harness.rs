//! Harness discovery
//!
//! Walks the syntax tree and turns every run of attributes that starts with
//! a proof marker and ends at a function into one [`HarnessMetadata`].

use serde::Serialize;
use tracing::{debug, trace, warn};

use super::attributes::{
    is_test_marker, AttributeKind, HarnessAttribute, UnwindBound, PROOF_MARKER, TOOL_PREFIX,
};
use super::syntax::{kinds, Position, SyntaxNode};

/// Flags derived from a harness's attributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HarnessFlags {
    /// Annotated as a verification harness.
    pub is_proof: bool,
    /// Also declared as a unit test, either by a preceding `#[test]` or a
    /// `test` directive inside a composite attribute.
    pub is_test_style: bool,
    /// Carries at least one stub directive.
    pub has_stub: bool,
}

/// Typed values read out of the harness's attribute text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivedArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unwind: Option<UnwindBound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver: Option<String>,
}

/// One verification harness found in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarnessMetadata {
    /// Function name. Unique within a file and module, not globally.
    pub name: String,
    /// Trimmed source line holding the function name.
    pub full_line: String,
    /// End of the function name token.
    pub end_position: Position,
    /// Verifier attributes in source order, excluding the bare proof marker.
    pub attributes: Vec<String>,
    pub flags: HarnessFlags,
    pub args: DerivedArgs,
    /// `::`-separated enclosing module path, `None` at file top level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
}

/// Find every harness in the tree rooted at `root`, in discovery order.
///
/// Each node's named children are scanned as one sibling list, and every
/// named child is visited in turn, so harnesses inside nested modules and
/// blocks are found at any depth.
pub fn extract_harnesses<N: SyntaxNode>(root: &N) -> Vec<HarnessMetadata> {
    let mut harnesses = Vec::new();
    let mut stack = vec![root.clone()];

    while let Some(node) = stack.pop() {
        let children = node.named_children();
        if children.is_empty() {
            continue;
        }
        harnesses.extend(find_harnesses(&children));
        stack.extend(children.into_iter().rev());
    }

    harnesses
}

/// Scan one sibling list for proof-marker runs.
pub fn find_harnesses<N: SyntaxNode>(siblings: &[N]) -> Vec<HarnessMetadata> {
    let mut found = Vec::new();
    let mut index = 0;

    while index < siblings.len() {
        let node = &siblings[index];
        if !(is_attribute(node) && node.text().contains(PROOF_MARKER)) {
            index += 1;
            continue;
        }

        let Some(offset) = siblings[index..]
            .iter()
            .position(|sibling| sibling.kind() == kinds::FUNCTION_ITEM)
        else {
            trace!("dropping proof attribute with no following function: {}", node.text());
            break;
        };
        let function_index = index + offset;

        let mut pending = PendingHarness::new(preceded_by_test(siblings, index));
        for sibling in &siblings[index..function_index] {
            if is_attribute(sibling) && sibling.text().contains(TOOL_PREFIX) {
                pending.absorb(HarnessAttribute::new(sibling.text()));
            }
        }

        let function = &siblings[function_index];
        match pending.finish(function) {
            Some(harness) => {
                debug!(
                    "found harness {} at {}:{}",
                    harness.name, harness.end_position.row, harness.end_position.column
                );
                found.push(harness);
            }
            None => warn!("proof function without a name: {}", first_line(function.text())),
        }

        index = function_index + 1;
    }

    found
}

/// Whether the attribute just before `index` (skipping comments) is a
/// unit-test marker.
fn preceded_by_test<N: SyntaxNode>(siblings: &[N], index: usize) -> bool {
    siblings[..index]
        .iter()
        .rev()
        .find(|sibling| !is_comment(*sibling))
        .is_some_and(|prev| is_attribute(prev) && is_test_marker(prev.text()))
}

/// Attributes gathered for a harness whose function has not been reached yet.
struct PendingHarness {
    attributes: Vec<String>,
    is_test_style: bool,
    has_stub: bool,
}

impl PendingHarness {
    fn new(is_test_style: bool) -> Self {
        PendingHarness {
            attributes: Vec::new(),
            is_test_style,
            has_stub: false,
        }
    }

    fn absorb(&mut self, attribute: HarnessAttribute) {
        for directive in attribute.directives() {
            match directive {
                AttributeKind::StubDirective => self.has_stub = true,
                AttributeKind::TestMarker => self.is_test_style = true,
                _ => {}
            }
        }
        if !attribute.is_bare_proof_marker() {
            self.attributes.push(attribute.into_raw_text());
        }
    }

    fn finish<N: SyntaxNode>(self, function: &N) -> Option<HarnessMetadata> {
        let name = function.child_by_field_name("name")?;
        Some(HarnessMetadata {
            name: name.text().to_string(),
            full_line: name.line_text().trim().to_string(),
            end_position: name.end_position(),
            attributes: self.attributes,
            flags: HarnessFlags {
                is_proof: true,
                is_test_style: self.is_test_style,
                has_stub: self.has_stub,
            },
            args: DerivedArgs::default(),
            module: None,
        })
    }
}

fn is_attribute<N: SyntaxNode>(node: &N) -> bool {
    node.kind() == kinds::ATTRIBUTE_ITEM
}

fn is_comment<N: SyntaxNode>(node: &N) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment")
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("").trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::syntax::SyntaxTree;

    fn extract(source: &str) -> Vec<HarnessMetadata> {
        let tree = SyntaxTree::parse(source);
        tree.root().map(|root| extract_harnesses(&root)).unwrap_or_default()
    }

    fn names(harnesses: &[HarnessMetadata]) -> Vec<&str> {
        harnesses.iter().map(|h| h.name.as_str()).collect()
    }

    const KANI_PROOFS: &str = r#"
#[cfg(kani)]
#[kani::proof]
#[kani::unwind(0)]
fn function_abc() {
    assert!(1 == 2);
}

#[cfg(kani)]
#[kani::proof]
pub fn function_xyz() {
    assert!(1 == 2);
}

#[cfg(kani)]
#[kani::proof]
#[kani::unwind(2)]
#[kani::solver(kissat)]
#[kani::should_panic]
unsafe fn function_xyz_2() {
    assert!(1 == 2);
}

#[cfg(kani)]
#[kani::proof]
pub unsafe fn function_xyz_3() {
    assert!(1 == 2);
}
"#;

    #[test]
    fn test_stacked_attributes() {
        let harnesses = extract(KANI_PROOFS);
        assert_eq!(
            names(&harnesses),
            vec!["function_abc", "function_xyz", "function_xyz_2", "function_xyz_3"]
        );

        let abc = &harnesses[0];
        assert_eq!(abc.full_line, "fn function_abc() {");
        assert_eq!(abc.end_position, Position { row: 4, column: 15 });
        assert_eq!(abc.attributes, vec!["#[kani::unwind(0)]"]);
        assert_eq!(
            abc.flags,
            HarnessFlags {
                is_proof: true,
                is_test_style: false,
                has_stub: false
            }
        );

        let xyz = &harnesses[1];
        assert_eq!(xyz.full_line, "pub fn function_xyz() {");
        assert!(xyz.attributes.is_empty());

        let xyz_2 = &harnesses[2];
        assert_eq!(
            xyz_2.attributes,
            vec!["#[kani::unwind(2)]", "#[kani::solver(kissat)]", "#[kani::should_panic]"]
        );

        assert_eq!(harnesses[3].full_line, "pub unsafe fn function_xyz_3() {");
    }

    #[test]
    fn test_composite_harnesses_in_test_module() {
        let source = r#"
#[cfg(test)]
mod test {
    #[test]
    #[cfg_attr(kani, kani::proof, kani::unwind(0))]
    #[cfg_attr(miri, ignore)] // this test is too expensive for miri
    fn insert_test_80978342() {
        assert!(1==3);
    }
    #[test]
    #[cfg_attr(kani, kani::proof, kani::unwind(1))]
    fn insert_test_2() {
        assert!(1==1);
    }
}
"#;
        let harnesses = extract(source);
        assert_eq!(names(&harnesses), vec!["insert_test_80978342", "insert_test_2"]);

        let first = &harnesses[0];
        assert_eq!(first.full_line, "fn insert_test_80978342() {");
        assert_eq!(first.end_position, Position { row: 6, column: 27 });
        assert_eq!(
            first.attributes,
            vec!["#[cfg_attr(kani, kani::proof, kani::unwind(0))]"]
        );
        assert!(first.flags.is_test_style);
        assert!(harnesses[1].flags.is_test_style);
    }

    #[test]
    fn test_one_line_harness_keeps_whole_line() {
        let source = "mod m {\n    #[kani::proof] #[kani::unwind(2)] fn inline() {}\n}\n";
        let harnesses = extract(source);
        assert_eq!(names(&harnesses), vec!["inline"]);
        assert_eq!(
            harnesses[0].full_line,
            "#[kani::proof] #[kani::unwind(2)] fn inline() {}"
        );
        assert_eq!(harnesses[0].end_position.row, 1);
        assert_eq!(harnesses[0].attributes, vec!["#[kani::unwind(2)]"]);
    }

    #[test]
    fn test_stub_flag() {
        let source = "#[kani::proof]\n#[kani::stub(rand::random, mock_random)]\npub fn function_2() {}\n";
        let harnesses = extract(source);
        assert_eq!(harnesses.len(), 1);
        assert!(harnesses[0].flags.has_stub);
        assert_eq!(
            harnesses[0].attributes,
            vec!["#[kani::stub(rand::random, mock_random)]"]
        );
    }

    #[test]
    fn test_no_proofs() {
        let source = "#[cfg(test)]\nmod test {\n    #[test]\n    fn insert_test() {}\n}\n";
        assert!(extract(source).is_empty());
    }

    #[test]
    fn test_dangling_marker_dropped() {
        let source = "fn before() {}\n#[kani::proof]\nstruct NotAFunction;\n";
        assert!(extract(source).is_empty());
    }

    #[test]
    fn test_run_skips_non_function_items() {
        let source = "#[kani::proof]\nconst X: u8 = 1;\nfn target() {}\n";
        let harnesses = extract(source);
        assert_eq!(names(&harnesses), vec!["target"]);
    }

    #[test]
    fn test_run_stops_at_first_function() {
        let source = "#[kani::proof]\nfn first() {}\n#[kani::unwind(3)]\nfn second() {}\n";
        let harnesses = extract(source);
        assert_eq!(names(&harnesses), vec!["first"]);
        assert!(harnesses[0].attributes.is_empty());
    }

    #[test]
    fn test_double_marker_yields_one_harness() {
        let source = "#[kani::proof]\n#[kani::proof]\nfn twice() {}\n";
        let harnesses = extract(source);
        assert_eq!(names(&harnesses), vec!["twice"]);
    }

    #[test]
    fn test_nested_modules_and_blocks() {
        let source = r#"
mod outer {
    mod inner {
        #[kani::proof]
        fn deep() {}
    }
    fn host() {
        #[kani::proof]
        fn in_block() {}
    }
}
"#;
        let mut found = names(&extract(source))
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        found.sort();
        assert_eq!(found, vec!["deep", "in_block"]);
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let depth = 500;
        let mut source = String::new();
        for i in 0..depth {
            source.push_str(&format!("mod m{} {{\n", i));
        }
        source.push_str("#[kani::proof]\nfn bottom() {}\n");
        for _ in 0..depth {
            source.push_str("}\n");
        }
        let harnesses = extract(&source);
        assert_eq!(names(&harnesses), vec!["bottom"]);
    }
}
