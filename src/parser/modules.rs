//! Module path resolution
//!
//! Two ways of computing the `::` path of modules enclosing a harness:
//!
//! - the reverse index (default): every module lists the names of all
//!   functions nested anywhere inside it, and the list is inverted so each
//!   function name maps to the modules containing it, joined in the order the
//!   modules were discovered;
//! - the ancestor chain: the real outer-to-inner chain of modules around each
//!   function, keyed by the function's position.
//!
//! The reverse index keys on function names alone, so two same-named
//! functions in unrelated modules get one shared, concatenated path. Two
//! module blocks with the same name are two entries, so `h` inside both
//! `mod foo` blocks resolves to `foo::foo`.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};

use super::syntax::{kinds, Position, SyntaxNode};

/// One entry per module block in preorder: its name and the names of every
/// function nested within it.
pub type ModuleMembership = Vec<(String, IndexSet<String>)>;

/// Map each function name to its concatenated module path.
pub fn resolve_modules<N: SyntaxNode>(root: &N) -> IndexMap<String, String> {
    concatenate_module_names(&module_membership(root))
}

/// Build the raw module-to-functions map. A function nested several levels
/// deep appears under every enclosing module.
pub fn module_membership<N: SyntaxNode>(root: &N) -> ModuleMembership {
    let mut membership = ModuleMembership::new();

    for module in root.descendants_of_type(kinds::MOD_ITEM) {
        let Some(name) = module.child_by_field_name("name") else {
            continue;
        };
        let functions = module
            .descendants_of_type(kinds::FUNCTION_ITEM)
            .into_iter()
            .filter_map(|function| function.child_by_field_name("name"))
            .map(|name| name.text().to_string())
            .collect();

        membership.push((name.text().to_string(), functions));
    }

    membership
}

/// Invert a membership list: function name to the `::`-joined names of all
/// modules listing it, in membership order.
pub fn concatenate_module_names(membership: &ModuleMembership) -> IndexMap<String, String> {
    let mut modules_by_function: IndexMap<&str, Vec<&str>> = IndexMap::new();

    for (module, functions) in membership {
        for function in functions {
            modules_by_function
                .entry(function.as_str())
                .or_default()
                .push(module.as_str());
        }
    }

    modules_by_function
        .into_iter()
        .map(|(function, modules)| (function.to_string(), modules.join("::")))
        .collect()
}

/// Outer-to-inner module path for every function inside at least one
/// module, keyed by the end position of the function's name.
pub fn ancestor_module_paths<N: SyntaxNode>(root: &N) -> HashMap<Position, String> {
    let mut paths = HashMap::new();
    let mut stack: Vec<(N, Vec<String>)> = vec![(root.clone(), Vec::new())];

    while let Some((node, path)) = stack.pop() {
        for child in node.named_children().into_iter().rev() {
            let mut child_path = path.clone();
            match child.kind() {
                kinds::MOD_ITEM => {
                    if let Some(name) = child.child_by_field_name("name") {
                        child_path.push(name.text().to_string());
                    }
                }
                kinds::FUNCTION_ITEM if !path.is_empty() => {
                    if let Some(name) = child.child_by_field_name("name") {
                        paths.insert(name.end_position(), path.join("::"));
                    }
                }
                _ => {}
            }
            stack.push((child, child_path));
        }
    }

    paths
}
