//! Flat and tree presentation of a (reduced) setup.

use crate::index::Dependencies;
use crate::package::VersionedPackage;
use crate::resolver::Setup;
use std::collections::HashSet;
use std::fmt::Write as _;

/// `", ".join("<name> <version>")` over the setup, sorted by name for deterministic output.
pub fn render_oneline(setup: &Setup) -> String {
    setup
        .iter()
        .map(|(name, version)| format!("{name} {version}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Indented tree rooted at `root`, two spaces per depth level. A package already printed at a
/// shallower position prints as `<name> <version> (see above)` instead of being descended
/// into again — this keeps the printer total over dependency DAGs (and, defensively, cycles,
/// though a valid setup's at-most-one invariant rules those out between distinct versions).
pub fn render_tree(deps: &Dependencies, setup: &Setup, root: &str) -> String {
    let mut out = String::new();
    let mut printed: HashSet<&str> = HashSet::new();
    render_node(deps, setup, root, 0, &mut printed, &mut out);
    out
}

fn render_node<'a>(
    deps: &'a Dependencies,
    setup: &'a Setup,
    name: &'a str,
    depth: usize,
    printed: &mut HashSet<&'a str>,
    out: &mut String,
) {
    let indent = "  ".repeat(depth);
    let version = setup[name];

    if !printed.insert(name) {
        let _ = writeln!(out, "{indent}{name} {version} (see above)");
        return;
    }

    let requirements = deps.get(&VersionedPackage::new(name, version));
    let has_deps = requirements.is_some_and(|r| !r.is_empty());

    if has_deps {
        let _ = writeln!(out, "{indent}{name} {version} with following dependencies:");
    } else {
        let _ = writeln!(out, "{indent}{name} {version}");
    }

    if let Some(requirements) = requirements {
        let mut names: Vec<&str> = requirements.keys().map(String::as_str).collect();
        names.sort_unstable();
        for dep_name in names {
            render_node(deps, setup, dep_name, depth + 1, printed, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::{Version, VersionSet};
    use std::collections::HashMap;

    fn v(n: u32) -> Version {
        Version::new(n)
    }

    #[test]
    fn oneline_sorts_by_name() {
        let setup: Setup = [("b".to_string(), v(1)), ("a".to_string(), v(2))]
            .into_iter()
            .collect();
        assert_eq!(render_oneline(&setup), "a 2, b 1");
    }

    #[test]
    fn tree_marks_repeated_subtrees_as_seen() {
        let mut deps: Dependencies = HashMap::new();
        deps.insert(
            VersionedPackage::new("a", v(1)),
            HashMap::from([
                ("b".to_string(), VersionSet::empty()),
                ("c".to_string(), VersionSet::empty()),
            ]),
        );
        deps.insert(
            VersionedPackage::new("b", v(1)),
            HashMap::from([("c".to_string(), VersionSet::empty())]),
        );
        deps.insert(VersionedPackage::new("c", v(1)), HashMap::new());

        let setup: Setup = [
            ("a".to_string(), v(1)),
            ("b".to_string(), v(1)),
            ("c".to_string(), v(1)),
        ]
        .into_iter()
        .collect();

        let tree = render_tree(&deps, &setup, "a");
        insta::assert_snapshot!("tree_marks_repeated_subtrees_as_seen", tree);
    }

    #[test]
    fn tree_leaf_has_no_trailer() {
        let mut deps: Dependencies = HashMap::new();
        deps.insert(VersionedPackage::new("a", v(1)), HashMap::new());
        let setup: Setup = [("a".to_string(), v(1))].into_iter().collect();
        insta::assert_snapshot!("tree_leaf_has_no_trailer", render_tree(&deps, &setup, "a"));
    }
}
