//! Prunes a setup to the transitive closure of a set of root packages.

use crate::index::Dependencies;
use crate::package::VersionedPackage;
use crate::resolver::Setup;
use std::collections::{HashSet, VecDeque};

/// Breadth-first transitive closure over the dependency graph at the exact versions present
/// in `setup`.
///
/// # Panics
/// Panics if any name in `keep` is absent from `setup` — this is a precondition violation by
/// the caller (every `solve`-produced setup already contains its own assumptions), not
/// something a user action can trigger.
pub fn reduce_setup(deps: &Dependencies, setup: &Setup, keep: &[&str]) -> Setup {
    for &name in keep {
        assert!(
            setup.contains_key(name),
            "reduce_setup: '{name}' is not present in the setup being reduced"
        );
    }

    let mut visited: HashSet<&str> = keep.iter().copied().collect();
    let mut queue: VecDeque<&str> = keep.iter().copied().collect();

    while let Some(name) = queue.pop_front() {
        let version = setup[name];
        let vp = VersionedPackage::new(name, version);
        let Some(requirements) = deps.get(&vp) else {
            continue;
        };
        for requirement in requirements.keys() {
            if visited.insert(requirement.as_str()) {
                queue.push_back(requirement);
            }
        }
    }

    setup
        .iter()
        .filter(|(name, _)| visited.contains(name.as_str()))
        .map(|(name, version)| (name.clone(), *version))
        .collect()
}
