//! Drives the SAT backend with assumptions, extracts a setup, and tests
//! satisfiability-under-hypothesis.

mod reduce;
mod render;
mod sat;

pub use reduce::reduce_setup;
pub use render::{render_oneline, render_tree};

use crate::index::{Dependencies, Index};
use crate::package::VersionedPackage;
use crate::version::Version;
use std::collections::BTreeMap;

/// A conflict-free selection of at most one version per package.
pub type Setup = BTreeMap<String, Version>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("there is no package named '{0}'")]
    UnknownPackage(String),
    #[error("package '{name}' has no known version {version}")]
    UnknownVersion { name: String, version: Version },
}

/// Resolves requests against a fixed `index`/`deps` pair built once at load time.
pub struct Resolver<'d> {
    index: &'d Index,
    deps: &'d Dependencies,
}

impl<'d> Resolver<'d> {
    pub fn new(index: &'d Index, deps: &'d Dependencies) -> Self {
        Self { index, deps }
    }

    fn check_known(&self, vp: &VersionedPackage) -> Result<(), ResolveError> {
        match self.index.versions(&vp.name) {
            None => Err(ResolveError::UnknownPackage(vp.name.clone())),
            Some(versions) if !versions.contains(&vp.version) => Err(ResolveError::UnknownVersion {
                name: vp.name.clone(),
                version: vp.version,
            }),
            Some(_) => Ok(()),
        }
    }

    /// Finds a setup installing every package in `assumptions` together with everything they
    /// transitively require. Returns `Ok(None)` on UNSAT; the caller decides what minimality
    /// it needs via [`reduce_setup`].
    pub fn solve(&self, assumptions: &[VersionedPackage]) -> Result<Option<Setup>, ResolveError> {
        for vp in assumptions {
            self.check_known(vp)?;
        }

        let encoding = sat::Encoding::build(self.index, self.deps);
        let assumption_vars: Vec<sat::Literal> = assumptions
            .iter()
            .filter_map(|vp| encoding.var(vp))
            .collect();

        log::debug!(
            "solving for {} packages, {} clauses, {} assumptions",
            encoding.num_vars(),
            encoding.formula.len(),
            assumption_vars.len()
        );
        if let Some((vp, req_name)) = encoding.first_degenerate_clause() {
            log::debug!(
                "'{req_name}', required by {vp}, has no version in the index satisfying it; \
                 that clause forbids {vp} outright"
            );
        }

        let Some(assignment) = sat::solve(&encoding.formula, encoding.num_vars(), &assumption_vars)
        else {
            return Ok(None);
        };

        let setup = assignment
            .into_iter()
            .filter(|&(_, value)| value)
            .map(|(var, _)| {
                let vp = encoding.package(var);
                (vp.name.clone(), vp.version)
            })
            .collect();

        Ok(Some(setup))
    }

    /// Tests whether at least one of `candidates` is compatible with everything else implied
    /// by the formula. Diagnostic use only; does not itself produce a setup.
    pub fn any_satisfiable(&self, candidates: &[VersionedPackage]) -> bool {
        let encoding = sat::Encoding::build(self.index, self.deps);
        let candidate_vars: Vec<sat::Literal> = candidates
            .iter()
            .filter_map(|vp| encoding.var(vp))
            .collect();
        if candidate_vars.is_empty() {
            return false;
        }

        let mut formula = encoding.formula;
        formula.push(candidate_vars);

        sat::solve(&formula, encoding.num_vars(), &[]).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{load, CombineMode};

    const FIXTURE: &str = "\
a 1:
a 2: b 1
a 3: b 1..1, b 3..3
b 1: c 1
b 2: c 1..3
c 1: d 1
c 3:
";

    fn fixture() -> (Index, Dependencies) {
        // `a 3` repeats its `b` requirement (`b 1..1, b 3..3`); load in union mode so it
        // reproduces the scenario's literal `b in [1,1]∪[3,3]`, matching the fixture as
        // described rather than collapsing it to an empty set under intersection.
        load(FIXTURE, CombineMode::Union).unwrap()
    }

    fn vp(name: &str, version: u32) -> VersionedPackage {
        VersionedPackage::new(name, Version::new(version))
    }

    #[test]
    fn satisfy_a_1_is_trivially_sat() {
        let (index, deps) = fixture();
        let resolver = Resolver::new(&index, &deps);
        let setup = resolver.solve(&[vp("a", 1)]).unwrap().unwrap();
        let reduced = reduce_setup(&deps, &setup, &["a"]);
        assert_eq!(reduced.len(), 1);
        assert_eq!(render_oneline(&reduced), "a 1");
    }

    #[test]
    fn satisfy_b_2_pulls_in_c_3() {
        let (index, deps) = fixture();
        let resolver = Resolver::new(&index, &deps);
        let setup = resolver.solve(&[vp("b", 2)]).unwrap().unwrap();
        let reduced = reduce_setup(&deps, &setup, &["b"]);
        assert_eq!(reduced.len(), 2);
        assert_eq!(reduced["b"], Version::new(2));
        assert_eq!(reduced["c"], Version::new(3));
    }

    #[test]
    fn satisfy_c_3_is_trivially_sat() {
        let (index, deps) = fixture();
        let resolver = Resolver::new(&index, &deps);
        let setup = resolver.solve(&[vp("c", 3)]).unwrap().unwrap();
        let reduced = reduce_setup(&deps, &setup, &["c"]);
        assert_eq!(reduced.len(), 1);
    }

    #[test]
    fn satisfy_a_2_is_unsat_via_missing_d() {
        let (index, deps) = fixture();
        let resolver = Resolver::new(&index, &deps);
        assert!(resolver.solve(&[vp("a", 2)]).unwrap().is_none());
    }

    #[test]
    fn satisfy_a_3_is_unsat() {
        let (index, deps) = fixture();
        let resolver = Resolver::new(&index, &deps);
        assert!(resolver.solve(&[vp("a", 3)]).unwrap().is_none());
    }

    #[test]
    fn satisfy_b_1_is_unsat() {
        let (index, deps) = fixture();
        let resolver = Resolver::new(&index, &deps);
        assert!(resolver.solve(&[vp("b", 1)]).unwrap().is_none());
    }

    #[test]
    fn unknown_package_is_an_error() {
        let (index, deps) = fixture();
        let resolver = Resolver::new(&index, &deps);
        let err = resolver.solve(&[vp("zzz", 1)]).unwrap_err();
        assert_eq!(err, ResolveError::UnknownPackage("zzz".to_string()));
    }

    #[test]
    fn unknown_version_is_an_error() {
        let (index, deps) = fixture();
        let resolver = Resolver::new(&index, &deps);
        let err = resolver.solve(&[vp("a", 99)]).unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnknownVersion {
                name: "a".to_string(),
                version: Version::new(99)
            }
        );
    }

    #[test]
    fn solver_never_returns_two_versions_of_the_same_package() {
        let (index, deps) = fixture();
        let resolver = Resolver::new(&index, &deps);
        let setup = resolver.solve(&[vp("b", 2)]).unwrap().unwrap();
        // BTreeMap<String, Version> already enforces this structurally; this test documents
        // the invariant the SAT at-most-one clauses exist to guarantee.
        assert_eq!(setup.keys().collect::<std::collections::HashSet<_>>().len(), setup.len());
    }

    #[test]
    fn every_selected_package_has_its_dependencies_satisfied() {
        let (index, deps) = fixture();
        let resolver = Resolver::new(&index, &deps);
        let setup = resolver.solve(&[vp("b", 2)]).unwrap().unwrap();
        for (name, version) in &setup {
            let vp = VersionedPackage::new(name.clone(), *version);
            if let Some(requirements) = deps.get(&vp) {
                for (req, allowed) in requirements {
                    let got = setup.get(req).expect("requirement present in setup");
                    assert!(allowed.contains(*got));
                }
            }
        }
        let _ = index;
    }
}
