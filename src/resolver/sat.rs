//! Encodes an index+dependency instance into CNF and solves it with a small DPLL search:
//! unit propagation to a fixpoint, then branch on the most-constrained unassigned variable,
//! true before false, backtracking via an explicit decision stack.

use crate::index::{Dependencies, Index};
use crate::package::VersionedPackage;
use std::collections::HashMap;

/// Literals in CNF formula are represented as positive or negative integers.
pub(crate) type Literal = i32;
/// A clause is a disjunction of literals.
pub(crate) type Clause = Vec<Literal>;
/// A formula in CNF is a conjunction of clauses.
pub(crate) type Formula = Vec<Clause>;

/// Which `(requiring package, requirement name)` pair produced a given clause, if any — `None`
/// for the at-most-one clauses, which aren't attributable to a single dependency edge.
pub(crate) type ClauseOrigin<'d> = Option<(&'d VersionedPackage, &'d str)>;

/// Bijection between `VersionedPackage` and the dense `1..N` variables used in the formula,
/// plus the CNF built from `index`/`deps`.
pub(crate) struct Encoding<'d> {
    pub(crate) formula: Formula,
    /// Parallel to `formula`: the dependency edge each clause encodes, for diagnosing the
    /// first clause that degenerates to forbidding its requiring package outright.
    clause_origin: Vec<ClauseOrigin<'d>>,
    vp_to_var: HashMap<&'d VersionedPackage, Literal>,
    var_to_vp: HashMap<Literal, &'d VersionedPackage>,
}

impl<'d> Encoding<'d> {
    pub(crate) fn num_vars(&self) -> i32 {
        self.var_to_vp.len() as i32
    }

    pub(crate) fn var(&self, vp: &VersionedPackage) -> Option<Literal> {
        self.vp_to_var.get(vp).copied()
    }

    pub(crate) fn package(&self, var: Literal) -> &'d VersionedPackage {
        self.var_to_vp[&var]
    }

    /// The origin of the first clause that degenerates to a bare `(¬x_vp)` — i.e. a
    /// dependency no version in the index can satisfy, forbidding `vp` altogether.
    pub(crate) fn first_degenerate_clause(&self) -> ClauseOrigin<'d> {
        self.formula
            .iter()
            .zip(self.clause_origin.iter())
            .find_map(|(clause, origin)| (clause.len() == 1).then_some(*origin).flatten())
    }

    /// Builds the CNF characterizing valid setups for `index`/`deps`:
    /// one at-most-one clause per pair of versions of the same package, and one clause per
    /// declared dependency requiring one of its satisfying versions whenever the requiring
    /// package is selected. Variable ids are assigned over `deps.keys()` sorted by
    /// `(name, version)` rather than `HashMap` iteration order, so the same index produces the
    /// same encoding (and thus the same tie-broken-by-id search order) across runs.
    pub(crate) fn build(index: &'d Index, deps: &'d Dependencies) -> Self {
        let mut sorted_keys: Vec<&'d VersionedPackage> = deps.keys().collect();
        sorted_keys.sort();

        let mut vp_to_var = HashMap::new();
        for (i, vp) in sorted_keys.into_iter().enumerate() {
            vp_to_var.insert(vp, (i + 1) as Literal);
        }
        let var_to_vp: HashMap<_, _> = vp_to_var.iter().map(|(&vp, &var)| (var, vp)).collect();

        let mut clauses = Vec::new();
        let mut clause_origin = Vec::new();

        for name in index.package_names() {
            let versions: Vec<Literal> = index
                .versions(name)
                .into_iter()
                .flatten()
                .filter_map(|v| vp_to_var.get(&VersionedPackage::new(name, *v)).copied())
                .collect();
            for i in 0..versions.len() {
                for &v2 in &versions[i + 1..] {
                    clauses.push(vec![-versions[i], -v2]);
                    clause_origin.push(None);
                }
            }
        }

        for (vp, requirements) in deps {
            let self_var = vp_to_var[vp];
            for (req_name, allowed) in requirements {
                let satisfying = index
                    .versions(req_name)
                    .map(|vs| allowed.pick(vs))
                    .unwrap_or_default();

                let mut clause: Vec<Literal> = satisfying
                    .into_iter()
                    .filter_map(|v| vp_to_var.get(&VersionedPackage::new(req_name, v)).copied())
                    .collect();
                // Either one of the satisfying versions is installed, or `vp` is not.
                clause.push(-self_var);
                clauses.push(clause);
                clause_origin.push(Some((vp, req_name.as_str())));
            }
        }

        Self {
            formula: clauses,
            clause_origin,
            vp_to_var,
            var_to_vp,
        }
    }
}

fn clause_satisfied(clause: &Clause, assignment: &HashMap<Literal, bool>) -> Option<bool> {
    let mut unassigned = false;
    for &lit in clause {
        let var = lit.abs();
        match assignment.get(&var) {
            Some(&value) if (lit > 0) == value => return Some(true),
            Some(_) => continue,
            None => unassigned = true,
        }
    }
    if unassigned { None } else { Some(false) }
}

/// Propagates unit clauses to a fixpoint starting from `base`. Returns `None` on conflict,
/// `Some(full_assignment)` otherwise.
fn propagate(formula: &Formula, base: &HashMap<Literal, bool>) -> Option<HashMap<Literal, bool>> {
    let mut current = base.clone();
    let mut changed = true;

    while changed {
        changed = false;
        for clause in formula {
            if clause.is_empty() {
                return None;
            }

            let mut unassigned_lit = None;
            let mut unassigned_count = 0;
            let mut satisfied = false;

            for &lit in clause {
                let var = lit.abs();
                match current.get(&var) {
                    Some(&value) if (lit > 0) == value => {
                        satisfied = true;
                        break;
                    }
                    Some(_) => continue,
                    None => {
                        unassigned_count += 1;
                        unassigned_lit = Some(lit);
                    }
                }
            }

            if satisfied {
                continue;
            }
            if unassigned_count == 0 {
                return None;
            }
            if unassigned_count == 1 {
                let lit = unassigned_lit.unwrap();
                current.insert(lit.abs(), lit > 0);
                changed = true;
            }
        }
    }

    Some(current)
}

/// Picks the unassigned variable appearing in the most not-yet-satisfied clauses, breaking
/// ties by lowest id for determinism.
fn most_constrained_variable(
    formula: &Formula,
    assignment: &HashMap<Literal, bool>,
    num_vars: i32,
) -> Option<Literal> {
    let mut counts: HashMap<Literal, u32> = HashMap::new();

    for clause in formula {
        if clause_satisfied(clause, assignment) == Some(true) {
            continue;
        }
        for &lit in clause {
            let var = lit.abs();
            if !assignment.contains_key(&var) {
                *counts.entry(var).or_insert(0) += 1;
            }
        }
    }

    (1..=num_vars)
        .filter(|v| !assignment.contains_key(v))
        .max_by_key(|v| (*counts.get(v).unwrap_or(&0), -*v))
}

const MAX_ITERATIONS: usize = 1_000_000;

/// Solves `formula` under `assumptions` (variables forced true before the first propagation
/// pass). Returns a satisfying assignment, or `None` if unsatisfiable.
///
/// The search keeps a decision stack of `(variable, already_tried_false)`; on conflict it
/// rebuilds the assignment from `assumptions` plus the surviving decisions and re-propagates,
/// which is simpler (and, for the problem sizes this solver targets, cheap enough) than
/// threading per-decision undo information through propagation.
pub(crate) fn solve(
    formula: &Formula,
    num_vars: i32,
    assumptions: &[Literal],
) -> Option<HashMap<Literal, bool>> {
    let base: HashMap<Literal, bool> = assumptions.iter().map(|&v| (v, true)).collect();
    let mut assignment = propagate(formula, &base)?;
    let mut decisions: Vec<(Literal, bool)> = Vec::new();
    let mut iterations = 0usize;

    loop {
        iterations += 1;
        if iterations > MAX_ITERATIONS {
            log::warn!("SAT search hit the iteration cap; treating as unsatisfiable");
            return None;
        }

        if assignment.len() as i32 == num_vars {
            return Some(assignment);
        }

        let var = match most_constrained_variable(formula, &assignment, num_vars) {
            Some(v) => v,
            None => return Some(assignment),
        };

        let mut trial = assignment.clone();
        trial.insert(var, true);
        if let Some(next) = propagate(formula, &trial) {
            assignment = next;
            decisions.push((var, false));
            continue;
        }

        let mut trial = assignment.clone();
        trial.insert(var, false);
        if let Some(next) = propagate(formula, &trial) {
            assignment = next;
            decisions.push((var, true));
            continue;
        }

        // Both values conflict under the current decisions: backtrack to the nearest
        // decision whose `false` branch hasn't been tried yet.
        loop {
            match decisions.pop() {
                None => return None,
                Some((dvar, already_tried_false)) => {
                    if already_tried_false {
                        continue;
                    }
                    let mut trial: HashMap<Literal, bool> = base.clone();
                    for &(v, _) in &decisions {
                        trial.insert(v, assignment[&v]);
                    }
                    trial.insert(dvar, false);
                    match propagate(formula, &trial) {
                        Some(next) => {
                            assignment = next;
                            decisions.push((dvar, true));
                            break;
                        }
                        None => continue,
                    }
                }
            }
        }
    }
}
