//! Resolution round driver.
//!
//! One walk discovers which variables a term depends on; it cannot make
//! progress on any of them. Resolution is therefore an iterative fixpoint:
//! each round hands the accumulated binding jobs to the external solver,
//! and every value the solver materializes is walked in the next round,
//! seeding further lookups, until no unresolved variable remains reachable.
//!
//! The driver is an explicit worklist, not recursion: the persistent
//! [`JobMap`] is the frontier source, a bitset tracks which bindings were
//! already dispatched, and a fuel counter bounds rounds against a solver
//! that keeps materializing fresh unresolved structure. Round boundaries
//! and the termination condition are all visible in [`ResolutionDriver::run`].
//!
//! The driver never inspects type-term internals — it only sees job sets —
//! and the walk never mutates the constraint store; within one task the
//! two strictly alternate (solve → walk → solve → ...), so no locking
//! discipline exists anywhere in this module.

use crate::resolvable::{Job, JobMap, WalkMode, walk};
use crate::store::ConstraintState;
use crate::types::{BranchId, ReasonId, TvarId, TypeId};
use crate::CheckContext;
use fixedbitset::FixedBitSet;
use floe_common::limits::MAX_RESOLUTION_ROUNDS;
use tracing::{debug, trace};

/// The external constraint-solving engine, seen through the only interface
/// this subsystem needs: given a variable that must receive exactly one
/// resolved value, produce that value or decline.
///
/// A successful return is recorded in the constraint store as `Resolved`;
/// the solver may also have resolved other variables as a side effect, and
/// re-walks pick those up through the store.
pub trait BindingSolver {
    fn resolve_binding(
        &mut self,
        cx: &mut CheckContext,
        tvar: TvarId,
        reason: ReasonId,
    ) -> Option<TypeId>;
}

/// A variable this subsystem could not resolve within the allotted rounds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedFinding {
    pub tvar: TvarId,
    pub reason: ReasonId,
    /// Speculation branch the finding belongs to, if any.
    pub branch: Option<BranchId>,
}

/// Result of driving one root term to fixpoint.
#[derive(Clone, Debug)]
pub struct ResolutionOutcome {
    /// Rounds executed, including the final no-progress round.
    pub rounds: u32,
    /// Variables resolved through the solver, in resolution order.
    pub resolved: Vec<TvarId>,
    /// Variables left unresolved, sorted by id for determinism.
    pub unresolved: Vec<UnresolvedFinding>,
    /// True when round fuel ran out before a fixpoint was reached.
    pub exhausted: bool,
}

impl ResolutionOutcome {
    /// Did every reachable variable end up resolved?
    pub fn is_fully_resolved(&self) -> bool {
        self.unresolved.is_empty() && !self.exhausted
    }

    /// The permissive fallback an annotation caller substitutes for each
    /// unresolved finding: the top type, usable only after refinement.
    pub const fn fallback_type(&self) -> TypeId {
        TypeId::MIXED
    }
}

/// Drives walks to a global fixpoint for one root term.
pub struct ResolutionDriver {
    fuel: u32,
}

impl Default for ResolutionDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionDriver {
    pub fn new() -> Self {
        Self {
            fuel: MAX_RESOLUTION_ROUNDS,
        }
    }

    /// Driver with custom round fuel, for tests and constrained hosts.
    pub const fn with_fuel(fuel: u32) -> Self {
        Self { fuel }
    }

    /// Run rounds until no new binding or unresolved-leaf entry appears.
    ///
    /// Round 0 walks the root with an empty accumulator. Each subsequent
    /// round dispatches not-yet-dispatched bindings to the solver, then
    /// walks every newly materialized value with the same accumulator —
    /// re-walking is idempotent because the accumulator persists for the
    /// whole request.
    pub fn run(
        &self,
        cx: &mut CheckContext,
        solver: &mut dyn BindingSolver,
        mode: WalkMode,
        root: TypeId,
    ) -> ResolutionOutcome {
        let mut acc = JobMap::new();
        walk(cx, mode, &mut acc, root);

        // `dispatched` marks bindings handed to the solver (declined ones
        // are not retried); `walked` marks bindings whose resolved value
        // has been fed back into the walk. The two differ when the solver
        // resolves a variable as a side effect of another dispatch.
        let mut dispatched = FixedBitSet::with_capacity(cx.store.len());
        let mut walked = FixedBitSet::with_capacity(cx.store.len());
        let mut resolved = Vec::new();
        let mut rounds = 0u32;
        let mut exhausted = false;

        loop {
            rounds += 1;
            if rounds > self.fuel {
                debug!(rounds, "resolution round fuel exhausted");
                exhausted = true;
                break;
            }

            let frontier: Vec<TvarId> = acc
                .bindings()
                .filter(|id| !walked.contains(id.index()))
                .collect();
            trace!(round = rounds, frontier = frontier.len(), "resolution round");

            let mut materialized = Vec::new();
            for id in frontier {
                match cx.tvar_state(id) {
                    // Bound outside its own dispatch (solver side effect);
                    // the binding still has to be walked.
                    ConstraintState::Resolved(term) => {
                        mark(&mut walked, id);
                        materialized.push(term);
                    }
                    // Nothing reachable through a fully-resolved binding
                    // needs work; the invariant is trusted, not re-derived.
                    ConstraintState::FullyResolved(_) => mark(&mut walked, id),
                    ConstraintState::Unresolved(reason) => {
                        if dispatched.contains(id.index()) {
                            // Declined earlier; reported below, not retried.
                            continue;
                        }
                        mark(&mut dispatched, id);
                        if let Some(term) = solver.resolve_binding(cx, id, reason) {
                            cx.store.resolve(id, term);
                            resolved.push(id);
                            mark(&mut walked, id);
                            materialized.push(term);
                        }
                    }
                }
            }

            if materialized.is_empty() {
                // No new binding produced a value; the job set is at its
                // fixpoint.
                break;
            }
            for term in materialized {
                walk(cx, mode, &mut acc, term);
            }
        }

        let mut unresolved = Vec::new();
        for (id, job) in acc.jobs() {
            match job {
                Job::AlreadyVisited => {}
                Job::UnresolvedLeaf { mode, reason } => unresolved.push(UnresolvedFinding {
                    tvar: id,
                    reason,
                    branch: mode.branch(),
                }),
                // A binding the solver declined is just as unresolved as a
                // leaf; annotation callers need a definite answer either
                // way.
                Job::Binding => {
                    if let ConstraintState::Unresolved(reason) = cx.tvar_state(id) {
                        unresolved.push(UnresolvedFinding {
                            tvar: id,
                            reason,
                            branch: mode.branch(),
                        });
                    }
                }
            }
        }
        unresolved.sort_by_key(|finding| finding.tvar);

        if let WalkMode::Speculative(branch) = mode {
            for finding in &unresolved {
                debug!(
                    branch = branch.0,
                    tvar = finding.tvar.0,
                    "unresolved tvar logged for speculation branch"
                );
            }
        }

        ResolutionOutcome {
            rounds,
            resolved,
            unresolved,
            exhausted,
        }
    }
}

fn mark(set: &mut FixedBitSet, id: TvarId) {
    if set.len() <= id.index() {
        set.grow(id.index() + 1);
    }
    set.insert(id.index());
}

#[cfg(test)]
#[path = "../tests/rounds_tests.rs"]
mod tests;
