//! Constraint store: per-variable resolution state with alias
//! canonicalization.
//!
//! Each type variable is in exactly one of three states, and states only
//! ever move forward:
//!
//! | State | Meaning |
//! |-------|---------|
//! | `Unresolved` | Bounds not yet known; carries the creation reason |
//! | `Resolved` | Bound to a term that may contain further unresolved variables |
//! | `FullyResolved` | Bound to a term with everything transitively reachable already resolved |
//!
//! `FullyResolved` is terminal for the resolution walk: the invariant is
//! established by whoever sets the state and trusted thereafter — the walk
//! never re-traverses a fully-resolved binding to re-derive it.
//!
//! Aliased variable ids are canonicalized through an `ena` union-find
//! table, so any id reaching the store resolves to one representative.
//! The store is owned by a single checking task and never shared.

use crate::types::{ReasonId, TvarId, TypeId};
use ena::unify::{InPlaceUnificationTable, NoError, UnifyKey, UnifyValue};
use tracing::trace;

/// Resolution state of one type variable.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConstraintState {
    /// Bounds not yet known.
    Unresolved(ReasonId),
    /// Bound, but the bound term may reach further unresolved variables.
    Resolved(TypeId),
    /// Bound, with everything transitively reachable already resolved.
    FullyResolved(TypeId),
}

impl ConstraintState {
    /// Lifecycle rank; merges keep the further-along state.
    const fn rank(self) -> u8 {
        match self {
            Self::Unresolved(_) => 0,
            Self::Resolved(_) => 1,
            Self::FullyResolved(_) => 2,
        }
    }

    pub const fn is_unresolved(self) -> bool {
        matches!(self, Self::Unresolved(_))
    }
}

impl UnifyKey for TvarId {
    type Value = ConstraintState;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        Self(u)
    }

    fn tag() -> &'static str {
        "TvarId"
    }
}

impl UnifyValue for ConstraintState {
    type Error = NoError;

    /// Keep the further-along state; on a tie keep the existing one.
    /// Backward transitions are therefore impossible by construction.
    fn unify_values(a: &Self, b: &Self) -> Result<Self, NoError> {
        Ok(if b.rank() > a.rank() { *b } else { *a })
    }
}

/// Per-task store of variable states and aliases.
pub struct ConstraintStore {
    table: InPlaceUnificationTable<TvarId>,
}

impl Default for ConstraintStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintStore {
    pub fn new() -> Self {
        Self {
            table: InPlaceUnificationTable::new(),
        }
    }

    /// Create a fresh unresolved variable.
    pub fn fresh_tvar(&mut self, reason: ReasonId) -> TvarId {
        let id = self.table.new_key(ConstraintState::Unresolved(reason));
        trace!(tvar = id.0, "fresh tvar");
        id
    }

    /// Number of variables ever created (aliased ids all count).
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Canonical representative of an id.
    pub fn find(&mut self, id: TvarId) -> TvarId {
        self.table.find(id)
    }

    /// Record that two ids name the same variable. Their states merge,
    /// keeping the further-along one.
    pub fn alias(&mut self, a: TvarId, b: TvarId) {
        trace!(a = a.0, b = b.0, "alias tvars");
        self.table.union(a, b);
    }

    /// Current state of a variable. Takes `&mut self` because the
    /// underlying union-find compresses paths on lookup; semantically this
    /// is a read.
    pub fn state(&mut self, id: TvarId) -> ConstraintState {
        self.table.probe_value(id)
    }

    /// Bind a variable to a resolved term.
    ///
    /// Re-resolving an already-resolved variable is a no-op (the first
    /// binding wins); moving a fully-resolved variable backward is
    /// impossible.
    pub fn resolve(&mut self, id: TvarId, term: TypeId) {
        debug_assert!(
            match self.state(id) {
                ConstraintState::Unresolved(_) => true,
                ConstraintState::Resolved(t) | ConstraintState::FullyResolved(t) => t == term,
            },
            "conflicting resolution for tvar {id:?}"
        );
        trace!(tvar = id.0, term = term.0, "resolve tvar");
        self.table.union_value(id, ConstraintState::Resolved(term));
    }

    /// Bind a variable to a term whose reachable variables are all already
    /// resolved. The caller is responsible for that invariant; the walk
    /// trusts it unconditionally.
    pub fn fully_resolve(&mut self, id: TvarId, term: TypeId) {
        trace!(tvar = id.0, term = term.0, "fully resolve tvar");
        self.table
            .union_value(id, ConstraintState::FullyResolved(term));
    }
}

#[cfg(test)]
#[path = "../tests/store_tests.rs"]
mod tests;
