//! Per-task checking context.
//!
//! Bundles the mutable state one type-checking task owns — name interner,
//! type interner, constraint store — together with the reason policy in
//! effect. Tasks for different source files run in parallel worker
//! processes, each with its own context; nothing here is shared across
//! tasks.

use crate::intern::{PropMap, TypeInterner};
use crate::reason::{ConventionPolicy, Reason, ReasonPolicy};
use crate::store::{ConstraintState, ConstraintStore};
use crate::types::{CallSigId, PropMapId, ReasonId, TvarId, TypeId};
use floe_common::interner::{Atom, Interner};

/// The per-task checking context.
pub struct CheckContext {
    /// String interner for identifiers and property names.
    pub names: Interner,
    /// Type term arena.
    pub types: TypeInterner,
    /// Variable states and aliases.
    pub store: ConstraintStore,
    policy: Box<dyn ReasonPolicy>,
}

impl Default for CheckContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckContext {
    pub fn new() -> Self {
        Self::with_policy(Box::new(ConventionPolicy))
    }

    /// Context with a host-supplied reason policy.
    pub fn with_policy(policy: Box<dyn ReasonPolicy>) -> Self {
        Self {
            names: Interner::new(),
            types: TypeInterner::new(),
            store: ConstraintStore::new(),
            policy,
        }
    }

    /// Current state of a variable (canonicalized).
    pub fn tvar_state(&mut self, id: TvarId) -> ConstraintState {
        self.store.state(id)
    }

    /// Dereference a property map.
    pub fn prop_map(&self, id: PropMapId) -> &PropMap {
        self.types.prop_map(id)
    }

    /// Dereference a call signature to its type term.
    pub fn call_signature(&self, id: CallSigId) -> TypeId {
        self.types.call_signature(id)
    }

    pub fn is_constant_property_reason(&self, id: ReasonId) -> bool {
        self.policy.is_constant_property_reason(self.types.reason(id))
    }

    pub fn is_instantiable_reason(&self, id: ReasonId) -> bool {
        self.policy.is_instantiable_reason(self.types.reason(id))
    }

    pub fn is_internal_property_name(&self, name: Atom) -> bool {
        self.policy.is_internal_property_name(self.names.resolve(name))
    }

    /// Fresh unresolved variable with a newly interned reason.
    pub fn fresh_tvar(&mut self, reason: Reason) -> TvarId {
        let reason_id = self.types.mk_reason(reason);
        self.store.fresh_tvar(reason_id)
    }

    /// Disjoint borrows for the resolution walk: the walker reads the
    /// interner and policy while the store lookup needs `&mut` for
    /// union-find path compression.
    pub(crate) fn walk_parts(
        &mut self,
    ) -> (
        &TypeInterner,
        &mut ConstraintStore,
        &Interner,
        &dyn ReasonPolicy,
    ) {
        (
            &self.types,
            &mut self.store,
            &self.names,
            self.policy.as_ref(),
        )
    }
}
