//! The resolvable-type walk.
//!
//! Before the checker can choose among the branches of a union or
//! intersection — overload selection, disjoint-union matching — the type
//! being examined must be fully resolved: every type variable reachable
//! from it must hold a concrete value rather than a placeholder awaiting
//! inference. This module answers the question "which variables does this
//! term still depend on", without deciding what any of them resolves to.
//!
//! One walk traverses a type term and accumulates a [`Job`] per reachable
//! variable:
//!
//! - [`Job::Binding`]: an unresolved variable that must receive a single
//!   resolved value before the term can be treated as closed.
//! - [`Job::UnresolvedLeaf`]: an unresolved variable the walk can only
//!   report — the caller converts it to a permissive fallback (annotation
//!   mode) or logs it against the active speculation branch.
//! - [`Job::AlreadyVisited`]: a resolved variable whose binding was
//!   already unfolded in this walk; recorded purely as the cycle/sharing
//!   guard, never an action item.
//!
//! Termination does not depend on the type graph being acyclic: every
//! cycle passes through a variable reference (back edges are id lookups
//! into the constraint store, never structural), and the accumulator gates
//! each variable by canonical id, so each is entered at most once per
//! walk. Between variable references the term structure is a finite tree.

use crate::intern::TypeInterner;
use crate::reason::ReasonPolicy;
use crate::store::{ConstraintState, ConstraintStore};
use crate::types::{
    BranchId, Destructor, DestructorId, ElemIndex, ObjectSlice, PropMapId, ReasonId,
    ResolvedSpread, ResolvedSpreadElem, SpreadOperand, TvarId, TypeId, TypeListId, TypeMap,
    TypeTerm, UnresolvedSpreadElem, UseTerm,
};
use crate::CheckContext;
use floe_common::interner::{Atom, Interner};
use floe_common::limits::{JOB_MAP_PREALLOC, MAX_WALK_DEPTH};
use rustc_hash::FxHashMap;
use tracing::debug;

// =============================================================================
// Walk mode and jobs
// =============================================================================

/// What kind of term is being walked.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WalkMode {
    /// Walking an annotation. An [`Job::UnresolvedLeaf`] found here is a
    /// caller error: the annotation is under-constrained and the caller
    /// substitutes a permissive fallback type.
    Annotation,
    /// Walking an inferred type while speculatively matching one branch of
    /// a union or intersection. Leaves are logged against the branch; the
    /// branch may still succeed or fail for unrelated reasons.
    Speculative(BranchId),
}

impl WalkMode {
    pub const fn branch(self) -> Option<BranchId> {
        match self {
            Self::Annotation => None,
            Self::Speculative(branch) => Some(branch),
        }
    }
}

/// What one discovered variable requires.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Job {
    /// A resolved alias already unfolded in this walk; cycle guard only.
    AlreadyVisited,
    /// Must receive exactly one resolved value.
    Binding,
    /// Cannot be resolved by this subsystem; reported to the caller.
    UnresolvedLeaf { mode: WalkMode, reason: ReasonId },
}

/// Accumulated jobs of one resolution request, keyed by canonical variable
/// id.
///
/// The map is populated monotonically: the first job recorded for an id
/// wins, and the walk's visited gate ensures no second record is ever
/// attempted. Created fresh per resolution request; the round driver keeps
/// it alive across rounds so re-walking resolved results stays idempotent.
#[derive(Clone, Debug, Default)]
pub struct JobMap {
    jobs: FxHashMap<TvarId, Job>,
}

impl JobMap {
    pub fn new() -> Self {
        Self {
            jobs: FxHashMap::with_capacity_and_hasher(JOB_MAP_PREALLOC, Default::default()),
        }
    }

    pub fn contains(&self, id: TvarId) -> bool {
        self.jobs.contains_key(&id)
    }

    pub fn get(&self, id: TvarId) -> Option<Job> {
        self.jobs.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn jobs(&self) -> impl Iterator<Item = (TvarId, Job)> + '_ {
        self.jobs.iter().map(|(&id, &job)| (id, job))
    }

    /// Variables that must be handed to the solver.
    pub fn bindings(&self) -> impl Iterator<Item = TvarId> + '_ {
        self.jobs
            .iter()
            .filter(|(_, job)| matches!(job, Job::Binding))
            .map(|(&id, _)| id)
    }

    /// Variables the walk could only report.
    pub fn unresolved_leaves(&self) -> impl Iterator<Item = (TvarId, WalkMode, ReasonId)> + '_ {
        self.jobs.iter().filter_map(|(&id, &job)| match job {
            Job::UnresolvedLeaf { mode, reason } => Some((id, mode, reason)),
            _ => None,
        })
    }

    fn record(&mut self, id: TvarId, job: Job) {
        debug_assert!(
            !self.jobs.contains_key(&id),
            "job for {id:?} recorded twice"
        );
        self.jobs.entry(id).or_insert(job);
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Walk a term in general position, accumulating jobs into `acc`.
pub fn walk(cx: &mut CheckContext, mode: WalkMode, acc: &mut JobMap, term: TypeId) {
    Walker::new(cx, mode).term(acc, term, 0);
}

/// Walk a term in binding position: a context expecting exactly one
/// resolved value (annotation source, application head). An unresolved
/// variable here always yields [`Job::Binding`]; the constant-property and
/// instantiable exemptions apply only where resolution is optional.
pub fn walk_binding(cx: &mut CheckContext, mode: WalkMode, acc: &mut JobMap, term: TypeId) {
    Walker::new(cx, mode).term_binding(acc, term, 0);
}

/// Walk an action applied to a type. Only two shapes are understood — a
/// plain wrapped type and a call — all others are terminal.
pub fn walk_use(cx: &mut CheckContext, mode: WalkMode, acc: &mut JobMap, use_term: &UseTerm) {
    Walker::new(cx, mode).use_term(acc, use_term);
}

// =============================================================================
// Walker
// =============================================================================

/// Position a variable was discovered at.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Position {
    General,
    Binding,
}

struct Walker<'cx> {
    types: &'cx TypeInterner,
    store: &'cx mut ConstraintStore,
    names: &'cx Interner,
    policy: &'cx dyn ReasonPolicy,
    mode: WalkMode,
}

impl<'cx> Walker<'cx> {
    fn new(cx: &'cx mut CheckContext, mode: WalkMode) -> Self {
        let (types, store, names, policy) = cx.walk_parts();
        Self {
            types,
            store,
            names,
            policy,
            mode,
        }
    }

    fn internal_name(&self, name: Atom) -> bool {
        self.policy.is_internal_property_name(self.names.resolve(name))
    }

    /// Structural recursion over one term, general position.
    ///
    /// `depth` counts the structural spine since the last variable
    /// dereference; cycles never show up here (they pass through
    /// variables), so the bound only cuts off pathological non-cyclic
    /// nesting.
    fn term(&mut self, acc: &mut JobMap, t: TypeId, depth: u32) {
        if depth > MAX_WALK_DEPTH {
            return;
        }
        let types = self.types;
        match *types.lookup(t) {
            TypeTerm::Var(_, id) => self.tvar(acc, Position::General, id),

            TypeTerm::Union(members) | TypeTerm::Intersection(members) => {
                // Member order affects only visit order for cycle
                // bookkeeping, not the resulting job set.
                self.list(acc, members, depth + 1);
            }

            TypeTerm::Object(shape_id) => {
                let shape = types.obj_shape(shape_id);
                self.props(acc, shape.props, depth + 1);
                if let Some(indexer) = shape.indexer {
                    self.term(acc, indexer.key, depth + 1);
                    self.term(acc, indexer.value, depth + 1);
                }
                if let Some(call) = shape.call {
                    self.term(acc, types.call_signature(call), depth + 1);
                }
            }

            TypeTerm::Function(shape_id) => {
                let shape = types.fun_shape(shape_id);
                for &param in &shape.params {
                    self.term(acc, param, depth + 1);
                }
                self.term(acc, shape.return_type, depth + 1);
                if let Some(guarded) = shape.predicate {
                    self.term(acc, guarded, depth + 1);
                }
            }

            TypeTerm::Array(elem) => self.term(acc, elem, depth + 1),

            TypeTerm::Tuple(elem, elements) => {
                self.term(acc, elem, depth + 1);
                for slot in types.tuple_list(elements) {
                    self.term(acc, slot.term, depth + 1);
                }
            }

            TypeTerm::Instance(shape_id) => {
                let shape = types.inst_shape(shape_id);
                // A shell with no identity is never entered.
                if shape.def.is_some() {
                    if let Some(super_term) = shape.super_term {
                        self.term(acc, super_term, depth + 1);
                    }
                    if let Some(static_term) = shape.static_term {
                        self.term(acc, static_term, depth + 1);
                    }
                    for arg in &shape.type_args {
                        self.term(acc, arg.term, depth + 1);
                    }
                    self.props(acc, shape.own_props, depth + 1);
                    self.props(acc, shape.proto_props, depth + 1);
                    if let Some(call) = shape.call {
                        self.term(acc, types.call_signature(call), depth + 1);
                    }
                }
            }

            // Bound parameters are instantiation concerns; only the body
            // participates in resolution.
            TypeTerm::Poly(_, body) => self.term(acc, body, depth + 1),

            TypeTerm::Namespace { value, exports } => {
                self.term(acc, value, depth + 1);
                self.props(acc, exports, depth + 1);
            }

            TypeTerm::Opaque {
                underlying,
                super_bound,
            } => {
                if let Some(underlying) = underlying {
                    self.term(acc, underlying, depth + 1);
                }
                if let Some(super_bound) = super_bound {
                    self.term(acc, super_bound, depth + 1);
                }
            }

            TypeTerm::Exact(inner)
            | TypeTerm::TypeOf(inner)
            | TypeTerm::ClassOf(inner)
            | TypeTerm::ThisInstance(inner)
            | TypeTerm::KeysOf(inner)
            | TypeTerm::MatchingProp { term: inner, .. }
            | TypeTerm::GenericBound(inner) => self.term(acc, inner, depth + 1),

            // Annotation sources and application heads expect exactly one
            // resolved value.
            TypeTerm::Annot(source) => self.term_binding(acc, source, depth + 1),
            TypeTerm::NominalApp(head) => self.term_binding(acc, head, depth + 1),
            TypeTerm::App { head, args } => {
                self.term_binding(acc, head, depth + 1);
                self.list(acc, args, depth + 1);
            }

            TypeTerm::Eval { base, destructor } => {
                self.term(acc, base, depth + 1);
                self.destructor(acc, destructor, depth + 1);
            }

            TypeTerm::EnumValue(def) | TypeTerm::EnumObject(def) => {
                self.term(acc, types.enum_def(def).representation, depth + 1);
            }

            TypeTerm::Component {
                config,
                instance,
                renders,
            } => {
                self.term(acc, config, depth + 1);
                if let Some(instance) = instance {
                    self.term(acc, instance, depth + 1);
                }
                if let Some(renders) = renders {
                    self.term(acc, renders, depth + 1);
                }
            }

            TypeTerm::Renders {
                body,
                super_renders,
            } => {
                self.term(acc, body, depth + 1);
                if let Some(super_renders) = super_renders {
                    self.term(acc, super_renders, depth + 1);
                }
            }

            TypeTerm::Intrinsic(_) | TypeTerm::Literal(_) | TypeTerm::Error => {}
        }
    }

    /// One term in binding position. Only a variable reference changes
    /// classification; any other shape walks as usual.
    fn term_binding(&mut self, acc: &mut JobMap, t: TypeId, depth: u32) {
        let types = self.types;
        if let TypeTerm::Var(_, id) = *types.lookup(t) {
            self.tvar(acc, Position::Binding, id);
        } else {
            self.term(acc, t, depth);
        }
    }

    /// Dereference one variable.
    fn tvar(&mut self, acc: &mut JobMap, pos: Position, id: TvarId) {
        let root = self.store.find(id);
        match self.store.state(root) {
            // Terminal: everything transitively reachable is already
            // resolved. Established by whoever set the state; trusted
            // here, never re-derived.
            ConstraintState::FullyResolved(_) => {}

            // Entered at most once per walk, no matter how many
            // structural parents reference it.
            _ if acc.contains(root) => {}

            ConstraintState::Resolved(term) => {
                acc.record(root, Job::AlreadyVisited);
                // Fresh structural spine: depth restarts at the binding.
                self.term(acc, term, 0);
            }

            ConstraintState::Unresolved(reason) => match pos {
                Position::Binding => acc.record(root, Job::Binding),
                Position::General => {
                    let data = self.types.reason(reason);
                    if self.policy.is_constant_property_reason(data) {
                        acc.record(root, Job::Binding);
                    } else if self.policy.is_instantiable_reason(data) {
                        // Created solely to be unified away; speculative
                        // constraining across branches is side-effect-free
                        // and deliberately untracked.
                    } else {
                        if let WalkMode::Speculative(branch) = self.mode {
                            debug!(
                                branch = branch.0,
                                tvar = root.0,
                                "unresolved tvar reached during speculation"
                            );
                        }
                        acc.record(
                            root,
                            Job::UnresolvedLeaf {
                                mode: self.mode,
                                reason,
                            },
                        );
                    }
                }
            },
        }
    }

    fn list(&mut self, acc: &mut JobMap, list: TypeListId, depth: u32) {
        let types = self.types;
        for &member in types.type_list(list) {
            self.term(acc, member, depth);
        }
    }

    /// Walk every non-internal property of a map.
    fn props(&mut self, acc: &mut JobMap, map: PropMapId, depth: u32) {
        let types = self.types;
        for (&name, prop) in types.prop_map(map) {
            if self.internal_name(name) {
                continue;
            }
            for term in prop.terms() {
                self.term(acc, term, depth);
            }
        }
    }

    fn slice(&mut self, acc: &mut JobMap, slice: &ObjectSlice, depth: u32) {
        self.props(acc, slice.props, depth);
        if let Some(indexer) = slice.indexer {
            self.term(acc, indexer.key, depth);
            self.term(acc, indexer.value, depth);
        }
    }

    /// Walk the terms a destructor embeds.
    fn destructor(&mut self, acc: &mut JobMap, id: DestructorId, depth: u32) {
        let types = self.types;
        match types.destructor(id) {
            Destructor::ComponentDefaultProps { default_props }
            | Destructor::ReactConfig { default_props } => {
                self.term(acc, *default_props, depth);
            }

            Destructor::ConfigCheck { props } => self.props(acc, *props, depth),

            Destructor::ElemAccess { index } => match index {
                ElemIndex::Typed(index) => self.term(acc, *index, depth),
                // A literal index is terminal.
                ElemIndex::LitStr(_) | ElemIndex::LitNum(_) => {}
            },

            Destructor::Rest
            | Destructor::ReadOnly
            | Destructor::Required
            | Destructor::Partial
            | Destructor::OptionalIndexResult => {}

            Destructor::ObjectSpread {
                head_slice,
                operands,
            } => {
                if let Some(head) = head_slice {
                    self.slice(acc, head, depth);
                }
                for operand in operands {
                    match operand {
                        SpreadOperand::Slice(slice) => self.slice(acc, slice, depth),
                        SpreadOperand::Type(term) => self.term(acc, *term, depth),
                    }
                }
            }

            Destructor::TupleSpread {
                resolved,
                unresolved,
            } => {
                for elem in unresolved {
                    match elem {
                        UnresolvedSpreadElem::Elem(term) | UnresolvedSpreadElem::Spread(term) => {
                            self.term(acc, *term, depth);
                        }
                    }
                }
                for elem in resolved {
                    match elem {
                        ResolvedSpreadElem::Elem(term) => self.term(acc, *term, depth),
                        ResolvedSpreadElem::Spread(ResolvedSpread::ArrayLike {
                            elem,
                            elements,
                        }) => {
                            self.term(acc, *elem, depth);
                            if let Some(elements) = elements {
                                for slot in types.tuple_list(*elements) {
                                    self.term(acc, slot.term, depth);
                                }
                            }
                        }
                        // An any-typed spread contributes nothing.
                        ResolvedSpreadElem::Spread(ResolvedSpread::Any) => {}
                    }
                }
            }

            Destructor::Call { args } => self.list(acc, *args, depth),

            Destructor::Conditional {
                infer_params,
                extends,
                then_term,
                else_term,
            } => {
                for param in types.param_list(*infer_params) {
                    if let Some(bound) = param.bound {
                        self.term(acc, bound, depth);
                    }
                }
                self.term(acc, *extends, depth);
                self.term(acc, *then_term, depth);
                self.term(acc, *else_term, depth);
            }

            Destructor::TypeMap(map) => match map {
                TypeMap::TupleMap(term)
                | TypeMap::ObjectMap(term)
                | TypeMap::ObjectMapi(term)
                | TypeMap::ObjectMapConst(term) => self.term(acc, *term, depth),
                TypeMap::ObjectKeyMirror => {}
            },

            Destructor::MappedProp { prop_type } => self.term(acc, *prop_type, depth),

            Destructor::PromoteRenders { resolved_elem } => {
                if let Some(elem) = resolved_elem {
                    self.term(acc, *elem, depth);
                }
            }
        }
    }

    /// An action applied to a type. Intentionally partial: a plain wrapped
    /// type and a call are walked; every other shape is terminal, and
    /// richer support is future work rather than a defect.
    fn use_term(&mut self, acc: &mut JobMap, use_term: &UseTerm) {
        match *use_term {
            UseTerm::Ty(term) => self.term(acc, term, 0),
            UseTerm::Call(call) => {
                self.list(acc, call.args, 0);
                self.tvar(acc, Position::General, call.result);
            }
            UseTerm::PropRead { .. }
            | UseTerm::PropWrite { .. }
            | UseTerm::Instantiate { .. } => {}
        }
    }
}

#[cfg(test)]
#[path = "../tests/resolvable_tests.rs"]
mod tests;
