//! Full type resolution for the floe type checker.
//!
//! Before the checker makes a choice among the branches of a union or
//! intersection type — overload selection, disjoint-union matching — it
//! must know the type under scrutiny is fully resolved: every type
//! variable reachable from it holds a concrete value, not a placeholder
//! awaiting inference. This crate determines *which* variables still need
//! resolving, in what context, and drives solver rounds to that fixpoint;
//! it never decides *what* a variable resolves to.
//!
//! Key pieces:
//! - **`types` / `intern`**: interned structural type terms; back edges in
//!   cyclic type graphs are variable-id lookups, never structural
//!   references, so terms stay acyclic trees between variables.
//! - **`store`**: per-variable state machine
//!   (Unresolved → Resolved → FullyResolved, forward-only) with ena-backed
//!   alias canonicalization.
//! - **`resolvable`**: the type-term walk producing binding obligations,
//!   already-visited markers, and unresolved leaves.
//! - **`rounds`**: the worklist fixpoint handing binding jobs to the
//!   external solver and re-walking what it materializes.

pub mod context;
pub mod format;
pub mod intern;
pub mod reason;
pub mod resolvable;
pub mod rounds;
pub mod store;
pub mod types;

pub use context::CheckContext;
pub use format::TypeFormatter;
pub use intern::{PropMap, TypeInterner, TypeList};
pub use reason::{ConventionPolicy, Reason, ReasonDesc, ReasonPolicy};
pub use resolvable::{Job, JobMap, WalkMode, walk, walk_binding, walk_use};
pub use rounds::{BindingSolver, ResolutionDriver, ResolutionOutcome, UnresolvedFinding};
pub use store::{ConstraintState, ConstraintStore};
pub use types::{
    BranchId, CallSigId, CallUse, DefId, Destructor, DestructorId, ElemIndex, EnumDef, EnumDefId,
    FunShape, FunShapeId, Indexer, InstShape, InstShapeId, IntrinsicKind, LiteralValue, ObjShape,
    ObjShapeId, ObjectSlice, OrderedFloat, ParamListId, Prop, PropFlags, PropMapId, ReasonId,
    ResolvedSpread, ResolvedSpreadElem, SpreadOperand, TupleElem, TupleListId, TvarId, TypeArg,
    TypeId, TypeListId, TypeMap, TypeParamInfo, TypeTerm, UnresolvedSpreadElem, UseTerm,
};

// Test modules are loaded by their source files via #[path = "../tests/..."]
// declarations; see intern.rs, store.rs, resolvable.rs, and rounds.rs.
