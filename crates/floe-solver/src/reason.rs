//! Diagnostic reasons and the classification conventions built on them.
//!
//! Every type variable carries a [`Reason`]: where it came from and what
//! kind of syntax introduced it. Reasons feed diagnostics, but the
//! resolution walk also reads them for two classification heuristics:
//!
//! - **constant-property**: a variable created for a literal tag value
//!   used to discriminate a disjoint union must be pinned to a single
//!   value before the union can be matched, so it is treated as a binding
//!   obligation even in general position.
//! - **instantiable**: a variable created solely to be unified with
//!   something else (a type-parameter instantiation). Speculative
//!   constraining of such variables is side-effect-free across branches,
//!   so the walk records nothing for them.
//!
//! Both heuristics are creation-site conventions, not structural
//! guarantees, so they live behind the [`ReasonPolicy`] trait rather than
//! being hard-coded at the classification sites. [`ConventionPolicy`] is
//! the default and encodes the conventions as this codebase creates
//! reasons; hosts with different conventions substitute their own policy.

use floe_common::Span;
use floe_common::interner::Atom;
use serde::{Deserialize, Serialize};

/// Why a type variable (or type) was created.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReasonDesc {
    /// A literal property value used as a disjoint-union tag.
    ConstPropName(Atom),
    /// An ordinary named property.
    PropName(Atom),
    /// A type annotation on the named binding.
    Annotation(Atom),
    /// A type-parameter instantiation, created to be unified away.
    TypeParamInstantiation(Atom),
    /// The return of a function.
    FunReturn,
    /// The result of a call expression.
    CallResult,
    /// The result of a spread.
    SpreadResult,
    /// Free-form description.
    Custom(Atom),
}

/// A diagnostic reason: description plus source location.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reason {
    pub desc: ReasonDesc,
    pub span: Span,
}

impl Reason {
    pub const fn new(desc: ReasonDesc, span: Span) -> Self {
        Self { desc, span }
    }

    /// A reason with no source location, for synthesized variables.
    pub const fn synthetic(desc: ReasonDesc) -> Self {
        Self {
            desc,
            span: Span::DUMMY,
        }
    }
}

/// Reason-driven classification predicates consumed by the resolution
/// walk.
///
/// Implementations must be cheap and side-effect free; the walker calls
/// them once per unresolved variable it discovers.
pub trait ReasonPolicy {
    /// Does this reason mark a literal tag value used for disjoint-union
    /// discrimination?
    fn is_constant_property_reason(&self, reason: &Reason) -> bool;

    /// Was this variable created solely to be unified with something else?
    fn is_instantiable_reason(&self, reason: &Reason) -> bool;

    /// Is this property name internal/synthetic and excluded from
    /// structural walks?
    fn is_internal_property_name(&self, name: &str) -> bool;
}

/// The default conventions.
///
/// Reason classification keys on [`ReasonDesc`] variants (the creation
/// sites in this codebase always use the dedicated variants), and internal
/// property names are the `.`-prefix convention used for compiler-managed
/// slots such as `.call` and `.this`.
#[derive(Copy, Clone, Debug, Default)]
pub struct ConventionPolicy;

impl ReasonPolicy for ConventionPolicy {
    fn is_constant_property_reason(&self, reason: &Reason) -> bool {
        matches!(reason.desc, ReasonDesc::ConstPropName(_))
    }

    fn is_instantiable_reason(&self, reason: &Reason) -> bool {
        matches!(reason.desc, ReasonDesc::TypeParamInstantiation(_))
    }

    fn is_internal_property_name(&self, name: &str) -> bool {
        name.starts_with('.')
    }
}
