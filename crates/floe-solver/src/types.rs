//! Structural type representation.
//!
//! Types are immutable, recursive, tagged values addressed by [`TypeId`]
//! into the [`TypeInterner`](crate::TypeInterner) arena. Aggregate payloads
//! (member lists, property maps, shapes, destructors) are stored by
//! indirection behind their own small ids, so a [`TypeTerm`] itself is a
//! flat, hashable value and O(1) to compare.
//!
//! Back edges in the type graph are never structural: a recursive type
//! always closes its cycle through a [`TvarId`] looked up in the
//! [`ConstraintStore`](crate::ConstraintStore). Between variable
//! references, the term structure is a finite tree.
//!
//! [`TypeTerm`] and [`Destructor`] are closed sums with exhaustive matching
//! everywhere they are consumed; adding a variant forces every traversal
//! site to be updated.

use bitflags::bitflags;
use floe_common::interner::Atom;
use serde::{Deserialize, Serialize};

// =============================================================================
// Identifiers
// =============================================================================

macro_rules! arena_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub u32);

        impl $name {
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

arena_id! {
    /// Id of an interned type term.
    TypeId
}
arena_id! {
    /// Id of an interned type list (union members, call arguments, ...).
    TypeListId
}
arena_id! {
    /// Id of an interned tuple-element list.
    TupleListId
}
arena_id! {
    /// Id of an interned property map (`Atom -> Prop`, insertion-ordered).
    PropMapId
}
arena_id! {
    /// Id of an interned call signature. Resolves to the signature's type
    /// term through the checking context.
    CallSigId
}
arena_id! {
    /// Id of an interned function shape.
    FunShapeId
}
arena_id! {
    /// Id of an interned object shape.
    ObjShapeId
}
arena_id! {
    /// Id of an interned class-instance shape.
    InstShapeId
}
arena_id! {
    /// Id of an interned type-parameter list.
    ParamListId
}
arena_id! {
    /// Id of a shared enum descriptor.
    EnumDefId
}
arena_id! {
    /// Id of an interned destructor descriptor.
    DestructorId
}
arena_id! {
    /// Id of an interned diagnostic reason.
    ReasonId
}
arena_id! {
    /// One candidate arm being tried while deciding among union or
    /// intersection members.
    BranchId
}

impl TypeId {
    // Pre-interned terminal types, in the order TypeInterner::new interns
    // them.
    pub const MIXED: Self = Self(0);
    pub const EMPTY: Self = Self(1);
    pub const ANY: Self = Self(2);
    pub const VOID: Self = Self(3);
    pub const NULL: Self = Self(4);
    pub const BOOL: Self = Self(5);
    pub const NUM: Self = Self(6);
    pub const STR: Self = Self(7);
    pub const SYMBOL: Self = Self(8);
    pub const BIGINT: Self = Self(9);
    pub const ERROR: Self = Self(10);
}

/// A type variable: a placeholder identifier standing for a type whose
/// value is determined by unification/flow constraints.
///
/// `TvarId`s may be aliased; the [`ConstraintStore`](crate::ConstraintStore)
/// canonicalizes aliased ids to one representative.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TvarId(pub u32);

impl TvarId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Nominal identity of a class or opaque definition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DefId(pub u32);

impl DefId {
    /// Sentinel for "no identity". An instance whose identity is `NONE` is
    /// a structural shell that is never traversed for resolution.
    pub const NONE: Self = Self(0);

    pub const fn is_some(self) -> bool {
        self.0 != 0
    }
}

// =============================================================================
// TypeTerm - the closed type sum
// =============================================================================

/// Built-in terminal type kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntrinsicKind {
    /// Top type: any value, usable only after refinement.
    Mixed,
    /// Bottom type: no values.
    Empty,
    /// Unsound escape hatch, compatible with everything.
    Any,
    Void,
    Null,
    Bool,
    Num,
    Str,
    Symbol,
    BigInt,
}

/// A literal type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralValue {
    Str(Atom),
    Num(OrderedFloat),
    Bool(bool),
    BigInt(Atom),
}

/// `f64` wrapper with bitwise `Eq`/`Hash` so literal number types can be
/// interned.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for OrderedFloat {}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// An immutable type term.
///
/// The variants cover every shape the resolution walk understands; kinds
/// not listed here do not exist in the system. Payloads bigger than a
/// couple of words live behind arena ids (see module docs).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeTerm {
    /// Reference to a type variable, with the reason the variable was
    /// created (for diagnostics; classification uses the reason stored on
    /// the variable's unresolved state).
    Var(ReasonId, TvarId),

    /// Union of members, in source order.
    Union(TypeListId),
    /// Intersection of members, in source order.
    Intersection(TypeListId),

    /// Object-like type: properties, optional indexer, optional call
    /// signature.
    Object(ObjShapeId),
    /// Function type: parameters, return, optional type-guard predicate.
    Function(FunShapeId),

    /// Array with a single element type.
    Array(TypeId),
    /// Tuple: general element representation plus per-slot elements.
    Tuple(TypeId, TupleListId),

    /// Class instance.
    Instance(InstShapeId),

    /// Polymorphic wrapper: bound type parameters over a body. Only the
    /// body participates in resolution.
    Poly(ParamListId, TypeId),

    /// Namespace-like value: a value-side term plus exported type bindings.
    Namespace { value: TypeId, exports: PropMapId },

    /// Opaque type alias: underlying term hidden outside its defining
    /// module, optional super bound visible everywhere.
    Opaque {
        underlying: Option<TypeId>,
        super_bound: Option<TypeId>,
    },

    /// Exact-object wrapper.
    Exact(TypeId),
    /// `typeof` a value term.
    TypeOf(TypeId),
    /// The class type of an instance term.
    ClassOf(TypeId),
    /// The `this` instance of a class term.
    ThisInstance(TypeId),
    /// Keys of an object-like term.
    KeysOf(TypeId),
    /// Property-matching refinement wrapper.
    MatchingProp { name: Atom, term: TypeId },
    /// A generic with an upper bound standing in for itself.
    GenericBound(TypeId),

    /// Source of an annotation. The wrapped term is in binding position:
    /// exactly one resolved type is expected of it.
    Annot(TypeId),
    /// Nominal application with no explicit arguments; the head is in
    /// binding position.
    NominalApp(TypeId),
    /// Parametric application: head in binding position, arguments in
    /// general position.
    App { head: TypeId, args: TypeListId },

    /// A destructor pending application to a base term.
    Eval { base: TypeId, destructor: DestructorId },

    /// A member value of an enum.
    EnumValue(EnumDefId),
    /// The enum object itself.
    EnumObject(EnumDefId),

    /// Component type: config/instance/renders terms as present.
    Component {
        config: TypeId,
        instance: Option<TypeId>,
        renders: Option<TypeId>,
    },
    /// Renders type: the rendered body plus an optional super-renders
    /// bound.
    Renders {
        body: TypeId,
        super_renders: Option<TypeId>,
    },

    /// Built-in terminal type.
    Intrinsic(IntrinsicKind),
    /// Literal type.
    Literal(LiteralValue),
    /// Internal error marker; terminal.
    Error,
}

// =============================================================================
// Shapes
// =============================================================================

bitflags! {
    /// Property modifiers.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct PropFlags: u8 {
        const OPTIONAL = 1 << 0;
        const METHOD = 1 << 1;
    }
}

/// A property descriptor.
///
/// Plain fields carry one type in `read` (and the same id in `write` when
/// writable); accessor pairs carry a getter type in `read` and a setter
/// type in `write`. Every type present participates in resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Prop {
    pub read: Option<TypeId>,
    pub write: Option<TypeId>,
    pub flags: PropFlags,
}

impl Prop {
    pub const fn field(term: TypeId) -> Self {
        Self {
            read: Some(term),
            write: Some(term),
            flags: PropFlags::empty(),
        }
    }

    pub const fn method(term: TypeId) -> Self {
        Self {
            read: Some(term),
            write: None,
            flags: PropFlags::METHOD,
        }
    }

    pub const fn accessor(getter: Option<TypeId>, setter: Option<TypeId>) -> Self {
        Self {
            read: getter,
            write: setter,
            flags: PropFlags::empty(),
        }
    }

    /// The embedded types of this descriptor, deduplicated for the common
    /// read-write field case.
    pub fn terms(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.read
            .into_iter()
            .chain(self.write.filter(|w| Some(*w) != self.read))
    }
}

/// Indexer on an object-like type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Indexer {
    pub key: TypeId,
    pub value: TypeId,
}

/// Object-like shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjShape {
    pub props: PropMapId,
    pub indexer: Option<Indexer>,
    pub call: Option<CallSigId>,
}

/// Function shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunShape {
    pub params: Vec<TypeId>,
    pub return_type: TypeId,
    /// Guarded type of an attached type-guard predicate, if any.
    pub predicate: Option<TypeId>,
}

/// One tuple slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleElem {
    pub label: Option<Atom>,
    pub term: TypeId,
}

/// A class-instance type-argument binding: parameter name plus the
/// concrete term it was applied at.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeArg {
    pub name: Atom,
    pub term: TypeId,
}

/// Class-instance shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InstShape {
    /// Nominal identity; [`DefId::NONE`] marks a structural shell that the
    /// resolution walk never enters.
    pub def: DefId,
    pub super_term: Option<TypeId>,
    pub static_term: Option<TypeId>,
    pub type_args: Vec<TypeArg>,
    pub own_props: PropMapId,
    pub proto_props: PropMapId,
    pub call: Option<CallSigId>,
}

/// A bound type parameter. Bounds and defaults are carried for
/// instantiation; the resolution walk does not enter them (only a `Poly`
/// body is walked).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParamInfo {
    pub name: Atom,
    pub bound: Option<TypeId>,
    pub default: Option<TypeId>,
}

/// Shared descriptor of an enum definition. Both the enum object and its
/// member values point at one descriptor; the representation term is the
/// structural type of member values.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumDef {
    pub name: Atom,
    pub representation: TypeId,
    pub members: Vec<Atom>,
}

// =============================================================================
// Destructors
// =============================================================================

/// A pending structural transform of a base type: indexing, spreading,
/// mapping, calling. Destructors are evaluated lazily by the evaluation
/// engine; resolution only needs to reach the type terms they embed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Destructor {
    /// Default props of a component base.
    ComponentDefaultProps { default_props: TypeId },
    /// Structural check of a component config against supplied properties.
    ConfigCheck { props: PropMapId },
    /// Element access `base[index]`.
    ElemAccess { index: ElemIndex },
    /// Rest of an object after removing matched properties.
    Rest,
    ReadOnly,
    Required,
    Partial,
    /// Result side of an optional indexed access.
    OptionalIndexResult,
    /// Object spread `{...a, ...b}`.
    ObjectSpread {
        head_slice: Option<ObjectSlice>,
        operands: Vec<SpreadOperand>,
    },
    /// Tuple spread `[...xs, y]`, split into already-resolved and
    /// still-pending elements.
    TupleSpread {
        resolved: Vec<ResolvedSpreadElem>,
        unresolved: Vec<UnresolvedSpreadElem>,
    },
    /// Call of the base with the given arguments.
    Call { args: TypeListId },
    /// Conditional type `base extends E ? T : F` with `infer` parameters.
    Conditional {
        infer_params: ParamListId,
        extends: TypeId,
        then_term: TypeId,
        else_term: TypeId,
    },
    /// Mapping transform over a tuple or object.
    TypeMap(TypeMap),
    /// Component config derivation from default props.
    ReactConfig { default_props: TypeId },
    /// One property slot of a mapped type; carries the per-property result
    /// term (the source term is the eval base).
    MappedProp { prop_type: TypeId },
    /// Promotion of a renders type to its canonical element
    /// representation, once that element has been computed.
    PromoteRenders { resolved_elem: Option<TypeId> },
}

/// Index operand of an element access. Literal keys terminate the walk.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElemIndex {
    Typed(TypeId),
    LitStr(Atom),
    LitNum(u32),
}

/// A flattened object operand of a spread: its properties plus indexer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectSlice {
    pub props: PropMapId,
    pub indexer: Option<Indexer>,
}

/// One operand of an object spread.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpreadOperand {
    /// An already-flattened object slice.
    Slice(ObjectSlice),
    /// A not-yet-flattened type operand.
    Type(TypeId),
}

/// A tuple-spread element whose shape is not yet known.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnresolvedSpreadElem {
    Elem(TypeId),
    Spread(TypeId),
}

/// A tuple-spread element whose shape has been determined.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResolvedSpreadElem {
    Elem(TypeId),
    Spread(ResolvedSpread),
}

/// The determined shape of a spread operand.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResolvedSpread {
    /// An array or tuple: element representation plus tuple slots if
    /// tuple-shaped.
    ArrayLike {
        elem: TypeId,
        elements: Option<TupleListId>,
    },
    /// An `any`-typed spread; terminal.
    Any,
}

/// Mapping transform kinds. `ObjectKeyMirror` carries no embedded term.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeMap {
    TupleMap(TypeId),
    ObjectMap(TypeId),
    ObjectMapi(TypeId),
    ObjectMapConst(TypeId),
    ObjectKeyMirror,
}

// =============================================================================
// Use terms (actions applied to a type)
// =============================================================================

/// An action applied to a type during checking.
///
/// Resolution understands exactly two shapes: a plain wrapped type and a
/// call. Every other action is terminal for the walk; richer use-shape
/// support is future work, not a defect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UseTerm {
    /// A type used as-is.
    Ty(TypeId),
    /// A call action.
    Call(CallUse),
    /// Property read; terminal for resolution.
    PropRead { name: Atom },
    /// Property write; terminal for resolution.
    PropWrite { name: Atom },
    /// Generic instantiation request; terminal for resolution.
    Instantiate { args: TypeListId },
}

/// Call action payload: argument terms plus the variable the call's result
/// flows into.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CallUse {
    pub args: TypeListId,
    pub result: TvarId,
}
