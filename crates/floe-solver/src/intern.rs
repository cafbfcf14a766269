//! Type interning arena.
//!
//! The interner owns every type term and every aggregate payload the terms
//! point at. Terms are deduplicated structurally, so `TypeId` equality is
//! type-term equality and re-interning an identical term is free. Payload
//! tables (lists, maps, shapes, destructors, reasons) are append-only
//! arenas; their ids are issued once and stay valid for the interner's
//! lifetime.
//!
//! One interner per checking task. The interner is never shared across
//! tasks, so interning takes `&mut self` and lookups take `&self`.

use crate::reason::Reason;
use crate::types::{
    CallSigId, Destructor, DestructorId, EnumDef, EnumDefId, FunShape, FunShapeId, InstShape,
    InstShapeId, IntrinsicKind, ObjShape, ObjShapeId, ParamListId, Prop, PropMapId, ReasonId,
    TupleElem, TupleListId, TypeId, TypeListId, TypeParamInfo, TypeTerm,
};
use floe_common::interner::Atom;
use floe_common::limits;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::trace;

/// Insertion-ordered property map. Iteration order is the order
/// properties were declared, which keeps walk order deterministic.
pub type PropMap = IndexMap<Atom, Prop>;

/// A type list with inline storage for the common short case.
pub type TypeList = SmallVec<[TypeId; limits::TYPE_LIST_INLINE]>;

/// Arena and dedup tables for type terms and their payloads.
pub struct TypeInterner {
    terms: Vec<TypeTerm>,
    dedup: FxHashMap<TypeTerm, TypeId>,

    type_lists: Vec<TypeList>,
    tuple_lists: Vec<Vec<TupleElem>>,
    prop_maps: Vec<PropMap>,
    call_sigs: Vec<TypeId>,
    fun_shapes: Vec<FunShape>,
    obj_shapes: Vec<ObjShape>,
    inst_shapes: Vec<InstShape>,
    param_lists: Vec<Vec<TypeParamInfo>>,
    enum_defs: Vec<EnumDef>,
    destructors: Vec<Destructor>,
    reasons: Vec<Reason>,
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeInterner {
    pub fn new() -> Self {
        let mut interner = Self {
            terms: Vec::new(),
            dedup: FxHashMap::default(),
            type_lists: Vec::new(),
            tuple_lists: Vec::new(),
            prop_maps: Vec::new(),
            call_sigs: Vec::new(),
            fun_shapes: Vec::new(),
            obj_shapes: Vec::new(),
            inst_shapes: Vec::new(),
            param_lists: Vec::new(),
            enum_defs: Vec::new(),
            destructors: Vec::new(),
            reasons: Vec::new(),
        };
        // Pre-intern terminal types so the TypeId constants hold. Order
        // must match the constant definitions in types.rs.
        for kind in [
            IntrinsicKind::Mixed,
            IntrinsicKind::Empty,
            IntrinsicKind::Any,
            IntrinsicKind::Void,
            IntrinsicKind::Null,
            IntrinsicKind::Bool,
            IntrinsicKind::Num,
            IntrinsicKind::Str,
            IntrinsicKind::Symbol,
            IntrinsicKind::BigInt,
        ] {
            interner.mk_term(TypeTerm::Intrinsic(kind));
        }
        let error = interner.mk_term(TypeTerm::Error);
        debug_assert_eq!(error, TypeId::ERROR);
        interner
    }

    // -------------------------------------------------------------------------
    // Terms
    // -------------------------------------------------------------------------

    /// Intern a type term, returning its id. Structurally identical terms
    /// intern to the same id.
    pub fn mk_term(&mut self, term: TypeTerm) -> TypeId {
        if let Some(&id) = self.dedup.get(&term) {
            return id;
        }
        let id = TypeId(self.terms.len() as u32);
        trace!(type_id = id.0, kind = ?std::mem::discriminant(&term), "intern type term");
        self.dedup.insert(term.clone(), id);
        self.terms.push(term);
        id
    }

    /// Look up a term by id. Ids issued by this interner always resolve.
    pub fn lookup(&self, id: TypeId) -> &TypeTerm {
        &self.terms[id.index()]
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    // -------------------------------------------------------------------------
    // Payload tables
    // -------------------------------------------------------------------------

    pub fn intern_type_list(&mut self, members: impl IntoIterator<Item = TypeId>) -> TypeListId {
        let id = TypeListId(self.type_lists.len() as u32);
        self.type_lists.push(members.into_iter().collect());
        id
    }

    pub fn type_list(&self, id: TypeListId) -> &[TypeId] {
        &self.type_lists[id.index()]
    }

    pub fn intern_tuple_list(&mut self, elems: Vec<TupleElem>) -> TupleListId {
        let id = TupleListId(self.tuple_lists.len() as u32);
        self.tuple_lists.push(elems);
        id
    }

    pub fn tuple_list(&self, id: TupleListId) -> &[TupleElem] {
        &self.tuple_lists[id.index()]
    }

    pub fn intern_prop_map(&mut self, map: PropMap) -> PropMapId {
        let id = PropMapId(self.prop_maps.len() as u32);
        self.prop_maps.push(map);
        id
    }

    pub fn prop_map(&self, id: PropMapId) -> &PropMap {
        &self.prop_maps[id.index()]
    }

    pub fn intern_call_sig(&mut self, term: TypeId) -> CallSigId {
        let id = CallSigId(self.call_sigs.len() as u32);
        self.call_sigs.push(term);
        id
    }

    pub fn call_signature(&self, id: CallSigId) -> TypeId {
        self.call_sigs[id.index()]
    }

    pub fn intern_fun_shape(&mut self, shape: FunShape) -> FunShapeId {
        let id = FunShapeId(self.fun_shapes.len() as u32);
        self.fun_shapes.push(shape);
        id
    }

    pub fn fun_shape(&self, id: FunShapeId) -> &FunShape {
        &self.fun_shapes[id.index()]
    }

    pub fn intern_obj_shape(&mut self, shape: ObjShape) -> ObjShapeId {
        let id = ObjShapeId(self.obj_shapes.len() as u32);
        self.obj_shapes.push(shape);
        id
    }

    pub fn obj_shape(&self, id: ObjShapeId) -> &ObjShape {
        &self.obj_shapes[id.index()]
    }

    pub fn intern_inst_shape(&mut self, shape: InstShape) -> InstShapeId {
        let id = InstShapeId(self.inst_shapes.len() as u32);
        self.inst_shapes.push(shape);
        id
    }

    pub fn inst_shape(&self, id: InstShapeId) -> &InstShape {
        &self.inst_shapes[id.index()]
    }

    pub fn intern_param_list(&mut self, params: Vec<TypeParamInfo>) -> ParamListId {
        let id = ParamListId(self.param_lists.len() as u32);
        self.param_lists.push(params);
        id
    }

    pub fn param_list(&self, id: ParamListId) -> &[TypeParamInfo] {
        &self.param_lists[id.index()]
    }

    pub fn intern_enum_def(&mut self, def: EnumDef) -> EnumDefId {
        let id = EnumDefId(self.enum_defs.len() as u32);
        self.enum_defs.push(def);
        id
    }

    pub fn enum_def(&self, id: EnumDefId) -> &EnumDef {
        &self.enum_defs[id.index()]
    }

    pub fn intern_destructor(&mut self, destructor: Destructor) -> DestructorId {
        let id = DestructorId(self.destructors.len() as u32);
        self.destructors.push(destructor);
        id
    }

    pub fn destructor(&self, id: DestructorId) -> &Destructor {
        &self.destructors[id.index()]
    }

    pub fn mk_reason(&mut self, reason: Reason) -> ReasonId {
        let id = ReasonId(self.reasons.len() as u32);
        self.reasons.push(reason);
        id
    }

    pub fn reason(&self, id: ReasonId) -> &Reason {
        &self.reasons[id.index()]
    }

    // -------------------------------------------------------------------------
    // Convenience constructors
    // -------------------------------------------------------------------------

    /// Union of the given members, preserving member order.
    pub fn union(&mut self, members: impl IntoIterator<Item = TypeId>) -> TypeId {
        let list = self.intern_type_list(members);
        self.mk_term(TypeTerm::Union(list))
    }

    /// Intersection of the given members, preserving member order.
    pub fn intersection(&mut self, members: impl IntoIterator<Item = TypeId>) -> TypeId {
        let list = self.intern_type_list(members);
        self.mk_term(TypeTerm::Intersection(list))
    }

    /// Object type from named properties, without indexer or call
    /// signature.
    pub fn object(&mut self, props: impl IntoIterator<Item = (Atom, Prop)>) -> TypeId {
        let map = self.intern_prop_map(props.into_iter().collect());
        let shape = self.intern_obj_shape(ObjShape {
            props: map,
            indexer: None,
            call: None,
        });
        self.mk_term(TypeTerm::Object(shape))
    }

    /// Function type from parameter and return terms.
    pub fn function(&mut self, params: Vec<TypeId>, return_type: TypeId) -> TypeId {
        let shape = self.intern_fun_shape(FunShape {
            params,
            return_type,
            predicate: None,
        });
        self.mk_term(TypeTerm::Function(shape))
    }
}

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod tests;
