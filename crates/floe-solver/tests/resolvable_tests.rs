use super::*;
use crate::CheckContext;
use crate::reason::{Reason, ReasonDesc};
use crate::types::{
    BranchId, CallUse, DefId, Destructor, ElemIndex, EnumDef, FunShape, InstShape, ObjectSlice,
    Prop, ResolvedSpread, ResolvedSpreadElem, SpreadOperand, TupleElem, TypeMap, TypeParamInfo,
    TypeTerm, UnresolvedSpreadElem, UseTerm,
};

const MODE: WalkMode = WalkMode::Annotation;

/// Fresh variable with an ordinary (non-exempt) reason, plus a term
/// referencing it.
fn ordinary(cx: &mut CheckContext, name: &str) -> (TvarId, TypeId) {
    let atom = cx.names.intern_string(name);
    let tvar = cx.fresh_tvar(Reason::synthetic(ReasonDesc::Custom(atom)));
    let term = var(cx, tvar);
    (tvar, term)
}

/// Fresh variable whose reason marks a constant-property tag.
fn const_tag(cx: &mut CheckContext, name: &str) -> (TvarId, TypeId) {
    let atom = cx.names.intern_string(name);
    let tvar = cx.fresh_tvar(Reason::synthetic(ReasonDesc::ConstPropName(atom)));
    let term = var(cx, tvar);
    (tvar, term)
}

/// Fresh variable whose reason marks a type-parameter instantiation.
fn instantiable(cx: &mut CheckContext, name: &str) -> (TvarId, TypeId) {
    let atom = cx.names.intern_string(name);
    let tvar = cx.fresh_tvar(Reason::synthetic(ReasonDesc::TypeParamInstantiation(atom)));
    let term = var(cx, tvar);
    (tvar, term)
}

/// Variable-reference term mirroring the variable's stored reason.
fn var(cx: &mut CheckContext, tvar: TvarId) -> TypeId {
    let reason = match cx.tvar_state(tvar) {
        ConstraintState::Unresolved(reason) => reason,
        _ => cx.types.mk_reason(Reason::synthetic(ReasonDesc::FunReturn)),
    };
    cx.types.mk_term(TypeTerm::Var(reason, tvar))
}

fn walk_fresh(cx: &mut CheckContext, term: TypeId) -> JobMap {
    let mut acc = JobMap::new();
    walk(cx, MODE, &mut acc, term);
    acc
}

fn sorted_jobs(acc: &JobMap) -> Vec<(TvarId, Job)> {
    let mut jobs: Vec<_> = acc.jobs().collect();
    jobs.sort_by_key(|(id, _)| *id);
    jobs
}

fn is_leaf(job: Option<Job>) -> bool {
    matches!(job, Some(Job::UnresolvedLeaf { .. }))
}

// =============================================================================
// Variable dereference
// =============================================================================

#[test]
fn union_of_fresh_tvars_yields_one_leaf_each() {
    let mut cx = CheckContext::new();
    let (a, a_term) = ordinary(&mut cx, "a");
    let (b, b_term) = ordinary(&mut cx, "b");
    let union = cx.types.union([a_term, b_term]);

    let acc = walk_fresh(&mut cx, union);
    assert_eq!(acc.len(), 2);
    assert!(is_leaf(acc.get(a)));
    assert!(is_leaf(acc.get(b)));
}

#[test]
fn constant_tag_binds_while_ordinary_prop_leaks() {
    let mut cx = CheckContext::new();
    let (tag_var, tag_term) = const_tag(&mut cx, "kind");
    let (value_var, value_term) = ordinary(&mut cx, "value");

    let tag_name = cx.names.intern_string("tag");
    let value_name = cx.names.intern_string("value");
    let object = cx.types.object([
        (tag_name, Prop::field(tag_term)),
        (value_name, Prop::field(value_term)),
    ]);

    let acc = walk_fresh(&mut cx, object);
    assert_eq!(acc.get(tag_var), Some(Job::Binding));
    assert!(is_leaf(acc.get(value_var)));
}

#[test]
fn instantiable_tvar_in_general_position_yields_no_job() {
    let mut cx = CheckContext::new();
    let (_, inst_term) = instantiable(&mut cx, "T");
    let union = cx.types.union([inst_term, TypeId::NUM]);

    let acc = walk_fresh(&mut cx, union);
    assert!(acc.is_empty());
}

#[test]
fn binding_position_overrides_all_exemptions() {
    let mut cx = CheckContext::new();
    let (inst_var, inst_term) = instantiable(&mut cx, "T");
    let (tag_var, tag_term) = const_tag(&mut cx, "kind");

    let mut acc = JobMap::new();
    walk_binding(&mut cx, MODE, &mut acc, inst_term);
    walk_binding(&mut cx, MODE, &mut acc, tag_term);

    assert_eq!(acc.get(inst_var), Some(Job::Binding));
    assert_eq!(acc.get(tag_var), Some(Job::Binding));
}

#[test]
fn fully_resolved_short_circuits_everything_reachable() {
    let mut cx = CheckContext::new();
    let (_, leaky_term) = ordinary(&mut cx, "leak");
    let union = cx.types.union([leaky_term, TypeId::STR]);

    let reason = cx.types.mk_reason(Reason::synthetic(ReasonDesc::FunReturn));
    let frozen = cx.store.fresh_tvar(reason);
    // The bound term would produce a leaf if traversed; the terminal state
    // promises it never is.
    cx.store.fully_resolve(frozen, union);
    let frozen_term = cx.types.mk_term(TypeTerm::Var(reason, frozen));

    let acc = walk_fresh(&mut cx, frozen_term);
    assert!(acc.is_empty());
}

#[test]
fn resolved_tvar_unfolds_once_under_visited_marker() {
    let mut cx = CheckContext::new();
    let (inner_var, inner_term) = ordinary(&mut cx, "inner");

    let reason = cx.types.mk_reason(Reason::synthetic(ReasonDesc::CallResult));
    let outer = cx.store.fresh_tvar(reason);
    let prop_name = cx.names.intern_string("p");
    let object = cx.types.object([(prop_name, Prop::field(inner_term))]);
    cx.store.resolve(outer, object);
    let outer_term = cx.types.mk_term(TypeTerm::Var(reason, outer));

    let acc = walk_fresh(&mut cx, outer_term);
    assert_eq!(acc.get(outer), Some(Job::AlreadyVisited));
    assert!(is_leaf(acc.get(inner_var)));
    assert_eq!(acc.len(), 2);
}

#[test]
fn self_referential_instance_super_terminates() {
    let mut cx = CheckContext::new();
    let reason = cx.types.mk_reason(Reason::synthetic(ReasonDesc::FunReturn));
    let this = cx.store.fresh_tvar(reason);
    let this_term = cx.types.mk_term(TypeTerm::Var(reason, this));

    let own = cx.types.intern_prop_map(Default::default());
    let proto = cx.types.intern_prop_map(Default::default());
    let shape = cx.types.intern_inst_shape(InstShape {
        def: DefId(1),
        super_term: Some(this_term),
        static_term: None,
        type_args: Vec::new(),
        own_props: own,
        proto_props: proto,
        call: None,
    });
    let instance = cx.types.mk_term(TypeTerm::Instance(shape));
    // The super edge loops straight back to the instance.
    cx.store.resolve(this, instance);

    let acc = walk_fresh(&mut cx, instance);
    assert_eq!(sorted_jobs(&acc), vec![(this, Job::AlreadyVisited)]);
}

#[test]
fn mutually_recursive_resolved_tvars_terminate() {
    let mut cx = CheckContext::new();
    let reason = cx.types.mk_reason(Reason::synthetic(ReasonDesc::FunReturn));
    let a = cx.store.fresh_tvar(reason);
    let b = cx.store.fresh_tvar(reason);
    let a_term = cx.types.mk_term(TypeTerm::Var(reason, a));
    let b_term = cx.types.mk_term(TypeTerm::Var(reason, b));

    let next = cx.names.intern_string("next");
    let a_obj = cx.types.object([(next, Prop::field(b_term))]);
    let b_obj = cx.types.object([(next, Prop::field(a_term))]);
    cx.store.resolve(a, a_obj);
    cx.store.resolve(b, b_obj);

    let acc = walk_fresh(&mut cx, a_term);
    assert_eq!(
        sorted_jobs(&acc),
        vec![(a, Job::AlreadyVisited), (b, Job::AlreadyVisited)]
    );
}

#[test]
fn walk_is_idempotent() {
    let mut cx = CheckContext::new();
    let (_, tag_term) = const_tag(&mut cx, "kind");
    let (_, value_term) = ordinary(&mut cx, "value");
    let union = cx.types.union([tag_term, value_term]);

    let mut acc = JobMap::new();
    walk(&mut cx, MODE, &mut acc, union);
    let first = sorted_jobs(&acc);
    walk(&mut cx, MODE, &mut acc, union);
    assert_eq!(sorted_jobs(&acc), first);
    assert_eq!(acc.len(), 2);
}

#[test]
fn aliased_ids_accumulate_under_one_representative() {
    let mut cx = CheckContext::new();
    let (a, a_term) = ordinary(&mut cx, "a");
    let (b, b_term) = ordinary(&mut cx, "b");
    cx.store.alias(a, b);

    let union = cx.types.union([a_term, b_term]);
    let acc = walk_fresh(&mut cx, union);
    assert_eq!(acc.len(), 1);
    let root = cx.store.find(a);
    assert!(is_leaf(acc.get(root)));
}

// =============================================================================
// Structural recursion
// =============================================================================

#[test]
fn internal_properties_are_skipped() {
    let mut cx = CheckContext::new();
    let (_, hidden_term) = ordinary(&mut cx, "hidden");
    let internal_name = cx.names.intern_string(".call");
    let object = cx.types.object([(internal_name, Prop::field(hidden_term))]);

    let acc = walk_fresh(&mut cx, object);
    assert!(acc.is_empty());
}

#[test]
fn accessor_props_walk_both_types() {
    let mut cx = CheckContext::new();
    let (getter_var, getter_term) = ordinary(&mut cx, "get");
    let (setter_var, setter_term) = ordinary(&mut cx, "set");
    let name = cx.names.intern_string("x");
    let object = cx
        .types
        .object([(name, Prop::accessor(Some(getter_term), Some(setter_term)))]);

    let acc = walk_fresh(&mut cx, object);
    assert!(is_leaf(acc.get(getter_var)));
    assert!(is_leaf(acc.get(setter_var)));
}

#[test]
fn function_walks_params_return_and_predicate() {
    let mut cx = CheckContext::new();
    let (param_var, param_term) = ordinary(&mut cx, "param");
    let (ret_var, ret_term) = ordinary(&mut cx, "ret");
    let (guard_var, guard_term) = ordinary(&mut cx, "guard");

    let shape = cx.types.intern_fun_shape(FunShape {
        params: vec![param_term],
        return_type: ret_term,
        predicate: Some(guard_term),
    });
    let function = cx.types.mk_term(TypeTerm::Function(shape));

    let acc = walk_fresh(&mut cx, function);
    assert!(is_leaf(acc.get(param_var)));
    assert!(is_leaf(acc.get(ret_var)));
    assert!(is_leaf(acc.get(guard_var)));
}

#[test]
fn poly_walks_body_but_not_parameter_bounds() {
    let mut cx = CheckContext::new();
    let (bound_var, bound_term) = ordinary(&mut cx, "bound");
    let (body_var, body_term) = ordinary(&mut cx, "body");

    let name = cx.names.intern_string("T");
    let params = cx.types.intern_param_list(vec![TypeParamInfo {
        name,
        bound: Some(bound_term),
        default: None,
    }]);
    let poly = cx.types.mk_term(TypeTerm::Poly(params, body_term));

    let acc = walk_fresh(&mut cx, poly);
    assert!(is_leaf(acc.get(body_var)));
    assert_eq!(acc.get(bound_var), None);
}

#[test]
fn identityless_instance_is_never_entered() {
    let mut cx = CheckContext::new();
    let (_, prop_term) = ordinary(&mut cx, "p");
    let name = cx.names.intern_string("p");
    let own = cx.types.intern_prop_map([(name, Prop::field(prop_term))].into_iter().collect());
    let proto = cx.types.intern_prop_map(Default::default());
    let shape = cx.types.intern_inst_shape(InstShape {
        def: DefId::NONE,
        super_term: None,
        static_term: None,
        type_args: Vec::new(),
        own_props: own,
        proto_props: proto,
        call: None,
    });
    let instance = cx.types.mk_term(TypeTerm::Instance(shape));

    let acc = walk_fresh(&mut cx, instance);
    assert!(acc.is_empty());
}

#[test]
fn annotation_source_is_a_binding_position() {
    let mut cx = CheckContext::new();
    let (inst_var, inst_term) = instantiable(&mut cx, "T");
    let annot = cx.types.mk_term(TypeTerm::Annot(inst_term));

    // Even an instantiable variable binds when it is the annotation
    // source.
    let acc = walk_fresh(&mut cx, annot);
    assert_eq!(acc.get(inst_var), Some(Job::Binding));
}

#[test]
fn application_head_binds_and_args_stay_general() {
    let mut cx = CheckContext::new();
    let (head_var, head_term) = ordinary(&mut cx, "List");
    let (arg_var, arg_term) = ordinary(&mut cx, "elem");
    let args = cx.types.intern_type_list([arg_term]);
    let app = cx.types.mk_term(TypeTerm::App {
        head: head_term,
        args,
    });

    let acc = walk_fresh(&mut cx, app);
    assert_eq!(acc.get(head_var), Some(Job::Binding));
    assert!(is_leaf(acc.get(arg_var)));
}

#[test]
fn enum_value_walks_shared_representation() {
    let mut cx = CheckContext::new();
    let (repr_var, repr_term) = ordinary(&mut cx, "repr");
    let name = cx.names.intern_string("Color");
    let def = cx.types.intern_enum_def(EnumDef {
        name,
        representation: repr_term,
        members: Vec::new(),
    });
    let value = cx.types.mk_term(TypeTerm::EnumValue(def));

    let acc = walk_fresh(&mut cx, value);
    assert!(is_leaf(acc.get(repr_var)));
}

#[test]
fn speculative_mode_tags_leaves_with_branch() {
    let mut cx = CheckContext::new();
    let (tvar, term) = ordinary(&mut cx, "w");

    let branch = BranchId(7);
    let mut acc = JobMap::new();
    walk(&mut cx, WalkMode::Speculative(branch), &mut acc, term);

    match acc.get(tvar) {
        Some(Job::UnresolvedLeaf { mode, .. }) => {
            assert_eq!(mode.branch(), Some(branch));
        }
        other => panic!("expected unresolved leaf, got {other:?}"),
    }
}

// =============================================================================
// Destructors
// =============================================================================

fn eval_term(cx: &mut CheckContext, base: TypeId, destructor: Destructor) -> TypeId {
    let id = cx.types.intern_destructor(destructor);
    cx.types.mk_term(TypeTerm::Eval {
        base,
        destructor: id,
    })
}

#[test]
fn typed_element_access_walks_index_but_literal_does_not() {
    let mut cx = CheckContext::new();
    let (index_var, index_term) = ordinary(&mut cx, "i");
    let typed = eval_term(
        &mut cx,
        TypeId::NUM,
        Destructor::ElemAccess {
            index: ElemIndex::Typed(index_term),
        },
    );
    let acc = walk_fresh(&mut cx, typed);
    assert!(is_leaf(acc.get(index_var)));

    let key = cx.names.intern_string("length");
    let literal = eval_term(
        &mut cx,
        TypeId::NUM,
        Destructor::ElemAccess {
            index: ElemIndex::LitStr(key),
        },
    );
    let acc = walk_fresh(&mut cx, literal);
    assert!(acc.is_empty());
}

#[test]
fn call_destructor_walks_every_argument() {
    let mut cx = CheckContext::new();
    let (a_var, a_term) = ordinary(&mut cx, "a");
    let (b_var, b_term) = ordinary(&mut cx, "b");
    let args = cx.types.intern_type_list([a_term, b_term]);
    let call = eval_term(&mut cx, TypeId::NUM, Destructor::Call { args });

    let acc = walk_fresh(&mut cx, call);
    assert!(is_leaf(acc.get(a_var)));
    assert!(is_leaf(acc.get(b_var)));
}

#[test]
fn conditional_walks_infer_bounds_and_all_branches() {
    let mut cx = CheckContext::new();
    let (bound_var, bound_term) = ordinary(&mut cx, "bound");
    let (extends_var, extends_term) = ordinary(&mut cx, "extends");
    let (then_var, then_term) = ordinary(&mut cx, "then");
    let (else_var, else_term) = ordinary(&mut cx, "else");

    let name = cx.names.intern_string("U");
    let infer_params = cx.types.intern_param_list(vec![TypeParamInfo {
        name,
        bound: Some(bound_term),
        default: None,
    }]);
    let conditional = eval_term(
        &mut cx,
        TypeId::STR,
        Destructor::Conditional {
            infer_params,
            extends: extends_term,
            then_term,
            else_term,
        },
    );

    let acc = walk_fresh(&mut cx, conditional);
    for tvar in [bound_var, extends_var, then_var, else_var] {
        assert!(is_leaf(acc.get(tvar)), "missing leaf for {tvar:?}");
    }
}

#[test]
fn object_spread_walks_slices_and_type_operands() {
    let mut cx = CheckContext::new();
    let (slice_var, slice_term) = ordinary(&mut cx, "sliced");
    let (operand_var, operand_term) = ordinary(&mut cx, "operand");

    let name = cx.names.intern_string("p");
    let props = cx
        .types
        .intern_prop_map([(name, Prop::field(slice_term))].into_iter().collect());
    let spread = eval_term(
        &mut cx,
        TypeId::MIXED,
        Destructor::ObjectSpread {
            head_slice: Some(ObjectSlice {
                props,
                indexer: None,
            }),
            operands: vec![SpreadOperand::Type(operand_term)],
        },
    );

    let acc = walk_fresh(&mut cx, spread);
    assert!(is_leaf(acc.get(slice_var)));
    assert!(is_leaf(acc.get(operand_var)));
}

#[test]
fn tuple_spread_walks_pending_and_resolved_but_not_any() {
    let mut cx = CheckContext::new();
    let (pending_var, pending_term) = ordinary(&mut cx, "pending");
    let (elem_var, elem_term) = ordinary(&mut cx, "elem");
    let (inner_var, inner_term) = ordinary(&mut cx, "inner");
    let (slot_var, slot_term) = ordinary(&mut cx, "slot");

    let slots = cx.types.intern_tuple_list(vec![TupleElem {
        label: None,
        term: slot_term,
    }]);
    let spread = eval_term(
        &mut cx,
        TypeId::MIXED,
        Destructor::TupleSpread {
            resolved: vec![
                ResolvedSpreadElem::Elem(elem_term),
                ResolvedSpreadElem::Spread(ResolvedSpread::ArrayLike {
                    elem: inner_term,
                    elements: Some(slots),
                }),
                ResolvedSpreadElem::Spread(ResolvedSpread::Any),
            ],
            unresolved: vec![UnresolvedSpreadElem::Spread(pending_term)],
        },
    );

    let acc = walk_fresh(&mut cx, spread);
    for tvar in [pending_var, elem_var, inner_var, slot_var] {
        assert!(is_leaf(acc.get(tvar)), "missing leaf for {tvar:?}");
    }
    assert_eq!(acc.len(), 4);
}

#[test]
fn type_map_walks_mapper_except_key_mirror() {
    let mut cx = CheckContext::new();
    let (mapper_var, mapper_term) = ordinary(&mut cx, "mapper");
    let mapped = eval_term(
        &mut cx,
        TypeId::MIXED,
        Destructor::TypeMap(TypeMap::ObjectMap(mapper_term)),
    );
    let acc = walk_fresh(&mut cx, mapped);
    assert!(is_leaf(acc.get(mapper_var)));

    let mirrored = eval_term(
        &mut cx,
        TypeId::MIXED,
        Destructor::TypeMap(TypeMap::ObjectKeyMirror),
    );
    let acc = walk_fresh(&mut cx, mirrored);
    assert!(acc.is_empty());
}

// =============================================================================
// Use terms
// =============================================================================

#[test]
fn call_use_walks_arguments_and_result_tvar() {
    let mut cx = CheckContext::new();
    let (arg_var, arg_term) = ordinary(&mut cx, "arg");
    let (result_var, _) = ordinary(&mut cx, "result");
    let args = cx.types.intern_type_list([arg_term]);

    let mut acc = JobMap::new();
    walk_use(
        &mut cx,
        MODE,
        &mut acc,
        &UseTerm::Call(CallUse {
            args,
            result: result_var,
        }),
    );
    assert!(is_leaf(acc.get(arg_var)));
    assert!(is_leaf(acc.get(result_var)));
}

#[test]
fn unrecognized_use_shapes_are_terminal() {
    let mut cx = CheckContext::new();
    let name = cx.names.intern_string("p");

    let mut acc = JobMap::new();
    walk_use(&mut cx, MODE, &mut acc, &UseTerm::PropRead { name });
    walk_use(&mut cx, MODE, &mut acc, &UseTerm::PropWrite { name });
    assert!(acc.is_empty());
}
