//! Compact type and job formatting for trace output and test assertions.
//!
//! This is not the diagnostics renderer — it produces short one-line
//! descriptions for logs, where a full pretty-printer would drown the
//! signal.

use crate::CheckContext;
use crate::resolvable::Job;
use crate::store::ConstraintState;
use crate::types::{
    Destructor, ElemIndex, IntrinsicKind, LiteralValue, TvarId, TypeId, TypeTerm,
};

/// Formats terms and jobs against a checking context.
pub struct TypeFormatter<'cx> {
    cx: &'cx CheckContext,
}

impl<'cx> TypeFormatter<'cx> {
    pub fn new(cx: &'cx CheckContext) -> Self {
        Self { cx }
    }

    /// One-line rendering of a term. Nested terms render shallowly;
    /// variables render as `'N`.
    pub fn format_type(&self, id: TypeId) -> String {
        match *self.cx.types.lookup(id) {
            TypeTerm::Var(_, tvar) => format!("'{}", tvar.0),
            TypeTerm::Union(members) => self.format_members(members, " | "),
            TypeTerm::Intersection(members) => self.format_members(members, " & "),
            TypeTerm::Object(_) => "{..}".to_string(),
            TypeTerm::Function(shape_id) => {
                let shape = self.cx.types.fun_shape(shape_id);
                format!(
                    "({}) => {}",
                    shape
                        .params
                        .iter()
                        .map(|&p| self.format_type(p))
                        .collect::<Vec<_>>()
                        .join(", "),
                    self.format_type(shape.return_type)
                )
            }
            TypeTerm::Array(elem) => format!("Array<{}>", self.format_type(elem)),
            TypeTerm::Tuple(_, elements) => {
                format!("[{} elems]", self.cx.types.tuple_list(elements).len())
            }
            TypeTerm::Instance(shape_id) => {
                let shape = self.cx.types.inst_shape(shape_id);
                if shape.def.is_some() {
                    format!("instance#{}", shape.def.0)
                } else {
                    "instance".to_string()
                }
            }
            TypeTerm::Poly(_, body) => format!("poly({})", self.format_type(body)),
            TypeTerm::Namespace { .. } => "namespace".to_string(),
            TypeTerm::Opaque { .. } => "opaque".to_string(),
            TypeTerm::Exact(inner) => format!("$Exact<{}>", self.format_type(inner)),
            TypeTerm::TypeOf(inner) => format!("typeof {}", self.format_type(inner)),
            TypeTerm::ClassOf(inner) => format!("Class<{}>", self.format_type(inner)),
            TypeTerm::ThisInstance(inner) => format!("this({})", self.format_type(inner)),
            TypeTerm::KeysOf(inner) => format!("$Keys<{}>", self.format_type(inner)),
            TypeTerm::MatchingProp { name, .. } => {
                format!("$PropertyType<., {}>", self.cx.names.resolve(name))
            }
            TypeTerm::GenericBound(bound) => format!("generic<: {}", self.format_type(bound)),
            TypeTerm::Annot(source) => format!("annot({})", self.format_type(source)),
            TypeTerm::NominalApp(head) => format!("app({})", self.format_type(head)),
            TypeTerm::App { head, .. } => format!("app({}<..>)", self.format_type(head)),
            TypeTerm::Eval { base, destructor } => format!(
                "eval({}, {})",
                self.format_type(base),
                self.format_destructor(destructor)
            ),
            TypeTerm::EnumValue(def) => {
                format!("enum {}", self.cx.names.resolve(self.cx.types.enum_def(def).name))
            }
            TypeTerm::EnumObject(def) => {
                format!("enum-object {}", self.cx.names.resolve(self.cx.types.enum_def(def).name))
            }
            TypeTerm::Component { .. } => "component".to_string(),
            TypeTerm::Renders { .. } => "renders".to_string(),
            TypeTerm::Intrinsic(kind) => intrinsic_name(kind).to_string(),
            TypeTerm::Literal(ref value) => match *value {
                LiteralValue::Str(atom) => format!("\"{}\"", self.cx.names.resolve(atom)),
                LiteralValue::Num(n) => format!("{}", n.0),
                LiteralValue::Bool(b) => b.to_string(),
                LiteralValue::BigInt(atom) => format!("{}n", self.cx.names.resolve(atom)),
            },
            TypeTerm::Error => "<error>".to_string(),
        }
    }

    /// Short description of a job, for log lines keyed by variable.
    pub fn format_job(&self, tvar: TvarId, job: Job) -> String {
        match job {
            Job::AlreadyVisited => format!("'{}: visited", tvar.0),
            Job::Binding => format!("'{}: binding", tvar.0),
            Job::UnresolvedLeaf { .. } => format!("'{}: unresolved", tvar.0),
        }
    }

    /// Render a variable with a state the caller already probed. State
    /// lookup compresses union-find paths and needs the store mutably, so
    /// it stays on the caller's side.
    pub fn format_tvar(&self, id: TvarId, state: ConstraintState) -> String {
        match state {
            ConstraintState::Unresolved(_) => format!("'{}(unresolved)", id.0),
            ConstraintState::Resolved(term) => format!("'{}={}", id.0, self.format_type(term)),
            ConstraintState::FullyResolved(term) => {
                format!("'{}=!{}", id.0, self.format_type(term))
            }
        }
    }

    fn format_members(&self, members: crate::types::TypeListId, sep: &str) -> String {
        self.cx
            .types
            .type_list(members)
            .iter()
            .map(|&m| self.format_type(m))
            .collect::<Vec<_>>()
            .join(sep)
    }

    fn format_destructor(&self, id: crate::types::DestructorId) -> String {
        match self.cx.types.destructor(id) {
            Destructor::ComponentDefaultProps { .. } => "default-props".to_string(),
            Destructor::ConfigCheck { .. } => "config-check".to_string(),
            Destructor::ElemAccess { index } => match index {
                ElemIndex::Typed(term) => format!("[{}]", self.format_type(*term)),
                ElemIndex::LitStr(atom) => format!("[\"{}\"]", self.cx.names.resolve(*atom)),
                ElemIndex::LitNum(n) => format!("[{n}]"),
            },
            Destructor::Rest => "rest".to_string(),
            Destructor::ReadOnly => "readonly".to_string(),
            Destructor::Required => "required".to_string(),
            Destructor::Partial => "partial".to_string(),
            Destructor::OptionalIndexResult => "optional-index".to_string(),
            Destructor::ObjectSpread { operands, .. } => {
                format!("spread({} operands)", operands.len())
            }
            Destructor::TupleSpread {
                resolved,
                unresolved,
            } => format!(
                "tuple-spread({}+{})",
                resolved.len(),
                unresolved.len()
            ),
            Destructor::Call { args } => {
                format!("call({} args)", self.cx.types.type_list(*args).len())
            }
            Destructor::Conditional { .. } => "conditional".to_string(),
            Destructor::TypeMap(_) => "type-map".to_string(),
            Destructor::ReactConfig { .. } => "react-config".to_string(),
            Destructor::MappedProp { .. } => "mapped-prop".to_string(),
            Destructor::PromoteRenders { .. } => "promote-renders".to_string(),
        }
    }
}

const fn intrinsic_name(kind: IntrinsicKind) -> &'static str {
    match kind {
        IntrinsicKind::Mixed => "mixed",
        IntrinsicKind::Empty => "empty",
        IntrinsicKind::Any => "any",
        IntrinsicKind::Void => "void",
        IntrinsicKind::Null => "null",
        IntrinsicKind::Bool => "boolean",
        IntrinsicKind::Num => "number",
        IntrinsicKind::Str => "string",
        IntrinsicKind::Symbol => "symbol",
        IntrinsicKind::BigInt => "bigint",
    }
}
