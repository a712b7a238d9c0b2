//! The read-only AST context.
//!
//! `AstContext` owns every node of one translation unit and answers the
//! structural queries the lowering engine needs. It is constructed once by
//! [`AstBuilder`](crate::AstBuilder) and never mutated afterwards.

use std::fmt::Write as _;

use rustc_hash::FxHashMap;

use crate::{
    Decl, DeclId, DeclKind, Expr, ExprId, FunctionDecl, LangOptions, QualType, Qualifiers,
    SourceLocation, Stmt, StmtId, StorageClass, TargetInfo, TypeId, TypeKind,
};

/// One parsed translation unit.
#[derive(Clone, Debug)]
pub struct AstContext {
    pub(crate) decls: Vec<Decl>,
    pub(crate) types: Vec<TypeKind>,
    pub(crate) stmts: Vec<Stmt>,
    pub(crate) exprs: Vec<Expr>,
    /// Canonical declaration → every declaration of the entity, in source order.
    pub(crate) redecls: FxHashMap<DeclId, Vec<DeclId>>,
    pub(crate) translation_unit: Option<DeclId>,
    pub(crate) main_file: Option<String>,
    pub(crate) lang: LangOptions,
    pub(crate) target: TargetInfo,
}

impl AstContext {
    #[inline]
    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    #[inline]
    pub fn ty(&self, id: TypeId) -> &TypeKind {
        &self.types[id.index()]
    }

    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    pub fn decl_name(&self, id: DeclId) -> Option<&str> {
        self.decl(id).name.as_deref()
    }

    pub fn location(&self, id: DeclId) -> SourceLocation {
        self.decl(id).loc
    }

    pub fn translation_unit(&self) -> Option<DeclId> {
        self.translation_unit
    }

    /// Path of the main source file, if the unit came from a file.
    pub fn main_file(&self) -> Option<&str> {
        self.main_file.as_deref()
    }

    pub fn lang_options(&self) -> &LangOptions {
        &self.lang
    }

    pub fn target(&self) -> &TargetInfo {
        &self.target
    }

    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    /// First declaration of the entity `id` declares.
    pub fn canonical_decl(&self, id: DeclId) -> DeclId {
        let mut current = id;
        while let Some(prev) = self.decl(current).kind.previous() {
            current = prev;
        }
        current
    }

    /// All declarations of the entity `id` declares, in source order.
    ///
    /// Empty for declaration kinds that cannot be redeclared.
    pub fn redecls(&self, id: DeclId) -> &[DeclId] {
        self.redecls
            .get(&self.canonical_decl(id))
            .map_or(&[], Vec::as_slice)
    }

    /// The declaration of `id`'s entity that carries its definition.
    ///
    /// Functions are defined by a body, records and enums by their member
    /// list, variables by not being `extern` (or by an initializer).
    pub fn definition(&self, id: DeclId) -> Option<DeclId> {
        let is_definition = |d: DeclId| match &self.decl(d).kind {
            DeclKind::Function(func) => func.body.is_some(),
            DeclKind::Record(record) => record.is_definition,
            DeclKind::Enum(e) => e.is_definition,
            DeclKind::Var(var) => var.init.is_some() || var.storage != StorageClass::Extern,
            _ => true,
        };
        let chain = self.redecls(id);
        if chain.is_empty() {
            return is_definition(id).then_some(id);
        }
        chain.iter().copied().find(|&d| is_definition(d))
    }

    /// Whether `ty` names a record or enum that has a definition.
    pub fn is_complete_tag(&self, ty: TypeId) -> bool {
        self.tag_decl(ty)
            .is_some_and(|decl| self.definition(decl).is_some())
    }

    /// Strip one level of sugar, merging qualifiers.
    pub fn single_step_desugar(&self, qt: QualType) -> Option<QualType> {
        match self.ty(qt.ty) {
            TypeKind::Typedef(decl) => match &self.decl(*decl).kind {
                DeclKind::Typedef { underlying } | DeclKind::TypeAlias { underlying } => {
                    Some(underlying.qualified(qt.quals))
                }
                _ => None,
            },
            TypeKind::Elaborated { named } => Some(named.qualified(qt.quals)),
            TypeKind::Paren { inner } => Some(inner.qualified(qt.quals)),
            _ => None,
        }
    }

    /// Strip all sugar, accumulating the qualifiers found along the way.
    pub fn desugar(&self, qt: QualType) -> QualType {
        let mut current = qt;
        while let Some(next) = self.single_step_desugar(current) {
            current = next;
        }
        current
    }

    /// Whether two type uses denote the same type once sugar is stripped.
    pub fn same_type(&self, a: QualType, b: QualType) -> bool {
        let (a, b) = (self.desugar(a), self.desugar(b));
        a.quals == b.quals && self.same_unqualified(a.ty, b.ty)
    }

    fn same_unqualified(&self, a: TypeId, b: TypeId) -> bool {
        if a == b {
            return true;
        }
        match (self.ty(a), self.ty(b)) {
            (TypeKind::Builtin(x), TypeKind::Builtin(y)) => x == y,
            (TypeKind::Record(x), TypeKind::Record(y)) | (TypeKind::Enum(x), TypeKind::Enum(y)) => {
                self.canonical_decl(*x) == self.canonical_decl(*y)
            }
            (TypeKind::Pointer { pointee: x }, TypeKind::Pointer { pointee: y })
            | (TypeKind::LValueReference { pointee: x }, TypeKind::LValueReference { pointee: y })
            | (TypeKind::IncompleteArray { element: x }, TypeKind::IncompleteArray { element: y })
            | (
                TypeKind::DependentSizedArray { element: x },
                TypeKind::DependentSizedArray { element: y },
            )
            | (TypeKind::Complex { element: x }, TypeKind::Complex { element: y })
            | (TypeKind::Atomic { value: x }, TypeKind::Atomic { value: y }) => {
                self.same_type(*x, *y)
            }
            (
                TypeKind::ConstantArray { element: x, size: m },
                TypeKind::ConstantArray { element: y, size: n },
            ) => m == n && self.same_type(*x, *y),
            (
                TypeKind::VariableArray { element: x, size: m },
                TypeKind::VariableArray { element: y, size: n },
            ) => m == n && self.same_type(*x, *y),
            (
                TypeKind::Vector { element: x, count: m },
                TypeKind::Vector { element: y, count: n },
            ) => m == n && self.same_type(*x, *y),
            (
                TypeKind::MemberPointer { pointee: x, class: m },
                TypeKind::MemberPointer { pointee: y, class: n },
            ) => self.canonical_decl(*m) == self.canonical_decl(*n) && self.same_type(*x, *y),
            (
                TypeKind::FunctionProto {
                    result: r,
                    params: p,
                    variadic: v,
                },
                TypeKind::FunctionProto {
                    result: s,
                    params: q,
                    variadic: w,
                },
            ) => {
                v == w
                    && p.len() == q.len()
                    && self.same_type(*r, *s)
                    && p.iter().zip(q).all(|(x, y)| self.same_param_type(*x, *y))
            }
            (TypeKind::FunctionNoProto { result: r }, TypeKind::FunctionNoProto { result: s }) => {
                self.same_type(*r, *s)
            }
            _ => false,
        }
    }

    /// Top-level qualifiers of a parameter are not part of the signature.
    fn same_param_type(&self, a: QualType, b: QualType) -> bool {
        let (a, b) = (self.desugar(a), self.desugar(b));
        self.same_unqualified(a.ty, b.ty)
    }

    /// Parameter types of a function declaration: the prototype's list when
    /// the declaration has one, otherwise the declared parameters.
    fn param_types(&self, func: &FunctionDecl) -> Vec<QualType> {
        match self.ty(self.desugar(QualType::new(func.ty)).ty) {
            TypeKind::FunctionProto { params, .. } if !params.is_empty() => params.clone(),
            _ => func
                .params
                .iter()
                .filter_map(|&p| match &self.decl(p).kind {
                    DeclKind::Param { ty } => Some(*ty),
                    _ => None,
                })
                .collect(),
        }
    }

    /// Whether two function declarations agree on their signature.
    ///
    /// `int f();` and `int f(int x)` differ; `void f(int)` and
    /// `void f(const int x)` do not.
    pub fn same_signature(&self, a: DeclId, b: DeclId) -> bool {
        let (DeclKind::Function(fa), DeclKind::Function(fb)) =
            (&self.decl(a).kind, &self.decl(b).kind)
        else {
            return false;
        };
        let shape = |func: &FunctionDecl| match self.ty(self.desugar(QualType::new(func.ty)).ty) {
            TypeKind::FunctionProto {
                result, variadic, ..
            } => Some((*result, *variadic)),
            TypeKind::FunctionNoProto { result } => Some((*result, false)),
            _ => None,
        };
        let (Some((ra, va)), Some((rb, vb))) = (shape(fa), shape(fb)) else {
            return false;
        };
        let (pa, pb) = (self.param_types(fa), self.param_types(fb));
        va == vb
            && pa.len() == pb.len()
            && self.same_type(ra, rb)
            && pa.iter().zip(&pb).all(|(x, y)| self.same_param_type(*x, *y))
    }

    /// The record or enum declaration a type names, looking through sugar.
    pub fn tag_decl(&self, ty: TypeId) -> Option<DeclId> {
        match self.ty(self.desugar(QualType::new(ty)).ty) {
            TypeKind::Record(decl) | TypeKind::Enum(decl) => Some(*decl),
            _ => None,
        }
    }

    /// A tag type whose entity has no definition anywhere in the unit.
    pub fn is_forward_declared(&self, ty: TypeId) -> bool {
        self.tag_decl(ty).is_some() && !self.is_complete_tag(ty)
    }

    /// Render a type the way it would be spelled in source.
    pub fn spelling(&self, qt: QualType) -> String {
        let mut out = String::new();
        self.write_spelling(&mut out, qt);
        out
    }

    fn write_spelling(&self, out: &mut String, qt: QualType) {
        if qt.quals.contains(Qualifiers::CONST) {
            out.push_str("const ");
        }
        if qt.quals.contains(Qualifiers::VOLATILE) {
            out.push_str("volatile ");
        }
        match self.ty(qt.ty) {
            TypeKind::Builtin(kind) => out.push_str(kind.spelling()),
            TypeKind::Pointer { pointee } => {
                self.write_spelling(out, *pointee);
                out.push_str(" *");
                if qt.quals.contains(Qualifiers::RESTRICT) {
                    out.push_str("restrict");
                }
            }
            TypeKind::LValueReference { pointee } => {
                self.write_spelling(out, *pointee);
                out.push_str(" &");
            }
            TypeKind::Record(decl) | TypeKind::Enum(decl) => {
                out.push_str(self.decl_name(*decl).unwrap_or("(anonymous)"));
            }
            TypeKind::Typedef(decl) => out.push_str(self.decl_name(*decl).unwrap_or("")),
            TypeKind::Elaborated { named } => {
                if let Some(decl) = self.tag_decl(named.ty) {
                    let keyword = match &self.decl(decl).kind {
                        DeclKind::Record(record) => record.tag.keyword(),
                        _ => "enum",
                    };
                    let _ = write!(out, "{keyword} ");
                }
                self.write_spelling(out, *named);
            }
            TypeKind::Paren { inner } => {
                out.push('(');
                self.write_spelling(out, *inner);
                out.push(')');
            }
            TypeKind::ConstantArray { element, size } => {
                self.write_spelling(out, *element);
                let _ = write!(out, "[{size}]");
            }
            TypeKind::DependentSizedArray { element } => {
                self.write_spelling(out, *element);
                out.push_str("[N]");
            }
            TypeKind::IncompleteArray { element } => {
                self.write_spelling(out, *element);
                out.push_str("[]");
            }
            TypeKind::VariableArray { element, .. } => {
                self.write_spelling(out, *element);
                out.push_str("[*]");
            }
            TypeKind::FunctionProto {
                result,
                params,
                variadic,
            } => {
                self.write_spelling(out, *result);
                out.push_str(" (");
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write_spelling(out, *param);
                }
                if *variadic {
                    out.push_str(if params.is_empty() { "..." } else { ", ..." });
                }
                out.push(')');
            }
            TypeKind::FunctionNoProto { result } => {
                self.write_spelling(out, *result);
                out.push_str(" ()");
            }
            TypeKind::Complex { element } => {
                out.push_str("_Complex ");
                self.write_spelling(out, *element);
            }
            TypeKind::Vector { element, count } => {
                self.write_spelling(out, *element);
                let _ = write!(out, " __attribute__((ext_vector_type({count})))");
            }
            TypeKind::Atomic { value } => {
                out.push_str("_Atomic(");
                self.write_spelling(out, *value);
                out.push(')');
            }
            TypeKind::MemberPointer { pointee, class } => {
                self.write_spelling(out, *pointee);
                let _ = write!(out, " {}::*", self.decl_name(*class).unwrap_or(""));
            }
        }
    }

    /// Human-readable dump of a type node and its sugar chain.
    ///
    /// Used in diagnostics for constructs the lowering engine rejects.
    pub fn dump_type(&self, qt: QualType) -> String {
        let mut out = String::new();
        let mut current = Some(qt);
        let mut depth = 0usize;
        while let Some(q) = current {
            if depth > 0 {
                out.push('\n');
                out.push_str(&"  ".repeat(depth - 1));
                out.push_str("`-");
            }
            let _ = write!(
                out,
                "{} {:?} '{}'",
                self.ty(q.ty).kind_name(),
                q.ty,
                self.spelling(q)
            );
            current = self.single_step_desugar(q);
            depth += 1;
        }
        out
    }
}
