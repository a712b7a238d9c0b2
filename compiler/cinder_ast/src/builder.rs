//! Incremental construction of an [`AstContext`].
//!
//! The builder plays the role of the parse step: it appends nodes to the
//! arenas, interns type nodes so that structurally equal types share one
//! `TypeId`, and computes redeclaration groups when finished.
//!
//! Nodes receive the builder's current location, set with [`AstBuilder::at`].

use rustc_hash::FxHashMap;

use crate::ids::to_u32;
use crate::{
    AstContext, Decl, DeclId, DeclKind, EnumDecl, Expr, ExprId, ExprKind, FunctionAttrs,
    FunctionDecl, LangOptions, LinkageLanguage, QualType, RecordDecl, SourceLocation, Stmt,
    StmtId, StmtKind, StorageClass, TagKind, TargetInfo, TypeId, TypeKind, VarDecl,
};
use crate::BuiltinKind;

#[derive(Debug, Default)]
pub struct AstBuilder {
    decls: Vec<Decl>,
    types: Vec<TypeKind>,
    type_ids: FxHashMap<TypeKind, TypeId>,
    stmts: Vec<Stmt>,
    exprs: Vec<Expr>,
    translation_unit: Option<DeclId>,
    main_file: Option<String>,
    lang: LangOptions,
    target: TargetInfo,
    loc: SourceLocation,
}

impl AstBuilder {
    /// A builder for a C unit on the default target.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_lang(mut self, lang: LangOptions) -> Self {
        self.lang = lang;
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: TargetInfo) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn with_main_file(mut self, path: impl Into<String>) -> Self {
        self.main_file = Some(path.into());
        self
    }

    /// Set the location given to nodes created from now on.
    pub fn at(&mut self, line: u32, column: u32) -> &mut Self {
        self.loc = SourceLocation::new(line, column);
        self
    }

    // Types

    /// Intern a type node.
    pub fn ty(&mut self, kind: TypeKind) -> TypeId {
        if let Some(&id) = self.type_ids.get(&kind) {
            return id;
        }
        let id = TypeId::new(to_u32(self.types.len(), "types"));
        self.types.push(kind.clone());
        self.type_ids.insert(kind, id);
        id
    }

    pub fn builtin(&mut self, kind: BuiltinKind) -> QualType {
        QualType::new(self.ty(TypeKind::Builtin(kind)))
    }

    pub fn pointer_to(&mut self, pointee: QualType) -> QualType {
        QualType::new(self.ty(TypeKind::Pointer { pointee }))
    }

    /// `struct X` as spelled in source: an elaborated use of the tag.
    pub fn record_type(&mut self, record: DeclId) -> QualType {
        let named = QualType::new(self.ty(TypeKind::Record(record)));
        QualType::new(self.ty(TypeKind::Elaborated { named }))
    }

    /// `enum E` as spelled in source.
    pub fn enum_type(&mut self, decl: DeclId) -> QualType {
        let named = QualType::new(self.ty(TypeKind::Enum(decl)));
        QualType::new(self.ty(TypeKind::Elaborated { named }))
    }

    pub fn typedef_type(&mut self, typedef: DeclId) -> QualType {
        QualType::new(self.ty(TypeKind::Typedef(typedef)))
    }

    pub fn constant_array(&mut self, element: QualType, size: u64) -> QualType {
        QualType::new(self.ty(TypeKind::ConstantArray { element, size }))
    }

    pub fn function_type(
        &mut self,
        result: QualType,
        params: Vec<QualType>,
        variadic: bool,
    ) -> TypeId {
        self.ty(TypeKind::FunctionProto {
            result,
            params,
            variadic,
        })
    }

    /// Prototype type matching already-built parameter declarations.
    pub fn signature(&mut self, result: QualType, params: &[DeclId]) -> TypeId {
        let params = params
            .iter()
            .filter_map(|&p| match &self.decls[p.index()].kind {
                DeclKind::Param { ty } => Some(*ty),
                _ => None,
            })
            .collect();
        self.function_type(result, params, false)
    }

    // Declarations

    pub fn decl(&mut self, kind: DeclKind, name: Option<&str>) -> DeclId {
        let id = DeclId::new(to_u32(self.decls.len(), "declarations"));
        self.decls.push(Decl {
            kind,
            name: name.map(str::to_owned),
            loc: self.loc,
        });
        id
    }

    /// File-scope variable.
    pub fn var(&mut self, name: &str, ty: QualType, init: Option<ExprId>) -> DeclId {
        self.decl(
            DeclKind::Var(VarDecl {
                ty,
                init,
                storage: StorageClass::None,
                thread_local: false,
                is_local: false,
                previous: None,
            }),
            Some(name),
        )
    }

    /// Block-scope variable.
    pub fn local_var(&mut self, name: &str, ty: QualType, init: Option<ExprId>) -> DeclId {
        let id = self.var(name, ty, init);
        if let DeclKind::Var(var) = &mut self.decls[id.index()].kind {
            var.is_local = true;
        }
        id
    }

    pub fn param(&mut self, name: &str, ty: QualType) -> DeclId {
        self.decl(DeclKind::Param { ty }, Some(name))
    }

    pub fn function(
        &mut self,
        name: &str,
        ty: TypeId,
        params: Vec<DeclId>,
        body: Option<StmtId>,
    ) -> DeclId {
        self.decl(
            DeclKind::Function(FunctionDecl {
                ty,
                params,
                body,
                storage: StorageClass::None,
                is_inline: false,
                attrs: FunctionAttrs::default(),
                previous: None,
            }),
            Some(name),
        )
    }

    /// A later declaration of the function `previous` declares.
    pub fn redeclare_function(
        &mut self,
        previous: DeclId,
        ty: TypeId,
        params: Vec<DeclId>,
        body: Option<StmtId>,
    ) -> DeclId {
        let name = self.decls[previous.index()].name.clone();
        let storage = match &self.decls[previous.index()].kind {
            DeclKind::Function(prev) => Some(prev.storage),
            _ => None,
        };
        let id = self.function(name.as_deref().unwrap_or(""), ty, params, body);
        if let DeclKind::Function(func) = &mut self.decls[id.index()].kind {
            func.previous = Some(previous);
            if let Some(storage) = storage {
                func.storage = storage;
            }
        }
        id
    }

    pub fn typedef(&mut self, name: &str, underlying: QualType) -> DeclId {
        self.decl(DeclKind::Typedef { underlying }, Some(name))
    }

    /// Forward declaration of a tag (`struct Node;`).
    ///
    /// Call [`define_record`](Self::define_record) to give it members.
    pub fn record(&mut self, tag: TagKind, name: Option<&str>) -> DeclId {
        self.decl(
            DeclKind::Record(RecordDecl {
                tag,
                members: Vec::new(),
                is_definition: false,
                is_polymorphic: false,
                previous: None,
            }),
            name,
        )
    }

    /// A later declaration of the record `previous` declares.
    pub fn redeclare_record(&mut self, previous: DeclId) -> DeclId {
        let (tag, name) = match &self.decls[previous.index()] {
            Decl {
                kind: DeclKind::Record(record),
                name,
                ..
            } => (record.tag, name.clone()),
            Decl { name, .. } => (TagKind::Struct, name.clone()),
        };
        let id = self.record(tag, name.as_deref());
        if let DeclKind::Record(record) = &mut self.decls[id.index()].kind {
            record.previous = Some(previous);
        }
        id
    }

    /// Turn a record declaration into its definition.
    pub fn define_record(&mut self, record: DeclId, members: Vec<DeclId>) {
        if let DeclKind::Record(decl) = &mut self.decls[record.index()].kind {
            decl.members = members;
            decl.is_definition = true;
        }
    }

    pub fn field(&mut self, name: &str, ty: QualType) -> DeclId {
        self.decl(
            DeclKind::Field {
                ty,
                bit_width: None,
            },
            Some(name),
        )
    }

    /// Enum definition; `integer_type: None` models an unresolved underlying type.
    pub fn enumeration(
        &mut self,
        name: Option<&str>,
        integer_type: Option<QualType>,
        constants: &[(&str, i128)],
    ) -> DeclId {
        let constants = constants
            .iter()
            .map(|&(name, value)| self.decl(DeclKind::EnumConstant { value }, Some(name)))
            .collect();
        self.decl(
            DeclKind::Enum(EnumDecl {
                integer_type,
                constants,
                is_definition: true,
                previous: None,
            }),
            name,
        )
    }

    pub fn linkage_spec(&mut self, language: LinkageLanguage, decls: Vec<DeclId>) -> DeclId {
        self.decl(DeclKind::LinkageSpec { language, decls }, None)
    }

    pub fn translation_unit(&mut self, decls: Vec<DeclId>) -> DeclId {
        let id = self.decl(DeclKind::TranslationUnit { decls }, None);
        self.translation_unit = Some(id);
        id
    }

    pub fn set_storage(&mut self, decl: DeclId, storage: StorageClass) {
        match &mut self.decls[decl.index()].kind {
            DeclKind::Var(var) => var.storage = storage,
            DeclKind::Function(func) => func.storage = storage,
            _ => {}
        }
    }

    pub fn set_inline(&mut self, func: DeclId) {
        if let DeclKind::Function(decl) = &mut self.decls[func.index()].kind {
            decl.is_inline = true;
        }
    }

    pub fn set_attrs(&mut self, func: DeclId, attrs: FunctionAttrs) {
        if let DeclKind::Function(decl) = &mut self.decls[func.index()].kind {
            decl.attrs = attrs;
        }
    }

    pub fn set_thread_local(&mut self, var: DeclId) {
        if let DeclKind::Var(decl) = &mut self.decls[var.index()].kind {
            decl.thread_local = true;
        }
    }

    pub fn set_polymorphic(&mut self, record: DeclId) {
        if let DeclKind::Record(decl) = &mut self.decls[record.index()].kind {
            decl.is_polymorphic = true;
        }
    }

    // Statements

    pub fn stmt(&mut self, kind: StmtKind) -> StmtId {
        let id = StmtId::new(to_u32(self.stmts.len(), "statements"));
        self.stmts.push(Stmt {
            kind,
            loc: self.loc,
        });
        id
    }

    pub fn compound(&mut self, stmts: Vec<StmtId>) -> StmtId {
        self.stmt(StmtKind::Compound(stmts))
    }

    pub fn ret(&mut self, value: Option<ExprId>) -> StmtId {
        self.stmt(StmtKind::Return(value))
    }

    pub fn decl_stmt(&mut self, decls: Vec<DeclId>) -> StmtId {
        self.stmt(StmtKind::Decl(decls))
    }

    pub fn expr_stmt(&mut self, expr: ExprId) -> StmtId {
        self.stmt(StmtKind::Expr(expr))
    }

    // Expressions

    pub fn expr(&mut self, kind: ExprKind, ty: Option<QualType>) -> ExprId {
        let id = ExprId::new(to_u32(self.exprs.len(), "expressions"));
        self.exprs.push(Expr {
            kind,
            ty,
            loc: self.loc,
        });
        id
    }

    pub fn int_lit(&mut self, value: i128, ty: QualType) -> ExprId {
        self.expr(ExprKind::IntegerLiteral(value), Some(ty))
    }

    pub fn float_lit(&mut self, value: f64, ty: QualType) -> ExprId {
        self.expr(ExprKind::FloatingLiteral(value.to_bits()), Some(ty))
    }

    /// Reference to a variable, parameter or function, typed after the declaration.
    pub fn decl_ref(&mut self, decl: DeclId) -> ExprId {
        let ty = match &self.decls[decl.index()].kind {
            DeclKind::Var(var) => Some(var.ty),
            DeclKind::Param { ty } => Some(*ty),
            DeclKind::Function(func) => Some(QualType::new(func.ty)),
            _ => None,
        };
        self.expr(ExprKind::DeclRef(decl), ty)
    }

    /// Direct call of `callee`, typed after its result type.
    pub fn call(&mut self, callee: DeclId, args: Vec<ExprId>) -> ExprId {
        let result = match &self.decls[callee.index()].kind {
            DeclKind::Function(func) => match &self.types[func.ty.index()] {
                TypeKind::FunctionProto { result, .. } | TypeKind::FunctionNoProto { result } => {
                    Some(*result)
                }
                _ => None,
            },
            _ => None,
        };
        let callee = self.decl_ref(callee);
        self.expr(ExprKind::Call { callee, args }, result)
    }

    /// Freeze the unit into a queryable context.
    pub fn finish(self) -> AstContext {
        let mut redecls: FxHashMap<DeclId, Vec<DeclId>> = FxHashMap::default();
        for (index, decl) in self.decls.iter().enumerate() {
            if !matches!(
                decl.kind,
                DeclKind::Var(_) | DeclKind::Function(_) | DeclKind::Record(_) | DeclKind::Enum(_)
            ) {
                continue;
            }
            let mut canonical = DeclId::new(to_u32(index, "declarations"));
            while let Some(prev) = self.decls[canonical.index()].kind.previous() {
                canonical = prev;
            }
            redecls
                .entry(canonical)
                .or_default()
                .push(DeclId::new(to_u32(index, "declarations")));
        }

        AstContext {
            decls: self.decls,
            types: self.types,
            stmts: self.stmts,
            exprs: self.exprs,
            redecls,
            translation_unit: self.translation_unit,
            main_file: self.main_file,
            lang: self.lang,
            target: self.target,
        }
    }
}
