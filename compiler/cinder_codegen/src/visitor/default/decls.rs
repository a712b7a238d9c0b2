use cinder_ast::{
    AccessSpecifier, DeclId, DeclKind, EnumDecl, ExprId, FunctionDecl, LinkageLanguage, QualType,
    RecordDecl, StmtKind, StorageClass, TagKind, VarDecl,
};
use cinder_ir::{
    Access, FuncFlags, InsertPoint, Linkage, LinkageLang, OpId, OpKind, Operation, RecordTag,
    Region, TypeData, VarStorage,
};

use crate::context::{CodegenContext, Replacement};
use crate::visitor::Visit;
use crate::{CodegenError, Result};

pub(in crate::visitor) fn visit_decl(
    cx: &mut CodegenContext<'_>,
    id: DeclId,
) -> Result<Visit<Option<OpId>>> {
    let ast = cx.ast;
    let decl = ast.decl(id);
    let out = match &decl.kind {
        DeclKind::TranslationUnit { decls } => {
            for &child in decls {
                cx.emit_top_level(child)?;
            }
            None
        }
        DeclKind::Var(var) => Some(emit_var(cx, id, var)?),
        DeclKind::Param { ty } => Some(emit_param(cx, id, *ty)?),
        DeclKind::Function(func) => Some(emit_function(cx, id, func)?),
        DeclKind::Typedef { underlying } => Some(emit_typedef(cx, id, *underlying, false)?),
        DeclKind::TypeAlias { underlying } => Some(emit_typedef(cx, id, *underlying, true)?),
        DeclKind::Record(record) => Some(emit_record(cx, id, record)?),
        DeclKind::Field { ty, bit_width } => {
            let ty = cx.visit_type(*ty)?;
            let loc = cx.decl_location(id);
            let name = decl.name.clone().unwrap_or_default();
            Some(cx.append(Operation::new(
                OpKind::Field {
                    name,
                    ty,
                    bit_width: *bit_width,
                },
                loc,
            )))
        }
        DeclKind::Enum(e) => Some(emit_enum(cx, id, e)?),
        DeclKind::EnumConstant { value } => {
            let loc = cx.decl_location(id);
            let name = decl.name.clone().unwrap_or_default();
            let op = cx.append(Operation::new(
                OpKind::EnumConstant {
                    name,
                    value: *value,
                },
                loc,
            ));
            cx.cache.insert_decl(id, op)?;
            Some(op)
        }
        DeclKind::LinkageSpec { language, decls } => {
            let lang = match language {
                LinkageLanguage::C => LinkageLang::C,
                LinkageLanguage::Cxx => LinkageLang::Cxx,
            };
            let loc = cx.decl_location(id);
            let op = cx.append(Operation::new(OpKind::LinkageSpec { lang }, loc));
            cx.with_insertion(InsertPoint::Region { op, index: 0 }, |cx| {
                for &child in decls {
                    cx.emit_top_level(child)?;
                }
                Ok(())
            })?;
            Some(op)
        }
        DeclKind::Label => {
            let loc = cx.decl_location(id);
            let name = decl.name.clone().unwrap_or_default();
            Some(cx.append(Operation::new(OpKind::Label { name }, loc)))
        }
        DeclKind::Empty => {
            let loc = cx.decl_location(id);
            Some(cx.append(Operation::new(OpKind::Empty, loc)))
        }
        DeclKind::AccessSpec { access } => {
            let access = match access {
                AccessSpecifier::Public => Access::Public,
                AccessSpecifier::Protected => Access::Protected,
                AccessSpecifier::Private => Access::Private,
            };
            let loc = cx.decl_location(id);
            Some(cx.append(Operation::new(OpKind::AccessSpec { access }, loc)))
        }
        DeclKind::StaticAssert | DeclKind::Namespace { .. } | DeclKind::UsingDirective => {
            return Ok(Visit::Declined)
        }
    };
    Ok(Visit::Handled(out))
}

fn display_name(cx: &CodegenContext<'_>, id: DeclId) -> String {
    cx.ast.decl_name(id).unwrap_or("<anonymous>").to_owned()
}

// ── Variables ───────────────────────────────────────────────────

fn var_storage(storage: StorageClass) -> VarStorage {
    match storage {
        StorageClass::None => VarStorage::None,
        StorageClass::Extern => VarStorage::Extern,
        StorageClass::Static => VarStorage::Static,
        StorageClass::Auto => VarStorage::Auto,
        StorageClass::Register => VarStorage::Register,
    }
}

fn emit_var(cx: &mut CodegenContext<'_>, id: DeclId, var: &VarDecl) -> Result<OpId> {
    let ast = cx.ast;
    if var.thread_local {
        return Err(CodegenError::not_implemented(format!(
            "thread-local variable '{}'",
            display_name(cx, id)
        )));
    }
    let canonical = ast.canonical_decl(id);

    if let Some(op) = cx.cache.lookup_decl(canonical) {
        // A later declaration may be the definition.
        if var.storage != StorageClass::Extern {
            if let OpKind::Var { storage, .. } = &mut cx.module.op_mut(op).kind {
                *storage = var_storage(var.storage);
            }
        }
        if let Some(init) = var.init {
            if cx.module.op(op).regions.is_empty() {
                emit_initializer(cx, op, init)?;
            }
        }
        return Ok(op);
    }

    let ty = cx.types().lvalue_convert(var.ty)?;
    let sym = if var.is_local {
        ast.decl_name(id).unwrap_or_default().to_owned()
    } else {
        cx.symbol(id)
    };
    let loc = cx.decl_location(id);
    let op = cx.append(
        Operation::new(
            OpKind::Var {
                sym: sym.clone(),
                storage: var_storage(var.storage),
                local: var.is_local,
            },
            loc,
        )
        .with_result(ty),
    );
    cx.cache.insert_decl(canonical, op)?;
    if let Some(init) = var.init {
        emit_initializer(cx, op, init)?;
    }
    if !var.is_local {
        cx.module.register_symbol(sym.as_str(), op);
        cx.worklist.mark_emitted(canonical);
        tracing::debug!(sym, "emitted global variable");
    }
    Ok(op)
}

fn emit_initializer(cx: &mut CodegenContext<'_>, var: OpId, init: ExprId) -> Result<()> {
    cx.module.op_mut(var).regions.push(Region::new());
    cx.with_insertion(InsertPoint::Region { op: var, index: 0 }, |cx| {
        let value = cx.visit_expr(init)?;
        let ast = cx.ast;
        let loc = cx.location(ast.expr(init).loc);
        cx.append(Operation::new(OpKind::Yield { value: Some(value) }, loc));
        Ok(())
    })
}

fn emit_param(cx: &mut CodegenContext<'_>, id: DeclId, ty: QualType) -> Result<OpId> {
    if let Some(op) = cx.cache.lookup_decl(id) {
        return Ok(op);
    }
    let ty = cx.types().lvalue_convert(ty)?;
    let loc = cx.decl_location(id);
    let name = cx.ast.decl_name(id).map(str::to_owned);
    let op = cx.append(Operation::new(OpKind::Param { name }, loc).with_result(ty));
    cx.cache.insert_decl(id, op)?;
    Ok(op)
}

// ── Functions ───────────────────────────────────────────────────

/// The function operation of `decl`'s entity, created as a body-less
/// prototype at module scope on first request.
pub(super) fn prototype(cx: &mut CodegenContext<'_>, decl: DeclId) -> Result<OpId> {
    let ast = cx.ast;
    let canonical = ast.canonical_decl(decl);
    if let Some(op) = cx.cache.lookup_decl(canonical) {
        return Ok(op);
    }
    let DeclKind::Function(func) = &ast.decl(canonical).kind else {
        return Err(CodegenError::unclassifiable(format!(
            "{} used as a function",
            ast.decl(canonical).kind.kind_name()
        )));
    };
    let ty = cx.types().convert_function_decl(canonical)?;
    let sym = cx.symbol(canonical);
    let linkage = if func.storage == StorageClass::Static {
        Linkage::Internal
    } else {
        Linkage::External
    };
    let flags = function_flags(cx, canonical);
    let loc = cx.decl_location(canonical);
    let op = cx.at_declaration_scope(|cx| {
        Ok(cx.append(Operation::new(
            OpKind::Func {
                sym: sym.clone(),
                ty,
                linkage,
                flags,
            },
            loc,
        )))
    })?;
    cx.cache.insert_decl(canonical, op)?;
    cx.module.register_symbol(sym.as_str(), op);
    tracing::debug!(sym, "declared function");
    Ok(op)
}

fn function_flags(cx: &CodegenContext<'_>, canonical: DeclId) -> FuncFlags {
    let ast = cx.ast;
    let mut flags = FuncFlags::empty();
    let chain = ast.redecls(canonical);
    for &redecl in chain.iter().chain(std::iter::once(&canonical)) {
        if let DeclKind::Function(func) = &ast.decl(redecl).kind {
            if func.is_inline {
                flags |= FuncFlags::INLINE;
            }
            if func.attrs.noreturn {
                flags |= FuncFlags::NORETURN;
            }
        }
    }
    flags
}

/// Reference a function from an expression; its definition is queued if it
/// has not been emitted yet.
pub(super) fn reference_function(cx: &mut CodegenContext<'_>, decl: DeclId) -> Result<OpId> {
    let canonical = cx.ast.canonical_decl(decl);
    let op = prototype(cx, canonical)?;
    if !cx.worklist.is_emitted(canonical) && cx.ast.definition(canonical).is_some() {
        cx.worklist.schedule(canonical);
    }
    Ok(op)
}

fn emit_function(cx: &mut CodegenContext<'_>, id: DeclId, func: &FunctionDecl) -> Result<OpId> {
    let ast = cx.ast;
    if func.attrs.constructor || func.attrs.destructor {
        return Err(CodegenError::not_implemented(format!(
            "global constructor or destructor '{}'",
            display_name(cx, id)
        )));
    }
    let canonical = ast.canonical_decl(id);
    let proto = prototype(cx, canonical)?;

    let Some(body) = func.body else {
        match ast.definition(canonical) {
            None => cx.worklist.mark_emitted(canonical),
            Some(def) if !cx.is_lazily_emittable(def) => {
                cx.worklist.schedule(canonical);
            }
            Some(_) => {}
        }
        return Ok(proto);
    };
    if cx.worklist.is_emitted(canonical) {
        return Ok(proto);
    }

    let (linkage, flags) = match &cx.module.op(proto).kind {
        OpKind::Func { linkage, flags, .. } => (*linkage, *flags),
        _ => {
            return Err(CodegenError::unclassifiable(format!(
                "prototype of '{}' is not a function",
                display_name(cx, id)
            )))
        }
    };
    let def_ty = cx.types().convert_function_decl(id)?;
    let target = if canonical == id || ast.same_signature(canonical, id) {
        proto
    } else {
        // `int f();` defined later as `int f(int x) { ... }`.
        let sym = cx.symbol(id);
        let loc = cx.decl_location(id);
        let replacement = cx.at_declaration_scope(|cx| {
            Ok(cx.append(Operation::new(
                OpKind::Func {
                    sym: sym.clone(),
                    ty: def_ty,
                    linkage,
                    flags,
                },
                loc,
            )))
        })?;
        tracing::debug!(sym, "definition changes the declared signature");
        cx.replacements.push(Replacement {
            symbol: sym,
            original: proto,
            replacement,
        });
        replacement
    };

    let returns_void = match cx.module.types().get(def_ty) {
        TypeData::Function { result, .. } => {
            matches!(cx.module.types().get(*result), TypeData::Void)
        }
        _ => false,
    };
    let end_loc = cx.location(ast.stmt(body).loc);
    cx.with_insertion(InsertPoint::Region { op: target, index: 0 }, |cx| {
        for &param in &func.params {
            cx.visit_decl(param)?;
        }
        match &ast.stmt(body).kind {
            StmtKind::Compound(stmts) => {
                for &stmt in stmts {
                    cx.visit_stmt(stmt)?;
                }
            }
            _ => {
                cx.visit_stmt(body)?;
            }
        }
        let point = cx.insertion_point();
        let terminated = cx
            .module
            .region(point)
            .last()
            .is_some_and(|last| cx.module.op(last).kind.is_return_like());
        if !terminated {
            let kind = if !returns_void && cx.options.has_strict_return {
                OpKind::Unreachable
            } else {
                OpKind::Return { value: None }
            };
            cx.append(Operation::new(kind, end_loc));
        }
        Ok(())
    })?;
    cx.worklist.mark_emitted(canonical);
    tracing::debug!(
        sym = cx.module.op(target).kind.symbol().unwrap_or_default(),
        "emitted function body"
    );
    Ok(target)
}

// ── Types ───────────────────────────────────────────────────────

fn emit_typedef(
    cx: &mut CodegenContext<'_>,
    id: DeclId,
    underlying: QualType,
    alias: bool,
) -> Result<OpId> {
    if let Some(op) = cx.cache.lookup_decl(id) {
        return Ok(op);
    }
    let ty = cx.visit_type(underlying)?;
    let sym = cx.symbol(id);
    let loc = cx.decl_location(id);
    let kind = if alias {
        OpKind::TypeAlias { sym, ty }
    } else {
        OpKind::Typedef { sym, ty }
    };
    let op = cx.append(Operation::new(kind, loc));
    cx.cache.insert_decl(id, op)?;
    cx.worklist.mark_emitted(id);
    Ok(op)
}

fn record_tag(tag: TagKind) -> RecordTag {
    match tag {
        TagKind::Struct => RecordTag::Struct,
        TagKind::Union => RecordTag::Union,
        TagKind::Class => RecordTag::Class,
    }
}

/// Records are built in two phases: an incomplete placeholder is bound in
/// the cache first, so that fields can name the record, and the same
/// operation is completed once its fields have been emitted.
fn emit_record(cx: &mut CodegenContext<'_>, id: DeclId, record: &RecordDecl) -> Result<OpId> {
    let ast = cx.ast;
    let canonical = ast.canonical_decl(id);
    let op = match cx.cache.lookup_decl(canonical) {
        Some(op) => op,
        None => {
            let sym = cx.symbol(canonical);
            let loc = cx.decl_location(id);
            let op = cx.append(Operation::new(
                OpKind::Record {
                    sym,
                    tag: record_tag(record.tag),
                    complete: false,
                },
                loc,
            ));
            cx.cache.insert_decl(canonical, op)?;
            op
        }
    };

    if !record.is_definition {
        if ast.definition(canonical).is_some() {
            cx.worklist.schedule(canonical);
        } else {
            cx.worklist.mark_emitted(canonical);
        }
        return Ok(op);
    }
    if cx.worklist.is_emitted(canonical) {
        return Ok(op);
    }

    if record.is_polymorphic {
        cx.worklist.defer_vtable(canonical);
    }
    cx.with_insertion(InsertPoint::Region { op, index: 0 }, |cx| {
        for &member in &record.members {
            cx.visit_decl(member)?;
        }
        Ok(())
    })?;
    if let OpKind::Record { complete, .. } = &mut cx.module.op_mut(op).kind {
        *complete = true;
    }
    cx.worklist.mark_emitted(canonical);
    tracing::debug!(
        sym = cx.module.op(op).kind.symbol().unwrap_or_default(),
        fields = record.members.len(),
        "completed record"
    );
    Ok(op)
}

fn emit_enum(cx: &mut CodegenContext<'_>, id: DeclId, e: &EnumDecl) -> Result<OpId> {
    let ast = cx.ast;
    let canonical = ast.canonical_decl(id);
    if e.integer_type.is_none() && !e.constants.is_empty() {
        return Err(CodegenError::unclassifiable(format!(
            "constants of enum '{}' without an underlying type",
            display_name(cx, id)
        )));
    }
    let underlying = match e.integer_type {
        Some(qt) => Some(cx.visit_type(qt)?),
        None => None,
    };

    let op = match cx.cache.lookup_decl(canonical) {
        Some(op) => op,
        None => {
            let sym = cx.symbol(canonical);
            let loc = cx.decl_location(id);
            let op = cx.append(Operation::new(OpKind::Enum { sym, underlying }, loc));
            cx.cache.insert_decl(canonical, op)?;
            op
        }
    };

    if !e.is_definition {
        if ast.definition(canonical).is_some() {
            cx.worklist.schedule(canonical);
        } else {
            cx.worklist.mark_emitted(canonical);
        }
        return Ok(op);
    }
    if cx.worklist.is_emitted(canonical) {
        return Ok(op);
    }

    if let OpKind::Enum { underlying: slot, .. } = &mut cx.module.op_mut(op).kind {
        *slot = underlying;
    }
    cx.with_insertion(InsertPoint::Region { op, index: 0 }, |cx| {
        for &constant in &e.constants {
            cx.visit_decl(constant)?;
        }
        Ok(())
    })?;
    cx.worklist.mark_emitted(canonical);
    Ok(op)
}
