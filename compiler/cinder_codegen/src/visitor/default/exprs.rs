use cinder_ast::{DeclId, DeclKind, Expr, ExprId, ExprKind};
use cinder_ir::{ConstValue, OpId, OpKind, Operation, Type, TypeData};

use super::decls::reference_function;
use crate::context::CodegenContext;
use crate::visitor::Visit;
use crate::{CodegenError, Result};

pub(in crate::visitor) fn visit_expr(
    cx: &mut CodegenContext<'_>,
    id: ExprId,
) -> Result<Visit<OpId>> {
    let ast = cx.ast;
    let expr = ast.expr(id);
    let op = match &expr.kind {
        ExprKind::IntegerLiteral(value) => constant(cx, expr, ConstValue::Int(*value))?,
        ExprKind::FloatingLiteral(bits) => constant(cx, expr, ConstValue::Float(*bits))?,
        ExprKind::DeclRef(decl) => decl_ref(cx, expr, *decl)?,
        ExprKind::Call { callee, args } => call(cx, expr, *callee, args)?,
        ExprKind::Lambda => return Ok(Visit::Declined),
    };
    Ok(Visit::Handled(op))
}

fn expr_type(cx: &mut CodegenContext<'_>, expr: &Expr) -> Result<Type> {
    let Some(ty) = expr.ty else {
        return Err(CodegenError::unclassifiable(format!(
            "{} without a type",
            expr.kind.kind_name()
        )));
    };
    cx.visit_type(ty)
}

fn constant(cx: &mut CodegenContext<'_>, expr: &Expr, value: ConstValue) -> Result<OpId> {
    let ty = expr_type(cx, expr)?;
    let loc = cx.location(expr.loc);
    Ok(cx.append(Operation::new(OpKind::Const { value }, loc).with_result(ty)))
}

fn decl_ref(cx: &mut CodegenContext<'_>, expr: &Expr, decl: DeclId) -> Result<OpId> {
    let ast = cx.ast;
    let (sym, target, ty) = match &ast.decl(decl).kind {
        DeclKind::Function(_) => {
            let target = reference_function(cx, decl)?;
            let OpKind::Func { sym, ty, .. } = &cx.module.op(target).kind else {
                return Err(CodegenError::unclassifiable("function reference target"));
            };
            (sym.clone(), target, *ty)
        }
        DeclKind::Var(var) => {
            let canonical = ast.canonical_decl(decl);
            let target = match cx.cache.lookup_decl(canonical) {
                Some(op) => op,
                None if !var.is_local => {
                    let def = ast.definition(canonical).unwrap_or(canonical);
                    cx.at_module_scope(|cx| cx.visit_decl(def))?.ok_or_else(|| {
                        CodegenError::unclassifiable("global variable without an operation")
                    })?
                }
                None => {
                    return Err(CodegenError::unclassifiable(format!(
                        "reference to local '{}' before its declaration",
                        ast.decl_name(decl).unwrap_or_default()
                    )))
                }
            };
            storage_ref(cx, target, decl)?
        }
        DeclKind::Param { .. } => {
            let Some(target) = cx.cache.lookup_decl(decl) else {
                return Err(CodegenError::unclassifiable(format!(
                    "reference to parameter '{}' outside its function",
                    ast.decl_name(decl).unwrap_or_default()
                )));
            };
            storage_ref(cx, target, decl)?
        }
        DeclKind::EnumConstant { value } => {
            return constant(cx, expr, ConstValue::Int(*value));
        }
        other => {
            return Err(CodegenError::not_implemented(format!(
                "reference to {}",
                other.kind_name()
            )))
        }
    };
    let loc = cx.location(expr.loc);
    Ok(cx.append(Operation::new(OpKind::DeclRef { sym, target }, loc).with_result(ty)))
}

/// Symbol and storage type of a variable or parameter operation.
fn storage_ref(cx: &CodegenContext<'_>, target: OpId, decl: DeclId) -> Result<(String, OpId, Type)> {
    let op = cx.module.op(target);
    let sym = match &op.kind {
        OpKind::Var { sym, .. } => sym.clone(),
        OpKind::Param { name } => name.clone().unwrap_or_default(),
        _ => cx.ast.decl_name(decl).unwrap_or_default().to_owned(),
    };
    let Some(ty) = op.result else {
        return Err(CodegenError::unclassifiable(format!(
            "storage of '{sym}' has no type"
        )));
    };
    Ok((sym, target, ty))
}

fn call(cx: &mut CodegenContext<'_>, expr: &Expr, callee: ExprId, args: &[ExprId]) -> Result<OpId> {
    let ast = cx.ast;
    let callee_decl = match &ast.expr(callee).kind {
        ExprKind::DeclRef(decl) if matches!(ast.decl(*decl).kind, DeclKind::Function(_)) => *decl,
        _ => return Err(CodegenError::not_implemented("indirect call")),
    };
    let target = reference_function(cx, callee_decl)?;
    let (callee, fn_ty) = match &cx.module.op(target).kind {
        OpKind::Func { sym, ty, .. } => (sym.clone(), *ty),
        _ => return Err(CodegenError::unclassifiable("call target")),
    };
    let args = args
        .iter()
        .map(|&arg| cx.visit_expr(arg))
        .collect::<Result<Vec<_>>>()?;

    let types = cx.module.types();
    let result = match types.get(fn_ty) {
        TypeData::Function { result, .. } if !matches!(types.get(*result), TypeData::Void) => {
            Some(*result)
        }
        _ => None,
    };
    let loc = cx.location(expr.loc);
    let mut op = Operation::new(OpKind::Call { callee, args }, loc);
    op.result = result;
    Ok(cx.append(op))
}
