//! Last strategy of every chain: reaching it is an error.

use cinder_ast::{DeclId, ExprId, QualType, StmtId};
use cinder_ir::{OpId, Type};

use super::Visit;
use crate::context::CodegenContext;
use crate::{CodegenError, Result};

fn unreachable<T>(node: &str) -> Result<Visit<T>> {
    tracing::warn!(node, "no strategy handled node");
    Err(CodegenError::Unreachable {
        node: node.to_owned(),
    })
}

pub(super) fn visit_decl(cx: &CodegenContext<'_>, decl: DeclId) -> Result<Visit<Option<OpId>>> {
    unreachable(cx.ast.decl(decl).kind.kind_name())
}

pub(super) fn visit_stmt(cx: &CodegenContext<'_>, stmt: StmtId) -> Result<Visit<Option<OpId>>> {
    unreachable(cx.ast.stmt(stmt).kind.kind_name())
}

pub(super) fn visit_expr(cx: &CodegenContext<'_>, expr: ExprId) -> Result<Visit<OpId>> {
    unreachable(cx.ast.expr(expr).kind.kind_name())
}

pub(super) fn visit_type(cx: &CodegenContext<'_>, qt: QualType) -> Result<Visit<Type>> {
    unreachable(cx.ast.ty(qt.ty).kind_name())
}
