//! Placeholder lowering for nodes the default strategy declines.
//!
//! The node kind is recorded in an `unsup.op` so that the rest of the unit
//! can still be lowered and inspected.

use cinder_ast::{DeclId, ExprId, SourceLocation, StmtId};
use cinder_ir::{OpId, OpKind, Operation};

use super::Visit;
use crate::context::CodegenContext;
use crate::Result;

fn placeholder(cx: &mut CodegenContext<'_>, node: &str, loc: SourceLocation) -> Operation {
    tracing::debug!(node, "emitting unsupported placeholder");
    let loc = cx.location(loc);
    Operation::new(
        OpKind::Unsupported {
            node: node.to_owned(),
        },
        loc,
    )
}

pub(super) fn visit_decl(cx: &mut CodegenContext<'_>, decl: DeclId) -> Visit<Option<OpId>> {
    let ast = cx.ast;
    let node = ast.decl(decl);
    let op = placeholder(cx, node.kind.kind_name(), node.loc);
    Visit::Handled(Some(cx.append(op)))
}

pub(super) fn visit_stmt(cx: &mut CodegenContext<'_>, stmt: StmtId) -> Visit<Option<OpId>> {
    let ast = cx.ast;
    let node = ast.stmt(stmt);
    let op = placeholder(cx, node.kind.kind_name(), node.loc);
    Visit::Handled(Some(cx.append(op)))
}

/// The placeholder carries the expression's type when it has one.
pub(super) fn visit_expr(cx: &mut CodegenContext<'_>, expr: ExprId) -> Result<Visit<OpId>> {
    let ast = cx.ast;
    let node = ast.expr(expr);
    let mut op = placeholder(cx, node.kind.kind_name(), node.loc);
    if let Some(ty) = node.ty {
        op.result = Some(cx.visit_type(ty)?);
    }
    Ok(Visit::Handled(cx.append(op)))
}
