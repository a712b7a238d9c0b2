//! Default lowering of supported AST nodes.

mod decls;
mod exprs;
mod stmts;

use cinder_ast::QualType;
use cinder_ir::Type;

pub(super) use decls::visit_decl;
pub(super) use exprs::visit_expr;
pub(super) use stmts::visit_stmt;

use super::Visit;
use crate::context::CodegenContext;
use crate::Result;

/// Every type kind goes through the converter; unclassifiable kinds fail
/// there rather than being declined.
pub(super) fn visit_type(cx: &mut CodegenContext<'_>, qt: QualType) -> Result<Visit<Type>> {
    cx.types().convert(qt).map(Visit::Handled)
}
