use cinder_ast::{StmtId, StmtKind};
use cinder_ir::{InsertPoint, OpId, OpKind, Operation};

use crate::context::CodegenContext;
use crate::visitor::Visit;
use crate::Result;

pub(in crate::visitor) fn visit_stmt(
    cx: &mut CodegenContext<'_>,
    id: StmtId,
) -> Result<Visit<Option<OpId>>> {
    let ast = cx.ast;
    let stmt = ast.stmt(id);
    let out = match &stmt.kind {
        StmtKind::Compound(stmts) => {
            let loc = cx.location(stmt.loc);
            let op = cx.append(Operation::new(OpKind::Scope, loc));
            cx.with_insertion(InsertPoint::Region { op, index: 0 }, |cx| {
                for &child in stmts {
                    cx.visit_stmt(child)?;
                }
                Ok(())
            })?;
            Some(op)
        }
        StmtKind::Return(value) => {
            let value = match value {
                Some(expr) => Some(cx.visit_expr(*expr)?),
                None => None,
            };
            let loc = cx.location(stmt.loc);
            Some(cx.append(Operation::new(OpKind::Return { value }, loc)))
        }
        StmtKind::Decl(decls) => {
            let mut last = None;
            for &decl in decls {
                last = cx.visit_decl(decl)?;
            }
            last
        }
        StmtKind::Expr(expr) => Some(cx.visit_expr(*expr)?),
        StmtKind::Null => None,
        StmtKind::InlineAsm(_) => return Ok(Visit::Declined),
    };
    Ok(Visit::Handled(out))
}
