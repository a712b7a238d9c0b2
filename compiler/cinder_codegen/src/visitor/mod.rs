//! Strategy chain dispatch.
//!
//! Every AST node is offered to the strategies of the active chain in order.
//! A strategy either handles the node or declines it by kind, before it has
//! built any IR; the first strategy that handles the node wins. Children are
//! visited through the chain again, never through the strategy that handled
//! their parent.

mod default;
mod unreachable;
mod unsupported;

use cinder_ast::{DeclId, ExprId, QualType, StmtId};
use cinder_ir::{OpId, Type};

use crate::context::CodegenContext;
use crate::stack::ensure_sufficient_stack;
use crate::{CodegenError, Result};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Strategy {
    /// Lowering for every supported node kind.
    Default,
    /// Emits an `unsup.op` placeholder for anything the default declines.
    UnsupportedFallback,
    /// Fails on any node that reaches it.
    UnreachableGuard,
}

impl Strategy {
    pub const FULL: &'static [Strategy] = &[
        Strategy::Default,
        Strategy::UnsupportedFallback,
        Strategy::UnreachableGuard,
    ];

    /// Chain used when the unsupported fallback is disabled.
    pub const STRICT: &'static [Strategy] = &[Strategy::Default, Strategy::UnreachableGuard];
}

/// Outcome of offering a node to one strategy.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Visit<T> {
    Handled(T),
    Declined,
}

impl CodegenContext<'_> {
    /// Lower a declaration at the current insertion point.
    ///
    /// Declarations that produce no operation of their own (a translation
    /// unit, a deferred definition) yield `None`.
    pub fn visit_decl(&mut self, decl: DeclId) -> Result<Option<OpId>> {
        let chain = self.chain;
        ensure_sufficient_stack(|| {
            for &strategy in chain {
                let visit = match strategy {
                    Strategy::Default => default::visit_decl(self, decl)?,
                    Strategy::UnsupportedFallback => unsupported::visit_decl(self, decl),
                    Strategy::UnreachableGuard => unreachable::visit_decl(self, decl)?,
                };
                if let Visit::Handled(out) = visit {
                    return Ok(out);
                }
            }
            Err(self.unhandled(self.ast.decl(decl).kind.kind_name()))
        })
    }

    pub fn visit_stmt(&mut self, stmt: StmtId) -> Result<Option<OpId>> {
        let chain = self.chain;
        ensure_sufficient_stack(|| {
            for &strategy in chain {
                let visit = match strategy {
                    Strategy::Default => default::visit_stmt(self, stmt)?,
                    Strategy::UnsupportedFallback => unsupported::visit_stmt(self, stmt),
                    Strategy::UnreachableGuard => unreachable::visit_stmt(self, stmt)?,
                };
                if let Visit::Handled(out) = visit {
                    return Ok(out);
                }
            }
            Err(self.unhandled(self.ast.stmt(stmt).kind.kind_name()))
        })
    }

    /// Lower an expression, returning the operation that defines its value.
    pub fn visit_expr(&mut self, expr: ExprId) -> Result<OpId> {
        let chain = self.chain;
        ensure_sufficient_stack(|| {
            for &strategy in chain {
                let visit = match strategy {
                    Strategy::Default => default::visit_expr(self, expr)?,
                    Strategy::UnsupportedFallback => unsupported::visit_expr(self, expr)?,
                    Strategy::UnreachableGuard => unreachable::visit_expr(self, expr)?,
                };
                if let Visit::Handled(out) = visit {
                    return Ok(out);
                }
            }
            Err(self.unhandled(self.ast.expr(expr).kind.kind_name()))
        })
    }

    pub fn visit_type(&mut self, qt: QualType) -> Result<Type> {
        for &strategy in self.chain {
            let visit = match strategy {
                Strategy::Default => default::visit_type(self, qt)?,
                Strategy::UnsupportedFallback => Visit::Declined,
                Strategy::UnreachableGuard => unreachable::visit_type(self, qt)?,
            };
            if let Visit::Handled(out) = visit {
                return Ok(out);
            }
        }
        Err(self.unhandled(self.ast.ty(qt.ty).kind_name()))
    }

    fn unhandled(&self, node: &str) -> CodegenError {
        CodegenError::Unreachable {
            node: node.to_owned(),
        }
    }
}
