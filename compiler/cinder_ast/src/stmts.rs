//! Statement and expression nodes.
//!
//! Floating literals store their value as IEEE-754 bits so that every node
//! type can derive `Eq` and `Hash`.

use crate::{DeclId, ExprId, QualType, SourceLocation, StmtId};

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum StmtKind {
    Compound(Vec<StmtId>),
    Return(Option<ExprId>),
    /// Block-scope declarations (`int x = 1, y;`).
    Decl(Vec<DeclId>),
    Expr(ExprId),
    Null,
    /// GNU inline assembly block.
    InlineAsm(String),
}

impl StmtKind {
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Compound(_) => "CompoundStmt",
            Self::Return(_) => "ReturnStmt",
            Self::Decl(_) => "DeclStmt",
            Self::Expr(_) => "ExprStmt",
            Self::Null => "NullStmt",
            Self::InlineAsm(_) => "GCCAsmStmt",
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub loc: SourceLocation,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    IntegerLiteral(i128),
    /// IEEE-754 bits of the literal value.
    FloatingLiteral(u64),
    DeclRef(DeclId),
    Call {
        callee: ExprId,
        args: Vec<ExprId>,
    },
    Lambda,
}

impl ExprKind {
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::IntegerLiteral(_) => "IntegerLiteral",
            Self::FloatingLiteral(_) => "FloatingLiteral",
            Self::DeclRef(_) => "DeclRefExpr",
            Self::Call { .. } => "CallExpr",
            Self::Lambda => "LambdaExpr",
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    /// Type of the expression; `None` only for dependent expressions.
    pub ty: Option<QualType>,
    pub loc: SourceLocation,
}
