//! Cinder AST - the read-only syntax tree consumed by the lowering engine.
//!
//! A translation unit is a set of flat arenas (declarations, types,
//! statements, expressions) addressed by `u32` handles. The tree is created
//! once with [`AstBuilder`] and then only queried through [`AstContext`].

mod builder;
mod context;
mod decls;
mod ids;
mod layout;
mod options;
mod stmts;
mod types;

pub use builder::AstBuilder;
pub use context::AstContext;
pub use decls::{
    AccessSpecifier, Decl, DeclKind, EnumDecl, FunctionAttrs, FunctionDecl, LinkageLanguage,
    RecordDecl, SourceLocation, StorageClass, TagKind, VarDecl,
};
pub use ids::{DeclId, ExprId, StmtId, TypeId};
pub use layout::TypeLayout;
pub use options::{LangOptions, SourceLanguage, TargetInfo};
pub use stmts::{Expr, ExprKind, Stmt, StmtKind};
pub use types::{BuiltinKind, QualType, Qualifiers, TypeKind};
