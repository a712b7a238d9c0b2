//! Memoized AST → IR entity mappings.
//!
//! Two tables: converted types keyed by the AST type use and conversion
//! mode, and emitted operations keyed by canonical declaration. Once a key
//! is bound, every lookup returns the identical entity for the lifetime of
//! the module.

use cinder_ast::{DeclId, QualType, Qualifiers, TypeId};
use cinder_ir::{OpId, Type};
use rustc_hash::FxHashMap;

use crate::{CodegenError, Result};

/// How a source type is being converted.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ConversionMode {
    Value,
    /// Addressable storage (variables and parameters).
    LValue,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeKey {
    pub ty: TypeId,
    pub quals: Qualifiers,
    pub mode: ConversionMode,
}

impl TypeKey {
    pub const fn value(qt: QualType) -> Self {
        Self {
            ty: qt.ty,
            quals: qt.quals,
            mode: ConversionMode::Value,
        }
    }

    pub const fn lvalue(qt: QualType) -> Self {
        Self {
            ty: qt.ty,
            quals: qt.quals,
            mode: ConversionMode::LValue,
        }
    }
}

#[derive(Debug, Default)]
pub struct EntityCache {
    types: FxHashMap<TypeKey, Type>,
    decls: FxHashMap<DeclId, OpId>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup_type(&self, key: TypeKey) -> Option<Type> {
        self.types.get(&key).copied()
    }

    /// Bind `key` to `ty`. Rebinding to the same type is a no-op.
    pub fn insert_type(&mut self, key: TypeKey, ty: Type) -> Result<()> {
        match self.types.get(&key) {
            Some(&bound) if bound == ty => Ok(()),
            Some(&bound) => Err(CodegenError::DuplicateEntity {
                key: format!("{key:?} (bound to {bound:?}, got {ty:?})"),
            }),
            None => {
                self.types.insert(key, ty);
                Ok(())
            }
        }
    }

    /// `decl` must be canonical.
    pub fn lookup_decl(&self, decl: DeclId) -> Option<OpId> {
        self.decls.get(&decl).copied()
    }

    /// Bind the canonical `decl` to `op`. Rebinding to the same op is a no-op.
    pub fn insert_decl(&mut self, decl: DeclId, op: OpId) -> Result<()> {
        match self.decls.get(&decl) {
            Some(&bound) if bound == op => Ok(()),
            Some(&bound) => Err(CodegenError::DuplicateEntity {
                key: format!("{decl:?} (bound to {bound}, got {op})"),
            }),
            None => {
                self.decls.insert(decl, op);
                Ok(())
            }
        }
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }
}

#[cfg(test)]
mod tests;
