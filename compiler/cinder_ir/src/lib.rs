//! Cinder IR - the typed, region-structured output of AST lowering.
//!
//! A [`Module`] owns an arena of [`Operation`]s, an interned [`TypePool`]
//! and a data-layout blueprint. High-level (`hl.*`) operations mirror source
//! declarations; low-level (`ll.*`) operations are introduced by the
//! conversion passes in `cinder_pipeline`.

mod module;
mod op;
mod pool;
mod printer;
mod ty;
mod verify;

pub use module::{DataLayoutBlueprint, DataLayoutEntry, Module, ModuleAttrs};
pub use op::{
    Access, ConstValue, FuncFlags, InsertPoint, Linkage, LinkageLang, Location, OpId, OpKind,
    Operation, RecordTag, Region, VarStorage,
};
pub use pool::TypePool;
pub use printer::{print_module, print_module_with_locations};
pub use ty::{FloatingKind, IntegerKind, Quals, Type, TypeData};
pub use verify::{verify, VerifyError, VerifyResult};
