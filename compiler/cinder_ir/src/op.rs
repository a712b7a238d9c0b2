//! Operations, regions and locations.
//!
//! Operations live in the module arena and are addressed by [`OpId`]. A
//! [`Region`] is an ordered list of ids; nesting is expressed by an
//! operation owning regions, never by pointers between operations.

use std::fmt;

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::Type;

/// Handle to an operation in the module arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct OpId(u32);

impl OpId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Source position attached to an operation.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Location {
    File {
        file: String,
        line: u32,
        column: u32,
    },
    /// Opaque id assigned when locations are emitted as metadata ids.
    Id(u64),
    #[default]
    Unknown,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File { file, line, column } => write!(f, "loc(\"{file}\":{line}:{column})"),
            Self::Id(id) => write!(f, "loc(#{id})"),
            Self::Unknown => f.write_str("loc(unknown)"),
        }
    }
}

/// An ordered list of operations.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Region {
    ops: Vec<OpId>,
}

impl Region {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: OpId) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[OpId] {
        &self.ops
    }

    pub fn last(&self) -> Option<OpId> {
        self.ops.last().copied()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = OpId> + '_ {
        self.ops.iter().copied()
    }

    /// Replace the contents of the region.
    pub fn set_ops(&mut self, ops: Vec<OpId>) {
        self.ops = ops;
    }

    pub fn take(&mut self) -> Vec<OpId> {
        std::mem::take(&mut self.ops)
    }
}

/// Where newly created operations are appended.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum InsertPoint {
    /// End of the module's top-level body.
    ModuleBody,
    /// End of region `index` of `op`.
    Region { op: OpId, index: usize },
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Linkage {
    External,
    Internal,
}

impl Linkage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::External => "external",
            Self::Internal => "internal",
        }
    }
}

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct FuncFlags: u8 {
        const INLINE = 1 << 0;
        const NORETURN = 1 << 1;
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum VarStorage {
    /// No storage-class specifier.
    None,
    Auto,
    Static,
    Extern,
    Register,
}

impl VarStorage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Auto => "auto",
            Self::Static => "static",
            Self::Extern => "extern",
            Self::Register => "register",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum RecordTag {
    Struct,
    Union,
    Class,
}

impl RecordTag {
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Struct => "hl.struct",
            Self::Union => "hl.union",
            Self::Class => "hl.class",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LinkageLang {
    C,
    Cxx,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Access {
    Public,
    Protected,
    Private,
}

impl Access {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ConstValue {
    Int(i128),
    /// IEEE-754 bits.
    Float(u64),
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum OpKind {
    // ── High level ──────────────────────────────────────────────
    /// Region 0 is the body; empty while the function is a prototype.
    Func {
        sym: String,
        ty: Type,
        linkage: Linkage,
        flags: FuncFlags,
    },
    Param {
        name: Option<String>,
    },
    /// Region 0, when present, is the initializer and ends in `Yield`.
    Var {
        sym: String,
        storage: VarStorage,
        local: bool,
    },
    Typedef {
        sym: String,
        ty: Type,
    },
    TypeAlias {
        sym: String,
        ty: Type,
    },
    /// Region 0 holds the fields.
    Record {
        sym: String,
        tag: RecordTag,
        complete: bool,
    },
    Field {
        name: String,
        ty: Type,
        bit_width: Option<u32>,
    },
    /// Region 0 holds the constants.
    Enum {
        sym: String,
        underlying: Option<Type>,
    },
    EnumConstant {
        name: String,
        value: i128,
    },
    LinkageSpec {
        lang: LinkageLang,
    },
    Label {
        name: String,
    },
    Empty,
    AccessSpec {
        access: Access,
    },
    Scope,
    Return {
        value: Option<OpId>,
    },
    Const {
        value: ConstValue,
    },
    DeclRef {
        sym: String,
        target: OpId,
    },
    Call {
        callee: String,
        args: Vec<OpId>,
    },
    Yield {
        value: Option<OpId>,
    },
    Unreachable,
    /// Placeholder for an AST construct without a lowering.
    Unsupported {
        node: String,
    },

    // ── Low level ───────────────────────────────────────────────
    LlFunc {
        sym: String,
        ty: Type,
        linkage: Linkage,
        flags: FuncFlags,
    },
    Cell {
        name: String,
    },
    InitCell {
        name: String,
        value: OpId,
    },
    Alloca {
        name: String,
    },
    Store {
        value: OpId,
        target: OpId,
    },
}

impl OpKind {
    pub const fn is_return_like(&self) -> bool {
        matches!(self, Self::Return { .. } | Self::Unreachable)
    }

    /// Terminates a value region without leaving the enclosing operation.
    pub const fn is_soft_terminator(&self) -> bool {
        matches!(self, Self::Yield { .. })
    }

    /// Module-level symbol this operation defines.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Self::Func { sym, .. }
            | Self::LlFunc { sym, .. }
            | Self::Var { sym, .. }
            | Self::Typedef { sym, .. }
            | Self::TypeAlias { sym, .. }
            | Self::Record { sym, .. }
            | Self::Enum { sym, .. } => Some(sym),
            _ => None,
        }
    }

    /// Values this operation reads.
    pub fn operands(&self) -> SmallVec<[OpId; 2]> {
        match self {
            Self::Return { value } | Self::Yield { value } => value.iter().copied().collect(),
            Self::Call { args, .. } => args.iter().copied().collect(),
            Self::InitCell { value, .. } => smallvec::smallvec![*value],
            Self::Store { value, target } => smallvec::smallvec![*value, *target],
            _ => SmallVec::new(),
        }
    }

    /// Number of regions an operation of this kind owns when created.
    pub const fn region_count(&self) -> usize {
        match self {
            Self::Func { .. }
            | Self::LlFunc { .. }
            | Self::Record { .. }
            | Self::Enum { .. }
            | Self::LinkageSpec { .. }
            | Self::Scope => 1,
            _ => 0,
        }
    }
}

/// One IR operation.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Operation {
    pub kind: OpKind,
    pub loc: Location,
    pub result: Option<Type>,
    pub regions: SmallVec<[Region; 1]>,
}

impl Operation {
    /// An operation with the default regions for its kind and no result.
    pub fn new(kind: OpKind, loc: Location) -> Self {
        let regions = (0..kind.region_count()).map(|_| Region::new()).collect();
        Self {
            kind,
            loc,
            result: None,
            regions,
        }
    }

    #[must_use]
    pub fn with_result(mut self, ty: Type) -> Self {
        self.result = Some(ty);
        self
    }

    /// Add one more (empty) region.
    #[must_use]
    pub fn with_region(mut self) -> Self {
        self.regions.push(Region::new());
        self
    }

    pub fn region(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }
}
