//! Declaration nodes.

use crate::{DeclId, ExprId, QualType, StmtId, TypeId};

/// Line / column position in the main source file.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    /// Location of compiler-synthesized nodes.
    pub const INVALID: SourceLocation = SourceLocation { line: 0, column: 0 };

    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.line != 0
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum StorageClass {
    #[default]
    None,
    Extern,
    Static,
    Auto,
    Register,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TagKind {
    Struct,
    Union,
    Class,
}

impl TagKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Struct => "struct",
            Self::Union => "union",
            Self::Class => "class",
        }
    }
}

/// Language named by an `extern "..."` block.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LinkageLanguage {
    C,
    Cxx,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AccessSpecifier {
    Public,
    Protected,
    Private,
}

/// Attributes on a function declaration that change how it is emitted.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct FunctionAttrs {
    /// `__attribute__((constructor))`
    pub constructor: bool,
    /// `__attribute__((destructor))`
    pub destructor: bool,
    /// `_Noreturn` / `[[noreturn]]`
    pub noreturn: bool,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct VarDecl {
    pub ty: QualType,
    pub init: Option<ExprId>,
    pub storage: StorageClass,
    pub thread_local: bool,
    /// Declared at block scope.
    pub is_local: bool,
    pub previous: Option<DeclId>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunctionDecl {
    /// `FunctionProto` or `FunctionNoProto` type of this declaration.
    pub ty: TypeId,
    pub params: Vec<DeclId>,
    pub body: Option<StmtId>,
    pub storage: StorageClass,
    pub is_inline: bool,
    pub attrs: FunctionAttrs,
    pub previous: Option<DeclId>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct RecordDecl {
    pub tag: TagKind,
    /// Fields, access specifiers and nested tag declarations, in order.
    pub members: Vec<DeclId>,
    /// This declaration carries the member list (`struct S { ... }`).
    pub is_definition: bool,
    /// C++ class with virtual member functions.
    pub is_polymorphic: bool,
    pub previous: Option<DeclId>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct EnumDecl {
    /// Resolved underlying integer type; absent for an opaque forward declaration.
    pub integer_type: Option<QualType>,
    pub constants: Vec<DeclId>,
    pub is_definition: bool,
    pub previous: Option<DeclId>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum DeclKind {
    TranslationUnit { decls: Vec<DeclId> },
    Var(VarDecl),
    Param { ty: QualType },
    Function(FunctionDecl),
    Typedef { underlying: QualType },
    TypeAlias { underlying: QualType },
    Record(RecordDecl),
    Field { ty: QualType, bit_width: Option<u32> },
    Enum(EnumDecl),
    EnumConstant { value: i128 },
    LinkageSpec { language: LinkageLanguage, decls: Vec<DeclId> },
    Label,
    Empty,
    AccessSpec { access: AccessSpecifier },
    StaticAssert,
    Namespace { decls: Vec<DeclId> },
    UsingDirective,
}

impl DeclKind {
    /// Node kind name used in diagnostics.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::TranslationUnit { .. } => "TranslationUnitDecl",
            Self::Var(_) => "VarDecl",
            Self::Param { .. } => "ParmVarDecl",
            Self::Function(_) => "FunctionDecl",
            Self::Typedef { .. } => "TypedefDecl",
            Self::TypeAlias { .. } => "TypeAliasDecl",
            Self::Record(_) => "RecordDecl",
            Self::Field { .. } => "FieldDecl",
            Self::Enum(_) => "EnumDecl",
            Self::EnumConstant { .. } => "EnumConstantDecl",
            Self::LinkageSpec { .. } => "LinkageSpecDecl",
            Self::Label => "LabelDecl",
            Self::Empty => "EmptyDecl",
            Self::AccessSpec { .. } => "AccessSpecDecl",
            Self::StaticAssert => "StaticAssertDecl",
            Self::Namespace { .. } => "NamespaceDecl",
            Self::UsingDirective => "UsingDirectiveDecl",
        }
    }

    /// Previous declaration of the same entity, if any.
    pub const fn previous(&self) -> Option<DeclId> {
        match self {
            Self::Var(var) => var.previous,
            Self::Function(func) => func.previous,
            Self::Record(record) => record.previous,
            Self::Enum(e) => e.previous,
            _ => None,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Decl {
    pub kind: DeclKind,
    /// Identifier; `None` for anonymous tags and unnamed parameters.
    pub name: Option<String>,
    pub loc: SourceLocation,
}
