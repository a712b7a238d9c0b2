//! Source-language type nodes.
//!
//! Types are stored sugared: typedef names, elaborated `struct X` spellings
//! and parentheses survive as their own nodes so that consumers can choose
//! between the spelled and the desugared form.

use bitflags::bitflags;

use crate::{DeclId, ExprId, TypeId};

bitflags! {
    /// Local (non-sugar) qualifiers attached to a type use.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Qualifiers: u8 {
        const CONST = 1 << 0;
        const VOLATILE = 1 << 1;
        const RESTRICT = 1 << 2;
    }
}

/// A type together with the qualifiers of one particular use.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct QualType {
    pub ty: TypeId,
    pub quals: Qualifiers,
}

impl QualType {
    /// An unqualified use of `ty`.
    #[inline]
    pub const fn new(ty: TypeId) -> Self {
        Self {
            ty,
            quals: Qualifiers::empty(),
        }
    }

    /// A use of `ty` with the given qualifiers.
    #[inline]
    pub const fn with_quals(ty: TypeId, quals: Qualifiers) -> Self {
        Self { ty, quals }
    }

    /// Add qualifiers to this use.
    #[must_use]
    pub fn qualified(self, quals: Qualifiers) -> Self {
        Self {
            ty: self.ty,
            quals: self.quals | quals,
        }
    }
}

/// Built-in type kinds as produced by the front end.
///
/// This is intentionally wider than what the lowering engine can classify:
/// the character types beyond plain `char`, `nullptr_t` and the IBM
/// double-double format are recognized by the parser but have no IR
/// counterpart yet.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BuiltinKind {
    Void,
    Bool,
    /// Plain `char` on a target where it is unsigned.
    CharU,
    /// Plain `char` on a target where it is signed.
    CharS,
    SChar,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    LongLong,
    ULongLong,
    Int128,
    UInt128,
    Half,
    Float16,
    BFloat16,
    Float,
    Double,
    LongDouble,
    Float128,
    WChar,
    Char8,
    Char16,
    Char32,
    NullPtr,
    Ibm128,
}

impl BuiltinKind {
    /// Spelling used in type dumps.
    pub const fn spelling(self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Bool => "_Bool",
            Self::CharU | Self::CharS => "char",
            Self::SChar => "signed char",
            Self::UChar => "unsigned char",
            Self::Short => "short",
            Self::UShort => "unsigned short",
            Self::Int => "int",
            Self::UInt => "unsigned int",
            Self::Long => "long",
            Self::ULong => "unsigned long",
            Self::LongLong => "long long",
            Self::ULongLong => "unsigned long long",
            Self::Int128 => "__int128",
            Self::UInt128 => "unsigned __int128",
            Self::Half => "__fp16",
            Self::Float16 => "_Float16",
            Self::BFloat16 => "__bf16",
            Self::Float => "float",
            Self::Double => "double",
            Self::LongDouble => "long double",
            Self::Float128 => "__float128",
            Self::WChar => "wchar_t",
            Self::Char8 => "char8_t",
            Self::Char16 => "char16_t",
            Self::Char32 => "char32_t",
            Self::NullPtr => "std::nullptr_t",
            Self::Ibm128 => "__ibm128",
        }
    }

    /// Whether this kind is an integer type (`bool` excluded).
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::CharU
                | Self::CharS
                | Self::SChar
                | Self::UChar
                | Self::Short
                | Self::UShort
                | Self::Int
                | Self::UInt
                | Self::Long
                | Self::ULong
                | Self::LongLong
                | Self::ULongLong
                | Self::Int128
                | Self::UInt128
                | Self::WChar
                | Self::Char8
                | Self::Char16
                | Self::Char32
        )
    }

    /// Whether this kind is an unsigned integer type.
    pub const fn is_unsigned_integer(self) -> bool {
        matches!(
            self,
            Self::CharU
                | Self::UChar
                | Self::UShort
                | Self::UInt
                | Self::ULong
                | Self::ULongLong
                | Self::UInt128
                | Self::Char8
                | Self::Char16
                | Self::Char32
        )
    }

    /// Whether this kind is a floating-point type.
    pub const fn is_floating(self) -> bool {
        matches!(
            self,
            Self::Half
                | Self::Float16
                | Self::BFloat16
                | Self::Float
                | Self::Double
                | Self::LongDouble
                | Self::Float128
                | Self::Ibm128
        )
    }
}

/// A type node.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKind {
    Builtin(BuiltinKind),
    Pointer {
        pointee: QualType,
    },
    /// Reference to a struct / union / class declaration.
    Record(DeclId),
    /// Reference to an enum declaration.
    Enum(DeclId),
    /// Use of a typedef or alias name.
    Typedef(DeclId),
    /// `struct X` / `enum E` spelled with its tag keyword.
    Elaborated {
        named: QualType,
    },
    Paren {
        inner: QualType,
    },
    ConstantArray {
        element: QualType,
        size: u64,
    },
    /// Array whose bound depends on a template parameter.
    DependentSizedArray {
        element: QualType,
    },
    /// `T[]`
    IncompleteArray {
        element: QualType,
    },
    /// `T[n]` with a runtime bound.
    VariableArray {
        element: QualType,
        size: ExprId,
    },
    FunctionProto {
        result: QualType,
        params: Vec<QualType>,
        variadic: bool,
    },
    /// K&R `T f()` without a parameter list.
    FunctionNoProto {
        result: QualType,
    },
    LValueReference {
        pointee: QualType,
    },
    Complex {
        element: QualType,
    },
    Vector {
        element: QualType,
        count: u32,
    },
    Atomic {
        value: QualType,
    },
    MemberPointer {
        pointee: QualType,
        class: DeclId,
    },
}

impl TypeKind {
    /// Node kind name used in diagnostics.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Builtin(_) => "BuiltinType",
            Self::Pointer { .. } => "PointerType",
            Self::Record(_) => "RecordType",
            Self::Enum(_) => "EnumType",
            Self::Typedef(_) => "TypedefType",
            Self::Elaborated { .. } => "ElaboratedType",
            Self::Paren { .. } => "ParenType",
            Self::ConstantArray { .. } => "ConstantArrayType",
            Self::DependentSizedArray { .. } => "DependentSizedArrayType",
            Self::IncompleteArray { .. } => "IncompleteArrayType",
            Self::VariableArray { .. } => "VariableArrayType",
            Self::FunctionProto { .. } => "FunctionProtoType",
            Self::FunctionNoProto { .. } => "FunctionNoProtoType",
            Self::LValueReference { .. } => "LValueReferenceType",
            Self::Complex { .. } => "ComplexType",
            Self::Vector { .. } => "VectorType",
            Self::Atomic { .. } => "AtomicType",
            Self::MemberPointer { .. } => "MemberPointerType",
        }
    }

    /// Whether this node is pure sugar over another type.
    pub const fn is_sugar(&self) -> bool {
        matches!(
            self,
            Self::Typedef(_) | Self::Elaborated { .. } | Self::Paren { .. }
        )
    }

    /// Whether this is a function type (with or without prototype).
    pub const fn is_function(&self) -> bool {
        matches!(self, Self::FunctionProto { .. } | Self::FunctionNoProto { .. })
    }
}
