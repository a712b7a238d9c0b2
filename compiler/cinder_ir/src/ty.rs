//! IR type data.
//!
//! Types are immutable and interned in a [`TypePool`](crate::TypePool); the
//! [`Type`] handle is the only way to refer to one. Two handles are equal
//! exactly when the types are structurally equal.

use std::fmt;

use bitflags::bitflags;

/// Interned type handle.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Type(u32);

impl Type {
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

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self.0)
    }
}

bitflags! {
    /// CVR qualifiers carried by scalar, pointer and named types.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Quals: u8 {
        const CONST = 1 << 0;
        const VOLATILE = 1 << 1;
        const RESTRICT = 1 << 2;
    }
}

impl Quals {
    /// Qualifier keywords in canonical order.
    pub fn keywords(self) -> impl Iterator<Item = &'static str> {
        [
            (Quals::CONST, "const"),
            (Quals::VOLATILE, "volatile"),
            (Quals::RESTRICT, "restrict"),
        ]
        .into_iter()
        .filter(move |(flag, _)| self.contains(*flag))
        .map(|(_, word)| word)
    }
}

/// Integer ranks, ordered by width.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum IntegerKind {
    Char,
    Short,
    Int,
    Long,
    LongLong,
    Int128,
}

impl IntegerKind {
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Char => "char",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::LongLong => "longlong",
            Self::Int128 => "int128",
        }
    }
}

/// Floating-point ranks, ordered by precision.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum FloatingKind {
    Half,
    BFloat16,
    Float,
    Double,
    LongDouble,
    Float128,
}

impl FloatingKind {
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Half => "half",
            Self::BFloat16 => "bfloat16",
            Self::Float => "float",
            Self::Double => "double",
            Self::LongDouble => "longdouble",
            Self::Float128 => "float128",
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeData {
    Void,
    Bool {
        quals: Quals,
    },
    Int {
        kind: IntegerKind,
        unsigned: bool,
        quals: Quals,
    },
    Float {
        kind: FloatingKind,
        quals: Quals,
    },
    Pointer {
        pointee: Type,
        quals: Quals,
    },
    /// `size: None` for arrays without a constant bound.
    Array {
        element: Type,
        size: Option<u64>,
    },
    /// Reference to a record, enum or typedef by name.
    Named {
        name: String,
        quals: Quals,
    },
    Function {
        params: Vec<Type>,
        result: Type,
        variadic: bool,
    },
    /// Addressable storage holding a value of `inner`.
    LValue {
        inner: Type,
    },
}

impl TypeData {
    pub fn quals(&self) -> Quals {
        match self {
            Self::Bool { quals }
            | Self::Int { quals, .. }
            | Self::Float { quals, .. }
            | Self::Pointer { quals, .. }
            | Self::Named { quals, .. } => *quals,
            Self::Void | Self::Array { .. } | Self::Function { .. } | Self::LValue { .. } => {
                Quals::empty()
            }
        }
    }

    pub const fn is_function(&self) -> bool {
        matches!(self, Self::Function { .. })
    }
}
