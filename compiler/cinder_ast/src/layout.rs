//! Size and alignment of complete types on the target.
//!
//! Record layout follows the usual C rules: each field is placed at the next
//! offset aligned for its type, unions take the largest member, and the total
//! size is rounded up to the record's alignment. Bit-fields occupy a full
//! storage unit of their declared type.

use crate::{AstContext, BuiltinKind, DeclKind, QualType, SourceLanguage, TagKind, TypeId, TypeKind};

/// Size and ABI alignment of a type, in bits.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeLayout {
    pub size_bits: u64,
    pub align_bits: u32,
}

impl TypeLayout {
    #[inline]
    pub const fn new(size_bits: u64, align_bits: u32) -> Self {
        Self {
            size_bits,
            align_bits,
        }
    }

    /// Natural layout of a scalar of `bits` width.
    #[inline]
    const fn scalar(bits: u32) -> Self {
        Self::new(bits as u64, bits)
    }
}

fn align_to(offset: u64, align_bits: u32) -> u64 {
    let align = u64::from(align_bits.max(1));
    offset.div_ceil(align) * align
}

impl AstContext {
    /// Layout of a complete object type.
    ///
    /// Returns `None` for `void`, incomplete tags, function types and arrays
    /// without a constant bound.
    pub fn layout_of(&self, ty: TypeId) -> Option<TypeLayout> {
        let target = &self.target;
        match self.ty(ty) {
            TypeKind::Builtin(kind) => self.builtin_layout(*kind),
            TypeKind::Pointer { .. }
            | TypeKind::LValueReference { .. }
            | TypeKind::MemberPointer { .. } => Some(TypeLayout::scalar(target.pointer_width)),
            TypeKind::Typedef(_) | TypeKind::Elaborated { .. } | TypeKind::Paren { .. } => {
                self.layout_of(self.desugar(QualType::new(ty)).ty)
            }
            TypeKind::Record(decl) => self.record_layout(*decl),
            TypeKind::Enum(decl) => {
                let def = self.definition(*decl)?;
                match &self.decl(def).kind {
                    DeclKind::Enum(e) => self.layout_of(e.integer_type?.ty),
                    _ => None,
                }
            }
            TypeKind::ConstantArray { element, size } => {
                let elem = self.layout_of(element.ty)?;
                let bits = elem.size_bits.checked_mul(*size)?;
                Some(TypeLayout::new(bits, elem.align_bits))
            }
            TypeKind::Complex { element } => {
                let elem = self.layout_of(element.ty)?;
                Some(TypeLayout::new(elem.size_bits * 2, elem.align_bits))
            }
            TypeKind::Vector { element, count } => {
                let elem = self.layout_of(element.ty)?;
                let size = elem.size_bits.checked_mul(u64::from(*count))?;
                let align = u32::try_from(size.next_power_of_two()).unwrap_or(u32::MAX);
                Some(TypeLayout::new(size, align))
            }
            TypeKind::Atomic { value } => self.layout_of(value.ty),
            TypeKind::DependentSizedArray { .. }
            | TypeKind::IncompleteArray { .. }
            | TypeKind::VariableArray { .. }
            | TypeKind::FunctionProto { .. }
            | TypeKind::FunctionNoProto { .. } => None,
        }
    }

    fn builtin_layout(&self, kind: BuiltinKind) -> Option<TypeLayout> {
        let target = &self.target;
        let bits = match kind {
            BuiltinKind::Void => return None,
            BuiltinKind::Bool
            | BuiltinKind::CharU
            | BuiltinKind::CharS
            | BuiltinKind::SChar
            | BuiltinKind::UChar
            | BuiltinKind::Char8 => 8,
            BuiltinKind::Short
            | BuiltinKind::UShort
            | BuiltinKind::Half
            | BuiltinKind::Float16
            | BuiltinKind::BFloat16
            | BuiltinKind::Char16 => 16,
            BuiltinKind::Int
            | BuiltinKind::UInt
            | BuiltinKind::Float
            | BuiltinKind::WChar
            | BuiltinKind::Char32 => 32,
            BuiltinKind::Long | BuiltinKind::ULong => target.long_width,
            BuiltinKind::LongLong | BuiltinKind::ULongLong | BuiltinKind::Double => 64,
            BuiltinKind::Int128
            | BuiltinKind::UInt128
            | BuiltinKind::Float128
            | BuiltinKind::Ibm128 => 128,
            BuiltinKind::LongDouble => target.long_double_width,
            BuiltinKind::NullPtr => target.pointer_width,
        };
        Some(TypeLayout::scalar(bits))
    }

    fn record_layout(&self, decl: crate::DeclId) -> Option<TypeLayout> {
        let def = self.definition(decl)?;
        let DeclKind::Record(record) = &self.decl(def).kind else {
            return None;
        };

        let mut size = 0u64;
        let mut align = 8u32;
        if record.is_polymorphic {
            size = u64::from(self.target.pointer_width);
            align = self.target.pointer_width;
        }

        for &member in &record.members {
            let DeclKind::Field { ty, .. } = &self.decl(member).kind else {
                continue;
            };
            let field = self.layout_of(ty.ty)?;
            align = align.max(field.align_bits);
            size = match record.tag {
                TagKind::Union => size.max(field.size_bits),
                TagKind::Struct | TagKind::Class => {
                    align_to(size, field.align_bits) + field.size_bits
                }
            };
        }

        // An empty C++ class still occupies one byte.
        if size == 0 && self.lang.language == SourceLanguage::Cxx {
            size = 8;
        }
        Some(TypeLayout::new(align_to(size, align), align))
    }
}
