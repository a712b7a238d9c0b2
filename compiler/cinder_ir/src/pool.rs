//! Type interning.

mod format;

use rustc_hash::FxHashMap;

use crate::{FloatingKind, IntegerKind, Quals, Type, TypeData};

/// Owns every IR type of one module.
#[derive(Clone, Debug, Default)]
pub struct TypePool {
    data: Vec<TypeData>,
    index: FxHashMap<TypeData, Type>,
}

impl TypePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `data`, returning the existing handle for an equal type.
    pub fn intern(&mut self, data: TypeData) -> Type {
        if let Some(&ty) = self.index.get(&data) {
            return ty;
        }
        let raw = u32::try_from(self.data.len())
            .unwrap_or_else(|_| panic!("type pool exceeds u32::MAX entries"));
        let ty = Type::new(raw);
        self.data.push(data.clone());
        self.index.insert(data, ty);
        ty
    }

    #[inline]
    pub fn get(&self, ty: Type) -> &TypeData {
        &self.data[ty.index()]
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn quals(&self, ty: Type) -> Quals {
        self.get(ty).quals()
    }

    pub fn is_function(&self, ty: Type) -> bool {
        self.get(ty).is_function()
    }

    // ── Constructors ────────────────────────────────────────────

    pub fn void(&mut self) -> Type {
        self.intern(TypeData::Void)
    }

    pub fn bool(&mut self, quals: Quals) -> Type {
        self.intern(TypeData::Bool { quals })
    }

    pub fn int(&mut self, kind: IntegerKind, unsigned: bool, quals: Quals) -> Type {
        self.intern(TypeData::Int {
            kind,
            unsigned,
            quals,
        })
    }

    pub fn float(&mut self, kind: FloatingKind, quals: Quals) -> Type {
        self.intern(TypeData::Float { kind, quals })
    }

    pub fn pointer(&mut self, pointee: Type, quals: Quals) -> Type {
        self.intern(TypeData::Pointer { pointee, quals })
    }

    pub fn array(&mut self, element: Type, size: Option<u64>) -> Type {
        self.intern(TypeData::Array { element, size })
    }

    pub fn named(&mut self, name: impl Into<String>, quals: Quals) -> Type {
        self.intern(TypeData::Named {
            name: name.into(),
            quals,
        })
    }

    pub fn function(&mut self, params: Vec<Type>, result: Type, variadic: bool) -> Type {
        self.intern(TypeData::Function {
            params,
            result,
            variadic,
        })
    }

    pub fn lvalue(&mut self, inner: Type) -> Type {
        self.intern(TypeData::LValue { inner })
    }

    /// Strip one `LValue` wrapper, if present.
    pub fn value_type(&self, ty: Type) -> Type {
        match self.get(ty) {
            TypeData::LValue { inner } => *inner,
            _ => ty,
        }
    }
}
