//! Source types to IR types.
//!
//! A type use is converted in three steps: a cache lookup, classification of
//! the (desugared) type into a [`SourceShape`], and one conversion rule per
//! shape. Each conversion of a complete object type also records the type's
//! size and alignment in the module's data-layout blueprint.

use cinder_ast::{BuiltinKind, DeclId, DeclKind, QualType, Qualifiers, TypeKind};
use cinder_ir::{DataLayoutEntry, FloatingKind, IntegerKind, Quals, Type};

use crate::cache::TypeKey;
use crate::context::CodegenContext;
use crate::stack::ensure_sufficient_stack;
use crate::{CodegenError, Result};

/// Closed classification of a desugared source type.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum SourceShape {
    Builtin(BuiltinKind),
    Pointer(QualType),
    Record(DeclId),
    Enum(DeclId),
    /// `size: None` for arrays without a constant bound.
    Array {
        element: QualType,
        size: Option<u64>,
    },
    Function {
        result: QualType,
        params: Vec<QualType>,
        variadic: bool,
    },
}

impl SourceShape {
    /// Classify a desugared type. Recognized kinds without an IR form are
    /// reported as `None`.
    pub fn classify(kind: &TypeKind) -> Option<Self> {
        Some(match kind {
            TypeKind::Builtin(builtin) => Self::Builtin(*builtin),
            TypeKind::Pointer { pointee } => Self::Pointer(*pointee),
            TypeKind::Record(decl) => Self::Record(*decl),
            TypeKind::Enum(decl) => Self::Enum(*decl),
            TypeKind::ConstantArray { element, size } => Self::Array {
                element: *element,
                size: Some(*size),
            },
            TypeKind::DependentSizedArray { element }
            | TypeKind::IncompleteArray { element }
            | TypeKind::VariableArray { element, .. } => Self::Array {
                element: *element,
                size: None,
            },
            TypeKind::FunctionProto {
                result,
                params,
                variadic,
            } => Self::Function {
                result: *result,
                params: params.clone(),
                variadic: *variadic,
            },
            TypeKind::FunctionNoProto { result } => Self::Function {
                result: *result,
                params: Vec::new(),
                variadic: false,
            },
            TypeKind::LValueReference { .. }
            | TypeKind::Complex { .. }
            | TypeKind::Vector { .. }
            | TypeKind::Atomic { .. }
            | TypeKind::MemberPointer { .. }
            | TypeKind::Typedef(_)
            | TypeKind::Elaborated { .. }
            | TypeKind::Paren { .. } => return None,
        })
    }
}

/// Integer rank of a builtin kind; `None` outside the classifiable set.
pub fn integer_kind(kind: BuiltinKind) -> Option<IntegerKind> {
    match kind {
        BuiltinKind::CharU | BuiltinKind::UChar | BuiltinKind::CharS | BuiltinKind::SChar => {
            Some(IntegerKind::Char)
        }
        BuiltinKind::Short | BuiltinKind::UShort => Some(IntegerKind::Short),
        BuiltinKind::Int | BuiltinKind::UInt => Some(IntegerKind::Int),
        BuiltinKind::Long | BuiltinKind::ULong => Some(IntegerKind::Long),
        BuiltinKind::LongLong | BuiltinKind::ULongLong => Some(IntegerKind::LongLong),
        BuiltinKind::Int128 | BuiltinKind::UInt128 => Some(IntegerKind::Int128),
        _ => None,
    }
}

/// Floating rank of a builtin kind; `None` outside the classifiable set.
pub fn floating_kind(kind: BuiltinKind) -> Option<FloatingKind> {
    match kind {
        BuiltinKind::Half | BuiltinKind::Float16 => Some(FloatingKind::Half),
        BuiltinKind::BFloat16 => Some(FloatingKind::BFloat16),
        BuiltinKind::Float => Some(FloatingKind::Float),
        BuiltinKind::Double => Some(FloatingKind::Double),
        BuiltinKind::LongDouble => Some(FloatingKind::LongDouble),
        BuiltinKind::Float128 => Some(FloatingKind::Float128),
        _ => None,
    }
}

fn ir_quals(quals: Qualifiers) -> Quals {
    Quals::from_bits_truncate(quals.bits())
}

/// Scalars and named types only keep `const` and `volatile`.
fn cv_quals(quals: Qualifiers) -> Quals {
    ir_quals(quals) & (Quals::CONST | Quals::VOLATILE)
}

/// Converts source types for one [`CodegenContext`].
pub struct TypeConverter<'cx, 'ast> {
    cx: &'cx mut CodegenContext<'ast>,
}

impl<'cx, 'ast> TypeConverter<'cx, 'ast> {
    pub(crate) fn new(cx: &'cx mut CodegenContext<'ast>) -> Self {
        Self { cx }
    }

    /// Convert a type use by value.
    pub fn convert(&mut self, qt: QualType) -> Result<Type> {
        let key = TypeKey::value(qt);
        if let Some(ty) = self.cx.cache.lookup_type(key) {
            tracing::trace!(ast = ?qt.ty, ir = ?ty, "type cache hit");
            return Ok(ty);
        }
        let ty = ensure_sufficient_stack(|| self.convert_uncached(qt))?;
        self.register_layout(qt, ty);
        self.cx.cache.insert_type(key, ty)?;
        Ok(ty)
    }

    /// Convert a type use as addressable storage.
    pub fn lvalue_convert(&mut self, qt: QualType) -> Result<Type> {
        let ast = self.cx.ast;
        if ast.ty(ast.desugar(qt).ty).is_function() {
            return Err(CodegenError::unclassifiable(format!(
                "lvalue of function type:\n{}",
                ast.dump_type(qt)
            )));
        }
        let key = TypeKey::lvalue(qt);
        if let Some(ty) = self.cx.cache.lookup_type(key) {
            tracing::trace!(ast = ?qt.ty, ir = ?ty, "lvalue cache hit");
            return Ok(ty);
        }
        let value = self.convert(qt)?;
        let ty = self.cx.module.types_mut().lvalue(value);
        self.register_layout(qt, ty);
        self.cx.cache.insert_type(key, ty)?;
        Ok(ty)
    }

    /// Signature of a function declaration, with every parameter converted
    /// as storage.
    pub fn convert_function_decl(&mut self, decl: DeclId) -> Result<Type> {
        let ast = self.cx.ast;
        let DeclKind::Function(func) = &ast.decl(decl).kind else {
            return Err(CodegenError::unclassifiable(format!(
                "{} as function signature",
                ast.decl(decl).kind.kind_name()
            )));
        };
        let fn_type = ast.desugar(QualType::new(func.ty));
        let (result, proto_params, variadic) = match ast.ty(fn_type.ty) {
            TypeKind::FunctionProto {
                result,
                params,
                variadic,
            } => (*result, params.as_slice(), *variadic),
            TypeKind::FunctionNoProto { result } => (*result, &[] as &[QualType], false),
            _ => {
                return Err(CodegenError::unclassifiable(format!(
                    "function declaration type:\n{}",
                    ast.dump_type(fn_type)
                )))
            }
        };
        let mut params = Vec::with_capacity(func.params.len().max(proto_params.len()));
        if func.params.is_empty() {
            // A prototype without named parameters.
            for &ty in proto_params {
                params.push(self.lvalue_convert(ty)?);
            }
        }
        for &param in &func.params {
            if let DeclKind::Param { ty } = &ast.decl(param).kind {
                params.push(self.lvalue_convert(*ty)?);
            }
        }
        let result = self.convert(result)?;
        Ok(self.cx.module.types_mut().function(params, result, variadic))
    }

    fn convert_uncached(&mut self, qt: QualType) -> Result<Type> {
        let ast = self.cx.ast;
        if let TypeKind::Typedef(decl) = ast.ty(qt.ty) {
            if let Some(underlying) = ast.single_step_desugar(QualType::new(qt.ty)) {
                self.convert(underlying)?;
            }
            self.schedule_unemitted(*decl);
            let name = self.cx.symbol(*decl);
            return Ok(self.cx.module.types_mut().named(name, ir_quals(qt.quals)));
        }

        let desugared = ast.desugar(qt);
        let Some(shape) = SourceShape::classify(ast.ty(desugared.ty)) else {
            return Err(CodegenError::unclassifiable(format!(
                "type:\n{}",
                ast.dump_type(qt)
            )));
        };
        let quals = desugared.quals;
        match shape {
            SourceShape::Builtin(kind) => self.convert_builtin(kind, quals, qt),
            SourceShape::Pointer(pointee) => {
                let pointee = self.convert(pointee)?;
                Ok(self.cx.module.types_mut().pointer(pointee, ir_quals(quals)))
            }
            SourceShape::Record(decl) | SourceShape::Enum(decl) => {
                self.schedule_unemitted(decl);
                let name = self.cx.symbol(decl);
                Ok(self.cx.module.types_mut().named(name, cv_quals(quals)))
            }
            SourceShape::Array { element, size } => {
                // Qualifiers on an array type apply to its elements.
                let element = self.convert(element.qualified(quals))?;
                Ok(self.cx.module.types_mut().array(element, size))
            }
            SourceShape::Function {
                result,
                params,
                variadic,
            } => {
                let params = params
                    .into_iter()
                    .map(|param| self.convert(param))
                    .collect::<Result<Vec<_>>>()?;
                let result = self.convert(result)?;
                Ok(self.cx.module.types_mut().function(params, result, variadic))
            }
        }
    }

    fn convert_builtin(&mut self, kind: BuiltinKind, quals: Qualifiers, qt: QualType) -> Result<Type> {
        let quals = cv_quals(quals);
        let ast = self.cx.ast;
        let types = self.cx.module.types_mut();
        match kind {
            BuiltinKind::Void => Ok(types.void()),
            BuiltinKind::Bool => Ok(types.bool(quals)),
            kind if kind.is_integer() => {
                let Some(rank) = integer_kind(kind) else {
                    return Err(CodegenError::unclassifiable(format!(
                        "unknown integer kind:\n{}",
                        ast.dump_type(qt)
                    )));
                };
                Ok(types.int(rank, kind.is_unsigned_integer(), quals))
            }
            kind if kind.is_floating() => {
                let Some(rank) = floating_kind(kind) else {
                    return Err(CodegenError::unclassifiable(format!(
                        "unknown floating kind:\n{}",
                        ast.dump_type(qt)
                    )));
                };
                Ok(types.float(rank, quals))
            }
            _ => Err(CodegenError::unclassifiable(format!(
                "builtin type:\n{}",
                ast.dump_type(qt)
            ))),
        }
    }

    /// Naming a tag or typedef that has no operation yet queues its
    /// declaration.
    fn schedule_unemitted(&mut self, decl: DeclId) {
        let canonical = self.cx.ast.canonical_decl(decl);
        if self.cx.cache.lookup_decl(canonical).is_none() {
            self.cx.worklist.schedule(canonical);
        }
    }

    fn register_layout(&mut self, qt: QualType, ty: Type) {
        let ast = self.cx.ast;
        let types = self.cx.module.types();
        if types.is_function(types.value_type(ty)) || ast.is_forward_declared(qt.ty) {
            return;
        }
        let Some(layout) = ast.layout_of(qt.ty) else {
            return;
        };
        let entry = DataLayoutEntry {
            size_bits: layout.size_bits,
            align_bits: layout.align_bits,
        };
        if self.cx.module.data_layout_mut().try_emplace(ty, entry) {
            tracing::trace!(ir = ?ty, size = entry.size_bits, align = entry.align_bits, "layout registered");
        }
    }
}
