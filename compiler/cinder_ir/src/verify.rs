//! Structural checks on a finished module.
//!
//! The verifier collects every problem it finds instead of stopping at the
//! first; an empty list means the module is well formed.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{Module, OpId, OpKind, Region, Type, TypeData};

#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("symbol @{sym} is defined more than once")]
    DuplicateSymbol { sym: String },

    #[error("incomplete record @{sym} has fields")]
    IncompleteRecordWithFields { sym: String },

    #[error("field {op} is not inside a record")]
    FieldOutsideRecord { op: OpId },

    #[error("enum constant {op} is not inside an enum")]
    EnumConstantOutsideEnum { op: OpId },

    #[error("yield {op} is not the last operation of an initializer")]
    MisplacedYield { op: OpId },

    #[error("{op} uses unknown named type \"{name}\"")]
    UnknownNamedType { op: OpId, name: String },

    #[error("{op} uses {operand} before it is defined")]
    UndefinedOperand { op: OpId, operand: OpId },

    #[error("{op} refers to {target}, which does not exist")]
    DanglingReference { op: OpId, target: OpId },

    #[error("body of @{sym} does not end in a return-like operation")]
    MissingTerminator { sym: String },
}

/// Verification result.
pub type VerifyResult = Result<(), Vec<VerifyError>>;

/// Check `module` for structural errors.
pub fn verify(module: &Module) -> VerifyResult {
    let mut verifier = Verifier::new(module);
    verifier.check_symbols();
    verifier.walk(module.body(), None);
    if verifier.errors.is_empty() {
        Ok(())
    } else {
        tracing::debug!(errors = verifier.errors.len(), "module failed verification");
        Err(verifier.errors)
    }
}

/// C keeps tags (`struct X`) apart from ordinary identifiers.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
enum Namespace {
    Tag,
    Ordinary,
}

fn namespace_of(kind: &OpKind) -> Namespace {
    match kind {
        OpKind::Record { .. } | OpKind::Enum { .. } => Namespace::Tag,
        _ => Namespace::Ordinary,
    }
}

struct Verifier<'m> {
    module: &'m Module,
    type_names: FxHashSet<&'m str>,
    defined: FxHashSet<OpId>,
    errors: Vec<VerifyError>,
}

impl<'m> Verifier<'m> {
    fn new(module: &'m Module) -> Self {
        let mut type_names = FxHashSet::default();
        for point in module.regions() {
            for id in module.region(point).iter() {
                match &module.op(id).kind {
                    OpKind::Record { sym, .. }
                    | OpKind::Enum { sym, .. }
                    | OpKind::Typedef { sym, .. }
                    | OpKind::TypeAlias { sym, .. } => {
                        type_names.insert(sym.as_str());
                    }
                    _ => {}
                }
            }
        }
        Self {
            module,
            type_names,
            defined: FxHashSet::default(),
            errors: Vec::new(),
        }
    }

    fn check_symbols(&mut self) {
        let module = self.module;
        let mut seen: FxHashMap<(Namespace, &str), OpId> = FxHashMap::default();
        for id in module.symbol_ops() {
            let kind = &module.op(id).kind;
            let Some(sym) = kind.symbol() else { continue };
            if seen.insert((namespace_of(kind), sym), id).is_some() {
                self.errors.push(VerifyError::DuplicateSymbol {
                    sym: sym.to_owned(),
                });
            }
        }
    }

    fn walk(&mut self, region: &'m Region, parent: Option<&'m OpKind>) {
        let len = region.len();
        for (position, id) in region.iter().enumerate() {
            self.check_op(id, parent, position + 1 == len);
            self.defined.insert(id);
            let module = self.module;
            let op = module.op(id);
            for inner in &op.regions {
                self.walk(inner, Some(&op.kind));
            }
        }
    }

    fn check_op(&mut self, id: OpId, parent: Option<&OpKind>, is_last: bool) {
        let module = self.module;
        let op = module.op(id);

        for operand in op.kind.operands() {
            if !self.defined.contains(&operand) {
                self.errors.push(VerifyError::UndefinedOperand { op: id, operand });
            }
        }

        match &op.kind {
            OpKind::Field { ty, .. } => {
                if !matches!(parent, Some(OpKind::Record { .. })) {
                    self.errors.push(VerifyError::FieldOutsideRecord { op: id });
                }
                self.check_named(id, *ty);
            }
            OpKind::EnumConstant { .. } => {
                if !matches!(parent, Some(OpKind::Enum { .. })) {
                    self.errors.push(VerifyError::EnumConstantOutsideEnum { op: id });
                }
            }
            OpKind::Yield { .. } => {
                if !is_last || !matches!(parent, Some(OpKind::Var { .. })) {
                    self.errors.push(VerifyError::MisplacedYield { op: id });
                }
            }
            OpKind::Var { .. } => {
                if let Some(ty) = op.result {
                    self.check_named(id, ty);
                }
            }
            OpKind::Record { sym, complete, .. } => {
                let has_fields = op.regions.iter().any(|r| !r.is_empty());
                if !complete && has_fields {
                    self.errors
                        .push(VerifyError::IncompleteRecordWithFields { sym: sym.clone() });
                }
            }
            OpKind::Func { sym, .. } | OpKind::LlFunc { sym, .. } => {
                if let Some(body) = op.region(0).filter(|r| !r.is_empty()) {
                    let terminated = body
                        .last()
                        .is_some_and(|last| module.op(last).kind.is_return_like());
                    if !terminated {
                        self.errors
                            .push(VerifyError::MissingTerminator { sym: sym.clone() });
                    }
                }
            }
            OpKind::DeclRef { target, .. } => {
                if !module.contains(*target) {
                    self.errors.push(VerifyError::DanglingReference {
                        op: id,
                        target: *target,
                    });
                }
            }
            _ => {}
        }
    }

    fn check_named(&mut self, op: OpId, ty: Type) {
        let module = self.module;
        let types = module.types();
        let mut stack = vec![ty];
        while let Some(ty) = stack.pop() {
            match types.get(ty) {
                TypeData::Named { name, .. } => {
                    if !self.type_names.contains(name.as_str()) {
                        self.errors.push(VerifyError::UnknownNamedType {
                            op,
                            name: name.clone(),
                        });
                    }
                }
                TypeData::Pointer { pointee, .. } => stack.push(*pointee),
                TypeData::Array { element, .. } => stack.push(*element),
                TypeData::LValue { inner } => stack.push(*inner),
                TypeData::Function { params, result, .. } => {
                    stack.push(*result);
                    stack.extend(params.iter().copied());
                }
                TypeData::Void
                | TypeData::Bool { .. }
                | TypeData::Int { .. }
                | TypeData::Float { .. } => {}
            }
        }
    }
}

#[cfg(test)]
mod tests;
