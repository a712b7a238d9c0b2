use pretty_assertions::assert_eq;

use crate::{
    FuncFlags, InsertPoint, IntegerKind, Linkage, Location, Module, OpKind, Operation, Quals,
    RecordTag, VarStorage,
};

use super::*;

fn op(kind: OpKind) -> Operation {
    Operation::new(kind, Location::Unknown)
}

fn record(m: &mut Module, sym: &str, complete: bool) -> OpId {
    m.append(
        InsertPoint::ModuleBody,
        op(OpKind::Record {
            sym: sym.into(),
            tag: RecordTag::Struct,
            complete,
        }),
    )
}

fn field(m: &mut Module, point: InsertPoint, ty: Type) -> OpId {
    m.append(
        point,
        op(OpKind::Field {
            name: "f".into(),
            ty,
            bit_width: None,
        }),
    )
}

#[test]
fn well_formed_module_passes() {
    let mut m = Module::new("ok", Location::Unknown);
    let named = m.types_mut().named("Node", Quals::empty());
    let ptr = m.types_mut().pointer(named, Quals::empty());
    let node = record(&mut m, "Node", true);
    field(&mut m, InsertPoint::Region { op: node, index: 0 }, ptr);
    assert_eq!(verify(&m), Ok(()));
}

#[test]
fn duplicate_symbols_are_reported() {
    let mut m = Module::new("dup", Location::Unknown);
    record(&mut m, "S", true);
    record(&mut m, "S", true);
    assert_eq!(
        verify(&m),
        Err(vec![VerifyError::DuplicateSymbol { sym: "S".into() }])
    );
}

#[test]
fn typedef_may_share_a_tag_name() {
    let mut m = Module::new("td", Location::Unknown);
    let named = m.types_mut().named("S", Quals::empty());
    record(&mut m, "S", true);
    m.append(
        InsertPoint::ModuleBody,
        op(OpKind::Typedef {
            sym: "S".into(),
            ty: named,
        }),
    );
    assert_eq!(verify(&m), Ok(()));
}

#[test]
fn incomplete_record_with_fields_is_rejected() {
    let mut m = Module::new("inc", Location::Unknown);
    let int = m.types_mut().int(IntegerKind::Int, false, Quals::empty());
    let s = record(&mut m, "S", false);
    field(&mut m, InsertPoint::Region { op: s, index: 0 }, int);
    assert_eq!(
        verify(&m),
        Err(vec![VerifyError::IncompleteRecordWithFields { sym: "S".into() }])
    );
}

#[test]
fn field_at_module_scope_is_rejected() {
    let mut m = Module::new("f", Location::Unknown);
    let int = m.types_mut().int(IntegerKind::Int, false, Quals::empty());
    let f = field(&mut m, InsertPoint::ModuleBody, int);
    assert_eq!(verify(&m), Err(vec![VerifyError::FieldOutsideRecord { op: f }]));
}

#[test]
fn unknown_named_type_is_rejected() {
    let mut m = Module::new("n", Location::Unknown);
    let named = m.types_mut().named("Missing", Quals::empty());
    let s = record(&mut m, "S", true);
    let f = field(&mut m, InsertPoint::Region { op: s, index: 0 }, named);
    assert_eq!(
        verify(&m),
        Err(vec![VerifyError::UnknownNamedType {
            op: f,
            name: "Missing".into()
        }])
    );
}

#[test]
fn function_body_must_end_in_return_like_op() {
    let mut m = Module::new("t", Location::Unknown);
    let void = m.types_mut().void();
    let fn_ty = m.types_mut().function(vec![], void, false);
    let func = m.append(
        InsertPoint::ModuleBody,
        op(OpKind::Func {
            sym: "f".into(),
            ty: fn_ty,
            linkage: Linkage::External,
            flags: FuncFlags::empty(),
        }),
    );
    m.append(InsertPoint::Region { op: func, index: 0 }, op(OpKind::Empty));
    assert_eq!(
        verify(&m),
        Err(vec![VerifyError::MissingTerminator { sym: "f".into() }])
    );
}

#[test]
fn yield_must_close_an_initializer() {
    let mut m = Module::new("y", Location::Unknown);
    let var = m.append(
        InsertPoint::ModuleBody,
        op(OpKind::Var {
            sym: "v".into(),
            storage: VarStorage::Static,
            local: false,
        })
        .with_region(),
    );
    let init = InsertPoint::Region { op: var, index: 0 };
    let y = m.append(init, op(OpKind::Yield { value: None }));
    m.append(init, op(OpKind::Empty));
    assert_eq!(verify(&m), Err(vec![VerifyError::MisplacedYield { op: y }]));
}

#[test]
fn operands_must_be_defined_first() {
    let mut m = Module::new("u", Location::Unknown);
    let void = m.types_mut().void();
    let fn_ty = m.types_mut().function(vec![], void, false);
    let func = m.append(
        InsertPoint::ModuleBody,
        op(OpKind::Func {
            sym: "f".into(),
            ty: fn_ty,
            linkage: Linkage::External,
            flags: FuncFlags::empty(),
        }),
    );
    let dangling = OpId::new(99);
    let ret = m.append(
        InsertPoint::Region { op: func, index: 0 },
        op(OpKind::Return {
            value: Some(dangling),
        }),
    );
    assert_eq!(
        verify(&m),
        Err(vec![VerifyError::UndefinedOperand {
            op: ret,
            operand: dangling
        }])
    );
}
