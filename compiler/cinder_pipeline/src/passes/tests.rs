#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use cinder_ir::{
    print_module, verify, ConstValue, FuncFlags, IntegerKind, Linkage, LinkageLang, Location,
    OpKind, Operation, Quals, VarStorage,
};
use pretty_assertions::assert_eq;

use super::*;
use crate::{Pipeline, PassRegistry, StepContext};

const HEADER: &str = "module @\"m\" attributes {source_language = \"\", target_triple = \"\"} {\n";

fn op(kind: OpKind) -> Operation {
    Operation::new(kind, Location::Unknown)
}

fn var(sym: &str, local: bool) -> OpKind {
    OpKind::Var {
        sym: sym.into(),
        storage: VarStorage::None,
        local,
    }
}

/// `int f() { int x = 7; int y; return x; }` plus a global `g`.
fn sample() -> Module {
    let mut module = Module::new("m", Location::Unknown);
    let types = module.types_mut();
    let int = types.int(IntegerKind::Int, false, Quals::empty());
    let lvalue = types.lvalue(int);
    let fn_ty = types.function(vec![], int, false);

    let f = module.append(
        InsertPoint::ModuleBody,
        op(OpKind::Func {
            sym: "f".into(),
            ty: fn_ty,
            linkage: Linkage::External,
            flags: FuncFlags::INLINE,
        }),
    );
    let body = InsertPoint::Region { op: f, index: 0 };
    let x = module.append(body, op(var("x", true)).with_result(lvalue).with_region());
    let init = InsertPoint::Region { op: x, index: 0 };
    let seven = module.append(
        init,
        op(OpKind::Const {
            value: ConstValue::Int(7),
        })
        .with_result(int),
    );
    module.append(init, op(OpKind::Yield { value: Some(seven) }));
    module.append(body, op(var("y", true)).with_result(lvalue));
    let read = module.append(
        body,
        op(OpKind::DeclRef {
            sym: "x".into(),
            target: x,
        })
        .with_result(lvalue),
    );
    module.append(body, op(OpKind::Return { value: Some(read) }));
    module.append(
        InsertPoint::ModuleBody,
        op(var("g", false)).with_result(lvalue),
    );
    module
}

fn run(module: &mut Module, requested: &[&str]) {
    let registry = PassRegistry::with_builtin_passes();
    Pipeline::schedule(&registry, requested)
        .unwrap()
        .run(module, &StepContext::default())
        .unwrap();
}

#[test]
fn functions_become_low_level() {
    let mut module = sample();
    lower_functions(&mut module, &StepContext::default()).unwrap();
    assert!(print_module(&module)
        .starts_with(&format!("{HEADER}  ll.func @f !hl.fn<() -> !hl.int> external inline {{\n")));
    assert_eq!(module.symbol_ops().len(), 2);
}

#[test]
fn to_ll_turns_locals_into_cells() {
    let mut module = sample();
    run(&mut module, &["to-ll"]);
    let expected = format!(
        "{HEADER}\
         \x20 ll.func @f !hl.fn<() -> !hl.int> external inline {{\n\
         \x20   %2 = hl.const 7 : !hl.int\n\
         \x20   %1 = ll.cell_init @x %2 : !hl.lvalue<!hl.int>\n\
         \x20   %4 = ll.cell @y : !hl.lvalue<!hl.int>\n\
         \x20   %5 = hl.ref @x (%1) : !hl.lvalue<!hl.int>\n\
         \x20   hl.return %5\n\
         \x20 }}\n\
         \x20 %7 = hl.var @g : !hl.lvalue<!hl.int>\n\
         }}\n"
    );
    assert_eq!(print_module(&module), expected);
    assert_eq!(verify(&module), Ok(()));
}

#[test]
fn to_mem_stores_initial_values() {
    let mut module = sample();
    run(&mut module, &["to-mem"]);
    let expected = format!(
        "{HEADER}\
         \x20 ll.func @f !hl.fn<() -> !hl.int> external inline {{\n\
         \x20   %2 = hl.const 7 : !hl.int\n\
         \x20   %1 = ll.alloca @x : !hl.lvalue<!hl.int>\n\
         \x20   ll.store %2, %1\n\
         \x20   %4 = ll.alloca @y : !hl.lvalue<!hl.int>\n\
         \x20   %5 = hl.ref @x (%1) : !hl.lvalue<!hl.int>\n\
         \x20   hl.return %5\n\
         \x20 }}\n\
         \x20 %7 = hl.var @g : !hl.lvalue<!hl.int>\n\
         }}\n"
    );
    assert_eq!(print_module(&module), expected);
    assert_eq!(verify(&module), Ok(()));
}

#[test]
fn to_mem_spills_parameters() {
    // int first(int a, int) { return a; }
    let mut module = Module::new("m", Location::Unknown);
    let types = module.types_mut();
    let int = types.int(IntegerKind::Int, false, Quals::empty());
    let lvalue = types.lvalue(int);
    let fn_ty = types.function(vec![lvalue, lvalue], int, false);
    let f = module.append(
        InsertPoint::ModuleBody,
        op(OpKind::Func {
            sym: "first".into(),
            ty: fn_ty,
            linkage: Linkage::External,
            flags: FuncFlags::empty(),
        }),
    );
    let body = InsertPoint::Region { op: f, index: 0 };
    let a = module.append(
        body,
        op(OpKind::Param {
            name: Some("a".into()),
        })
        .with_result(lvalue),
    );
    module.append(body, op(OpKind::Param { name: None }).with_result(lvalue));
    let read = module.append(
        body,
        op(OpKind::DeclRef {
            sym: "a".into(),
            target: a,
        })
        .with_result(lvalue),
    );
    module.append(body, op(OpKind::Return { value: Some(read) }));

    run(&mut module, &["to-mem"]);
    let expected = format!(
        "{HEADER}\
         \x20 ll.func @first !hl.fn<(!hl.lvalue<!hl.int>, !hl.lvalue<!hl.int>) -> !hl.int> external {{\n\
         \x20   %5 = hl.param @a : !hl.int\n\
         \x20   %7 = hl.param @_ : !hl.int\n\
         \x20   %1 = ll.alloca @a : !hl.lvalue<!hl.int>\n\
         \x20   ll.store %5, %1\n\
         \x20   %2 = ll.alloca @arg1 : !hl.lvalue<!hl.int>\n\
         \x20   ll.store %7, %2\n\
         \x20   %3 = hl.ref @a (%1) : !hl.lvalue<!hl.int>\n\
         \x20   hl.return %3\n\
         \x20 }}\n\
         }}\n"
    );
    assert_eq!(print_module(&module), expected);
    assert_eq!(verify(&module), Ok(()));
}

#[test]
fn globals_inside_linkage_specs_are_untouched() {
    let mut module = Module::new("m", Location::Unknown);
    let int = module
        .types_mut()
        .int(IntegerKind::Int, false, Quals::empty());
    let spec = module.append(
        InsertPoint::ModuleBody,
        op(OpKind::LinkageSpec {
            lang: LinkageLang::C,
        }),
    );
    let g = module.append(
        InsertPoint::Region { op: spec, index: 0 },
        op(var("g", false)).with_result(int),
    );
    lower_local_vars(&mut module, &StepContext::default()).unwrap();
    assert_eq!(module.op(g).kind, var("g", false));
}

#[test]
fn initializer_without_yield_is_an_error() {
    let mut module = Module::new("m", Location::Unknown);
    let int = module
        .types_mut()
        .int(IntegerKind::Int, false, Quals::empty());
    let scope = module.append(InsertPoint::ModuleBody, op(OpKind::Scope));
    let x = module.append(
        InsertPoint::Region { op: scope, index: 0 },
        op(var("x", true)).with_result(int).with_region(),
    );
    module.append(
        InsertPoint::Region { op: x, index: 0 },
        op(OpKind::Const {
            value: ConstValue::Int(1),
        })
        .with_result(int),
    );
    let err = lower_local_vars(&mut module, &StepContext::default()).unwrap_err();
    assert_eq!(err.message(), "initializer of @x does not end in a yield");
}

#[test]
fn yield_without_value_is_an_error() {
    let mut module = Module::new("m", Location::Unknown);
    let scope = module.append(InsertPoint::ModuleBody, op(OpKind::Scope));
    let x = module.append(
        InsertPoint::Region { op: scope, index: 0 },
        op(var("x", true)).with_region(),
    );
    module.append(
        InsertPoint::Region { op: x, index: 0 },
        op(OpKind::Yield { value: None }),
    );
    let err = lower_local_vars(&mut module, &StepContext::default()).unwrap_err();
    assert_eq!(err.message(), "initializer of @x yields no value");
}

#[test]
fn nested_scopes_are_rewritten() {
    let mut module = Module::new("m", Location::Unknown);
    let outer = module.append(InsertPoint::ModuleBody, op(OpKind::Scope));
    let inner = module.append(InsertPoint::Region { op: outer, index: 0 }, op(OpKind::Scope));
    let x = module.append(InsertPoint::Region { op: inner, index: 0 }, op(var("x", true)));
    run(&mut module, &["to-mem"]);
    assert_eq!(
        module.op(x).kind,
        OpKind::Alloca { name: "x".into() }
    );
}
