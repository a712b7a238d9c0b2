//! Built-in pipelines over modules produced by `cinder_codegen`.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use cinder_ast::{AstBuilder, BuiltinKind};
use cinder_codegen::{lower_translation_unit, CodegenOptions};
use cinder_ir::{print_module, verify, Module};
use cinder_pipeline::{PassRegistry, Pipeline, StepContext};
use pretty_assertions::assert_eq;

/// `int f() { int x = 7; return x; }`
fn lowered() -> Module {
    let mut b = AstBuilder::new().with_main_file("mem.c");
    let int = b.builtin(BuiltinKind::Int);
    let seven = b.int_lit(7, int);
    let x = b.local_var("x", int, Some(seven));
    let decl = b.decl_stmt(vec![x]);
    let read = b.decl_ref(x);
    let ret = b.ret(Some(read));
    let body = b.compound(vec![decl, ret]);
    let sig = b.function_type(int, vec![], false);
    let f = b.function("f", sig, vec![], Some(body));
    b.translation_unit(vec![f]);
    let ast = b.finish();
    lower_translation_unit(&ast, CodegenOptions::default()).unwrap()
}

fn function_text(module: &Module) -> String {
    let text = print_module(module);
    let start = text.find("  ").unwrap();
    let end = text.find("\n  }\n").unwrap() + "\n  }\n".len();
    text[start..end].to_owned()
}

#[test]
fn to_mem_lowers_a_lowered_function() {
    let mut module = lowered();
    let registry = PassRegistry::with_builtin_passes();
    let schedule = Pipeline::schedule(&registry, &["to-mem"]).unwrap();
    schedule.run(&mut module, &StepContext::new(1)).unwrap();

    assert_eq!(
        function_text(&module),
        "  ll.func @f !hl.fn<() -> !hl.int> external {
    %2 = hl.const 7 : !hl.int
    %1 = ll.alloca @x : !hl.lvalue<!hl.int>
    ll.store %2, %1
    %4 = hl.ref @x (%1) : !hl.lvalue<!hl.int>
    hl.return %4
  }
"
    );
    assert_eq!(verify(&module), Ok(()));
}

#[test]
fn to_ll_keeps_the_data_layout() {
    let before = lowered();
    let mut after = before.clone();
    let registry = PassRegistry::with_builtin_passes();
    Pipeline::schedule(&registry, &["to-ll"])
        .unwrap()
        .run(&mut after, &StepContext::default())
        .unwrap();

    let layout = |m: &Module| m.data_layout().iter().collect::<Vec<_>>();
    assert_eq!(layout(&after), layout(&before));
    assert!(print_module(&after).contains("%1 = ll.cell_init @x %2 : !hl.lvalue<!hl.int>\n"));
}

#[test]
fn to_mem_spills_lowered_parameters() {
    // int id(int x) { return x; }
    let mut b = AstBuilder::new();
    let int = b.builtin(BuiltinKind::Int);
    let x = b.param("x", int);
    let sig = b.signature(int, &[x]);
    let read = b.decl_ref(x);
    let ret = b.ret(Some(read));
    let body = b.compound(vec![ret]);
    let id = b.function("id", sig, vec![x], Some(body));
    b.translation_unit(vec![id]);
    let ast = b.finish();
    let mut module = lower_translation_unit(&ast, CodegenOptions::default()).unwrap();

    let registry = PassRegistry::with_builtin_passes();
    Pipeline::schedule(&registry, &["to-mem"])
        .unwrap()
        .run(&mut module, &StepContext::default())
        .unwrap();

    assert_eq!(
        function_text(&module),
        "  ll.func @id !hl.fn<(!hl.lvalue<!hl.int>) -> !hl.int> external {
    %4 = hl.param @x : !hl.int
    %1 = ll.alloca @x : !hl.lvalue<!hl.int>
    ll.store %4, %1
    %2 = hl.ref @x (%1) : !hl.lvalue<!hl.int>
    hl.return %2
  }
"
    );
    assert_eq!(verify(&module), Ok(()));
}
