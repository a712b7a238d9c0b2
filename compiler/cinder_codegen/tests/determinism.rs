//! Lowering the same unit twice yields byte-identical modules.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use cinder_ast::{AstBuilder, AstContext, BuiltinKind, StorageClass};
use cinder_codegen::{lower_translation_unit, CodegenOptions};
use cinder_ir::print_module;
use proptest::prelude::*;

const SCALARS: [BuiltinKind; 8] = [
    BuiltinKind::Bool,
    BuiltinKind::CharS,
    BuiltinKind::Short,
    BuiltinKind::Int,
    BuiltinKind::ULong,
    BuiltinKind::LongLong,
    BuiltinKind::Float,
    BuiltinKind::Double,
];

#[derive(Clone, Debug)]
struct Global {
    scalar: usize,
    pointer: bool,
    init: Option<i64>,
    is_static: bool,
}

fn global_strategy() -> impl Strategy<Value = Global> {
    (
        0..SCALARS.len(),
        any::<bool>(),
        proptest::option::of(-1000i64..1000),
        any::<bool>(),
    )
        .prop_map(|(scalar, pointer, init, is_static)| Global {
            scalar,
            pointer,
            init,
            is_static,
        })
}

/// Globals plus one getter per global; odd getters are static so that only
/// the ones `main` reaches get emitted.
fn build(globals: &[Global]) -> AstContext {
    let mut b = AstBuilder::new().with_main_file("gen.c");
    let int = b.builtin(BuiltinKind::Int);
    let mut decls = Vec::new();
    let mut getters = Vec::new();
    for (i, global) in globals.iter().enumerate() {
        b.at(u32::try_from(i).unwrap() + 1, 1);
        let mut ty = b.builtin(SCALARS[global.scalar]);
        if global.pointer {
            ty = b.pointer_to(ty);
        }
        let init = match global.init {
            Some(value) if !global.pointer => Some(b.int_lit(i128::from(value), int)),
            _ => None,
        };
        let var = b.var(&format!("g{i}"), ty, init);
        if global.is_static {
            b.set_storage(var, StorageClass::Static);
        }
        decls.push(var);

        let sig = b.function_type(ty, vec![], false);
        let read = b.decl_ref(var);
        let ret = b.ret(Some(read));
        let body = b.compound(vec![ret]);
        let getter = b.function(&format!("get{i}"), sig, vec![], Some(body));
        if i % 2 == 1 {
            b.set_storage(getter, StorageClass::Static);
        }
        decls.push(getter);
        getters.push(getter);
    }

    let calls: Vec<_> = getters
        .iter()
        .step_by(3)
        .map(|&getter| {
            let call = b.call(getter, vec![]);
            b.expr_stmt(call)
        })
        .collect();
    let zero = b.int_lit(0, int);
    let ret = b.ret(Some(zero));
    let mut stmts = calls;
    stmts.push(ret);
    let body = b.compound(stmts);
    let sig = b.function_type(int, vec![], false);
    let main = b.function("main", sig, vec![], Some(body));
    decls.push(main);

    b.translation_unit(decls);
    b.finish()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn lowering_is_deterministic(globals in prop::collection::vec(global_strategy(), 0..12)) {
        let ast = build(&globals);
        let first = lower_translation_unit(&ast, CodegenOptions::default()).unwrap();
        let second = lower_translation_unit(&ast, CodegenOptions::default()).unwrap();
        prop_assert_eq!(print_module(&first), print_module(&second));
    }

    #[test]
    fn every_global_is_bound_once(globals in prop::collection::vec(global_strategy(), 1..12)) {
        let ast = build(&globals);
        let module = lower_translation_unit(&ast, CodegenOptions::default()).unwrap();
        for i in 0..globals.len() {
            let sym = format!("g{i}");
            let bound = module.lookup_symbol(&sym).is_some();
            prop_assert!(bound, "{} is not bound", sym);
        }
        let main_bound = module.lookup_symbol("main").is_some();
        prop_assert!(main_bound, "main is not bound");
    }
}
