//! End-to-end lowering of small translation units.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use cinder_ast::{
    AstBuilder, BuiltinKind, DeclKind, LangOptions, LinkageLanguage, StorageClass, TagKind,
    VarDecl,
};
use cinder_codegen::{lower_translation_unit, CodegenError, CodegenOptions, Driver};
use cinder_ir::{print_module, print_module_with_locations, OpKind};
use pretty_assertions::assert_eq;

const HEADER_C: &str =
    "attributes {source_language = \"c\", target_triple = \"x86_64-unknown-linux-gnu\"} {";

fn header(name: &str) -> String {
    format!("module @\"{name}\" {HEADER_C}\n")
}

// ── Records ─────────────────────────────────────────────────────

#[test]
fn self_referential_struct_lowers_to_one_record() {
    let mut b = AstBuilder::new().with_main_file("node.c");
    let node = b.record(TagKind::Struct, Some("Node"));
    let node_ty = b.record_type(node);
    let node_ptr = b.pointer_to(node_ty);
    let next = b.field("next", node_ptr);
    let int = b.builtin(BuiltinKind::Int);
    let value = b.field("value", int);
    b.define_record(node, vec![next, value]);
    b.translation_unit(vec![node]);
    let ast = b.finish();

    let mut driver = Driver::new(&ast, CodegenOptions::default());
    driver.emit_translation_unit().unwrap();
    driver.finalize().unwrap();
    let record = driver.context().cache().lookup_decl(node).unwrap();
    let module = driver.freeze();

    let top: Vec<_> = module.top_level().collect();
    assert_eq!(top, vec![record]);
    assert!(matches!(
        module.op(record).kind,
        OpKind::Record { complete: true, .. }
    ));

    let expected = header("node.c")
        + "  hl.struct @Node {
    hl.field @next : !hl.ptr<!hl.named<\"Node\">>
    hl.field @value : !hl.int
  }
}
data_layout {
  !hl.named<\"Node\"> = <size 128, align 64>
  !hl.ptr<!hl.named<\"Node\">> = <size 64, align 64>
  !hl.int = <size 32, align 32>
}
";
    assert_eq!(print_module(&module), expected);
}

#[test]
fn forward_declaration_is_completed_in_place() {
    let mut b = AstBuilder::new().with_main_file("list.c");
    let list = b.record(TagKind::Struct, Some("List"));
    let list_ty = b.record_type(list);
    let list_ptr = b.pointer_to(list_ty);
    let head = b.var("head", list_ptr, None);
    let def = b.redeclare_record(list);
    let int = b.builtin(BuiltinKind::Int);
    let len = b.field("len", int);
    b.define_record(def, vec![len]);
    b.translation_unit(vec![list, head, def]);
    let ast = b.finish();

    let module = lower_translation_unit(&ast, CodegenOptions::default()).unwrap();
    let records: Vec<_> = module
        .top_level()
        .filter(|&op| matches!(module.op(op).kind, OpKind::Record { .. }))
        .collect();
    assert_eq!(records.len(), 1);
    let text = print_module(&module);
    assert!(text.contains("  hl.struct @List {\n    hl.field @len : !hl.int\n  }\n"), "{text}");
    assert!(text.contains("%1 = hl.var @head : !hl.lvalue<!hl.ptr<!hl.named<\"List\">>>"), "{text}");
}

#[test]
fn records_without_definition_stay_incomplete() {
    let mut b = AstBuilder::new();
    let opaque = b.record(TagKind::Struct, Some("Opaque"));
    b.translation_unit(vec![opaque]);
    let ast = b.finish();

    let module = lower_translation_unit(&ast, CodegenOptions::default()).unwrap();
    assert!(print_module(&module).contains("  hl.struct @Opaque incomplete\n"));
}

#[test]
fn typedef_may_share_a_struct_name() {
    let mut b = AstBuilder::new();
    let node = b.record(TagKind::Struct, Some("Node"));
    let node_ty = b.record_type(node);
    let alias = b.typedef("Node", node_ty);
    let alias_ty = b.typedef_type(alias);
    let alias_ptr = b.pointer_to(alias_ty);
    let next = b.field("next", alias_ptr);
    b.define_record(node, vec![next]);
    b.translation_unit(vec![node, alias]);
    let ast = b.finish();

    let module = lower_translation_unit(&ast, CodegenOptions::default()).unwrap();
    let text = print_module(&module);
    assert!(text.contains("  hl.typedef @Node : !hl.named<\"Node\">\n"), "{text}");
}

// ── Functions ───────────────────────────────────────────────────

#[test]
fn function_with_parameters_and_return() {
    let mut b = AstBuilder::new().with_main_file("add.c");
    let int = b.builtin(BuiltinKind::Int);
    let lhs = b.param("a", int);
    let rhs = b.param("b", int);
    let sig = b.signature(int, &[lhs, rhs]);
    let read = b.decl_ref(lhs);
    let ret = b.ret(Some(read));
    let body = b.compound(vec![ret]);
    let add = b.function("add", sig, vec![lhs, rhs], Some(body));
    b.translation_unit(vec![add]);
    let ast = b.finish();

    let module = lower_translation_unit(&ast, CodegenOptions::default()).unwrap();
    let expected = header("add.c")
        + "  hl.func @add !hl.fn<(!hl.lvalue<!hl.int>, !hl.lvalue<!hl.int>) -> !hl.int> external {
    %1 = hl.param @a : !hl.lvalue<!hl.int>
    %2 = hl.param @b : !hl.lvalue<!hl.int>
    %3 = hl.ref @a (%1) : !hl.lvalue<!hl.int>
    hl.return %3
  }
}
data_layout {
  !hl.int = <size 32, align 32>
  !hl.lvalue<!hl.int> = <size 32, align 32>
}
";
    assert_eq!(print_module(&module), expected);
}

#[test]
fn linkage_spec_keeps_its_declarations() {
    // extern "C" { int cfn(); int cvar; }
    let mut b = AstBuilder::new().with_lang(LangOptions::cxx());
    let int = b.builtin(BuiltinKind::Int);
    let nullary = b.function_type(int, vec![], false);
    let cfn = b.function("cfn", nullary, vec![], None);
    let cvar = b.var("cvar", int, None);
    let spec = b.linkage_spec(LinkageLanguage::C, vec![cfn, cvar]);
    b.translation_unit(vec![spec]);
    let ast = b.finish();

    let module = lower_translation_unit(&ast, CodegenOptions::default()).unwrap();
    assert_eq!(module.top_level().count(), 1);
    let text = print_module(&module);
    assert!(
        text.contains(
            "  hl.linkage_spec \"C\" {
    hl.func @cfn !hl.fn<() -> !hl.int> external
    %2 = hl.var @cvar : !hl.lvalue<!hl.int>
  }
"
        ),
        "{text}"
    );
}

#[test]
fn functions_referenced_from_bodies_stay_at_module_scope() {
    let mut b = AstBuilder::new().with_lang(LangOptions::cxx());
    let int = b.builtin(BuiltinKind::Int);
    let nullary = b.function_type(int, vec![], false);
    let cfn = b.function("cfn", nullary, vec![], None);
    let call = b.call(cfn, vec![]);
    let ret = b.ret(Some(call));
    let body = b.compound(vec![ret]);
    let user = b.function("user", nullary, vec![], Some(body));
    let spec = b.linkage_spec(LinkageLanguage::C, vec![user]);
    b.translation_unit(vec![spec, cfn]);
    let ast = b.finish();

    let mut driver = Driver::new(&ast, CodegenOptions::default());
    driver.emit_translation_unit().unwrap();
    driver.finalize().unwrap();
    let cfn_op = driver.context().cache().lookup_decl(cfn).unwrap();
    let module = driver.freeze();
    assert!(module.top_level().any(|op| op == cfn_op));
}

fn falls_off_the_end(result: BuiltinKind, strict: bool) -> String {
    let mut b = AstBuilder::new();
    let ty = b.builtin(result);
    let sig = b.function_type(ty, vec![], false);
    let body = b.compound(vec![]);
    let f = b.function("f", sig, vec![], Some(body));
    b.translation_unit(vec![f]);
    let ast = b.finish();

    let options = CodegenOptions::default().with_strict_return(strict);
    print_module(&lower_translation_unit(&ast, options).unwrap())
}

#[test]
fn missing_return_terminators() {
    assert!(falls_off_the_end(BuiltinKind::Void, true).contains("    hl.return\n"));
    assert!(falls_off_the_end(BuiltinKind::Int, false).contains("    hl.return\n"));
    let strict = falls_off_the_end(BuiltinKind::Int, true);
    assert!(strict.contains("    hl.unreachable\n"), "{strict}");
    assert!(!strict.contains("hl.return"), "{strict}");
}

#[test]
fn calls_resolve_to_the_prototype() {
    let mut b = AstBuilder::new();
    let int = b.builtin(BuiltinKind::Int);
    let x = b.param("x", int);
    let sig = b.signature(int, &[x]);
    let square = b.function("square", sig, vec![x], None);
    let nullary = b.function_type(int, vec![], false);
    let seven = b.int_lit(7, int);
    let call = b.call(square, vec![seven]);
    let ret = b.ret(Some(call));
    let body = b.compound(vec![ret]);
    let main = b.function("main", nullary, vec![], Some(body));
    b.translation_unit(vec![square, main]);
    let ast = b.finish();

    let module = lower_translation_unit(&ast, CodegenOptions::default()).unwrap();
    let text = print_module(&module);
    assert!(text.contains("  hl.func @square !hl.fn<(!hl.lvalue<!hl.int>) -> !hl.int> external\n"), "{text}");
    assert!(text.contains("    %2 = hl.const 7 : !hl.int\n    %3 = hl.call @square(%2) : !hl.int\n    hl.return %3\n"), "{text}");
}

#[test]
fn recursive_function_references_itself() {
    let mut b = AstBuilder::new();
    let void = b.builtin(BuiltinKind::Void);
    let sig = b.function_type(void, vec![], false);
    let f = b.function("spin", sig, vec![], None);
    let call = b.call(f, vec![]);
    let stmt = b.expr_stmt(call);
    let body = b.compound(vec![stmt]);
    let def = b.redeclare_function(f, sig, vec![], Some(body));
    b.translation_unit(vec![def]);
    let ast = b.finish();

    let module = lower_translation_unit(&ast, CodegenOptions::default()).unwrap();
    let expected = header("unknown")
        + "  hl.func @spin !hl.fn<() -> !hl.void> external {
    hl.call @spin()
    hl.return
  }
}
";
    assert_eq!(print_module(&module), expected);
}

#[test]
fn constructor_functions_are_not_implemented() {
    let mut b = AstBuilder::new();
    let void = b.builtin(BuiltinKind::Void);
    let sig = b.function_type(void, vec![], false);
    let body = b.compound(vec![]);
    let init = b.function("init", sig, vec![], Some(body));
    b.set_attrs(
        init,
        cinder_ast::FunctionAttrs {
            constructor: true,
            ..Default::default()
        },
    );
    b.translation_unit(vec![init]);
    let ast = b.finish();

    let err = lower_translation_unit(&ast, CodegenOptions::default()).unwrap_err();
    assert!(matches!(err, CodegenError::NotImplemented { .. }), "{err:?}");
}

// ── Variables ───────────────────────────────────────────────────

#[test]
fn extern_declaration_gains_the_later_initializer() {
    let mut b = AstBuilder::new();
    let int = b.builtin(BuiltinKind::Int);
    let decl = b.var("counter", int, None);
    b.set_storage(decl, StorageClass::Extern);
    let five = b.int_lit(5, int);
    let def = b.decl(
        DeclKind::Var(VarDecl {
            ty: int,
            init: Some(five),
            storage: StorageClass::None,
            thread_local: false,
            is_local: false,
            previous: Some(decl),
        }),
        Some("counter"),
    );
    let sig = b.function_type(int, vec![], false);
    let read = b.decl_ref(def);
    let ret = b.ret(Some(read));
    let body = b.compound(vec![ret]);
    let get = b.function("get", sig, vec![], Some(body));
    b.translation_unit(vec![decl, def, get]);
    let ast = b.finish();

    let module = lower_translation_unit(&ast, CodegenOptions::default()).unwrap();
    let expected = header("unknown")
        + "  %0 = hl.var @counter : !hl.lvalue<!hl.int> {
    %1 = hl.const 5 : !hl.int
    hl.value.yield %1
  }
  hl.func @get !hl.fn<() -> !hl.int> external {
    %4 = hl.ref @counter (%0) : !hl.lvalue<!hl.int>
    hl.return %4
  }
}
data_layout {
  !hl.int = <size 32, align 32>
  !hl.lvalue<!hl.int> = <size 32, align 32>
}
";
    assert_eq!(print_module(&module), expected);
}

#[test]
fn locals_are_emitted_in_the_body() {
    let mut b = AstBuilder::new();
    let double = b.builtin(BuiltinKind::Double);
    let half = b.float_lit(0.5, double);
    let local = b.local_var("x", double, Some(half));
    let decl = b.decl_stmt(vec![local]);
    let void = b.builtin(BuiltinKind::Void);
    let sig = b.function_type(void, vec![], false);
    let body = b.compound(vec![decl]);
    let f = b.function("f", sig, vec![], Some(body));
    b.translation_unit(vec![f]);
    let ast = b.finish();

    let module = lower_translation_unit(&ast, CodegenOptions::default()).unwrap();
    let text = print_module(&module);
    assert!(
        text.contains(
            "    %1 = hl.var @x local : !hl.lvalue<!hl.double> {
      %2 = hl.const 5e-1 : !hl.double
      hl.value.yield %2
    }
    hl.return
"
        ),
        "{text}"
    );
}

#[test]
fn thread_local_variables_are_not_implemented() {
    let mut b = AstBuilder::new();
    let int = b.builtin(BuiltinKind::Int);
    let tls = b.var("tls", int, None);
    b.set_thread_local(tls);
    b.translation_unit(vec![tls]);
    let ast = b.finish();

    let err = lower_translation_unit(&ast, CodegenOptions::default()).unwrap_err();
    assert_eq!(
        err,
        CodegenError::NotImplemented {
            feature: "thread-local variable 'tls'".to_owned()
        }
    );
}

// ── Enumerations ────────────────────────────────────────────────

#[test]
fn enum_constants_follow_the_underlying_type() {
    let mut b = AstBuilder::new();
    let uint = b.builtin(BuiltinKind::UInt);
    let color = b.enumeration(Some("Color"), Some(uint), &[("Red", 0), ("Green", 5)]);
    b.translation_unit(vec![color]);
    let ast = b.finish();

    let module = lower_translation_unit(&ast, CodegenOptions::default()).unwrap();
    let expected = header("unknown")
        + "  hl.enum @Color : !hl.int<unsigned> {
    hl.enum.const @Red = 0
    hl.enum.const @Green = 5
  }
}
data_layout {
  !hl.int<unsigned> = <size 32, align 32>
}
";
    assert_eq!(print_module(&module), expected);
}

#[test]
fn enum_constants_without_underlying_type_are_fatal() {
    let mut b = AstBuilder::new();
    let e = b.enumeration(Some("E"), None, &[("A", 1)]);
    b.translation_unit(vec![e]);
    let ast = b.finish();

    let err = lower_translation_unit(&ast, CodegenOptions::default()).unwrap_err();
    assert!(matches!(err, CodegenError::Unclassifiable { .. }), "{err:?}");
}

// ── Locations ───────────────────────────────────────────────────

#[test]
fn locations_follow_the_meta_generator() {
    let build = || {
        let mut b = AstBuilder::new().with_main_file("loc.c");
        b.at(3, 5);
        let int = b.builtin(BuiltinKind::Int);
        let g = b.var("g", int, None);
        b.translation_unit(vec![g]);
        b.finish()
    };
    let ast = build();

    let files = lower_translation_unit(&ast, CodegenOptions::default()).unwrap();
    assert!(print_module_with_locations(&files).contains("hl.var @g : !hl.lvalue<!hl.int> loc(\"loc.c\":3:5)"));

    let ids = lower_translation_unit(&ast, CodegenOptions::default().with_locs_as_meta_ids(true))
        .unwrap();
    assert!(print_module_with_locations(&ids).contains("hl.var @g : !hl.lvalue<!hl.int> loc(#0)"));
}
