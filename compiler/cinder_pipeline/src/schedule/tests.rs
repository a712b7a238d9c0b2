#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use cinder_ir::{Location, Module, OpKind, Operation};
use pretty_assertions::assert_eq;

use super::*;
use crate::PassError;

fn noop(_: &mut Module, _: &StepContext) -> Result<(), PassError> {
    Ok(())
}

/// Appends an `hl.label` naming its optimization level, so tests can observe
/// how many times and with what context a pass ran.
fn mark(module: &mut Module, cx: &StepContext) -> Result<(), PassError> {
    module.append(
        cinder_ir::InsertPoint::ModuleBody,
        Operation::new(
            OpKind::Label {
                name: format!("O{}", cx.optimization_level),
            },
            Location::Unknown,
        ),
    );
    Ok(())
}

fn fail(_: &mut Module, _: &StepContext) -> Result<(), PassError> {
    Err(PassError::new("boom"))
}

fn registry(steps: Vec<PipelineStep>) -> PassRegistry {
    let mut registry = PassRegistry::new();
    for step in steps {
        registry.register(step);
    }
    registry
}

fn order(registry: &PassRegistry, requested: &[&str]) -> Vec<String> {
    Pipeline::schedule(registry, requested)
        .unwrap()
        .names()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

// ── Ordering ────────────────────────────────────────────────────

#[test]
fn dependencies_run_first() {
    let registry = registry(vec![
        PipelineStep::pass("a", noop),
        PipelineStep::pass("b", noop).depends_on("a"),
        PipelineStep::compose(
            "c",
            vec![
                PipelineStep::pass("b", noop).depends_on("a"),
                PipelineStep::pass("c-tail", noop),
            ],
        )
        .depends_on("a"),
    ]);
    assert_eq!(order(&registry, &["c"]), vec!["a", "b", "c-tail"]);
    assert_eq!(order(&registry, &["b", "c"]), vec!["a", "b", "c-tail"]);
}

#[test]
fn independent_branches_keep_declaration_order() {
    let registry = registry(vec![
        PipelineStep::pass("x", noop),
        PipelineStep::pass("y", noop),
        PipelineStep::pass("z", noop),
        PipelineStep::pass("top", noop)
            .depends_on("z")
            .depends_on("x")
            .depends_on("y"),
    ]);
    assert_eq!(order(&registry, &["top"]), vec!["z", "x", "y", "top"]);
    assert_eq!(order(&registry, &["y", "top"]), vec!["y", "z", "x", "top"]);
}

#[test]
fn shared_dependencies_are_scheduled_once() {
    let registry = registry(vec![
        PipelineStep::pass("base", noop),
        PipelineStep::pass("left", noop).depends_on("base"),
        PipelineStep::pass("right", noop).depends_on("base"),
        PipelineStep::pass("join", noop)
            .depends_on("left")
            .depends_on("right"),
    ]);
    assert_eq!(
        order(&registry, &["join", "base"]),
        vec!["base", "left", "right", "join"]
    );
}

#[test]
fn group_members_keep_definition_order() {
    let registry = registry(vec![
        PipelineStep::pass("setup", noop),
        PipelineStep::compose(
            "g",
            vec![
                PipelineStep::pass("m3", noop),
                PipelineStep::pass("m1", noop).depends_on("setup"),
                PipelineStep::pass("m2", noop).depends_on("m3"),
            ],
        ),
    ]);
    assert_eq!(order(&registry, &["g"]), vec!["setup", "m3", "m1", "m2"]);
}

#[test]
fn builtin_to_mem_pulls_in_to_ll() {
    let registry = PassRegistry::with_builtin_passes();
    assert_eq!(registry.len(), 6);
    assert_eq!(
        order(&registry, &["to-mem"]),
        vec![
            "hl-to-ll-func",
            "hl-to-ll-vars",
            "vars-to-allocas",
            "fn-args-to-alloca"
        ]
    );
    assert_eq!(
        order(&registry, &["hl-to-ll-vars", "to-mem"]),
        vec![
            "hl-to-ll-vars",
            "hl-to-ll-func",
            "vars-to-allocas",
            "fn-args-to-alloca"
        ]
    );
}

// ── Configuration errors ────────────────────────────────────────

#[test]
fn cycles_are_rejected() {
    let registry = registry(vec![
        PipelineStep::pass("a", noop).depends_on("b"),
        PipelineStep::pass("b", noop).depends_on("a"),
    ]);
    assert_eq!(
        Pipeline::schedule(&registry, &["a"]).unwrap_err(),
        PipelineError::Cycle {
            path: vec!["a".into(), "b".into(), "a".into()]
        }
    );
}

#[test]
fn self_dependency_is_a_cycle() {
    let registry = registry(vec![PipelineStep::pass("loop", noop).depends_on("loop")]);
    assert_eq!(
        Pipeline::schedule(&registry, &["loop"]).unwrap_err(),
        PipelineError::Cycle {
            path: vec!["loop".into(), "loop".into()]
        }
    );
}

#[test]
fn group_member_depending_on_its_group_is_a_cycle() {
    let registry = registry(vec![
        PipelineStep::compose("g", vec![PipelineStep::pass("m", noop)]),
        PipelineStep::pass("m", noop).depends_on("g"),
    ]);
    assert_eq!(
        Pipeline::schedule(&registry, &["m"]).unwrap_err(),
        PipelineError::Cycle {
            path: vec!["m".into(), "g".into(), "m".into()]
        }
    );
}

#[test]
fn unknown_steps_are_reported() {
    let registry = registry(vec![PipelineStep::pass("a", noop).depends_on("missing")]);
    assert_eq!(
        Pipeline::schedule(&registry, &["a"]).unwrap_err(),
        PipelineError::UnknownStep {
            name: "missing".into()
        }
    );
    assert_eq!(
        Pipeline::schedule(&registry, &["nope"]).unwrap_err(),
        PipelineError::UnknownStep {
            name: "nope".into()
        }
    );
}

#[test]
fn member_depending_on_later_sibling_is_rejected() {
    let registry = registry(vec![PipelineStep::compose(
        "g",
        vec![
            PipelineStep::pass("early", noop).depends_on("late"),
            PipelineStep::pass("late", noop),
        ],
    )]);
    assert_eq!(
        Pipeline::schedule(&registry, &["g"]).unwrap_err(),
        PipelineError::GroupOrder {
            group: "g".into(),
            step: "early".into(),
            dependency: "late".into(),
        }
    );
}

#[test]
fn configuration_errors_are_raised_before_any_pass_runs() {
    let registry = registry(vec![
        PipelineStep::pass("ok", mark),
        PipelineStep::pass("bad", mark).depends_on("ok").depends_on("bad"),
    ]);
    let mut module = Module::new("m", Location::Unknown);
    let result = Pipeline::schedule(&registry, &["ok", "bad"])
        .and_then(|schedule| schedule.run(&mut module, &StepContext::default()));
    assert!(matches!(result, Err(PipelineError::Cycle { .. })));
    assert_eq!(module.op_count(), 0);
}

// ── Execution ───────────────────────────────────────────────────

#[test]
fn run_shares_the_step_context() {
    let registry = registry(vec![
        PipelineStep::pass("one", mark),
        PipelineStep::pass("two", mark).depends_on("one"),
    ]);
    let schedule = Pipeline::schedule(&registry, &["two"]).unwrap();
    let mut module = Module::new("m", Location::Unknown);
    schedule.run(&mut module, &StepContext::new(2)).unwrap();

    let labels: Vec<_> = module
        .top_level()
        .map(|id| match &module.op(id).kind {
            OpKind::Label { name } => name.clone(),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(labels, vec!["O2", "O2"]);
}

#[test]
fn failing_pass_stops_the_run() {
    let registry = registry(vec![
        PipelineStep::pass("broken", fail),
        PipelineStep::pass("after", mark).depends_on("broken"),
    ]);
    let schedule = Pipeline::schedule(&registry, &["after"]).unwrap();
    let mut module = Module::new("m", Location::Unknown);
    let err = schedule
        .run(&mut module, &StepContext::default())
        .unwrap_err();
    assert_eq!(
        err,
        PipelineError::PassFailed {
            pass: "broken".into(),
            source: PassError::new("boom"),
        }
    );
    assert_eq!(err.to_string(), "pass 'broken' failed: boom");
    assert_eq!(module.op_count(), 0);
}

#[test]
fn empty_request_is_an_empty_schedule() {
    let schedule = Pipeline::schedule(&PassRegistry::new(), &[]).unwrap();
    assert!(schedule.is_empty());
}
