#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;

use super::*;

fn noop(_: &mut Module, _: &StepContext) -> Result<(), PassError> {
    Ok(())
}

#[test]
fn depends_on_keeps_first_declaration() {
    let step = PipelineStep::pass("b", noop)
        .depends_on("a")
        .depends_on("c")
        .depends_on("a");
    assert_eq!(step.dependencies(), ["a", "c"]);
    assert!(!step.is_group());
    assert!(step.members().is_empty());
}

#[test]
fn member_names_walk_nested_groups_in_order() {
    let inner = PipelineStep::compose(
        "inner",
        vec![PipelineStep::pass("x", noop), PipelineStep::pass("y", noop)],
    );
    let outer = PipelineStep::compose("outer", vec![inner, PipelineStep::pass("z", noop)]);
    assert_eq!(outer.member_names(), vec!["inner", "x", "y", "z"]);
}

#[test]
fn group_dependencies_lift_members_and_drop_internal_edges() {
    let group = PipelineStep::compose(
        "g",
        vec![
            PipelineStep::pass("first", noop).depends_on("ext-1"),
            PipelineStep::pass("second", noop)
                .depends_on("first")
                .depends_on("ext-2")
                .depends_on("ext-1"),
        ],
    )
    .depends_on("own");
    assert_eq!(group.effective_dependencies(), vec!["own", "ext-1", "ext-2"]);
}

#[test]
fn pass_dependencies_are_its_own() {
    let step = PipelineStep::pass("p", noop).depends_on("q");
    assert_eq!(step.effective_dependencies(), vec!["q"]);
}
