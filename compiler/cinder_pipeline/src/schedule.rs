//! Dependency resolution and ordered execution.

use cinder_ir::Module;
use rustc_hash::FxHashMap;

use crate::{PassAction, PassRegistry, PipelineError, PipelineStep, StepContext, StepKind};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Mark {
    Visiting,
    Done,
}

/// One pass in its final position.
#[derive(Clone, Debug)]
pub struct ScheduledPass {
    name: String,
    action: PassAction,
}

impl ScheduledPass {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A fully resolved, cycle-free pass order.
#[derive(Clone, Debug, Default)]
pub struct Schedule {
    passes: Vec<ScheduledPass>,
}

impl Schedule {
    pub fn passes(&self) -> &[ScheduledPass] {
        &self.passes
    }

    pub fn names(&self) -> Vec<&str> {
        self.passes.iter().map(ScheduledPass::name).collect()
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Run every pass over `module` in order, stopping at the first failure.
    pub fn run(&self, module: &mut Module, cx: &StepContext) -> Result<(), PipelineError> {
        for pass in &self.passes {
            tracing::debug!(pass = %pass.name, opt = cx.optimization_level, "running pass");
            (pass.action)(module, cx).map_err(|source| {
                tracing::warn!(pass = %pass.name, %source, "pass failed");
                PipelineError::PassFailed {
                    pass: pass.name.clone(),
                    source,
                }
            })?;
        }
        Ok(())
    }
}

/// Depth-first scheduler over registry names.
///
/// Dependencies are visited in declaration order before the step that names
/// them, so independent branches keep the order they were written in.
pub struct Pipeline<'r> {
    registry: &'r PassRegistry,
    marks: FxHashMap<String, Mark>,
    path: Vec<String>,
    passes: Vec<ScheduledPass>,
}

impl<'r> Pipeline<'r> {
    /// Resolve `requested` and everything it transitively depends on.
    pub fn schedule(
        registry: &'r PassRegistry,
        requested: &[&str],
    ) -> Result<Schedule, PipelineError> {
        let mut pipeline = Self {
            registry,
            marks: FxHashMap::default(),
            path: Vec::new(),
            passes: Vec::new(),
        };
        for &name in requested {
            pipeline.require(name)?;
        }
        tracing::debug!(
            requested = requested.len(),
            passes = pipeline.passes.len(),
            "scheduled pipeline"
        );
        Ok(Schedule {
            passes: pipeline.passes,
        })
    }

    fn require(&mut self, name: &str) -> Result<(), PipelineError> {
        match self.marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => return Err(self.cycle_through(name)),
            None => {}
        }
        let registry = self.registry;
        let step = registry
            .get(name)
            .ok_or_else(|| PipelineError::UnknownStep {
                name: name.to_owned(),
            })?;
        self.visit(step)
    }

    fn visit(&mut self, step: &PipelineStep) -> Result<(), PipelineError> {
        self.marks.insert(step.name().to_owned(), Mark::Visiting);
        self.path.push(step.name().to_owned());
        for dependency in step.effective_dependencies() {
            self.require(dependency)?;
        }
        self.emit(step, true)?;
        self.path.pop();
        Ok(())
    }

    fn emit(&mut self, step: &PipelineStep, root: bool) -> Result<(), PipelineError> {
        match self.marks.get(step.name()) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) if !root => return Err(self.cycle_through(step.name())),
            _ => {}
        }
        self.marks.insert(step.name().to_owned(), Mark::Done);
        match step.kind() {
            StepKind::Pass(action) => {
                self.passes.push(ScheduledPass {
                    name: step.name().to_owned(),
                    action: *action,
                });
            }
            StepKind::Group(members) => {
                check_group_order(step)?;
                for member in members {
                    self.emit(member, false)?;
                }
            }
        }
        Ok(())
    }

    fn cycle_through(&self, name: &str) -> PipelineError {
        let start = self.path.iter().position(|p| p == name).unwrap_or(0);
        let mut path = self.path[start..].to_vec();
        path.push(name.to_owned());
        tracing::warn!(path = ?path, "dependency cycle");
        PipelineError::Cycle { path }
    }
}

/// Members of `group` may only depend on siblings that precede them.
fn check_group_order(group: &PipelineStep) -> Result<(), PipelineError> {
    let members = group.members();
    for (i, member) in members.iter().enumerate() {
        for dependency in member.effective_dependencies() {
            let later = members[i + 1..].iter().any(|sibling| {
                sibling.name() == dependency || sibling.member_names().contains(&dependency)
            });
            if later {
                return Err(PipelineError::GroupOrder {
                    group: group.name().to_owned(),
                    step: member.name().to_owned(),
                    dependency: dependency.to_owned(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
