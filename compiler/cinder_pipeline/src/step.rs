//! Pipeline steps: single passes and composed groups.

use cinder_ir::Module;

use crate::PassError;

/// Per-run configuration shared by reference with every pass.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct StepContext {
    pub optimization_level: u8,
}

impl StepContext {
    pub const fn new(optimization_level: u8) -> Self {
        Self { optimization_level }
    }
}

pub type PassAction = fn(&mut Module, &StepContext) -> Result<(), PassError>;

#[derive(Clone, Debug)]
pub enum StepKind {
    Pass(PassAction),
    /// Members run in definition order.
    Group(Vec<PipelineStep>),
}

/// A named unit of IR transformation and the steps that must precede it.
#[derive(Clone, Debug)]
pub struct PipelineStep {
    name: String,
    dependencies: Vec<String>,
    kind: StepKind,
}

impl PipelineStep {
    pub fn pass(name: impl Into<String>, action: PassAction) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            kind: StepKind::Pass(action),
        }
    }

    pub fn compose(name: impl Into<String>, steps: Vec<PipelineStep>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            kind: StepKind::Group(steps),
        }
    }

    /// Require the step named `name` to run first. Repeated names are kept
    /// once, in first-declared position.
    #[must_use]
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.dependencies.contains(&name) {
            self.dependencies.push(name);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dependencies declared directly on this step.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn kind(&self) -> &StepKind {
        &self.kind
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, StepKind::Group(_))
    }

    pub fn members(&self) -> &[PipelineStep] {
        match &self.kind {
            StepKind::Pass(_) => &[],
            StepKind::Group(members) => members,
        }
    }

    /// Names of every step nested inside this one, at any depth.
    pub fn member_names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut stack: Vec<&PipelineStep> = self.members().iter().rev().collect();
        while let Some(step) = stack.pop() {
            out.push(step.name());
            stack.extend(step.members().iter().rev());
        }
        out
    }

    /// Dependencies as seen from outside: a group's own plus those of its
    /// members, minus anything the group itself contains.
    pub fn effective_dependencies(&self) -> Vec<&str> {
        let members = self.member_names();
        let mut out: Vec<&str> = Vec::new();
        let own = self.dependencies.iter().map(String::as_str);
        let nested = self.members().iter().flat_map(PipelineStep::effective_dependencies);
        for name in own.chain(nested) {
            if !members.contains(&name) && !out.contains(&name) {
                out.push(name);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests;
