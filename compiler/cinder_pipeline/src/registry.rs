//! Name → step lookup used to resolve dependencies.

use rustc_hash::FxHashMap;

use crate::passes;
use crate::PipelineStep;

#[derive(Clone, Debug, Default)]
pub struct PassRegistry {
    steps: FxHashMap<String, PipelineStep>,
}

impl PassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in conversion steps.
    pub fn with_builtin_passes() -> Self {
        let mut registry = Self::new();
        registry
            .register(passes::hl_to_ll_func())
            .register(passes::hl_to_ll_vars())
            .register(passes::to_ll())
            .register(passes::vars_to_allocas())
            .register(passes::fn_args_to_alloca())
            .register(passes::to_mem());
        registry
    }

    /// Register `step` under its name, replacing any earlier step of that
    /// name.
    pub fn register(&mut self, step: PipelineStep) -> &mut Self {
        tracing::trace!(step = step.name(), "registered pipeline step");
        self.steps.insert(step.name().to_owned(), step);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.steps.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&PipelineStep> {
        self.steps.get(name)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
