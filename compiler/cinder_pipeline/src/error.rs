//! Pipeline configuration and execution errors.

/// Failure reported by a pass action.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct PassError {
    message: String,
}

impl PassError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum PipelineError {
    /// `path` starts and ends with the same step.
    #[error("dependency cycle: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("unknown pipeline step '{name}'")]
    UnknownStep { name: String },

    /// A group member depends on a sibling defined after it.
    #[error("step '{step}' in group '{group}' depends on '{dependency}', which the group runs later")]
    GroupOrder {
        group: String,
        step: String,
        dependency: String,
    },

    #[error("pass '{pass}' failed: {source}")]
    PassFailed {
        pass: String,
        #[source]
        source: PassError,
    },
}
