//! Lowering errors.
//!
//! Every error halts construction of the current module. The library only
//! returns them; [`CodegenError::abort`] and [`ResultExt::or_abort`] apply
//! the default fail-fast policy for callers that have nothing better to do.

use cinder_ir::VerifyError;

#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum CodegenError {
    /// A type or node kind outside the set the engine knows how to classify.
    #[error("unclassifiable {construct}")]
    Unclassifiable { construct: String },

    /// A recognized construct whose lowering does not exist yet.
    #[error("not implemented: {feature}")]
    NotImplemented { feature: String },

    /// Every strategy in the visitor chain declined a node.
    #[error("no visitor handled {node}")]
    Unreachable { node: String },

    /// A cache key was rebound to a different entity.
    #[error("{key} is already bound to a different entity")]
    DuplicateEntity { key: String },

    #[error("module failed verification with {} error(s)", errors.len())]
    Verification { errors: Vec<VerifyError> },
}

impl CodegenError {
    pub fn unclassifiable(construct: impl Into<String>) -> Self {
        Self::Unclassifiable {
            construct: construct.into(),
        }
    }

    pub fn not_implemented(feature: impl Into<String>) -> Self {
        Self::NotImplemented {
            feature: feature.into(),
        }
    }

    /// Report the error and terminate the process with status 1.
    pub fn abort(self) -> ! {
        tracing::error!(error = %self, "fatal lowering error");
        eprintln!("error: {self}");
        if let Self::Verification { errors } = &self {
            for error in errors {
                eprintln!("  {error}");
            }
        }
        std::process::exit(1)
    }
}

pub type Result<T> = std::result::Result<T, CodegenError>;

/// Fail-fast unwrapping of lowering results.
pub trait ResultExt<T> {
    /// Return the value, or [`abort`](CodegenError::abort) on error.
    fn or_abort(self) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn or_abort(self) -> T {
        match self {
            Ok(value) => value,
            Err(error) => error.abort(),
        }
    }
}
