//! Cinder pipelines - named IR-to-IR passes run in dependency order.
//!
//! A [`PipelineStep`] is either a single pass or a group composed from other
//! steps. Steps name their prerequisites; [`Pipeline::schedule`] resolves the
//! names through a [`PassRegistry`] and produces a [`Schedule`] that runs the
//! passes over a frozen [`cinder_ir::Module`].
//!
//! ```text
//! to-mem = compose(vars-to-allocas, fn-args-to-alloca) depends on to-ll
//! to-ll  = compose(hl-to-ll-func, hl-to-ll-vars)
//! ```
//!
//! Every configuration problem (unknown names, cycles, group order conflicts)
//! is reported by `schedule`, before any pass touches the module.

mod error;
pub mod passes;
mod registry;
mod schedule;
mod step;

pub use error::{PassError, PipelineError};
pub use registry::PassRegistry;
pub use schedule::{Pipeline, Schedule, ScheduledPass};
pub use step::{PassAction, PipelineStep, StepContext, StepKind};
