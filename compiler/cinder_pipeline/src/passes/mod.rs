//! Built-in conversions from high-level to low-level operations.
//!
//! Rewrites keep operation ids stable: a converted operation is mutated in
//! place, so references to it from elsewhere in the module stay valid.

mod func;
mod mem;
mod params;
mod vars;

use cinder_ir::{InsertPoint, Module, OpId};

use crate::{PassError, PipelineStep};

pub use func::lower_functions;
pub use mem::cells_to_allocas;
pub use params::params_to_allocas;
pub use vars::lower_local_vars;

pub fn hl_to_ll_func() -> PipelineStep {
    PipelineStep::pass("hl-to-ll-func", lower_functions)
}

pub fn hl_to_ll_vars() -> PipelineStep {
    PipelineStep::pass("hl-to-ll-vars", lower_local_vars)
}

pub fn to_ll() -> PipelineStep {
    PipelineStep::compose("to-ll", vec![hl_to_ll_func(), hl_to_ll_vars()])
}

pub fn vars_to_allocas() -> PipelineStep {
    PipelineStep::pass("vars-to-allocas", cells_to_allocas)
}

pub fn fn_args_to_alloca() -> PipelineStep {
    PipelineStep::pass("fn-args-to-alloca", params_to_allocas)
}

pub fn to_mem() -> PipelineStep {
    PipelineStep::compose("to-mem", vec![vars_to_allocas(), fn_args_to_alloca()])
        .depends_on("to-ll")
}

/// Rebuild every region of `module`, parents before children.
///
/// `rewrite` receives the current operation list of one region and returns
/// its replacement. Regions are discovered after their parent is rewritten,
/// so operations moved between regions are visited where they end up.
fn rewrite_regions(
    module: &mut Module,
    mut rewrite: impl FnMut(&mut Module, Vec<OpId>) -> Result<Vec<OpId>, PassError>,
) -> Result<(), PassError> {
    let mut queue = vec![InsertPoint::ModuleBody];
    while let Some(point) = queue.pop() {
        let ops = module.region_mut(point).take();
        let ops = rewrite(module, ops)?;
        for &op in ops.iter().rev() {
            for index in (0..module.op(op).regions.len()).rev() {
                queue.push(InsertPoint::Region { op, index });
            }
        }
        module.region_mut(point).set_ops(ops);
    }
    Ok(())
}

#[cfg(test)]
mod tests;
