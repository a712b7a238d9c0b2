use cinder_ir::{Module, OpKind};

use super::rewrite_regions;
use crate::{PassError, StepContext};

/// `hl.func` → `ll.func`, keeping symbol, type, linkage and body.
pub fn lower_functions(module: &mut Module, _cx: &StepContext) -> Result<(), PassError> {
    let mut lowered = 0usize;
    rewrite_regions(module, |module, ops| {
        for &id in &ops {
            let op = module.op_mut(id);
            let OpKind::Func {
                sym,
                ty,
                linkage,
                flags,
            } = &op.kind
            else {
                continue;
            };
            let kind = OpKind::LlFunc {
                sym: sym.clone(),
                ty: *ty,
                linkage: *linkage,
                flags: *flags,
            };
            op.kind = kind;
            lowered += 1;
        }
        Ok(ops)
    })?;
    tracing::debug!(functions = lowered, "lowered functions");
    Ok(())
}
