use cinder_ir::{Module, OpKind, Operation};

use super::rewrite_regions;
use crate::{PassError, StepContext};

/// `ll.cell` → `ll.alloca`; `ll.cell_init` → `ll.alloca` followed by an
/// `ll.store` of the initial value.
pub fn cells_to_allocas(module: &mut Module, _cx: &StepContext) -> Result<(), PassError> {
    let mut lowered = 0usize;
    rewrite_regions(module, |module, ops| {
        let mut out = Vec::with_capacity(ops.len());
        for id in ops {
            out.push(id);
            let (name, init) = match &module.op(id).kind {
                OpKind::Cell { name } => (name.clone(), None),
                OpKind::InitCell { name, value } => (name.clone(), Some(*value)),
                _ => continue,
            };
            module.op_mut(id).kind = OpKind::Alloca { name };
            lowered += 1;
            if let Some(value) = init {
                let loc = module.op(id).loc.clone();
                let store = module.insert(Operation::new(
                    OpKind::Store { value, target: id },
                    loc,
                ));
                out.push(store);
            }
        }
        Ok(out)
    })?;
    tracing::debug!(cells = lowered, "converted cells to allocas");
    Ok(())
}
