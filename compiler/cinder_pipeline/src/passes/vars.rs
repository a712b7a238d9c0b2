use cinder_ir::{Module, OpId, OpKind};

use super::rewrite_regions;
use crate::{PassError, StepContext};

/// Local `hl.var` → `ll.cell`.
///
/// An initialized local becomes `ll.cell_init`: the initializer's operations
/// are spliced in front of it and the yielded value becomes its operand.
/// Globals are left alone.
pub fn lower_local_vars(module: &mut Module, _cx: &StepContext) -> Result<(), PassError> {
    let mut lowered = 0usize;
    rewrite_regions(module, |module, ops| {
        let mut out = Vec::with_capacity(ops.len());
        for id in ops {
            let OpKind::Var {
                sym, local: true, ..
            } = &module.op(id).kind
            else {
                out.push(id);
                continue;
            };
            let name = sym.clone();
            let init = inline_initializer(module, id, &name, &mut out)?;
            module.op_mut(id).kind = match init {
                Some(value) => OpKind::InitCell { name, value },
                None => OpKind::Cell { name },
            };
            out.push(id);
            lowered += 1;
        }
        Ok(out)
    })?;
    tracing::debug!(vars = lowered, "lowered local variables");
    Ok(())
}

/// Move the initializer of `var` into `out` and return the yielded value.
fn inline_initializer(
    module: &mut Module,
    var: OpId,
    name: &str,
    out: &mut Vec<OpId>,
) -> Result<Option<OpId>, PassError> {
    let op = module.op_mut(var);
    let Some(mut region) = op.regions.pop() else {
        return Ok(None);
    };
    op.regions.clear();
    let mut ops = region.take();
    let Some(last) = ops.pop() else {
        return Ok(None);
    };
    let OpKind::Yield { value } = module.op(last).kind else {
        return Err(PassError::new(format!(
            "initializer of @{name} does not end in a yield"
        )));
    };
    let value = value
        .ok_or_else(|| PassError::new(format!("initializer of @{name} yields no value")))?;
    out.extend(ops);
    Ok(Some(value))
}
