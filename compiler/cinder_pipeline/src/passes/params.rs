use cinder_ir::{InsertPoint, Module, OpId, OpKind, Operation};

use crate::{PassError, StepContext};

/// Spill the parameters of every `ll.func` into stack slots.
///
/// Each leading `hl.param` is turned into an `ll.alloca` in place, so
/// references to the parameter now address the slot. A fresh `hl.param`
/// of the value type carries the incoming argument and is stored into the
/// slot before the rest of the body runs.
pub fn params_to_allocas(module: &mut Module, _cx: &StepContext) -> Result<(), PassError> {
    let functions: Vec<OpId> = module
        .regions()
        .into_iter()
        .filter_map(|point| match point {
            InsertPoint::Region { op, index: 0 }
                if matches!(module.op(op).kind, OpKind::LlFunc { .. }) =>
            {
                Some(op)
            }
            _ => None,
        })
        .collect();

    let mut spilled = 0usize;
    for func in functions {
        let body = InsertPoint::Region { op: func, index: 0 };
        let ops = module.region_mut(body).take();
        let count = ops
            .iter()
            .take_while(|&&id| matches!(module.op(id).kind, OpKind::Param { .. }))
            .count();

        let mut out = Vec::with_capacity(ops.len() + 2 * count);
        let mut slots = Vec::with_capacity(2 * count);
        for (position, &param) in ops[..count].iter().enumerate() {
            let op = module.op(param);
            let OpKind::Param { name } = &op.kind else {
                continue;
            };
            let name = name.clone();
            let loc = op.loc.clone();
            let Some(ty) = op.result else {
                return Err(PassError::new(format!("parameter {param} has no type")));
            };
            let value_ty = module.types().value_type(ty);

            let arg = module.insert(
                Operation::new(OpKind::Param { name: name.clone() }, loc.clone())
                    .with_result(value_ty),
            );
            module.op_mut(param).kind = OpKind::Alloca {
                name: name.unwrap_or_else(|| format!("arg{position}")),
            };
            let store = module.insert(Operation::new(
                OpKind::Store {
                    value: arg,
                    target: param,
                },
                loc,
            ));
            out.push(arg);
            slots.extend([param, store]);
            spilled += 1;
        }
        out.append(&mut slots);
        out.extend_from_slice(&ops[count..]);
        module.region_mut(body).set_ops(out);
    }
    tracing::debug!(params = spilled, "spilled parameters to allocas");
    Ok(())
}
