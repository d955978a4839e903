//! The reduction evaluator (spec.md §4.7): fold a fully-evaluated child
//! buffer down to one scalar, narrow it to the reduction's own dtype, and
//! broadcast it across every slot of the output block.

use blockexpr_parser::builtins::OpKind;
use blockexpr_parser::dtype::Dtype;
use blockexpr_parser::node::Expr;

use crate::kernels::convert::convert_buffer;
use crate::kernels::reduce;
use crate::value::Buffer;
use crate::workspace::Workspace;

use super::dispatch::eval_node;

/// Evaluate `child` (always in full — a reduction must see every element,
/// see `CompiledExpr::allows_sub_blocking`), fold it per `op`, narrow the
/// one-element result to `dtype`, and broadcast it to `ws.block_nitems`
/// slots.
pub fn eval_reduction(op: OpKind, child: &Expr, dtype: Dtype, ws: &Workspace) -> Buffer {
    let child_buf = eval_node(child, ws);

    let folded = match op {
        OpKind::Sum => reduce::sum(&child_buf),
        OpKind::Prod => reduce::prod(&child_buf),
        OpKind::Mean => reduce::mean(&child_buf),
        OpKind::Min => reduce::min(&child_buf),
        OpKind::Max => reduce::max(&child_buf),
        OpKind::Any => reduce::any(&child_buf),
        OpKind::All => reduce::all(&child_buf),
        _ => unreachable!("{op:?} is not a reduction"),
    };

    let narrowed = convert_buffer(&folded, dtype);
    broadcast(&narrowed, ws.block_nitems)
}

fn broadcast(scalar: &Buffer, nitems: usize) -> Buffer {
    macro_rules! rep {
        ($v:expr) => {
            vec![$v[0]; nitems]
        };
    }
    match scalar {
        Buffer::Bool(v) => Buffer::Bool(rep!(v)),
        Buffer::I8(v) => Buffer::I8(rep!(v)),
        Buffer::I16(v) => Buffer::I16(rep!(v)),
        Buffer::I32(v) => Buffer::I32(rep!(v)),
        Buffer::I64(v) => Buffer::I64(rep!(v)),
        Buffer::U8(v) => Buffer::U8(rep!(v)),
        Buffer::U16(v) => Buffer::U16(rep!(v)),
        Buffer::U32(v) => Buffer::U32(rep!(v)),
        Buffer::U64(v) => Buffer::U64(rep!(v)),
        Buffer::F32(v) => Buffer::F32(rep!(v)),
        Buffer::F64(v) => Buffer::F64(rep!(v)),
        Buffer::C64(v) => Buffer::C64(rep!(v)),
        Buffer::C128(v) => Buffer::C128(rep!(v)),
        Buffer::Str(_) => unreachable!("reductions never yield a Str result"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_sum_broadcasts_across_block() {
        let child = Expr::Variable { name: Arc::from("a"), dtype: Dtype::I32, item_size: 4 };
        let ws = Workspace::new(vec![Arc::from("a")], vec![Buffer::I32(vec![1, 2, 3, 4])], 4);
        let out = eval_reduction(OpKind::Sum, &child, Dtype::I64, &ws);
        assert!(matches!(out, Buffer::I64(v) if v == vec![10, 10, 10, 10]));
    }

    #[test]
    fn test_mean_nan_input_propagates() {
        let child = Expr::Variable { name: Arc::from("a"), dtype: Dtype::F64, item_size: 8 };
        let ws = Workspace::new(vec![Arc::from("a")], vec![Buffer::F64(vec![1.0, f64::NAN])], 2);
        let out = eval_reduction(OpKind::Sum, &child, Dtype::F64, &ws);
        assert!(matches!(out, Buffer::F64(v) if v.iter().all(|x| x.is_nan())));
    }
}
