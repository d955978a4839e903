//! The expression tree dispatcher (spec.md §4.6): walks a compiled
//! `Expr` against a `Workspace`, producing one `Buffer` per node, left
//! child evaluated before right (spec.md §5's declared evaluation order).

use blockexpr_parser::builtins::OpKind;
use blockexpr_parser::dtype::{common_type, Dtype};
use blockexpr_parser::node::Expr;

use crate::kernels::convert::convert_buffer;
use crate::kernels::{arith, bitwise, compare, logical, mathfn, string};
use crate::value::{Buffer, StrBuffer};
use crate::workspace::Workspace;

use super::reduce::eval_reduction;

/// Evaluate `node` against `ws`, returning a freshly-owned buffer of
/// `node.dtype()` (or, for `Str` subexpressions that never reach the
/// output, of the node's own string width).
pub fn eval_node(node: &Expr, ws: &Workspace) -> Buffer {
    match node {
        Expr::Constant { value, dtype } => {
            let mut buf = Buffer::zeroed(*dtype, ws.block_nitems);
            buf.fill_scalar(*value);
            buf
        }
        Expr::StringConstant { codepoints, len } => build_string_constant(codepoints, *len, ws.block_nitems),
        Expr::Variable { name, dtype, .. } => {
            let buf = ws.variable_by_name(name);
            if buf.dtype() == *dtype {
                buf.clone()
            } else {
                convert_buffer(buf, *dtype)
            }
        }
        Expr::Convert { child, target_dtype, .. } => {
            let child_buf = eval_node(child, ws);
            convert_buffer(&child_buf, *target_dtype)
        }
        Expr::Call { op, args, dtype, .. } => eval_call(*op, args, *dtype, ws),
        Expr::Reduction { op, child, dtype, .. } => eval_reduction(*op, child, *dtype, ws),
    }
}

fn build_string_constant(codepoints: &[char], len: usize, nitems: usize) -> Buffer {
    let item_size = len.max(1) * 4;
    let mut slot: Vec<char> = codepoints[..len].to_vec();
    slot.resize(item_size / 4, '\0');
    Buffer::Str(StrBuffer { item_size, slots: vec![slot; nitems] })
}

/// Convert both operands to their shared dtype before handing them to a
/// kernel whose `Buffer` match arms require identical variants.
fn to_common(a: &Buffer, b: &Buffer) -> (Buffer, Buffer) {
    if a.dtype() == b.dtype() {
        return (a.clone(), b.clone());
    }
    let common = common_type(a.dtype(), b.dtype());
    (convert_buffer(a, common), convert_buffer(b, common))
}

fn eval_call(op: OpKind, args: &[std::sync::Arc<Expr>], dtype: Dtype, ws: &Workspace) -> Buffer {
    match op {
        OpKind::Where => {
            let cond = eval_node(&args[0], ws);
            let then_buf = eval_node(&args[1], ws);
            let else_buf = eval_node(&args[2], ws);
            let then_buf = convert_buffer(&then_buf, dtype);
            let else_buf = convert_buffer(&else_buf, dtype);
            select(&cond, &then_buf, &else_buf)
        }
        OpKind::Fma => {
            let a = eval_node(&args[0], ws);
            let b = eval_node(&args[1], ws);
            let c = eval_node(&args[2], ws);
            mathfn::fma(&a, &b, &c)
        }
        _ if args.len() == 1 => eval_unary(op, &eval_node(&args[0], ws)),
        _ if args.len() == 2 => {
            let left = eval_node(&args[0], ws);
            let right = eval_node(&args[1], ws);
            eval_binary(op, &left, &right)
        }
        _ => unreachable!("builtin table only defines arity 1/2/3 operators"),
    }
}

fn eval_unary(op: OpKind, buf: &Buffer) -> Buffer {
    match op {
        OpKind::Neg => arith::neg(buf),
        OpKind::Pos => arith::pos(buf),
        OpKind::Not => logical::not(buf),
        OpKind::BitNot => bitwise::not(buf),
        OpKind::Sqrt => arith::sqrt(buf),
        OpKind::Sin => mathfn::sin(buf),
        OpKind::Cos => mathfn::cos(buf),
        OpKind::Tan => mathfn::tan(buf),
        OpKind::Asin => mathfn::asin(buf),
        OpKind::Acos => mathfn::acos(buf),
        OpKind::Atan => mathfn::atan(buf),
        OpKind::Sinh => mathfn::sinh(buf),
        OpKind::Cosh => mathfn::cosh(buf),
        OpKind::Tanh => mathfn::tanh(buf),
        OpKind::Asinh => mathfn::asinh(buf),
        OpKind::Acosh => mathfn::acosh(buf),
        OpKind::Atanh => mathfn::atanh(buf),
        OpKind::Exp => mathfn::exp(buf),
        OpKind::Expm1 => mathfn::expm1(buf),
        OpKind::Exp2 => mathfn::exp2(buf),
        OpKind::Exp10 => mathfn::exp10(buf),
        OpKind::Log => mathfn::log(buf),
        OpKind::Ln => mathfn::ln(buf),
        OpKind::Log10 => mathfn::log10(buf),
        OpKind::Log1p => mathfn::log1p(buf),
        OpKind::Log2 => mathfn::log2(buf),
        OpKind::Cbrt => mathfn::cbrt(buf),
        OpKind::Ceil => mathfn::ceil(buf),
        OpKind::Floor => mathfn::floor(buf),
        OpKind::Trunc => mathfn::trunc(buf),
        OpKind::Round => mathfn::round(buf),
        OpKind::Rint => mathfn::rint(buf),
        OpKind::Erf => mathfn::erf(buf),
        OpKind::Erfc => mathfn::erfc(buf),
        OpKind::Tgamma => mathfn::tgamma(buf),
        OpKind::Lgamma => mathfn::lgamma(buf),
        OpKind::Sinpi => mathfn::sinpi(buf),
        OpKind::Cospi => mathfn::cospi(buf),
        OpKind::Fabs => mathfn::fabs(buf),
        OpKind::Fac => mathfn::fac(buf),
        OpKind::Real => mathfn::real(buf),
        OpKind::Imag => mathfn::imag(buf),
        OpKind::Conj => mathfn::conj(buf),
        _ => unreachable!("{op:?} is not a unary operator"),
    }
}

fn eval_binary(op: OpKind, left: &Buffer, right: &Buffer) -> Buffer {
    match op {
        OpKind::Add => {
            let (l, r) = to_common(left, right);
            arith::add(&l, &r)
        }
        OpKind::Sub => {
            let (l, r) = to_common(left, right);
            arith::sub(&l, &r)
        }
        OpKind::Mul => {
            let (l, r) = to_common(left, right);
            arith::mul(&l, &r)
        }
        OpKind::Div => {
            let (l, r) = to_common(left, right);
            arith::div(&l, &r)
        }
        OpKind::Mod => {
            let (l, r) = to_common(left, right);
            arith::rem(&l, &r)
        }
        OpKind::Pow => {
            let (l, r) = to_common(left, right);
            arith::pow(&l, &r)
        }
        OpKind::Lt => {
            let (l, r) = to_common(left, right);
            compare::lt(&l, &r)
        }
        OpKind::Gt => {
            let (l, r) = to_common(left, right);
            compare::gt(&l, &r)
        }
        OpKind::LtEq => {
            let (l, r) = to_common(left, right);
            compare::le(&l, &r)
        }
        OpKind::GtEq => {
            let (l, r) = to_common(left, right);
            compare::ge(&l, &r)
        }
        OpKind::Eq => {
            if left.dtype() == Dtype::Str {
                compare::eq(left, right)
            } else {
                let (l, r) = to_common(left, right);
                compare::eq(&l, &r)
            }
        }
        OpKind::NotEq => {
            if left.dtype() == Dtype::Str {
                compare::ne(left, right)
            } else {
                let (l, r) = to_common(left, right);
                compare::ne(&l, &r)
            }
        }
        OpKind::And => logical::and(left, right),
        OpKind::Or => logical::or(left, right),
        OpKind::BitAnd => {
            let (l, r) = to_common(left, right);
            bitwise::and(&l, &r)
        }
        OpKind::BitOr => {
            let (l, r) = to_common(left, right);
            bitwise::or(&l, &r)
        }
        OpKind::BitXor => {
            let (l, r) = to_common(left, right);
            bitwise::xor(&l, &r)
        }
        OpKind::Shl => {
            let r = convert_buffer(right, left.dtype());
            bitwise::shl(left, &r)
        }
        OpKind::Shr => {
            let r = convert_buffer(right, left.dtype());
            bitwise::shr(left, &r)
        }
        OpKind::Atan2 => mathfn::atan2(left, right),
        OpKind::Copysign => mathfn::copysign(left, right),
        OpKind::Fdim => mathfn::fdim(left, right),
        OpKind::Fmax => mathfn::fmax(left, right),
        OpKind::Fmin => mathfn::fmin(left, right),
        OpKind::Fmod => mathfn::fmod(left, right),
        OpKind::Hypot => mathfn::hypot(left, right),
        OpKind::Ldexp => mathfn::ldexp(left, right),
        OpKind::Nextafter => mathfn::nextafter(left, right),
        OpKind::Remainder => mathfn::remainder(left, right),
        OpKind::Logaddexp => mathfn::logaddexp(left, right),
        OpKind::Ncr => mathfn::ncr(left, right),
        OpKind::Npr => mathfn::npr(left, right),
        OpKind::StartsWith => string::startswith(left, right),
        OpKind::EndsWith => string::endswith(left, right),
        OpKind::Contains => string::contains_op(left, right),
        _ => unreachable!("{op:?} is not a binary operator"),
    }
}

fn select(cond: &Buffer, then_buf: &Buffer, else_buf: &Buffer) -> Buffer {
    let mask: Vec<bool> = match cond {
        Buffer::Bool(v) => v.clone(),
        other => crate::kernels::convert::buffer_to_f64(other).iter().map(|&x| x != 0.0).collect(),
    };

    macro_rules! pick {
        ($t:expr, $e:expr) => {{
            mask.iter().zip($t.iter().zip($e.iter())).map(|(&m, (&t, &e))| if m { t } else { e }).collect()
        }};
    }

    match (then_buf, else_buf) {
        (Buffer::Bool(t), Buffer::Bool(e)) => Buffer::Bool(pick!(t, e)),
        (Buffer::I8(t), Buffer::I8(e)) => Buffer::I8(pick!(t, e)),
        (Buffer::I16(t), Buffer::I16(e)) => Buffer::I16(pick!(t, e)),
        (Buffer::I32(t), Buffer::I32(e)) => Buffer::I32(pick!(t, e)),
        (Buffer::I64(t), Buffer::I64(e)) => Buffer::I64(pick!(t, e)),
        (Buffer::U8(t), Buffer::U8(e)) => Buffer::U8(pick!(t, e)),
        (Buffer::U16(t), Buffer::U16(e)) => Buffer::U16(pick!(t, e)),
        (Buffer::U32(t), Buffer::U32(e)) => Buffer::U32(pick!(t, e)),
        (Buffer::U64(t), Buffer::U64(e)) => Buffer::U64(pick!(t, e)),
        (Buffer::F32(t), Buffer::F32(e)) => Buffer::F32(pick!(t, e)),
        (Buffer::F64(t), Buffer::F64(e)) => Buffer::F64(pick!(t, e)),
        (Buffer::C64(t), Buffer::C64(e)) => Buffer::C64(pick!(t, e)),
        (Buffer::C128(t), Buffer::C128(e)) => Buffer::C128(pick!(t, e)),
        (Buffer::Str(t), Buffer::Str(e)) => {
            let slots = mask
                .iter()
                .zip(t.slots.iter().zip(e.slots.iter()))
                .map(|(&m, (t, e))| if m { t.clone() } else { e.clone() })
                .collect();
            Buffer::Str(StrBuffer { item_size: t.item_size.max(e.item_size), slots })
        }
        _ => unreachable!("where's then/else branches were already converted to a shared dtype"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn ws_with(name: &str, buf: Buffer) -> Workspace {
        let n = buf.len();
        Workspace::new(vec![Arc::from(name)], vec![buf], n)
    }

    #[test]
    fn test_constant_fills_block() {
        let node = Expr::Constant { value: 3.0, dtype: Dtype::I32 };
        let ws = ws_with("unused", Buffer::I32(vec![0, 0, 0]));
        assert!(matches!(eval_node(&node, &ws), Buffer::I32(v) if v == vec![3, 3, 3]));
    }

    #[test]
    fn test_variable_passthrough() {
        let node = Expr::Variable { name: Arc::from("a"), dtype: Dtype::F32, item_size: 4 };
        let ws = ws_with("a", Buffer::F32(vec![1.0, 2.0]));
        assert!(matches!(eval_node(&node, &ws), Buffer::F32(v) if v == vec![1.0, 2.0]));
    }

    #[test]
    fn test_binary_add_promotes_mixed_dtypes() {
        let left = Arc::new(Expr::Variable { name: Arc::from("a"), dtype: Dtype::I32, item_size: 4 });
        let right = Arc::new(Expr::Constant { value: 1.5, dtype: Dtype::F64 });
        let node = Expr::call(OpKind::Add, vec![left, right], Dtype::F64);
        let ws = ws_with("a", Buffer::I32(vec![1, 2]));
        assert!(matches!(eval_node(&node, &ws), Buffer::F64(v) if v == vec![2.5, 3.5]));
    }

    #[test]
    fn test_where_selects_elementwise() {
        let cond = Arc::new(Expr::Variable { name: Arc::from("a"), dtype: Dtype::Bool, item_size: 1 });
        let then_v = Arc::new(Expr::Variable { name: Arc::from("a"), dtype: Dtype::I32, item_size: 4 });
        let else_v = Arc::new(Expr::Constant { value: -1.0, dtype: Dtype::I32 });
        let node = Expr::call(OpKind::Where, vec![cond, then_v, else_v], Dtype::I32);
        // Workspace needs two different dtypes bound to name "a"; use two vars instead.
        let ws = Workspace::new(
            vec![Arc::from("a")],
            vec![Buffer::I32(vec![5, 0, 7])],
            3,
        );
        // cond reads "a" as Bool (auto-converted from I32 nonzero check).
        let out = eval_node(&node, &ws);
        assert!(matches!(out, Buffer::I32(v) if v == vec![5, -1, 7]));
    }
}
