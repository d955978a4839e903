//! Constant folding and the two mandatory algebraic rewrites (spec.md §4.4).
//!
//! The tree is walked bottom-up. The rewrites run first so that, e.g.,
//! `pow(x, 2) * 3` folds its `3` factor in the same pass that turns
//! `pow(x, 2)` into `x * x` — both passes are cheap enough to run as one
//! recursive walk rather than two full tree traversals.

use std::sync::Arc;

use crate::builtins::OpKind;
use crate::dtype::Dtype;
use crate::error::ParseResult;
use crate::node::Expr;

/// Run the rewrite + constant-folding pass over a freshly parsed tree.
pub fn optimize(expr: Arc<Expr>) -> ParseResult<Arc<Expr>> {
    optimize_node(&expr)
}

fn optimize_node(expr: &Arc<Expr>) -> ParseResult<Arc<Expr>> {
    match expr.as_ref() {
        Expr::Constant { .. } | Expr::StringConstant { .. } | Expr::Variable { .. } => Ok(expr.clone()),

        Expr::Convert { child, input_dtype, target_dtype } => {
            let child = optimize_node(child)?;
            Ok(Arc::new(Expr::Convert {
                child,
                input_dtype: *input_dtype,
                target_dtype: *target_dtype,
            }))
        }

        Expr::Reduction { op, child, dtype, .. } => {
            // Non-pure: the child still gets folded, the reduction itself
            // never does (spec.md §4.4).
            let child = optimize_node(child)?;
            Ok(Arc::new(Expr::reduction(*op, child, *dtype)))
        }

        Expr::Call { op, args, dtype, .. } => {
            let args: Vec<Arc<Expr>> = args.iter().map(optimize_node).collect::<ParseResult<_>>()?;
            let rewritten = apply_pow_rewrite(*op, &args, *dtype);
            let rewritten = match rewritten {
                Some(r) => optimize_node(&r)?,
                None => Arc::new(Expr::call(*op, args, *dtype)),
            };
            try_fold_constant(&rewritten)
        }
    }
}

/// `pow(x, 2) -> x * x`, `pow(x, 3) -> (x * x) * x` (spec.md §4.4). The
/// rewrite fires whenever the right operand is the constant `2.0`/`3.0`,
/// regardless of whether `x` itself is constant — the point is to avoid
/// a real `pow` call at evaluation time, not to fold `x`.
fn apply_pow_rewrite(op: OpKind, args: &[Arc<Expr>], dtype: Dtype) -> Option<Arc<Expr>> {
    if op != OpKind::Pow {
        return None;
    }
    let [base, exponent] = args else { return None };
    let Expr::Constant { value, .. } = exponent.as_ref() else {
        return None;
    };

    let mul = |a: Arc<Expr>, b: Arc<Expr>| Arc::new(Expr::call(OpKind::Mul, vec![a, b], dtype));

    if *value == 2.0 {
        Some(mul(base.clone(), base.clone()))
    } else if *value == 3.0 {
        Some(mul(mul(base.clone(), base.clone()), base.clone()))
    } else {
        None
    }
}

/// Fold `expr` into a `Constant` if it is pure and every child is already
/// a `Constant` (spec.md §4.4). Non-`Call` nodes and anything with a
/// non-constant or string-typed child pass through unchanged.
fn try_fold_constant(expr: &Arc<Expr>) -> ParseResult<Arc<Expr>> {
    let Expr::Call { op, args, dtype, .. } = expr.as_ref() else {
        return Ok(expr.clone());
    };

    if !op.is_reduction() {
        let values: Option<Vec<f64>> = args
            .iter()
            .map(|a| match a.as_ref() {
                Expr::Constant { value, .. } => Some(*value),
                _ => None,
            })
            .collect();

        if let Some(values) = values {
            if let Some(folded) = eval_scalar(*op, &values) {
                return Ok(Arc::new(Expr::Constant { value: folded, dtype: *dtype }));
            }
        }
    }

    Ok(expr.clone())
}

/// Scalar evaluation of a pure operator over already-narrowed `f64`
/// operands, used only by constant folding (the real per-dtype kernels
/// live in the runtime crate's dispatch evaluator). Returns `None` for
/// operators that cannot be usefully scalar-folded this way (string
/// relations, reductions — reductions never reach here).
fn eval_scalar(op: OpKind, args: &[f64]) -> Option<f64> {
    use OpKind::*;

    let truthy = |v: f64| v != 0.0;
    let b = |v: bool| if v { 1.0 } else { 0.0 };

    Some(match (op, args) {
        (Add, [a, c]) => a + c,
        (Sub, [a, c]) => a - c,
        (Mul, [a, c]) => a * c,
        (Div, [a, c]) => {
            if *c == 0.0 {
                return None; // defer to runtime dtype-specific zero/NaN/Inf semantics
            }
            a / c
        }
        (Mod, [a, c]) => {
            if *c == 0.0 {
                return None;
            }
            a % c
        }
        (Pow, [a, c]) => a.powf(*c),
        (Neg, [a]) => -a,
        (Pos, [a]) => *a,

        (Lt, [a, c]) => b(a < c),
        (Gt, [a, c]) => b(a > c),
        (LtEq, [a, c]) => b(a <= c),
        (GtEq, [a, c]) => b(a >= c),
        (Eq, [a, c]) => b(a == c),
        (NotEq, [a, c]) => b(a != c),

        (And, [a, c]) => b(truthy(*a) && truthy(*c)),
        (Or, [a, c]) => b(truthy(*a) || truthy(*c)),
        (Not, [a]) => b(!truthy(*a)),

        (BitAnd, [a, c]) => ((*a as i64) & (*c as i64)) as f64,
        (BitOr, [a, c]) => ((*a as i64) | (*c as i64)) as f64,
        (BitXor, [a, c]) => ((*a as i64) ^ (*c as i64)) as f64,
        (BitNot, [a]) => (!(*a as i64)) as f64,
        (Shl, [a, c]) => ((*a as i64) << (*c as i64)) as f64,
        (Shr, [a, c]) => ((*a as i64) >> (*c as i64)) as f64,

        (Sin, [a]) => a.sin(),
        (Cos, [a]) => a.cos(),
        (Tan, [a]) => a.tan(),
        (Asin, [a]) => a.asin(),
        (Acos, [a]) => a.acos(),
        (Atan, [a]) => a.atan(),
        (Atan2, [y, x]) => y.atan2(*x),
        (Sinh, [a]) => a.sinh(),
        (Cosh, [a]) => a.cosh(),
        (Tanh, [a]) => a.tanh(),
        (Asinh, [a]) => a.asinh(),
        (Acosh, [a]) => a.acosh(),
        (Atanh, [a]) => a.atanh(),
        (Exp, [a]) => a.exp(),
        (Expm1, [a]) => a.exp_m1(),
        (Exp2, [a]) => a.exp2(),
        (Exp10, [a]) => 10f64.powf(*a),
        (Log, [a]) => a.ln(),
        (Ln, [a]) => a.ln(),
        (Log10, [a]) => a.log10(),
        (Log1p, [a]) => a.ln_1p(),
        (Log2, [a]) => a.log2(),
        (Sqrt, [a]) => a.sqrt(),
        (Cbrt, [a]) => a.cbrt(),
        (Ceil, [a]) => a.ceil(),
        (Floor, [a]) => a.floor(),
        (Trunc, [a]) => a.trunc(),
        (Round, [a]) => a.round(),
        (Rint, [a]) => a.round_ties_even(),
        (Sinpi, [a]) => (a * std::f64::consts::PI).sin(),
        (Cospi, [a]) => (a * std::f64::consts::PI).cos(),
        (Fabs, [a]) => a.abs(),
        (Copysign, [a, c]) => a.copysign(*c),
        (Fdim, [a, c]) => (a - c).max(0.0),
        (Fmax, [a, c]) => a.max(*c),
        (Fmin, [a, c]) => a.min(*c),
        (Fmod, [a, c]) => a % c,
        (Hypot, [a, c]) => a.hypot(*c),
        (Ldexp, [a, c]) => a * (*c).exp2(),
        (Nextafter, [a, c]) => {
            if a == c {
                *c
            } else if *c > *a {
                f64::from_bits(a.to_bits() + 1)
            } else {
                f64::from_bits(a.to_bits() - 1)
            }
        }
        (Remainder, [a, c]) => a - (a / c).round() * c,
        (Fma, [a, c, d]) => a.mul_add(*c, *d),

        (Fac, [a]) => (1..=(*a as u64)).product::<u64>() as f64,
        (Ncr, [n, r]) => binomial(*n as u64, *r as u64),
        (Npr, [n, r]) => {
            let n = *n as u64;
            let r = *r as u64;
            if r > n {
                0.0
            } else {
                ((n - r + 1)..=n).product::<u64>() as f64
            }
        }
        (Logaddexp, [a, c]) => a.max(*c) + ((a - a.max(*c)).exp() + (c - a.max(*c)).exp()).ln(),

        (Real | Imag | Conj, [a]) => {
            // Constants are always real scalars (spec.md §3.2); imag of a
            // non-complex child is zero, real/conj are identity.
            if op == Imag {
                0.0
            } else {
                *a
            }
        }

        (Where, [cond, x, y]) => {
            if truthy(*cond) {
                *x
            } else {
                *y
            }
        }

        _ => return None,
    })
}

fn binomial(n: u64, r: u64) -> f64 {
    if r > n {
        return 0.0;
    }
    let r = r.min(n - r);
    let mut result = 1f64;
    for i in 0..r {
        result = result * (n - i) as f64 / (i + 1) as f64;
    }
    result.round()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: f64, dtype: Dtype) -> Arc<Expr> {
        Arc::new(Expr::Constant { value, dtype })
    }

    fn call(op: OpKind, args: Vec<Arc<Expr>>, dtype: Dtype) -> Arc<Expr> {
        Arc::new(Expr::call(op, args, dtype))
    }

    #[test]
    fn test_fold_simple_add() {
        let tree = call(OpKind::Add, vec![constant(1.0, Dtype::I32), constant(2.0, Dtype::I32)], Dtype::I32);
        let folded = optimize(tree).unwrap();
        match folded.as_ref() {
            Expr::Constant { value, .. } => assert_eq!(*value, 3.0),
            _ => panic!("expected folded constant"),
        }
    }

    #[test]
    fn test_pow_square_rewrite_removes_pow_node() {
        let x = Arc::new(Expr::Variable { name: Arc::from("x"), dtype: Dtype::F64, item_size: 8 });
        let tree = call(OpKind::Pow, vec![x, constant(2.0, Dtype::F64)], Dtype::F64);
        let optimized = optimize(tree).unwrap();
        match optimized.as_ref() {
            Expr::Call { op, .. } => assert_eq!(*op, OpKind::Mul),
            other => panic!("expected Mul call, got {other:?}"),
        }
    }

    #[test]
    fn test_pow_cube_rewrite_shape() {
        let x = Arc::new(Expr::Variable { name: Arc::from("x"), dtype: Dtype::F64, item_size: 8 });
        let tree = call(OpKind::Pow, vec![x, constant(3.0, Dtype::F64)], Dtype::F64);
        let optimized = optimize(tree).unwrap();
        // (x * x) * x
        match optimized.as_ref() {
            Expr::Call { op: OpKind::Mul, args, .. } => {
                assert!(matches!(args[0].as_ref(), Expr::Call { op: OpKind::Mul, .. }));
                assert!(matches!(args[1].as_ref(), Expr::Variable { .. }));
            }
            other => panic!("expected nested Mul, got {other:?}"),
        }
    }

    #[test]
    fn test_non_constant_subtree_not_folded() {
        let x = Arc::new(Expr::Variable { name: Arc::from("x"), dtype: Dtype::F64, item_size: 8 });
        let tree = call(OpKind::Add, vec![x, constant(2.0, Dtype::F64)], Dtype::F64);
        let optimized = optimize(tree).unwrap();
        assert!(matches!(optimized.as_ref(), Expr::Call { op: OpKind::Add, .. }));
    }

    #[test]
    fn test_reduction_never_folded() {
        let r = Arc::new(Expr::reduction(OpKind::Sum, constant(1.0, Dtype::F64), Dtype::F64));
        let optimized = optimize(r).unwrap();
        assert!(matches!(optimized.as_ref(), Expr::Reduction { .. }));
    }

    #[test]
    fn test_division_by_zero_not_folded_left_to_runtime() {
        let tree = call(OpKind::Div, vec![constant(1.0, Dtype::I32), constant(0.0, Dtype::I32)], Dtype::I32);
        let optimized = optimize(tree).unwrap();
        assert!(matches!(optimized.as_ref(), Expr::Call { op: OpKind::Div, .. }));
    }

    #[test]
    fn test_where_folds_to_chosen_branch() {
        let tree = call(
            OpKind::Where,
            vec![constant(1.0, Dtype::Bool), constant(10.0, Dtype::I32), constant(20.0, Dtype::I32)],
            Dtype::I32,
        );
        let optimized = optimize(tree).unwrap();
        match optimized.as_ref() {
            Expr::Constant { value, .. } => assert_eq!(*value, 10.0),
            _ => panic!("expected folded constant"),
        }
    }
}
