//! The expression tree (spec.md §3.2).
//!
//! Represented as a tagged Rust enum rather than a C-style struct with a
//! `kind` discriminant and a fixed-size `parameters` array: each variant
//! carries exactly the fields it needs, and `Convert` is its own variant
//! instead of a Function1 node with a null function pointer (spec.md §9).

use std::sync::Arc;

use crate::builtins::OpKind;
use crate::dtype::Dtype;

/// An expression-tree node.
///
/// Nodes are reference-counted (`Arc`) rather than uniquely owned: the
/// constant-folding and rewrite passes (spec.md §4.4) replace subtrees by
/// building new nodes bottom-up and share unchanged children rather than
/// deep-cloning them, and the evaluator's `CompiledExpr` holds a read-only
/// `Arc`-wrapped copy of the finished tree (see `blockexpr_runtime`) that
/// must itself be `Send + Sync` so it can be shared across threads (spec.md
/// §5) — which is why `has_string` below is a plain `bool` computed once at
/// construction rather than a `Cell`-memoized lazy flag.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A numeric constant. `value` carries the literal; `dtype` says how
    /// to narrow it. Never `Dtype::Str` (invariant, spec.md §3.2).
    Constant { value: f64, dtype: Dtype },

    /// A string constant: an owned UTF-32 buffer (including its trailing
    /// NUL terminator) and its code-point count.
    StringConstant { codepoints: Arc<[char]>, len: usize },

    /// A reference to caller-provided external data.
    Variable {
        name: Arc<str>,
        dtype: Dtype,
        /// Byte width of one element; for `Str` this is the per-variable
        /// `item_size` (a multiple of 4), for everything else it always
        /// matches `dtype.byte_width()`.
        item_size: usize,
    },

    /// A widening/narrowing node with no operator semantics of its own
    /// (spec.md §9: "Prefer a distinct node variant `Convert { child,
    /// target_dtype }`").
    Convert {
        child: Arc<Expr>,
        input_dtype: Dtype,
        target_dtype: Dtype,
    },

    /// A builtin function or operator call.
    Call {
        op: OpKind,
        args: Vec<Arc<Expr>>,
        dtype: Dtype,
        /// Whether any argument (transitively) is string-typed, computed
        /// once when the node is built (spec.md §3.2). Nodes are never
        /// mutated in place — rewrites build a new node bottom-up — so
        /// there is nothing to invalidate after construction.
        has_string: bool,
    },

    /// A reduction over a single child expression.
    Reduction {
        op: OpKind,
        child: Arc<Expr>,
        /// The reduction's own output dtype (spec.md §4.3's dedicated
        /// table), separate from the narrowing applied afterward if the
        /// declared node dtype differs.
        dtype: Dtype,
        has_string: bool,
    },
}

impl Expr {
    /// The node's output element dtype.
    pub fn dtype(&self) -> Dtype {
        match self {
            Expr::Constant { dtype, .. } => *dtype,
            Expr::StringConstant { .. } => Dtype::Str,
            Expr::Variable { dtype, .. } => *dtype,
            Expr::Convert { target_dtype, .. } => *target_dtype,
            Expr::Call { dtype, .. } => *dtype,
            Expr::Reduction { dtype, .. } => *dtype,
        }
    }

    /// Whether this subtree contains any string-typed node (spec.md §3.2).
    /// `Call`/`Reduction` read their own field, computed once by
    /// [`Expr::call`]/[`Expr::reduction`] at construction time; the other
    /// variants are O(1) already and need no cache.
    pub fn has_string(&self) -> bool {
        match self {
            Expr::Constant { .. } | Expr::Variable { .. } => false,
            Expr::StringConstant { .. } => true,
            Expr::Convert { child, .. } => child.has_string(),
            Expr::Call { has_string, .. } => *has_string,
            Expr::Reduction { has_string, .. } => *has_string,
        }
    }

    /// Build a `Call` node, computing `has_string` from `args` up front.
    pub fn call(op: OpKind, args: Vec<Arc<Expr>>, dtype: Dtype) -> Expr {
        let has_string = args.iter().any(|a| a.has_string());
        Expr::Call { op, args, dtype, has_string }
    }

    /// Build a `Reduction` node, computing `has_string` from `child` up
    /// front.
    pub fn reduction(op: OpKind, child: Arc<Expr>, dtype: Dtype) -> Expr {
        let has_string = child.has_string();
        Expr::Reduction { op, child, dtype, has_string }
    }

    /// Children of this node, in left-to-right evaluation order (spec.md
    /// §5: "operand evaluation order within a Function node is
    /// left-to-right").
    pub fn children(&self) -> Vec<&Arc<Expr>> {
        match self {
            Expr::Constant { .. } | Expr::StringConstant { .. } | Expr::Variable { .. } => Vec::new(),
            Expr::Convert { child, .. } | Expr::Reduction { child, .. } => vec![child],
            Expr::Call { args, .. } => args.iter().collect(),
        }
    }

    /// Whether this node, and every child, is a pure computation eligible
    /// for constant folding (spec.md §4.4: "Non-pure nodes (reductions,
    /// ops with side effects via closures) are never folded"). All
    /// builtin operators in this engine are pure; only reductions opt
    /// out, since their identity as aggregate ops make "folding" meaningless
    /// prior to evaluation order being fixed.
    pub fn is_pure(&self) -> bool {
        !matches!(self, Expr::Reduction { .. })
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Expr::Constant { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: f64, dtype: Dtype) -> Arc<Expr> {
        Arc::new(Expr::Constant { value, dtype })
    }

    #[test]
    fn test_constant_dtype() {
        let c = constant(1.0, Dtype::F32);
        assert_eq!(c.dtype(), Dtype::F32);
        assert!(!c.has_string());
    }

    #[test]
    fn test_string_constant_has_string() {
        let s = Expr::StringConstant {
            codepoints: Arc::from(vec!['a', '\0']),
            len: 1,
        };
        assert!(s.has_string());
        assert_eq!(s.dtype(), Dtype::Str);
    }

    #[test]
    fn test_call_has_string_propagates() {
        let a = constant(1.0, Dtype::F64);
        let s = Arc::new(Expr::StringConstant {
            codepoints: Arc::from(vec!['x', '\0']),
            len: 1,
        });
        let call = Expr::call(OpKind::Eq, vec![a, s], Dtype::Bool);
        assert!(call.has_string());
    }

    #[test]
    fn test_reduction_is_not_pure() {
        let r = Expr::reduction(OpKind::Sum, constant(1.0, Dtype::F64), Dtype::F64);
        assert!(!r.is_pure());
    }

    #[test]
    fn test_children_order() {
        let a = constant(1.0, Dtype::F64);
        let b = constant(2.0, Dtype::F64);
        let call = Expr::call(OpKind::Add, vec![a.clone(), b.clone()], Dtype::F64);
        let children = call.children();
        assert_eq!(children.len(), 2);
        assert!(Arc::ptr_eq(children[0], &a));
        assert!(Arc::ptr_eq(children[1], &b));
    }
}
