//! `CompiledExpr`: an immutable, shareable compilation artifact (spec.md
//! §6.1/§6.2).
//!
//! The specification's original thread-safety story clones the whole
//! expression tree per call. Per the Open Question decision recorded in
//! DESIGN.md, this crate instead splits an immutable plan — this type,
//! safe to share behind an `Arc` across threads — from a small per-call
//! [`crate::workspace::Workspace`] that owns the mutable scratch buffers.
//! `Arc<Expr>` nodes are immutable and read-only after construction (every
//! rewrite pass builds a new node bottom-up rather than mutating one in
//! place, and `Expr::has_string` is a plain field computed once at
//! construction, not a lazily-written cache), so `CompiledExpr` needs no
//! interior mutability at all and is `Send + Sync`.

use std::sync::Arc;

use blockexpr_parser::dtype::Dtype;
use blockexpr_parser::node::Expr;

use crate::error::{EvalError, EvalResult};

pub const MAX_VARS: usize = 64;

/// Sub-blocking is disabled when the root node is a `Reduction` (spec.md
/// §5: a reduction must see every element of its child to fold correctly;
/// slicing it into sub-blocks would fold each slice independently and
/// combine partial results incorrectly without an explicit merge step).
pub const SUB_BLOCK_NITEMS: usize = 1024;

/// One compile-time variable declaration: name, dtype, per-item byte
/// width, and the `bound` opaque pointer that is this variable's identity
/// key (spec.md §6.1).
#[derive(Debug, Clone)]
pub struct VariableSlot {
    pub name: Arc<str>,
    pub dtype: Dtype,
    pub item_size: usize,
    pub bound: usize,
}

/// An immutable compiled plan: the parsed/optimized/validated expression
/// tree plus the variable declarations it closes over, ready to be
/// evaluated any number of times (concurrently, via separate
/// [`crate::workspace::Workspace`]s) without recompiling.
#[derive(Debug)]
pub struct CompiledExpr {
    root: Arc<Expr>,
    /// Declaration order, sorted ascending by `bound` (spec.md §6.2: "sorted
    /// by pointer value to restore declaration order if synthetic
    /// sequential addresses were used").
    variables: Vec<VariableSlot>,
    dtype: Dtype,
}

impl CompiledExpr {
    pub fn new(root: Arc<Expr>, mut variables: Vec<VariableSlot>) -> EvalResult<CompiledExpr> {
        if variables.len() > MAX_VARS {
            return Err(EvalError::ErrTooManyVars { found: variables.len(), max: MAX_VARS });
        }
        variables.sort_by_key(|v| v.bound);
        let dtype = root.dtype();
        Ok(CompiledExpr { root, variables, dtype })
    }

    pub fn root(&self) -> &Arc<Expr> {
        &self.root
    }

    pub fn variables(&self) -> &[VariableSlot] {
        &self.variables
    }

    pub fn dtype(&self) -> Dtype {
        self.dtype
    }

    pub fn is_reduction(&self) -> bool {
        matches!(self.root.as_ref(), Expr::Reduction { .. })
    }

    /// Whether sub-blocking may be applied to this plan (spec.md §5: "disabled
    /// when root is a Reduction"). Generalized to any `Reduction` node
    /// anywhere in the tree, not only the root: a reduction nested under an
    /// arithmetic node still needs to see the whole block to fold correctly,
    /// so slicing the outer expression into sub-blocks would be just as
    /// wrong as slicing a root reduction.
    pub fn allows_sub_blocking(&self) -> bool {
        !contains_reduction(&self.root)
    }
}

fn contains_reduction(node: &Expr) -> bool {
    match node {
        Expr::Reduction { .. } => true,
        Expr::Call { args, .. } => args.iter().any(|a| contains_reduction(a)),
        Expr::Convert { child, .. } => contains_reduction(child),
        Expr::Constant { .. } | Expr::StringConstant { .. } | Expr::Variable { .. } => false,
    }
}

/// `Arc`-shareable handle, the type callers actually hold across threads
/// (spec.md §5: "shared read-only resources" — the compiled plan is one).
pub type SharedCompiledExpr = Arc<CompiledExpr>;
