//! Evaluation error codes (spec.md §6.2, §7).

use thiserror::Error;

/// Everything that can go wrong calling [`crate::api::evaluate`]. `Ok(())`
/// is the `Success` return code; there is no explicit variant for it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EvalError {
    /// The compiled expression handle was null/empty.
    #[error("null expression")]
    ErrNullExpr,

    /// A pointer argument was null, or `expr.dtype() == Str`.
    #[error("invalid argument")]
    ErrInvalidArg,

    /// `vars.len()` did not equal the expression's distinct variable count.
    #[error("variable count mismatch: expected {expected}, got {found}")]
    ErrVarMismatch { expected: usize, found: usize },

    /// The expression references more variables than `MAX_VARS` allows.
    #[error("too many variables: {found} exceeds the limit of {max}")]
    ErrTooManyVars { found: usize, max: usize },

    /// A transient buffer allocation failed.
    #[error("out of memory")]
    ErrOom,
}

/// Result type alias for evaluation entry points.
pub type EvalResult<T> = Result<T, EvalError>;

/// Everything that can go wrong in [`crate::api::compile`]: either the
/// parser rejected the source, or the variable declarations themselves
/// violate a runtime constraint (currently only `MAX_VARS`).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] blockexpr_parser::ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

pub type CompileResult<T> = Result<T, CompileError>;
