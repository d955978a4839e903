//! Runtime half of the blockexpr numeric expression engine: a compiled-plan
//! representation and a multi-dtype, block-chunked tree-walking evaluator
//! for trees produced by `blockexpr_parser` (spec.md §4.6/§5/§6).

pub mod api;
pub mod compiled;
pub mod complex;
pub mod diag;
pub mod error;
pub mod eval;
pub mod kernels;
pub mod params;
pub mod value;
pub mod workspace;

pub use api::{compile, comparison_kind, evaluate, is_builtin_function_name, reduction_kind, result_dtype, VarDecl};
pub use compiled::{CompiledExpr, SharedCompiledExpr, VariableSlot, MAX_VARS, SUB_BLOCK_NITEMS};
pub use error::{CompileError, CompileResult, EvalError, EvalResult};
pub use params::EvalParams;
pub use value::{Buffer, StrBuffer};
pub use workspace::Workspace;
