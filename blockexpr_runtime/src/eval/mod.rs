//! The tree-walking evaluator (spec.md §4.6/§4.7).

pub mod dispatch;
pub mod reduce;

pub use dispatch::eval_node;
