//! Post-parse validation (spec.md §4.2 "Validation after parsing").
//!
//! Most string-operand placement is already rejected during parsing
//! (`grammar.rs`/`calls.rs` refuse to build a node that would violate it),
//! so this pass is the final sweep that catches what structural parsing
//! alone cannot: the overall result dtype, and reduction argument subtrees
//! that smuggle a string in through a builtin whose per-node check doesn't
//! see the whole subtree.

use crate::builtins::OpKind;
use crate::dtype::Dtype;
use crate::error::{ParseError, ParseResult};
use crate::node::Expr;
use crate::span::Span;

/// Run every validation rule over a finished (optimized) tree.
pub fn validate(expr: &Expr) -> ParseResult<()> {
    if expr.dtype() == Dtype::Str {
        return Err(ParseError::InvalidStringOperand {
            message: "expression's final output dtype must not be Str".to_string(),
            span: Span::empty(),
        });
    }
    validate_node(expr)
}

fn validate_node(expr: &Expr) -> ParseResult<()> {
    match expr {
        Expr::Constant { .. } | Expr::StringConstant { .. } | Expr::Variable { .. } => Ok(()),

        Expr::Convert { child, .. } => validate_node(child),

        Expr::Reduction { child, .. } => {
            if child.has_string() {
                return Err(ParseError::InvalidReductionArgument {
                    message: "reduction argument must not contain a string node".to_string(),
                    span: Span::empty(),
                });
            }
            validate_node(child)
        }

        Expr::Call { op, args, .. } => {
            if op.is_string_relation() || matches!(op, OpKind::Eq | OpKind::NotEq) {
                let string_sides: Vec<bool> = args.iter().map(|a| a.dtype() == Dtype::Str).collect();
                let any_string = string_sides.iter().any(|&s| s);
                let all_string = string_sides.iter().all(|&s| s);
                if any_string && !all_string {
                    return Err(ParseError::InvalidStringOperand {
                        message: "both sides of a string comparison must be string-typed".to_string(),
                        span: Span::empty(),
                    });
                }
            } else {
                for arg in args {
                    if arg.dtype() == Dtype::Str {
                        return Err(ParseError::InvalidStringOperand {
                            message: format!(
                                "{op:?} may only take a string operand as a direct operand of ==, !=, startswith, endswith, or contains"
                            ),
                            span: Span::empty(),
                        });
                    }
                }
            }

            for arg in args {
                validate_node(arg)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn string_const() -> Arc<Expr> {
        Arc::new(Expr::StringConstant { codepoints: Arc::from(vec!['a', '\0']), len: 1 })
    }

    fn numeric_const() -> Arc<Expr> {
        Arc::new(Expr::Constant { value: 1.0, dtype: Dtype::F64 })
    }

    #[test]
    fn test_string_equality_is_valid() {
        let call = Expr::call(OpKind::Eq, vec![string_const(), string_const()], Dtype::Bool);
        assert!(validate(&call).is_ok());
    }

    #[test]
    fn test_mixed_string_numeric_comparison_rejected() {
        let call = Expr::call(OpKind::Eq, vec![string_const(), numeric_const()], Dtype::Bool);
        assert!(validate(&call).is_err());
    }

    #[test]
    fn test_string_operand_outside_comparison_rejected() {
        let call = Expr::call(OpKind::Add, vec![string_const(), numeric_const()], Dtype::F64);
        assert!(validate(&call).is_err());
    }

    #[test]
    fn test_reduction_over_string_rejected() {
        let reduction = Expr::reduction(OpKind::Sum, string_const(), Dtype::I64);
        assert!(validate(&reduction).is_err());
    }

    #[test]
    fn test_final_str_output_rejected() {
        assert!(validate(&string_const()).is_err());
    }

    #[test]
    fn test_ordinary_numeric_expression_is_valid() {
        let call = Expr::call(OpKind::Add, vec![numeric_const(), numeric_const()], Dtype::F64);
        assert!(validate(&call).is_ok());
    }
}
