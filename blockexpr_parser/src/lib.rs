//! Tokenizer, parser, dtype-promotion lattice, constant folding, and
//! post-parse validation for the blockexpr numeric expression engine.

pub mod builtins;
pub mod dtype;
pub mod error;
pub mod lexer;
pub mod literal;
pub mod node;
pub mod optimize;
mod parser;
pub mod span;
pub mod validate;
mod token;

pub use error::{ParseError, ParseResult};
pub use node::Expr;
pub use parser::{Parser, SymbolDecl};
pub use token::{Associativity, Precedence, Token};

use std::sync::Arc;

use dtype::Dtype;

/// Parse, optimize, and validate `source` into a finished expression tree
/// (spec.md §6.1's `compile`, minus the caller's `bound` pointer identity
/// — that lives on the runtime side, see `blockexpr_runtime::api`).
///
/// `target_dtype = None` means "infer from the expression" (spec.md's
/// `AUTO`).
pub fn compile(source: &str, symbols: &[SymbolDecl], target_dtype: Option<Dtype>) -> ParseResult<Arc<Expr>> {
    let tree = Parser::new(source, symbols, target_dtype).parse()?;
    let tree = optimize::optimize(tree)?;
    validate::validate(&tree)?;
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_simple_expression() {
        let symbols = [
            SymbolDecl { name: "a".into(), dtype: Dtype::F32, item_size: 4 },
            SymbolDecl { name: "b".into(), dtype: Dtype::F32, item_size: 4 },
            SymbolDecl { name: "c".into(), dtype: Dtype::F32, item_size: 4 },
        ];
        let expr = compile("a*b+c", &symbols, None).unwrap();
        assert_eq!(expr.dtype(), Dtype::F32);
    }

    #[test]
    fn test_compile_rejects_str_output() {
        let symbols = [SymbolDecl { name: "s".into(), dtype: Dtype::Str, item_size: 16 }];
        let result = compile("s", &symbols, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_compile_pow_square_folds_away() {
        let symbols = [SymbolDecl { name: "x".into(), dtype: Dtype::F64, item_size: 8 }];
        let expr = compile("x**2", &symbols, None).unwrap();
        fn contains_pow(e: &Expr) -> bool {
            match e {
                Expr::Call { op, args, .. } => {
                    *op == crate::builtins::OpKind::Pow || args.iter().any(|a| contains_pow(a))
                }
                Expr::Convert { child, .. } | Expr::Reduction { child, .. } => contains_pow(child),
                _ => false,
            }
        }
        assert!(!contains_pow(&expr));
    }

    #[test]
    fn test_compile_unknown_identifier() {
        let result = compile("nonexistent_var", &[], None);
        assert!(matches!(result, Err(ParseError::UnknownIdentifier { .. })));
    }

    #[test]
    fn test_compile_where_expression() {
        let symbols = [SymbolDecl { name: "a".into(), dtype: Dtype::I32, item_size: 4 }];
        let expr = compile("where(a>0, a, -a)", &symbols, None).unwrap();
        assert_eq!(expr.dtype(), Dtype::I32);
    }

    #[test]
    fn test_compile_string_equality() {
        let symbols = [
            SymbolDecl { name: "s".into(), dtype: Dtype::Str, item_size: 16 },
            SymbolDecl { name: "t".into(), dtype: Dtype::Str, item_size: 16 },
        ];
        let expr = compile("s == t", &symbols, None).unwrap();
        assert_eq!(expr.dtype(), Dtype::Bool);
    }
}
