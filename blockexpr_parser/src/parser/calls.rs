//! Identifier resolution: variables, builtin function calls, and the
//! nullary constants (spec.md §4.2's `base` production beyond literals).

use std::f64::consts::{E, PI};
use std::sync::Arc;

use crate::builtins::{lookup_builtin, OpKind};
use crate::dtype::{any_all_dtype, common_type, mean_dtype, min_max_dtype, sum_prod_dtype, Dtype};
use crate::error::{ParseError, ParseResult};
use crate::node::Expr;
use crate::span::Span;
use crate::token::Token;

use super::Parser;

impl<'a> Parser<'a> {
    pub(crate) fn parse_identifier_base(&mut self, name: &str, span: Span) -> ParseResult<Arc<Expr>> {
        self.advance(); // consume the identifier

        if let Some(decl) = self.symbols.iter().find(|s| s.name == name) {
            return Ok(Arc::new(Expr::Variable {
                name: Arc::from(decl.name.as_str()),
                dtype: decl.dtype,
                item_size: decl.item_size,
            }));
        }

        let Some(entry) = lookup_builtin(name) else {
            return Err(ParseError::UnknownIdentifier { name: name.to_string(), span });
        };

        match entry.op {
            OpKind::Pi => {
                self.consume_optional_empty_parens()?;
                Ok(Arc::new(Expr::Constant { value: PI, dtype: Dtype::F64 }))
            }
            OpKind::E => {
                self.consume_optional_empty_parens()?;
                Ok(Arc::new(Expr::Constant { value: E, dtype: Dtype::F64 }))
            }
            op if entry.arity == 1 => {
                // `function1 power`: the single argument is the next
                // `power`-level expression, taken without parentheses —
                // `sin(x)` still works because `(x)` is itself a valid
                // `power` via the `'(' list ')'` base production.
                let arg = self.parse_power()?;
                self.build_call(op, vec![arg], span)
            }
            op => {
                let args = self.parse_paren_arg_list(entry.arity, name, span)?;
                self.build_call(op, args, span)
            }
        }
    }

    fn consume_optional_empty_parens(&mut self) -> ParseResult<()> {
        if self.check(&Token::LParen) {
            self.advance();
            self.expect(Token::RParen)?;
        }
        Ok(())
    }

    /// Parse `'(' comparison (',' comparison){K-1} ')'` for an arity-K≥2
    /// builtin call, enforcing exact arity.
    fn parse_paren_arg_list(&mut self, arity: usize, name: &str, span: Span) -> ParseResult<Vec<Arc<Expr>>> {
        self.expect(Token::LParen)?;
        let mut args = Vec::with_capacity(arity);

        if !self.check(&Token::RParen) {
            loop {
                args.push(self.parse_comparison()?);
                if self.check(&Token::Comma) {
                    self.advance();
                    continue;
                }
                break;
            }
        }

        self.expect(Token::RParen)?;

        if args.len() != arity {
            return Err(ParseError::WrongArity {
                name: name.to_string(),
                expected: arity,
                found: args.len(),
                span,
            });
        }

        Ok(args)
    }

    /// Build a `Call` or `Reduction` node for `op` over `args`, stamping
    /// the result dtype per spec.md §4.3.
    fn build_call(&self, op: OpKind, mut args: Vec<Arc<Expr>>, span: Span) -> ParseResult<Arc<Expr>> {
        if op.is_reduction() {
            let child = args.pop().expect("reductions are arity 1");
            if child.has_string() {
                return Err(ParseError::InvalidReductionArgument {
                    message: "reduction argument must not contain a string node".to_string(),
                    span,
                });
            }
            let dtype = match op {
                OpKind::Sum | OpKind::Prod => sum_prod_dtype(child.dtype()),
                OpKind::Mean => mean_dtype(child.dtype()),
                OpKind::Min | OpKind::Max => min_max_dtype(child.dtype()),
                OpKind::Any | OpKind::All => any_all_dtype(child.dtype()),
                _ => unreachable!(),
            };
            if (op == OpKind::Min || op == OpKind::Max) && dtype.is_complex() {
                // Open question resolved in DESIGN.md: reject rather than
                // invent an ordering or silently return zero.
                return Err(ParseError::InvalidReductionArgument {
                    message: format!("{op:?} is not defined over complex operands"),
                    span,
                });
            }
            return Ok(Arc::new(Expr::reduction(op, child, dtype)));
        }

        if !op.accepts_string_operand() {
            if let Some(bad) = args.iter().find(|a| a.dtype() == Dtype::Str) {
                let _ = bad;
                return Err(ParseError::InvalidStringOperand {
                    message: format!("{op:?} does not accept a string operand"),
                    span,
                });
            }
        }

        let dtype = stamp_call_dtype(op, &args);
        Ok(Arc::new(Expr::call(op, args, dtype)))
    }
}

/// The explicit-dtype rules for builtin function calls (spec.md §4.3):
/// string relations and comparisons always yield `Bool`; complex
/// selectors extract/pass through per their own rule; combinatorial
/// functions widen to `I64`; everything else takes the common type of
/// its arguments (identity function if arity 1).
fn stamp_call_dtype(op: OpKind, args: &[Arc<Expr>]) -> Dtype {
    if op.is_string_relation() {
        return Dtype::Bool;
    }

    match op {
        OpKind::Real | OpKind::Imag => {
            let child = args[0].dtype();
            match child {
                Dtype::C64 => Dtype::F32,
                Dtype::C128 => Dtype::F64,
                other => other,
            }
        }
        OpKind::Conj => args[0].dtype(),
        OpKind::Fac | OpKind::Ncr | OpKind::Npr => Dtype::I64,
        OpKind::Where => {
            // where(cond, x, y): cond is interpreted truthy, result dtype
            // is the common type of x and y.
            common_type(args[1].dtype(), args[2].dtype())
        }
        _ => args.iter().map(|a| a.dtype()).reduce(common_type).unwrap_or(Dtype::F64),
    }
}
