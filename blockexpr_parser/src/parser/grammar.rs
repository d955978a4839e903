//! The precedence grammar (spec.md §4.2), one function per level.

use std::sync::Arc;

use crate::builtins::OpKind;
use crate::dtype::{common_type, Dtype};
use crate::error::{ParseError, ParseResult};
use crate::literal::{decode_string_literal, parse_numeric_literal};
use crate::node::Expr;
use crate::span::Span;
use crate::token::Token;

use super::Parser;

/// Build a binary `Call` node, stamping its result dtype per spec.md
/// §4.3: comparisons and logical ops are always `Bool`, shifts take the
/// left operand's dtype, everything else takes the common type. Only
/// `==`/`!=` among these ever accept a string operand (all other binary
/// operators reject one here instead of reaching `common_type`, which
/// asserts `Str` never appears).
fn binary_node(op: OpKind, left: Arc<Expr>, right: Arc<Expr>, span: Span) -> ParseResult<Arc<Expr>> {
    let dtype = if op.is_comparison() || op.is_logical() {
        if !op.accepts_string_operand() && (left.dtype() == Dtype::Str || right.dtype() == Dtype::Str) {
            return Err(ParseError::InvalidStringOperand {
                message: format!("{op:?} does not accept a string operand"),
                span,
            });
        }
        Dtype::Bool
    } else if op.is_shift() {
        left.dtype()
    } else {
        if left.dtype() == Dtype::Str || right.dtype() == Dtype::Str {
            return Err(ParseError::InvalidStringOperand {
                message: format!("{op:?} does not accept a string operand"),
                span,
            });
        }
        common_type(left.dtype(), right.dtype())
    };

    Ok(Arc::new(Expr::call(op, vec![left, right], dtype)))
}

fn unary_node(op: OpKind, child: Arc<Expr>, span: Span) -> ParseResult<Arc<Expr>> {
    if op != OpKind::Not && child.dtype() == Dtype::Str {
        return Err(ParseError::InvalidStringOperand {
            message: format!("{op:?} does not accept a string operand"),
            span,
        });
    }

    let dtype = if op == OpKind::Not { Dtype::Bool } else { child.dtype() };

    Ok(Arc::new(Expr::call(op, vec![child], dtype)))
}

impl<'a> Parser<'a> {
    /// `list ← logical_or (',' logical_or)*`
    ///
    /// A bare list of comma-separated expressions is only meaningful as
    /// the argument list of a `functionK` call (see `calls.rs`); at the
    /// top level a single `logical_or` is the common case and the `','`
    /// arm is exercised only inside nested `'(' list ')'` base productions
    /// that happen to be multi-valued — which `validate` rejects unless
    /// consumed by an enclosing call, matching spec.md §4.2's grammar.
    pub(crate) fn parse_list(&mut self) -> ParseResult<Arc<Expr>> {
        let first = self.parse_logical_or()?;
        if !self.check(&Token::Comma) {
            return Ok(first);
        }
        // A bare comma-list with nothing to consume it is a syntax error;
        // callers that expect a list (function-call argument parsing)
        // call `parse_logical_or` directly per-argument instead of going
        // through `parse_list`, so reaching here at the top level means
        // the expression is malformed.
        Err(ParseError::ExpectedExpression {
            found: ",".to_string(),
            span: self.current_span(),
        })
    }

    /// `logical_or ← logical_and (('or'|'||') logical_and)*`
    pub(crate) fn parse_logical_or(&mut self) -> ParseResult<Arc<Expr>> {
        let mut left = self.parse_logical_and()?;
        while self.check_any(&[Token::KwOr, Token::OrOr]) {
            let span = self.current_span();
            self.advance();
            let right = self.parse_logical_and()?;
            left = binary_node(OpKind::Or, left, right, span)?;
        }
        Ok(left)
    }

    /// `logical_and ← logical_not (('and'|'&&') logical_not)*`
    pub(crate) fn parse_logical_and(&mut self) -> ParseResult<Arc<Expr>> {
        let mut left = self.parse_logical_not()?;
        while self.check_any(&[Token::KwAnd, Token::AndAnd]) {
            let span = self.current_span();
            self.advance();
            let right = self.parse_logical_not()?;
            left = binary_node(OpKind::And, left, right, span)?;
        }
        Ok(left)
    }

    /// `logical_not ← ('not'|'!') logical_not | comparison`
    pub(crate) fn parse_logical_not(&mut self) -> ParseResult<Arc<Expr>> {
        if self.check_any(&[Token::KwNot, Token::Bang]) {
            let span = self.current_span();
            self.advance();
            let child = self.parse_logical_not()?;
            return unary_node(OpKind::Not, child, span);
        }
        self.parse_comparison()
    }

    /// `comparison ← bitwise_or (('<'|'>'|'<='|'>='|'=='|'!=') bitwise_or)*`
    pub(crate) fn parse_comparison(&mut self) -> ParseResult<Arc<Expr>> {
        let mut left = self.parse_bitwise_or()?;
        loop {
            let op = match self.current.as_ref().map(|t| &t.token) {
                Some(Token::Lt) => OpKind::Lt,
                Some(Token::Gt) => OpKind::Gt,
                Some(Token::LtEq) => OpKind::LtEq,
                Some(Token::GtEq) => OpKind::GtEq,
                Some(Token::EqEq) => OpKind::Eq,
                Some(Token::NotEq) => OpKind::NotEq,
                _ => break,
            };
            let span = self.current_span();
            self.advance();
            let right = self.parse_bitwise_or()?;
            left = binary_node(op, left, right, span)?;
        }
        Ok(left)
    }

    /// `bitwise_or ← bitwise_xor ('|' bitwise_xor)*`
    pub(crate) fn parse_bitwise_or(&mut self) -> ParseResult<Arc<Expr>> {
        let mut left = self.parse_bitwise_xor()?;
        while self.check(&Token::Pipe) {
            let span = self.current_span();
            self.advance();
            let right = self.parse_bitwise_xor()?;
            left = binary_node(OpKind::BitOr, left, right, span)?;
        }
        Ok(left)
    }

    /// `bitwise_xor ← bitwise_and ('^' bitwise_and)*`
    pub(crate) fn parse_bitwise_xor(&mut self) -> ParseResult<Arc<Expr>> {
        let mut left = self.parse_bitwise_and()?;
        while self.check(&Token::Caret) {
            let span = self.current_span();
            self.advance();
            let right = self.parse_bitwise_and()?;
            left = binary_node(OpKind::BitXor, left, right, span)?;
        }
        Ok(left)
    }

    /// `bitwise_and ← shift ('&' shift)*`
    pub(crate) fn parse_bitwise_and(&mut self) -> ParseResult<Arc<Expr>> {
        let mut left = self.parse_shift()?;
        while self.check(&Token::Amp) {
            let span = self.current_span();
            self.advance();
            let right = self.parse_shift()?;
            left = binary_node(OpKind::BitAnd, left, right, span)?;
        }
        Ok(left)
    }

    /// `shift ← add (('<<'|'>>') add)*`
    pub(crate) fn parse_shift(&mut self) -> ParseResult<Arc<Expr>> {
        let mut left = self.parse_add()?;
        loop {
            let op = match self.current.as_ref().map(|t| &t.token) {
                Some(Token::LtLt) => OpKind::Shl,
                Some(Token::GtGt) => OpKind::Shr,
                _ => break,
            };
            let span = self.current_span();
            self.advance();
            let right = self.parse_add()?;
            left = binary_node(op, left, right, span)?;
        }
        Ok(left)
    }

    /// `add ← term (('+'|'-') term)*`
    pub(crate) fn parse_add(&mut self) -> ParseResult<Arc<Expr>> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.current.as_ref().map(|t| &t.token) {
                Some(Token::Plus) => OpKind::Add,
                Some(Token::Minus) => OpKind::Sub,
                _ => break,
            };
            let span = self.current_span();
            self.advance();
            let right = self.parse_term()?;
            left = binary_node(op, left, right, span)?;
        }
        Ok(left)
    }

    /// `term ← factor (('*'|'/'|'%') factor)*`
    pub(crate) fn parse_term(&mut self) -> ParseResult<Arc<Expr>> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.current.as_ref().map(|t| &t.token) {
                Some(Token::Star) => OpKind::Mul,
                Some(Token::Slash) => OpKind::Div,
                Some(Token::Percent) => OpKind::Mod,
                _ => break,
            };
            let span = self.current_span();
            self.advance();
            let right = self.parse_factor()?;
            left = binary_node(op, left, right, span)?;
        }
        Ok(left)
    }

    /// `factor ← power ('**' power)*` (left-associative — spec.md §4.2
    /// notes right-associative as an optional variant; this engine keeps
    /// the required left-associative form).
    pub(crate) fn parse_factor(&mut self) -> ParseResult<Arc<Expr>> {
        let mut left = self.parse_power()?;
        while self.check(&Token::StarStar) {
            let span = self.current_span();
            self.advance();
            let right = self.parse_power()?;
            left = binary_node(OpKind::Pow, left, right, span)?;
        }
        Ok(left)
    }

    /// `power ← ('+'|'-'|'~') power | base`
    pub(crate) fn parse_power(&mut self) -> ParseResult<Arc<Expr>> {
        let op = match self.current.as_ref().map(|t| &t.token) {
            Some(Token::Plus) => Some(OpKind::Pos),
            Some(Token::Minus) => Some(OpKind::Neg),
            Some(Token::Tilde) => Some(OpKind::BitNot),
            _ => None,
        };
        if let Some(op) = op {
            let span = self.current_span();
            self.advance();
            let child = self.parse_power()?;
            return unary_node(op, child, span);
        }
        self.parse_base()
    }

    /// `base ← number | string | variable | function0('(' ')')? |
    ///         function1 power | functionK '(' comparison (',' comparison){K-1} ')' |
    ///         '(' list ')'`
    pub(crate) fn parse_base(&mut self) -> ParseResult<Arc<Expr>> {
        self.check_pending_error()?;

        let Some(token) = self.current.clone() else {
            return Err(ParseError::ExpectedExpression {
                found: "end of input".to_string(),
                span: self.current_span(),
            });
        };

        match token.token {
            Token::IntLiteral | Token::FloatLiteral => {
                self.advance();
                let lit = parse_numeric_literal(token.text, self.target_dtype, token.span)?;
                Ok(Arc::new(Expr::Constant { value: lit.value, dtype: lit.dtype }))
            }
            Token::DoubleQuote | Token::SingleQuote => {
                self.advance();
                let codepoints = decode_string_literal(token.text, token.span)?;
                let len = codepoints.len().saturating_sub(1); // exclude NUL terminator
                Ok(Arc::new(Expr::StringConstant {
                    codepoints: Arc::from(codepoints),
                    len,
                }))
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_list()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::Identifier => self.parse_identifier_base(token.text, token.span),
            _ => Err(ParseError::ExpectedExpression {
                found: token.text.to_string(),
                span: token.span,
            }),
        }
    }
}
