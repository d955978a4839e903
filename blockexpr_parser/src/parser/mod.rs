//! Recursive-descent parser (spec.md §4.2).
//!
//! One function per grammar level, not a generic precedence-climbing
//! loop — each level's name matches the grammar directly (`parse_add`,
//! `parse_term`, …) so the call stack mirrors the precedence table.

mod calls;
mod grammar;

use std::sync::Arc;

use crate::dtype::Dtype;
use crate::error::{ParseError, ParseResult};
use crate::lexer::{Lexer, SpannedToken};
use crate::node::Expr;
use crate::span::{SourceMap, Span};
use crate::token::Token;

/// A caller-declared variable available to the expression.
#[derive(Debug, Clone)]
pub struct SymbolDecl {
    pub name: String,
    pub dtype: Dtype,
    pub item_size: usize,
}

pub struct Parser<'a> {
    pub(crate) source: &'a str,
    pub(crate) lexer: Lexer<'a>,
    pub(crate) source_map: SourceMap,
    pub(crate) current: Option<SpannedToken<'a>>,
    pub(crate) symbols: &'a [SymbolDecl],
    pub(crate) target_dtype: Option<Dtype>,
    /// A lexer error observed during `advance`, surfaced the next time a
    /// grammar function asks for a token (there is no error-recovery mode
    /// here, so the first lexer error always wins).
    pub(crate) pending_error: Option<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, symbols: &'a [SymbolDecl], target_dtype: Option<Dtype>) -> Self {
        let source_map = SourceMap::new(source);
        let mut parser = Self {
            source,
            lexer: Lexer::new(source),
            source_map,
            current: None,
            symbols,
            target_dtype,
            pending_error: None,
        };
        parser.advance();
        parser
    }

    /// Parse the full source into a single expression tree (spec.md §4.2
    /// grammar root: `list`).
    pub fn parse(mut self) -> ParseResult<Arc<Expr>> {
        self.check_pending_error()?;
        let expr = self.parse_list()?;
        self.check_pending_error()?;
        if !self.is_at_end() {
            let found = self
                .current
                .as_ref()
                .map(|t| t.text.to_string())
                .unwrap_or_else(|| "end of input".to_string());
            return Err(ParseError::ExpectedExpression {
                found,
                span: self.current_span(),
            });
        }
        Ok(expr)
    }

    // ==================== Token management ====================

    pub(crate) fn advance(&mut self) -> Option<SpannedToken<'a>> {
        let prev = self.current.take();
        loop {
            match self.lexer.next_token() {
                Some(Ok(token)) => {
                    self.current = Some(token);
                    break;
                }
                Some(Err(e)) => {
                    // A lexer error becomes the token itself the first time
                    // it's observed; store it so `advance`'s caller sees it
                    // via `expect`/`parse_base`. We surface it immediately
                    // since there is no error-recovery mode here (unlike an
                    // editor-oriented parser — see crate::error).
                    self.current = None;
                    self.pending_error = Some(e);
                    break;
                }
                None => {
                    self.current = None;
                    break;
                }
            }
        }
        prev
    }

    pub(crate) fn check(&self, expected: &Token) -> bool {
        self.current.as_ref().map(|t| &t.token == expected).unwrap_or(false)
    }

    pub(crate) fn check_any(&self, expected: &[Token]) -> bool {
        self.current.as_ref().map(|t| expected.contains(&t.token)).unwrap_or(false)
    }

    pub(crate) fn current_span(&self) -> Span {
        self.current
            .as_ref()
            .map(|t| t.span)
            .unwrap_or_else(|| self.source_map.span(self.source.len(), self.source.len()))
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current.is_none()
    }

    /// Surface a lexer error observed since the last check, if any.
    pub(crate) fn check_pending_error(&mut self) -> ParseResult<()> {
        match self.pending_error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub(crate) fn expect(&mut self, expected: Token) -> ParseResult<SpannedToken<'a>> {
        if self.check(&expected) {
            Ok(self.advance().unwrap())
        } else {
            Err(ParseError::ExpectedExpression {
                found: self.current_text(),
                span: self.current_span(),
            })
        }
    }

    pub(crate) fn current_text(&self) -> String {
        self.current
            .as_ref()
            .map(|t| t.text.to_string())
            .unwrap_or_else(|| "end of input".to_string())
    }
}
