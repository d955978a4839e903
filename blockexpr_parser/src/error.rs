//! Parse error types.
//!
//! Reasons are restricted to the set spec.md §6.4 names; `compile()` stops
//! at the first error rather than collecting and recovering (unlike the
//! teacher's editor-oriented `ParseErrors` collection, which this engine has
//! no use for — see DESIGN.md).

use crate::span::Span;
use thiserror::Error;

/// A parse error with the span it occurred at.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Identifier not found in the caller's symbol table or the builtin table.
    #[error("unknown identifier '{name}' at {span:?}")]
    UnknownIdentifier { name: String, span: Span },

    /// A string literal was never closed before end of input.
    #[error("unterminated string literal starting at {span:?}")]
    UnterminatedString { span: Span },

    /// An escape sequence inside a string literal was malformed.
    #[error("invalid escape sequence '{sequence}' at {span:?}")]
    BadEscape { sequence: String, span: Span },

    /// A function call was given the wrong number of arguments for its arity.
    #[error("wrong arity for '{name}': expected {expected}, found {found} at {span:?}")]
    WrongArity {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    /// A closing parenthesis didn't match an open one (or vice versa).
    #[error("mismatched parenthesis at {span:?}")]
    MismatchedParenthesis { span: Span },

    /// A string-typed value appeared somewhere other than a direct operand
    /// of `==`, `!=`, `startswith`, `endswith`, or `contains`.
    #[error("invalid string operand at {span:?}: {message}")]
    InvalidStringOperand { message: String, span: Span },

    /// A reduction's argument subtree contained a string node.
    #[error("invalid reduction argument at {span:?}: {message}")]
    InvalidReductionArgument { message: String, span: Span },

    /// The parser expected an expression but found something else (or EOF).
    #[error("expected expression at {span:?}, found {found}")]
    ExpectedExpression { found: String, span: Span },

    /// Catch-all for a malformed numeric literal.
    #[error("invalid number literal '{literal}' at {span:?}")]
    InvalidNumber { literal: String, span: Span },

    /// An unrecognized byte sequence that no token rule matches.
    #[error("unrecognized token at {span:?}")]
    LexerError { span: Span },
}

impl ParseError {
    /// The span the error occurred at.
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnknownIdentifier { span, .. } => *span,
            ParseError::UnterminatedString { span } => *span,
            ParseError::BadEscape { span, .. } => *span,
            ParseError::WrongArity { span, .. } => *span,
            ParseError::MismatchedParenthesis { span } => *span,
            ParseError::InvalidStringOperand { span, .. } => *span,
            ParseError::InvalidReductionArgument { span, .. } => *span,
            ParseError::ExpectedExpression { span, .. } => *span,
            ParseError::InvalidNumber { span, .. } => *span,
            ParseError::LexerError { span } => *span,
        }
    }

    /// The byte offset the error occurred at — the `position` half of
    /// spec.md §6.4's `ParseError{position, reason}`.
    pub fn position(&self) -> usize {
        self.span().start
    }

    /// Render the error with the offending source line and a `^` marker,
    /// for terminal-friendly diagnostics.
    pub fn format_with_context(&self, source: &str) -> String {
        let span = self.span();
        let lines: Vec<&str> = source.lines().collect();
        let line_idx = span.start_line.saturating_sub(1);

        if line_idx >= lines.len() {
            return String::new();
        }

        let line = lines[line_idx];
        let col = span.start_column.saturating_sub(1);
        let len = if span.start_line == span.end_line {
            span.end_column.saturating_sub(span.start_column).max(1)
        } else {
            1
        };

        let spaces = " ".repeat(col);
        let marker = "^".repeat(len.min(line.len().saturating_sub(col)).max(1));

        format!(
            "  {} | {}\n  {} | {}{}",
            span.start_line,
            line,
            " ".repeat(span.start_line.to_string().len()),
            spaces,
            marker
        )
    }
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_matches_span_start() {
        let span = Span::new(5, 8, 1, 1, 6, 9);
        let err = ParseError::UnknownIdentifier {
            name: "foo".into(),
            span,
        };
        assert_eq!(err.position(), 5);
    }

    #[test]
    fn test_format_with_context() {
        let source = "a + @";
        let span = Span::new(4, 5, 1, 5, 1, 6);
        let err = ParseError::LexerError { span };
        let context = err.format_with_context(source);
        assert!(context.contains("a + @"));
        assert!(context.contains('^'));
    }

    #[test]
    fn test_wrong_arity_message() {
        let span = Span::new(0, 3, 1, 1, 1, 4);
        let err = ParseError::WrongArity {
            name: "atan2".into(),
            expected: 2,
            found: 1,
            span,
        };
        assert!(err.to_string().contains("atan2"));
        assert!(err.to_string().contains("expected 2"));
    }
}
