//! Precedence levels for the expression grammar (spec.md §4.2).
//!
//! The parser itself is not a generic precedence-climbing loop — it has one
//! function per grammar level, following spec.md's explicit grammar and the
//! teacher's convention of one `parse_*` function per construct. This table
//! exists purely as documentation-as-code and for `Token::binary_precedence`,
//! used by diagnostics that want to explain operator precedence without
//! walking the parser's call stack.

/// Precedence levels, lowest to highest, matching spec.md §4.2's grammar
/// from `list` down to `power`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    List,
    LogicalOr,
    LogicalAnd,
    LogicalNot,
    Comparison,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Shift,
    Add,
    Term,
    Factor,
    Power,
}

/// Operator associativity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

use super::Token;

impl Token {
    /// The precedence level and associativity of a binary operator, or
    /// `None` if this token never appears as a binary operator.
    pub fn binary_precedence(&self) -> Option<(Precedence, Associativity)> {
        use Associativity::*;
        use Precedence::*;
        Some(match self {
            Token::KwOr | Token::OrOr => (LogicalOr, Left),
            Token::KwAnd | Token::AndAnd => (LogicalAnd, Left),
            Token::Lt
            | Token::Gt
            | Token::LtEq
            | Token::GtEq
            | Token::EqEq
            | Token::NotEq => (Comparison, Left),
            Token::Pipe => (BitwiseOr, Left),
            Token::Caret => (BitwiseXor, Left),
            Token::Amp => (BitwiseAnd, Left),
            Token::LtLt | Token::GtGt => (Shift, Left),
            Token::Plus | Token::Minus => (Add, Left),
            Token::Star | Token::Slash | Token::Percent => (Term, Left),
            Token::StarStar => (Power, Left),
            _ => return None,
        })
    }
}
