//! Token definitions for the expression grammar (spec.md §4.1).

mod precedence;
#[cfg(test)]
mod tests;

use logos::Logos;

pub use precedence::{Associativity, Precedence};

/// Tokens produced by the lexer.
///
/// Longest-match operators are listed before their single-character
/// prefixes so logos's default "longest match, then declaration order"
/// tie-break picks the multi-character form first.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    // ==================== Multi-character operators ====================
    #[token("**")]
    StarStar,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("<<")]
    LtLt,
    #[token(">>")]
    GtGt,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,

    // ==================== Single-character operators ====================
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("!")]
    Bang,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,

    // ==================== Parens / separators ====================
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,

    // ==================== Reserved words ====================
    #[token("and")]
    KwAnd,
    #[token("or")]
    KwOr,
    #[token("not")]
    KwNot,

    // ==================== Numeric literals ====================
    // Integer-flavored: plain decimal digits.
    #[regex(r"[0-9]+")]
    IntLiteral,
    // Float-flavored: contains '.', 'e', or 'E'.
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+")]
    FloatLiteral,

    // ==================== String literals ====================
    #[token("\"")]
    DoubleQuote,
    #[token("'")]
    SingleQuote,

    // ==================== Identifiers ====================
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", priority = 1)]
    Identifier,

    Error,
}

impl Token {
    /// Whether this token is one of the reserved logical words.
    pub fn is_reserved_word(&self) -> bool {
        matches!(self, Token::KwAnd | Token::KwOr | Token::KwNot)
    }

    /// Whether this token starts a numeric literal.
    pub fn is_number(&self) -> bool {
        matches!(self, Token::IntLiteral | Token::FloatLiteral)
    }
}
