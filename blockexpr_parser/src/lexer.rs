//! Lexer wrapping the logos-generated `Token` with string-literal handling.
//!
//! Quoted content must not be fed back through the generated token rules
//! (an identifier regex inside a string literal would otherwise be
//! tokenized as an identifier), so — exactly as
//! `subset_julia_vm_parser::lexer::Lexer` does for block comments and
//! strings — the wrapper intercepts the opening quote, scans past the
//! closing quote itself with `memchr`, and restarts the inner lexer from
//! there.

use logos::Logos;

use crate::error::{ParseError, ParseResult};
use crate::span::{SourceMap, Span};
use crate::token::Token;

/// A token together with its span and source text.
#[derive(Debug, Clone)]
pub struct SpannedToken<'a> {
    pub token: Token,
    pub span: Span,
    pub text: &'a str,
}

/// Lexer for expression source text.
pub struct Lexer<'a> {
    source: &'a str,
    inner: logos::Lexer<'a, Token>,
    source_map: SourceMap,
    peeked: Option<Result<SpannedToken<'a>, ParseError>>,
    offset: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer over `source`.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            inner: Token::lexer(source),
            source_map: SourceMap::new(source),
            peeked: None,
            offset: 0,
        }
    }

    fn make_span(&self, start: usize, end: usize) -> Span {
        self.source_map.span(start, end)
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&mut self) -> Option<&Result<SpannedToken<'a>, ParseError>> {
        if self.peeked.is_none() {
            self.peeked = self.next_token_internal();
        }
        self.peeked.as_ref()
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Option<Result<SpannedToken<'a>, ParseError>> {
        if let Some(peeked) = self.peeked.take() {
            return Some(peeked);
        }
        self.next_token_internal()
    }

    fn next_token_internal(&mut self) -> Option<Result<SpannedToken<'a>, ParseError>> {
        let result = self.inner.next()?;
        let span = self.inner.span();
        let start = self.offset + span.start;
        let end = self.offset + span.end;

        match result {
            Ok(Token::DoubleQuote) | Ok(Token::SingleQuote) => {
                let quote = self.source.as_bytes()[start];
                match self.scan_string_to_close(end, quote) {
                    Ok(string_end) => {
                        self.restart_from(string_end);
                        let span = self.make_span(start, string_end);
                        let text = &self.source[start..string_end];
                        Some(Ok(SpannedToken {
                            token: if quote == b'"' {
                                Token::DoubleQuote
                            } else {
                                Token::SingleQuote
                            },
                            span,
                            text,
                        }))
                    }
                    Err(e) => {
                        self.restart_from(self.source.len());
                        Some(Err(e))
                    }
                }
            }
            Ok(token) => {
                let span = self.make_span(start, end);
                let text = &self.source[start..end];
                Some(Ok(SpannedToken { token, span, text }))
            }
            Err(()) => {
                let span = self.make_span(start, end);
                Some(Err(ParseError::LexerError { span }))
            }
        }
    }

    /// Scan string content (starting just after the opening quote) to find
    /// the matching closing quote, honoring backslash escapes. Uses
    /// `memchr` for SIMD-accelerated scanning, same as the teacher.
    fn scan_string_to_close(&self, start: usize, quote: u8) -> ParseResult<usize> {
        let bytes = self.source.as_bytes();
        let mut pos = start;

        while pos < bytes.len() {
            match memchr::memchr2(b'\\', quote, &bytes[pos..]) {
                None => break,
                Some(offset) => {
                    pos += offset;
                    if bytes[pos] == b'\\' {
                        if pos + 1 < bytes.len() {
                            pos += 2;
                            continue;
                        }
                        break;
                    }
                    return Ok(pos + 1);
                }
            }
        }

        Err(ParseError::UnterminatedString {
            span: self.make_span(start - 1, bytes.len()),
        })
    }

    /// Restart the inner logos lexer from an absolute byte position reached
    /// by our own manual scanning (e.g. past a string literal's closing
    /// quote).
    fn restart_from(&mut self, pos: usize) {
        self.peeked = None;
        if pos >= self.source.len() {
            self.inner = Token::lexer("");
            self.offset = self.source.len();
        } else {
            self.inner = Token::lexer(&self.source[pos..]);
            self.offset = pos;
        }
    }

    /// The full source text (used by the raw string-literal content between
    /// quotes, decoded by `crate::literal`).
    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<SpannedToken<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenize `source` into a vector of spanned tokens (used by tests and
/// diagnostics; the parser drives `Lexer` directly).
pub fn tokenize(source: &str) -> Vec<Result<SpannedToken<'_>, ParseError>> {
    Lexer::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_tokens() {
        let tokens: Vec<_> = tokenize("a + b")
            .into_iter()
            .filter_map(|r| r.ok())
            .map(|t| t.token)
            .collect();
        assert_eq!(tokens, vec![Token::Identifier, Token::Plus, Token::Identifier]);
    }

    #[test]
    fn test_string_literal_is_one_token() {
        let tokens: Vec<_> = tokenize(r#""hello world" + 1"#)
            .into_iter()
            .filter_map(|r| r.ok())
            .collect();
        assert_eq!(tokens.len(), 3); // string, +, number
        assert_eq!(tokens[0].text, "\"hello world\"");
    }

    #[test]
    fn test_string_with_escaped_quote() {
        let tokens: Vec<_> = tokenize(r#""a\"b" == "a\"b""#)
            .into_iter()
            .filter_map(|r| r.ok())
            .collect();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, r#""a\"b""#);
    }

    #[test]
    fn test_unterminated_string() {
        let results: Vec<_> = tokenize(r#""unterminated"#).into_iter().collect();
        assert!(results.iter().any(|r| r.is_err()));
    }

    #[test]
    fn test_identifier_inside_string_not_tokenized_as_identifier() {
        // "and" inside quotes must stay string content, not become KwAnd.
        let tokens: Vec<_> = tokenize(r#""and""#)
            .into_iter()
            .filter_map(|r| r.ok())
            .map(|t| t.token)
            .collect();
        assert_eq!(tokens, vec![Token::DoubleQuote]);
    }

    #[test]
    fn test_peek_then_next_agree() {
        let mut lexer = Lexer::new("a b");
        let peeked_text = lexer.peek().unwrap().as_ref().unwrap().text;
        assert_eq!(peeked_text, "a");
        let next_text = lexer.next_token().unwrap().unwrap().text;
        assert_eq!(next_text, "a");
        let next2 = lexer.next_token().unwrap().unwrap().text;
        assert_eq!(next2, "b");
    }
}
