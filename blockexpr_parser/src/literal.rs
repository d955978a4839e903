//! Numeric and string literal semantics (spec.md §4.1).

use crate::dtype::Dtype;
use crate::error::{ParseError, ParseResult};
use crate::span::Span;

/// A decoded numeric literal: the value (always carried as `f64`, the
/// dtype tells how to narrow it at constant-fold time) and the inferred
/// dtype.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericLiteral {
    pub value: f64,
    pub dtype: Dtype,
}

/// Whether a numeric literal's source text is float-flavored (contains
/// `.`, `e`, or `E`) or integer-flavored.
fn is_float_flavored(text: &str) -> bool {
    text.contains('.') || text.contains('e') || text.contains('E')
}

/// Classify and parse a numeric literal's source text, given the
/// `target_dtype` hint used exclusively to classify numeric literals.
///
/// - Float-flavored literals take dtype F32 when `target_dtype` is F32,
///   otherwise F64.
/// - Integer-flavored literals outside the range of signed 32-bit take
///   I64; within range they adopt `target_dtype` if it is an integer
///   dtype, else I32.
pub fn parse_numeric_literal(
    text: &str,
    target_dtype: Option<Dtype>,
    span: Span,
) -> ParseResult<NumericLiteral> {
    if is_float_flavored(text) {
        let value: f64 = text.parse().map_err(|_| ParseError::InvalidNumber {
            literal: text.to_string(),
            span,
        })?;
        let dtype = if target_dtype == Some(Dtype::F32) {
            Dtype::F32
        } else {
            Dtype::F64
        };
        return Ok(NumericLiteral { value, dtype });
    }

    let as_i64: i64 = text.parse().map_err(|_| ParseError::InvalidNumber {
        literal: text.to_string(),
        span,
    })?;

    let dtype = if as_i64 < i32::MIN as i64 || as_i64 > i32::MAX as i64 {
        Dtype::I64
    } else {
        match target_dtype {
            Some(t) if t.is_integer() => t,
            _ => Dtype::I32,
        }
    };

    Ok(NumericLiteral {
        value: as_i64 as f64,
        dtype,
    })
}

/// A decoded UTF-32 string literal (as a `Vec<char>`; each `char` is one
/// UTF-32 code point, including a trailing NUL terminator per spec.md
/// §4.1 — "a trailing null code-point terminates the buffer").
pub fn decode_string_literal(raw: &str, span: Span) -> ParseResult<Vec<char>> {
    // `raw` includes the surrounding quote characters.
    let inner = &raw[1..raw.len() - 1];
    let mut out = Vec::with_capacity(inner.len() + 1);
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let escape = chars.next().ok_or_else(|| ParseError::BadEscape {
            sequence: "\\".to_string(),
            span,
        })?;

        match escape {
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'u' => out.push(decode_hex_escape(&mut chars, 4, span)?),
            'U' => out.push(decode_hex_escape(&mut chars, 8, span)?),
            other => {
                return Err(ParseError::BadEscape {
                    sequence: format!("\\{other}"),
                    span,
                })
            }
        }
    }

    out.push('\0');
    Ok(out)
}

fn decode_hex_escape(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
    span: Span,
) -> ParseResult<char> {
    let mut hex = String::with_capacity(digits);
    for _ in 0..digits {
        match chars.next() {
            Some(c) if c.is_ascii_hexdigit() => hex.push(c),
            _ => {
                return Err(ParseError::BadEscape {
                    sequence: format!("\\u{hex}"),
                    span,
                })
            }
        }
    }

    let code = u32::from_str_radix(&hex, 16).map_err(|_| ParseError::BadEscape {
        sequence: format!("\\u{hex}"),
        span,
    })?;

    if code > 0x10FFFF || (0xD800..=0xDFFF).contains(&code) {
        return Err(ParseError::BadEscape {
            sequence: format!("\\u{hex}"),
            span,
        });
    }

    char::from_u32(code).ok_or(ParseError::BadEscape {
        sequence: format!("\\u{hex}"),
        span,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::empty()
    }

    #[test]
    fn test_integer_flavored_default() {
        let lit = parse_numeric_literal("42", None, span()).unwrap();
        assert_eq!(lit.dtype, Dtype::I32);
        assert_eq!(lit.value, 42.0);
    }

    #[test]
    fn test_integer_flavored_with_target() {
        let lit = parse_numeric_literal("42", Some(Dtype::I64), span()).unwrap();
        assert_eq!(lit.dtype, Dtype::I64);
    }

    #[test]
    fn test_integer_flavored_target_not_integer_falls_back_to_i32() {
        let lit = parse_numeric_literal("42", Some(Dtype::F32), span()).unwrap();
        assert_eq!(lit.dtype, Dtype::I32);
    }

    #[test]
    fn test_integer_flavored_out_of_i32_range() {
        let lit = parse_numeric_literal("99999999999", Some(Dtype::I32), span()).unwrap();
        assert_eq!(lit.dtype, Dtype::I64);
    }

    #[test]
    fn test_float_flavored_default_f64() {
        let lit = parse_numeric_literal("4.2", None, span()).unwrap();
        assert_eq!(lit.dtype, Dtype::F64);
    }

    #[test]
    fn test_float_flavored_with_f32_target() {
        let lit = parse_numeric_literal("4.2", Some(Dtype::F32), span()).unwrap();
        assert_eq!(lit.dtype, Dtype::F32);
    }

    #[test]
    fn test_exponent_is_float_flavored() {
        let lit = parse_numeric_literal("4e10", None, span()).unwrap();
        assert_eq!(lit.dtype, Dtype::F64);
    }

    #[test]
    fn test_decode_simple_string() {
        let decoded = decode_string_literal("\"hello\"", span()).unwrap();
        assert_eq!(decoded, vec!['h', 'e', 'l', 'l', 'o', '\0']);
    }

    #[test]
    fn test_decode_escapes() {
        let decoded = decode_string_literal("\"a\\nb\\tc\"", span()).unwrap();
        assert_eq!(decoded, vec!['a', '\n', 'b', '\t', 'c', '\0']);
    }

    #[test]
    fn test_decode_unicode_escape() {
        let decoded = decode_string_literal("\"\\u0041\"", span()).unwrap();
        assert_eq!(decoded, vec!['A', '\0']);
    }

    #[test]
    fn test_decode_long_unicode_escape() {
        let decoded = decode_string_literal("\"\\U0001F600\"", span()).unwrap();
        assert_eq!(decoded[0] as u32, 0x1F600);
    }

    #[test]
    fn test_decode_rejects_surrogate() {
        let err = decode_string_literal("\"\\uD800\"", span());
        assert!(err.is_err());
    }

    #[test]
    fn test_decode_rejects_out_of_range() {
        let err = decode_string_literal("\"\\U00110000\"", span());
        assert!(err.is_err());
    }

    #[test]
    fn test_decode_rejects_unknown_escape() {
        let err = decode_string_literal("\"\\q\"", span());
        assert!(err.is_err());
    }
}
