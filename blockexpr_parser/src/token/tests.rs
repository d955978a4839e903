use super::*;

fn lex(source: &str) -> Vec<Token> {
    Token::lexer(source).filter_map(|r| r.ok()).collect()
}

#[test]
fn test_longest_match_operators() {
    assert_eq!(lex("**"), vec![Token::StarStar]);
    assert_eq!(lex("&&"), vec![Token::AndAnd]);
    assert_eq!(lex("<="), vec![Token::LtEq]);
    assert_eq!(lex("< <"), vec![Token::Lt, Token::Lt]); // whitespace prevents merging into <<
}

#[test]
fn test_reserved_words() {
    assert_eq!(lex("and or not"), vec![Token::KwAnd, Token::KwOr, Token::KwNot]);
}

#[test]
fn test_identifier_vs_keyword() {
    assert_eq!(lex("andx"), vec![Token::Identifier]);
    assert_eq!(lex("and_x"), vec![Token::Identifier]);
}

#[test]
fn test_number_flavors() {
    assert_eq!(lex("42"), vec![Token::IntLiteral]);
    assert_eq!(lex("4.2"), vec![Token::FloatLiteral]);
    assert_eq!(lex("4e10"), vec![Token::FloatLiteral]);
    assert_eq!(lex(".5"), vec![Token::FloatLiteral]);
}

#[test]
fn test_parens_and_comma() {
    assert_eq!(
        lex("f(x, y)"),
        vec![
            Token::Identifier,
            Token::LParen,
            Token::Identifier,
            Token::Comma,
            Token::Identifier,
            Token::RParen,
        ]
    );
}
