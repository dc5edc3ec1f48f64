//! Tokens of the expression language.
//!
//! The token set deliberately includes constructs the evaluator rejects
//! (attribute dots, brackets, assignment, boolean keywords) so the parser
//! can name them instead of reporting a generic syntax error.

use std::fmt;
use std::ops::Range;

use logos::Logos;

use crate::{Error, Result};

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    #[regex(r"[0-9][0-9_]*", |lex| lex.slice().replace('_', "").parse::<i64>().ok())]
    #[regex(r"0[xX][0-9a-fA-F_]+", |lex| i64::from_str_radix(&lex.slice()[2..].replace('_', ""), 16).ok())]
    #[regex(r"0[bB][01_]+", |lex| i64::from_str_radix(&lex.slice()[2..].replace('_', ""), 2).ok())]
    #[regex(r"0[oO][0-7_]+", |lex| i64::from_str_radix(&lex.slice()[2..].replace('_', ""), 8).ok())]
    Int(i64),

    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9]+)?", |lex| lex.slice().replace('_', "").parse::<f64>().ok())]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9]+)?", |lex| lex.slice().replace('_', "").parse::<f64>().ok())]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+", |lex| lex.slice().replace('_', "").parse::<f64>().ok())]
    Real(f64),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| unescape(lex.slice()))]
    Str(String),

    #[token("true")]
    #[token("True")]
    True,
    #[token("false")]
    #[token("False")]
    False,

    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,
    #[token("lambda")]
    Lambda,
    #[token("in")]
    In,
    #[token("is")]
    Is,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("**")]
    StarStar,
    #[token("/")]
    Slash,
    #[token("//")]
    SlashSlash,
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
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,

    #[token(".")]
    Dot,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("=")]
    Assign,
    #[token(":=")]
    Walrus,
    #[token("@")]
    At,
}

fn unescape(quoted: &str) -> Option<String> {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            other @ ('\\' | '\'' | '"') => out.push(other),
            _ => return None,
        }
    }
    Some(out)
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Int(i) => return write!(f, "{i}"),
            Self::Real(r) => return write!(f, "{r:?}"),
            Self::Str(s) => return write!(f, "{s:?}"),
            Self::Ident(id) => return f.write_str(id),
            Self::True => "True",
            Self::False => "False",
            Self::If => "if",
            Self::Else => "else",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::Lambda => "lambda",
            Self::In => "in",
            Self::Is => "is",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::StarStar => "**",
            Self::Slash => "/",
            Self::SlashSlash => "//",
            Self::Percent => "%",
            Self::Amp => "&",
            Self::Pipe => "|",
            Self::Caret => "^",
            Self::Tilde => "~",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::EqEq => "==",
            Self::BangEq => "!=",
            Self::Question => "?",
            Self::Colon => ":",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::Comma => ",",
            Self::Dot => ".",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::Assign => "=",
            Self::Walrus => ":=",
            Self::At => "@",
        };
        f.write_str(s)
    }
}

/// Tokenize `source`, pairing each token with its byte span.
pub fn tokenize(source: &str) -> Result<Vec<(Token, Range<usize>)>> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next() {
        match token {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => {
                let span = lexer.span();
                return Err(Error::syntax(
                    span.start,
                    format!("invalid token '{}'", &source[span]),
                ));
            }
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn numbers() {
        assert_eq!(
            kinds("42 1_000 0xFF 0b1010 3.5 1e3 .5"),
            vec![
                Token::Int(42),
                Token::Int(1000),
                Token::Int(255),
                Token::Int(10),
                Token::Real(3.5),
                Token::Real(1000.0),
                Token::Real(0.5),
            ]
        );
    }

    #[test]
    fn operators_prefer_longest_match() {
        assert_eq!(
            kinds("a ** b // c << d <= e"),
            vec![
                Token::Ident("a".into()),
                Token::StarStar,
                Token::Ident("b".into()),
                Token::SlashSlash,
                Token::Ident("c".into()),
                Token::Shl,
                Token::Ident("d".into()),
                Token::LtEq,
                Token::Ident("e".into()),
            ]
        );
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("True false if iffy"),
            vec![Token::True, Token::False, Token::If, Token::Ident("iffy".into())]
        );
    }

    #[test]
    fn strings_unescape() {
        assert_eq!(kinds(r#"'a\'b' "c\nd""#), vec![Token::Str("a'b".into()), Token::Str("c\nd".into())]);
    }

    #[test]
    fn integer_overflow_is_a_syntax_error() {
        let err = tokenize("99999999999999999999").unwrap_err();
        assert!(matches!(err, Error::Syntax { offset: 0, .. }));
    }

    #[test]
    fn unknown_character_is_rejected() {
        let err = tokenize("a $ b").unwrap_err();
        assert!(matches!(err, Error::Syntax { offset: 2, .. }));
    }
}
