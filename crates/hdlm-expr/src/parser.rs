//! Pratt parser producing [`Expr`] trees.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! conditional := pratt ( '?' conditional ':' conditional
//!                      | 'if' pratt 'else' conditional )?
//! pratt       := prefix ( binop pratt )*          precedence climbing
//! prefix      := ('-' | '+' | '~') pratt(UNARY) | postfix
//! postfix     := atom ( '(' args ')' )?
//! ```

use std::ops::Range;

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::builtins::Builtin;
use crate::lexer::{Token, tokenize};
use crate::{Error, Result, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Assoc {
    Left,
    Right,
    /// Comparisons: `a < b < c` is rejected rather than chained.
    None,
}

const UNARY_PREC: u8 = 100;

/// Binary operator metadata: (precedence, associativity, op).
/// Higher precedence binds tighter.
fn binary_op_info(token: &Token) -> Option<(u8, Assoc, BinaryOp)> {
    match token {
        Token::Lt => Some((30, Assoc::None, BinaryOp::Lt)),
        Token::LtEq => Some((30, Assoc::None, BinaryOp::Le)),
        Token::Gt => Some((30, Assoc::None, BinaryOp::Gt)),
        Token::GtEq => Some((30, Assoc::None, BinaryOp::Ge)),
        Token::EqEq => Some((30, Assoc::None, BinaryOp::Eq)),
        Token::BangEq => Some((30, Assoc::None, BinaryOp::Ne)),
        Token::Pipe => Some((40, Assoc::Left, BinaryOp::BitOr)),
        Token::Caret => Some((50, Assoc::Left, BinaryOp::BitXor)),
        Token::Amp => Some((60, Assoc::Left, BinaryOp::BitAnd)),
        Token::Shl => Some((70, Assoc::Left, BinaryOp::Shl)),
        Token::Shr => Some((70, Assoc::Left, BinaryOp::Shr)),
        Token::Plus => Some((80, Assoc::Left, BinaryOp::Add)),
        Token::Minus => Some((80, Assoc::Left, BinaryOp::Sub)),
        Token::Star => Some((90, Assoc::Left, BinaryOp::Mul)),
        Token::Slash => Some((90, Assoc::Left, BinaryOp::Div)),
        Token::SlashSlash => Some((90, Assoc::Left, BinaryOp::FloorDiv)),
        Token::Percent => Some((90, Assoc::Left, BinaryOp::Mod)),
        Token::StarStar => Some((110, Assoc::Right, BinaryOp::Pow)),
        _ => None,
    }
}

/// Name of a token that starts a construct outside the language, if any.
fn disallowed_construct(token: &Token) -> Option<&'static str> {
    match token {
        Token::And | Token::Or | Token::Not => Some("boolean operator"),
        Token::Lambda => Some("lambda"),
        Token::In | Token::Is => Some("membership/identity test"),
        Token::Dot => Some("attribute access"),
        Token::LBracket => Some("subscript"),
        Token::LBrace => Some("dict/set literal"),
        Token::Assign | Token::Walrus => Some("assignment"),
        Token::At => Some("matrix multiplication"),
        _ => None,
    }
}

/// Token cursor with byte offsets for error reporting.
struct TokenStream {
    tokens: Vec<(Token, Range<usize>)>,
    pos: usize,
    source_len: usize,
}

impl TokenStream {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(tok, _)| tok)
    }

    fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|(tok, _)| tok)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(tok, _)| tok.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Byte offset of the current token, or end of input.
    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(_, span)| span.start)
            .unwrap_or(self.source_len)
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        if self.peek() == Some(&expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("expected '{expected}'")))
        }
    }

    /// Error for the current token, naming disallowed constructs by kind.
    fn unexpected(&self, context: &str) -> Error {
        match self.peek() {
            Some(token) => match disallowed_construct(token) {
                Some(construct) => Error::disallowed(format!("{construct} '{token}'")),
                None => Error::syntax(self.offset(), format!("{context}, found '{token}'")),
            },
            None => Error::syntax(self.offset(), format!("{context}, found end of input")),
        }
    }
}

/// Parse an (already placeholder-substituted) expression.
pub fn parse(source: &str) -> Result<Expr> {
    let mut stream = TokenStream {
        tokens: tokenize(source)?,
        pos: 0,
        source_len: source.len(),
    };
    if stream.peek().is_none() {
        return Err(Error::syntax(0, "empty expression"));
    }

    let expr = parse_conditional(&mut stream)?;
    if stream.peek().is_some() {
        return Err(stream.unexpected("expected end of expression"));
    }
    Ok(expr)
}

fn parse_conditional(stream: &mut TokenStream) -> Result<Expr> {
    let first = parse_pratt(stream, 0)?;
    match stream.peek() {
        Some(Token::Question) => {
            stream.advance();
            let then = parse_conditional(stream)?;
            stream.expect(Token::Colon)?;
            let otherwise = parse_conditional(stream)?;
            Ok(Expr::Conditional {
                test: Box::new(first),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            })
        }
        Some(Token::If) => {
            stream.advance();
            let test = parse_pratt(stream, 0)?;
            stream.expect(Token::Else)?;
            let otherwise = parse_conditional(stream)?;
            Ok(Expr::Conditional {
                test: Box::new(test),
                then: Box::new(first),
                otherwise: Box::new(otherwise),
            })
        }
        _ => Ok(first),
    }
}

fn parse_pratt(stream: &mut TokenStream, min_prec: u8) -> Result<Expr> {
    let mut left = parse_prefix(stream)?;
    let mut after_comparison = false;

    while let Some(token) = stream.peek() {
        let Some((prec, assoc, op)) = binary_op_info(token) else {
            break;
        };
        if prec < min_prec {
            break;
        }
        if after_comparison && op.is_comparison() {
            return Err(Error::disallowed("chained comparison"));
        }
        stream.advance();

        let next_prec = if assoc == Assoc::Right { prec } else { prec + 1 };
        let right = parse_pratt(stream, next_prec)?;
        after_comparison = assoc == Assoc::None;

        left = Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
    }

    Ok(left)
}

fn parse_prefix(stream: &mut TokenStream) -> Result<Expr> {
    let op = match stream.peek() {
        Some(Token::Minus) => UnaryOp::Neg,
        Some(Token::Plus) => UnaryOp::Pos,
        Some(Token::Tilde) => UnaryOp::Invert,
        _ => return parse_postfix(stream),
    };
    stream.advance();
    let operand = parse_pratt(stream, UNARY_PREC)?;
    Ok(Expr::Unary {
        op,
        operand: Box::new(operand),
    })
}

fn parse_postfix(stream: &mut TokenStream) -> Result<Expr> {
    let expr = parse_atom(stream)?;

    match stream.peek() {
        Some(Token::LParen) => match expr {
            Expr::Ident(name) => {
                let function = Builtin::from_name(&name)
                    .ok_or(Error::FunctionNotAllowed { name })?;
                let args = parse_call_args(stream)?;
                Ok(Expr::Call { function, args })
            }
            _ => Err(Error::disallowed("call of a computed value")),
        },
        Some(Token::Dot) => Err(Error::disallowed("attribute access")),
        Some(Token::LBracket) => Err(Error::disallowed("subscript")),
        _ => Ok(expr),
    }
}

fn parse_call_args(stream: &mut TokenStream) -> Result<Vec<Expr>> {
    stream.expect(Token::LParen)?;
    let mut args = Vec::new();

    loop {
        match stream.peek() {
            Some(Token::RParen) => {
                stream.advance();
                return Ok(args);
            }
            Some(Token::Ident(_)) if stream.peek_nth(1) == Some(&Token::Assign) => {
                return Err(Error::disallowed("keyword argument"));
            }
            Some(Token::Star) | Some(Token::StarStar) => {
                return Err(Error::disallowed("argument unpacking"));
            }
            _ => {}
        }

        args.push(parse_conditional(stream)?);

        match stream.peek() {
            Some(Token::Comma) => {
                stream.advance();
            }
            Some(Token::RParen) => {}
            _ => return Err(stream.unexpected("expected ',' or ')' in argument list")),
        }
    }
}

fn parse_atom(stream: &mut TokenStream) -> Result<Expr> {
    let offset = stream.offset();
    let Some(token) = stream.peek() else {
        return Err(stream.unexpected("expected a value"));
    };
    if let Some(construct) = disallowed_construct(token) {
        return Err(Error::disallowed(format!("{construct} '{token}'")));
    }

    let expr = match token {
        Token::Int(i) => Expr::Literal(Value::Int(*i)),
        Token::Real(r) => Expr::Literal(Value::Real(*r)),
        Token::Str(s) => Expr::Literal(Value::Str(s.clone())),
        Token::True => Expr::Literal(Value::Bool(true)),
        Token::False => Expr::Literal(Value::Bool(false)),
        Token::Ident(name) => Expr::Ident(name.clone()),
        Token::LParen => {
            stream.advance();
            let inner = parse_conditional(stream)?;
            if stream.peek() == Some(&Token::Comma) {
                return Err(Error::disallowed("tuple"));
            }
            stream.expect(Token::RParen)?;
            return Ok(inner);
        }
        other => {
            return Err(Error::syntax(offset, format!("unexpected '{other}'")));
        }
    };
    stream.advance();
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bin(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn int(i: i64) -> Expr {
        Expr::Literal(Value::Int(i))
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(
            parse("1 + 2 * 3").unwrap(),
            bin(BinaryOp::Add, int(1), bin(BinaryOp::Mul, int(2), int(3)))
        );
    }

    #[test]
    fn power_is_right_associative_and_beats_unary_minus() {
        assert_eq!(
            parse("-2 ** 3 ** 2").unwrap(),
            Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(bin(BinaryOp::Pow, int(2), bin(BinaryOp::Pow, int(3), int(2)))),
            }
        );
    }

    #[test]
    fn both_conditional_forms_parse_alike() {
        assert_eq!(parse("A > B ? 1 : 0").unwrap(), parse("1 if A > B else 0").unwrap());
    }

    #[test]
    fn shifts_bind_looser_than_addition() {
        assert_eq!(
            parse("1 << N - 1").unwrap(),
            bin(
                BinaryOp::Shl,
                int(1),
                bin(BinaryOp::Sub, Expr::Ident("N".into()), int(1))
            )
        );
    }

    #[test]
    fn rejects_chained_comparison() {
        assert_eq!(parse("1 < x < 3").unwrap_err(), Error::disallowed("chained comparison"));
    }

    #[test]
    fn rejects_unknown_function_by_name() {
        assert_eq!(
            parse("exec('x')").unwrap_err(),
            Error::FunctionNotAllowed { name: "exec".into() }
        );
    }

    #[test]
    fn rejects_trailing_tokens() {
        assert!(matches!(parse("1 2").unwrap_err(), Error::Syntax { offset: 2, .. }));
        assert!(matches!(parse("(1").unwrap_err(), Error::Syntax { .. }));
        assert!(matches!(parse("").unwrap_err(), Error::Syntax { .. }));
    }
}
