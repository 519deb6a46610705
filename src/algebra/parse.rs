//! Recursive-descent parser for the textual scalar/value grammar.
//!
//! The persisted document stores geometric values as constructor
//! expressions; the shared tokenizer and `Parser` here are also used by the
//! model's value parser. Scalar grammar:
//!
//! ```text
//! expr  := term (('+' | '-') term)*
//! term  := unary (('*' | '/') unary)*
//! unary := '-' unary | atom
//! atom  := integer | 'sqrt' '(' expr ')' | '(' expr ')'
//! ```
//!
//! [`Expr`]'s `Display` output round-trips through this grammar exactly.

use super::expr::Expr;
use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;
use thiserror::Error;

/// A scalar or value expression failed to parse.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ParseError(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Int(BigUint),
    Ident(String),
    LParen,
    RParen,
    Comma,
    Plus,
    Minus,
    Star,
    Slash,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Int(n) => write!(f, "{n}"),
            Token::Ident(s) => f.write_str(s),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
        }
    }
}

fn tokenize(src: &str) -> Result<Vec<Token>, ParseError> {
    let mut toks = Vec::new();
    let mut chars = src.char_indices().peekable();
    while let Some(&(i, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' | ')' | ',' | '+' | '-' | '*' | '/' => {
                chars.next();
                toks.push(match ch {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    ',' => Token::Comma,
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    _ => Token::Slash,
                });
            }
            c if c.is_ascii_digit() => {
                let mut end = i;
                while let Some(&(j, d)) = chars.peek() {
                    if d.is_ascii_digit() {
                        end = j + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let n: BigUint = src[i..end]
                    .parse()
                    .map_err(|_| ParseError(format!("invalid integer at byte {i}")))?;
                toks.push(Token::Int(n));
            }
            c if c.is_ascii_alphabetic() => {
                let mut end = i;
                while let Some(&(j, d)) = chars.peek() {
                    if d.is_ascii_alphanumeric() {
                        end = j + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                toks.push(Token::Ident(src[i..end].to_owned()));
            }
            other => {
                return Err(ParseError(format!(
                    "unexpected character `{other}` at byte {i}"
                )));
            }
        }
    }
    Ok(toks)
}

/// Token-stream parser shared by the scalar and value grammars.
pub(crate) struct Parser {
    toks: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub(crate) fn new(src: &str) -> Result<Self, ParseError> {
        Ok(Parser {
            toks: tokenize(src)?,
            pos: 0,
        })
    }

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.toks.get(self.pos)
    }

    pub(crate) fn bump(&mut self) -> Option<Token> {
        let t = self.toks.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    pub(crate) fn eat(&mut self, t: &Token) -> bool {
        if self.peek() == Some(t) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, t: Token) -> Result<(), ParseError> {
        match self.bump() {
            Some(found) if found == t => Ok(()),
            Some(found) => Err(ParseError(format!("expected `{t}`, found `{found}`"))),
            None => Err(ParseError(format!("expected `{t}`, found end of input"))),
        }
    }

    pub(crate) fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.bump() {
            Some(Token::Ident(s)) => Ok(s),
            Some(found) => Err(ParseError(format!(
                "expected identifier, found `{found}`"
            ))),
            None => Err(ParseError("expected identifier, found end of input".into())),
        }
    }

    pub(crate) fn finish(&self) -> Result<(), ParseError> {
        match self.peek() {
            None => Ok(()),
            Some(t) => Err(ParseError(format!("trailing input at `{t}`"))),
        }
    }

    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let mut acc = self.parse_term()?;
        loop {
            if self.eat(&Token::Plus) {
                acc = &acc + &self.parse_term()?;
            } else if self.eat(&Token::Minus) {
                acc = &acc - &self.parse_term()?;
            } else {
                return Ok(acc);
            }
        }
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut acc = self.parse_unary()?;
        loop {
            if self.eat(&Token::Star) {
                acc = &acc * &self.parse_unary()?;
            } else if self.eat(&Token::Slash) {
                let rhs = self.parse_unary()?;
                acc = acc
                    .checked_div(&rhs)
                    .map_err(|e| ParseError(e.to_string()))?;
            } else {
                return Ok(acc);
            }
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&Token::Minus) {
            Ok(-&self.parse_unary()?)
        } else {
            self.parse_atom()
        }
    }

    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        match self.bump() {
            Some(Token::Int(n)) => Ok(Expr::from_big(BigRational::from(BigInt::from(n)))),
            Some(Token::Ident(id)) if id == "sqrt" => {
                self.expect(Token::LParen)?;
                let inner = self.parse_expr()?;
                self.expect(Token::RParen)?;
                inner.sqrt().map_err(|e| ParseError(e.to_string()))
            }
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(found) => Err(ParseError(format!(
                "expected number, `sqrt`, or `(`, found `{found}`"
            ))),
            None => Err(ParseError("unexpected end of input".into())),
        }
    }
}

/// Parses a complete scalar expression.
pub fn parse_expr_str(src: &str) -> Result<Expr, ParseError> {
    let mut p = Parser::new(src)?;
    let e = p.parse_expr()?;
    p.finish()?;
    Ok(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rationals_and_surds() {
        assert_eq!(parse_expr_str("3/2").unwrap(), Expr::rational(3, 2));
        assert_eq!(
            parse_expr_str("1/2 + 3/2*sqrt(5)").unwrap(),
            &Expr::rational(1, 2) + &Expr::surd(3, 2, 5)
        );
        assert_eq!(parse_expr_str("-sqrt(2)").unwrap(), -&Expr::surd(1, 1, 2));
    }

    #[test]
    fn display_round_trips() {
        for e in [
            Expr::zero(),
            Expr::rational(-7, 3),
            &Expr::rational(1, 2) + &Expr::surd(-3, 2, 5),
            &Expr::surd(2, 1, 3) + &Expr::surd(1, 4, 30),
        ] {
            assert_eq!(parse_expr_str(&e.to_string()).unwrap(), e);
        }
    }

    #[test]
    fn nested_sqrt_denests_on_parse() {
        // sqrt(3 + 2*sqrt(2)) = 1 + sqrt(2)
        assert_eq!(
            parse_expr_str("sqrt(3 + 2*sqrt(2))").unwrap(),
            &Expr::one() + &Expr::surd(1, 1, 2)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_expr_str("sqrt(").is_err());
        assert!(parse_expr_str("1 + ?").is_err());
        assert!(parse_expr_str("1 2").is_err());
        assert!(parse_expr_str("1/0").is_err());
    }
}
