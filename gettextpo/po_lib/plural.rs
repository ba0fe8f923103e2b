//
// Copyright (c) 2026 Jeff Garzik
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Plural-Forms header parsing and evaluation
//!
//! The header value has the form `nplurals=N; plural=EXPR;` where EXPR is a
//! C expression over the unsigned count `n`, e.g.
//! `(n==1 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2)`.

use std::iter::Peekable;
use std::str::Chars;

/// Values of n examined when deciding how plural forms are used
pub const DISTRIBUTION_LIMIT: u64 = 1000;

/// Largest accepted `nplurals`
pub const MAX_NPLURALS: usize = 100;

/// A parsed plural expression
#[derive(Debug, Clone, PartialEq)]
pub enum PluralExpr {
    /// The count `n`
    N,
    Literal(u64),
    Not(Box<PluralExpr>),
    Binary(Box<PluralExpr>, BinaryOp, Box<PluralExpr>),
    /// condition ? if_true : if_false
    Ternary(Box<PluralExpr>, Box<PluralExpr>, Box<PluralExpr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    /// Binding strength; larger binds tighter
    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 6,
            BinaryOp::Add | BinaryOp::Sub => 5,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 4,
            BinaryOp::Eq | BinaryOp::Ne => 3,
            BinaryOp::And => 2,
            BinaryOp::Or => 1,
        }
    }

    fn apply(self, l: u64, r: u64) -> Result<u64, PluralError> {
        Ok(match self {
            BinaryOp::Mul => l.wrapping_mul(r),
            BinaryOp::Div => l.checked_div(r).ok_or(PluralError::DivisionByZero)?,
            BinaryOp::Mod => l.checked_rem(r).ok_or(PluralError::DivisionByZero)?,
            BinaryOp::Add => l.wrapping_add(r),
            BinaryOp::Sub => l.wrapping_sub(r),
            BinaryOp::Lt => u64::from(l < r),
            BinaryOp::Le => u64::from(l <= r),
            BinaryOp::Gt => u64::from(l > r),
            BinaryOp::Ge => u64::from(l >= r),
            BinaryOp::Eq => u64::from(l == r),
            BinaryOp::Ne => u64::from(l != r),
            BinaryOp::And => u64::from(l != 0 && r != 0),
            BinaryOp::Or => u64::from(l != 0 || r != 0),
        })
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PluralError {
    #[error("unexpected character '{0}' in plural expression")]
    UnexpectedChar(char),
    #[error("unexpected end of plural expression")]
    UnexpectedEof,
    #[error("expected {0} in plural expression")]
    Expected(&'static str),
    #[error("division by zero in plural expression")]
    DivisionByZero,
    #[error("missing 'nplurals' attribute")]
    MissingNplurals,
    #[error("invalid value for 'nplurals' attribute")]
    InvalidNplurals,
    #[error("missing 'plural' attribute")]
    MissingPlural,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    N,
    Number(u64),
    Op(BinaryOp),
    Not,
    LParen,
    RParen,
    Question,
    Colon,
}

fn tokenize(input: &str) -> Result<Vec<Token>, PluralError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            // terminates the expression in a header value
            ';' => break,
            'n' => Token::N,
            '0'..='9' => {
                let mut value = u64::from(c.to_digit(10).unwrap_or(0));
                while let Some(digit) = chars.peek().and_then(|d| d.to_digit(10)) {
                    value = value.wrapping_mul(10).wrapping_add(u64::from(digit));
                    chars.next();
                }
                Token::Number(value)
            }
            '(' => Token::LParen,
            ')' => Token::RParen,
            '?' => Token::Question,
            ':' => Token::Colon,
            '*' => Token::Op(BinaryOp::Mul),
            '/' => Token::Op(BinaryOp::Div),
            '%' => Token::Op(BinaryOp::Mod),
            '+' => Token::Op(BinaryOp::Add),
            '-' => Token::Op(BinaryOp::Sub),
            '<' if eat(&mut chars, '=') => Token::Op(BinaryOp::Le),
            '<' => Token::Op(BinaryOp::Lt),
            '>' if eat(&mut chars, '=') => Token::Op(BinaryOp::Ge),
            '>' => Token::Op(BinaryOp::Gt),
            '=' if eat(&mut chars, '=') => Token::Op(BinaryOp::Eq),
            '!' if eat(&mut chars, '=') => Token::Op(BinaryOp::Ne),
            '!' => Token::Not,
            '&' if eat(&mut chars, '&') => Token::Op(BinaryOp::And),
            '|' if eat(&mut chars, '|') => Token::Op(BinaryOp::Or),
            other => return Err(PluralError::UnexpectedChar(other)),
        };
        tokens.push(token);
    }

    Ok(tokens)
}

fn eat(chars: &mut Peekable<Chars<'_>>, next: char) -> bool {
    chars.next_if_eq(&next).is_some()
}

/// Precedence-climbing parser over a token list
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn expect(&mut self, token: Token, what: &'static str) -> Result<(), PluralError> {
        match self.bump() {
            Some(t) if t == token => Ok(()),
            Some(_) => Err(PluralError::Expected(what)),
            None => Err(PluralError::UnexpectedEof),
        }
    }

    // conditional: binary(1) ('?' conditional ':' conditional)?
    fn conditional(&mut self) -> Result<PluralExpr, PluralError> {
        let cond = self.binary(1)?;
        if self.peek() != Some(Token::Question) {
            return Ok(cond);
        }
        self.bump();
        let if_true = self.conditional()?;
        self.expect(Token::Colon, "':'")?;
        let if_false = self.conditional()?;
        Ok(PluralExpr::Ternary(
            Box::new(cond),
            Box::new(if_true),
            Box::new(if_false),
        ))
    }

    fn binary(&mut self, min_precedence: u8) -> Result<PluralExpr, PluralError> {
        let mut left = self.unary()?;
        while let Some(Token::Op(op)) = self.peek() {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.bump();
            let right = self.binary(precedence + 1)?;
            left = PluralExpr::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<PluralExpr, PluralError> {
        match self.bump() {
            Some(Token::Not) => Ok(PluralExpr::Not(Box::new(self.unary()?))),
            Some(Token::N) => Ok(PluralExpr::N),
            Some(Token::Number(v)) => Ok(PluralExpr::Literal(v)),
            Some(Token::LParen) => {
                let expr = self.conditional()?;
                self.expect(Token::RParen, "')'")?;
                Ok(expr)
            }
            Some(_) => Err(PluralError::Expected("'n', a number or '('")),
            None => Err(PluralError::UnexpectedEof),
        }
    }
}

impl PluralExpr {
    pub fn parse(input: &str) -> Result<Self, PluralError> {
        let mut parser = Parser {
            tokens: tokenize(input)?,
            pos: 0,
        };
        let expr = parser.conditional()?;
        match parser.peek() {
            None => Ok(expr),
            Some(_) => Err(PluralError::Expected("end of expression")),
        }
    }

    /// Evaluate for the count `n`.  Only division by zero can fail.
    pub fn evaluate(&self, n: u64) -> Result<u64, PluralError> {
        match self {
            PluralExpr::N => Ok(n),
            PluralExpr::Literal(v) => Ok(*v),
            PluralExpr::Not(inner) => Ok(u64::from(inner.evaluate(n)? == 0)),
            PluralExpr::Binary(left, op, right) => {
                let l = left.evaluate(n)?;
                // && and || short-circuit like C
                match (op, l) {
                    (BinaryOp::And, 0) => return Ok(0),
                    (BinaryOp::Or, l) if l != 0 => return Ok(1),
                    _ => {}
                }
                op.apply(l, right.evaluate(n)?)
            }
            PluralExpr::Ternary(cond, if_true, if_false) => {
                if cond.evaluate(n)? != 0 {
                    if_true.evaluate(n)
                } else {
                    if_false.evaluate(n)
                }
            }
        }
    }
}

/// The parsed value of a Plural-Forms header field
#[derive(Debug, Clone, PartialEq)]
pub struct PluralForms {
    pub nplurals: usize,
    pub expr: PluralExpr,
}

impl PluralForms {
    /// Parse "nplurals=N; plural=EXPR;"
    pub fn parse(value: &str) -> Result<Self, PluralError> {
        let mut nplurals = None;
        let mut expr = None;

        for part in value.split(';') {
            let Some((name, rest)) = part.split_once('=') else {
                continue;
            };
            match name.trim() {
                "nplurals" => {
                    let count: usize = rest
                        .trim()
                        .parse()
                        .map_err(|_| PluralError::InvalidNplurals)?;
                    if count == 0 || count > MAX_NPLURALS {
                        return Err(PluralError::InvalidNplurals);
                    }
                    nplurals = Some(count);
                }
                "plural" => expr = Some(PluralExpr::parse(rest)?),
                _ => {}
            }
        }

        Ok(PluralForms {
            nplurals: nplurals.ok_or(PluralError::MissingNplurals)?,
            expr: expr.ok_or(PluralError::MissingPlural)?,
        })
    }

    /// Plural form index for `n`
    pub fn index(&self, n: u64) -> Result<u64, PluralError> {
        self.expr.evaluate(n)
    }

    /// Largest form index produced for n in 0..=DISTRIBUTION_LIMIT
    pub fn max_value(&self) -> Result<u64, PluralError> {
        (0..=DISTRIBUTION_LIMIT).try_fold(0, |max, n| Ok(max.max(self.index(n)?)))
    }

    /// For each form, whether it is used for more than one value of n in
    /// 0..=DISTRIBUTION_LIMIT.  A form used only once (like the singular
    /// in English) may leave out the number from its translation.
    pub fn distribution(&self) -> Result<Vec<bool>, PluralError> {
        let mut counts = vec![0u32; self.nplurals];
        for n in 0..=DISTRIBUTION_LIMIT {
            let index = self.index(n)?;
            if let Some(count) = usize::try_from(index).ok().and_then(|i| counts.get_mut(i)) {
                *count += 1;
            }
        }
        Ok(counts.into_iter().map(|count| count > 1).collect())
    }
}
