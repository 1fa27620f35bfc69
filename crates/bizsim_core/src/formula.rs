//! Arithmetic formulas over positional placeholders.
//!
//! A formula such as `"({0} - {1}) * 1.2"` is parsed once into a postfix
//! program and then evaluated against any value vector that supplies at least
//! [`Formula::arity`] values.
//!
//! Grammar:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('-' | '+') unary | primary
//! primary := NUMBER | '{' INDEX '}' | '(' expr ')'
//! ```
//!
//! Division follows IEEE-754, so `1 / 0` is `inf` and `0 / 0` is `NaN`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FormulaError;

/// Maximum nesting of parentheses and unary operators
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    Const(f64),
    Input(usize),
    Add,
    Sub,
    Mul,
    Div,
    Neg,
}

/// A parsed formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Formula {
    source: String,
    program: Vec<Op>,
    arity: usize,
    stack_depth: usize,
}

impl Formula {
    pub fn parse(text: &str) -> Result<Self, FormulaError> {
        let tokens = tokenize(text)?;
        if tokens.is_empty() {
            return Err(FormulaError::Empty);
        }

        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            depth: 0,
            program: Vec::with_capacity(tokens.len()),
        };
        parser.expr()?;
        if let Some(token) = parser.peek() {
            return Err(FormulaError::UnexpectedToken {
                position: token.position,
                found: token.kind.to_string(),
            });
        }

        let program = parser.program;
        let arity = program
            .iter()
            .filter_map(|op| match op {
                Op::Input(i) => Some(i + 1),
                _ => None,
            })
            .max()
            .unwrap_or(0);

        Ok(Self {
            source: text.to_string(),
            stack_depth: max_stack_depth(&program),
            program,
            arity,
        })
    }

    /// The text this formula was parsed from
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// One more than the largest placeholder index, 0 for constant formulas
    #[must_use]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Evaluate against `values`; `values[i]` is bound to `{i}`.
    pub fn evaluate(&self, values: &[f64]) -> Result<f64, FormulaError> {
        self.check_arity(values.len())?;
        let mut stack = Vec::with_capacity(self.stack_depth);
        Ok(self.run(values, &mut stack))
    }

    pub(crate) fn check_arity(&self, available: usize) -> Result<(), FormulaError> {
        if available < self.arity {
            return Err(FormulaError::PlaceholderOutOfRange {
                index: self.arity - 1,
                available,
            });
        }
        Ok(())
    }

    /// Evaluate with a caller-owned scratch stack.
    ///
    /// `values` must hold at least [`Self::arity`] entries.
    pub(crate) fn run(&self, values: &[f64], stack: &mut Vec<f64>) -> f64 {
        stack.clear();
        for op in &self.program {
            let value = match *op {
                Op::Const(c) => c,
                Op::Input(i) => values[i],
                Op::Neg => {
                    let a = stack.pop().unwrap_or(f64::NAN);
                    -a
                }
                Op::Add | Op::Sub | Op::Mul | Op::Div => {
                    let b = stack.pop().unwrap_or(f64::NAN);
                    let a = stack.pop().unwrap_or(f64::NAN);
                    match op {
                        Op::Add => a + b,
                        Op::Sub => a - b,
                        Op::Mul => a * b,
                        _ => a / b,
                    }
                }
            };
            stack.push(value);
        }
        stack.pop().unwrap_or(f64::NAN)
    }
}

/// Parse `formula` and evaluate it once against `values`.
pub fn evaluate(formula: &str, values: &[f64]) -> Result<f64, FormulaError> {
    Formula::parse(formula)?.evaluate(values)
}

fn max_stack_depth(program: &[Op]) -> usize {
    let mut depth = 0usize;
    let mut max = 0usize;
    for op in program {
        match op {
            Op::Const(_) | Op::Input(_) => depth += 1,
            Op::Add | Op::Sub | Op::Mul | Op::Div => depth = depth.saturating_sub(1),
            Op::Neg => {}
        }
        max = max.max(depth);
    }
    max
}

impl FromStr for Formula {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Formula {
    type Error = FormulaError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Self::parse(&text)
    }
}

impl From<Formula> for String {
    fn from(formula: Formula) -> Self {
        formula.source
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum TokenKind {
    Number(f64),
    Placeholder(usize),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "{n}"),
            TokenKind::Placeholder(i) => write!(f, "{{{i}}}"),
            TokenKind::Plus => f.write_str("+"),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Star => f.write_str("*"),
            TokenKind::Slash => f.write_str("/"),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: TokenKind,
    /// Byte offset into the source text
    position: usize,
}

fn tokenize(text: &str) -> Result<Vec<Token>, FormulaError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let kind = match c {
            b' ' | b'\t' | b'\r' | b'\n' => {
                i += 1;
                continue;
            }
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => {
                let (index, end) = read_placeholder(text, i)?;
                tokens.push(Token {
                    kind: TokenKind::Placeholder(index),
                    position: i,
                });
                i = end;
                continue;
            }
            b'0'..=b'9' | b'.' => {
                let (value, end) = read_number(text, i)?;
                tokens.push(Token {
                    kind: TokenKind::Number(value),
                    position: i,
                });
                i = end;
                continue;
            }
            _ => {
                let found = text[i..].chars().next().unwrap_or('\u{FFFD}');
                return Err(FormulaError::UnexpectedChar { position: i, found });
            }
        };
        tokens.push(Token { kind, position: i });
        i += 1;
    }

    Ok(tokens)
}

/// Reads `{n}` starting at the opening brace, returns the index and the offset after `}`
fn read_placeholder(text: &str, start: usize) -> Result<(usize, usize), FormulaError> {
    let rest = &text[start + 1..];
    let close = rest.find('}').ok_or(FormulaError::UnexpectedEnd)?;
    let inner = &rest[..close];

    let invalid = || FormulaError::InvalidPlaceholder {
        position: start,
        text: inner.to_string(),
    };
    if inner.is_empty() || !inner.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let index = inner
        .parse::<usize>()
        .ok()
        .filter(|index| index.checked_add(1).is_some())
        .ok_or_else(invalid)?;
    Ok((index, start + 1 + close + 1))
}

/// Reads a decimal literal with optional fraction and exponent
fn read_number(text: &str, start: usize) -> Result<(f64, usize), FormulaError> {
    let bytes = text.as_bytes();
    let mut end = start;
    while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
        end += 1;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        end += 1;
        if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
            end += 1;
        }
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }

    let literal = &text[start..end];
    literal
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| (v, end))
        .ok_or_else(|| FormulaError::InvalidNumber {
            position: start,
            text: literal.to_string(),
        })
}

// ============================================================================
// Parser
// ============================================================================

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    program: Vec<Op>,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).copied();
        self.pos += 1;
        token
    }

    fn enter(&mut self) -> Result<(), FormulaError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(FormulaError::TooDeep { limit: MAX_DEPTH });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn expr(&mut self) -> Result<(), FormulaError> {
        self.term()?;
        loop {
            let op = match self.peek().map(|t| t.kind) {
                Some(TokenKind::Plus) => Op::Add,
                Some(TokenKind::Minus) => Op::Sub,
                _ => return Ok(()),
            };
            self.pos += 1;
            self.term()?;
            self.program.push(op);
        }
    }

    fn term(&mut self) -> Result<(), FormulaError> {
        self.unary()?;
        loop {
            let op = match self.peek().map(|t| t.kind) {
                Some(TokenKind::Star) => Op::Mul,
                Some(TokenKind::Slash) => Op::Div,
                _ => return Ok(()),
            };
            self.pos += 1;
            self.unary()?;
            self.program.push(op);
        }
    }

    fn unary(&mut self) -> Result<(), FormulaError> {
        match self.peek().map(|t| t.kind) {
            Some(TokenKind::Minus) => {
                self.pos += 1;
                self.enter()?;
                self.unary()?;
                self.leave();
                self.program.push(Op::Neg);
                Ok(())
            }
            Some(TokenKind::Plus) => {
                self.pos += 1;
                self.enter()?;
                self.unary()?;
                self.leave();
                Ok(())
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<(), FormulaError> {
        let token = self.next().ok_or(FormulaError::UnexpectedEnd)?;
        match token.kind {
            TokenKind::Number(value) => self.program.push(Op::Const(value)),
            TokenKind::Placeholder(index) => self.program.push(Op::Input(index)),
            TokenKind::LParen => {
                self.enter()?;
                self.expr()?;
                match self.next() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => {}
                    Some(other) => {
                        return Err(FormulaError::UnexpectedToken {
                            position: other.position,
                            found: other.kind.to_string(),
                        });
                    }
                    None => return Err(FormulaError::UnexpectedEnd),
                }
                self.leave();
            }
            other => {
                return Err(FormulaError::UnexpectedToken {
                    position: token.position,
                    found: other.to_string(),
                });
            }
        }
        Ok(())
    }
}
