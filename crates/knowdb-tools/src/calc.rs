//! Arithmetic tool backed by a small recursive-descent evaluator.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr    := term (("+" | "-") term)*
//! term    := unary (("*" | "/" | "%") unary)*
//! unary   := ("-" | "+") unary | power
//! power   := primary (("^" | "**") unary)?
//! primary := number | constant | function "(" expr ("," expr)* ")" | "(" expr ")"
//! ```
//!
//! Only the constants and functions listed in `call` and `constant` resolve;
//! any other identifier is an error.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::{Tool, ToolError, ToolInput, ToolOutput, ToolResult};

const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("unexpected character '{0}' at {1}")]
    UnexpectedChar(char, usize),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected token at {0}")]
    UnexpectedToken(usize),
    #[error("unknown name: {0}")]
    UnknownName(String),
    #[error("{0} expects {1} argument(s), got {2}")]
    Arity(&'static str, &'static str, usize),
    #[error("expression nested too deeply")]
    TooDeep,
    #[error("result is not a finite number")]
    NonFinite,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Op(char),
    Pow,
    LParen,
    RParen,
    Comma,
}

fn tokenize(src: &str) -> Result<Vec<(usize, Token)>, CalcError> {
    let bytes = src.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            _ if c.is_ascii_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                // Exponent only when digits follow, so `2e` stays `2` then `e`.
                if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
                    let mut j = i + 1;
                    if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
                        j += 1;
                    }
                    if j < bytes.len() && bytes[j].is_ascii_digit() {
                        while j < bytes.len() && bytes[j].is_ascii_digit() {
                            j += 1;
                        }
                        i = j;
                    }
                }
                let n = src[start..i].parse::<f64>().map_err(|_| CalcError::UnexpectedToken(start))?;
                out.push((start, Token::Num(n)));
            }
            _ if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                out.push((start, Token::Ident(src[start..i].to_ascii_lowercase())));
            }
            '*' if bytes.get(i + 1) == Some(&b'*') => {
                out.push((i, Token::Pow));
                i += 2;
            }
            '^' => {
                out.push((i, Token::Pow));
                i += 1;
            }
            '+' | '-' | '*' | '/' | '%' => {
                out.push((i, Token::Op(c)));
                i += 1;
            }
            '(' => {
                out.push((i, Token::LParen));
                i += 1;
            }
            ')' => {
                out.push((i, Token::RParen));
                i += 1;
            }
            ',' => {
                out.push((i, Token::Comma));
                i += 1;
            }
            _ => {
                let ch = src[i..].chars().next().unwrap_or(c);
                return Err(CalcError::UnexpectedChar(ch, i));
            }
        }
    }
    Ok(out)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn next(&mut self) -> Result<Token, CalcError> {
        let t = self.tokens.get(self.pos).map(|(_, t)| t.clone()).ok_or(CalcError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(t)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(usize::MAX, |(at, _)| *at)
    }

    fn expect(&mut self, want: &Token) -> Result<(), CalcError> {
        let at = self.offset();
        match self.next()? {
            ref t if t == want => Ok(()),
            _ => Err(CalcError::UnexpectedToken(at)),
        }
    }

    fn descend(&mut self) -> Result<(), CalcError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CalcError::TooDeep);
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<f64, CalcError> {
        self.descend()?;
        let mut acc = self.term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek().cloned() {
            self.pos += 1;
            let rhs = self.term()?;
            acc = if op == '+' { acc + rhs } else { acc - rhs };
        }
        self.depth -= 1;
        Ok(acc)
    }

    fn term(&mut self) -> Result<f64, CalcError> {
        let mut acc = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/' | '%'))) = self.peek().cloned() {
            self.pos += 1;
            let rhs = self.unary()?;
            acc = match op {
                '*' => acc * rhs,
                '/' => acc / rhs,
                // Floored modulo: the sign follows the divisor.
                _ => acc - rhs * (acc / rhs).floor(),
            };
        }
        Ok(acc)
    }

    fn unary(&mut self) -> Result<f64, CalcError> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.pos += 1;
                self.descend()?;
                let v = -self.unary()?;
                self.depth -= 1;
                Ok(v)
            }
            Some(Token::Op('+')) => {
                self.pos += 1;
                self.descend()?;
                let v = self.unary()?;
                self.depth -= 1;
                Ok(v)
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<f64, CalcError> {
        let base = self.primary()?;
        if self.peek() == Some(&Token::Pow) {
            self.pos += 1;
            self.descend()?;
            let exp = self.unary()?;
            self.depth -= 1;
            return Ok(base.powf(exp));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64, CalcError> {
        let at = self.offset();
        match self.next()? {
            Token::Num(n) => Ok(n),
            Token::LParen => {
                let v = self.expr()?;
                self.expect(&Token::RParen)?;
                Ok(v)
            }
            Token::Ident(name) => {
                if self.peek() == Some(&Token::LParen) {
                    self.pos += 1;
                    let args = self.args()?;
                    call(&name, &args)
                } else {
                    constant(&name)
                }
            }
            _ => Err(CalcError::UnexpectedToken(at)),
        }
    }

    fn args(&mut self) -> Result<Vec<f64>, CalcError> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            let at = self.offset();
            match self.next()? {
                Token::Comma => continue,
                Token::RParen => return Ok(args),
                _ => return Err(CalcError::UnexpectedToken(at)),
            }
        }
    }
}

fn constant(name: &str) -> Result<f64, CalcError> {
    match name {
        "pi" => Ok(std::f64::consts::PI),
        "e" => Ok(std::f64::consts::E),
        _ => Err(CalcError::UnknownName(name.to_string())),
    }
}

fn call(name: &str, args: &[f64]) -> Result<f64, CalcError> {
    let unary = |f: fn(f64) -> f64, label: &'static str| match args {
        [x] => Ok(f(*x)),
        _ => Err(CalcError::Arity(label, "1", args.len())),
    };
    match name {
        "abs" => unary(f64::abs, "abs"),
        "round" => unary(f64::round, "round"),
        "sqrt" => unary(f64::sqrt, "sqrt"),
        "sin" => unary(f64::sin, "sin"),
        "cos" => unary(f64::cos, "cos"),
        "tan" => unary(f64::tan, "tan"),
        "log10" => unary(f64::log10, "log10"),
        "exp" => unary(f64::exp, "exp"),
        "log" => match args {
            [x] => Ok(x.ln()),
            [x, base] => Ok(x.log(*base)),
            _ => Err(CalcError::Arity("log", "1 or 2", args.len())),
        },
        "pow" => match args {
            [x, y] => Ok(x.powf(*y)),
            _ => Err(CalcError::Arity("pow", "2", args.len())),
        },
        "min" | "max" => {
            let label = if name == "min" { "min" } else { "max" };
            let (first, rest) = args.split_first().ok_or(CalcError::Arity(label, "at least 1", 0))?;
            Ok(rest.iter().fold(*first, |acc, x| if name == "min" { acc.min(*x) } else { acc.max(*x) }))
        }
        "sum" => Ok(args.iter().sum()),
        _ => Err(CalcError::UnknownName(name.to_string())),
    }
}

/// Evaluate `expression`. Non-finite results (division by zero, `sqrt(-1)`)
/// are errors.
pub fn evaluate(expression: &str) -> Result<f64, CalcError> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(CalcError::UnexpectedEnd);
    }
    let mut parser = Parser { tokens, pos: 0, depth: 0 };
    let value = parser.expr()?;
    if parser.pos < parser.tokens.len() {
        return Err(CalcError::UnexpectedToken(parser.offset()));
    }
    if !value.is_finite() {
        return Err(CalcError::NonFinite);
    }
    Ok(value)
}

#[derive(Debug, Deserialize)]
struct CalculateArgs {
    expression: String,
}

pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &'static str {
        "calculate"
    }

    fn description(&self) -> &'static str {
        "Evaluate an arithmetic expression. Supports + - * / % ^, parentheses, pi, e and \
         abs, round, sqrt, sin, cos, tan, log, log10, exp, min, max, pow, sum."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expression": {"type": "string", "description": "Expression to evaluate, e.g. \"sqrt(16) + 2^3\""}
            },
            "required": ["expression"]
        })
    }

    async fn invoke(&self, input: ToolInput) -> ToolResult<ToolOutput> {
        let args: CalculateArgs = input.parse()?;
        let expression = args.expression.trim();
        let result = evaluate(expression).map_err(|e| ToolError::InvalidInput(format!("{expression}: {e}")))?;
        Ok(ToolOutput::success_with_data(
            format!("{expression} = {result}"),
            json!({"expression": expression, "result": result}),
        ))
    }
}
