//! Arithmetic and comparison expressions for `#expr` and `#ifexpr`.
//!
//! A small recursive-descent evaluator over `f64`. Supported, from loosest
//! to tightest binding:
//!
//! | Level | Operators |
//! |---|---|
//! | or | `or` |
//! | and | `and` |
//! | comparison | `=` `!=` `<>` `<` `>` `<=` `>=` |
//! | rounding | `round` |
//! | additive | `+` `-` |
//! | multiplicative | `*` `/` `div` `mod` |
//! | power | `^` (right associative) |
//! | unary | `-` `+` `not` |
//!
//! Comparisons and logical operators yield `1` or `0`. Operator words are
//! case-insensitive.

use thiserror::Error;

use crate::constants::MAX_EXPR_NESTING;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unexpected token {0:?}")]
    UnexpectedToken(Token),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NotFinite,

    #[error("expression nested deeper than {0} levels")]
    TooDeep(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Mod,
    Round,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    Not,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let value =
                    literal.parse::<f64>().map_err(|_| ExprError::InvalidNumber(literal.clone()))?;
                tokens.push(Token::Number(value));
            }
            'a'..='z' | 'A'..='Z' => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphabetic() {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect::<String>().to_lowercase();
                let token = match word.as_str() {
                    "mod" => Token::Mod,
                    "div" => Token::Slash,
                    "round" => Token::Round,
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "pi" => Token::Number(std::f64::consts::PI),
                    "e" => Token::Number(std::f64::consts::E),
                    _ => return Err(ExprError::UnexpectedCharacter(chars[start])),
                };
                tokens.push(token);
            }
            _ => {
                let next = chars.get(i + 1).copied();
                let (token, width) = match (c, next) {
                    ('+', _) => (Token::Plus, 1),
                    ('-' | '−', _) => (Token::Minus, 1),
                    ('*' | '×', _) => (Token::Star, 1),
                    ('/' | '÷', _) => (Token::Slash, 1),
                    ('^', _) => (Token::Caret, 1),
                    ('(', _) => (Token::LParen, 1),
                    (')', _) => (Token::RParen, 1),
                    ('!', Some('=')) => (Token::Ne, 2),
                    ('<', Some('>')) => (Token::Ne, 2),
                    ('<', Some('=')) => (Token::Le, 2),
                    ('>', Some('=')) => (Token::Ge, 2),
                    ('<', _) => (Token::Lt, 1),
                    ('>', _) => (Token::Gt, 1),
                    ('=', _) => (Token::Eq, 1),
                    _ => return Err(ExprError::UnexpectedCharacter(c)),
                };
                tokens.push(token);
                i += width;
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, wanted: &Token) -> bool {
        if self.peek() == Some(wanted) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Run `rule` one nesting level deeper.
    fn nested(&mut self, rule: fn(&mut Self) -> Result<f64, ExprError>) -> Result<f64, ExprError> {
        if self.depth >= MAX_EXPR_NESTING {
            return Err(ExprError::TooDeep(MAX_EXPR_NESTING));
        }
        self.depth += 1;
        let value = rule(self);
        self.depth -= 1;
        value
    }

    fn or(&mut self) -> Result<f64, ExprError> {
        let mut left = self.and()?;
        while self.eat(&Token::Or) {
            let right = self.and()?;
            left = truth(left != 0.0 || right != 0.0);
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<f64, ExprError> {
        let mut left = self.comparison()?;
        while self.eat(&Token::And) {
            let right = self.comparison()?;
            left = truth(left != 0.0 && right != 0.0);
        }
        Ok(left)
    }

    fn comparison(&mut self) -> Result<f64, ExprError> {
        let mut left = self.rounding()?;
        loop {
            let op = match self.peek() {
                Some(t @ (Token::Eq | Token::Ne | Token::Lt | Token::Gt | Token::Le | Token::Ge)) => {
                    t.clone()
                }
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.rounding()?;
            left = truth(match op {
                Token::Eq => left == right,
                Token::Ne => left != right,
                Token::Lt => left < right,
                Token::Gt => left > right,
                Token::Le => left <= right,
                _ => left >= right,
            });
        }
    }

    fn rounding(&mut self) -> Result<f64, ExprError> {
        let mut left = self.additive()?;
        while self.eat(&Token::Round) {
            let digits = self.additive()?.trunc().clamp(-300.0, 300.0) as i32;
            let factor = 10f64.powi(digits.abs());
            left = if digits >= 0 {
                (left * factor).round() / factor
            } else {
                (left / factor).round() * factor
            };
        }
        Ok(left)
    }

    fn additive(&mut self) -> Result<f64, ExprError> {
        let mut left = self.multiplicative()?;
        loop {
            if self.eat(&Token::Plus) {
                left += self.multiplicative()?;
            } else if self.eat(&Token::Minus) {
                left -= self.multiplicative()?;
            } else {
                return Ok(left);
            }
        }
    }

    fn multiplicative(&mut self) -> Result<f64, ExprError> {
        let mut left = self.power()?;
        loop {
            if self.eat(&Token::Star) {
                left *= self.power()?;
            } else if self.eat(&Token::Slash) {
                let right = self.power()?;
                if right == 0.0 {
                    return Err(ExprError::DivisionByZero);
                }
                left /= right;
            } else if self.eat(&Token::Mod) {
                // operands are truncated to integers first
                let right = self.power()?.trunc();
                if right == 0.0 {
                    return Err(ExprError::DivisionByZero);
                }
                left = left.trunc() % right;
            } else {
                return Ok(left);
            }
        }
    }

    fn power(&mut self) -> Result<f64, ExprError> {
        let base = self.unary()?;
        if self.eat(&Token::Caret) {
            let exponent = self.nested(Self::power)?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn unary(&mut self) -> Result<f64, ExprError> {
        if self.eat(&Token::Minus) {
            return Ok(-self.nested(Self::unary)?);
        }
        if self.eat(&Token::Plus) {
            return self.nested(Self::unary);
        }
        if self.eat(&Token::Not) {
            return Ok(truth(self.nested(Self::unary)? == 0.0));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<f64, ExprError> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(value),
            Some(Token::LParen) => {
                let value = self.nested(Self::or)?;
                match self.advance() {
                    Some(Token::RParen) => Ok(value),
                    Some(other) => Err(ExprError::UnexpectedToken(other)),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(other) => Err(ExprError::UnexpectedToken(other)),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

const fn truth(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

/// Evaluate `input`. Blank input evaluates to `None`.
pub fn evaluate(input: &str) -> Result<Option<f64>, ExprError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Ok(None);
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.or()?;
    if let Some(extra) = parser.advance() {
        return Err(ExprError::UnexpectedToken(extra));
    }
    if !value.is_finite() {
        return Err(ExprError::NotFinite);
    }
    Ok(Some(value))
}

/// Render a result the way wiki pages expect: integers without a decimal
/// point, other values with at most ten fractional digits.
#[must_use]
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    let fixed = format!("{value:.10}");
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Evaluate and format `input`; blank input yields an empty string.
pub fn eval_to_string(input: &str) -> Result<String, ExprError> {
    Ok(evaluate(input)?.map(format_number).unwrap_or_default())
}
