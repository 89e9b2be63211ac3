//! `calc`: a tiny expression language.
//!
//! ```text
//! line     := IDENT '=' expr | expr
//! expr     := additive (CMP additive)?
//! additive := term (('+' | '-') term)*
//! term     := unary (('*' | '/' | '%') unary)*
//! unary    := ('-' | '!') unary | primary
//! primary  := NUMBER | STRING | true | false | null | IDENT
//!           | '(' expr ')' | '[' (expr (',' expr)*)? ']'
//! ```
//!
//! Nesting (parentheses, brackets, unary operators) is capped at
//! [`MAX_DEPTH`] levels; deeper input is a syntax error.
//!
//! Integers stay integers until a division leaves a remainder or an
//! operation overflows; then the result is a float. `+` concatenates when
//! either side is a string and joins two lists.

use std::cmp::Ordering;

use serde_json::Number;

use crate::{Context, EvalError, Evaluator, Value};

pub const MAX_DEPTH: usize = 128;

#[derive(Debug, Default, Clone, Copy)]
pub struct Calc;

impl Calc {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for Calc {
    fn evaluate(&mut self, source: &str, context: &mut Context) -> Result<Value, EvalError> {
        let tokens = tokenize(source)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            end: source.len(),
            depth: 0,
            ctx: context,
        };
        let value = parser.line()?;
        tracing::trace!(target: "eval.calc", tokens = parser.tokens.len(), "evaluated");
        Ok(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Punct {
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Assign,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(Number),
    Str(String),
    Ident(String),
    Punct(Punct),
}

fn tokenize(src: &str) -> Result<Vec<(Token, usize)>, EvalError> {
    let mut out = Vec::new();
    let mut chars = src.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        let leading_dot = c == '.' && src[start + 1..].starts_with(|d: char| d.is_ascii_digit());
        if c.is_ascii_digit() || leading_dot {
            let mut end = start;
            let mut is_float = false;
            while let Some(&(i, d)) = chars.peek() {
                if d.is_ascii_digit() || (d == '.' && !is_float) {
                    is_float |= d == '.';
                    end = i + d.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let text = &src[start..end];
            let number = if is_float {
                None
            } else {
                text.parse::<i64>().ok().map(Number::from)
            };
            let number = match number {
                Some(n) => n,
                None => text
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .ok_or_else(|| EvalError::syntax("invalid number", start))?,
            };
            out.push((Token::Number(number), start));
            continue;
        }
        if c.is_alphabetic() || c == '_' {
            let mut end = start;
            while let Some(&(i, d)) = chars.peek() {
                if d.is_alphanumeric() || d == '_' {
                    end = i + d.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            out.push((Token::Ident(src[start..end].to_string()), start));
            continue;
        }
        if c == '"' || c == '\'' {
            chars.next();
            let mut text = String::new();
            let mut closed = false;
            while let Some((_, d)) = chars.next() {
                match d {
                    '\\' => match chars.next() {
                        Some((_, 'n')) => text.push('\n'),
                        Some((_, 't')) => text.push('\t'),
                        Some((_, e)) => text.push(e),
                        None => break,
                    },
                    d if d == c => {
                        closed = true;
                        break;
                    }
                    d => text.push(d),
                }
            }
            if !closed {
                return Err(EvalError::syntax("unterminated string", start));
            }
            out.push((Token::Str(text), start));
            continue;
        }
        chars.next();
        let next_is_eq = matches!(chars.peek(), Some(&(_, '=')));
        let punct = match c {
            '+' => Punct::Plus,
            '-' => Punct::Minus,
            '*' => Punct::Star,
            '/' => Punct::Slash,
            '%' => Punct::Percent,
            '(' => Punct::LParen,
            ')' => Punct::RParen,
            '[' => Punct::LBracket,
            ']' => Punct::RBracket,
            ',' => Punct::Comma,
            '=' if next_is_eq => Punct::EqEq,
            '=' => Punct::Assign,
            '!' if next_is_eq => Punct::NotEq,
            '!' => Punct::Bang,
            '<' if next_is_eq => Punct::Le,
            '<' => Punct::Lt,
            '>' if next_is_eq => Punct::Ge,
            '>' => Punct::Gt,
            other => {
                return Err(EvalError::syntax(
                    format!("unexpected character '{other}'"),
                    start,
                ));
            }
        };
        if matches!(punct, Punct::EqEq | Punct::NotEq | Punct::Le | Punct::Ge) {
            chars.next();
        }
        out.push((Token::Punct(punct), start));
    }
    Ok(out)
}

struct Parser<'c> {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    end: usize,
    depth: usize,
    ctx: &'c mut Context,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |(_, o)| *o)
    }

    fn eat(&mut self, p: Punct) -> bool {
        if self.peek() == Some(&Token::Punct(p)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, p: Punct, what: &str) -> Result<(), EvalError> {
        if self.eat(p) {
            Ok(())
        } else {
            Err(EvalError::syntax(format!("expected {what}"), self.offset()))
        }
    }

    fn line(&mut self) -> Result<Value, EvalError> {
        if self.tokens.is_empty() {
            return Ok(Value::Null);
        }
        let value = match (self.tokens.first(), self.tokens.get(1)) {
            (Some((Token::Ident(name), _)), Some((Token::Punct(Punct::Assign), _))) => {
                let name = name.clone();
                self.pos = 2;
                let value = self.expr()?;
                self.ctx.set(name, value.clone())?;
                value
            }
            _ => self.expr()?,
        };
        if self.pos < self.tokens.len() {
            return Err(EvalError::syntax("unexpected token", self.offset()));
        }
        Ok(value)
    }

    fn expr(&mut self) -> Result<Value, EvalError> {
        let lhs = self.additive()?;
        let op = match self.peek() {
            Some(Token::Punct(
                p @ (Punct::EqEq | Punct::NotEq | Punct::Lt | Punct::Le | Punct::Gt | Punct::Ge),
            )) => *p,
            _ => return Ok(lhs),
        };
        self.pos += 1;
        let rhs = self.additive()?;
        compare(op, &lhs, &rhs).map(Value::Bool)
    }

    fn additive(&mut self) -> Result<Value, EvalError> {
        let mut acc = self.term()?;
        loop {
            if self.eat(Punct::Plus) {
                let rhs = self.term()?;
                acc = add(acc, rhs)?;
            } else if self.eat(Punct::Minus) {
                let rhs = self.term()?;
                acc = arith(Punct::Minus, &acc, &rhs)?;
            } else {
                return Ok(acc);
            }
        }
    }

    fn term(&mut self) -> Result<Value, EvalError> {
        let mut acc = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Punct(p @ (Punct::Star | Punct::Slash | Punct::Percent))) => *p,
                _ => return Ok(acc),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            acc = arith(op, &acc, &rhs)?;
        }
    }

    fn unary(&mut self) -> Result<Value, EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::syntax("expression nested too deeply", self.offset()));
        }
        self.depth += 1;
        let value = self.prefixed();
        self.depth -= 1;
        value
    }

    fn prefixed(&mut self) -> Result<Value, EvalError> {
        if self.eat(Punct::Minus) {
            let v = self.unary()?;
            return arith(Punct::Minus, &Value::from(0), &v);
        }
        if self.eat(Punct::Bang) {
            let v = self.unary()?;
            return Ok(Value::Bool(!truthy(&v)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Value, EvalError> {
        let offset = self.offset();
        let Some((token, _)) = self.tokens.get(self.pos).cloned() else {
            return Err(EvalError::syntax("unexpected end of input", offset));
        };
        self.pos += 1;
        match token {
            Token::Number(n) => Ok(Value::Number(n)),
            Token::Str(s) => Ok(Value::String(s)),
            Token::Ident(name) => match name.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                "null" | "undefined" => Ok(Value::Null),
                _ => self
                    .ctx
                    .get(&name)
                    .cloned()
                    .ok_or(EvalError::Undefined(name)),
            },
            Token::Punct(Punct::LParen) => {
                let v = self.expr()?;
                self.expect(Punct::RParen, "')'")?;
                Ok(v)
            }
            Token::Punct(Punct::LBracket) => {
                let mut items = Vec::new();
                if !self.eat(Punct::RBracket) {
                    loop {
                        items.push(self.expr()?);
                        if self.eat(Punct::RBracket) {
                            break;
                        }
                        self.expect(Punct::Comma, "',' or ']'")?;
                    }
                }
                Ok(Value::Array(items))
            }
            Token::Punct(_) => Err(EvalError::syntax("unexpected token", offset)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn of(v: &Value) -> Option<Num> {
        let n = v.as_number()?;
        match n.as_i64() {
            Some(i) => Some(Num::Int(i)),
            None => n.as_f64().map(Num::Float),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "undefined",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn float(f: f64) -> Result<Value, EvalError> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or(EvalError::NonFinite)
}

fn display(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => crate::inspect(other),
    }
}

fn add(lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    match (lhs, rhs) {
        (Value::Array(mut a), Value::Array(b)) => {
            a.extend(b);
            Ok(Value::Array(a))
        }
        (l @ Value::String(_), r) | (l, r @ Value::String(_)) => {
            Ok(Value::String(display(&l) + &display(&r)))
        }
        (l, r) => arith(Punct::Plus, &l, &r),
    }
}

fn arith(op: Punct, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    let (Some(a), Some(b)) = (Num::of(lhs), Num::of(rhs)) else {
        return Err(EvalError::Type(format!(
            "unsupported operands {} and {}",
            kind(lhs),
            kind(rhs)
        )));
    };
    if let (Num::Int(x), Num::Int(y)) = (a, b) {
        let exact = match op {
            Punct::Plus => x.checked_add(y),
            Punct::Minus => x.checked_sub(y),
            Punct::Star => x.checked_mul(y),
            Punct::Slash | Punct::Percent if y == 0 => return Err(EvalError::DivisionByZero),
            Punct::Slash if x % y == 0 => x.checked_div(y),
            Punct::Slash => None,
            Punct::Percent => x.checked_rem(y),
            _ => None,
        };
        if let Some(v) = exact {
            return Ok(Value::from(v));
        }
    }
    let (x, y) = (a.as_f64(), b.as_f64());
    let result = match op {
        Punct::Plus => x + y,
        Punct::Minus => x - y,
        Punct::Star => x * y,
        Punct::Slash | Punct::Percent if y == 0.0 => return Err(EvalError::DivisionByZero),
        Punct::Slash => x / y,
        Punct::Percent => x % y,
        _ => return Err(EvalError::Type("unsupported operator".into())),
    };
    float(result)
}

fn compare(op: Punct, lhs: &Value, rhs: &Value) -> Result<bool, EvalError> {
    let ordering = match (Num::of(lhs), Num::of(rhs), lhs, rhs) {
        (Some(a), Some(b), _, _) => a.as_f64().partial_cmp(&b.as_f64()),
        (_, _, Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    };
    match op {
        Punct::EqEq => Ok(ordering.map_or(lhs == rhs, Ordering::is_eq)),
        Punct::NotEq => Ok(!ordering.map_or(lhs == rhs, Ordering::is_eq)),
        _ => {
            let ord = ordering.ok_or_else(|| {
                EvalError::Type(format!("cannot compare {} and {}", kind(lhs), kind(rhs)))
            })?;
            Ok(match op {
                Punct::Lt => ord.is_lt(),
                Punct::Le => ord.is_le(),
                Punct::Gt => ord.is_gt(),
                _ => ord.is_ge(),
            })
        }
    }
}
