//! Macro preprocessor
//!
//! Line-oriented conditionals and variable interpolation with delimiters that
//! stay inert under JavaScript syntax:
//!
//! ```text
//! //] if _debugMode
//! console.log("debug build");
//! //] elif flavor == "lite"
//! var lite = true;
//! //] else
//! var level = /***/level//;
//! //] endif
//! ```
//!
//! Statement lines never reach the output. Undefined names are falsy and
//! interpolate as the empty string.

use scriptcat_config::TemplateConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// A dictionary value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

pub type TemplateVars = BTreeMap<String, TemplateValue>;

impl From<bool> for TemplateValue {
    fn from(value: bool) -> Self {
        TemplateValue::Bool(value)
    }
}

impl From<i64> for TemplateValue {
    fn from(value: i64) -> Self {
        TemplateValue::Int(value)
    }
}

impl From<&str> for TemplateValue {
    fn from(value: &str) -> Self {
        TemplateValue::Str(value.to_string())
    }
}

impl From<String> for TemplateValue {
    fn from(value: String) -> Self {
        TemplateValue::Str(value)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("line {line}: unknown statement '{statement}'")]
    UnknownStatement { line: usize, statement: String },

    #[error("line {line}: '{keyword}' without a matching 'if'")]
    UnmatchedStatement { line: usize, keyword: String },

    #[error("line {line}: '{keyword}' after 'else'")]
    AfterElse { line: usize, keyword: String },

    #[error("line {line}: 'if' is never closed")]
    UnclosedIf { line: usize },

    #[error("line {line}: unterminated variable")]
    UnterminatedVariable { line: usize },

    #[error("line {line}: {message}")]
    Expression { line: usize, message: String },
}

/// Runtime value during evaluation
#[derive(Debug, Clone, PartialEq)]
enum Value {
    Undefined,
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Value {
    fn truthy(&self) -> bool {
        match self {
            Value::Undefined => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Str(s) => !s.is_empty(),
        }
    }

    fn loosely_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Bool(b), Value::Int(i)) | (Value::Int(i), Value::Bool(b)) => {
                i64::from(*b) == *i
            }
            _ => self == other,
        }
    }
}

impl From<&TemplateValue> for Value {
    fn from(value: &TemplateValue) -> Self {
        match value {
            TemplateValue::Bool(b) => Value::Bool(*b),
            TemplateValue::Int(i) => Value::Int(*i),
            TemplateValue::Str(s) => Value::Str(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => Ok(()),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Str(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Name(String),
    Int(i64),
    Str(String),
    True,
    False,
    And,
    Or,
    Not,
    Eq,
    Ne,
    LParen,
    RParen,
}

fn tokenize(expr: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '=' | '!' => {
                chars.next();
                if chars.next_if_eq(&'=').is_none() {
                    return Err(format!("expected '=' after '{}'", c));
                }
                tokens.push(if c == '=' { Token::Eq } else { Token::Ne });
            }
            '"' | '\'' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some('\\') => match chars.next() {
                            Some('n') => text.push('\n'),
                            Some('t') => text.push('\t'),
                            Some(other) => text.push(other),
                            None => return Err("unterminated string".to_string()),
                        },
                        Some(ch) if ch == c => break,
                        Some(ch) => text.push(ch),
                        None => return Err("unterminated string".to_string()),
                    }
                }
                tokens.push(Token::Str(text));
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut digits = String::new();
                digits.push(c);
                chars.next();
                while let Some(d) = chars.next_if(|d| d.is_ascii_digit()) {
                    digits.push(d);
                }
                let value = digits
                    .parse()
                    .map_err(|_| format!("invalid integer '{}'", digits))?;
                tokens.push(Token::Int(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut word = String::new();
                while let Some(w) = chars.next_if(|w| w.is_alphanumeric() || *w == '_') {
                    word.push(w);
                }
                tokens.push(match word.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "True" | "true" => Token::True,
                    "False" | "false" => Token::False,
                    _ => Token::Name(word),
                });
            }
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }
    Ok(tokens)
}

/// Recursive-descent evaluator over a token list
struct Evaluator<'a> {
    tokens: Vec<Token>,
    pos: usize,
    vars: &'a TemplateVars,
}

impl<'a> Evaluator<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn or_expr(&mut self) -> Result<Value, String> {
        let mut left = self.and_expr()?;
        while self.eat(&Token::Or) {
            let right = self.and_expr()?;
            if !left.truthy() {
                left = right;
            }
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Value, String> {
        let mut left = self.not_expr()?;
        while self.eat(&Token::And) {
            let right = self.not_expr()?;
            if left.truthy() {
                left = right;
            }
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Value, String> {
        if self.eat(&Token::Not) {
            return Ok(Value::Bool(!self.not_expr()?.truthy()));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Value, String> {
        let left = self.atom()?;
        if self.eat(&Token::Eq) {
            let right = self.atom()?;
            return Ok(Value::Bool(left.loosely_equals(&right)));
        }
        if self.eat(&Token::Ne) {
            let right = self.atom()?;
            return Ok(Value::Bool(!left.loosely_equals(&right)));
        }
        Ok(left)
    }

    fn atom(&mut self) -> Result<Value, String> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| "unexpected end of expression".to_string())?;
        self.pos += 1;
        match token {
            Token::Name(name) => Ok(self.vars.get(&name).map_or(Value::Undefined, Value::from)),
            Token::Int(i) => Ok(Value::Int(i)),
            Token::Str(s) => Ok(Value::Str(s)),
            Token::True => Ok(Value::Bool(true)),
            Token::False => Ok(Value::Bool(false)),
            Token::LParen => {
                let value = self.or_expr()?;
                if !self.eat(&Token::RParen) {
                    return Err("expected ')'".to_string());
                }
                Ok(value)
            }
            other => Err(format!("unexpected {:?}", other)),
        }
    }
}

fn evaluate(expr: &str, vars: &TemplateVars, line: usize) -> Result<Value, TemplateError> {
    let to_error = |message: String| TemplateError::Expression { line, message };
    let tokens = tokenize(expr).map_err(to_error)?;
    if tokens.is_empty() {
        return Err(to_error("empty expression".to_string()));
    }
    let mut evaluator = Evaluator {
        tokens,
        pos: 0,
        vars,
    };
    let value = evaluator.or_expr().map_err(to_error)?;
    if let Some(extra) = evaluator.peek() {
        return Err(to_error(format!("unexpected {:?}", extra)));
    }
    Ok(value)
}

/// One open `if` block
struct Frame {
    opened_at: usize,
    parent_active: bool,
    /// A branch of this block has already been taken
    taken: bool,
    active: bool,
    seen_else: bool,
}

/// Expand `template` against `vars`.
///
/// The result always ends with a newline; an empty template renders as `"\n"`.
pub fn render(
    template: &str,
    vars: &TemplateVars,
    config: &TemplateConfig,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut stack: Vec<Frame> = Vec::new();

    for (index, raw) in template.split_inclusive('\n').enumerate() {
        let line = index + 1;
        let active = stack.last().map_or(true, |frame| frame.active);

        let Some(statement) = raw.trim_start().strip_prefix(config.statement_prefix.as_str()) else {
            if active {
                interpolate(raw, vars, config, line, &mut out)?;
            }
            continue;
        };

        let statement = statement.trim();
        let statement = statement.strip_suffix(':').unwrap_or(statement).trim_end();
        let (keyword, expr) = statement
            .split_once(char::is_whitespace)
            .map_or((statement, ""), |(k, e)| (k, e.trim()));

        match keyword {
            "if" => {
                let value = evaluate(expr, vars, line)?;
                let taken = active && value.truthy();
                stack.push(Frame {
                    opened_at: line,
                    parent_active: active,
                    taken,
                    active: taken,
                    seen_else: false,
                });
            }
            "elif" => {
                let value = evaluate(expr, vars, line)?;
                let frame = open_frame(&mut stack, keyword, line)?;
                frame.active = frame.parent_active && !frame.taken && value.truthy();
                frame.taken |= frame.active;
            }
            "else" => {
                let frame = open_frame(&mut stack, keyword, line)?;
                frame.active = frame.parent_active && !frame.taken;
                frame.taken = true;
                frame.seen_else = true;
            }
            "endif" => {
                if stack.pop().is_none() {
                    return Err(TemplateError::UnmatchedStatement {
                        line,
                        keyword: keyword.to_string(),
                    });
                }
            }
            _ => {
                return Err(TemplateError::UnknownStatement {
                    line,
                    statement: statement.to_string(),
                })
            }
        }
    }

    if let Some(frame) = stack.last() {
        return Err(TemplateError::UnclosedIf {
            line: frame.opened_at,
        });
    }

    let keep = out.trim_end_matches('\n').len();
    out.truncate(keep);
    out.push('\n');
    Ok(out)
}

fn open_frame<'s>(
    stack: &'s mut [Frame],
    keyword: &str,
    line: usize,
) -> Result<&'s mut Frame, TemplateError> {
    let frame = stack
        .last_mut()
        .ok_or_else(|| TemplateError::UnmatchedStatement {
            line,
            keyword: keyword.to_string(),
        })?;
    if frame.seen_else {
        return Err(TemplateError::AfterElse {
            line,
            keyword: keyword.to_string(),
        });
    }
    Ok(frame)
}

fn interpolate(
    raw: &str,
    vars: &TemplateVars,
    config: &TemplateConfig,
    line: usize,
    out: &mut String,
) -> Result<(), TemplateError> {
    let (start, end) = (config.variable_start.as_str(), config.variable_end.as_str());
    let mut rest = raw;
    while let Some(open) = rest.find(start) {
        out.push_str(&rest[..open]);
        let after = &rest[open + start.len()..];
        let close = after
            .find(end)
            .ok_or(TemplateError::UnterminatedVariable { line })?;
        let value = evaluate(after[..close].trim(), vars, line)?;
        out.push_str(&value.to_string());
        rest = &after[close + end.len()..];
    }
    out.push_str(rest);
    Ok(())
}
