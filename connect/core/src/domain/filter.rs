// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Filter Expressions
//!
//! A small boolean query language used to select resources from
//! a collection:
//!
//! ```text
//! @.spec.credentials.username=='john' || @.spec.credentials.username=='janie'
//! ```
//!
//! ## Grammar
//!
//! ```text
//! filter     := clause ( connective clause )*
//! connective := "&&" | "||"
//! clause     := "@." path op literal
//! path       := segment ( "." segment )*
//! op         := "==" | "!="
//! literal    := "'" chars "'" | '"' chars '"' | bare-token
//! ```
//!
//! Clauses are combined strictly left to right; there is no operator
//! precedence and no parenthesised grouping. `a || b && c` is `(a || b) && c`.
//!
//! Parsing is total: an input either yields a `FilterExpression` or a
//! `FilterSyntaxError`. Nothing is partially applied.
//!
//! ## Evaluation
//!
//! A path that does not resolve makes its clause false, for both operators.
//! Strings compare verbatim; numbers and booleans compare through their JSON
//! text, so `@.spec.enabled==true` works. Objects, arrays and `null` are not
//! comparable and make the clause false. Numeric segments index arrays.
//!
//! Evaluation short-circuits.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid filter expression at position {position}: {message}")]
pub struct FilterSyntaxError {
    pub position: usize,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub path: Vec<String>,
    pub comparison: Comparison,
    pub literal: String,
}

impl Clause {
    pub fn matches(&self, document: &Value) -> bool {
        let Some(text) = resolve(document, &self.path).and_then(scalar_text) else {
            return false;
        };
        match self.comparison {
            Comparison::Equal => text == self.literal,
            Comparison::NotEqual => text != self.literal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExpression {
    head: Clause,
    tail: Vec<(Connective, Clause)>,
}

impl FilterExpression {
    pub fn parse(input: &str) -> Result<Self, FilterSyntaxError> {
        Parser::new(input).expression()
    }

    pub fn matches(&self, document: &Value) -> bool {
        self.tail
            .iter()
            .fold(self.head.matches(document), |acc, (connective, clause)| {
                match connective {
                    Connective::And => acc && clause.matches(document),
                    Connective::Or => acc || clause.matches(document),
                }
            })
    }

    pub fn clauses(&self) -> impl Iterator<Item = &Clause> {
        std::iter::once(&self.head).chain(self.tail.iter().map(|(_, c)| c))
    }
}

impl FromStr for FilterExpression {
    type Err = FilterSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.comparison {
            Comparison::Equal => "==",
            Comparison::NotEqual => "!=",
        };
        let literal = self.literal.replace('\\', "\\\\").replace('\'', "\\'");
        write!(f, "@.{}{}'{}'", self.path.join("."), op, literal)
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head)?;
        for (connective, clause) in &self.tail {
            let op = match connective {
                Connective::And => "&&",
                Connective::Or => "||",
            };
            write!(f, " {} {}", op, clause)?;
        }
        Ok(())
    }
}

fn resolve<'v>(document: &'v Value, path: &[String]) -> Option<&'v Value> {
    path.iter().try_fold(document, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

// ============================================================================
// Parser
// ============================================================================

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn expression(mut self) -> Result<FilterExpression, FilterSyntaxError> {
        let head = self.clause()?;
        let mut tail = Vec::new();

        loop {
            self.skip_whitespace();
            let Some(c) = self.peek() else { break };
            let connective = if self.eat("&&") {
                Connective::And
            } else if self.eat("||") {
                Connective::Or
            } else {
                return Err(self.error(format!("unexpected character '{}'", c)));
            };
            tail.push((connective, self.clause()?));
        }

        Ok(FilterExpression { head, tail })
    }

    fn clause(&mut self) -> Result<Clause, FilterSyntaxError> {
        self.skip_whitespace();
        if !self.eat("@.") {
            return Err(self.error("expected '@.' at the start of a clause"));
        }

        let path = self.path()?;

        self.skip_whitespace();
        let comparison = if self.eat("==") {
            Comparison::Equal
        } else if self.eat("!=") {
            Comparison::NotEqual
        } else {
            return Err(self.error("expected '==' or '!='"));
        };

        self.skip_whitespace();
        let literal = self.literal()?;

        Ok(Clause {
            path,
            comparison,
            literal,
        })
    }

    fn path(&mut self) -> Result<Vec<String>, FilterSyntaxError> {
        let mut segments = Vec::new();
        loop {
            let segment = self.take_while(is_path_char);
            if segment.is_empty() {
                return Err(self.error("expected a path segment"));
            }
            segments.push(segment);
            if self.peek() == Some('.') {
                self.pos += 1;
            } else {
                return Ok(segments);
            }
        }
    }

    fn literal(&mut self) -> Result<String, FilterSyntaxError> {
        match self.peek() {
            Some(quote @ ('\'' | '"')) => {
                let start = self.pos;
                self.pos += 1;
                let mut literal = String::new();
                loop {
                    match self.next() {
                        None => {
                            return Err(FilterSyntaxError {
                                position: start,
                                message: "unterminated string literal".to_string(),
                            })
                        }
                        Some('\\') => match self.next() {
                            Some(escaped) => literal.push(escaped),
                            None => return Err(self.error("unterminated escape sequence")),
                        },
                        Some(c) if c == quote => return Ok(literal),
                        Some(c) => literal.push(c),
                    }
                }
            }
            Some(c) if is_bare_char(c) => Ok(self.take_while(is_bare_char)),
            _ => Err(self.error("expected a literal value")),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn take_while(&mut self, predicate: fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().is_some_and(predicate) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn eat(&mut self, token: &str) -> bool {
        let matches = token
            .chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.pos + i) == Some(&c));
        if matches {
            self.pos += token.chars().count();
        }
        matches
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> FilterSyntaxError {
        FilterSyntaxError {
            position: self.pos,
            message: message.into(),
        }
    }
}

fn is_path_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn is_bare_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '\'' | '"' | '&' | '|' | '=' | '!' | '(' | ')')
}
