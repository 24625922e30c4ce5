//! Path expression parser.

use crate::types::*;
use serde_json::Value;
use thiserror::Error;

/// Token reserved for "select no fields".
pub const NONE_SENTINEL: &str = "none";

/// Deepest predicate nesting accepted. Each `!`, `(` and `&&` adds a level.
pub const MAX_PREDICATE_DEPTH: usize = 128;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("Empty path")]
    EmptyPath,
    #[error("Unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("Unexpected end of input")]
    UnexpectedEnd,
    #[error("Unclosed bracket")]
    UnclosedBracket,
    #[error("Unclosed string")]
    UnclosedString,
    #[error("Invalid escape sequence")]
    InvalidEscape,
    #[error("Invalid number")]
    InvalidNumber,
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),
    #[error("Invalid operand at position {pos}")]
    InvalidOperand { pos: usize },
    #[error("Predicate nested deeper than {} levels at position {pos}", MAX_PREDICATE_DEPTH)]
    TooDeep { pos: usize },
}

/// Path expression parser.
///
/// Accepts relative paths (`note[?(@.id>=2)]`), root-anchored paths
/// (`$.attachment`, `$['id','href']`) and per-element paths (`$[*].channel.name`).
pub struct PathParser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> PathParser<'a> {
    /// Parse a path expression, recognising the `none` sentinel.
    pub fn parse(input: &'a str) -> Result<ParsedPath, ParseError> {
        Self::parse_with_sentinel(input, NONE_SENTINEL)
    }

    /// Parse a path expression with a custom "no fields" sentinel.
    pub fn parse_with_sentinel(input: &'a str, sentinel: &str) -> Result<ParsedPath, ParseError> {
        if input.trim() == sentinel {
            return Ok(ParsedPath::NoFields);
        }
        Self::parse_path(input).map(ParsedPath::Path)
    }

    /// Parse a path expression where `none` has no special meaning.
    pub fn parse_path(input: &'a str) -> Result<QueryPath, ParseError> {
        let mut parser = Self {
            input: input.trim(),
            pos: 0,
            depth: 0,
        };
        parser.parse_query_path()
    }

    fn parse_query_path(&mut self) -> Result<QueryPath, ParseError> {
        if self.is_at_end() {
            return Err(ParseError::EmptyPath);
        }

        let mut anchor = Anchor::Document;
        let mut segments = Vec::new();

        if self.peek() == Some('$') {
            self.advance();
            if self.peek_str("[*]") {
                self.advance_by(3);
                anchor = Anchor::EachElement;
            }
        } else if self.peek() != Some('[') {
            // Relative path: the first step has no leading dot.
            segments.push(self.parse_step()?);
        }

        while let Some(c) = self.peek() {
            match c {
                '.' => {
                    self.advance();
                    if self.peek() == Some('.') {
                        return Err(self.unexpected());
                    }
                    segments.push(self.parse_step()?);
                }
                '[' => segments.push(self.parse_bracket()?),
                _ => return Err(self.unexpected()),
            }
        }

        Ok(QueryPath::new(anchor, segments))
    }

    fn parse_step(&mut self) -> Result<Segment, ParseError> {
        if self.peek() == Some('*') {
            self.advance();
            return Ok(Segment::Wildcard);
        }
        Ok(Segment::Name(self.parse_identifier()?))
    }

    fn parse_bracket(&mut self) -> Result<Segment, ParseError> {
        self.expect('[')?;
        self.skip_whitespace();

        let segment = match self.peek() {
            None => return Err(ParseError::UnclosedBracket),
            Some('*') => {
                self.advance();
                Segment::Wildcard
            }
            Some('?') => {
                self.advance();
                self.skip_whitespace();
                self.expect('(')?;
                let predicate = self.parse_and_expression()?;
                self.skip_whitespace();
                self.expect(')')?;
                Segment::Filter(predicate)
            }
            Some('\'') | Some('"') => {
                let mut names = vec![self.parse_string()?];
                loop {
                    self.skip_whitespace();
                    if self.peek() != Some(',') {
                        break;
                    }
                    self.advance();
                    self.skip_whitespace();
                    match self.peek() {
                        Some('\'') | Some('"') => names.push(self.parse_string()?),
                        None => return Err(ParseError::UnclosedBracket),
                        Some(_) => return Err(self.unexpected()),
                    }
                }
                if names.len() == 1 {
                    Segment::Name(names.remove(0))
                } else {
                    Segment::Names(names)
                }
            }
            Some(_) => return Err(self.unexpected()),
        };

        self.skip_whitespace();
        self.expect(']')?;
        Ok(segment)
    }

    fn parse_and_expression(&mut self) -> Result<Predicate, ParseError> {
        let entry_depth = self.depth;
        let mut left = self.parse_unary_expression()?;

        loop {
            self.skip_whitespace();
            if self.peek_str("&&") {
                // Conjunctions fold to the left, so every `&&` deepens the tree.
                self.descend()?;
                self.advance_by(2);
                let right = self.parse_unary_expression()?;
                left = Predicate::And(Box::new(left), Box::new(right));
            } else if self.peek_str("||") {
                return Err(ParseError::UnknownOperator("||".to_string()));
            } else {
                break;
            }
        }

        self.depth = entry_depth;
        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> Result<Predicate, ParseError> {
        self.skip_whitespace();

        if self.peek() == Some('!') && !self.peek_str("!=") {
            self.descend()?;
            self.advance();
            let inner = self.parse_unary_expression()?;
            self.depth -= 1;
            return Ok(Predicate::Not(Box::new(inner)));
        }

        if self.peek() == Some('(') {
            self.descend()?;
            self.advance();
            let inner = self.parse_and_expression()?;
            self.skip_whitespace();
            self.expect(')')?;
            self.depth -= 1;
            return Ok(inner);
        }

        self.parse_comparison()
    }

    fn descend(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_PREDICATE_DEPTH {
            return Err(ParseError::TooDeep { pos: self.pos });
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_comparison(&mut self) -> Result<Predicate, ParseError> {
        let left = self.parse_operand()?;
        self.skip_whitespace();

        let start = self.pos;
        while matches!(self.peek(), Some('=' | '!' | '<' | '>' | '~')) {
            self.advance();
        }
        if self.pos == start {
            return Ok(Predicate::Truthy(left));
        }

        let operator = match &self.input[start..self.pos] {
            "==" => ComparisonOperator::Equal,
            "!=" => ComparisonOperator::NotEqual,
            "<" => ComparisonOperator::Less,
            "<=" => ComparisonOperator::LessEqual,
            ">" => ComparisonOperator::Greater,
            ">=" => ComparisonOperator::GreaterEqual,
            other => return Err(ParseError::UnknownOperator(other.to_string())),
        };
        let right = self.parse_operand()?;

        Ok(Predicate::Comparison {
            operator,
            left,
            right,
        })
    }

    fn parse_operand(&mut self) -> Result<Operand, ParseError> {
        self.skip_whitespace();
        let pos = self.pos;

        match self.peek() {
            None => Err(ParseError::UnexpectedEnd),
            Some('@') => {
                self.advance();
                match self.peek() {
                    Some('.') => {
                        self.advance();
                        Ok(Operand::Field(self.parse_identifier()?))
                    }
                    Some('[') => {
                        self.advance();
                        self.skip_whitespace();
                        if !matches!(self.peek(), Some('\'' | '"')) {
                            return Err(ParseError::InvalidOperand { pos });
                        }
                        let name = self.parse_string()?;
                        self.skip_whitespace();
                        self.expect(']')?;
                        Ok(Operand::Field(name))
                    }
                    _ => Err(ParseError::InvalidOperand { pos }),
                }
            }
            Some('\'') | Some('"') => Ok(Operand::Literal(Value::String(self.parse_string()?))),
            Some('-') | Some('0'..='9') => Ok(Operand::Literal(self.parse_number()?)),
            Some(_) if self.peek_keyword("true") => {
                self.advance_by(4);
                Ok(Operand::Literal(Value::Bool(true)))
            }
            Some(_) if self.peek_keyword("false") => {
                self.advance_by(5);
                Ok(Operand::Literal(Value::Bool(false)))
            }
            Some(_) => Err(ParseError::InvalidOperand { pos }),
        }
    }

    fn parse_number(&mut self) -> Result<Value, ParseError> {
        let start = self.pos;

        if self.peek() == Some('-') {
            self.advance();
        }
        if !matches!(self.peek(), Some('0'..='9')) {
            return Err(ParseError::InvalidNumber);
        }
        self.skip_digits();

        let mut integral = true;
        if self.peek() == Some('.') {
            integral = false;
            self.advance();
            if !matches!(self.peek(), Some('0'..='9')) {
                return Err(ParseError::InvalidNumber);
            }
            self.skip_digits();
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            integral = false;
            self.advance();
            if matches!(self.peek(), Some('+' | '-')) {
                self.advance();
            }
            if !matches!(self.peek(), Some('0'..='9')) {
                return Err(ParseError::InvalidNumber);
            }
            self.skip_digits();
        }

        let text = &self.input[start..self.pos];
        if integral {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Value::from(n));
            }
        }
        let n = text.parse::<f64>().map_err(|_| ParseError::InvalidNumber)?;
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .ok_or(ParseError::InvalidNumber)
    }

    fn parse_identifier(&mut self) -> Result<String, ParseError> {
        let start = self.pos;

        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' || c == '@' {
                self.advance();
            } else {
                break;
            }
        }

        if self.pos == start {
            return Err(if self.is_at_end() {
                ParseError::UnexpectedEnd
            } else {
                self.unexpected()
            });
        }

        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_string(&mut self) -> Result<String, ParseError> {
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.unexpected()),
        };
        self.advance();

        let mut result = String::new();

        loop {
            match self.peek() {
                None => return Err(ParseError::UnclosedString),
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('\\') => result.push('\\'),
                        Some('\'') => result.push('\''),
                        Some('"') => result.push('"'),
                        _ => return Err(ParseError::InvalidEscape),
                    }
                    self.advance();
                }
                Some(c) => {
                    result.push(c);
                    self.advance();
                }
            }
        }

        Ok(result)
    }

    fn skip_digits(&mut self) {
        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        self.peek_str(keyword)
            && !self.input[self.pos + keyword.len()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric() || c == '_')
    }

    fn peek_str(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn unexpected(&self) -> ParseError {
        match self.peek() {
            Some(ch) => ParseError::UnexpectedChar { ch, pos: self.pos },
            None => ParseError::UnexpectedEnd,
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.advance();
                Ok(())
            }
            None if matches!(expected, ']' | ')') => Err(ParseError::UnclosedBracket),
            _ => Err(self.unexpected()),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }
}
