#![deny(
    unsafe_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! Log-Filter Query Example
//!
//! Parses filter expressions like
//!
//! ```text
//! modified > "2021-10-06 12:30:44" and bytes_in <= 100 or user_agent='curl'
//! ```
//!
//! into a flat list of comparisons joined by connectives. Field names are
//! keywords (underscore allowed), the comparison operators are one literal
//! token class, the connectives another, and values are the built-in
//! number classes or quoted strings in either quote style.

use lexkit::{Stream, TokenKey, Tokenizer};
use thiserror::Error;

const COMPARE: i32 = 10;
const CONNECT: i32 = 11;
const QUOTED: i32 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
}

impl Op {
    fn from_bytes(bytes: &[u8]) -> Option<Op> {
        match bytes {
            b">" => Some(Op::Gt),
            b">=" => Some(Op::Ge),
            b"<" => Some(Op::Lt),
            b"<=" => Some(Op::Le),
            b"=" | b"==" => Some(Op::Eq),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

/// One `field <op> value` comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: Op,
    pub value: Value,
}

/// A filter: conditions chained left to right by connectives.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub first: Condition,
    pub rest: Vec<(Connective, Condition)>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("expected {expected} on line {line} near: {context} <-- there")]
    Expected {
        expected: &'static str,
        line: usize,
        context: String,
    },

    #[error("trailing input after the filter near: {context} <-- there")]
    TrailingInput { context: String },
}

pub struct QueryParser {
    tokenizer: Tokenizer,
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryParser {
    pub fn new() -> Self {
        let mut tokenizer = Tokenizer::new();
        tokenizer.allow_keyword_symbols(lexkit::UNDERSCORE, &[]);
        tokenizer.define_tokens(COMPARE, &[">=", "<=", "==", ">", "<", "="]);
        tokenizer.define_tokens(CONNECT, &["and", "or"]);
        tokenizer.define_framed(QUOTED, "\"", "\"").escape(b'\\');
        tokenizer.define_framed(QUOTED, "'", "'").escape(b'\\');
        QueryParser { tokenizer }
    }

    pub fn parse(&self, query: &str) -> Result<Filter, QueryError> {
        let mut stream = self.tokenizer.parse_str(query);
        let first = self.condition(&mut stream)?;
        let mut rest = Vec::new();
        while stream.is_valid() {
            let connective = match stream.current().value() {
                b"and" if stream.current().is(CONNECT) => Connective::And,
                b"or" if stream.current().is(CONNECT) => Connective::Or,
                _ => {
                    return Err(QueryError::TrailingInput {
                        context: stream.snippet_string(5, 0, 0),
                    })
                }
            };
            stream.go_next();
            rest.push((connective, self.condition(&mut stream)?));
        }
        Ok(Filter { first, rest })
    }

    fn condition(&self, stream: &mut Stream<'_, '_>) -> Result<Condition, QueryError> {
        if !stream.current().is_keyword() {
            return Err(expected(stream, "a field name"));
        }
        let field = stream.current().value_str().into_owned();

        // One comparison operator, then exactly one value token.
        if !stream.is_any_next_sequence(&[
            &[TokenKey(COMPARE)],
            &[TokenKey::INTEGER, TokenKey::FLOAT, TokenKey::STRING],
        ]) {
            stream.go_next();
            return Err(expected(stream, "a comparison and a value"));
        }
        stream.go_next();
        let op = Op::from_bytes(stream.current().value()).ok_or_else(|| {
            expected(stream, "a comparison operator")
        })?;

        stream.go_next();
        let value = if stream.current().is(TokenKey::INTEGER) {
            Value::Int(stream.current().value_i64())
        } else if stream.current().is(TokenKey::FLOAT) {
            Value::Float(stream.current().value_f64())
        } else {
            Value::Text(stream.current().value_unescaped_str())
        };
        stream.go_next();

        Ok(Condition { field, op, value })
    }
}

fn expected(stream: &Stream<'_, '_>, what: &'static str) -> QueryError {
    QueryError::Expected {
        expected: what,
        line: stream.current().line(),
        context: stream.snippet_string(5, 0, 0),
    }
}
