#![deny(
    unsafe_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! JSON Parser Example
//!
//! A compact recursive-descent JSON parser driven by the lexkit token
//! stream: braces, brackets, colons and commas are literal tokens, quoted
//! strings are a framed token with the standard escapes, and numbers come
//! straight from the built-in integer/float classes.
//!
//! The point of the example is the shape of a parser on top of a
//! [`Stream`]: check the current token, step, recurse.
//!
//! [`Stream`]: lexkit::Stream

use std::collections::HashMap;

use lexkit::{Stream, TokenKey, Tokenizer};
use thiserror::Error;

pub const CURLY_OPEN: i32 = 1;
pub const CURLY_CLOSE: i32 = 2;
pub const SQUARE_OPEN: i32 = 3;
pub const SQUARE_CLOSE: i32 = 4;
pub const COLON: i32 = 5;
pub const COMMA: i32 = 6;
pub const DOUBLE_QUOTED: i32 = 7;
pub const LITERAL: i32 = 8;

/// A parsed JSON document.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<JsonValue>),
    Object(HashMap<String, JsonValue>),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JsonError {
    #[error("unexpected token {found:?} on line {line} near: {context} <-- there")]
    UnexpectedToken {
        found: String,
        line: usize,
        context: String,
    },

    #[error("unexpected end on line {line} near: {context} <-- there")]
    UnexpectedEnd { line: usize, context: String },
}

pub struct JsonParser {
    tokenizer: Tokenizer,
}

impl Default for JsonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonParser {
    pub fn new() -> Self {
        let mut tokenizer = Tokenizer::new();
        tokenizer
            .define_tokens(CURLY_OPEN, &["{"])
            .define_tokens(CURLY_CLOSE, &["}"])
            .define_tokens(SQUARE_OPEN, &["["])
            .define_tokens(SQUARE_CLOSE, &["]"])
            .define_tokens(COLON, &[":"])
            .define_tokens(COMMA, &[","])
            .define_tokens(LITERAL, &["true", "false", "null"]);
        tokenizer
            .define_framed(DOUBLE_QUOTED, "\"", "\"")
            .escape(b'\\')
            .map_escape(b'"', b"\"");
        JsonParser { tokenizer }
    }

    pub fn parse(&self, json: &str) -> Result<JsonValue, JsonError> {
        let mut stream = self.tokenizer.parse_str(json);
        self.analyze(&mut stream)
    }

    /// One JSON value starting at the current token; leaves the stream just
    /// past it.
    fn analyze(&self, stream: &mut Stream<'_, '_>) -> Result<JsonValue, JsonError> {
        if stream.current().is(CURLY_OPEN) {
            stream.go_next();
            self.analyze_object(stream)
        } else if stream.current().is(SQUARE_OPEN) {
            stream.go_next();
            self.analyze_array(stream)
        } else if stream.current().is(TokenKey::INTEGER) {
            let value = stream.current().value_i64();
            stream.go_next();
            Ok(JsonValue::Int(value))
        } else if stream.current().is(TokenKey::FLOAT) {
            let value = stream.current().value_f64();
            stream.go_next();
            Ok(JsonValue::Float(value))
        } else if stream.current().is(TokenKey::STRING) {
            let value = stream.current().value_unescaped_str();
            stream.go_next();
            Ok(JsonValue::String(value))
        } else if stream.current().is(LITERAL) {
            let value = match stream.current().value() {
                b"true" => JsonValue::Bool(true),
                b"false" => JsonValue::Bool(false),
                _ => JsonValue::Null,
            };
            stream.go_next();
            Ok(value)
        } else {
            Err(error_at(stream))
        }
    }

    /// Members of `{...}`, with the opening brace already consumed.
    fn analyze_object(&self, stream: &mut Stream<'_, '_>) -> Result<JsonValue, JsonError> {
        let mut object = HashMap::new();
        loop {
            if stream.current().is(TokenKey::STRING) {
                let key = stream.current().value_unescaped_str();
                if !stream.next().is(COLON) {
                    return Err(error_at(stream));
                }
                stream.go_next();
                let value = self.analyze(stream)?;
                object.insert(key, value);
                if stream.current().is(COMMA) {
                    stream.go_next();
                    if stream.current().is(CURLY_CLOSE) {
                        return Err(error_at(stream));
                    }
                } else if !stream.current().is(CURLY_CLOSE) {
                    return Err(error_at(stream));
                }
            } else if stream.current().is(CURLY_CLOSE) {
                stream.go_next();
                return Ok(JsonValue::Object(object));
            } else {
                return Err(error_at(stream));
            }
        }
    }

    /// Items of `[...]`, with the opening bracket already consumed.
    fn analyze_array(&self, stream: &mut Stream<'_, '_>) -> Result<JsonValue, JsonError> {
        let mut array = Vec::new();
        loop {
            if stream.current().is(SQUARE_CLOSE) {
                stream.go_next();
                return Ok(JsonValue::Array(array));
            }
            array.push(self.analyze(stream)?);
            if stream.current().is(COMMA) {
                stream.go_next();
                if stream.current().is(SQUARE_CLOSE) {
                    return Err(error_at(stream));
                }
            } else if !stream.current().is(SQUARE_CLOSE) {
                return Err(error_at(stream));
            }
        }
    }
}

fn error_at(stream: &Stream<'_, '_>) -> JsonError {
    let context = stream.snippet_string(5, 0, 0);
    if stream.is_valid() {
        JsonError::UnexpectedToken {
            found: stream.current().value_str().into_owned(),
            line: stream.current().line(),
            context,
        }
    } else {
        JsonError::UnexpectedEnd {
            line: stream.current().line(),
            context,
        }
    }
}
