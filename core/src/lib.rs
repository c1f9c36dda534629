#![deny(
    unsafe_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! A configurable, high-throughput lexical tokenizer with a navigable
//! token stream, built for embedding inside higher-level parsers:
//! templating, query, configuration, JSON-like, and ad-hoc languages.
//!
//! # Pipeline
//!
//! Bytes flow through a byte cursor into the lexer, which links tokens
//! into a list the [`Stream`] walks; walking the stream past the lexed
//! tail pulls more lexing on demand.
//!
#![cfg_attr(feature = "docs", doc = simple_mermaid::mermaid!("../docs/diagrams/pipeline.mmd"))]
//!
//! # Built-in and user-defined tokens
//!
//! Five built-in classes (keywords, integers, floats, framed strings,
//! and unknown bytes) are recognised out of the box, and callers
//! register the rest: fixed literal patterns under positive keys, and
//! framed (quoted) strings with optional escapes and recursive
//! *injections* for template-style placeholders.
//!
//! ```
//! use lexkit_core::{Tokenizer, TokenKey};
//!
//! const PLACEHOLDER_OPEN: i32 = 1;
//! const PLACEHOLDER_CLOSE: i32 = 2;
//! const DQUOTE: i32 = 3;
//!
//! let mut t = Tokenizer::new();
//! t.define_tokens(PLACEHOLDER_OPEN, &["{{"]);
//! t.define_tokens(PLACEHOLDER_CLOSE, &["}}"]);
//! t.define_framed(DQUOTE, "\"", "\"")
//!     .escape(b'\\')
//!     .add_injection(PLACEHOLDER_OPEN, PLACEHOLDER_CLOSE);
//!
//! let mut greeting = t.parse_str("\"hello {{ name }}\"");
//! assert!(greeting.current().is(TokenKey::STRING_FRAGMENT));
//! assert!(greeting.next().is(PLACEHOLDER_OPEN));
//! assert_eq!(greeting.next().value(), b"name");
//! ```
//!
//! # Finite and streaming input
//!
//! [`Tokenizer::parse_bytes`] lexes a slice with zero-copy token values.
//! [`Tokenizer::parse_stream`] reads an unbounded source in fixed-size
//! chunks, lexing lazily as the stream is walked; pair it with
//! [`Stream::set_history_size`] to bound memory, letting the stream evict
//! consumed tokens and recycle the bytes behind them.
//!
//! The lexer never fails: unknown bytes become tokens (or halt lexing,
//! when configured), malformed numbers roll back to their longest valid
//! prefix, unterminated strings run to the end of input, and reader
//! errors are recorded on the stream rather than thrown mid-parse.

mod arena;
mod config;
mod cursor;
mod error;
mod lexer;
mod stream;
mod token;

pub use config::{
    FrameSpec, Tokenizer, DEFAULT_CHUNK_SIZE, DEFAULT_STRING_ESCAPES, DEFAULT_WHITESPACE, NUMBERS,
    UNDERSCORE,
};
pub use error::Error;
pub use stream::Stream;
pub use token::{Token, TokenKey, TokenSnapshot};
