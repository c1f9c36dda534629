//! Error surface of the tokenizer.
//!
//! The lexer itself is total: malformed numbers roll back, unknown bytes
//! become [`TokenKey::UNKNOWN`] tokens, and unterminated frames extend to
//! the end of input. The only failure that can occur is the reader behind a
//! streaming parse going bad; it is recorded on the cursor and exposed
//! through [`Stream::error`], never raised mid-lexing.
//!
//! [`TokenKey::UNKNOWN`]: crate::TokenKey::UNKNOWN
//! [`Stream::error`]: crate::Stream::error

use thiserror::Error;

/// Errors recorded while feeding the tokenizer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The streaming reader failed with something other than end-of-stream.
    ///
    /// `parsed` is the number of input bytes successfully consumed before
    /// the failure; tokens emitted up to that point remain valid.
    #[error("reader failed after {parsed} bytes: {source}")]
    Read {
        parsed: usize,
        #[source]
        source: std::io::Error,
    },
}
