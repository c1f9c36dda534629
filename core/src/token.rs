//! Token keys, the borrowing [`Token`] handle, and owned [`TokenSnapshot`]s.
//!
//! Tokens live in the stream's arena; callers never own a token node
//! directly. [`Stream`] getters hand out [`Token`] handles that borrow the
//! stream, so the borrow checker enforces what the documentation of similar
//! APIs can only ask for politely: a handle cannot outlive the navigation
//! call that would invalidate it.
//!
//! [`Stream`]: crate::Stream

use core::fmt;
use std::borrow::Cow;

use crate::config::{FrameSpec, Tokenizer};
use crate::cursor::ByteCursor;

/// Identifies the class of a token.
///
/// Built-in classes are negative, user-defined keys are positive, and `0`
/// is the out-of-range sentinel. The numeric values are a compatibility
/// surface: callers match on them and store them in their own tables.
///
/// ```
/// use lexkit_core::TokenKey;
///
/// let field: TokenKey = 10.into();
/// assert!(field.is_user_defined());
/// assert!(!TokenKey::KEYWORD.is_user_defined());
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenKey(pub i32);

impl TokenKey {
    /// Sentinel key: the token does not exist (out-of-range access).
    pub const UNDEF: TokenKey = TokenKey(0);
    /// A run of letters and configured keyword symbols.
    pub const KEYWORD: TokenKey = TokenKey(-1);
    /// A digit-only number literal.
    pub const INTEGER: TokenKey = TokenKey(-2);
    /// A number literal with a decimal point and/or exponent.
    pub const FLOAT: TokenKey = TokenKey(-3);
    /// A complete framed (quoted) literal, delimiters included.
    pub const STRING: TokenKey = TokenKey(-4);
    /// A piece of a framed literal on either side of an injection.
    pub const STRING_FRAGMENT: TokenKey = TokenKey(-5);
    /// A single byte that matched no rule.
    pub const UNKNOWN: TokenKey = TokenKey(-6);

    /// Whether this key was registered by the caller (strictly positive).
    #[inline]
    pub const fn is_user_defined(self) -> bool {
        self.0 > 0
    }
}

impl Default for TokenKey {
    #[inline]
    fn default() -> Self {
        TokenKey::UNDEF
    }
}

impl From<i32> for TokenKey {
    #[inline]
    fn from(raw: i32) -> Self {
        TokenKey(raw)
    }
}

impl PartialEq<i32> for TokenKey {
    #[inline]
    fn eq(&self, other: &i32) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A half-open byte range in absolute input coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[inline]
    pub(crate) fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Arena-resident token data. `prev`/`next` are relations, not owners.
#[derive(Debug, Clone, Default)]
pub(crate) struct TokenNode {
    pub id: i64,
    pub key: TokenKey,
    pub value: Span,
    pub indent: Span,
    pub offset: usize,
    pub line: usize,
    pub frame: Option<u32>,
    pub prev: Option<crate::arena::NodeId>,
    pub next: Option<crate::arena::NodeId>,
}

impl TokenNode {
    /// First byte this node keeps alive: its indent if any, else its value.
    #[inline]
    pub(crate) fn retain_start(&self) -> usize {
        if self.indent.is_empty() {
            self.offset
        } else {
            self.indent.start
        }
    }
}

/// A classified, positioned slice of the input.
///
/// Handles are cheap copies that borrow the owning [`Stream`]; any method
/// that moves the stream ends their lifetime. Out-of-range accesses yield
/// the sentinel token (`id == -1`, [`TokenKey::UNDEF`]) instead of failing.
///
/// [`Stream`]: crate::Stream
#[derive(Clone, Copy)]
pub struct Token<'a> {
    pub(crate) node: &'a TokenNode,
    pub(crate) cursor: &'a ByteCursor<'a>,
    pub(crate) config: &'a Tokenizer,
}

impl<'a> Token<'a> {
    /// Sequence number of the token in the stream; `-1` for the sentinel.
    #[inline]
    pub fn id(&self) -> i64 {
        self.node.id
    }

    /// The token's key.
    #[inline]
    pub fn key(&self) -> TokenKey {
        self.node.key
    }

    /// The matched bytes, viewed directly from the lexer buffer.
    ///
    /// For a framed string this includes the delimiters; for a fragment it
    /// includes only the delimiter on the side not adjacent to an injection.
    #[inline]
    pub fn value(&self) -> &'a [u8] {
        self.cursor.view(self.node.value)
    }

    /// The value as text, with invalid UTF-8 replaced.
    #[inline]
    pub fn value_str(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.value())
    }

    /// The whitespace bytes immediately before the token.
    #[inline]
    pub fn indent(&self) -> &'a [u8] {
        self.cursor.view(self.node.indent)
    }

    /// Byte offset of the first value byte, counted from the start of the
    /// original input and accumulated across chunks.
    #[inline]
    pub fn offset(&self) -> usize {
        self.node.offset
    }

    /// 1-based line number at the token start. The sentinel reports `0`.
    #[inline]
    pub fn line(&self) -> usize {
        self.node.line
    }

    /// The frame definition behind a [`STRING`]/[`STRING_FRAGMENT`] token.
    ///
    /// [`STRING`]: TokenKey::STRING
    /// [`STRING_FRAGMENT`]: TokenKey::STRING_FRAGMENT
    #[inline]
    pub fn frame(&self) -> Option<&'a FrameSpec> {
        self.node
            .frame
            .and_then(|i| self.config.frames().get(i as usize))
    }

    /// Key of the frame this token belongs to, [`TokenKey::STRING`] when the
    /// token has no frame.
    pub fn frame_key(&self) -> TokenKey {
        self.frame().map_or(TokenKey::STRING, FrameSpec::key)
    }

    /// Whether the token exists (its key is not [`TokenKey::UNDEF`]).
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.node.key != TokenKey::UNDEF
    }

    /// Whether the token has the given key.
    #[inline]
    pub fn is(&self, key: impl Into<TokenKey>) -> bool {
        self.node.key == key.into()
    }

    /// Whether the token has any of the given keys.
    pub fn is_one_of(&self, keys: &[TokenKey]) -> bool {
        keys.iter().any(|&k| self.node.key == k)
    }

    #[inline]
    pub fn is_keyword(&self) -> bool {
        self.node.key == TokenKey::KEYWORD
    }

    #[inline]
    pub fn is_integer(&self) -> bool {
        self.node.key == TokenKey::INTEGER
    }

    #[inline]
    pub fn is_float(&self) -> bool {
        self.node.key == TokenKey::FLOAT
    }

    /// Integer or float.
    #[inline]
    pub fn is_number(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Whole framed string or a fragment of one.
    #[inline]
    pub fn is_string(&self) -> bool {
        self.node.key == TokenKey::STRING || self.node.key == TokenKey::STRING_FRAGMENT
    }

    /// The value as `i64`.
    ///
    /// Floats truncate toward zero; non-numbers yield `0`. Underscore
    /// separators are accepted when the tokenizer was configured for them.
    pub fn value_i64(&self) -> i64 {
        match self.node.key {
            TokenKey::INTEGER => digits(self.value()).parse().unwrap_or(0),
            TokenKey::FLOAT => digits(self.value()).parse::<f64>().unwrap_or(0.0) as i64,
            _ => 0,
        }
    }

    /// The value as `f64`; non-numbers yield `0.0`.
    pub fn value_f64(&self) -> f64 {
        match self.node.key {
            TokenKey::FLOAT => digits(self.value()).parse().unwrap_or(0.0),
            TokenKey::INTEGER => digits(self.value()).parse::<i64>().unwrap_or(0) as f64,
            _ => 0.0,
        }
    }

    /// The framed-string payload: delimiters stripped, escape mapping
    /// applied.
    ///
    /// An escape byte followed by an unmapped byte stops the substitution;
    /// the remainder is returned raw. Tokens without a frame come back
    /// borrowed and untouched.
    pub fn value_unescaped(&self) -> Cow<'a, [u8]> {
        let Some(frame) = self.frame() else {
            return Cow::Borrowed(self.value());
        };
        let v = self.value();
        let from = if v.starts_with(frame.start_token()) {
            frame.start_token().len()
        } else {
            0
        };
        let to = if v.len() > from && v[from..].ends_with(frame.end_token()) {
            v.len() - frame.end_token().len()
        } else {
            v.len()
        };
        let body = &v[from..to.max(from)];
        let Some(esc) = frame.escape_symbol() else {
            return Cow::Borrowed(body);
        };

        let mut out: Vec<u8> = Vec::new();
        let mut rest = body;
        while let Some(i) = rest.iter().position(|&b| b == esc) {
            let Some(replacement) = rest.get(i + 1).and_then(|&b| frame.escape_replacement(b))
            else {
                break;
            };
            out.extend_from_slice(&rest[..i]);
            out.extend_from_slice(replacement);
            rest = &rest[i + 2..];
        }
        if out.is_empty() {
            Cow::Borrowed(body)
        } else {
            out.extend_from_slice(rest);
            Cow::Owned(out)
        }
    }

    /// Like [`value_unescaped`](Self::value_unescaped), as lossy text.
    pub fn value_unescaped_str(&self) -> String {
        String::from_utf8_lossy(&self.value_unescaped()).into_owned()
    }

    /// Owned copy of this token.
    pub fn to_snapshot(&self) -> TokenSnapshot {
        TokenSnapshot {
            id: self.node.id,
            key: self.node.key,
            value: self.value().to_vec(),
            indent: self.indent().to_vec(),
            offset: self.node.offset,
            line: self.node.line,
            frame_key: self.frame().map(FrameSpec::key),
        }
    }
}

impl fmt::Debug for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("id", &self.node.id)
            .field("key", &self.node.key)
            .field("value", &self.value_str())
            .field("offset", &self.node.offset)
            .field("indent", &self.indent().len())
            .field("line", &self.node.line)
            .finish()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ id: {}, key: {}, value: {:?}, offset: {}, line: {} }}",
            self.node.id,
            self.node.key,
            self.value_str(),
            self.node.offset,
            self.node.line
        )
    }
}

/// Strip underscore digit separators before delegating to `str::parse`.
fn digits(value: &[u8]) -> Cow<'_, str> {
    if value.contains(&b'_') {
        Cow::Owned(
            value
                .iter()
                .filter(|&&b| b != b'_')
                .map(|&b| b as char)
                .collect(),
        )
    } else {
        String::from_utf8_lossy(value)
    }
}

/// A detached copy of one token, as returned by [`Stream::snippet`].
///
/// [`Stream::snippet`]: crate::Stream::snippet
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSnapshot {
    pub id: i64,
    pub key: TokenKey,
    pub value: Vec<u8>,
    pub indent: Vec<u8>,
    pub offset: usize,
    pub line: usize,
    pub frame_key: Option<TokenKey>,
}

impl TokenSnapshot {
    /// The value as text, with invalid UTF-8 replaced.
    pub fn value_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_key_values_are_stable() {
        assert_eq!(TokenKey::UNDEF.0, 0);
        assert_eq!(TokenKey::KEYWORD.0, -1);
        assert_eq!(TokenKey::INTEGER.0, -2);
        assert_eq!(TokenKey::FLOAT.0, -3);
        assert_eq!(TokenKey::STRING.0, -4);
        assert_eq!(TokenKey::STRING_FRAGMENT.0, -5);
        assert_eq!(TokenKey::UNKNOWN.0, -6);
    }

    #[test]
    fn user_keys_compare_against_raw_integers() {
        let key = TokenKey::from(42);
        assert!(key.is_user_defined());
        assert_eq!(key, 42);
        assert_ne!(key, 41);
    }

    #[test]
    fn digits_strips_separators() {
        assert_eq!(digits(b"1_000_000"), "1000000");
        assert_eq!(digits(b"123"), "123");
    }
}
