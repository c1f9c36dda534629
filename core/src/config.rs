//! Tokenizer configuration: whitespace, keyword symbol classes, literal
//! tokens, and framed-string definitions.
//!
//! Configuration is mutable only while the [`Tokenizer`] is exclusively
//! held. Every parse entry point borrows `&self` for the lifetime of the
//! returned [`Stream`], so the builder freezes the moment the first stream
//! exists and thaws when the last one is dropped, enforced by the borrow
//! checker rather than a runtime flag.
//!
//! # Example
//!
//! ```
//! use lexkit_core::{Tokenizer, TokenKey};
//!
//! const OP: i32 = 1;
//! const QUOTE: i32 = 2;
//!
//! let mut t = Tokenizer::new();
//! t.define_tokens(OP, &[">=", "<=", ">", "<"]);
//! t.define_framed(QUOTE, "\"", "\"").escape(b'\\');
//!
//! let mut stream = t.parse_str("size >= \"10\"");
//! assert!(stream.current().is_keyword());
//! assert!(stream.next().is(OP));
//! assert!(stream.next().is(TokenKey::STRING));
//! ```

use std::collections::HashMap;
use std::io::Read;

use crate::cursor::ByteCursor;
use crate::lexer::Lexer;
use crate::stream::Stream;
use crate::token::TokenKey;

/// Whitespace bytes consumed between tokens unless reconfigured:
/// space, tab, line feed, carriage return.
pub const DEFAULT_WHITESPACE: &[u8] = b" \t\n\r";

/// The decimal digits, for use as a keyword minor-symbol class.
pub const NUMBERS: &[char] = &['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

/// Underscore alone, for use as a keyword major-symbol class.
pub const UNDERSCORE: &[char] = &['_'];

/// Default refill size for streaming input.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Escape substitutions installed when a frame gains an escape byte:
/// `n` → LF, `r` → CR, `t` → TAB, `\` → `\`.
pub const DEFAULT_STRING_ESCAPES: &[(u8, &[u8])] =
    &[(b'n', b"\n"), (b'r', b"\r"), (b't', b"\t"), (b'\\', b"\\")];

/// One registered literal pattern.
#[derive(Debug, Clone)]
pub(crate) struct Literal {
    pub key: TokenKey,
    pub bytes: Vec<u8>,
}

/// A sub-region of a frame lexed recursively between two literal keys.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Injection {
    pub start_key: TokenKey,
    pub end_key: TokenKey,
}

/// Definition of a framed (quoted) string.
///
/// A frame is a region between a start pattern and an end pattern,
/// optionally with an escape byte, an escape substitution map, and
/// injections: sub-regions handed back to the full lexer, used for
/// placeholders and template expressions inside strings.
#[derive(Debug, Clone)]
pub struct FrameSpec {
    key: TokenKey,
    start: Vec<u8>,
    end: Vec<u8>,
    escape: Option<u8>,
    escapes: Vec<(u8, Vec<u8>)>,
    pub(crate) injections: Vec<Injection>,
}

impl FrameSpec {
    fn new(key: TokenKey, start: &str, end: &str) -> Self {
        FrameSpec {
            key,
            start: start.as_bytes().to_vec(),
            end: end.as_bytes().to_vec(),
            escape: None,
            escapes: Vec::new(),
            injections: Vec::new(),
        }
    }

    /// Set the escape byte and install [`DEFAULT_STRING_ESCAPES`] if no
    /// substitutions were configured yet.
    ///
    /// The escape byte keeps the end pattern from closing the frame and
    /// drives the substitution map in
    /// [`Token::value_unescaped`](crate::Token::value_unescaped).
    pub fn escape(&mut self, symbol: u8) -> &mut Self {
        self.escape = Some(symbol);
        if self.escapes.is_empty() {
            self.escapes = DEFAULT_STRING_ESCAPES
                .iter()
                .map(|&(b, rep)| (b, rep.to_vec()))
                .collect();
        }
        self
    }

    /// Replace the escape substitution map.
    pub fn special_symbols(&mut self, map: &[(u8, &[u8])]) -> &mut Self {
        self.escapes = map.iter().map(|&(b, rep)| (b, rep.to_vec())).collect();
        self
    }

    /// Add or override a single escape substitution.
    pub fn map_escape(&mut self, from: u8, to: &[u8]) -> &mut Self {
        match self.escapes.iter_mut().find(|(b, _)| *b == from) {
            Some(entry) => entry.1 = to.to_vec(),
            None => self.escapes.push((from, to.to_vec())),
        }
        self
    }

    /// Register an injection: when a literal of `start_key` appears inside
    /// the frame, the lexer recurses until it has emitted a literal of
    /// `end_key`, then resumes the frame.
    pub fn add_injection(
        &mut self,
        start_key: impl Into<TokenKey>,
        end_key: impl Into<TokenKey>,
    ) -> &mut Self {
        self.injections.push(Injection {
            start_key: start_key.into(),
            end_key: end_key.into(),
        });
        self
    }

    /// The user key emitted for this frame's tokens.
    #[inline]
    pub fn key(&self) -> TokenKey {
        self.key
    }

    /// The opening delimiter.
    #[inline]
    pub fn start_token(&self) -> &[u8] {
        &self.start
    }

    /// The closing delimiter.
    #[inline]
    pub fn end_token(&self) -> &[u8] {
        &self.end
    }

    /// The escape byte, when one is configured.
    #[inline]
    pub fn escape_symbol(&self) -> Option<u8> {
        self.escape
    }

    /// Replacement bytes for an escaped `byte`, when mapped.
    pub fn escape_replacement(&self, byte: u8) -> Option<&[u8]> {
        self.escapes
            .iter()
            .find(|(b, _)| *b == byte)
            .map(|(_, rep)| rep.as_slice())
    }
}

/// The tokenizer: all token definitions and lexing behaviors.
///
/// Build one per grammar, then create any number of [`Stream`]s from it;
/// the configuration is read-only while streams exist and may be shared
/// across threads (each stream owns its own arena and buffer).
pub struct Tokenizer {
    pub(crate) stop_on_unknown: bool,
    pub(crate) number_underscore: bool,
    pub(crate) whitespaces: Vec<u8>,
    pub(crate) kw_major: Vec<char>,
    pub(crate) kw_minor: Vec<char>,
    literals: Vec<Literal>,
    by_key: HashMap<TokenKey, Vec<u32>>,
    /// Literal indices bucketed by first byte, longest pattern first.
    index: Box<[Vec<u32>; 256]>,
    frames: Vec<FrameSpec>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Tokenizer {
            stop_on_unknown: false,
            number_underscore: false,
            whitespaces: DEFAULT_WHITESPACE.to_vec(),
            kw_major: Vec::new(),
            kw_minor: Vec::new(),
            literals: Vec::new(),
            by_key: HashMap::new(),
            index: Box::new(std::array::from_fn(|_| Vec::new())),
            frames: Vec::new(),
        }
    }

    /// Replace the whitespace byte set ([`DEFAULT_WHITESPACE`] initially).
    pub fn set_whitespaces(&mut self, ws: &[u8]) -> &mut Self {
        self.whitespaces = ws.to_vec();
        self
    }

    /// Set the keyword symbol classes.
    ///
    /// Major symbols may appear anywhere in a keyword, including the first
    /// rune; minor symbols only after the first. Consecutive repeats are
    /// not policed.
    ///
    /// ```
    /// use lexkit_core::{Tokenizer, NUMBERS, UNDERSCORE};
    ///
    /// let mut t = Tokenizer::new();
    /// t.allow_keyword_symbols(UNDERSCORE, NUMBERS);
    /// assert!(t.parse_str("_one23").current().is_keyword());
    /// ```
    pub fn allow_keyword_symbols(&mut self, major: &[char], minor: &[char]) -> &mut Self {
        self.kw_major = major.to_vec();
        self.kw_minor = minor.to_vec();
        self
    }

    /// Allow `_` anywhere in keywords. Shorthand for adding underscore to
    /// the major class.
    pub fn allow_keyword_underscore(&mut self) -> &mut Self {
        if !self.kw_major.contains(&'_') {
            self.kw_major.push('_');
        }
        self
    }

    /// Allow digits after the first rune of a keyword. Shorthand for adding
    /// the digits to the minor class.
    pub fn allow_numbers_in_keyword(&mut self) -> &mut Self {
        for &d in NUMBERS {
            if !self.kw_minor.contains(&d) {
                self.kw_minor.push(d);
            }
        }
        self
    }

    /// Allow `_` as a digit separator inside numbers, like `1_000`.
    pub fn allow_number_underscore(&mut self) -> &mut Self {
        self.number_underscore = true;
        self
    }

    /// Halt lexing at the first byte that matches no rule instead of
    /// emitting an [`UNKNOWN`](TokenKey::UNKNOWN) token. Callers detect the
    /// truncation by comparing [`Stream::parsed_length`] with the input
    /// length.
    pub fn stop_on_unknown(&mut self) -> &mut Self {
        self.stop_on_unknown = true;
        self
    }

    /// Register fixed literal patterns under a user key (≥ 1; other keys
    /// are ignored). Re-defining a key replaces its previous patterns.
    ///
    /// Within a shared first byte the longest pattern wins, regardless of
    /// definition order.
    pub fn define_tokens(&mut self, key: impl Into<TokenKey>, patterns: &[&str]) -> &mut Self {
        let key = key.into();
        if key.0 < 1 {
            return self;
        }
        let mut refs = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            if pattern.is_empty() {
                continue;
            }
            refs.push(self.literals.len() as u32);
            self.literals.push(Literal {
                key,
                bytes: pattern.as_bytes().to_vec(),
            });
        }
        self.by_key.insert(key, refs);
        self.rebuild_index();
        self
    }

    /// Define a framed string: a region between `start` and `end`, emitted
    /// under `key`. Returns the [`FrameSpec`] for chained configuration.
    ///
    /// Frames are tried in definition order. A frame with an empty start
    /// pattern is accepted but never matches.
    ///
    /// ```
    /// use lexkit_core::Tokenizer;
    ///
    /// let mut t = Tokenizer::new();
    /// t.define_framed(7, "//", "\n");
    /// let mut s = t.parse_str("x // a comment\n");
    /// s.go_next();
    /// assert_eq!(s.current().value(), b"// a comment\n");
    /// ```
    pub fn define_framed(&mut self, key: impl Into<TokenKey>, start: &str, end: &str) -> &mut FrameSpec {
        self.frames.push(FrameSpec::new(key.into(), start, end));
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Lex a byte slice into a stream of tokens. Token values borrow the
    /// input; nothing is copied.
    pub fn parse_bytes<'t, 's>(&'t self, input: &'s [u8]) -> Stream<'t, 's> {
        let mut lexer = Lexer::new(self, ByteCursor::from_slice(input));
        lexer.parse();
        Stream::finished(lexer)
    }

    /// Lex a string slice. See [`parse_bytes`](Self::parse_bytes).
    pub fn parse_str<'t, 's>(&'t self, input: &'s str) -> Stream<'t, 's> {
        self.parse_bytes(input.as_bytes())
    }

    /// Lex an unbounded reader in `chunk_size`-byte refills, lazily: more
    /// input is pulled as the stream is walked. A `chunk_size` of 0 falls
    /// back to [`DEFAULT_CHUNK_SIZE`].
    pub fn parse_stream<'t, 's, R: Read + 's>(
        &'t self,
        reader: R,
        chunk_size: usize,
    ) -> Stream<'t, 's> {
        let chunk = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };
        let mut cursor = ByteCursor::from_reader(Box::new(reader), chunk);
        cursor.preload();
        let mut lexer = Lexer::new(self, cursor);
        lexer.parse();
        Stream::live(lexer)
    }

    fn rebuild_index(&mut self) {
        for bucket in self.index.iter_mut() {
            bucket.clear();
        }
        for (i, literal) in self.literals.iter().enumerate() {
            let alive = self
                .by_key
                .get(&literal.key)
                .is_some_and(|refs| refs.contains(&(i as u32)));
            if !alive {
                continue;
            }
            if let Some(&first) = literal.bytes.first() {
                self.index[first as usize].push(i as u32);
            }
        }
        let literals = &self.literals;
        for bucket in self.index.iter_mut() {
            bucket.sort_by(|&a, &b| {
                literals[b as usize]
                    .bytes
                    .len()
                    .cmp(&literals[a as usize].bytes.len())
            });
        }
    }

    /// Literal candidates starting with `byte`, longest first.
    #[inline]
    pub(crate) fn bucket(&self, byte: u8) -> &[u32] {
        &self.index[byte as usize]
    }

    #[inline]
    pub(crate) fn literal(&self, idx: u32) -> &Literal {
        &self.literals[idx as usize]
    }

    /// Live patterns of a user key, in definition order.
    pub(crate) fn literals_for(&self, key: TokenKey) -> impl Iterator<Item = &Literal> {
        self.by_key
            .get(&key)
            .into_iter()
            .flatten()
            .map(|&i| &self.literals[i as usize])
    }

    /// The stop key for an injection end, if the key has any patterns.
    pub(crate) fn stop_key_for(&self, key: TokenKey) -> Option<TokenKey> {
        self.by_key
            .get(&key)
            .filter(|refs| !refs.is_empty())
            .map(|_| key)
    }

    /// All framed-string definitions, in registration order.
    #[inline]
    pub fn frames(&self) -> &[FrameSpec] {
        &self.frames
    }
}
