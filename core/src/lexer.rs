//! The lexer state machine.
//!
//! A fixed-order rule chain runs at each top-level position: whitespace,
//! then literal tokens, keywords, numbers, framed strings, and finally a
//! single [`UNKNOWN`](crate::TokenKey::UNKNOWN) byte. Literal tokens come
//! before keywords, so a literal made of letters beats the keyword
//! interpretation; within a first-byte bucket the longest pattern wins.
//!
//! In streaming mode [`parse`](Lexer::parse) is incremental: it extends the
//! token list until the input runs out or a chunk refill occurred, so one
//! call lexes roughly one chunk and the stream pulls further calls on
//! demand. Frame injections recurse into the same loop with a stop key; a
//! recursive pass ignores the refill yield and returns only once the
//! injection's end literal has been emitted (or the input ended).

use bstr::decode_utf8;

use crate::arena::{NodeId, TokenArena};
use crate::config::Tokenizer;
use crate::cursor::ByteCursor;
use crate::token::{Span, TokenKey, TokenNode};

pub(crate) struct Lexer<'t, 's> {
    pub(crate) config: &'t Tokenizer,
    pub(crate) cursor: ByteCursor<'s>,
    pub(crate) arena: TokenArena,
    pub(crate) head: Option<NodeId>,
    tail: Option<NodeId>,
    /// Next token id; also the count of tokens emitted so far.
    next_id: i64,
    /// Current 1-based line.
    line: usize,
    /// Whitespace run preceding the next token.
    pending_indent: Span,
    /// Line at the start of the next token.
    pending_line: usize,
    /// Key of the most recently emitted token.
    last_key: Option<TokenKey>,
    /// Active injection stop key; saved and restored around recursion.
    stop_key: Option<TokenKey>,
    /// Whitespace left over after the last token.
    tail_ws: Span,
}

impl<'t, 's> Lexer<'t, 's> {
    pub(crate) fn new(config: &'t Tokenizer, cursor: ByteCursor<'s>) -> Self {
        Lexer {
            config,
            cursor,
            arena: TokenArena::new(),
            head: None,
            tail: None,
            next_id: 0,
            line: 1,
            pending_indent: Span::default(),
            pending_line: 1,
            last_key: None,
            stop_key: None,
            tail_ws: Span::default(),
        }
    }

    /// Total tokens emitted over the lexer's lifetime.
    #[inline]
    pub(crate) fn emitted(&self) -> usize {
        self.next_id as usize
    }

    #[inline]
    pub(crate) fn tail_ws(&self) -> Span {
        self.tail_ws
    }

    /// Extend the token list; see the module docs for the yield points.
    pub(crate) fn parse(&mut self) {
        self.run(false);
    }

    fn run(&mut self, nested: bool) {
        if !self.cursor.has_pending() && !self.cursor.load_chunk() {
            return;
        }
        self.cursor.sync_current();
        if !nested {
            self.cursor.reset_refill();
        }
        loop {
            self.cursor.checkpoint();
            if !nested && self.cursor.refilled() {
                break;
            }
            if self.stop_key.is_some() && self.stop_key == self.last_key {
                return;
            }
            self.parse_whitespace();
            if self.cursor.current() == 0 {
                break;
            }
            if self.parse_literal() {
                continue;
            }
            if self.cursor.current() == 0 {
                break;
            }
            if self.parse_keyword() {
                continue;
            }
            if self.cursor.current() == 0 {
                break;
            }
            if self.parse_number() {
                continue;
            }
            if self.cursor.current() == 0 {
                break;
            }
            if self.parse_framed() {
                continue;
            }
            if self.cursor.current() == 0 {
                break;
            }
            if self.config.stop_on_unknown {
                break;
            }
            let pos = self.cursor.pos();
            self.emit(TokenKey::UNKNOWN, Span::new(pos, pos + 1), None);
            self.cursor.advance();
        }
        if !nested && !self.pending_indent.is_empty() {
            self.tail_ws = self.pending_indent;
        }
    }

    /// Consume the whitespace run before the next token, tracking lines.
    fn parse_whitespace(&mut self) {
        let mut start = None;
        loop {
            let b = self.cursor.current();
            if b == 0 || !self.config.whitespaces.contains(&b) {
                break;
            }
            if start.is_none() {
                start = Some(self.cursor.pos());
            }
            if b == b'\n' {
                self.line += 1;
            }
            self.cursor.advance();
        }
        if let Some(start) = start {
            self.pending_line = self.line;
            self.pending_indent = Span::new(start, self.cursor.pos());
        }
    }

    /// Try the literal bucket for the current byte, longest pattern first.
    fn parse_literal(&mut self) -> bool {
        let config = self.config;
        let start = self.cursor.pos();
        for &idx in config.bucket(self.cursor.current()) {
            let literal = config.literal(idx);
            if self.cursor.match_bytes(&literal.bytes, true) {
                self.emit(
                    literal.key,
                    Span::new(start, start + literal.bytes.len()),
                    None,
                );
                return true;
            }
        }
        false
    }

    /// A maximal run of letters and configured keyword symbols.
    ///
    /// Runes are UTF-8 decoded with up to four bytes of lookahead; a
    /// malformed lead byte is not a letter and ends the run.
    fn parse_keyword(&mut self) -> bool {
        let config = self.config;
        let mut start = None;
        while self.cursor.current() != 0 {
            self.cursor.ensure(3);
            let (ch, size) = decode_utf8(self.cursor.lookahead(4));
            let accepted = match ch {
                Some(c) => {
                    c.is_alphabetic()
                        || config.kw_major.contains(&c)
                        || (start.is_some() && config.kw_minor.contains(&c))
                }
                None => false,
            };
            if !accepted {
                break;
            }
            if start.is_none() {
                start = Some(self.cursor.pos());
            }
            self.cursor.advance_by(size);
        }
        match start {
            Some(start) => {
                self.emit(
                    TokenKey::KEYWORD,
                    Span::new(start, self.cursor.pos()),
                    None,
                );
                true
            }
            None => false,
        }
    }

    /// Coefficient → mantissa → exponent recogniser.
    ///
    /// `last` only advances on digits and accepted points, so a dangling
    /// `e`/`E` (with or without a sign) rolls back out of the token and is
    /// re-lexed as a keyword. The token is Integer unless a float trait
    /// (point or exponent) survived inside the accepted range.
    fn parse_number(&mut self) -> bool {
        let entry = self.cursor.pos();
        let mut start = None;
        let mut last = None;
        let mut float_trait = None;
        let mut has_point = false;
        let mut has_number = false;
        let mut has_exp = false;

        loop {
            let b = self.cursor.current();
            if b == 0 {
                break;
            }
            if b.is_ascii_digit() {
                if start.is_none() {
                    start = Some(self.cursor.pos());
                }
                last = Some(self.cursor.pos());
                has_number = true;
            } else {
                let next = self.cursor.peek(1);
                if b == b'_' {
                    if !has_number
                        || !self.config.number_underscore
                        || !next.is_ascii_digit()
                    {
                        break;
                    }
                } else if b == b'.' {
                    if has_point {
                        break;
                    } else if next.is_ascii_digit() {
                        // Floats may start from the point: `.2`.
                        if start.is_none() {
                            start = Some(self.cursor.pos());
                        }
                    } else if !(next == b'e' || next == b'E' || next == 0) {
                        break;
                    }
                    float_trait = Some(self.cursor.pos());
                    last = Some(self.cursor.pos());
                    has_point = true;
                } else if b == b'e' || b == b'E' {
                    if !has_number
                        || !(next.is_ascii_digit() || next == b'-' || next == b'+')
                        || has_exp
                    {
                        break;
                    }
                    float_trait = Some(self.cursor.pos());
                    has_exp = true;
                    has_point = true;
                } else if has_exp && (b == b'-' || b == b'+') {
                    if !next.is_ascii_digit() {
                        break;
                    }
                } else {
                    break;
                }
            }
            self.cursor.advance();
        }

        let (Some(start), Some(last)) = (start, last) else {
            // Nothing valid was recognised; undo any speculative progress.
            self.cursor.seek(entry);
            return false;
        };
        let end = last + 1;
        self.cursor.seek(end);
        let key = match float_trait {
            Some(ft) if ft <= last => TokenKey::FLOAT,
            _ => TokenKey::INTEGER,
        };
        self.emit(key, Span::new(start, end), None);
        true
    }

    /// Framed (quoted) string, with recursive injections.
    fn parse_framed(&mut self) -> bool {
        let config = self.config;
        let open = self.cursor.pos();
        let mut found = None;
        for (i, frame) in config.frames().iter().enumerate() {
            if frame.start_token().is_empty() {
                continue;
            }
            if self.cursor.match_bytes(frame.start_token(), true) {
                found = Some((i as u32, frame));
                break;
            }
        }
        let Some((frame_idx, frame)) = found else {
            return false;
        };

        let mut key = TokenKey::STRING;
        let mut segment = open;
        let mut escaped = false;
        loop {
            let b = self.cursor.current();
            if b == 0 {
                break;
            }
            if escaped {
                escaped = false;
            } else if frame.escape_symbol() == Some(b) {
                escaped = true;
            } else if self.cursor.match_bytes(frame.end_token(), true) {
                break;
            } else if self.enter_injection(frame_idx, &mut key, &mut segment) {
                // The byte after the injection may itself close the frame
                // or open the next injection; re-examine it.
                continue;
            }
            if self.cursor.current() == b'\n' {
                self.line += 1;
            }
            self.cursor.advance();
        }
        self.emit(key, Span::new(segment, self.cursor.pos()), Some(frame_idx));
        true
    }

    /// Match an injection start literal at the cursor; on a hit, emit the
    /// fragment so far plus the start literal, recurse until the end
    /// literal, and reset the segment behind it.
    fn enter_injection(&mut self, frame_idx: u32, key: &mut TokenKey, segment: &mut usize) -> bool {
        let config = self.config;
        let frame = &config.frames()[frame_idx as usize];
        for injection in &frame.injections {
            for literal in config.literals_for(injection.start_key) {
                let lit_start = self.cursor.pos();
                if !self.cursor.match_bytes(&literal.bytes, true) {
                    continue;
                }
                self.emit(
                    TokenKey::STRING_FRAGMENT,
                    Span::new(*segment, lit_start),
                    Some(frame_idx),
                );
                self.emit(
                    literal.key,
                    Span::new(lit_start, lit_start + literal.bytes.len()),
                    None,
                );

                let saved = self.stop_key;
                self.stop_key = config.stop_key_for(injection.end_key);
                self.run(true);
                self.stop_key = saved;

                *key = TokenKey::STRING_FRAGMENT;
                *segment = self.cursor.pos();
                return true;
            }
        }
        false
    }

    /// Append a token: the pending indent and line attach here, ids stay
    /// dense, and the list links grow at the tail.
    fn emit(&mut self, key: TokenKey, value: Span, frame: Option<u32>) {
        let node = TokenNode {
            id: self.next_id,
            key,
            value,
            indent: core::mem::take(&mut self.pending_indent),
            offset: value.start,
            line: self.pending_line,
            frame,
            prev: self.tail,
            next: None,
        };
        let id = self.arena.alloc(node);
        match self.tail {
            Some(tail) => self.arena.get_mut(tail).next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.next_id += 1;
        self.pending_line = self.line;
        self.last_key = Some(key);
    }
}
