//! The navigable token stream.
//!
//! A stream is a cursor over the doubly-linked token list. Walking forward
//! past the lexed tail lazily pulls more lexing in streaming mode; walking
//! backward is bounded by the configured history size, which also lets the
//! stream return old nodes to the arena and the lexer drain old buffer
//! bytes.
//!
//! Stepping outside the live list parks the cursor on the `undef` sentinel.
//! The last real position is remembered, so a step in the opposite
//! direction returns to it.

use core::fmt;

use crate::arena::{NodeId, SENTINEL};
use crate::error::Error;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKey, TokenSnapshot};

/// A bidirectional cursor over lexed tokens.
///
/// Created by [`Tokenizer::parse_bytes`], [`parse_str`], or
/// [`parse_stream`]; owns the token arena and, in streaming mode, the
/// reader. Dropping the stream releases everything.
///
/// [`Tokenizer::parse_bytes`]: crate::Tokenizer::parse_bytes
/// [`parse_str`]: crate::Tokenizer::parse_str
/// [`parse_stream`]: crate::Tokenizer::parse_stream
pub struct Stream<'t, 's> {
    lexer: Lexer<'t, 's>,
    /// Whether the lexer may still produce tokens on demand.
    live: bool,
    current: NodeId,
    head: NodeId,
    /// Last real token before the cursor fell off the end.
    prev_shadow: Option<NodeId>,
    /// First real token after the cursor fell off the start.
    next_shadow: Option<NodeId>,
    /// Count of live tokens in the list.
    len: usize,
    /// How many tokens to retain behind the current one; 0 = unbounded.
    history: usize,
}

impl<'t, 's> Stream<'t, 's> {
    /// Wrap a fully lexed list (slice input).
    pub(crate) fn finished(lexer: Lexer<'t, 's>) -> Self {
        Self::build(lexer, false)
    }

    /// Wrap a list with an active lexer behind it (reader input).
    pub(crate) fn live(lexer: Lexer<'t, 's>) -> Self {
        Self::build(lexer, true)
    }

    fn build(lexer: Lexer<'t, 's>, live: bool) -> Self {
        let head = lexer.head.unwrap_or(SENTINEL);
        let len = lexer.emitted();
        Stream {
            lexer,
            live,
            current: head,
            head,
            prev_shadow: None,
            next_shadow: None,
            len,
            history: 0,
        }
    }

    /// Bound the history kept behind the current token.
    ///
    /// With a bound of `h`, stepping forward evicts the head once the
    /// current token is more than `h` ids ahead of it, so [`go_prev`] can
    /// walk back at most `h` steps. `0` (the default) keeps everything.
    ///
    /// [`go_prev`]: Self::go_prev
    pub fn set_history_size(&mut self, size: usize) -> &mut Self {
        self.history = size;
        self
    }

    /// The token under the cursor; the sentinel when out of bounds.
    #[inline]
    pub fn current(&self) -> Token<'_> {
        self.token_at(self.current)
    }

    /// The oldest retained token.
    #[inline]
    pub fn head(&self) -> Token<'_> {
        self.token_at(self.head)
    }

    /// The token after the cursor, without moving. Never triggers lexing.
    pub fn peek_next(&self) -> Token<'_> {
        let next = self.lexer.arena.get(self.current).next.unwrap_or(SENTINEL);
        self.token_at(next)
    }

    /// The token before the cursor, without moving.
    pub fn peek_prev(&self) -> Token<'_> {
        let prev = self.lexer.arena.get(self.current).prev.unwrap_or(SENTINEL);
        self.token_at(prev)
    }

    /// Whether the cursor is on a real token.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.current != SENTINEL
    }

    /// Count of live tokens currently in the list.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes of input consumed so far. In streaming mode this grows as the
    /// stream is walked; after a reader failure or a halt on an unknown
    /// byte it tells how far lexing got.
    #[inline]
    pub fn parsed_length(&self) -> usize {
        self.lexer.cursor.pos()
    }

    /// The recorded reader failure, if any.
    #[inline]
    pub fn error(&self) -> Option<&Error> {
        self.lexer.cursor.error()
    }

    /// Whitespace left after the last token, for loss-free reconstruction
    /// of the input.
    pub fn trailing_whitespace(&self) -> &[u8] {
        self.lexer.cursor.view(self.lexer.tail_ws())
    }

    /// Step forward. At the lexed tail this first asks the lexer for more;
    /// at the end of input the cursor parks on the sentinel.
    pub fn go_next(&mut self) -> &mut Self {
        if self.current != SENTINEL
            && self.live
            && self.lexer.arena.get(self.current).next.is_none()
        {
            let before = self.lexer.emitted();
            self.lexer.parse();
            self.len += self.lexer.emitted() - before;
        }
        if let Some(next) = self.lexer.arena.get(self.current).next {
            self.current = next;
            if self.history != 0 {
                let cur_id = self.lexer.arena.get(self.current).id;
                let head_id = self.lexer.arena.get(self.head).id;
                if cur_id - head_id > self.history as i64 {
                    self.evict_head();
                }
            }
        } else if self.current == SENTINEL {
            self.current = self.next_shadow.take().unwrap_or(SENTINEL);
        } else {
            self.prev_shadow = Some(self.current);
            self.current = SENTINEL;
        }
        self
    }

    /// Step backward, limited by the history bound; before the head the
    /// cursor parks on the sentinel.
    pub fn go_prev(&mut self) -> &mut Self {
        if let Some(prev) = self.lexer.arena.get(self.current).prev {
            self.current = prev;
        } else if self.current == SENTINEL {
            self.current = self.prev_shadow.take().unwrap_or(SENTINEL);
        } else {
            self.next_shadow = Some(self.current);
            self.current = SENTINEL;
        }
        self
    }

    /// Step forward and return the new current token.
    #[inline]
    pub fn next(&mut self) -> Token<'_> {
        self.go_next();
        self.current()
    }

    /// Step backward and return the new current token.
    #[inline]
    pub fn prev(&mut self) -> Token<'_> {
        self.go_prev();
        self.current()
    }

    /// Walk to the token with the given id. Ids outside the live list park
    /// the cursor on the sentinel.
    pub fn go_to(&mut self, id: i64) -> &mut Self {
        if self.current == SENTINEL {
            if let Some(prev) = self.prev_shadow {
                if id <= self.lexer.arena.get(prev).id {
                    self.go_prev();
                    while self.is_valid() && self.current_id() != id {
                        self.go_prev();
                    }
                    return self;
                }
            }
            if let Some(next) = self.next_shadow {
                if id >= self.lexer.arena.get(next).id {
                    self.go_next();
                    while self.is_valid() && self.current_id() != id {
                        self.go_next();
                    }
                }
            }
            return self;
        }
        let cur = self.current_id();
        if id > cur {
            while self.is_valid() && self.current_id() != id {
                self.go_next();
            }
        } else if id < cur {
            while self.is_valid() && self.current_id() != id {
                self.go_prev();
            }
        }
        self
    }

    /// Step forward only when the next token has one of the given keys.
    pub fn go_next_if_next_is(&mut self, keys: &[TokenKey]) -> bool {
        if self.peek_next().is_one_of(keys) {
            self.go_next();
            return true;
        }
        false
    }

    /// Whether the tokens after the cursor match `keys` exactly, in order.
    ///
    /// The cursor is restored afterwards. The history bound is raised to
    /// the sequence length for the duration of the check so the restore
    /// target cannot be evicted; the previous bound comes back on exit.
    pub fn is_next_sequence(&mut self, keys: &[TokenKey]) -> bool {
        self.lookahead(keys.len(), |stream, i| stream.next().is(keys[i]))
    }

    /// Like [`is_next_sequence`], but each position may match any key of
    /// its group.
    ///
    /// [`is_next_sequence`]: Self::is_next_sequence
    pub fn is_any_next_sequence(&mut self, groups: &[&[TokenKey]]) -> bool {
        self.lookahead(groups.len(), |stream, i| {
            stream.next().is_one_of(groups[i])
        })
    }

    fn lookahead(
        &mut self,
        depth: usize,
        mut matches: impl FnMut(&mut Self, usize) -> bool,
    ) -> bool {
        let saved_history = self.history;
        if self.history > 0 && self.history < depth {
            self.history = depth;
        }
        let start = self.current;
        let shadows = (self.prev_shadow, self.next_shadow);

        let mut result = true;
        for i in 0..depth {
            if !matches(self, i) {
                result = false;
                break;
            }
        }

        self.current = start;
        (self.prev_shadow, self.next_shadow) = shadows;
        self.history = saved_history;
        result
    }

    /// A copied window of tokens around the cursor: up to `before`
    /// predecessors, the anchor, and up to `after` successors.
    ///
    /// When the cursor is parked on the sentinel the window anchors on the
    /// remembered neighbor token.
    pub fn snippet(&self, before: usize, after: usize) -> Vec<TokenSnapshot> {
        if self.len == 0 {
            return Vec::new();
        }
        let anchor = self
            .next_shadow
            .or(self.prev_shadow)
            .unwrap_or(self.current);
        if anchor == SENTINEL {
            return Vec::new();
        }

        let arena = &self.lexer.arena;
        let mut back = Vec::new();
        let mut walker = arena.get(anchor).prev;
        while back.len() < before {
            let Some(node) = walker else { break };
            back.push(self.token_at(node).to_snapshot());
            walker = arena.get(node).prev;
        }

        let mut items = Vec::with_capacity(back.len() + 1 + after);
        items.extend(back.into_iter().rev());
        items.push(self.token_at(anchor).to_snapshot());

        let mut taken = 0;
        let mut walker = arena.get(anchor).next;
        while taken < after {
            let Some(node) = walker else { break };
            items.push(self.token_at(node).to_snapshot());
            walker = arena.get(node).next;
            taken += 1;
        }
        items
    }

    /// The snippet window rendered as text: token values concatenated, each
    /// middle-shortened to `max_len` characters when `max_len > 4`.
    pub fn snippet_string(&self, before: usize, after: usize, max_len: usize) -> String {
        let mut out = String::new();
        for snapshot in self.snippet(before, after) {
            let value = snapshot.value_str();
            if max_len > 4 && value.chars().count() > max_len {
                out.extend(value.chars().take(max_len / 2));
                out.push_str("...");
                let total = value.chars().count();
                out.extend(value.chars().skip(total - max_len / 2));
            } else {
                out.push_str(&value);
            }
        }
        out
    }

    /// Release every token back to the arena and park the cursor.
    pub fn close(&mut self) {
        let mut walker = if self.head == SENTINEL {
            None
        } else {
            Some(self.head)
        };
        while let Some(node) = walker {
            walker = self.lexer.arena.get(node).next;
            self.lexer.arena.free(node);
        }
        self.head = SENTINEL;
        self.current = SENTINEL;
        self.prev_shadow = None;
        self.next_shadow = None;
        self.len = 0;
        self.live = false;
    }

    #[inline]
    fn current_id(&self) -> i64 {
        self.lexer.arena.get(self.current).id
    }

    fn token_at(&self, id: NodeId) -> Token<'_> {
        Token {
            node: self.lexer.arena.get(id),
            cursor: &self.lexer.cursor,
            config: self.lexer.config,
        }
    }

    /// Unlink and free the head node, then let the cursor drain the bytes
    /// nothing references anymore.
    fn evict_head(&mut self) {
        let old = self.head;
        let Some(new_head) = self.lexer.arena.get(old).next else {
            return;
        };
        self.lexer.arena.get_mut(new_head).prev = None;
        let retain = self.lexer.arena.get(new_head).retain_start();
        self.head = new_head;
        self.lexer.arena.free(old);
        self.len -= 1;
        self.lexer.cursor.set_watermark(retain);
    }
}

impl fmt::Display for Stream<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut walker = if self.head == SENTINEL {
            None
        } else {
            Some(self.head)
        };
        let mut first = true;
        while let Some(node) = walker {
            if !first {
                writeln!(f)?;
            }
            first = false;
            let token = self.token_at(node);
            write!(f, "{}: {}", token.id(), token)?;
            walker = self.lexer.arena.get(node).next;
        }
        Ok(())
    }
}

impl fmt::Debug for Stream<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("len", &self.len)
            .field("current", &self.current().id())
            .field("head", &self.head().id())
            .field("history", &self.history)
            .field("parsed", &self.parsed_length())
            .finish()
    }
}
