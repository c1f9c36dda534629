//! The byte cursor: one logical byte sequence over two buffer modes.
//!
//! The lexer sees a single "current byte" with lookahead, multi-byte match,
//! and advance, and never learns whether the bytes come from a caller-owned
//! slice or from a reader refilled in chunks. All positions handed out by
//! the cursor are absolute offsets from the start of the original input;
//! views translate through the number of bytes already drained.
//!
//! A NUL byte reads as 0, which is also the end-of-data marker, so `\x00`
//! terminates the current chunk: the cursor parks on it and never advances
//! past. Callers must not embed NUL in input they care about.

use std::io::{ErrorKind, Read};

use crate::error::Error;
use crate::token::Span;

/// Backing storage: the caller's slice, or an owned growing buffer.
pub(crate) enum Buffer<'s> {
    Borrowed(&'s [u8]),
    Owned {
        data: Vec<u8>,
        /// Bytes drained off the front since the start of input.
        base: usize,
    },
}

impl Buffer<'_> {
    /// Absolute offset one past the last loaded byte.
    #[inline]
    fn end(&self) -> usize {
        match self {
            Buffer::Borrowed(s) => s.len(),
            Buffer::Owned { data, base } => base + data.len(),
        }
    }

    #[inline]
    fn byte_at(&self, pos: usize) -> u8 {
        match self {
            Buffer::Borrowed(s) => s.get(pos).copied().unwrap_or(0),
            Buffer::Owned { data, base } => {
                data.get(pos.wrapping_sub(*base)).copied().unwrap_or(0)
            }
        }
    }

    fn view(&self, span: Span) -> &[u8] {
        match self {
            Buffer::Borrowed(s) => {
                let start = span.start.min(s.len());
                let end = span.end.clamp(start, s.len());
                &s[start..end]
            }
            Buffer::Owned { data, base } => {
                let start = span.start.saturating_sub(*base).min(data.len());
                let end = span.end.saturating_sub(*base).clamp(start, data.len());
                &data[start..end]
            }
        }
    }
}

/// Streaming byte source for the lexer.
pub(crate) struct ByteCursor<'s> {
    buf: Buffer<'s>,
    reader: Option<Box<dyn Read + 's>>,
    chunk_size: usize,
    /// Absolute position of the current byte.
    pos: usize,
    /// Cached `byte_at(pos)`; 0 once exhausted.
    curr: u8,
    /// Set whenever a refill ran; the top-level lex loop yields on it.
    refilled: bool,
    /// Lowest absolute offset still covered by a live token view. Bytes
    /// below `min(pos, watermark)` may be drained at a checkpoint.
    watermark: usize,
    error: Option<Error>,
}

impl<'s> ByteCursor<'s> {
    pub(crate) fn from_slice(input: &'s [u8]) -> Self {
        ByteCursor {
            curr: input.first().copied().unwrap_or(0),
            buf: Buffer::Borrowed(input),
            reader: None,
            chunk_size: 0,
            pos: 0,
            refilled: false,
            watermark: 0,
            error: None,
        }
    }

    pub(crate) fn from_reader(reader: Box<dyn Read + 's>, chunk_size: usize) -> Self {
        ByteCursor {
            buf: Buffer::Owned {
                data: Vec::with_capacity(chunk_size),
                base: 0,
            },
            reader: Some(reader),
            chunk_size,
            pos: 0,
            curr: 0,
            refilled: false,
            watermark: 0,
            error: None,
        }
    }

    /// Load the first chunk of a streaming source.
    pub(crate) fn preload(&mut self) {
        self.load_chunk();
        self.refilled = false;
        self.sync_current();
    }

    /// The current byte; 0 at end of data or on an embedded NUL.
    #[inline]
    pub(crate) fn current(&self) -> u8 {
        self.curr
    }

    /// Absolute position of the current byte, which is also the count of
    /// bytes fully consumed.
    #[inline]
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Whether unconsumed bytes remain in the buffer.
    #[inline]
    pub(crate) fn has_pending(&self) -> bool {
        self.pos < self.buf.end()
    }

    /// Re-read the cached current byte after external position changes.
    #[inline]
    pub(crate) fn sync_current(&mut self) {
        self.curr = self.buf.byte_at(self.pos);
    }

    /// Move one byte forward, refilling from the reader at the buffer end.
    pub(crate) fn advance(&mut self) {
        self.pos += 1;
        if self.pos >= self.buf.end() && !self.load_chunk() {
            self.pos = self.pos.min(self.buf.end());
            self.curr = 0;
            return;
        }
        self.curr = self.buf.byte_at(self.pos);
    }

    /// Move forward `n` bytes (used for multi-byte runes).
    pub(crate) fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    /// Rewind (or hold) the position; `pos` must not exceed the current
    /// position. Used by the number recogniser to roll back a speculative
    /// exponent.
    pub(crate) fn seek(&mut self, pos: usize) {
        self.pos = pos;
        self.sync_current();
    }

    /// The byte `k` positions ahead, or 0 when unavailable even after a
    /// refill.
    pub(crate) fn peek(&mut self, k: usize) -> u8 {
        if self.ensure(k) {
            self.buf.byte_at(self.pos + k)
        } else {
            0
        }
    }

    /// Best-effort guarantee that the bytes `pos..=pos + n` are loaded.
    pub(crate) fn ensure(&mut self, n: usize) -> bool {
        while self.pos + n >= self.buf.end() {
            if !self.load_chunk() {
                return false;
            }
        }
        true
    }

    /// Up to `n` bytes starting at the current position, without refill.
    pub(crate) fn lookahead(&self, n: usize) -> &[u8] {
        self.buf
            .view(Span::new(self.pos, (self.pos + n).min(self.buf.end())))
    }

    /// Compare `pattern` against the bytes at the cursor, refilling as
    /// needed; on a match, optionally consume it.
    pub(crate) fn match_bytes(&mut self, pattern: &[u8], consume: bool) -> bool {
        let Some(&first) = pattern.first() else {
            return false;
        };
        if first != self.curr {
            return false;
        }
        if pattern.len() > 1 {
            if !self.ensure(pattern.len() - 1) {
                return false;
            }
            let window = self
                .buf
                .view(Span::new(self.pos + 1, self.pos + pattern.len()));
            if window != &pattern[1..] {
                return false;
            }
            if consume {
                self.pos += pattern.len() - 1;
                self.advance();
            }
            return true;
        }
        if consume {
            self.advance();
        }
        true
    }

    /// Resolve a span recorded earlier into live buffer bytes.
    #[inline]
    pub(crate) fn view(&self, span: Span) -> &[u8] {
        self.buf.view(span)
    }

    /// Raise the drain watermark after history eviction freed token views.
    pub(crate) fn set_watermark(&mut self, offset: usize) {
        if offset > self.watermark {
            self.watermark = offset;
        }
    }

    /// Drop buffer bytes no live token view can reach.
    ///
    /// Only the owned buffer ever drains; slice views stay valid for the
    /// input's lifetime, so slice mode keeps everything and stays zero-copy.
    pub(crate) fn checkpoint(&mut self) {
        let Buffer::Owned { data, base } = &mut self.buf else {
            return;
        };
        let keep_from = self.pos.min(self.watermark);
        if keep_from > *base {
            data.drain(..keep_from - *base);
            *base = keep_from;
        }
    }

    /// Whether a refill happened since the last [`reset_refill`].
    ///
    /// [`reset_refill`]: Self::reset_refill
    #[inline]
    pub(crate) fn refilled(&self) -> bool {
        self.refilled
    }

    #[inline]
    pub(crate) fn reset_refill(&mut self) {
        self.refilled = false;
    }

    /// Append one chunk from the reader. Returns whether any bytes arrived.
    ///
    /// Reads until the chunk is full, end-of-stream, or an error. A short
    /// chunk means end-of-stream and detaches the reader; a non-EOS failure
    /// is recorded and likewise ends the stream.
    pub(crate) fn load_chunk(&mut self) -> bool {
        let Some(reader) = self.reader.as_mut() else {
            return false;
        };
        let Buffer::Owned { data, .. } = &mut self.buf else {
            self.reader = None;
            return false;
        };

        let old_len = data.len();
        data.resize(old_len + self.chunk_size, 0);
        let mut filled = 0;
        let mut done = false;
        while filled < self.chunk_size {
            match reader.read(&mut data[old_len + filled..]) {
                Ok(0) => {
                    done = true;
                    break;
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.error = Some(Error::Read {
                        parsed: self.pos,
                        source: e,
                    });
                    done = true;
                    break;
                }
            }
        }
        data.truncate(old_len + filled);
        if done {
            self.reader = None;
        }
        self.refilled = true;
        filled > 0
    }
}
