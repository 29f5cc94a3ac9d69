// ## 📂 File: `src/stream/text.rs`

//! stream/text.rs
//! UTF-8 decoding and line access over a leaf byte source.
//!
//! Design notes:
//! - Decoding is strict: malformed or truncated UTF-8 is `StreamError::Decode`.
//! - Universal newlines: `\r\n` and a lone `\r` both read as `\n`.
//! - `tell()` is a position cookie: the leaf byte offset of the next
//!   undecoded character. Characters are handed out whole and a `\r\n`
//!   pair is consumed together, so every cookie lands on a clean decoder
//!   state and freezing mid-multibyte text needs no decoder snapshot.
//! - `seek()` drops every pending byte before moving the leaf, which is all
//!   the realignment a stateless UTF-8 decoder needs.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::OpenConfig;
use crate::snapshot::WrappedSnapshot;
use crate::stream::raw::RawStream;
use crate::stream::registry::{open_leaf, Leaf, LeafKind};
use crate::stream::types::{ensure_within, ByteSource, StreamHandle};
use crate::types::{Result, StreamError};
use crate::utils::{is_utf8_continuation, utf8_seq_len};

/// Character and line oriented stream owning its leaf.
#[derive(Debug)]
pub struct TextStream {
    inner: Leaf,
    kind: LeafKind,
    /// Bytes requested from the leaf per refill.
    chunk: usize,
    /// Undecoded bytes; `pending[..pos]` are already consumed.
    pending: Vec<u8>,
    pos: usize,
}

impl TextStream {
    pub fn wrap(inner: impl Into<Leaf>) -> Self {
        Self::wrap_with(inner, &OpenConfig::default())
    }

    pub fn wrap_with(inner: impl Into<Leaf>, config: &OpenConfig) -> Self {
        let inner = inner.into();
        let kind = inner.kind();
        let chunk = config.resolved_buffer_size();
        debug!(path = %inner.name().display(), ?kind, chunk, "wrapped text stream");
        Self { inner, kind, chunk, pending: Vec::with_capacity(chunk), pos: 0 }
    }

    /// Open a raw leaf on `path` and decode it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::wrap(RawStream::open(path)?))
    }

    pub fn name(&self) -> &Path {
        self.inner.name()
    }

    pub fn leaf_kind(&self) -> LeafKind {
        self.kind
    }

    pub fn encoding(&self) -> &'static str {
        "utf-8"
    }

    #[inline]
    fn available(&self) -> usize {
        self.pending.len() - self.pos
    }

    fn ensure_open(&self) -> Result<()> {
        if self.inner.is_closed() {
            return Err(StreamError::Closed);
        }
        Ok(())
    }

    fn reset_decoder(&mut self) {
        self.pending.clear();
        self.pos = 0;
    }

    /// Make at least `n` undecoded bytes available. `false` if end of file
    /// came first.
    fn ensure(&mut self, n: usize) -> Result<bool> {
        while self.available() < n {
            if self.pos > 0 {
                self.pending.drain(..self.pos);
                self.pos = 0;
            }
            let start = self.pending.len();
            self.pending.resize(start + self.chunk, 0);
            let got = self.inner.read_into(&mut self.pending[start..]);
            // Shrink back before propagating so a failed read leaves no junk.
            let got = match got {
                Ok(k) => k,
                Err(e) => {
                    self.pending.truncate(start);
                    return Err(e);
                }
            };
            self.pending.truncate(start + got);
            if got == 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Decode one character, translating newlines. `None` at end of file.
    fn next_char(&mut self) -> Result<Option<char>> {
        if !self.ensure(1)? {
            return Ok(None);
        }

        let lead = self.pending[self.pos];
        let width = match utf8_seq_len(lead) {
            Some(w) => w,
            None => return Err(StreamError::Decode { position: self.tell()? }),
        };
        if !self.ensure(width)? {
            return Err(StreamError::Decode { position: self.tell()? });
        }

        let bytes = &self.pending[self.pos..self.pos + width];
        let ch = match std::str::from_utf8(bytes).ok().and_then(|s| s.chars().next()) {
            Some(c) => c,
            None => return Err(StreamError::Decode { position: self.tell()? }),
        };
        self.pos += width;

        if ch == '\r' {
            if self.ensure(1)? && self.pending[self.pos] == b'\n' {
                self.pos += 1;
            }
            return Ok(Some('\n'));
        }
        Ok(Some(ch))
    }

    /// Up to `n` characters; fewer at end of file.
    pub fn read(&mut self, n: usize) -> Result<String> {
        self.ensure_open()?;
        let mut out = String::with_capacity(n.min(self.chunk));
        for _ in 0..n {
            match self.next_char()? {
                Some(c) => out.push(c),
                None => break,
            }
        }
        Ok(out)
    }

    /// Everything from the current position to end of file.
    pub fn read_all(&mut self) -> Result<String> {
        self.ensure_open()?;
        let mut out = String::new();
        while let Some(c) = self.next_char()? {
            out.push(c);
        }
        Ok(out)
    }

    /// One line including its `\n`; empty string at end of file.
    pub fn readline(&mut self) -> Result<String> {
        self.ensure_open()?;
        let mut line = String::new();
        while let Some(c) = self.next_char()? {
            line.push(c);
            if c == '\n' {
                break;
            }
        }
        Ok(line)
    }

    pub fn readlines(&mut self) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        loop {
            let line = self.readline()?;
            if line.is_empty() {
                return Ok(lines);
            }
            lines.push(line);
        }
    }

    /// Iterator over the remaining lines, terminators stripped.
    pub fn lines(&mut self) -> Lines<'_> {
        Lines { stream: self }
    }

    /// Position cookie of the next character.
    pub fn tell(&self) -> Result<u64> {
        let cursor = self.inner.position()?;
        Ok(cursor - self.available() as u64)
    }

    /// Seek to a cookie previously returned by `tell()` (or 0).
    /// Cookies inside a multi-byte sequence are refused and the stream
    /// stays where it was.
    pub fn seek(&mut self, cookie: u64) -> Result<u64> {
        let previous = self.tell()?;
        // Decoder state stays valid until the leaf has actually moved.
        self.inner.seek_to(cookie)?;
        self.reset_decoder();

        match self.ensure(1) {
            Ok(true) if is_utf8_continuation(self.pending[self.pos]) => {
                self.restore(previous)?;
                Err(StreamError::InvalidPosition { position: cookie })
            }
            Ok(_) => Ok(cookie),
            Err(e) => {
                self.restore(previous)?;
                Err(e)
            }
        }
    }

    /// Put the stream back at a cookie it already held.
    fn restore(&mut self, previous: u64) -> Result<()> {
        self.reset_decoder();
        self.inner.seek_to(previous).map(|_| ())
    }

    pub fn rewind(&mut self) -> Result<()> {
        self.seek(0).map(|_| ())
    }

    pub fn freeze(&self) -> Result<WrappedSnapshot> {
        let position = self.tell()?;
        debug!(path = %self.name().display(), position, "froze text stream");
        Ok(WrappedSnapshot { inner: self.kind, name: self.name().to_path_buf(), position })
    }

    pub fn thaw(snapshot: &WrappedSnapshot) -> Result<Self> {
        Self::thaw_with(snapshot, &OpenConfig::default())
    }

    /// Rebuild the leaf by tag, re-wrap, then seek to the saved cookie.
    pub fn thaw_with(snapshot: &WrappedSnapshot, config: &OpenConfig) -> Result<Self> {
        let restore = || -> Result<Self> {
            let leaf = open_leaf(snapshot.inner, &snapshot.name)?;
            ensure_within(&leaf, snapshot.position)?;
            let mut stream = TextStream::wrap_with(leaf, config);
            stream.seek(snapshot.position)?;
            Ok(stream)
        };

        match restore() {
            Ok(stream) => {
                info!(path = %snapshot.name.display(), position = snapshot.position, "thawed text stream");
                Ok(stream)
            }
            Err(e) => {
                warn!(path = %snapshot.name.display(), error = %e, "text stream thaw failed");
                Err(StreamError::reconstruction(&snapshot.name, e))
            }
        }
    }

    pub fn close(&mut self) -> Result<()> {
        self.reset_decoder();
        self.inner.close()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

impl StreamHandle for TextStream {
    type Snapshot = WrappedSnapshot;

    fn name(&self) -> &Path {
        TextStream::name(self)
    }

    fn tell(&self) -> Result<u64> {
        TextStream::tell(self)
    }

    fn seek(&mut self, pos: u64) -> Result<u64> {
        TextStream::seek(self, pos)
    }

    fn freeze(&self) -> Result<WrappedSnapshot> {
        TextStream::freeze(self)
    }

    fn thaw(snapshot: &WrappedSnapshot) -> Result<Self> {
        TextStream::thaw(snapshot)
    }

    fn close(&mut self) -> Result<()> {
        TextStream::close(self)
    }

    fn is_closed(&self) -> bool {
        TextStream::is_closed(self)
    }
}

/// Lines of a `TextStream`, without their `\n`.
pub struct Lines<'a> {
    stream: &'a mut TextStream,
}

impl Iterator for Lines<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.stream.readline() {
            Ok(line) if line.is_empty() => None,
            Ok(mut line) => {
                if line.ends_with('\n') {
                    line.pop();
                }
                Some(Ok(line))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
