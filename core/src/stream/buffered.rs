// ## 📂 File: `src/stream/buffered.rs`

//! stream/buffered.rs
//! Read-ahead buffering over a leaf byte source.
//!
//! Design notes:
//! - Buffer bytes `[0..filled)` always mirror file bytes
//!   `[leaf_cursor - filled, leaf_cursor)`, so the logical position is
//!   `leaf_cursor - (filled - pos)` with no extra bookkeeping.
//! - The leaf's cursor runs ahead of the logical position after a refill,
//!   which is why freeze records `tell()` plus the leaf recipe rather than
//!   asking the leaf to freeze itself.
//! - Buffered-ahead bytes are never captured; thaw re-reads them on demand.

use std::io::{self, BufRead, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::OpenConfig;
use crate::snapshot::WrappedSnapshot;
use crate::stream::registry::{open_leaf, Leaf, LeafKind};
use crate::stream::raw::RawStream;
use crate::stream::types::{ensure_within, ByteSource, StreamHandle};
use crate::types::{Result, StreamError};

/// Buffered byte stream owning its leaf.
#[derive(Debug)]
pub struct BufferedStream {
    inner: Leaf,
    /// Recipe tag recorded at wrap time.
    kind: LeafKind,
    buf: Box<[u8]>,
    /// Start of unread data in `buf`.
    pos: usize,
    /// Valid bytes in `buf`.
    filled: usize,
}

impl BufferedStream {
    pub fn wrap(inner: impl Into<Leaf>) -> Self {
        Self::wrap_with(inner, &OpenConfig::default())
    }

    pub fn wrap_with(inner: impl Into<Leaf>, config: &OpenConfig) -> Self {
        let inner = inner.into();
        let kind = inner.kind();
        let capacity = config.resolved_buffer_size();
        debug!(path = %inner.name().display(), ?kind, capacity, "wrapped buffered stream");
        Self { inner, kind, buf: vec![0u8; capacity].into_boxed_slice(), pos: 0, filled: 0 }
    }

    /// Open a raw leaf on `path` and buffer it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::wrap(RawStream::open(path)?))
    }

    pub fn name(&self) -> &Path {
        self.inner.name()
    }

    pub fn leaf_kind(&self) -> LeafKind {
        self.kind
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Shared access to the leaf (its cursor may be ahead of `tell()`).
    pub fn get_ref(&self) -> &Leaf {
        &self.inner
    }

    #[inline]
    fn available(&self) -> usize {
        self.filled - self.pos
    }

    fn ensure_open(&self) -> Result<()> {
        if self.inner.is_closed() {
            return Err(StreamError::Closed);
        }
        Ok(())
    }

    /// Compact unread bytes to the front and top the buffer up from the leaf.
    fn fill_buffer(&mut self) -> Result<usize> {
        if self.pos > 0 {
            self.buf.copy_within(self.pos..self.filled, 0);
            self.filled -= self.pos;
            self.pos = 0;
        }
        if self.filled == self.buf.len() {
            return Ok(0);
        }
        let n = self.inner.read_into(&mut self.buf[self.filled..])?;
        self.filled += n;
        Ok(n)
    }

    /// One buffered read: serves from the buffer, refilling at most once.
    pub fn read_into(&mut self, out: &mut [u8]) -> Result<usize> {
        self.ensure_open()?;
        if out.is_empty() {
            return Ok(0);
        }

        if self.available() == 0 {
            // Large reads bypass the buffer entirely.
            if out.len() >= self.buf.len() {
                self.pos = 0;
                self.filled = 0;
                return self.inner.read_into(out);
            }
            if self.fill_buffer()? == 0 {
                return Ok(0);
            }
        }

        let n = out.len().min(self.available());
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    /// Exactly `n` bytes unless end of file comes first.
    /// Always served through the buffer, so the leaf may end up ahead of `tell()`.
    pub fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        self.ensure_open()?;
        let mut out = Vec::with_capacity(n.min(self.buf.len()));
        while out.len() < n {
            if self.available() == 0 && self.fill_buffer()? == 0 {
                break;
            }
            let take = (n - out.len()).min(self.available());
            out.extend_from_slice(&self.buf[self.pos..self.pos + take]);
            self.pos += take;
        }
        Ok(out)
    }

    /// Everything from the logical position to end of file.
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        self.ensure_open()?;
        let mut out = Vec::with_capacity(self.available());
        out.extend_from_slice(&self.buf[self.pos..self.filled]);
        self.pos = 0;
        self.filled = 0;

        let mut chunk = vec![0u8; self.buf.len()];
        loop {
            match self.inner.read_into(&mut chunk)? {
                0 => break,
                n => out.extend_from_slice(&chunk[..n]),
            }
        }
        Ok(out)
    }

    /// Look at up to `n` upcoming bytes without consuming them.
    /// Returns fewer only at end of file or when `n` exceeds the buffer.
    pub fn peek(&mut self, n: usize) -> Result<&[u8]> {
        self.ensure_open()?;
        let want = n.min(self.buf.len());
        while self.available() < want {
            if self.fill_buffer()? == 0 {
                break;
            }
        }
        let end = self.pos + want.min(self.available());
        Ok(&self.buf[self.pos..end])
    }

    /// One line including its `\n`, or the tail of the file.
    pub fn readline(&mut self) -> Result<Vec<u8>> {
        self.ensure_open()?;
        let mut line = Vec::new();
        loop {
            if self.available() > 0 {
                let window = &self.buf[self.pos..self.filled];
                if let Some(i) = window.iter().position(|&b| b == b'\n') {
                    line.extend_from_slice(&window[..=i]);
                    self.pos += i + 1;
                    return Ok(line);
                }
                line.extend_from_slice(window);
                self.pos = self.filled;
            }
            if self.fill_buffer()? == 0 {
                return Ok(line);
            }
        }
    }

    pub fn readlines(&mut self) -> Result<Vec<Vec<u8>>> {
        let mut lines = Vec::new();
        loop {
            let line = self.readline()?;
            if line.is_empty() {
                return Ok(lines);
            }
            lines.push(line);
        }
    }

    /// Logical position: leaf cursor minus unread buffered bytes.
    pub fn tell(&self) -> Result<u64> {
        let cursor = self.inner.position()?;
        Ok(cursor - self.available() as u64)
    }

    /// Absolute seek. Targets inside the current buffer window only move
    /// the buffer cursor.
    pub fn seek(&mut self, target: u64) -> Result<u64> {
        let cursor = self.inner.position()?;
        let window_start = cursor - self.filled as u64;
        if (window_start..=cursor).contains(&target) {
            self.pos = (target - window_start) as usize;
            return Ok(target);
        }
        // Buffer stays valid until the leaf has actually moved.
        let moved = self.inner.seek_to(target)?;
        self.pos = 0;
        self.filled = 0;
        Ok(moved)
    }

    pub fn freeze(&self) -> Result<WrappedSnapshot> {
        let position = self.tell()?;
        debug!(path = %self.name().display(), position, "froze buffered stream");
        Ok(WrappedSnapshot { inner: self.kind, name: self.name().to_path_buf(), position })
    }

    pub fn thaw(snapshot: &WrappedSnapshot) -> Result<Self> {
        Self::thaw_with(snapshot, &OpenConfig::default())
    }

    /// Rebuild the leaf by tag, re-wrap, then seek to the saved logical position.
    pub fn thaw_with(snapshot: &WrappedSnapshot, config: &OpenConfig) -> Result<Self> {
        let restore = || -> Result<Self> {
            let leaf = open_leaf(snapshot.inner, &snapshot.name)?;
            ensure_within(&leaf, snapshot.position)?;
            let mut stream = BufferedStream::wrap_with(leaf, config);
            stream.seek(snapshot.position)?;
            Ok(stream)
        };

        match restore() {
            Ok(stream) => {
                info!(path = %snapshot.name.display(), position = snapshot.position, "thawed buffered stream");
                Ok(stream)
            }
            Err(e) => {
                warn!(path = %snapshot.name.display(), error = %e, "buffered stream thaw failed");
                Err(StreamError::reconstruction(&snapshot.name, e))
            }
        }
    }

    pub fn close(&mut self) -> Result<()> {
        self.pos = 0;
        self.filled = 0;
        self.inner.close()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

impl StreamHandle for BufferedStream {
    type Snapshot = WrappedSnapshot;

    fn name(&self) -> &Path {
        BufferedStream::name(self)
    }

    fn tell(&self) -> Result<u64> {
        BufferedStream::tell(self)
    }

    fn seek(&mut self, pos: u64) -> Result<u64> {
        BufferedStream::seek(self, pos)
    }

    fn freeze(&self) -> Result<WrappedSnapshot> {
        BufferedStream::freeze(self)
    }

    fn thaw(snapshot: &WrappedSnapshot) -> Result<Self> {
        BufferedStream::thaw(snapshot)
    }

    fn close(&mut self) -> Result<()> {
        BufferedStream::close(self)
    }

    fn is_closed(&self) -> bool {
        BufferedStream::is_closed(self)
    }
}

impl Read for BufferedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_into(buf)?)
    }
}

impl BufRead for BufferedStream {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.ensure_open()?;
        if self.available() == 0 {
            self.pos = 0;
            self.filled = 0;
            self.fill_buffer()?;
        }
        Ok(&self.buf[self.pos..self.filled])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.filled);
    }
}

impl Seek for BufferedStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(p) => Some(p),
            SeekFrom::Current(delta) => BufferedStream::tell(self)?.checked_add_signed(delta),
            SeekFrom::End(delta) => self.inner.file_len()?.checked_add_signed(delta),
        };
        let target = target.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "invalid seek to a negative or overflowing position")
        })?;
        Ok(BufferedStream::seek(self, target)?)
    }
}
