// ## 📂 File: `src/stream/raw.rs`

//! stream/raw.rs
//! Unbuffered read-only file stream: the only layer that talks to the OS.
//!
//! Snapshot = (filename, byte position). Thaw reopens by name and seeks.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::mode::FileMode;
use crate::snapshot::RawSnapshot;
use crate::stream::registry::LeafKind;
use crate::stream::types::{ensure_within, ByteSource, StreamHandle};
use crate::types::{Result, StreamError};
use crate::utils::classify_open_error;

/// Raw byte stream over an exclusively owned file handle.
#[derive(Debug)]
pub struct RawStream {
    /// `None` once closed.
    file: Option<File>,
    name: PathBuf,
    /// Cursor tracked locally so `tell` never needs a syscall.
    pos: u64,
}

impl RawStream {
    /// Open `path` for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .open(path)
            .map_err(|e| classify_open_error(path, e))?;

        // Directories open fine on some platforms and only fail on read.
        if file.metadata()?.is_dir() {
            return Err(StreamError::NotAFile { path: path.to_path_buf() });
        }

        debug!(path = %path.display(), "opened raw stream");
        Ok(Self { file: Some(file), name: path.to_path_buf(), pos: 0 })
    }

    /// Open with an explicit mode string. Write-capable modes are rejected
    /// before the filesystem is touched.
    pub fn open_with_mode(path: impl AsRef<Path>, mode: &str) -> Result<Self> {
        FileMode::parse(mode)?.ensure_read_only()?;
        Self::open(path)
    }

    pub fn name(&self) -> &Path {
        &self.name
    }

    fn file_mut(&mut self) -> Result<&mut File> {
        self.file.as_mut().ok_or(StreamError::Closed)
    }

    /// Read into `buf`, one OS read (retried on `Interrupted`).
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        let file = self.file_mut()?;
        let n = loop {
            match file.read(buf) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        };
        self.pos += n as u64;
        Ok(n)
    }

    /// Up to `n` bytes from the current position; fewer at end of file.
    /// The result grows with the data read, not with `n`.
    pub fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        let file = self.file_mut()?;
        let mut out = Vec::new();
        let got = file.take(n as u64).read_to_end(&mut out)?;
        self.pos += got as u64;
        Ok(out)
    }

    /// Everything from the current position to end of file.
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        let file = self.file_mut()?;
        let mut out = Vec::new();
        let n = file.read_to_end(&mut out)?;
        self.pos += n as u64;
        Ok(out)
    }

    /// One line including its `\n`, or the tail of the file.
    pub fn readline(&mut self) -> Result<Vec<u8>> {
        let mut line = Vec::new();
        let mut byte = [0u8; 1];
        while self.read_into(&mut byte)? == 1 {
            line.push(byte[0]);
            if byte[0] == b'\n' {
                break;
            }
        }
        Ok(line)
    }

    pub fn seek(&mut self, pos: u64) -> Result<u64> {
        let file = self.file_mut()?;
        let new_pos = file.seek(SeekFrom::Start(pos))?;
        self.pos = new_pos;
        Ok(new_pos)
    }

    pub fn tell(&self) -> Result<u64> {
        if self.file.is_none() {
            return Err(StreamError::Closed);
        }
        Ok(self.pos)
    }

    pub fn file_len(&self) -> Result<u64> {
        let file = self.file.as_ref().ok_or(StreamError::Closed)?;
        Ok(file.metadata()?.len())
    }

    pub fn freeze(&self) -> Result<RawSnapshot> {
        let position = self.tell()?;
        debug!(path = %self.name.display(), position, "froze raw stream");
        Ok(RawSnapshot { name: self.name.clone(), position })
    }

    pub fn thaw(snapshot: &RawSnapshot) -> Result<Self> {
        let restore = || -> Result<Self> {
            let mut raw = RawStream::open(&snapshot.name)?;
            ensure_within(&raw, snapshot.position)?;
            raw.seek(snapshot.position)?;
            Ok(raw)
        };

        match restore() {
            Ok(raw) => {
                info!(path = %snapshot.name.display(), position = snapshot.position, "thawed raw stream");
                Ok(raw)
            }
            Err(e) => {
                warn!(path = %snapshot.name.display(), error = %e, "raw stream thaw failed");
                Err(StreamError::reconstruction(&snapshot.name, e))
            }
        }
    }

    pub fn close(&mut self) -> Result<()> {
        if self.file.take().is_some() {
            debug!(path = %self.name.display(), "closed raw stream");
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }
}

impl ByteSource for RawStream {
    fn name(&self) -> &Path {
        &self.name
    }

    fn kind(&self) -> LeafKind {
        LeafKind::Raw
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        RawStream::read_into(self, buf)
    }

    fn seek_to(&mut self, pos: u64) -> Result<u64> {
        RawStream::seek(self, pos)
    }

    fn position(&self) -> Result<u64> {
        RawStream::tell(self)
    }

    fn file_len(&self) -> Result<u64> {
        RawStream::file_len(self)
    }

    fn close(&mut self) -> Result<()> {
        RawStream::close(self)
    }

    fn is_closed(&self) -> bool {
        RawStream::is_closed(self)
    }
}

impl StreamHandle for RawStream {
    type Snapshot = RawSnapshot;

    fn name(&self) -> &Path {
        &self.name
    }

    fn tell(&self) -> Result<u64> {
        RawStream::tell(self)
    }

    fn seek(&mut self, pos: u64) -> Result<u64> {
        RawStream::seek(self, pos)
    }

    fn freeze(&self) -> Result<RawSnapshot> {
        RawStream::freeze(self)
    }

    fn thaw(snapshot: &RawSnapshot) -> Result<Self> {
        RawStream::thaw(snapshot)
    }

    fn close(&mut self) -> Result<()> {
        RawStream::close(self)
    }

    fn is_closed(&self) -> bool {
        RawStream::is_closed(self)
    }
}

impl Read for RawStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_into(buf)?)
    }
}

impl Seek for RawStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let file = self.file_mut()?;
        let new_pos = file.seek(pos)?;
        self.pos = new_pos;
        Ok(new_pos)
    }
}
