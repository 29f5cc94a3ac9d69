// ## 2️⃣ `factory.rs` — stable public API

//! stream/factory.rs
//! Builds the right layering for a read mode and hands back the top layer.
//!
//! - text read   → RawStream + TextStream
//! - binary read → RawStream + BufferedStream
//!
//! The mode is validated before anything is opened.

use std::path::Path;

use tracing::debug;

use crate::config::OpenConfig;
use crate::mode::OpenMode;
use crate::snapshot::StreamSnapshot;
use crate::stream::buffered::BufferedStream;
use crate::stream::raw::RawStream;
use crate::stream::text::TextStream;
use crate::stream::types::StreamHandle;
use crate::types::Result;

/// Top-level stream returned by the factory (or by thawing a `StreamSnapshot`).
#[derive(Debug)]
pub enum PickleStream {
    Text(TextStream),
    Binary(BufferedStream),
    /// Only produced by thawing a raw snapshot; the factory never builds it.
    Raw(RawStream),
}

impl PickleStream {
    pub fn as_text(&mut self) -> Option<&mut TextStream> {
        match self {
            PickleStream::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_binary(&mut self) -> Option<&mut BufferedStream> {
        match self {
            PickleStream::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<TextStream> {
        match self {
            PickleStream::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn into_binary(self) -> Option<BufferedStream> {
        match self {
            PickleStream::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn into_raw(self) -> Option<RawStream> {
        match self {
            PickleStream::Raw(r) => Some(r),
            _ => None,
        }
    }

    /// Mode this stream reads in (`Raw` counts as binary).
    pub fn mode(&self) -> OpenMode {
        match self {
            PickleStream::Text(_) => OpenMode::TextRead,
            PickleStream::Binary(_) | PickleStream::Raw(_) => OpenMode::BinaryRead,
        }
    }

    pub fn thaw_with(snapshot: &StreamSnapshot, config: &OpenConfig) -> Result<Self> {
        Ok(match snapshot {
            StreamSnapshot::Text(s) => PickleStream::Text(TextStream::thaw_with(s, config)?),
            StreamSnapshot::Buffered(s) => PickleStream::Binary(BufferedStream::thaw_with(s, config)?),
            StreamSnapshot::Raw(s) => PickleStream::Raw(RawStream::thaw(s)?),
        })
    }
}

impl From<TextStream> for PickleStream {
    fn from(t: TextStream) -> Self {
        PickleStream::Text(t)
    }
}

impl From<BufferedStream> for PickleStream {
    fn from(b: BufferedStream) -> Self {
        PickleStream::Binary(b)
    }
}

impl From<RawStream> for PickleStream {
    fn from(r: RawStream) -> Self {
        PickleStream::Raw(r)
    }
}

impl StreamHandle for PickleStream {
    type Snapshot = StreamSnapshot;

    fn name(&self) -> &Path {
        match self {
            PickleStream::Text(t) => t.name(),
            PickleStream::Binary(b) => b.name(),
            PickleStream::Raw(r) => r.name(),
        }
    }

    fn tell(&self) -> Result<u64> {
        match self {
            PickleStream::Text(t) => t.tell(),
            PickleStream::Binary(b) => b.tell(),
            PickleStream::Raw(r) => r.tell(),
        }
    }

    fn seek(&mut self, pos: u64) -> Result<u64> {
        match self {
            PickleStream::Text(t) => t.seek(pos),
            PickleStream::Binary(b) => b.seek(pos),
            PickleStream::Raw(r) => r.seek(pos),
        }
    }

    fn freeze(&self) -> Result<StreamSnapshot> {
        Ok(match self {
            PickleStream::Text(t) => StreamSnapshot::Text(t.freeze()?),
            PickleStream::Binary(b) => StreamSnapshot::Buffered(b.freeze()?),
            PickleStream::Raw(r) => StreamSnapshot::Raw(r.freeze()?),
        })
    }

    fn thaw(snapshot: &StreamSnapshot) -> Result<Self> {
        PickleStream::thaw_with(snapshot, &OpenConfig::default())
    }

    fn close(&mut self) -> Result<()> {
        match self {
            PickleStream::Text(t) => t.close(),
            PickleStream::Binary(b) => b.close(),
            PickleStream::Raw(r) => r.close(),
        }
    }

    fn is_closed(&self) -> bool {
        match self {
            PickleStream::Text(t) => t.is_closed(),
            PickleStream::Binary(b) => b.is_closed(),
            PickleStream::Raw(r) => r.is_closed(),
        }
    }
}

/// Open `path` in `mode` with a stream that can be frozen and thawed.
pub fn open_for_pickling(path: impl AsRef<Path>, mode: OpenMode) -> Result<PickleStream> {
    open_for_pickling_with(path, mode, &OpenConfig::default())
}

pub fn open_for_pickling_with(
    path: impl AsRef<Path>,
    mode: OpenMode,
    config: &OpenConfig,
) -> Result<PickleStream> {
    let path = path.as_ref();
    let raw = RawStream::open(path)?;
    debug!(path = %path.display(), %mode, "opening picklable stream");
    Ok(match mode {
        OpenMode::TextRead => PickleStream::Text(TextStream::wrap_with(raw, config)),
        OpenMode::BinaryRead => PickleStream::Binary(BufferedStream::wrap_with(raw, config)),
    })
}

/// String-mode entry point: `"r"`, `"rt"` (text) or `"rb"` (binary).
/// Any write-capable mode fails with `StreamError::Mode` before the file is opened.
pub fn pickle_open(path: impl AsRef<Path>, mode: &str) -> Result<PickleStream> {
    let mode = OpenMode::from_mode_str(mode)?;
    open_for_pickling(path, mode)
}

impl StreamSnapshot {
    /// Thaw into whichever layering this snapshot was taken from.
    pub fn thaw(&self) -> Result<PickleStream> {
        PickleStream::thaw_with(self, &OpenConfig::default())
    }
}
