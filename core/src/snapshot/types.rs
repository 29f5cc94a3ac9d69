// ## 📂 File: `src/snapshot/types.rs`

//! snapshot/types.rs
//! Frozen stream state, as plain serde values.
//!
//! | Layer    | Snapshot                         |
//! |----------|----------------------------------|
//! | raw      | (filename, position)             |
//! | buffered | (leaf kind, filename, position)  |
//! | text     | (leaf kind, filename, position)  |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stream::registry::LeafKind;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawSnapshot {
    pub name: PathBuf,
    /// Byte offset.
    pub position: u64,
}

/// Snapshot of a wrapper layer: how to rebuild its leaf plus the wrapper's
/// own logical position (bytes for buffered, decoder cookie for text).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WrappedSnapshot {
    pub inner: LeafKind,
    pub name: PathBuf,
    pub position: u64,
}

/// Any layer's snapshot, so one value can cross the boundary regardless of
/// which layering the factory built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamSnapshot {
    Raw(RawSnapshot),
    Buffered(WrappedSnapshot),
    Text(WrappedSnapshot),
}

impl StreamSnapshot {
    pub fn name(&self) -> &Path {
        match self {
            StreamSnapshot::Raw(s) => &s.name,
            StreamSnapshot::Buffered(s) | StreamSnapshot::Text(s) => &s.name,
        }
    }

    pub fn position(&self) -> u64 {
        match self {
            StreamSnapshot::Raw(s) => s.position,
            StreamSnapshot::Buffered(s) | StreamSnapshot::Text(s) => s.position,
        }
    }

    pub fn layer(&self) -> &'static str {
        match self {
            StreamSnapshot::Raw(_) => "raw",
            StreamSnapshot::Buffered(_) => "buffered",
            StreamSnapshot::Text(_) => "text",
        }
    }
}

impl From<RawSnapshot> for StreamSnapshot {
    fn from(s: RawSnapshot) -> Self {
        StreamSnapshot::Raw(s)
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("bad magic: {have:?}")]
    BadMagic { have: [u8; 4] },

    #[error("unsupported snapshot version: {have}")]
    UnsupportedVersion { have: u16 },

    #[error("envelope truncated: have {have} bytes, need {need}")]
    Truncated { have: usize, need: usize },

    #[error("{extra} unexpected bytes after the envelope")]
    TrailingBytes { extra: usize },

    #[error("checksum mismatch: stored 0x{stored:08x}, computed 0x{computed:08x}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    #[error("payload encode failed: {0}")]
    Encode(String),

    #[error("payload decode failed: {0}")]
    Decode(String),

    #[error("invalid snapshot token: {0}")]
    Token(String),
}
