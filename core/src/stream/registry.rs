// ## src/stream/registry.rs

//! stream/registry.rs
//! Leaf kind registry and construction table.
//!
//! Wrapper snapshots record *which* leaf sat beneath them as a `LeafKind`
//! tag. Thaw dispatches on that tag here, so new leaf sources (compressed
//! files, for instance) slot in as a new variant plus one table entry
//! without changing the wrapper snapshot shape.

use std::path::Path;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

use crate::constants::leaf_ids;
use crate::stream::raw::RawStream;
use crate::stream::types::ByteSource;
use crate::types::{Result, StreamError};

/// Leaf byte sources a wrapper can be rebuilt on top of.
/// Serialized as its `u16` id.
#[repr(u16)]
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[serde(into = "u16", try_from = "u16")]
pub enum LeafKind {
    Raw = leaf_ids::RAW,
}

impl LeafKind {
    pub fn verify(raw: u16) -> Result<LeafKind> {
        LeafKind::try_from_primitive(raw).map_err(|_| StreamError::UnknownLeafKind { raw })
    }
}

pub struct LeafInfo {
    pub name: &'static str,
    /// Opens from a filename alone (no extra construction arguments).
    pub filename_only: bool,
}

pub fn resolve(kind: LeafKind) -> LeafInfo {
    match kind {
        LeafKind::Raw => LeafInfo { name: "raw", filename_only: true },
    }
}

/// Construction table: tag → open function.
pub fn open_leaf(kind: LeafKind, path: impl AsRef<Path>) -> Result<Leaf> {
    match kind {
        LeafKind::Raw => RawStream::open(path).map(Leaf::Raw),
    }
}

/// Same as `open_leaf` for an id read off the wire.
pub fn open_leaf_by_id(raw: u16, path: impl AsRef<Path>) -> Result<Leaf> {
    open_leaf(LeafKind::verify(raw)?, path)
}

/// A live leaf owned by a wrapper layer. Closed set, dispatched by match.
#[derive(Debug)]
pub enum Leaf {
    Raw(RawStream),
}

impl From<RawStream> for Leaf {
    fn from(raw: RawStream) -> Self {
        Leaf::Raw(raw)
    }
}

impl ByteSource for Leaf {
    fn name(&self) -> &Path {
        match self {
            Leaf::Raw(r) => r.name(),
        }
    }

    fn kind(&self) -> LeafKind {
        match self {
            Leaf::Raw(_) => LeafKind::Raw,
        }
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self {
            Leaf::Raw(r) => r.read_into(buf),
        }
    }

    fn seek_to(&mut self, pos: u64) -> Result<u64> {
        match self {
            Leaf::Raw(r) => r.seek(pos),
        }
    }

    fn position(&self) -> Result<u64> {
        match self {
            Leaf::Raw(r) => r.tell(),
        }
    }

    fn file_len(&self) -> Result<u64> {
        match self {
            Leaf::Raw(r) => r.file_len(),
        }
    }

    fn close(&mut self) -> Result<()> {
        match self {
            Leaf::Raw(r) => r.close(),
        }
    }

    fn is_closed(&self) -> bool {
        match self {
            Leaf::Raw(r) => r.is_closed(),
        }
    }
}
