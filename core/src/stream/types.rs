// ## 📂 File: `src/stream/types.rs`

//! stream/types.rs
//! Capability traits shared by every layer.
//!
//! - `ByteSource` is what a wrapper needs from the layer beneath it.
//! - `StreamHandle` is what every layer (and the factory's top-level stream)
//!   offers its caller, including freeze/thaw.

use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::stream::registry::LeafKind;
use crate::types::{Result, StreamError};

/// Byte-level contract of a leaf layer.
pub trait ByteSource: Send {
    /// Backing filename, fixed at open.
    fn name(&self) -> &Path;

    /// Tag used to rebuild this source from a snapshot.
    fn kind(&self) -> LeafKind;

    /// Read up to `buf.len()` bytes; `Ok(0)` at end of file.
    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Absolute seek. Returns the new cursor.
    fn seek_to(&mut self, pos: u64) -> Result<u64>;

    /// Actual cursor of the source (may be ahead of what a wrapper consumed).
    fn position(&self) -> Result<u64>;

    /// Current length of the backing file.
    fn file_len(&self) -> Result<u64>;

    fn close(&mut self) -> Result<()>;

    fn is_closed(&self) -> bool;
}

/// A read-only stream that can be frozen into a snapshot and thawed back.
pub trait StreamHandle: Sized {
    type Snapshot: Clone + Serialize + DeserializeOwned;

    fn name(&self) -> &Path;

    /// Logical position, in this layer's unit.
    fn tell(&self) -> Result<u64>;

    /// Absolute seek to a logical position.
    fn seek(&mut self, pos: u64) -> Result<u64>;

    /// Capture enough state to rebuild this stream. Never moves the stream.
    fn freeze(&self) -> Result<Self::Snapshot>;

    /// Reopen from a snapshot. Failures are `StreamError::Reconstruction`.
    fn thaw(snapshot: &Self::Snapshot) -> Result<Self>;

    /// Release the OS handle. Idempotent.
    fn close(&mut self) -> Result<()>;

    fn is_closed(&self) -> bool;
}

/// Thaw-time check that the saved position still exists in the file.
pub(crate) fn ensure_within<S: ByteSource + ?Sized>(source: &S, position: u64) -> Result<()> {
    let len = source.file_len()?;
    if position > len {
        return Err(StreamError::PositionOutOfRange { position, len });
    }
    Ok(())
}
