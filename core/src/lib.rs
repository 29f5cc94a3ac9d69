//! picklable-core
//!
//! Read-only file streams that survive a serialization boundary.
//! A stream freezes into a small snapshot (filename, logical position,
//! leaf recipe) and thaws into a fresh, independently owned stream at the
//! same logical position, provided the file is still there and unchanged.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;
pub mod config;
pub mod mode;

// Snapshot values and envelope
pub mod snapshot;

// Stream layers
pub mod stream;

pub use types::{Result, StreamError};

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::config::OpenConfig;
    pub use crate::mode::{FileMode, OpenMode};
    pub use crate::snapshot::{
        decode_snapshot, encode_snapshot, snapshot_from_token, snapshot_to_token, RawSnapshot,
        SnapshotError, StreamSnapshot, WrappedSnapshot,
    };
    pub use crate::stream::{
        open_for_pickling, open_for_pickling_with, pickle_open, BufferedStream, ByteSource, LeafKind,
        PickleStream, RawStream, StreamHandle, TextStream,
    };
    pub use crate::types::{Result, StreamError};
}
