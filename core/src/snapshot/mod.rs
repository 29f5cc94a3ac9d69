//! snapshot/mod.rs
//! Frozen stream state and its byte envelope.
//!
//! Notes:
//! - Snapshots are serde values; any serde engine can carry them.
//! - `encode_snapshot` / `decode_snapshot` add a versioned, CRC-checked
//!   envelope for callers that just want bytes.

pub mod types;
pub mod encode;
pub mod decode;

pub use types::*;
pub use encode::*;
pub use decode::*;

impl StreamSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        encode_snapshot(self)
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self, SnapshotError> {
        decode_snapshot(buf)
    }
}
