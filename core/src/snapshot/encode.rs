// ## 📂 File: `src/snapshot/encode.rs`
//! src/snapshot/encode.rs
//!
//! Snapshot envelope encoding.
//!
//! Design notes:
//! - Fixed 14-byte little-endian prefix followed by a bincode payload.
//! - CRC32 covers the payload only; the prefix is checked field by field.

use base64::{engine::general_purpose::STANDARD, Engine};
use byteorder::{LittleEndian, WriteBytesExt};

use crate::constants::{MAGIC_PSN1, SNAPSHOT_V1};
use crate::snapshot::types::{SnapshotError, StreamSnapshot};

/// Envelope prefix length in bytes.
pub const ENVELOPE_PREFIX_LEN: usize = 14;

/// Serialize a snapshot into a self-checking byte envelope.
///
/// Layout:
/// - `0..4`   magic `PSN1`
/// - `4..6`   version
/// - `6..10`  payload length
/// - `10..14` CRC32 of payload
/// - `14..`   bincode (serde, standard config) payload
pub fn encode_snapshot(snapshot: &StreamSnapshot) -> Result<Vec<u8>, SnapshotError> {
    let payload = bincode::serde::encode_to_vec(snapshot, bincode::config::standard())
        .map_err(|e| SnapshotError::Encode(e.to_string()))?;
    let len = u32::try_from(payload.len())
        .map_err(|_| SnapshotError::Encode(format!("payload too large: {} bytes", payload.len())))?;

    let mut out = Vec::with_capacity(ENVELOPE_PREFIX_LEN + payload.len());
    let prefix = |out: &mut Vec<u8>| -> std::io::Result<()> {
        out.extend_from_slice(&MAGIC_PSN1);                              // 0..4
        out.write_u16::<LittleEndian>(SNAPSHOT_V1)?;                     // 4..6
        out.write_u32::<LittleEndian>(len)?;                             // 6..10
        out.write_u32::<LittleEndian>(crc32fast::hash(&payload))?;       // 10..14
        Ok(())
    };
    prefix(&mut out).map_err(|e| SnapshotError::Encode(e.to_string()))?;
    out.extend_from_slice(&payload);

    debug_assert_eq!(out.len(), ENVELOPE_PREFIX_LEN + payload.len());
    Ok(out)
}

/// Envelope as standard base64, for text channels (logs, JSON descriptors).
pub fn snapshot_to_token(snapshot: &StreamSnapshot) -> Result<String, SnapshotError> {
    Ok(STANDARD.encode(encode_snapshot(snapshot)?))
}
