// ## 📂 File: `src/snapshot/decode.rs`
//! src/snapshot/decode.rs
//!
//! Snapshot envelope decoding.
//!
//! Magic, version, length and CRC are all checked before the payload is
//! handed to bincode.

use base64::{engine::general_purpose::STANDARD, Engine};
use byteorder::{ByteOrder, LittleEndian};

use crate::constants::{MAGIC_PSN1, SNAPSHOT_V1};
use crate::snapshot::encode::ENVELOPE_PREFIX_LEN;
use crate::snapshot::types::{SnapshotError, StreamSnapshot};

pub fn decode_snapshot(buf: &[u8]) -> Result<StreamSnapshot, SnapshotError> {
    if buf.len() < ENVELOPE_PREFIX_LEN {
        return Err(SnapshotError::Truncated { have: buf.len(), need: ENVELOPE_PREFIX_LEN });
    }

    let mut magic = [0u8; 4];
    magic.copy_from_slice(&buf[0..4]);
    if magic != MAGIC_PSN1 {
        return Err(SnapshotError::BadMagic { have: magic });
    }

    let version = LittleEndian::read_u16(&buf[4..6]);
    if version != SNAPSHOT_V1 {
        return Err(SnapshotError::UnsupportedVersion { have: version });
    }

    let len = LittleEndian::read_u32(&buf[6..10]) as usize;
    let stored = LittleEndian::read_u32(&buf[10..14]);

    let need = ENVELOPE_PREFIX_LEN + len;
    if buf.len() < need {
        return Err(SnapshotError::Truncated { have: buf.len(), need });
    }
    if buf.len() > need {
        return Err(SnapshotError::TrailingBytes { extra: buf.len() - need });
    }
    let payload = &buf[ENVELOPE_PREFIX_LEN..need];

    let computed = crc32fast::hash(payload);
    if computed != stored {
        return Err(SnapshotError::ChecksumMismatch { stored, computed });
    }

    let (snapshot, used) = bincode::serde::decode_from_slice::<StreamSnapshot, _>(payload, bincode::config::standard())
        .map_err(|e| SnapshotError::Decode(e.to_string()))?;
    if used != payload.len() {
        return Err(SnapshotError::Decode(format!("{} trailing payload bytes", payload.len() - used)));
    }
    Ok(snapshot)
}

pub fn snapshot_from_token(token: &str) -> Result<StreamSnapshot, SnapshotError> {
    let bytes = STANDARD
        .decode(token.trim())
        .map_err(|e| SnapshotError::Token(e.to_string()))?;
    decode_snapshot(&bytes)
}
