// Snapshot values and the PSN1 envelope.

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use picklable_core::constants::{MAGIC_PSN1, SNAPSHOT_V1};
    use picklable_core::prelude::*;
    use picklable_core::snapshot::ENVELOPE_PREFIX_LEN;
    use proptest::prelude::*;

    fn sample() -> StreamSnapshot {
        StreamSnapshot::Text(WrappedSnapshot {
            inner: LeafKind::Raw,
            name: PathBuf::from("/data/run-01/traj.xyz"),
            position: 12_345,
        })
    }

    #[test]
    fn envelope_layout() {
        let bytes = encode_snapshot(&sample()).unwrap();
        assert_eq!(&bytes[0..4], &MAGIC_PSN1);
        assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), SNAPSHOT_V1);
        let len = u32::from_le_bytes(bytes[6..10].try_into().unwrap()) as usize;
        assert_eq!(bytes.len(), ENVELOPE_PREFIX_LEN + len);
        let crc = u32::from_le_bytes(bytes[10..14].try_into().unwrap());
        assert_eq!(crc, crc32fast::hash(&bytes[ENVELOPE_PREFIX_LEN..]));
    }

    #[test]
    fn decode_returns_same_value() {
        for snap in [
            sample(),
            StreamSnapshot::Buffered(WrappedSnapshot {
                inner: LeafKind::Raw,
                name: PathBuf::from("blob.bin"),
                position: 0,
            }),
            RawSnapshot { name: PathBuf::from("r"), position: u64::MAX }.into(),
        ] {
            assert_eq!(StreamSnapshot::from_bytes(&snap.to_bytes().unwrap()).unwrap(), snap);
        }
    }

    #[test]
    fn bad_magic() {
        let mut bytes = encode_snapshot(&sample()).unwrap();
        bytes[0] = b'X';
        assert!(matches!(decode_snapshot(&bytes), Err(SnapshotError::BadMagic { .. })));
    }

    #[test]
    fn unsupported_version() {
        let mut bytes = encode_snapshot(&sample()).unwrap();
        bytes[4..6].copy_from_slice(&99u16.to_le_bytes());
        assert!(matches!(
            decode_snapshot(&bytes),
            Err(SnapshotError::UnsupportedVersion { have: 99 })
        ));
    }

    #[test]
    fn flipped_payload_bit_fails_checksum() {
        let mut bytes = encode_snapshot(&sample()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        assert!(matches!(decode_snapshot(&bytes), Err(SnapshotError::ChecksumMismatch { .. })));
    }

    #[test]
    fn truncated_envelope() {
        let bytes = encode_snapshot(&sample()).unwrap();
        assert!(matches!(decode_snapshot(&bytes[..8]), Err(SnapshotError::Truncated { .. })));
        assert!(matches!(
            decode_snapshot(&bytes[..bytes.len() - 2]),
            Err(SnapshotError::Truncated { .. })
        ));
    }

    #[test]
    fn bytes_after_envelope_are_rejected() {
        let mut bytes = encode_snapshot(&sample()).unwrap();
        bytes.extend_from_slice(b"junk");
        assert!(matches!(
            decode_snapshot(&bytes),
            Err(SnapshotError::TrailingBytes { extra: 4 })
        ));
    }

    #[test]
    fn unknown_leaf_kind_is_rejected_on_decode() {
        // Hand-build a payload whose leaf id is not registered.
        #[derive(serde::Serialize)]
        enum Forged {
            #[allow(dead_code)]
            Raw(u8),
            Buffered { inner: u16, name: PathBuf, position: u64 },
        }
        let payload = bincode::serde::encode_to_vec(
            Forged::Buffered { inner: 0x7777, name: PathBuf::from("x"), position: 0 },
            bincode::config::standard(),
        )
        .unwrap();

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC_PSN1);
        bytes.extend_from_slice(&SNAPSHOT_V1.to_le_bytes());
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
        bytes.extend_from_slice(&payload);

        assert!(matches!(decode_snapshot(&bytes), Err(SnapshotError::Decode(_))));
    }

    #[test]
    fn token_roundtrip_and_garbage() {
        let token = snapshot_to_token(&sample()).unwrap();
        assert!(token.is_ascii());
        assert_eq!(snapshot_from_token(&format!("  {token}\n")).unwrap(), sample());
        assert!(matches!(snapshot_from_token("not base64!"), Err(SnapshotError::Token(_))));
    }

    #[test]
    fn snapshots_are_plain_serde_values() {
        let json = serde_json::to_string(&sample()).unwrap();
        // Leaf kind travels as its numeric id.
        assert!(json.contains("\"inner\":1"), "{json}");
        let back: StreamSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample());

        let bad = json.replace("\"inner\":1", "\"inner\":4242");
        assert!(serde_json::from_str::<StreamSnapshot>(&bad).is_err());
    }

    #[test]
    fn snapshot_error_converts_into_stream_error() {
        fn thaw_token(token: &str) -> picklable_core::Result<PickleStream> {
            snapshot_from_token(token)?.thaw()
        }
        assert!(matches!(thaw_token("@@@"), Err(StreamError::Snapshot(SnapshotError::Token(_)))));
    }

    proptest! {
        #[test]
        fn prop_random_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            let _ = decode_snapshot(&bytes);
        }

        #[test]
        fn prop_any_position_and_name_survive(position in any::<u64>(), name in "[a-zA-Z0-9_./-]{1,40}") {
            let snap = StreamSnapshot::Buffered(WrappedSnapshot {
                inner: LeafKind::Raw,
                name: PathBuf::from(name),
                position,
            });
            prop_assert_eq!(decode_snapshot(&encode_snapshot(&snap).unwrap()).unwrap(), snap);
        }
    }
}
