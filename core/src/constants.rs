/// Magic number for the snapshot envelope.
/// "PSN1" = Picklable Stream sNapshot v1
pub const MAGIC_PSN1: [u8; 4] = *b"PSN1";
pub const SNAPSHOT_V1: u16 = 1;

/// Defaults when Option<T> is None
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024; // 8 KiB
/// Smallest read-ahead window a buffered layer will use.
pub const MIN_BUFFER_SIZE: usize = 64;
/// Max buffer size sanity bound (16 MiB).
pub const MAX_BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// Leaf byte-source identifiers (mirrored in snapshots).
pub mod leaf_ids {
    pub const RAW: u16 = 0x0001;
}
