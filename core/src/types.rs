use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::snapshot::SnapshotError;

pub type Result<T> = std::result::Result<T, StreamError>;

/// Unified stream error covering open, read, freeze/thaw and snapshot encoding.
/// - Ergonomic `From<T>` impls enable `?` across the layers.
/// - Every error surfaces at the call that caused it; nothing is retried.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Backing file absent at open time.
    #[error("no such file: {}", path.display())]
    NotFound { path: PathBuf },

    /// Backing file exists but cannot be read.
    #[error("permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    /// Path names something other than a regular file.
    #[error("not a regular file: {}", path.display())]
    NotAFile { path: PathBuf },

    /// Write-capable or malformed access mode, rejected before any resource is acquired.
    #[error("invalid mode {mode:?}: {reason}")]
    Mode { mode: String, reason: &'static str },

    /// Thaw could not reopen or reseek the backing file.
    #[error("cannot reconstruct stream for {}: {source}", path.display())]
    Reconstruction {
        path: PathBuf,
        #[source]
        source: Box<StreamError>,
    },

    /// Saved position lies past the end of the file (file shrank since freeze).
    #[error("position {position} is past end of file (length {len})")]
    PositionOutOfRange { position: u64, len: u64 },

    /// Text seek cookie does not fall on a character boundary.
    #[error("position {position} is not a character boundary")]
    InvalidPosition { position: u64 },

    /// Bytes at `position` are not valid UTF-8.
    #[error("invalid UTF-8 data at byte {position}")]
    Decode { position: u64 },

    /// Operation on a stream that was already closed.
    #[error("I/O operation on closed stream")]
    Closed,

    /// Snapshot names a leaf kind this build does not know.
    #[error("unknown leaf kind: 0x{raw:04x}")]
    UnknownLeafKind { raw: u16 },

    /// Envelope encode/decode failure.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Any other OS-level I/O failure, surfaced as-is.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StreamError {
    pub(crate) fn mode(mode: &str, reason: &'static str) -> Self {
        StreamError::Mode { mode: mode.to_string(), reason }
    }

    /// Wrap `cause` as a thaw failure for `path`.
    pub fn reconstruction(path: impl Into<PathBuf>, cause: StreamError) -> Self {
        StreamError::Reconstruction { path: path.into(), source: Box::new(cause) }
    }

    /// Innermost error, looking through any `Reconstruction` wrappers.
    pub fn root_cause(&self) -> &StreamError {
        match self {
            StreamError::Reconstruction { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// True if the backing file was missing, directly or as a thaw cause.
    pub fn is_not_found(&self) -> bool {
        matches!(self.root_cause(), StreamError::NotFound { .. })
    }
}

impl From<StreamError> for io::Error {
    fn from(e: StreamError) -> Self {
        let kind = match &e {
            StreamError::NotFound { .. } => io::ErrorKind::NotFound,
            StreamError::PermissionDenied { .. } => io::ErrorKind::PermissionDenied,
            StreamError::Mode { .. }
            | StreamError::InvalidPosition { .. }
            | StreamError::PositionOutOfRange { .. } => io::ErrorKind::InvalidInput,
            StreamError::Decode { .. } => io::ErrorKind::InvalidData,
            StreamError::Io(inner) => inner.kind(),
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, e)
    }
}
