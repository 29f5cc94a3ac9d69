use std::io;
use std::path::Path;

use crate::constants::{DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE, MIN_BUFFER_SIZE};
use crate::types::StreamError;

/// Pick the read-ahead window for a buffered layer.
///
/// - `None` → `DEFAULT_BUFFER_SIZE`
/// - requests are clamped to `[MIN_BUFFER_SIZE, MAX_BUFFER_SIZE]`
/// - anything in between is rounded up to the next power of two
pub fn best_buffer_size(requested: Option<usize>) -> usize {
    match requested {
        None => DEFAULT_BUFFER_SIZE,
        Some(size) if size <= MIN_BUFFER_SIZE => MIN_BUFFER_SIZE,
        Some(size) if size >= MAX_BUFFER_SIZE => MAX_BUFFER_SIZE,
        Some(size) => size.next_power_of_two().min(MAX_BUFFER_SIZE),
    }
}

/// Map an `open()` failure onto the stream error taxonomy.
pub fn classify_open_error(path: &Path, e: io::Error) -> StreamError {
    match e.kind() {
        io::ErrorKind::NotFound => StreamError::NotFound { path: path.to_path_buf() },
        io::ErrorKind::PermissionDenied => StreamError::PermissionDenied { path: path.to_path_buf() },
        _ => StreamError::Io(e),
    }
}

/// Length of a UTF-8 sequence given its lead byte, `None` for continuation
/// or invalid lead bytes.
#[inline]
pub fn utf8_seq_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

#[inline]
pub fn is_utf8_continuation(b: u8) -> bool {
    (b & 0xC0) == 0x80
}
