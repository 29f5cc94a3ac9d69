//! config.rs
//! Per-open tuning knobs.
//!
//! Nothing in here changes what a stream reads, only how it reads it, so
//! none of it is captured in snapshots. Thaw takes a config of its own.

use crate::utils::best_buffer_size;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenConfig {
    /// Read-ahead window for buffered and text layers.
    /// - `None` → `DEFAULT_BUFFER_SIZE`.
    /// - Other values are normalized by `best_buffer_size`.
    pub buffer_size: Option<usize>,
}

impl OpenConfig {
    pub fn new(buffer_size: Option<usize>) -> Self {
        Self { buffer_size }
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = Some(size);
        self
    }

    /// Effective buffer size after normalization.
    pub fn resolved_buffer_size(&self) -> usize {
        best_buffer_size(self.buffer_size)
    }
}
