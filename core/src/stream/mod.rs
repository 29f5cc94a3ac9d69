//! stream — layered read-only streams with freeze/thaw.
//!
//! ```text
//!   TextStream  |  BufferedStream      (wrapper layers, own their leaf)
//!   ------------+---------------
//!            Leaf (RawStream)          (only layer that talks to the OS)
//! ```
//!
//! Leaves first: `raw` → `registry` → `buffered` / `text` → `factory`.

pub mod types;
pub mod raw;
pub mod registry;
pub mod buffered;
pub mod text;
pub mod factory;

pub use types::{ByteSource, StreamHandle};
pub use raw::RawStream;
pub use registry::{open_leaf, open_leaf_by_id, resolve, Leaf, LeafInfo, LeafKind};
pub use buffered::BufferedStream;
pub use text::{Lines, TextStream};
pub use factory::{open_for_pickling, open_for_pickling_with, pickle_open, PickleStream};
