//! mode.rs
//! Access-mode parsing and the read-only gate.
//!
//! Mode strings use the familiar `[rwax][bt]?[+]?` grammar so callers can
//! pass the same strings they would hand to a regular `open`.
//! `OpenMode::from_mode_str` accepts exactly `r`, `rt` and `rb`; everything
//! else is rejected before any file is touched.

use std::fmt;
use std::str::FromStr;

use crate::types::StreamError;

const ONLY_READ_MODES: &str = "only read modes ('r', 'rt', 'rb') can be made serializable";

/// Parsed access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMode {
    pub read: bool,
    pub write: bool,
    pub append: bool,
    pub exclusive: bool,
    pub truncate: bool,
    /// Binary mode (false = text mode)
    pub binary: bool,
}

impl Default for FileMode {
    fn default() -> Self {
        Self { read: true, write: false, append: false, exclusive: false, truncate: false, binary: false }
    }
}

impl FileMode {
    /// Parse a mode string. Malformed strings are `StreamError::Mode`.
    pub fn parse(mode: &str) -> Result<Self, StreamError> {
        if mode.is_empty() {
            return Err(StreamError::mode(mode, "mode string cannot be empty"));
        }

        let mut out = FileMode::default();
        let mut primary: Option<u8> = None;
        let mut seen_bt = false;
        let mut seen_plus = false;

        for &b in mode.as_bytes() {
            match b {
                b'r' | b'w' | b'a' | b'x' => {
                    if primary.is_some() {
                        return Err(StreamError::mode(mode, "must have exactly one of r/w/a/x"));
                    }
                    primary = Some(b);
                }
                b'b' | b't' => {
                    if seen_bt {
                        return Err(StreamError::mode(mode, "binary and text flags are exclusive"));
                    }
                    seen_bt = true;
                    out.binary = b == b'b';
                }
                b'+' => {
                    if seen_plus {
                        return Err(StreamError::mode(mode, "duplicate '+'"));
                    }
                    seen_plus = true;
                }
                _ => return Err(StreamError::mode(mode, "invalid mode character")),
            }
        }

        match primary {
            Some(b'r') => {}
            Some(b'w') => {
                out.read = false;
                out.write = true;
                out.truncate = true;
            }
            Some(b'a') => {
                out.read = false;
                out.write = true;
                out.append = true;
            }
            Some(b'x') => {
                out.read = false;
                out.write = true;
                out.exclusive = true;
            }
            _ => return Err(StreamError::mode(mode, "must have exactly one of r/w/a/x")),
        }

        if seen_plus {
            out.read = true;
            out.write = true;
        }

        Ok(out)
    }

    /// True if this mode could modify the file in any way.
    #[inline]
    pub const fn is_write_capable(&self) -> bool {
        self.write || self.append || self.truncate || self.exclusive
    }

    /// Reject anything that is not a plain read mode.
    pub fn ensure_read_only(&self) -> Result<(), StreamError> {
        if self.is_write_capable() || !self.read {
            return Err(StreamError::mode(&self.to_string(), ONLY_READ_MODES));
        }
        Ok(())
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let primary = if self.exclusive {
            "x"
        } else if self.append {
            "a"
        } else if self.truncate {
            "w"
        } else {
            "r"
        };
        f.write_str(primary)?;
        if self.binary {
            f.write_str("b")?;
        }
        if self.read && self.write {
            f.write_str("+")?;
        }
        Ok(())
    }
}

/// The two layerings the factory can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Raw + text decoding (`"r"`, `"rt"`).
    #[default]
    TextRead,
    /// Raw + buffering (`"rb"`).
    BinaryRead,
}

impl OpenMode {
    /// Exactly `"r"`, `"rt"` or `"rb"`. Malformed strings keep their parse
    /// error; every other well-formed mode is refused as not read-only.
    pub fn from_mode_str(mode: &str) -> Result<Self, StreamError> {
        match mode {
            "r" | "rt" => Ok(OpenMode::TextRead),
            "rb" => Ok(OpenMode::BinaryRead),
            _ => {
                FileMode::parse(mode)?;
                Err(StreamError::mode(mode, ONLY_READ_MODES))
            }
        }
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            OpenMode::TextRead => "rt",
            OpenMode::BinaryRead => "rb",
        }
    }
}

impl TryFrom<FileMode> for OpenMode {
    type Error = StreamError;

    fn try_from(mode: FileMode) -> Result<Self, Self::Error> {
        mode.ensure_read_only()?;
        Ok(if mode.binary { OpenMode::BinaryRead } else { OpenMode::TextRead })
    }
}

impl FromStr for OpenMode {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OpenMode::from_mode_str(s)
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
