//! Source-location value types.
//!
//! Every token, diagnostic, and parsed object carries a [`TextSpan`] pointing
//! back into the input text. Spans are plain data: a file path (descriptive
//! only — the parser never opens it), a byte range, and 1-based line/column
//! positions for both ends.
//!
//! A span without a file path is the "invalid" sentinel, produced by
//! [`TextSpan::invalid`] for programmatically built values that never came
//! from text.

use serde::Serialize;
use std::fmt;

/// A 1-based line/column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextPosition {
    pub line: u32,
    pub column: u32,
}

impl TextPosition {
    pub const fn new(line: u32, column: u32) -> Self {
        TextPosition { line, column }
    }
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A contiguous region of source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextSpan {
    /// Descriptive file path; `None` marks an invalid span.
    pub file: Option<String>,
    /// Byte offset of the region start.
    pub offset: usize,
    /// Byte length of the region.
    pub length: usize,
    pub start: TextPosition,
    pub end: TextPosition,
}

impl TextSpan {
    pub fn new(
        file: &str,
        offset: usize,
        length: usize,
        start: TextPosition,
        end: TextPosition,
    ) -> Self {
        TextSpan {
            file: Some(file.to_string()),
            offset,
            length,
            start,
            end,
        }
    }

    /// The sentinel span for values that did not come from source text.
    pub const fn invalid() -> Self {
        TextSpan {
            file: None,
            offset: 0,
            length: 0,
            start: TextPosition::new(1, 1),
            end: TextPosition::new(1, 1),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.file.is_some()
    }
}

impl Default for TextSpan {
    fn default() -> Self {
        TextSpan::invalid()
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}", file, self.start),
            None => write!(f, "<invalid>"),
        }
    }
}
