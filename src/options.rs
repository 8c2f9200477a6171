//! Configuration options for STON serialization.
//!
//! Output is always pretty-printed — one property or item per line with a
//! trailing comma — but the indent unit and line-break string are
//! caller-configurable.
//!
//! ```rust
//! use ston::WriteOptions;
//!
//! let options = WriteOptions::new().with_indent("  ").with_line_break("\r\n");
//! assert_eq!(options.indent, "  ");
//! ```

/// Serialization formatting options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteOptions {
    /// The string emitted once per nesting level, default `"\t"`.
    pub indent: String,
    /// The line terminator, default `"\n"`.
    pub line_break: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            indent: "\t".to_string(),
            line_break: "\n".to_string(),
        }
    }
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-level indent unit.
    #[must_use]
    pub fn with_indent(mut self, indent: &str) -> Self {
        self.indent = indent.to_string();
        self
    }

    /// Sets the line terminator.
    #[must_use]
    pub fn with_line_break(mut self, line_break: &str) -> Self {
        self.line_break = line_break.to_string();
        self
    }
}
