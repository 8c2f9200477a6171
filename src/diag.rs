//! Structured diagnostics.
//!
//! Parsing never throws: every expected failure mode is recorded as a
//! [`Diagnostic`] — a severity, a machine-readable [`DiagCode`], a rendered
//! message, and a [`TextSpan`] — into a caller-owned [`Diagnostics`] list.
//! A parse succeeds iff the list holds no `Error`-severity record.
//!
//! The list supports *mark/restore*: [`Diagnostics::mark`] snapshots the
//! current length, and [`Diagnostics::restore`] truncates back to it. The
//! parser uses this for speculative sub-parses (e.g. trying to resolve a type
//! indicator in a schema-less position) so only the winning branch's
//! diagnostics survive.
//!
//! ```rust
//! use ston::{DiagCode, Diagnostics, TextSpan};
//!
//! let mut diags = Diagnostics::new();
//! let mark = diags.mark();
//! diags.error(DiagCode::InvalidAtomValue, "not a number", TextSpan::invalid());
//! assert!(diags.has_errors());
//! diags.restore(mark);
//! assert!(!diags.has_errors());
//! ```

use crate::span::TextSpan;
use serde::Serialize;
use std::fmt;

/// Diagnostic severity, ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Machine-readable diagnostic codes.
///
/// The numeric value is stable and part of the output contract; the variant
/// name doubles as the code's symbolic name in serialized diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u16)]
pub enum DiagCode {
    // Lexical / structural
    InvalidToken = 1,
    UnexpectedToken = 2,
    EndOfFileExpected = 3,

    // Alias scopes
    DuplicateAlias = 10,
    InvalidAliasReference = 11,
    InvalidUriReference = 12,

    // Type references
    InvalidGlobalTypeReference = 20,
    ClassNotEqualToOrDeriveFromTheDeclared = 21,
    ClassIsAbstract = 22,
    EnumNotEqualToTheDeclared = 23,
    InvalidEnumMemberName = 24,

    // Schema conformance
    PropertyMissing = 30,
    DuplicatePropertyName = 31,
    NullNotAllowed = 32,
    InvalidAtomValue = 33,

    // Collection integrity
    DuplicateSetItem = 40,
    DuplicateMapKey = 41,
}

impl DiagCode {
    /// The stable numeric code.
    pub fn code(self) -> u16 {
        self as u16
    }
}

/// One recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagCode,
    pub message: String,
    pub span: TextSpan,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: DiagCode, message: impl Into<String>, span: TextSpan) -> Self {
        Diagnostic {
            severity,
            code,
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        write!(
            f,
            "{}: [{:04}] {} ({})",
            severity,
            self.code.code(),
            self.message,
            self.span
        )
    }
}

/// A snapshot of a [`Diagnostics`] list's length.
///
/// Only valid against the list that produced it.
#[derive(Debug, Clone, Copy)]
pub struct Marker(usize);

/// An append-only diagnostic list for one parse/validate session.
#[derive(Debug, Default)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
    error_count: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    /// Appends a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity == Severity::Error {
            self.error_count += 1;
        }
        self.records.push(diagnostic);
    }

    /// Appends an `Error`-severity diagnostic.
    pub fn error(&mut self, code: DiagCode, message: impl Into<String>, span: TextSpan) {
        self.push(Diagnostic::new(Severity::Error, code, message, span));
    }

    /// Appends a `Warning`-severity diagnostic.
    pub fn warning(&mut self, code: DiagCode, message: impl Into<String>, span: TextSpan) {
        self.push(Diagnostic::new(Severity::Warning, code, message, span));
    }

    /// `true` iff at least one `Error`-severity diagnostic was recorded.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Snapshots the current length for a later [`restore`](Self::restore).
    pub fn mark(&self) -> Marker {
        Marker(self.records.len())
    }

    /// Truncates back to `marker`, discarding everything recorded after it.
    pub fn restore(&mut self, marker: Marker) {
        let Marker(len) = marker;
        if len >= self.records.len() {
            return;
        }
        for dropped in &self.records[len..] {
            if dropped.severity == Severity::Error {
                self.error_count -= 1;
            }
        }
        self.records.truncate(len);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.records.iter()
    }

    /// Clears the session, keeping the allocation.
    pub fn reset(&mut self) {
        self.records.clear();
        self.error_count = 0;
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
