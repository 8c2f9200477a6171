//! # ston
//!
//! A schema-validated STON (Schema-Typed Object Notation) codec: a typed,
//! self-describing alternative to JSON/XML where every value is checked
//! against declared metadata — atoms, enums, classes with single
//! inheritance, nullable wrappers, and list/set/map collections — while
//! still tolerating forward-compatible unknown fields and open polymorphism.
//!
//! ## The core triad
//!
//! - **Type metadata** ([`meta`]): an immutable registry describing every
//!   schema type and how it composes. Built once via [`RegistryBuilder`],
//!   then frozen; the frozen [`Registry`] is `Send + Sync` and lookups are
//!   safe from any number of threads.
//! - **Parser** ([`de`]): a recursive-descent engine that turns token
//!   streams into validated object graphs, resolving namespace aliases and
//!   polymorphic type indicators while collecting structured diagnostics
//!   with speculative-parse rollback.
//! - **Serializer** ([`ser`]): regenerates canonical, round-trip-safe text
//!   from an object graph, synthesizing the alias header after the body.
//!
//! ## Quick start
//!
//! ```rust
//! use ston::{AtomKind, ClassType, Diagnostics, FullName, GlobalType, LocalType, RegistryBuilder};
//!
//! let registry = RegistryBuilder::new()
//!     .register_module(vec![GlobalType::Class(
//!         ClassType::new(FullName::new("urn:demo", "Point"))
//!             .with_property("X", LocalType::atom(AtomKind::I32))
//!             .with_property("Y", LocalType::atom(AtomKind::I32)),
//!     )])
//!     .build()
//!     .unwrap();
//!
//! let root = FullName::new("urn:demo", "Point");
//! let mut diags = Diagnostics::new();
//! let point = ston::parse_str(&registry, "point.ston", "{ X = 1, Y = 2, }", &root, &mut diags)
//!     .expect("valid input");
//! assert_eq!(point.property("X"), Some(&ston::Value::Int(1)));
//!
//! // Serializing and re-parsing reproduces an equal graph.
//! let text = ston::to_string(&registry, &point, Some(&root));
//! let again = ston::parse_str(&registry, "point.ston", &text, &root, &mut diags).unwrap();
//! assert_eq!(point, again);
//! ```
//!
//! ## The text form
//!
//! ```text
//! <a0 = @"urn:demo">
//! (a0::Point3){
//!     X = 1,
//!     Y = 2,
//!     Z = 3,
//! }
//! ```
//!
//! An optional alias header binds short aliases to namespace URIs for the
//! enclosing block; a type indicator `(alias::Name)` names a concrete class
//! equal to or derived from the statically declared one; properties and
//! collection items each end with a comma. Lists are `[ ... ]`, maps are
//! `#[ key = value, ... ]`, enum references are `alias::Enum.Member`.
//!
//! ## Failure model
//!
//! Expected failures never panic and never surface as `Err` values from the
//! parse entry points. Every problem is recorded as a [`Diagnostic`]
//! (severity, numeric code, message, source span) in a caller-owned
//! [`Diagnostics`] list; a parse returns `Some` iff no error-severity
//! diagnostic was recorded. Schema *metadata* problems are different — those
//! are programming errors and surface as [`SchemaError`] when the registry
//! is built.
//!
//! ## Concurrency
//!
//! Parsing and serializing are single-threaded, synchronous, and allocation-
//! only (no I/O). A [`Parser`] may be reused sequentially but not shared;
//! use one per thread. The [`Registry`] is the only shared state: build it
//! once, wrap it in `Arc`, and read it from everywhere.

pub mod atom;
pub mod de;
pub mod diag;
pub mod error;
pub mod lexer;
pub mod macros;
pub mod map;
pub mod meta;
pub mod options;
pub mod ser;
pub mod span;
pub mod value;

pub use de::Parser;
pub use diag::{DiagCode, Diagnostic, Diagnostics, Marker, Severity};
pub use error::SchemaError;
pub use lexer::{lex, Token, TokenKind};
pub use map::PropertyMap;
pub use meta::{
    AtomKind, ClassType, CoreType, EnumType, FullName, GlobalRef, GlobalType, Key, LifecycleHook,
    LocalType, Property, Registry, RegistryBuilder,
};
pub use options::WriteOptions;
pub use ser::Serializer;
pub use span::{TextPosition, TextSpan};
pub use value::{CiString, Decimal, EnumValue, Object, UntypedEnumValue, Value};

/// Parses `input` as one STON unit declared as class `root`.
///
/// `file` is purely descriptive and is embedded in the spans of emitted
/// diagnostics. Returns `Some` iff no error-severity diagnostic was
/// recorded into `diags`.
pub fn parse_str(
    registry: &Registry,
    file: &str,
    input: &str,
    root: &FullName,
    diags: &mut Diagnostics,
) -> Option<Object> {
    let tokens = lexer::lex(file, input, diags)?;
    Parser::new(registry).parse(tokens, root, diags)
}

/// Parses an already-lexed token stream. See [`parse_str`].
pub fn parse_tokens(
    registry: &Registry,
    tokens: Vec<Token>,
    root: &FullName,
    diags: &mut Diagnostics,
) -> Option<Object> {
    Parser::new(registry).parse(tokens, root, diags)
}

/// Serializes `object` as a document root declared as `declared`, with
/// default formatting (tab indent, `\n` line breaks).
pub fn to_string(registry: &Registry, object: &Object, declared: Option<&FullName>) -> String {
    to_string_with_options(registry, object, declared, WriteOptions::default())
}

/// Serializes `object` with custom formatting options.
pub fn to_string_with_options(
    registry: &Registry,
    object: &Object,
    declared: Option<&FullName>,
    options: WriteOptions,
) -> String {
    Serializer::new(registry, options).serialize(object, declared)
}
