//! Registry construction errors.
//!
//! Schema metadata is validated once, when [`RegistryBuilder::build`]
//! (see [`crate::meta`]) runs its resolution pass. Anything wrong with the
//! metadata itself — duplicate type names, missing base classes, colliding
//! properties, unresolvable key paths — surfaces here as a [`SchemaError`].
//!
//! Errors found in *input text* are never `SchemaError`s; those are recorded
//! as [`crate::Diagnostic`]s during parsing.
//!
//! [`RegistryBuilder::build`]: crate::meta::RegistryBuilder::build

use crate::meta::FullName;
use thiserror::Error;

/// A defect in registered schema metadata, detected during registry build.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// Two registered types share one full name.
    #[error("duplicate type name {0}")]
    DuplicateType(FullName),

    /// A property, map key, or base reference names an unregistered type.
    #[error("type {referenced} referenced by {referrer} is not registered")]
    UnknownType {
        referenced: FullName,
        referrer: FullName,
    },

    /// A class's base reference resolves to something that is not a class.
    #[error("base {base} of class {class} is not a class type")]
    BaseNotAClass { class: FullName, base: FullName },

    /// The base chain of a class loops back on itself.
    #[error("inheritance cycle through class {0}")]
    InheritanceCycle(FullName),

    /// An own property re-declares a name inherited from an ancestor.
    #[error("property \"{property}\" of class {class} collides with an inherited property")]
    PropertyCollision { class: FullName, property: String },

    /// A key path does not resolve inside the effective property map.
    #[error("key path \"{path}\" of class {class} does not resolve")]
    UnresolvedKey { class: FullName, path: String },

    /// An enum member's underlying value does not match the underlying atom kind.
    #[error("member \"{member}\" of enum {name} does not match the underlying atom kind")]
    EnumMemberKind { name: FullName, member: String },
}

pub type Result<T> = std::result::Result<T, SchemaError>;
