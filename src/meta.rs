//! The type metadata model.
//!
//! Schema types are described once, registered through a
//! [`RegistryBuilder`], and frozen into an immutable [`Registry`] that the
//! parser and serializer both walk. The registry is the only shared state in
//! the crate: building it is the single mutation point, and the frozen value
//! is `Send + Sync`, so lookups are safe from any number of threads (share it
//! via `Arc` when parsing concurrently).
//!
//! The model mirrors the notation's type grammar:
//!
//! - [`AtomKind`] — the 19 primitive kinds, represented structurally rather
//!   than as registry rows.
//! - [`LocalType`] — a possibly-nullable use of a type at a property, item,
//!   or map-value position ([`CoreType`] is the non-nullable payload).
//! - [`EnumType`] — ordered member table over an underlying atom kind.
//! - [`ClassType`] — single inheritance, ordered own properties, optional
//!   composite keys, optional lifecycle hooks.
//!
//! [`RegistryBuilder::build`] runs the resolution pass: it checks every
//! cross-type reference, merges inherited properties into each class's
//! *effective property map* (base properties first, declaration order
//! preserved), resolves key inheritance, and rejects inheritance cycles.
//! After that nothing is ever mutated again.

use crate::diag::Diagnostics;
use crate::error::SchemaError;
use crate::span::TextSpan;
use crate::value::{Object, Value};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A (namespace URI, local name) pair — the universal schema lookup key.
///
/// Two full names are equal iff both components are equal, compared
/// ordinally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FullName {
    pub uri: String,
    pub name: String,
}

impl FullName {
    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        FullName {
            uri: uri.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.uri.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{{{}}}{}", self.uri, self.name)
        }
    }
}

/// The primitive value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomKind {
    String,
    IgnoreCaseString,
    Char,
    Decimal,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Bool,
    Binary,
    Guid,
    Duration,
    DateTime,
}

impl AtomKind {
    /// The kind's name as used in diagnostic messages.
    pub fn name(self) -> &'static str {
        match self {
            AtomKind::String => "String",
            AtomKind::IgnoreCaseString => "IgnoreCaseString",
            AtomKind::Char => "Char",
            AtomKind::Decimal => "Decimal",
            AtomKind::I8 => "Int8",
            AtomKind::I16 => "Int16",
            AtomKind::I32 => "Int32",
            AtomKind::I64 => "Int64",
            AtomKind::U8 => "UInt8",
            AtomKind::U16 => "UInt16",
            AtomKind::U32 => "UInt32",
            AtomKind::U64 => "UInt64",
            AtomKind::F32 => "Float32",
            AtomKind::F64 => "Float64",
            AtomKind::Bool => "Boolean",
            AtomKind::Binary => "Binary",
            AtomKind::Guid => "Guid",
            AtomKind::Duration => "Duration",
            AtomKind::DateTime => "DateTime",
        }
    }
}

/// A reference to a global type: an atom kind, or a registered class/enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobalRef {
    Atom(AtomKind),
    Named(FullName),
}

impl GlobalRef {
    pub fn named(uri: impl Into<String>, name: impl Into<String>) -> Self {
        GlobalRef::Named(FullName::new(uri, name))
    }
}

/// The non-nullable payload of a [`LocalType`].
#[derive(Debug, Clone, PartialEq)]
pub enum CoreType {
    Global(GlobalRef),
    List(Box<LocalType>),
    Set(Box<LocalType>),
    Map {
        key: GlobalRef,
        value: Box<LocalType>,
    },
}

/// The type of a property, collection item, or map value position.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalType {
    pub nullable: bool,
    pub core: CoreType,
}

impl LocalType {
    pub fn atom(kind: AtomKind) -> Self {
        LocalType {
            nullable: false,
            core: CoreType::Global(GlobalRef::Atom(kind)),
        }
    }

    pub fn named(uri: impl Into<String>, name: impl Into<String>) -> Self {
        LocalType {
            nullable: false,
            core: CoreType::Global(GlobalRef::named(uri, name)),
        }
    }

    pub fn list(item: LocalType) -> Self {
        LocalType {
            nullable: false,
            core: CoreType::List(Box::new(item)),
        }
    }

    pub fn set(item: LocalType) -> Self {
        LocalType {
            nullable: false,
            core: CoreType::Set(Box::new(item)),
        }
    }

    pub fn map(key: GlobalRef, value: LocalType) -> Self {
        LocalType {
            nullable: false,
            core: CoreType::Map {
                key,
                value: Box::new(value),
            },
        }
    }

    /// Marks the type nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// A declared class property.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub ty: LocalType,
}

/// One composite-key component: an ordered property path that may descend
/// into nested class-typed properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    pub path: Vec<String>,
}

impl Key {
    pub fn new<S: Into<String>>(path: impl IntoIterator<Item = S>) -> Self {
        Key {
            path: path.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path.join("."))
    }
}

/// A lifecycle hook invoked around object population. Returning `false`
/// aborts the parse of the enclosing value.
pub type LifecycleHook = fn(&mut Object, &mut Diagnostics, &TextSpan) -> bool;

/// An enum type: an ordered member table over an underlying atom kind.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub name: FullName,
    pub underlying: AtomKind,
    members: IndexMap<String, Value>,
}

impl EnumType {
    pub fn new(name: FullName, underlying: AtomKind) -> Self {
        EnumType {
            name,
            underlying,
            members: IndexMap::new(),
        }
    }

    pub fn with_member(mut self, name: &str, value: Value) -> Self {
        self.members.insert(name.to_string(), value);
        self
    }

    pub fn member(&self, name: &str) -> Option<&Value> {
        self.members.get(name)
    }

    /// Iterates members in declaration order.
    pub fn members(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.members.iter()
    }

    /// The name of the first declared member whose value equals `value`.
    ///
    /// When several member names alias one underlying value, the first
    /// declaration wins; schemas may rely on declaration order as the
    /// tie-break.
    pub fn member_name_of(&self, value: &Value) -> Option<&str> {
        self.members
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(name, _)| name.as_str())
    }
}

/// A class type: single inheritance, ordered own properties, optional
/// composite keys, optional lifecycle hooks.
///
/// The effective property map and the resolved key list are filled in by
/// [`RegistryBuilder::build`]; before that, only the declared (`own`) data
/// is populated.
#[derive(Debug, Clone)]
pub struct ClassType {
    pub name: FullName,
    pub is_abstract: bool,
    pub base: Option<FullName>,
    own_properties: IndexMap<String, Property>,
    declared_keys: Option<Vec<Key>>,
    pub on_loading: Option<LifecycleHook>,
    pub on_loaded: Option<LifecycleHook>,
    effective: IndexMap<String, Property>,
    resolved_keys: Option<Vec<Key>>,
}

impl ClassType {
    pub fn new(name: FullName) -> Self {
        ClassType {
            name,
            is_abstract: false,
            base: None,
            own_properties: IndexMap::new(),
            declared_keys: None,
            on_loading: None,
            on_loaded: None,
            effective: IndexMap::new(),
            resolved_keys: None,
        }
    }

    pub fn abstract_(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn with_base(mut self, base: FullName) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_property(mut self, name: &str, ty: LocalType) -> Self {
        self.own_properties.insert(
            name.to_string(),
            Property {
                name: name.to_string(),
                ty,
            },
        );
        self
    }

    pub fn with_keys(mut self, keys: Vec<Key>) -> Self {
        self.declared_keys = Some(keys);
        self
    }

    pub fn with_on_loading(mut self, hook: LifecycleHook) -> Self {
        self.on_loading = Some(hook);
        self
    }

    pub fn with_on_loaded(mut self, hook: LifecycleHook) -> Self {
        self.on_loaded = Some(hook);
        self
    }

    /// Own (non-inherited) properties in declaration order.
    pub fn own_properties(&self) -> indexmap::map::Iter<'_, String, Property> {
        self.own_properties.iter()
    }

    /// The merged property map: base properties first, then own, in
    /// declaration order. Empty until the registry is built.
    pub fn effective_properties(&self) -> &IndexMap<String, Property> {
        &self.effective
    }

    /// The key list in force for this class: its own, or the nearest
    /// ancestor's. `None` when no class in the chain declares keys.
    pub fn keys(&self) -> Option<&[Key]> {
        self.resolved_keys.as_deref()
    }
}

/// A registered global type.
#[derive(Debug, Clone)]
pub enum GlobalType {
    Class(ClassType),
    Enum(EnumType),
}

impl GlobalType {
    pub fn full_name(&self) -> &FullName {
        match self {
            GlobalType::Class(c) => &c.name,
            GlobalType::Enum(e) => &e.name,
        }
    }
}

/// Collects schema modules and freezes them into a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    types: Vec<GlobalType>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        RegistryBuilder::default()
    }

    /// Registers one module's types. Modules accumulate; nothing is
    /// validated until [`build`](Self::build).
    pub fn register_module(mut self, types: impl IntoIterator<Item = GlobalType>) -> Self {
        self.types.extend(types);
        self
    }

    /// Runs the resolution pass and freezes the registry.
    ///
    /// The pass rejects duplicate full names, unknown or non-class bases,
    /// inheritance cycles, own/inherited property collisions, references to
    /// unregistered types, enum members whose values do not match the
    /// underlying kind, and key paths that do not resolve.
    pub fn build(self) -> Result<Registry, SchemaError> {
        let mut types: HashMap<FullName, GlobalType> = HashMap::new();
        for ty in self.types {
            let name = ty.full_name().clone();
            if types.insert(name.clone(), ty).is_some() {
                return Err(SchemaError::DuplicateType(name));
            }
        }

        let class_names: Vec<FullName> = types
            .values()
            .filter_map(|t| match t {
                GlobalType::Class(c) => Some(c.name.clone()),
                GlobalType::Enum(_) => None,
            })
            .collect();

        for ty in types.values() {
            match ty {
                GlobalType::Class(class) => validate_class_refs(class, &types)?,
                GlobalType::Enum(en) => validate_enum(en)?,
            }
        }

        // Effective property maps, computed base-first with cycle detection.
        let mut effective: HashMap<FullName, IndexMap<String, Property>> = HashMap::new();
        for name in &class_names {
            let mut in_progress = HashSet::new();
            compute_effective(name, &types, &mut effective, &mut in_progress)?;
        }

        // Key inheritance: nearest ancestor that declares keys.
        let mut resolved_keys: HashMap<FullName, Option<Vec<Key>>> = HashMap::new();
        for name in &class_names {
            let keys = nearest_keys(name, &types);
            if let Some(keys) = &keys {
                for key in keys {
                    validate_key_path(name, key, &effective, &types)?;
                }
            }
            resolved_keys.insert(name.clone(), keys);
        }

        for name in &class_names {
            if let Some(GlobalType::Class(class)) = types.get_mut(name) {
                class.effective = effective.remove(name).unwrap_or_default();
                class.resolved_keys = resolved_keys.remove(name).flatten();
            }
        }

        let namespaces = types.keys().map(|n| n.uri.clone()).collect();
        Ok(Registry { types, namespaces })
    }
}

fn validate_class_refs(
    class: &ClassType,
    types: &HashMap<FullName, GlobalType>,
) -> Result<(), SchemaError> {
    if let Some(base) = &class.base {
        match types.get(base) {
            Some(GlobalType::Class(_)) => {}
            Some(_) => {
                return Err(SchemaError::BaseNotAClass {
                    class: class.name.clone(),
                    base: base.clone(),
                })
            }
            None => {
                return Err(SchemaError::UnknownType {
                    referenced: base.clone(),
                    referrer: class.name.clone(),
                })
            }
        }
    }
    for (_, property) in class.own_properties() {
        validate_local_refs(&class.name, &property.ty, types)?;
    }
    Ok(())
}

fn validate_local_refs(
    referrer: &FullName,
    ty: &LocalType,
    types: &HashMap<FullName, GlobalType>,
) -> Result<(), SchemaError> {
    match &ty.core {
        CoreType::Global(gref) => validate_global_ref(referrer, gref, types),
        CoreType::List(item) | CoreType::Set(item) => validate_local_refs(referrer, item, types),
        CoreType::Map { key, value } => {
            validate_global_ref(referrer, key, types)?;
            validate_local_refs(referrer, value, types)
        }
    }
}

fn validate_global_ref(
    referrer: &FullName,
    gref: &GlobalRef,
    types: &HashMap<FullName, GlobalType>,
) -> Result<(), SchemaError> {
    match gref {
        GlobalRef::Atom(_) => Ok(()),
        GlobalRef::Named(name) if types.contains_key(name) => Ok(()),
        GlobalRef::Named(name) => Err(SchemaError::UnknownType {
            referenced: name.clone(),
            referrer: referrer.clone(),
        }),
    }
}

fn validate_enum(en: &EnumType) -> Result<(), SchemaError> {
    for (member, value) in en.members() {
        if !value_matches_kind(en.underlying, value) {
            return Err(SchemaError::EnumMemberKind {
                name: en.name.clone(),
                member: member.clone(),
            });
        }
    }
    Ok(())
}

fn value_matches_kind(kind: AtomKind, value: &Value) -> bool {
    matches!(
        (kind, value),
        (AtomKind::String, Value::String(_))
            | (AtomKind::IgnoreCaseString, Value::CiString(_))
            | (AtomKind::Char, Value::Char(_))
            | (AtomKind::Decimal, Value::Decimal(_))
            | (AtomKind::I8 | AtomKind::I16 | AtomKind::I32 | AtomKind::I64, Value::Int(_))
            | (AtomKind::U8 | AtomKind::U16 | AtomKind::U32 | AtomKind::U64, Value::UInt(_))
            | (AtomKind::F32, Value::F32(_))
            | (AtomKind::F64, Value::F64(_))
            | (AtomKind::Bool, Value::Bool(_))
            | (AtomKind::Binary, Value::Binary(_))
            | (AtomKind::Guid, Value::Guid(_))
            | (AtomKind::Duration, Value::Duration(_))
            | (AtomKind::DateTime, Value::DateTime(_))
    )
}

fn compute_effective(
    name: &FullName,
    types: &HashMap<FullName, GlobalType>,
    memo: &mut HashMap<FullName, IndexMap<String, Property>>,
    in_progress: &mut HashSet<FullName>,
) -> Result<(), SchemaError> {
    if memo.contains_key(name) {
        return Ok(());
    }
    if !in_progress.insert(name.clone()) {
        return Err(SchemaError::InheritanceCycle(name.clone()));
    }
    let class = match types.get(name) {
        Some(GlobalType::Class(c)) => c,
        _ => unreachable!("effective maps are computed for classes only"),
    };
    let mut merged = IndexMap::new();
    if let Some(base) = &class.base {
        compute_effective(base, types, memo, in_progress)?;
        merged = memo[base].clone();
    }
    for (prop_name, property) in class.own_properties() {
        if merged.contains_key(prop_name) {
            return Err(SchemaError::PropertyCollision {
                class: name.clone(),
                property: prop_name.clone(),
            });
        }
        merged.insert(prop_name.clone(), property.clone());
    }
    in_progress.remove(name);
    memo.insert(name.clone(), merged);
    Ok(())
}

fn nearest_keys(name: &FullName, types: &HashMap<FullName, GlobalType>) -> Option<Vec<Key>> {
    let mut current = Some(name.clone());
    while let Some(class_name) = current {
        let class = match types.get(&class_name) {
            Some(GlobalType::Class(c)) => c,
            _ => return None,
        };
        if let Some(keys) = &class.declared_keys {
            return Some(keys.clone());
        }
        current = class.base.clone();
    }
    None
}

fn validate_key_path(
    class: &FullName,
    key: &Key,
    effective: &HashMap<FullName, IndexMap<String, Property>>,
    types: &HashMap<FullName, GlobalType>,
) -> Result<(), SchemaError> {
    let unresolved = || SchemaError::UnresolvedKey {
        class: class.clone(),
        path: key.to_string(),
    };
    if key.path.is_empty() {
        return Err(unresolved());
    }
    let mut scope = effective.get(class).ok_or_else(unresolved)?;
    for (index, segment) in key.path.iter().enumerate() {
        let property = scope.get(segment).ok_or_else(unresolved)?;
        if index + 1 == key.path.len() {
            break;
        }
        // Intermediate segments must scope into a class-typed property.
        match &property.ty.core {
            CoreType::Global(GlobalRef::Named(next)) => match types.get(next) {
                Some(GlobalType::Class(_)) => {
                    scope = effective.get(next).ok_or_else(unresolved)?;
                }
                _ => return Err(unresolved()),
            },
            _ => return Err(unresolved()),
        }
    }
    Ok(())
}

/// The frozen type registry. Lookups are read-only and safe for
/// unsynchronized concurrent use.
#[derive(Debug)]
pub struct Registry {
    types: HashMap<FullName, GlobalType>,
    namespaces: HashSet<String>,
}

impl Registry {
    /// An empty registry, for purely schema-less parsing.
    pub fn empty() -> Self {
        Registry {
            types: HashMap::new(),
            namespaces: HashSet::new(),
        }
    }

    pub fn lookup(&self, name: &FullName) -> Option<&GlobalType> {
        self.types.get(name)
    }

    pub fn class_type(&self, name: &FullName) -> Option<&ClassType> {
        match self.types.get(name) {
            Some(GlobalType::Class(c)) => Some(c),
            _ => None,
        }
    }

    pub fn enum_type(&self, name: &FullName) -> Option<&EnumType> {
        match self.types.get(name) {
            Some(GlobalType::Enum(e)) => Some(e),
            _ => None,
        }
    }

    /// `true` iff at least one registered type lives under `uri`.
    pub fn has_namespace(&self, uri: &str) -> bool {
        self.namespaces.contains(uri)
    }

    /// `true` iff `sub` names a class equal to `base` or reachable from it
    /// by walking the base chain.
    pub fn derives_from(&self, sub: &FullName, base: &FullName) -> bool {
        let mut current = Some(sub.clone());
        while let Some(name) = current {
            if &name == base {
                return true;
            }
            current = self.class_type(&name).and_then(|c| c.base.clone());
        }
        false
    }

    /// The base chain of `class`, root first, ending with `class` itself.
    pub fn base_chain<'a>(&'a self, class: &'a ClassType) -> Vec<&'a ClassType> {
        let mut chain = vec![class];
        let mut current = class.base.as_ref();
        while let Some(name) = current {
            match self.class_type(name) {
                Some(base) => {
                    chain.push(base);
                    current = base.base.as_ref();
                }
                None => break,
            }
        }
        chain.reverse();
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri() -> &'static str {
        "http://example.com/schema"
    }

    fn base_class() -> ClassType {
        ClassType::new(FullName::new(uri(), "Base"))
            .with_property("Id", LocalType::atom(AtomKind::I32))
    }

    fn sub_class() -> ClassType {
        ClassType::new(FullName::new(uri(), "Sub"))
            .with_base(FullName::new(uri(), "Base"))
            .with_property("Name", LocalType::atom(AtomKind::String))
    }

    fn build(types: Vec<GlobalType>) -> Result<Registry, SchemaError> {
        RegistryBuilder::new().register_module(types).build()
    }

    #[test]
    fn effective_map_merges_base_first() {
        let registry = build(vec![
            GlobalType::Class(base_class()),
            GlobalType::Class(sub_class()),
        ])
        .unwrap();
        let sub = registry.class_type(&FullName::new(uri(), "Sub")).unwrap();
        let names: Vec<_> = sub.effective_properties().keys().cloned().collect();
        assert_eq!(names, vec!["Id", "Name"]);
    }

    #[test]
    fn property_collision_is_rejected() {
        let colliding = ClassType::new(FullName::new(uri(), "Sub"))
            .with_base(FullName::new(uri(), "Base"))
            .with_property("Id", LocalType::atom(AtomKind::String));
        let err = build(vec![
            GlobalType::Class(base_class()),
            GlobalType::Class(colliding),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::PropertyCollision { property, .. } if property == "Id"));
    }

    #[test]
    fn unknown_base_is_rejected() {
        let orphan =
            ClassType::new(FullName::new(uri(), "Orphan")).with_base(FullName::new(uri(), "Gone"));
        let err = build(vec![GlobalType::Class(orphan)]).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType { .. }));
    }

    #[test]
    fn inheritance_cycle_is_rejected() {
        let a = ClassType::new(FullName::new(uri(), "A")).with_base(FullName::new(uri(), "B"));
        let b = ClassType::new(FullName::new(uri(), "B")).with_base(FullName::new(uri(), "A"));
        let err = build(vec![GlobalType::Class(a), GlobalType::Class(b)]).unwrap_err();
        assert!(matches!(err, SchemaError::InheritanceCycle(_)));
    }

    #[test]
    fn duplicate_type_name_is_rejected() {
        let err = build(vec![
            GlobalType::Class(base_class()),
            GlobalType::Class(base_class()),
        ])
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateType(_)));
    }

    #[test]
    fn keys_resolve_through_nested_classes() {
        let part = ClassType::new(FullName::new(uri(), "Part"))
            .with_property("Serial", LocalType::atom(AtomKind::String));
        let whole = ClassType::new(FullName::new(uri(), "Whole"))
            .with_property("Main", LocalType::named(uri(), "Part"))
            .with_keys(vec![Key::new(["Main", "Serial"])]);
        let registry = build(vec![GlobalType::Class(part), GlobalType::Class(whole)]).unwrap();
        let whole = registry.class_type(&FullName::new(uri(), "Whole")).unwrap();
        assert_eq!(whole.keys().unwrap()[0].to_string(), "Main.Serial");
    }

    #[test]
    fn unresolvable_key_is_rejected() {
        let class = ClassType::new(FullName::new(uri(), "K"))
            .with_property("Id", LocalType::atom(AtomKind::I32))
            .with_keys(vec![Key::new(["Missing"])]);
        let err = build(vec![GlobalType::Class(class)]).unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvedKey { .. }));
    }

    #[test]
    fn keys_are_inherited_from_nearest_ancestor() {
        let base = base_class().with_keys(vec![Key::new(["Id"])]);
        let registry =
            build(vec![GlobalType::Class(base), GlobalType::Class(sub_class())]).unwrap();
        let sub = registry.class_type(&FullName::new(uri(), "Sub")).unwrap();
        assert_eq!(sub.keys().unwrap().len(), 1);
    }

    #[test]
    fn derives_from_walks_the_chain() {
        let registry = build(vec![
            GlobalType::Class(base_class()),
            GlobalType::Class(sub_class()),
        ])
        .unwrap();
        let base = FullName::new(uri(), "Base");
        let sub = FullName::new(uri(), "Sub");
        assert!(registry.derives_from(&sub, &base));
        assert!(registry.derives_from(&base, &base));
        assert!(!registry.derives_from(&base, &sub));
    }

    #[test]
    fn enum_member_lookup_is_first_declared_wins() {
        let en = EnumType::new(FullName::new(uri(), "E"), AtomKind::I32)
            .with_member("First", Value::Int(1))
            .with_member("Alias", Value::Int(1))
            .with_member("Second", Value::Int(2));
        assert_eq!(en.member_name_of(&Value::Int(1)), Some("First"));
        assert_eq!(en.member_name_of(&Value::Int(2)), Some("Second"));
        assert_eq!(en.member_name_of(&Value::Int(3)), None);
    }

    #[test]
    fn enum_member_kind_mismatch_is_rejected() {
        let en = EnumType::new(FullName::new(uri(), "E"), AtomKind::I32)
            .with_member("Bad", Value::String("x".to_string()));
        let err = build(vec![GlobalType::Enum(en)]).unwrap_err();
        assert!(matches!(err, SchemaError::EnumMemberKind { .. }));
    }

    #[test]
    fn registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
