//! Canonical STON serialization.
//!
//! Walks an object graph depth-first against its (optionally) declared type
//! and regenerates round-trip-safe text. A type indicator `(alias::Name)` is
//! emitted only where the runtime class differs from the statically expected
//! class, so re-serializing a parsed document stays canonical.
//!
//! Serialization is two-phase: aliases for namespace URIs are allocated on
//! first reference (`a0`, `a1`, … in first-seen order) while the body is
//! generated, and the alias header can only be synthesized — and prepended —
//! once the traversal has finished. There is no streaming single pass.
//!
//! Output is pretty-printed: one property or item per line, a trailing comma
//! after every element, indentation per nesting level (see
//! [`WriteOptions`]).

use crate::atom;
use crate::meta::{CoreType, FullName, GlobalRef, LocalType, Registry};
use crate::options::WriteOptions;
use crate::value::{EnumValue, Object, UntypedEnumValue, Value};
use indexmap::IndexMap;

/// The STON serializer. Create one per call via [`Serializer::new`].
pub struct Serializer<'a> {
    registry: &'a Registry,
    options: WriteOptions,
    out: String,
    level: usize,
    /// URI → alias, in first-seen order.
    aliases: IndexMap<String, String>,
}

impl<'a> Serializer<'a> {
    pub fn new(registry: &'a Registry, options: WriteOptions) -> Self {
        Serializer {
            registry,
            options,
            out: String::with_capacity(256),
            level: 0,
            aliases: IndexMap::new(),
        }
    }

    /// Serializes `object` as a document root declared as `declared`.
    pub fn serialize(mut self, object: &Object, declared: Option<&FullName>) -> String {
        self.write_object(object, declared);
        let body = std::mem::take(&mut self.out);
        if self.aliases.is_empty() {
            return body;
        }
        let mut text = String::with_capacity(body.len() + 64);
        text.push('<');
        for (index, (uri, alias)) in self.aliases.iter().enumerate() {
            if index > 0 {
                text.push_str(", ");
            }
            text.push_str(alias);
            text.push_str(" = ");
            text.push_str(&atom::format_string(uri));
        }
        text.push('>');
        text.push_str(&self.options.line_break);
        text.push_str(&body);
        text
    }

    fn alias_for(&mut self, uri: &str) -> String {
        if let Some(alias) = self.aliases.get(uri) {
            return alias.clone();
        }
        let alias = format!("a{}", self.aliases.len());
        self.aliases.insert(uri.to_string(), alias.clone());
        alias
    }

    fn newline(&mut self) {
        self.out.push_str(&self.options.line_break);
        for _ in 0..self.level {
            self.out.push_str(&self.options.indent);
        }
    }

    fn write_value(&mut self, value: &Value, declared: Option<&LocalType>) {
        match value {
            Value::Object(object) => self.write_object(object, class_expected(declared)),
            Value::Enum(en) => self.write_enum(en),
            Value::UnresolvedEnum(en) => self.write_unresolved_enum(en),
            Value::List(items) | Value::Set(items) => {
                self.write_items(items, item_type(declared));
            }
            Value::Map(entries) => self.write_map(entries, declared),
            atom => self.out.push_str(&atom::format(atom)),
        }
    }

    fn write_object(&mut self, object: &Object, expected: Option<&FullName>) {
        if let Some(class) = &object.class {
            if expected != Some(class) {
                let alias = self.alias_for(&class.uri);
                self.out.push('(');
                self.out.push_str(&alias);
                self.out.push_str("::");
                self.out.push_str(&class.name);
                self.out.push(')');
            }
        }

        // Declared properties in effective declaration order, then anything
        // bound outside the schema, then the unknown side table.
        let class = object.class.as_ref().and_then(|c| self.registry.class_type(c));
        let mut entries: Vec<(&str, &Value, Option<&LocalType>)> = Vec::new();
        match class {
            Some(class) => {
                for (name, property) in class.effective_properties() {
                    if let Some(value) = object.properties.get(name) {
                        if !value.is_null() {
                            entries.push((name.as_str(), value, Some(&property.ty)));
                        }
                    }
                }
                for (name, value) in &object.properties {
                    if !class.effective_properties().contains_key(name) && !value.is_null() {
                        entries.push((name.as_str(), value, None));
                    }
                }
            }
            None => {
                for (name, value) in &object.properties {
                    if !value.is_null() {
                        entries.push((name.as_str(), value, None));
                    }
                }
            }
        }
        for (name, value) in &object.unknown {
            if !value.is_null() {
                entries.push((name.as_str(), value, None));
            }
        }

        if entries.is_empty() {
            self.out.push_str("{}");
            return;
        }
        self.out.push('{');
        self.level += 1;
        for (name, value, ty) in entries {
            self.newline();
            self.out.push_str(name);
            self.out.push_str(" = ");
            self.write_value(value, ty);
            self.out.push(',');
        }
        self.level -= 1;
        self.newline();
        self.out.push('}');
    }

    fn write_enum(&mut self, en: &EnumValue) {
        let member = self
            .registry
            .enum_type(&en.name)
            .and_then(|ty| ty.member_name_of(&en.value))
            .map(str::to_string);
        match member {
            Some(member) => self.write_enum_ref(&en.name, &member),
            // A value mutated out of the member table has no name to emit.
            None => self.out.push_str("null"),
        }
    }

    fn write_unresolved_enum(&mut self, en: &UntypedEnumValue) {
        if en.name.uri.is_empty() {
            self.out.push_str(&en.name.name);
            self.out.push('.');
            self.out.push_str(&en.member);
        } else {
            self.write_enum_ref(&en.name, &en.member);
        }
    }

    fn write_enum_ref(&mut self, name: &FullName, member: &str) {
        let alias = self.alias_for(&name.uri);
        self.out.push_str(&alias);
        self.out.push_str("::");
        self.out.push_str(&name.name);
        self.out.push('.');
        self.out.push_str(member);
    }

    fn write_items(&mut self, items: &[Value], item_ty: Option<&LocalType>) {
        if items.is_empty() {
            self.out.push_str("[]");
            return;
        }
        self.out.push('[');
        self.level += 1;
        for item in items {
            self.newline();
            self.write_value(item, item_ty);
            self.out.push(',');
        }
        self.level -= 1;
        self.newline();
        self.out.push(']');
    }

    fn write_map(&mut self, entries: &[(Value, Value)], declared: Option<&LocalType>) {
        if entries.is_empty() {
            self.out.push_str("#[]");
            return;
        }
        let (key_ty, value_ty) = map_types(declared);
        self.out.push_str("#[");
        self.level += 1;
        for (key, value) in entries {
            self.newline();
            self.write_value(key, key_ty.as_ref());
            self.out.push_str(" = ");
            self.write_value(value, value_ty);
            self.out.push(',');
        }
        self.level -= 1;
        self.newline();
        self.out.push(']');
    }
}

fn class_expected(declared: Option<&LocalType>) -> Option<&FullName> {
    match declared {
        Some(LocalType {
            core: CoreType::Global(GlobalRef::Named(name)),
            ..
        }) => Some(name),
        _ => None,
    }
}

fn item_type(declared: Option<&LocalType>) -> Option<&LocalType> {
    match declared {
        Some(LocalType {
            core: CoreType::List(item) | CoreType::Set(item),
            ..
        }) => Some(item),
        _ => None,
    }
}

fn map_types(declared: Option<&LocalType>) -> (Option<LocalType>, Option<&LocalType>) {
    match declared {
        Some(LocalType {
            core: CoreType::Map { key, value },
            ..
        }) => (
            Some(LocalType {
                nullable: false,
                core: CoreType::Global(key.clone()),
            }),
            Some(value),
        ),
        _ => (None, None),
    }
}
