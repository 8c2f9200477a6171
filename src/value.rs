//! The dynamic object graph.
//!
//! [`Value`] represents any value a STON document can contain. The parser
//! produces `Value` graphs validated against the registered metadata; the
//! serializer walks them back into text. The same representation doubles as
//! the schema-less fallback: an [`Object`] with no class name, or an
//! [`UntypedEnumValue`] whose member was never resolved, is what unknown
//! properties and unregistered types materialize as.
//!
//! Equality over values is structural. Object equality ignores source spans,
//! so a parsed graph compares equal to a programmatically built one.
//!
//! ```rust
//! use ston::{Object, Value};
//!
//! let mut person = Object::untyped();
//! person.properties.insert("Name".to_string(), Value::from("Ada"));
//! assert_eq!(person.properties.get("Name").and_then(Value::as_str), Some("Ada"));
//! ```

use crate::map::PropertyMap;
use crate::meta::FullName;
use crate::span::TextSpan;
use chrono::{DateTime, Duration, FixedOffset};
use num_bigint::{BigInt, Sign};
use std::fmt;
use uuid::Uuid;

/// A string compared case-insensitively (ASCII).
///
/// Backing store for the `IgnoreCaseString` atom kind. The original text is
/// preserved; only comparison folds case.
#[derive(Debug, Clone)]
pub struct CiString(String);

impl CiString {
    pub fn new(text: impl Into<String>) -> Self {
        CiString(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl PartialEq for CiString {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for CiString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CiString {
    fn from(text: &str) -> Self {
        CiString(text.to_string())
    }
}

/// An arbitrary-precision decimal: `mantissa / 10^scale`.
///
/// Construction normalizes by trimming trailing fraction zeros, so `1.10`
/// and `1.1` compare equal and format identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal {
    mantissa: BigInt,
    scale: u32,
}

impl Decimal {
    pub fn new(mut mantissa: BigInt, mut scale: u32) -> Self {
        let ten = BigInt::from(10);
        let zero = BigInt::from(0);
        while scale > 0 && mantissa != zero && (&mantissa % &ten) == zero {
            mantissa /= &ten;
            scale -= 1;
        }
        if mantissa == zero {
            scale = 0;
        }
        Decimal { mantissa, scale }
    }

    pub fn mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Parses culture-invariant decimal text: sign, digits, optional
    /// fraction. Exponents are not part of the decimal literal form.
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.strip_prefix('-').or_else(|| text.strip_prefix('+'));
        let (negative, body) = match rest {
            Some(body) => (text.starts_with('-'), body),
            None => (false, text),
        };
        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }
        let digits: String = int_part.chars().chain(frac_part.chars()).collect();
        let mut mantissa: BigInt = digits.parse().ok()?;
        if negative {
            mantissa = -mantissa;
        }
        Some(Decimal::new(mantissa, frac_part.len() as u32))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.magnitude().to_str_radix(10);
        let sign = if self.mantissa.sign() == Sign::Minus { "-" } else { "" };
        let scale = self.scale as usize;
        if scale == 0 {
            return write!(f, "{}{}", sign, digits);
        }
        if digits.len() > scale {
            let split = digits.len() - scale;
            write!(f, "{}{}.{}", sign, &digits[..split], &digits[split..])
        } else {
            write!(f, "{}0.{}{}", sign, "0".repeat(scale - digits.len()), digits)
        }
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal::new(BigInt::from(value), 0)
    }
}

/// A typed enum value: the enum's full name plus the resolved underlying
/// atom value. Serialization reverse-looks-up the member name from the
/// registered member table.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub name: FullName,
    pub value: Box<Value>,
}

impl EnumValue {
    pub fn new(name: FullName, value: Value) -> Self {
        EnumValue {
            name,
            value: Box::new(value),
        }
    }
}

/// A schema-less enum reference: type name and member name kept as written,
/// with no backing value resolved. Produced in untyped positions and for
/// unregistered enum types.
#[derive(Debug, Clone, PartialEq)]
pub struct UntypedEnumValue {
    pub name: FullName,
    pub member: String,
}

impl UntypedEnumValue {
    pub fn new(name: FullName, member: impl Into<String>) -> Self {
        UntypedEnumValue {
            name,
            member: member.into(),
        }
    }
}

/// A class value: optional class name, declared properties, and the
/// unknown-properties side table that preserves forward-compatible fields.
///
/// `class` is `None` for schema-less objects parsed without a type
/// indicator. The span records where the object literal started; it is
/// ignored by equality.
#[derive(Debug, Clone, Default)]
pub struct Object {
    pub class: Option<FullName>,
    pub properties: PropertyMap,
    pub unknown: PropertyMap,
    pub span: TextSpan,
}

impl Object {
    /// An instance of the given class with no properties bound yet.
    pub fn new(class: FullName) -> Self {
        Object {
            class: Some(class),
            ..Object::default()
        }
    }

    /// A schema-less object with no class name.
    pub fn untyped() -> Self {
        Object::default()
    }

    /// Builder-style property binding, for fixtures and programmatic graphs.
    pub fn with_property(mut self, name: &str, value: Value) -> Self {
        self.properties.insert(name.to_string(), value);
        self
    }

    /// Builder-style unknown-property binding.
    pub fn with_unknown(mut self, name: &str, value: Value) -> Self {
        self.unknown.insert(name.to_string(), value);
        self
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class
            && self.properties == other.properties
            && self.unknown == other.unknown
    }
}

/// Any value a STON document can contain.
///
/// Signed integer atoms of every width share `Int`; unsigned widths share
/// `UInt`. Width checking happens at parse time against the declared atom
/// kind, not in the graph representation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    Char(char),
    String(String),
    CiString(CiString),
    Binary(Vec<u8>),
    Guid(Uuid),
    Duration(Duration),
    DateTime(DateTime<FixedOffset>),
    Enum(EnumValue),
    UnresolvedEnum(UntypedEnumValue),
    Object(Object),
    List(Vec<Value>),
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
}

impl Value {
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// A short name for the value's kind, used in diagnostic messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::UInt(_) => "unsigned integer",
            Value::F32(_) => "float32",
            Value::F64(_) => "float64",
            Value::Decimal(_) => "decimal",
            Value::Char(_) => "char",
            Value::String(_) => "string",
            Value::CiString(_) => "ignore-case string",
            Value::Binary(_) => "binary",
            Value::Guid(_) => "guid",
            Value::Duration(_) => "duration",
            Value::DateTime(_) => "date-time",
            Value::Enum(_) => "enum",
            Value::UnresolvedEnum(_) => "enum reference",
            Value::Object(_) => "object",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::CiString(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Set(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i8> for Value {
    fn from(value: i8) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::UInt(value as u64)
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::UInt(value as u64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::UInt(value as u64)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::UInt(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::F32(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Value::Object(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cistring_compares_case_insensitively() {
        assert_eq!(CiString::from("Hello"), CiString::from("hELLO"));
        assert_ne!(CiString::from("Hello"), CiString::from("Hella"));
        assert_eq!(CiString::from("Hello").as_str(), "Hello");
    }

    #[test]
    fn decimal_normalizes_trailing_zeros() {
        let a = Decimal::parse("1.10").unwrap();
        let b = Decimal::parse("1.1").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "1.1");
    }

    #[test]
    fn decimal_parse_and_format() {
        assert_eq!(Decimal::parse("0.05").unwrap().to_string(), "0.05");
        assert_eq!(Decimal::parse("-12.340").unwrap().to_string(), "-12.34");
        assert_eq!(Decimal::parse("42").unwrap().to_string(), "42");
        assert_eq!(Decimal::parse("-0.0").unwrap().to_string(), "0");
        assert!(Decimal::parse("1e5").is_none());
        assert!(Decimal::parse(".").is_none());
        assert!(Decimal::parse("").is_none());
    }

    #[test]
    fn decimal_very_small_fraction() {
        let d = Decimal::parse("0.00001").unwrap();
        assert_eq!(d.to_string(), "0.00001");
        assert_eq!(d.scale(), 5);
    }

    #[test]
    fn object_equality_ignores_span() {
        use crate::span::{TextPosition, TextSpan};

        let mut a = Object::untyped().with_property("x", Value::Int(1));
        let b = Object::untyped().with_property("x", Value::Int(1));
        a.span = TextSpan::new("f", 0, 1, TextPosition::new(1, 1), TextPosition::new(1, 2));
        assert_eq!(a, b);
    }

    #[test]
    fn structural_equality_over_collections() {
        let a = Value::List(vec![Value::Int(1), Value::from("x")]);
        let b = Value::List(vec![Value::Int(1), Value::from("x")]);
        assert_eq!(a, b);
        assert_ne!(a, Value::Set(vec![Value::Int(1), Value::from("x")]));
    }
}
