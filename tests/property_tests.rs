use chrono::{Duration, FixedOffset, TimeZone};
use num_bigint::BigInt;
use proptest::prelude::*;
use ston::{
    atom, parse_str, to_string, AtomKind, ClassType, Decimal, Diagnostics, FullName, GlobalType,
    LocalType, Registry, RegistryBuilder, Value,
};
use uuid::Uuid;

fn atoms_registry() -> Registry {
    RegistryBuilder::new()
        .register_module(vec![GlobalType::Class(
            ClassType::new(FullName::new("urn:prop", "Holder"))
                .with_property("S", LocalType::atom(AtomKind::String).nullable())
                .with_property("C", LocalType::atom(AtomKind::Char).nullable())
                .with_property(
                    "L",
                    LocalType::list(LocalType::atom(AtomKind::I64)).nullable(),
                ),
        )])
        .build()
        .unwrap()
}

fn roundtrip_holder(object: ston::Object) {
    let registry = atoms_registry();
    let root = FullName::new("urn:prop", "Holder");
    let text = to_string(&registry, &object, Some(&root));
    let mut diags = Diagnostics::new();
    let parsed = parse_str(&registry, "prop.ston", &text, &root, &mut diags)
        .unwrap_or_else(|| panic!("roundtrip failed for {:?}\ntext: {}", object, text));
    assert_eq!(object, parsed);
}

proptest! {
    #[test]
    fn i64_literals_roundtrip(v in any::<i64>()) {
        let text = atom::format(&Value::Int(v));
        prop_assert_eq!(atom::parse(AtomKind::I64, &text), Some(Value::Int(v)));
    }

    #[test]
    fn u64_literals_roundtrip(v in any::<u64>()) {
        let text = atom::format(&Value::UInt(v));
        prop_assert_eq!(atom::parse(AtomKind::U64, &text), Some(Value::UInt(v)));
    }

    #[test]
    fn finite_f64_literals_roundtrip(v in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
        let text = atom::format(&Value::F64(v));
        prop_assert_eq!(atom::parse(AtomKind::F64, &text), Some(Value::F64(v)));
    }

    #[test]
    fn finite_f32_literals_roundtrip(v in any::<f32>().prop_filter("finite", |f| f.is_finite())) {
        let text = atom::format(&Value::F32(v));
        prop_assert_eq!(atom::parse(AtomKind::F32, &text), Some(Value::F32(v)));
    }

    #[test]
    fn decimal_literals_roundtrip(mantissa in any::<i64>(), scale in 0u32..12) {
        let value = Value::Decimal(Decimal::new(BigInt::from(mantissa), scale));
        let text = atom::format(&value);
        prop_assert_eq!(atom::parse(AtomKind::Decimal, &text), Some(value));
    }

    #[test]
    fn duration_literals_roundtrip(ticks in -(1i64 << 50)..(1i64 << 50)) {
        let value = Value::Duration(Duration::nanoseconds(ticks * 100));
        let text = atom::format(&value);
        // The literal is a string token; strip the quoting the way the
        // lexer would before handing it to the codec.
        let inner = text.trim_start_matches("@\"").trim_end_matches('"');
        prop_assert_eq!(atom::parse(AtomKind::Duration, inner), Some(value));
    }

    #[test]
    fn guid_literals_roundtrip(bytes in any::<[u8; 16]>()) {
        let value = Value::Guid(Uuid::from_bytes(bytes));
        let text = atom::format(&value);
        let inner = text.trim_start_matches("@\"").trim_end_matches('"');
        prop_assert_eq!(atom::parse(AtomKind::Guid, inner), Some(value));
    }

    #[test]
    fn date_time_literals_roundtrip(
        secs in 0i64..4_102_444_800,
        ticks in 0u32..10_000_000,
        offset_minutes in -14 * 60..=14 * 60,
    ) {
        let offset = FixedOffset::east_opt(offset_minutes * 60).unwrap();
        let dt = offset.timestamp_opt(secs, ticks * 100).unwrap();
        let value = Value::DateTime(dt);
        let text = atom::format(&value);
        let inner = text.trim_start_matches("@\"").trim_end_matches('"');
        prop_assert_eq!(atom::parse(AtomKind::DateTime, inner), Some(value));
    }

    #[test]
    fn string_properties_roundtrip_through_documents(s in any::<String>()) {
        let object = ston::Object::new(FullName::new("urn:prop", "Holder"))
            .with_property("S", Value::from(s));
        roundtrip_holder(object);
    }

    #[test]
    fn char_properties_roundtrip_through_documents(c in any::<char>()) {
        let object = ston::Object::new(FullName::new("urn:prop", "Holder"))
            .with_property("C", Value::Char(c));
        roundtrip_holder(object);
    }

    #[test]
    fn integer_lists_roundtrip_through_documents(items in prop::collection::vec(any::<i64>(), 0..16)) {
        let object = ston::Object::new(FullName::new("urn:prop", "Holder"))
            .with_property("L", Value::List(items.into_iter().map(Value::Int).collect()));
        roundtrip_holder(object);
    }
}
