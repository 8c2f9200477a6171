use ston::{
    parse_str, to_string, AtomKind, ClassType, DiagCode, Diagnostics, EnumType, FullName,
    GlobalRef, GlobalType, Key, LocalType, Object, RegistryBuilder, TextSpan, Value,
};

const CORE: &str = "http://schemas.example.com/core";
const GEO: &str = "http://schemas.example.com/geo";

fn registry() -> ston::Registry {
    RegistryBuilder::new()
        .register_module(vec![
            GlobalType::Class(
                ClassType::new(FullName::new(CORE, "Shape"))
                    .abstract_()
                    .with_property("Name", LocalType::atom(AtomKind::String))
                    .with_keys(vec![Key::new(["Name"])]),
            ),
            GlobalType::Class(
                ClassType::new(FullName::new(CORE, "Circle"))
                    .with_base(FullName::new(CORE, "Shape"))
                    .with_property("Radius", LocalType::atom(AtomKind::F64))
                    .with_property("Center", LocalType::named(GEO, "Point").nullable()),
            ),
            GlobalType::Class(
                ClassType::new(FullName::new(CORE, "Square"))
                    .with_base(FullName::new(CORE, "Shape"))
                    .with_property("Side", LocalType::atom(AtomKind::F64)),
            ),
            GlobalType::Class(
                ClassType::new(FullName::new(CORE, "Canvas"))
                    .with_property("Title", LocalType::atom(AtomKind::String))
                    .with_property("Background", LocalType::named(GEO, "Color").nullable())
                    .with_property("Shapes", LocalType::list(LocalType::named(CORE, "Shape")))
                    .with_property("Tags", LocalType::set(LocalType::atom(AtomKind::I32)).nullable())
                    .with_property(
                        "Meta",
                        LocalType::map(
                            GlobalRef::Atom(AtomKind::String),
                            LocalType::atom(AtomKind::String),
                        )
                        .nullable(),
                    ),
            ),
        ])
        .register_module(vec![
            GlobalType::Class(
                ClassType::new(FullName::new(GEO, "Point"))
                    .with_property("X", LocalType::atom(AtomKind::I32))
                    .with_property("Y", LocalType::atom(AtomKind::I32)),
            ),
            GlobalType::Enum(
                EnumType::new(FullName::new(GEO, "Color"), AtomKind::I32)
                    .with_member("Red", Value::Int(1))
                    .with_member("Crimson", Value::Int(1))
                    .with_member("Green", Value::Int(2)),
            ),
        ])
        .build()
        .unwrap()
}

const CANVAS_DOC: &str = r#"
<c = "http://schemas.example.com/core", g = "http://schemas.example.com/geo">
{
    Title = @"demo",
    Background = g::Color.Green,
    Shapes = [
        (c::Circle){
            Name = @"c1",
            Radius = 2.5,
            Center = { X = 1, Y = -2, },
        },
        (c::Square){
            Name = @"s1",
            Side = 4,
        },
    ],
    Tags = [ 1, 2, 3, ],
    Meta = #[ @"k" = @"v", ],
    Future = @"kept",
}
"#;

fn parse_canvas() -> (Object, Diagnostics) {
    let registry = registry();
    let mut diags = Diagnostics::new();
    let canvas = parse_str(
        &registry,
        "canvas.ston",
        CANVAS_DOC,
        &FullName::new(CORE, "Canvas"),
        &mut diags,
    );
    (canvas.expect("canvas should parse"), diags)
}

#[test]
fn mixed_document_parses_clean() {
    let (canvas, diags) = parse_canvas();
    assert!(!diags.has_errors());

    assert_eq!(canvas.class, Some(FullName::new(CORE, "Canvas")));
    assert_eq!(
        canvas.property("Title").and_then(Value::as_str),
        Some("demo")
    );

    let shapes = canvas.property("Shapes").and_then(Value::as_list).unwrap();
    assert_eq!(shapes.len(), 2);
    let circle = shapes[0].as_object().unwrap();
    assert_eq!(circle.class, Some(FullName::new(CORE, "Circle")));
    assert_eq!(circle.property("Radius"), Some(&Value::F64(2.5)));
    let center = circle.property("Center").and_then(Value::as_object).unwrap();
    assert_eq!(center.property("Y"), Some(&Value::Int(-2)));

    // Enum values resolve to their underlying atom value.
    match canvas.property("Background") {
        Some(Value::Enum(en)) => {
            assert_eq!(en.name, FullName::new(GEO, "Color"));
            assert_eq!(*en.value, Value::Int(2));
        }
        other => panic!("expected enum background, got {:?}", other),
    }

    assert_eq!(
        canvas.property("Tags"),
        Some(&Value::Set(vec![Value::Int(1), Value::Int(2), Value::Int(3)]))
    );
    assert_eq!(
        canvas.property("Meta"),
        Some(&Value::Map(vec![(Value::from("k"), Value::from("v"))]))
    );

    // The unknown property survives in the side table.
    assert_eq!(
        canvas.unknown.get("Future").and_then(Value::as_str),
        Some("kept")
    );
}

#[test]
fn serialize_then_parse_reproduces_the_graph() {
    let registry = registry();
    let (canvas, _) = parse_canvas();
    let root = FullName::new(CORE, "Canvas");

    let text = to_string(&registry, &canvas, Some(&root));
    let mut diags = Diagnostics::new();
    let again = parse_str(&registry, "canvas.ston", &text, &root, &mut diags)
        .expect("re-serialized canvas should parse");
    assert!(!diags.has_errors());
    assert_eq!(canvas, again);
}

#[test]
fn alias_header_has_one_entry_per_namespace() {
    let registry = registry();
    let (canvas, _) = parse_canvas();
    let text = to_string(&registry, &canvas, Some(&FullName::new(CORE, "Canvas")));

    let header = text.lines().next().unwrap();
    assert!(header.starts_with('<') && header.ends_with('>'));
    // Two namespaces are referenced (core by the shape indicators, geo by
    // the enum reference), each exactly once, however often they recur.
    assert_eq!(header.matches(CORE).count(), 1);
    assert_eq!(header.matches(GEO).count(), 1);
    assert_eq!(header.matches('=').count(), 2);
}

#[test]
fn unknown_property_roundtrips() {
    let registry = registry();
    let (canvas, _) = parse_canvas();
    let root = FullName::new(CORE, "Canvas");

    let text = to_string(&registry, &canvas, Some(&root));
    assert!(text.contains("Future = @\"kept\""));
}

#[test]
fn subtype_indicator_is_accepted() {
    let registry = registry();
    let mut diags = Diagnostics::new();
    let doc = "<c = \"http://schemas.example.com/core\">\n(c::Circle){ Name = @\"c\", Radius = 1, }";
    let shape = parse_str(
        &registry,
        "shape.ston",
        doc,
        &FullName::new(CORE, "Shape"),
        &mut diags,
    )
    .expect("subtype should be accepted");
    assert_eq!(shape.class, Some(FullName::new(CORE, "Circle")));
}

#[test]
fn unrelated_indicator_is_rejected() {
    let registry = registry();
    let mut diags = Diagnostics::new();
    let doc = "<g = \"http://schemas.example.com/geo\">\n(g::Point){ X = 1, Y = 2, }";
    let result = parse_str(
        &registry,
        "shape.ston",
        doc,
        &FullName::new(CORE, "Shape"),
        &mut diags,
    );
    assert!(result.is_none());
    assert!(diags
        .iter()
        .any(|d| d.code == DiagCode::ClassNotEqualToOrDeriveFromTheDeclared));
}

#[test]
fn abstract_class_cannot_be_instantiated() {
    let registry = registry();
    let root = FullName::new(CORE, "Shape");

    // Without an indicator the declared abstract class is the effective one.
    let mut diags = Diagnostics::new();
    assert!(parse_str(&registry, "s.ston", "{ Name = @\"x\", }", &root, &mut diags).is_none());
    assert!(diags.iter().any(|d| d.code == DiagCode::ClassIsAbstract));

    // An indicator naming the abstract class directly is no better.
    let mut diags = Diagnostics::new();
    let doc = "<c = \"http://schemas.example.com/core\">\n(c::Shape){ Name = @\"x\", }";
    assert!(parse_str(&registry, "s.ston", doc, &root, &mut diags).is_none());
    assert!(diags.iter().any(|d| d.code == DiagCode::ClassIsAbstract));
}

#[test]
fn missing_required_property_fails() {
    let registry = registry();
    let mut diags = Diagnostics::new();
    let result = parse_str(
        &registry,
        "p.ston",
        "{}",
        &FullName::new(GEO, "Point"),
        &mut diags,
    );
    assert!(result.is_none());
    let missing: Vec<_> = diags
        .iter()
        .filter(|d| d.code == DiagCode::PropertyMissing)
        .collect();
    assert_eq!(missing.len(), 2);
}

#[test]
fn duplicate_set_item_is_an_error() {
    let registry = registry();
    let mut diags = Diagnostics::new();
    let doc = "{ Title = @\"t\", Shapes = [], Tags = [ 1, 1, 2, ], }";
    let result = parse_str(
        &registry,
        "c.ston",
        doc,
        &FullName::new(CORE, "Canvas"),
        &mut diags,
    );
    assert!(result.is_none());
    assert_eq!(
        diags
            .iter()
            .filter(|d| d.code == DiagCode::DuplicateSetItem)
            .count(),
        1
    );
}

#[test]
fn duplicate_map_key_is_an_error() {
    let registry = registry();
    let mut diags = Diagnostics::new();
    let doc = "{ Title = @\"t\", Shapes = [], Meta = #[ @\"k\" = @\"a\", @\"k\" = @\"b\", ], }";
    let result = parse_str(
        &registry,
        "c.ston",
        doc,
        &FullName::new(CORE, "Canvas"),
        &mut diags,
    );
    assert!(result.is_none());
    assert!(diags.iter().any(|d| d.code == DiagCode::DuplicateMapKey));
}

#[test]
fn duplicate_property_is_an_error() {
    let registry = registry();
    let mut diags = Diagnostics::new();
    let result = parse_str(
        &registry,
        "p.ston",
        "{ X = 1, X = 2, Y = 3, }",
        &FullName::new(GEO, "Point"),
        &mut diags,
    );
    assert!(result.is_none());
    assert!(diags
        .iter()
        .any(|d| d.code == DiagCode::DuplicatePropertyName));
}

#[test]
fn null_is_rejected_for_non_nullable_properties() {
    let registry = registry();
    let mut diags = Diagnostics::new();
    let result = parse_str(
        &registry,
        "p.ston",
        "{ X = null, Y = 2, }",
        &FullName::new(GEO, "Point"),
        &mut diags,
    );
    assert!(result.is_none());
    assert!(diags.iter().any(|d| d.code == DiagCode::NullNotAllowed));
    // The nulled property does not additionally count as missing.
    assert!(!diags.iter().any(|d| d.code == DiagCode::PropertyMissing));
}

#[test]
fn nullable_properties_default_to_absent() {
    let registry = registry();
    let mut diags = Diagnostics::new();
    let doc = "{ Title = @\"t\", Shapes = [], Background = null, }";
    let canvas = parse_str(
        &registry,
        "c.ston",
        doc,
        &FullName::new(CORE, "Canvas"),
        &mut diags,
    )
    .unwrap();
    assert!(!diags.has_errors());
    assert_eq!(canvas.property("Background"), None);
    assert_eq!(canvas.property("Tags"), None);
}

#[test]
fn unqualified_enum_reference_uses_the_declared_namespace() {
    let registry = registry();
    let mut diags = Diagnostics::new();
    let doc = "{ Title = @\"t\", Shapes = [], Background = Color.Red, }";
    let canvas = parse_str(
        &registry,
        "c.ston",
        doc,
        &FullName::new(CORE, "Canvas"),
        &mut diags,
    )
    .unwrap();
    assert!(!diags.has_errors());
    match canvas.property("Background") {
        Some(Value::Enum(en)) => assert_eq!(*en.value, Value::Int(1)),
        other => panic!("expected enum, got {:?}", other),
    }
}

#[test]
fn enum_reverse_lookup_is_first_declared_wins() {
    let registry = registry();
    // Red and Crimson alias underlying value 1; Red is declared first.
    let canvas = Object::new(FullName::new(CORE, "Canvas"))
        .with_property("Title", Value::from("t"))
        .with_property("Shapes", Value::List(vec![]))
        .with_property(
            "Background",
            Value::Enum(ston::EnumValue::new(FullName::new(GEO, "Color"), Value::Int(1))),
        );
    let text = to_string(&registry, &canvas, Some(&FullName::new(CORE, "Canvas")));
    assert!(text.contains("Color.Red"));
    assert!(!text.contains("Crimson"));
}

#[test]
fn out_of_range_enum_value_serializes_as_null() {
    let registry = registry();
    let canvas = Object::new(FullName::new(CORE, "Canvas"))
        .with_property("Title", Value::from("t"))
        .with_property("Shapes", Value::List(vec![]))
        .with_property(
            "Background",
            Value::Enum(ston::EnumValue::new(FullName::new(GEO, "Color"), Value::Int(99))),
        );
    let text = to_string(&registry, &canvas, Some(&FullName::new(CORE, "Canvas")));
    assert!(text.contains("Background = null"));
}

#[test]
fn wrong_enum_type_is_rejected() {
    let registry = registry();
    let mut diags = Diagnostics::new();
    let doc = "<c = \"http://schemas.example.com/core\">\n{ Title = @\"t\", Shapes = [], Background = c::Canvas.Red, }";
    let result = parse_str(
        &registry,
        "c.ston",
        doc,
        &FullName::new(CORE, "Canvas"),
        &mut diags,
    );
    assert!(result.is_none());
    assert!(diags
        .iter()
        .any(|d| d.code == DiagCode::EnumNotEqualToTheDeclared));
}

#[test]
fn unknown_enum_member_is_rejected() {
    let registry = registry();
    let mut diags = Diagnostics::new();
    let doc = "{ Title = @\"t\", Shapes = [], Background = Color.Purple, }";
    let result = parse_str(
        &registry,
        "c.ston",
        doc,
        &FullName::new(CORE, "Canvas"),
        &mut diags,
    );
    assert!(result.is_none());
    assert!(diags
        .iter()
        .any(|d| d.code == DiagCode::InvalidEnumMemberName));
}

#[test]
fn duplicate_alias_in_one_header_is_an_error() {
    let registry = registry();
    let mut diags = Diagnostics::new();
    let doc = "<g = \"http://schemas.example.com/geo\", g = \"http://schemas.example.com/core\">\n{ X = 1, Y = 2, }";
    let result = parse_str(
        &registry,
        "p.ston",
        doc,
        &FullName::new(GEO, "Point"),
        &mut diags,
    );
    assert!(result.is_none());
    assert!(diags.iter().any(|d| d.code == DiagCode::DuplicateAlias));
}

#[test]
fn inner_alias_scope_shadows_outer() {
    let registry = registry();
    let mut diags = Diagnostics::new();
    // The outer header binds n to core; the nested class value rebinds it
    // to geo, so the indicator resolves to geo's Point.
    let doc = concat!(
        "<n = \"http://schemas.example.com/core\">\n",
        "{ Title = @\"t\", Shapes = [], ",
        "Extra = <n = \"http://schemas.example.com/geo\"> (n::Point){ X = 1, Y = 2, }, }",
    );
    let canvas = parse_str(
        &registry,
        "c.ston",
        doc,
        &FullName::new(CORE, "Canvas"),
        &mut diags,
    )
    .unwrap();
    assert!(!diags.has_errors());
    let extra = canvas.unknown.get("Extra").and_then(Value::as_object).unwrap();
    assert_eq!(extra.class, Some(FullName::new(GEO, "Point")));
}

#[test]
fn unresolvable_indicator_in_unknown_position_rolls_back() {
    let registry = registry();
    let mut diags = Diagnostics::new();
    let doc = concat!(
        "<c = \"http://schemas.example.com/core\">\n",
        "{ Title = @\"t\", Shapes = [], Mystery = (c::Ghost){ A = 1, }, }",
    );
    let canvas = parse_str(
        &registry,
        "c.ston",
        doc,
        &FullName::new(CORE, "Canvas"),
        &mut diags,
    )
    .expect("unknown types in schema-less positions are tolerated");
    // The speculative resolution failed and its diagnostics were rolled
    // back; the unresolved name is preserved.
    assert!(diags.is_empty());
    let mystery = canvas.unknown.get("Mystery").and_then(Value::as_object).unwrap();
    assert_eq!(mystery.class, Some(FullName::new(CORE, "Ghost")));
    assert_eq!(mystery.property("A"), Some(&Value::Int(1)));
}

#[test]
fn lifecycle_hooks_run_and_can_abort() {
    fn stamp(object: &mut Object, _diags: &mut Diagnostics, _span: &TextSpan) -> bool {
        object.unknown.insert("Stamped".to_string(), Value::Bool(true));
        true
    }
    fn reject(_object: &mut Object, diags: &mut Diagnostics, span: &TextSpan) -> bool {
        diags.error(DiagCode::InvalidAtomValue, "rejected by hook", span.clone());
        false
    }

    let uri = "urn:hooks";
    let accepting = RegistryBuilder::new()
        .register_module(vec![GlobalType::Class(
            ClassType::new(FullName::new(uri, "T")).with_on_loaded(stamp),
        )])
        .build()
        .unwrap();
    let mut diags = Diagnostics::new();
    let object = parse_str(&accepting, "t.ston", "{}", &FullName::new(uri, "T"), &mut diags)
        .unwrap();
    assert_eq!(object.unknown.get("Stamped"), Some(&Value::Bool(true)));

    let rejecting = RegistryBuilder::new()
        .register_module(vec![GlobalType::Class(
            ClassType::new(FullName::new(uri, "T")).with_on_loading(reject),
        )])
        .build()
        .unwrap();
    let mut diags = Diagnostics::new();
    let result = parse_str(&rejecting, "t.ston", "{}", &FullName::new(uri, "T"), &mut diags);
    assert!(result.is_none());
    assert!(diags.has_errors());
}

#[test]
fn spans_point_into_the_input() {
    let registry = registry();
    let mut diags = Diagnostics::new();
    let doc = "{ X = true, Y = 2, }";
    parse_str(&registry, "p.ston", doc, &FullName::new(GEO, "Point"), &mut diags);
    let diag = diags
        .iter()
        .find(|d| d.code == DiagCode::InvalidAtomValue)
        .unwrap();
    assert_eq!(diag.span.file.as_deref(), Some("p.ston"));
    assert_eq!(diag.span.start.line, 1);
    assert_eq!(diag.span.start.column, 7);
}
