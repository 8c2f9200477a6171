/// Builds an untyped [`Value`](crate::Value) graph from a JSON-like literal.
///
/// Objects become schema-less [`Object`](crate::Object)s (all pairs land in
/// the property map, no class name); arrays become lists. Useful for tests
/// and dynamic consumers.
///
/// ```rust
/// use ston::{ston, Value};
///
/// let v = ston!({
///     "Name": "Ada",
///     "Scores": [1, 2, 3],
///     "Active": true,
/// });
/// let object = v.as_object().unwrap();
/// assert_eq!(object.property("Name").and_then(Value::as_str), Some("Ada"));
/// ```
#[macro_export]
macro_rules! ston {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::List(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::List(vec![$($crate::ston!($elem)),*])
    };

    ({}) => {
        $crate::Value::Object($crate::Object::untyped())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::Object::untyped();
        $(
            object.properties.insert($key.to_string(), $crate::ston!($value));
        )*
        $crate::Value::Object(object)
    }};

    ($other:expr) => {
        $crate::Value::from($other)
    };
}
