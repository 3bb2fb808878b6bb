//! The built-in annotation set installed by [`AnnotationRegistry::new`].
//!
//! [`AnnotationRegistry::new`]: crate::registry::AnnotationRegistry::new

use std::sync::Arc;

use crate::args::ArgMap;
use crate::registry::Predicate;
use crate::value::Value;

fn unary(test: fn(&Value) -> bool) -> Predicate {
    Arc::new(move |value: &Value, _: Option<&str>, _: &ArgMap<'_>| test(value))
}

fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_finite() && *n >= 0.0 && n.fract() == 0.0,
        _ => false,
    }
}

fn is_contract(value: &Value) -> bool {
    value.as_function().is_some_and(|f| f.has_contract())
}

/// Every built-in annotation, by bare name.
pub fn builtin_predicates() -> Vec<(&'static str, Predicate)> {
    vec![
        ("null", unary(Value::is_null)),
        ("undefined", unary(Value::is_undefined)),
        ("function", unary(|v| matches!(v, Value::Function(_)))),
        ("object", unary(|v| matches!(v, Value::Object(_)))),
        ("array", unary(|v| matches!(v, Value::Array(_)))),
        ("string", unary(|v| matches!(v, Value::String(_)))),
        ("number", unary(|v| matches!(v, Value::Number(_)))),
        ("integer", unary(is_integer)),
        ("bool", unary(|v| matches!(v, Value::Bool(_)))),
        ("truthy", unary(Value::is_truthy)),
        ("falsy", unary(|v| !v.is_truthy())),
        ("defined", unary(|v| !v.is_undefined())),
        ("notnull", unary(|v| !v.is_null())),
        ("safe", unary(|v| !v.is_null() && !v.is_undefined())),
        ("contract", unary(is_contract)),
        ("iterable", unary(|v| matches!(v, Value::Object(_) | Value::Array(_)))),
        // Arrays are their own variant, so every object is a plain hash.
        ("hash", unary(|v| matches!(v, Value::Object(_)))),
    ]
}
