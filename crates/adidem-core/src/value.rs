//! Runtime value representation for contract checking.
//!
//! [`Value`] is the dynamic value model that contracts police: every argument
//! handed to a guarded callable and every value it returns is a `Value`.
//! Callables themselves are values too ([`Value::Function`]), which is how a
//! contract can demand that an argument is itself a guarded callable.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::args::ArgMap;
use crate::error::CallError;
use crate::metadata::Metadata;

/// A dynamic runtime value.
///
/// - Absence: `Undefined` (a missing argument), `Null`
/// - Scalars: `Bool`, `Number`, `String`
/// - Compound: `Array`, `Object` (insertion-ordered keys)
/// - Special: `Function`, compared by identity
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
    Function(Function),
}

impl Value {
    /// Returns a human-readable name of the value's variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// Renders the value for diagnostics.
    ///
    /// Strings are quoted, numbers and booleans are printed verbatim, and
    /// compound values collapse to their kind (`array`, `object`, `function`).
    pub fn describe(&self) -> String {
        match self {
            Value::String(s) => format!("\"{}\"", s),
            Value::Number(n) => format_number(*n),
            Value::Bool(b) => b.to_string(),
            other => other.type_name().to_string(),
        }
    }

    /// Loose truthiness: `undefined`, `null`, `false`, `0`, `NaN` and the
    /// empty string are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Function(_) => true,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n == 0.0 {
        // -0 prints as 0
        "0".to_string()
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(map: IndexMap<String, Value>) -> Self {
        Value::Object(map)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(f)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// Functions serialize as the string `"function"`; `undefined` as `null`.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Undefined | Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Value::Function(_) => serializer.serialize_str("function"),
        }
    }
}

/// The contract-presence marker: the view a dispatcher needs of a guarded
/// callable to trial its preconditions separately from its body.
pub trait Guard {
    /// The metadata the contract was built from.
    fn metadata(&self) -> &Metadata;

    /// Runs every precondition, in declaration order, against `args`.
    fn check_preconditions(&self, args: &ArgMap<'_>) -> Result<(), CallError>;

    /// Invokes the body and runs the postconditions. Preconditions are
    /// assumed to have passed already.
    fn complete(&self, args: &[Value], arg_map: &ArgMap<'_>) -> Result<Value, CallError>;
}

/// Anything that can be invoked with a list of [`Value`] arguments.
pub trait Callable: Send + Sync {
    fn call(&self, args: &[Value]) -> Result<Value, CallError>;

    /// Returns the contract view when this callable is guarded.
    fn guard(&self) -> Option<&dyn Guard> {
        None
    }
}

struct NativeFn<F>(F);

impl<F> Callable for NativeFn<F>
where
    F: Fn(&[Value]) -> Result<Value, CallError> + Send + Sync,
{
    fn call(&self, args: &[Value]) -> Result<Value, CallError> {
        (self.0)(args)
    }
}

/// A shared handle to a callable value.
///
/// Cloning is cheap and preserves identity: two clones are
/// [`ptr_eq`](Function::ptr_eq) and compare equal.
#[derive(Clone)]
pub struct Function(Arc<dyn Callable>);

impl Function {
    /// Wraps a plain closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    {
        Function(Arc::new(NativeFn(f)))
    }

    /// Wraps any [`Callable`] implementation.
    pub fn from_callable<C: Callable + 'static>(callable: C) -> Self {
        Function(Arc::new(callable))
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, CallError> {
        self.0.call(args)
    }

    pub fn guard(&self) -> Option<&dyn Guard> {
        self.0.guard()
    }

    /// True when this callable carries the contract-presence marker.
    pub fn has_contract(&self) -> bool {
        self.guard().is_some()
    }

    /// The contract metadata, for guarded callables.
    pub fn metadata(&self) -> Option<&Metadata> {
        self.guard().map(|g| g.metadata())
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Function) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.0) as *const u8,
            Arc::as_ptr(&other.0) as *const u8,
        )
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("contract", &self.has_contract())
            .finish()
    }
}
