//! Multi-contract dispatch by trial.
//!
//! A [`Union`] holds an ordered list of callables. On each call the
//! candidates are tried in order: a plain (unguarded) candidate always
//! matches; a guarded candidate matches when all of its preconditions pass.
//! The first match runs its body and postconditions and its result is
//! returned. When every candidate is rejected, the violation from the
//! highest-position candidate is raised. Configuration errors are never
//! used for elimination; they propagate immediately.

use std::sync::Arc;

use adidem_core::{
    AnnotationRegistry, ArgMap, CallError, Callable, ConfigError, ContractViolation, Function,
    Metadata, Value,
};

use crate::contract::wrap;

/// One entry of a union definition.
#[derive(Debug, Clone)]
pub enum UnionEntry {
    /// Used as-is: guarded callables keep their contract, plain callables
    /// match unconditionally.
    Callable(Function),
    /// Wrapped with structured metadata first.
    Structured(Metadata, Function),
    /// Wrapped with a shorthand token list first.
    Tokens(Vec<String>, Function),
}

impl From<Function> for UnionEntry {
    fn from(f: Function) -> Self {
        UnionEntry::Callable(f)
    }
}

/// An ordered set of candidates dispatched by contract satisfaction.
#[derive(Debug)]
pub struct Union {
    candidates: Vec<Function>,
}

impl Union {
    /// Tries each candidate in order; see the module docs.
    pub fn dispatch(&self, args: &[Value]) -> Result<Value, CallError> {
        let mut rejected: Option<ContractViolation> = None;

        for (position, candidate) in self.candidates.iter().enumerate() {
            let Some(guard) = candidate.guard() else {
                return candidate.call(args);
            };

            let arg_map = ArgMap::new(&guard.metadata().names, args);
            match guard.check_preconditions(&arg_map) {
                Ok(()) => return guard.complete(args, &arg_map),
                Err(CallError::Violation(violation)) => {
                    tracing::debug!("union candidate #{} rejected: {}", position, violation);
                    // Later candidates are treated as more specific.
                    rejected = Some(violation);
                }
                Err(other) => return Err(other),
            }
        }

        match rejected {
            Some(violation) => Err(violation.into()),
            None => Ok(Value::Undefined),
        }
    }
}

impl Callable for Union {
    fn call(&self, args: &[Value]) -> Result<Value, CallError> {
        self.dispatch(args)
    }
}

/// Builds a dispatching callable from `entries`.
///
/// Zero entries yield a no-op returning `Undefined`; a single entry is
/// returned directly.
pub fn union<I>(entries: I, registry: &Arc<AnnotationRegistry>) -> Result<Function, ConfigError>
where
    I: IntoIterator<Item = UnionEntry>,
{
    let mut candidates = entries
        .into_iter()
        .map(|entry| match entry {
            UnionEntry::Callable(f) => Ok(f),
            UnionEntry::Structured(meta, body) => wrap(meta, body, registry),
            UnionEntry::Tokens(tokens, body) => wrap(tokens, body, registry),
        })
        .collect::<Result<Vec<_>, _>>()?;

    match candidates.len() {
        0 => Ok(Function::new(|_| Ok(Value::Undefined))),
        1 => Ok(candidates.remove(0)),
        _ => Ok(Function::from_callable(Union { candidates })),
    }
}

/// Builds a union from a flat dynamic list: each entry is a function, or a
/// token array / metadata object immediately followed by the function it
/// describes.
pub fn union_from_values(
    values: &[Value],
    registry: &Arc<AnnotationRegistry>,
) -> Result<Function, ConfigError> {
    let mut entries = Vec::new();
    let mut i = 0;
    while i < values.len() {
        match &values[i] {
            Value::Function(f) => entries.push(UnionEntry::Callable(f.clone())),
            described @ (Value::Array(_) | Value::Object(_)) => {
                let body = match values.get(i + 1) {
                    Some(Value::Function(f)) => f.clone(),
                    _ => return Err(ConfigError::ExpectedFunction { position: i }),
                };
                entries.push(UnionEntry::Structured(Metadata::from_value(described)?, body));
                i += 1;
            }
            other => {
                return Err(ConfigError::InvalidUnionEntry {
                    position: i,
                    found: other.describe(),
                })
            }
        }
        i += 1;
    }
    union(entries, registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use adidem_core::{ErrorKind, Target};

    fn registry() -> Arc<AnnotationRegistry> {
        Arc::new(AnnotationRegistry::new())
    }

    fn subtract() -> Function {
        Function::new(|args| match (&args[0], &args[1]) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
            _ => Err(CallError::body("subtract expects numbers")),
        })
    }

    fn concat() -> Function {
        Function::new(|args| match (&args[0], &args[1]) {
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
            _ => Err(CallError::body("concat expects strings")),
        })
    }

    fn constant(v: &'static str) -> Function {
        Function::new(move |_| Ok(Value::from(v)))
    }

    #[test]
    fn shorthand_union_dispatches_by_type() {
        let registry = registry();
        let f = union(
            vec![
                UnionEntry::Tokens(
                    vec!["a".into(), "@number".into(), "b".into(), "@number".into(), "return".into(), "@number".into()],
                    subtract(),
                ),
                UnionEntry::Tokens(
                    vec!["a".into(), "@string".into(), "b".into(), "@string".into(), "return".into(), "@string".into()],
                    concat(),
                ),
            ],
            &registry,
        )
        .unwrap();

        assert_eq!(f.call(&[Value::from(69), Value::from(42)]).unwrap(), Value::from(27));
        assert_eq!(
            f.call(&[Value::from("foo"), Value::from("bar")]).unwrap(),
            Value::from("foobar")
        );
        assert!(!f.has_contract());
    }

    #[test]
    fn empty_union_is_noop() {
        let f = union(Vec::new(), &registry()).unwrap();
        assert_eq!(f.call(&[]).unwrap(), Value::Undefined);
        assert_eq!(f.call(&[Value::from(1), Value::from("x")]).unwrap(), Value::Undefined);
    }

    #[test]
    fn single_entry_is_returned_directly() {
        let registry = registry();
        let guarded = wrap(["a", "@number"], subtract(), &registry).unwrap();
        let f = union(vec![UnionEntry::Callable(guarded.clone())], &registry).unwrap();
        assert!(f.ptr_eq(&guarded));
    }

    #[test]
    fn plain_candidate_always_matches() {
        let registry = registry();
        let f = union(
            vec![
                UnionEntry::Tokens(vec!["a".into(), "@string".into()], constant("string")),
                UnionEntry::Callable(constant("fallback")),
                UnionEntry::Tokens(vec!["a".into(), "@number".into()], constant("number")),
            ],
            &registry,
        )
        .unwrap();

        assert_eq!(f.call(&[Value::from("x")]).unwrap(), Value::from("string"));
        // The plain fallback shadows the later number candidate.
        assert_eq!(f.call(&[Value::from(1)]).unwrap(), Value::from("fallback"));
    }

    #[test]
    fn all_plain_union_is_first_wins() {
        let f = union(
            vec![
                UnionEntry::Callable(constant("first")),
                UnionEntry::Callable(constant("second")),
            ],
            &registry(),
        )
        .unwrap();
        assert_eq!(f.call(&[]).unwrap(), Value::from("first"));
    }

    #[test]
    fn highest_position_violation_is_raised() {
        let registry = registry();
        let f = union(
            vec![
                UnionEntry::Tokens(vec!["a".into(), "@string".into()], constant("one")),
                UnionEntry::Tokens(vec!["a".into(), "@array".into()], constant("two")),
                UnionEntry::Tokens(vec!["b".into(), "@bool".into()], constant("three")),
            ],
            &registry,
        )
        .unwrap();

        let err = f.call(&[Value::from(1)]).unwrap_err();
        let violation = err.violation().unwrap();
        assert_eq!(violation.target, Target::Parameter("b".into()));
        assert_eq!(violation.annotation, "@bool");
    }

    #[test]
    fn config_error_stops_dispatch() {
        let registry = registry();
        let f = union(
            vec![
                UnionEntry::Tokens(vec!["a".into(), "@nonesuch".into()], constant("broken")),
                UnionEntry::Callable(constant("fallback")),
            ],
            &registry,
        )
        .unwrap();

        let err = f.call(&[Value::from(1)]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn postcondition_failure_of_match_is_not_retried() {
        let registry = registry();
        let f = union(
            vec![
                UnionEntry::Tokens(
                    vec!["a".into(), "@number".into(), "return".into(), "@number".into()],
                    constant("oops"),
                ),
                UnionEntry::Callable(constant("fallback")),
            ],
            &registry,
        )
        .unwrap();

        let err = f.call(&[Value::from(1)]).unwrap_err();
        assert_eq!(err.violation().unwrap().target, Target::Return);
    }

    #[test]
    fn values_form_accepts_tokens_metadata_and_functions() {
        let registry = registry();
        let meta = Value::from(serde_json::json!({
            "names": ["a", "b"],
            "params": {"a": ["@string"], "b": ["@string"]},
            "retval": ["@string"]
        }));
        let tokens = Value::from(serde_json::json!(["a", "@number", "b", "@number"]));
        let f = union_from_values(
            &[
                tokens,
                Value::Function(subtract()),
                meta,
                Value::Function(concat()),
            ],
            &registry,
        )
        .unwrap();

        assert_eq!(f.call(&[Value::from(69), Value::from(42)]).unwrap(), Value::from(27));
        assert_eq!(
            f.call(&[Value::from("foo"), Value::from("bar")]).unwrap(),
            Value::from("foobar")
        );
    }

    #[test]
    fn values_form_requires_function_after_metadata() {
        let registry = registry();
        let tokens = Value::from(serde_json::json!(["a", "@number"]));

        let err = union_from_values(&[tokens.clone()], &registry).unwrap_err();
        assert!(matches!(err, ConfigError::ExpectedFunction { position: 0 }));

        let err = union_from_values(&[tokens, Value::from("nope")], &registry).unwrap_err();
        assert_eq!(err.to_string(), "Expected function after argument #0");

        let err = union_from_values(&[Value::from(5)], &registry).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUnionEntry { position: 0, .. }));
    }
}
