//! Per-call argument map, keyed by position and by parameter name.

use std::collections::HashMap;

use crate::value::Value;

static UNDEFINED: Value = Value::Undefined;

/// A snapshot of one call's arguments.
///
/// Position `i` is also reachable under `names[i]` when `i` is within both
/// the argument list and the declared names. Extra positional arguments are
/// reachable by index only; declared names with no argument are absent.
#[derive(Debug, Clone)]
pub struct ArgMap<'a> {
    args: &'a [Value],
    by_name: HashMap<&'a str, usize>,
}

impl<'a> ArgMap<'a> {
    pub fn new(names: &'a [String], args: &'a [Value]) -> Self {
        let by_name = names
            .iter()
            .take(args.len())
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        ArgMap { args, by_name }
    }

    /// Looks up an argument by parameter name.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        let args = self.args;
        self.by_name.get(name).map(|&i| &args[i])
    }

    /// Looks up an argument by zero-based position.
    pub fn get_index(&self, index: usize) -> Option<&'a Value> {
        self.args.get(index)
    }

    /// Like [`get`](Self::get), but an absent argument reads as `Undefined`.
    pub fn value(&self, name: &str) -> &'a Value {
        self.get(name).unwrap_or(&UNDEFINED)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn positional(&self) -> &'a [Value] {
        self.args
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn keyed_by_position_and_name() {
        let names = names(&["a", "b"]);
        let args = vec![Value::from(1), Value::from("two")];
        let map = ArgMap::new(&names, &args);

        assert_eq!(map.get("a"), Some(&Value::from(1)));
        assert_eq!(map.get("b"), Some(&Value::from("two")));
        assert_eq!(map.get_index(0), Some(&Value::from(1)));
        assert_eq!(map.get_index(1), Some(&Value::from("two")));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn missing_arguments_read_as_undefined() {
        let names = names(&["a", "b"]);
        let args = vec![Value::from(1)];
        let map = ArgMap::new(&names, &args);

        assert!(map.contains("a"));
        assert!(!map.contains("b"));
        assert_eq!(map.get("b"), None);
        assert_eq!(map.value("b"), &Value::Undefined);
    }

    #[test]
    fn extra_arguments_only_by_index() {
        let names = names(&["a"]);
        let args = vec![Value::from(1), Value::from(2)];
        let map = ArgMap::new(&names, &args);

        assert_eq!(map.get_index(1), Some(&Value::from(2)));
        assert_eq!(map.positional().len(), 2);
        assert!(map.get("1").is_none());
    }
}
