//! Annotation registry: the named predicates contracts resolve at call time.
//!
//! The [`AnnotationRegistry`] maps bare annotation names (`number`, not
//! `@number`) to predicates. Contracts hold an `Arc` handle and look names up
//! on every call, so registering a predicate after a contract was built still
//! affects that contract.

use std::fmt;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use crate::args::ArgMap;
use crate::builtins;
use crate::metadata::SIGIL;
use crate::value::Value;

/// A predicate over a value. Receives the value, the parameter name (`None`
/// for return values) and the call's argument map.
pub type Predicate = Arc<dyn Fn(&Value, Option<&str>, &ArgMap<'_>) -> bool + Send + Sync>;

/// Registry of named predicates.
///
/// Backed by a `DashMap`: lookups from many threads proceed concurrently,
/// registrations are serialized against lookups of the same shard.
/// Re-registering a name overwrites the previous predicate.
pub struct AnnotationRegistry {
    predicates: DashMap<String, Predicate>,
}

static GLOBAL: OnceLock<Arc<AnnotationRegistry>> = OnceLock::new();

fn bare(name: &str) -> &str {
    name.strip_prefix(SIGIL).unwrap_or(name)
}

impl AnnotationRegistry {
    /// Creates a registry with the built-in annotations pre-registered.
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.register_many(builtins::builtin_predicates());
        registry
    }

    /// Creates a registry with no annotations at all.
    pub fn empty() -> Self {
        AnnotationRegistry {
            predicates: DashMap::new(),
        }
    }

    /// The process-wide registry, created with the built-ins on first use.
    pub fn global() -> Arc<AnnotationRegistry> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(AnnotationRegistry::new())))
    }

    /// Registers (or overwrites) one annotation.
    pub fn register<F>(&self, name: &str, predicate: F)
    where
        F: Fn(&Value, Option<&str>, &ArgMap<'_>) -> bool + Send + Sync + 'static,
    {
        self.register_predicate(name, Arc::new(predicate));
    }

    /// Registers (or overwrites) one annotation from a shared predicate.
    pub fn register_predicate(&self, name: &str, predicate: Predicate) {
        let name = bare(name);
        if self.predicates.insert(name.to_string(), predicate).is_some() {
            tracing::warn!("annotation @{} overwritten", name);
        } else {
            tracing::trace!("annotation @{} registered", name);
        }
    }

    /// Registers every entry; later duplicates overwrite earlier ones.
    pub fn register_many<I, S>(&self, entries: I)
    where
        I: IntoIterator<Item = (S, Predicate)>,
        S: AsRef<str>,
    {
        for (name, predicate) in entries {
            self.register_predicate(name.as_ref(), predicate);
        }
    }

    /// Accepts the bare name or the sigil form.
    pub fn has(&self, name: &str) -> bool {
        self.predicates.contains_key(bare(name))
    }

    /// Looks up a predicate. The returned handle is detached from the map,
    /// so calling it never holds a registry lock.
    pub fn resolve(&self, name: &str) -> Option<Predicate> {
        self.predicates
            .get(bare(name))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Removes an annotation, returning whether it was present.
    pub fn remove(&self, name: &str) -> bool {
        self.predicates.remove(bare(name)).is_some()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.predicates.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl Default for AnnotationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AnnotationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationRegistry")
            .field("annotations", &self.names())
            .finish()
    }
}
