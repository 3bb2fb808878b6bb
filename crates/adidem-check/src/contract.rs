//! The contract wrapper: a guarded callable that runs preconditions, the
//! wrapped body, then postconditions.
//!
//! # Invocation
//!
//! 1. Build the [`ArgMap`] from the actual arguments and the metadata names.
//! 2. Run every precondition in declaration order.
//! 3. Invoke the body with the original arguments.
//! 4. Run every postcondition against the return value.
//! 5. Return the body's value.
//!
//! Any failing condition aborts the call. Wrapping is idempotent: a body
//! that already carries a contract is returned as-is.

use std::sync::Arc;

use adidem_core::{
    AnnotationRegistry, ArgMap, CallError, Callable, ConfigError, ContractConfig, Function, Guard,
    Metadata, MetadataSource, Value,
};

use crate::contracts::check::{check_postconditions, check_preconditions};
use crate::contracts::{
    annotated_postconditions, annotated_preconditions, CustomPostcondition, CustomPrecondition,
    Postcondition, Precondition,
};

/// A callable guarded by pre- and postconditions.
pub struct Contract {
    body: Function,
    metadata: Metadata,
    pre: Vec<Precondition>,
    post: Vec<Postcondition>,
    registry: Arc<AnnotationRegistry>,
    config: ContractConfig,
}

impl Contract {
    /// Runs the full invocation protocol.
    pub fn invoke(&self, args: &[Value]) -> Result<Value, CallError> {
        if !self.config.enforce {
            return self.body.call(args);
        }
        let arg_map = ArgMap::new(&self.metadata.names, args);
        check_preconditions(&self.registry, &self.pre, &arg_map)?;
        self.complete(args, &arg_map)
    }
}

impl Guard for Contract {
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn check_preconditions(&self, args: &ArgMap<'_>) -> Result<(), CallError> {
        if !self.config.enforce {
            return Ok(());
        }
        check_preconditions(&self.registry, &self.pre, args)
    }

    fn complete(&self, args: &[Value], arg_map: &ArgMap<'_>) -> Result<Value, CallError> {
        let retval = self.body.call(args)?;
        if self.config.enforce {
            check_postconditions(&self.registry, &self.post, &retval, arg_map)?;
        }
        Ok(retval)
    }
}

impl Callable for Contract {
    fn call(&self, args: &[Value]) -> Result<Value, CallError> {
        self.invoke(args)
    }

    fn guard(&self) -> Option<&dyn Guard> {
        Some(self)
    }
}

/// Builds a [`Contract`], optionally with custom conditions or a
/// non-default configuration.
pub struct ContractBuilder {
    source: MetadataSource,
    body: Function,
    registry: Arc<AnnotationRegistry>,
    config: ContractConfig,
    custom_pre: Vec<CustomPrecondition>,
    custom_post: Vec<CustomPostcondition>,
}

impl ContractBuilder {
    /// Annotations are resolved in `registry` on every call.
    pub fn new(
        source: impl Into<MetadataSource>,
        body: Function,
        registry: &Arc<AnnotationRegistry>,
    ) -> Self {
        ContractBuilder {
            source: source.into(),
            body,
            registry: Arc::clone(registry),
            config: ContractConfig::default(),
            custom_pre: Vec::new(),
            custom_post: Vec::new(),
        }
    }

    pub fn config(mut self, config: ContractConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds a precondition that runs after the annotation preconditions.
    pub fn pre<F>(mut self, check: F) -> Self
    where
        F: Fn(&ArgMap<'_>) -> Result<(), CallError> + Send + Sync + 'static,
    {
        self.custom_pre.push(Arc::new(check));
        self
    }

    /// Adds a postcondition that runs after the annotation postconditions.
    pub fn post<F>(mut self, check: F) -> Self
    where
        F: Fn(&Value, &ArgMap<'_>) -> Result<(), CallError> + Send + Sync + 'static,
    {
        self.custom_post.push(Arc::new(check));
        self
    }

    /// Builds the guarded callable.
    ///
    /// Returns the body unchanged when it already carries a contract.
    /// Custom conditions cannot be attached to an already-guarded body.
    pub fn build(self) -> Result<Function, ConfigError> {
        if self.body.has_contract() {
            if !self.custom_pre.is_empty() || !self.custom_post.is_empty() {
                return Err(ConfigError::AlreadyContracted);
            }
            return Ok(self.body);
        }

        let metadata = self.source.build()?;
        let mut pre = annotated_preconditions(&metadata);
        pre.extend(self.custom_pre.into_iter().map(Precondition::Custom));
        let mut post = annotated_postconditions(&metadata);
        post.extend(self.custom_post.into_iter().map(Postcondition::Custom));

        tracing::debug!(
            "contract built: {} parameter(s), {} precondition(s), {} postcondition(s)",
            metadata.names.len(),
            pre.len(),
            post.len()
        );

        Ok(Function::from_callable(Contract {
            body: self.body,
            metadata,
            pre,
            post,
            registry: self.registry,
            config: self.config,
        }))
    }
}

/// Wraps `body` in a contract described by `source` (structured metadata or
/// a shorthand token list), resolving annotations in `registry`.
pub fn wrap(
    source: impl Into<MetadataSource>,
    body: Function,
    registry: &Arc<AnnotationRegistry>,
) -> Result<Function, ConfigError> {
    ContractBuilder::new(source, body, registry).build()
}

/// True when `f` carries the contract-presence marker.
pub fn has_contract(f: &Function) -> bool {
    f.has_contract()
}
