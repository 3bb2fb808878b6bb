//! Runtime contract enforcement for dynamic callables.
//!
//! - [`contract`]: wrap a callable so every call is checked against its
//!   parameter and return-value annotations.
//! - [`union`]: dispatch one call across several callables by trialing
//!   their preconditions in order.
//! - [`contracts`]: the condition types and the checking logic both share.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use adidem_check::{wrap, AnnotationRegistry, Function, Value};
//!
//! let registry = Arc::new(AnnotationRegistry::new());
//! let double = wrap(
//!     ["x", "@number", "return", "@number"],
//!     Function::new(|args| Ok(Value::Number(args[0].as_number().unwrap_or(0.0) * 2.0))),
//!     &registry,
//! )
//! .unwrap();
//!
//! assert_eq!(double.call(&[Value::from(21)]).unwrap(), Value::from(42));
//! assert!(double.call(&[Value::from("21")]).is_err());
//! ```

pub mod contract;
pub mod contracts;
pub mod union;

pub use contract::{has_contract, wrap, Contract, ContractBuilder};
pub use union::{union, union_from_values, Union, UnionEntry};

pub use adidem_core::{
    AnnotationRegistry, ArgMap, CallError, Callable, ConfigError, ContractConfig, ContractKind,
    ContractViolation, ErrorKind, Function, Guard, Metadata, MetadataSource, Predicate, Target,
    Value,
};
