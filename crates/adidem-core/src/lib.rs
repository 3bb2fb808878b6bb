//! Core data model for runtime contracts: dynamic values, argument maps,
//! contract metadata and its builders, the annotation registry with its
//! built-in predicates, and the error kinds.

pub mod args;
pub mod builtins;
pub mod config;
pub mod error;
pub mod metadata;
pub mod registry;
pub mod value;

// Re-export commonly used types
pub use args::ArgMap;
pub use config::ContractConfig;
pub use error::{CallError, ConfigError, ContractKind, ContractViolation, ErrorKind, Target};
pub use metadata::{Metadata, MetadataSource, RETURN_TARGET, SIGIL};
pub use registry::{AnnotationRegistry, Predicate};
pub use value::{Callable, Function, Guard, Value};
