//! Contract conditions checked around a guarded call.
//!
//! Annotation conditions are derived from [`Metadata`]: one precondition per
//! annotation instance across all parameters, one postcondition per return
//! annotation, both in declaration order. Custom conditions are closures
//! attached with [`ContractBuilder`](crate::contract::ContractBuilder) and run
//! after the annotation conditions. Violations surface as
//! [`ContractViolation`](adidem_core::ContractViolation).

pub mod check;

use std::fmt;
use std::sync::Arc;

use adidem_core::{ArgMap, CallError, Metadata, Value};

pub use adidem_core::ContractKind;

/// A custom precondition over the call's arguments.
pub type CustomPrecondition = Arc<dyn Fn(&ArgMap<'_>) -> Result<(), CallError> + Send + Sync>;

/// A custom postcondition over the return value and the call's arguments.
pub type CustomPostcondition =
    Arc<dyn Fn(&Value, &ArgMap<'_>) -> Result<(), CallError> + Send + Sync>;

/// A check run before the body.
#[derive(Clone)]
pub enum Precondition {
    /// Resolve `annotation` in the registry and apply it to `param`.
    Annotated { param: String, annotation: String },
    Custom(CustomPrecondition),
}

/// A check run after the body.
#[derive(Clone)]
pub enum Postcondition {
    /// Resolve `annotation` in the registry and apply it to the return value.
    Annotated { annotation: String },
    Custom(CustomPostcondition),
}

impl fmt::Debug for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precondition::Annotated { param, annotation } => {
                write!(f, "{} {}", param, annotation)
            }
            Precondition::Custom(_) => f.write_str("<custom precondition>"),
        }
    }
}

impl fmt::Debug for Postcondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Postcondition::Annotated { annotation } => write!(f, "return {}", annotation),
            Postcondition::Custom(_) => f.write_str("<custom postcondition>"),
        }
    }
}

/// Preconditions in check order: parameter order, then annotation order.
pub fn annotated_preconditions(meta: &Metadata) -> Vec<Precondition> {
    meta.parameter_annotations()
        .map(|(param, annotation)| Precondition::Annotated {
            param: param.to_string(),
            annotation: annotation.to_string(),
        })
        .collect()
}

/// Postconditions in declared order.
pub fn annotated_postconditions(meta: &Metadata) -> Vec<Postcondition> {
    meta.retval
        .iter()
        .map(|annotation| Postcondition::Annotated {
            annotation: annotation.clone(),
        })
        .collect()
}
