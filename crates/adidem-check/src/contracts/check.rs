//! Contract checking logic: resolve annotations, evaluate predicates,
//! produce violations.
//!
//! Called by [`Contract`](crate::contract::Contract) around every invocation
//! and by the union dispatcher when it trials a candidate's preconditions.
//! The first failing condition aborts the check; nothing is collected.

use adidem_core::{
    AnnotationRegistry, ArgMap, CallError, ConfigError, ContractKind, ContractViolation, Target,
    Value,
};

use crate::contracts::{Postcondition, Precondition};

/// Check a single precondition against the call's arguments.
///
/// An unregistered annotation is a configuration error; a predicate that
/// evaluates false is a contract violation carrying the parameter, the
/// annotation and the offending value.
pub fn check_precondition(
    registry: &AnnotationRegistry,
    condition: &Precondition,
    args: &ArgMap<'_>,
) -> Result<(), CallError> {
    match condition {
        Precondition::Annotated { param, annotation } => {
            let value = args.value(param);
            let predicate =
                registry
                    .resolve(annotation)
                    .ok_or_else(|| ConfigError::UnknownAnnotation {
                        annotation: annotation.clone(),
                        target: Target::Parameter(param.clone()),
                    })?;
            if predicate(value, Some(param.as_str()), args) {
                Ok(())
            } else {
                Err(ContractViolation {
                    kind: ContractKind::Precondition,
                    target: Target::Parameter(param.clone()),
                    annotation: annotation.clone(),
                    value: value.clone(),
                }
                .into())
            }
        }
        Precondition::Custom(check) => check(args),
    }
}

/// Check a single postcondition against the return value.
pub fn check_postcondition(
    registry: &AnnotationRegistry,
    condition: &Postcondition,
    retval: &Value,
    args: &ArgMap<'_>,
) -> Result<(), CallError> {
    match condition {
        Postcondition::Annotated { annotation } => {
            let predicate =
                registry
                    .resolve(annotation)
                    .ok_or_else(|| ConfigError::UnknownAnnotation {
                        annotation: annotation.clone(),
                        target: Target::Return,
                    })?;
            if predicate(retval, None, args) {
                Ok(())
            } else {
                Err(ContractViolation {
                    kind: ContractKind::Postcondition,
                    target: Target::Return,
                    annotation: annotation.clone(),
                    value: retval.clone(),
                }
                .into())
            }
        }
        Postcondition::Custom(check) => check(retval, args),
    }
}

/// Check all preconditions in order, stopping at the first failure.
pub fn check_preconditions(
    registry: &AnnotationRegistry,
    conditions: &[Precondition],
    args: &ArgMap<'_>,
) -> Result<(), CallError> {
    conditions
        .iter()
        .try_for_each(|condition| check_precondition(registry, condition, args))
}

/// Check all postconditions in order, stopping at the first failure.
pub fn check_postconditions(
    registry: &AnnotationRegistry,
    conditions: &[Postcondition],
    retval: &Value,
    args: &ArgMap<'_>,
) -> Result<(), CallError> {
    conditions
        .iter()
        .try_for_each(|condition| check_postcondition(registry, condition, retval, args))
}
