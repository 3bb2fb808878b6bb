//! Error types for contract construction and invocation.
//!
//! Two kinds are kept strictly apart:
//! - [`ContractViolation`]: a predicate evaluated false against an actual
//!   value. A bad value, not a bad program.
//! - [`ConfigError`]: the contract itself is unusable (unknown annotation,
//!   malformed metadata, a union entry with no callable).
//!
//! [`CallError`] is what a guarded call returns; [`CallError::kind`] tells the
//! two apart (plus errors raised by the wrapped body itself).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value::Value;

/// Which side of the call a contract term guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractKind {
    /// Checked against the arguments before the body runs.
    Precondition,
    /// Checked against the return value after the body runs.
    Postcondition,
}

/// The value a contract term was applied to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// A named parameter.
    Parameter(String),
    /// The return value.
    Return,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Parameter(name) => write!(f, "parameter \"{}\"", name),
            Target::Return => f.write_str("return value"),
        }
    }
}

/// A predicate evaluated false against an actual value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractViolation {
    /// Whether a precondition or a postcondition failed.
    pub kind: ContractKind,
    /// The parameter (or return value) that failed.
    pub target: Target,
    /// The failed annotation in sigil form (`@number`).
    pub annotation: String,
    /// The offending value.
    pub value: Value,
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Target::Parameter(name) => write!(
                f,
                "Argument for parameter \"{}\", does not satisfy {}: {}",
                name,
                self.annotation,
                self.value.describe()
            ),
            Target::Return => write!(
                f,
                "Function return value does not satisfy {}: {}",
                self.annotation,
                self.value.describe()
            ),
        }
    }
}

impl std::error::Error for ContractViolation {}

/// Setup mistakes: never retried, never used for union candidate elimination.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Metadata references an annotation that is not registered.
    #[error("Annotation {annotation}, for {target}, does not exist")]
    UnknownAnnotation { annotation: String, target: Target },

    /// A shorthand token list could not be parsed.
    #[error("malformed annotation tokens: {reason}")]
    MalformedTokens { reason: String },

    /// Structured metadata breaks one of its invariants.
    #[error("malformed metadata: {reason}")]
    MalformedMetadata { reason: String },

    /// A metadata entry in a union list was not followed by a callable.
    #[error("Expected function after argument #{position}")]
    ExpectedFunction { position: usize },

    /// A union list entry is neither a callable nor metadata.
    #[error("Invalid argument for union at #{position}: {found}")]
    InvalidUnionEntry { position: usize, found: String },

    /// Custom conditions were supplied for a callable that is already guarded.
    #[error("callable already carries a contract; attach custom conditions when first wrapping")]
    AlreadyContracted,

    /// A configuration document failed to parse.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

/// Coarse classification of a [`CallError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Contract,
    Configuration,
    Body,
}

/// Errors produced by invoking a callable.
#[derive(Debug, Error)]
pub enum CallError {
    #[error(transparent)]
    Violation(#[from] ContractViolation),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Raised by the wrapped body itself.
    #[error("{message}")]
    Body { message: String },
}

impl CallError {
    /// Convenience constructor for body failures.
    pub fn body(message: impl Into<String>) -> Self {
        CallError::Body {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CallError::Violation(_) => ErrorKind::Contract,
            CallError::Config(_) => ErrorKind::Configuration,
            CallError::Body { .. } => ErrorKind::Body,
        }
    }

    pub fn violation(&self) -> Option<&ContractViolation> {
        match self {
            CallError::Violation(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(target: Target, value: Value) -> ContractViolation {
        ContractViolation {
            kind: ContractKind::Precondition,
            target,
            annotation: "@number".into(),
            value,
        }
    }

    #[test]
    fn parameter_violation_message() {
        let v = violation(Target::Parameter("x".into()), Value::from("21"));
        insta::assert_snapshot!(v.to_string(), @r#"Argument for parameter "x", does not satisfy @number: "21""#);
    }

    #[test]
    fn return_violation_message() {
        let mut v = violation(Target::Return, Value::Null);
        v.kind = ContractKind::Postcondition;
        insta::assert_snapshot!(v.to_string(), @"Function return value does not satisfy @number: null");
    }

    #[test]
    fn unknown_annotation_messages() {
        let param = ConfigError::UnknownAnnotation {
            annotation: "@foo".into(),
            target: Target::Parameter("x".into()),
        };
        assert_eq!(param.to_string(), "Annotation @foo, for parameter \"x\", does not exist");

        let ret = ConfigError::UnknownAnnotation {
            annotation: "@foo".into(),
            target: Target::Return,
        };
        assert_eq!(ret.to_string(), "Annotation @foo, for return value, does not exist");
    }

    #[test]
    fn call_error_kinds() {
        let v: CallError = violation(Target::Return, Value::Null).into();
        assert_eq!(v.kind(), ErrorKind::Contract);
        assert!(v.violation().is_some());

        let c: CallError = ConfigError::AlreadyContracted.into();
        assert_eq!(c.kind(), ErrorKind::Configuration);
        assert!(c.violation().is_none());

        let b = CallError::body("boom");
        assert_eq!(b.kind(), ErrorKind::Body);
        assert_eq!(b.to_string(), "boom");
    }

    #[test]
    fn violation_serializes_with_target() {
        let v = violation(Target::Parameter("x".into()), Value::from(1));
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["kind"], "precondition");
        assert_eq!(json["target"], serde_json::json!({"parameter": "x"}));
        assert_eq!(json["annotation"], "@number");
        assert_eq!(json["value"], 1.0);
    }
}
