//! Contract metadata: parameter names, per-parameter annotations and
//! return-value annotations.
//!
//! Two builders produce the same [`Metadata`] shape:
//! - [`Metadata::from_structured`] / [`Metadata::validated`] take metadata
//!   already in final form (also reachable from JSON and from a [`Value`]).
//! - [`Metadata::from_tokens`] parses the flat shorthand
//!   `["a", "@number", "b", "@string", "return", "@string"]`.
//!
//! Both normalize the same way and reject the same malformed input, so
//! `from_tokens(m.to_tokens()) == m` for every valid `m`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::value::Value;

/// Leading character that marks an annotation token.
pub const SIGIL: char = '@';

/// Target token naming the return value in shorthand lists.
pub const RETURN_TARGET: &str = "return";

/// Normalized description of a callable's contract.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Parameter names in declaration order (positional correspondence).
    pub names: Vec<String>,
    /// Annotations per parameter, in declaration order.
    #[serde(default)]
    pub params: IndexMap<String, Vec<String>>,
    /// Annotations applied to the return value.
    #[serde(default, deserialize_with = "nullable_list")]
    pub retval: Vec<String>,
}

fn nullable_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Where a contract's metadata comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataSource {
    Structured(Metadata),
    Tokens(Vec<String>),
}

impl MetadataSource {
    /// Runs the matching builder.
    pub fn build(self) -> Result<Metadata, ConfigError> {
        match self {
            MetadataSource::Structured(meta) => meta.validated(),
            MetadataSource::Tokens(tokens) => Metadata::from_tokens(&tokens),
        }
    }
}

impl From<Metadata> for MetadataSource {
    fn from(meta: Metadata) -> Self {
        MetadataSource::Structured(meta)
    }
}

impl From<Vec<String>> for MetadataSource {
    fn from(tokens: Vec<String>) -> Self {
        MetadataSource::Tokens(tokens)
    }
}

impl From<Vec<&str>> for MetadataSource {
    fn from(tokens: Vec<&str>) -> Self {
        MetadataSource::Tokens(tokens.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for MetadataSource {
    fn from(tokens: &[&str]) -> Self {
        MetadataSource::Tokens(tokens.iter().map(|t| t.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for MetadataSource {
    fn from(tokens: [&str; N]) -> Self {
        MetadataSource::Tokens(tokens.iter().map(|t| t.to_string()).collect())
    }
}

/// True for a well-formed annotation token: the sigil followed by a
/// non-empty name. The name itself is unconstrained, as in the registry.
pub fn is_annotation(token: &str) -> bool {
    token.strip_prefix(SIGIL).is_some_and(|name| !name.is_empty())
}

fn malformed(reason: impl Into<String>) -> ConfigError {
    ConfigError::MalformedMetadata {
        reason: reason.into(),
    }
}

impl Metadata {
    /// Builds metadata from explicit parts.
    pub fn from_structured(
        names: &[&str],
        params: &[(&str, &[&str])],
        retval: &[&str],
    ) -> Result<Self, ConfigError> {
        Metadata {
            names: names.iter().map(|n| n.to_string()).collect(),
            params: params
                .iter()
                .map(|(name, anns)| (name.to_string(), anns.iter().map(|a| a.to_string()).collect()))
                .collect(),
            retval: retval.iter().map(|a| a.to_string()).collect(),
        }
        .validated()
    }

    /// Checks the invariants and normalizes `params` to declaration order,
    /// giving unannotated names an empty entry.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let Metadata {
            names,
            mut params,
            retval,
        } = self;

        let mut normalized = IndexMap::with_capacity(names.len());
        for name in &names {
            if name.is_empty() {
                return Err(malformed("empty parameter name"));
            }
            if name.starts_with(SIGIL) {
                return Err(malformed(format!("parameter name '{}' starts with '{}'", name, SIGIL)));
            }
            if name == RETURN_TARGET {
                return Err(malformed(format!("'{}' is reserved for the return value", RETURN_TARGET)));
            }
            if normalized.contains_key(name) {
                return Err(malformed(format!("duplicate parameter name '{}'", name)));
            }
            let annotations = params.shift_remove(name).unwrap_or_default();
            if let Some(bad) = annotations.iter().find(|a| !is_annotation(a)) {
                return Err(malformed(format!(
                    "invalid annotation '{}' for parameter '{}'",
                    bad, name
                )));
            }
            normalized.insert(name.clone(), annotations);
        }

        if let Some((stray, _)) = params.first() {
            return Err(malformed(format!(
                "annotations given for '{}', which is not a declared parameter",
                stray
            )));
        }
        if let Some(bad) = retval.iter().find(|a| !is_annotation(a)) {
            return Err(malformed(format!("invalid return annotation '{}'", bad)));
        }

        Ok(Metadata {
            names,
            params: normalized,
            retval,
        })
    }

    /// Parses structured metadata from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let meta: Metadata = serde_json::from_str(json).map_err(|e| malformed(e.to_string()))?;
        meta.validated()
    }

    /// Builds metadata from a dynamic value: an array of string tokens, or
    /// an object shaped like `{names, params, retval}`.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        match value {
            Value::Array(items) => {
                let tokens = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        item.as_str().map(str::to_string).ok_or_else(|| ConfigError::MalformedTokens {
                            reason: format!("token #{} is {}, expected a string", i, item.describe()),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Metadata::from_tokens(&tokens)
            }
            Value::Object(map) => {
                let names = match map.get("names") {
                    Some(v) => string_list(v, "names")?,
                    None => return Err(malformed("missing 'names'")),
                };
                let params = match map.get("params") {
                    None | Some(Value::Undefined) | Some(Value::Null) => IndexMap::new(),
                    Some(Value::Object(entries)) => entries
                        .iter()
                        .map(|(name, anns)| -> Result<(String, Vec<String>), ConfigError> {
                            Ok((name.clone(), string_list(anns, name)?))
                        })
                        .collect::<Result<IndexMap<_, _>, _>>()?,
                    Some(other) => {
                        return Err(malformed(format!("'params' is {}, expected an object", other.describe())))
                    }
                };
                let retval = match map.get("retval") {
                    None | Some(Value::Undefined) | Some(Value::Null) => Vec::new(),
                    Some(v) => string_list(v, "retval")?,
                };
                Metadata {
                    names,
                    params,
                    retval,
                }
                .validated()
            }
            other => Err(malformed(format!(
                "expected a token array or metadata object, got {}",
                other.describe()
            ))),
        }
    }

    /// Parses the shorthand token list.
    ///
    /// Each non-annotation token opens a new target (a parameter name, or
    /// `return`); the annotation tokens that follow belong to it. Tokens
    /// before the first name target the return value.
    pub fn from_tokens<T: AsRef<str>>(tokens: &[T]) -> Result<Self, ConfigError> {
        let mut meta = Metadata::default();
        let mut target = RETURN_TARGET.to_string();
        let mut annotations = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            let token = token.as_ref();
            if token.is_empty() {
                return Err(ConfigError::MalformedTokens {
                    reason: format!("empty token at #{}", i),
                });
            }
            if token.starts_with(SIGIL) {
                if !is_annotation(token) {
                    return Err(ConfigError::MalformedTokens {
                        reason: format!("invalid annotation '{}' at #{}", token, i),
                    });
                }
                annotations.push(token.to_string());
            } else {
                meta.close_target(&target, std::mem::take(&mut annotations))?;
                target = token.to_string();
            }
        }
        meta.close_target(&target, annotations)?;

        Ok(meta)
    }

    fn close_target(&mut self, target: &str, annotations: Vec<String>) -> Result<(), ConfigError> {
        if target == RETURN_TARGET {
            self.retval.extend(annotations);
            return Ok(());
        }
        if self.params.contains_key(target) {
            return Err(ConfigError::MalformedTokens {
                reason: format!("duplicate parameter name '{}'", target),
            });
        }
        self.names.push(target.to_string());
        self.params.insert(target.to_string(), annotations);
        Ok(())
    }

    /// Flattens back into the shorthand token list.
    pub fn to_tokens(&self) -> Vec<String> {
        let mut tokens = Vec::new();
        for name in &self.names {
            tokens.push(name.clone());
            if let Some(anns) = self.params.get(name) {
                tokens.extend(anns.iter().cloned());
            }
        }
        if !self.retval.is_empty() {
            tokens.push(RETURN_TARGET.to_string());
            tokens.extend(self.retval.iter().cloned());
        }
        tokens
    }

    /// Every `(parameter, annotation)` pair in check order: parameter
    /// order, then annotation order within each parameter.
    pub fn parameter_annotations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().flat_map(move |name| {
            self.params
                .get(name)
                .into_iter()
                .flatten()
                .map(move |ann| (name.as_str(), ann.as_str()))
        })
    }
}

fn string_list(value: &Value, field: &str) -> Result<Vec<String>, ConfigError> {
    let items = value
        .as_array()
        .ok_or_else(|| malformed(format!("'{}' is {}, expected an array", field, value.describe())))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| malformed(format!("'{}' contains {}, expected strings", field, item.describe())))
        })
        .collect()
}
