//! Field schemas: per-field requirements and validation predicates.

use crate::properties::Value;
use serde::{Deserialize, Serialize};

/// A pure, total predicate over a field value.
///
/// `check` never panics; it returns `Ok(())` or a human-readable reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValidator {
    /// Any value is acceptable.
    Anything,
    /// A string with at least one non-whitespace character.
    NonEmpty,
    /// A string of ASCII digits, or an integer value.
    Numeric,
    /// A TCP port: numeric and within 1..=65535.
    PortNumber,
    /// An http(s) URL with a non-empty host part.
    Url,
    /// A string starting with `/`.
    AbsolutePath,
    /// One of a fixed set of string values.
    OneOf(Vec<String>),
}

impl FieldValidator {
    /// Check a value against this predicate.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            FieldValidator::Anything => Ok(()),
            FieldValidator::NonEmpty => match value.as_str() {
                Some(s) if !s.trim().is_empty() => Ok(()),
                Some(_) => Err("must not be empty".into()),
                None => Err(format!("expected a string, got {}", value.type_name())),
            },
            FieldValidator::Numeric => match numeric_value(value) {
                Some(_) => Ok(()),
                None => Err("must be a number".into()),
            },
            FieldValidator::PortNumber => match numeric_value(value) {
                Some(n) if (1..=65535).contains(&n) => Ok(()),
                Some(_) => Err("must be a port between 1 and 65535".into()),
                None => Err("must be a number".into()),
            },
            FieldValidator::Url => match value.as_str() {
                Some(s)
                    if s.strip_prefix("http://")
                        .or_else(|| s.strip_prefix("https://"))
                        .is_some_and(|rest| !rest.is_empty()) =>
                {
                    Ok(())
                }
                Some(_) => Err("must be an http:// or https:// URL".into()),
                None => Err(format!("expected a string, got {}", value.type_name())),
            },
            FieldValidator::AbsolutePath => match value.as_str() {
                Some(s) if s.starts_with('/') => Ok(()),
                Some(_) => Err("must be an absolute path starting with /".into()),
                None => Err(format!("expected a string, got {}", value.type_name())),
            },
            FieldValidator::OneOf(allowed) => match value.as_str() {
                Some(s) if allowed.iter().any(|a| a == s) => Ok(()),
                _ => Err(format!("must be one of: {}", allowed.join(", "))),
            },
        }
    }

    /// Shorthand for an enumerated string field.
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValidator::OneOf(values.into_iter().map(Into::into).collect())
    }
}

/// Numbers may arrive as integers or as digit strings from form input.
fn numeric_value(value: &Value) -> Option<i64> {
    match value {
        Value::Int(n) => Some(*n),
        Value::String(s) if !s.is_empty() => s.parse().ok(),
        _ => None,
    }
}

/// Schema for one field of a brick type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Whether the field must be present on every instance.
    pub required: bool,
    /// Default populated by `Catalog::default_instance`.
    pub default: Value,
    /// Predicate applied whenever the field is present.
    pub validator: FieldValidator,
}

impl FieldSpec {
    pub fn required(validator: FieldValidator, default: impl Into<Value>) -> Self {
        Self {
            required: true,
            default: default.into(),
            validator,
        }
    }

    pub fn optional(validator: FieldValidator, default: impl Into<Value>) -> Self {
        Self {
            required: false,
            default: default.into(),
            validator,
        }
    }
}
