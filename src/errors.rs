use serde::Serialize;
use std::fmt;

use crate::catalog::FieldKind;

/// A filter token that could not be read as its field's type.
///
/// Always recoverable: the clause holding the token is dropped and the rest
/// of the query still applies.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CoercionError {
    #[error("cannot read {value:?} as {kind}")]
    Invalid { value: String, kind: FieldKind },

    #[error("null is not allowed for non-nullable {kind} field")]
    NullNotAllowed { kind: FieldKind },

    #[error("{kind} fields do not support ranges")]
    RangeNotSupported { kind: FieldKind },

    #[error("no usable values")]
    Empty,
}

impl CoercionError {
    pub fn invalid(value: impl Into<String>, kind: FieldKind) -> Self {
        Self::Invalid {
            value: value.into(),
            kind,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("invalid value {value:?} for parameter {name}")]
    InvalidParameter { name: String, value: String },
}

impl QueryError {
    pub fn invalid_parameter(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One failed conditional rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every rule failure of a single patch, in rule registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// Messages reported for `field`, compared case-insensitively.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |err| err.field.eq_ignore_ascii_case(field))
            .map(|err| err.message.as_str())
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{} : {}", err.field, err.message)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PatchError {
    #[error("malformed patch payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("patch payload must be a JSON object")]
    NotAnObject,

    #[error("validation failed:\n{0}")]
    Validation(FieldErrors),

    #[error("no patch schema registered for {0}")]
    Configuration(&'static str),
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error("io error: {0:?}")]
    IO(#[from] std::io::Error),

    #[error("unexpected error: {0:?}")]
    Other(#[from] anyhow::Error),
}
