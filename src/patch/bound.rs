use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};

use crate::errors::PatchError;

/// Top-level keys present in a patch body, matched case-insensitively.
///
/// A key is bound even when its value is `null`, `false` or `0`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundFields {
    keys: Vec<String>,
}

impl BoundFields {
    pub fn insert(&mut self, key: impl Into<String>) {
        let key = key.into();
        if !self.contains(&key) {
            self.keys.push(key);
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.keys.iter().any(|key| key.eq_ignore_ascii_case(field))
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for BoundFields {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut bound = BoundFields::default();
        for key in iter {
            bound.insert(key);
        }
        bound
    }
}

/// Scan the raw body for its top-level keys, independent of any request type.
pub fn read_bound_fields(raw: &str) -> Result<BoundFields, PatchError> {
    let value: JsonValue = serde_json::from_str(raw)?;
    bound_fields_of(&value)
}

fn bound_fields_of(value: &JsonValue) -> Result<BoundFields, PatchError> {
    match value {
        JsonValue::Object(map) => Ok(map.keys().cloned().collect()),
        _ => Err(PatchError::NotAnObject),
    }
}

/// A patch body read both ways: which keys were sent, and the typed request.
#[derive(Debug, Clone)]
pub struct PatchPayload<R> {
    pub bound: BoundFields,
    pub request: R,
}

impl<R: DeserializeOwned> PatchPayload<R> {
    pub fn from_json(raw: &str) -> Result<Self, PatchError> {
        Self::from_value(serde_json::from_str(raw)?)
    }

    pub fn from_value(value: JsonValue) -> Result<Self, PatchError> {
        Self::bind(value, &[])
    }

    /// Read a body whose keys may differ in case from the request's field
    /// names. Keys matching one of `fields` case-insensitively are renamed to
    /// it before deserializing, so the typed request sees the sent value.
    pub fn bind(mut value: JsonValue, fields: &[&str]) -> Result<Self, PatchError> {
        let bound = bound_fields_of(&value)?;
        if let JsonValue::Object(map) = &mut value {
            canonicalize_keys(map, fields);
        }
        let request = serde_json::from_value(value)?;
        Ok(Self { bound, request })
    }
}

/// An exact-case key wins over differently-cased duplicates; among those,
/// the first in key order wins.
fn canonicalize_keys(map: &mut Map<String, JsonValue>, fields: &[&str]) {
    let renames: Vec<(String, &str)> = map
        .keys()
        .filter_map(|key| {
            fields
                .iter()
                .find(|field| field.eq_ignore_ascii_case(key) && **field != key.as_str())
                .map(|field| (key.clone(), *field))
        })
        .collect();

    for (key, field) in renames {
        if let Some(value) = map.remove(&key) {
            if !map.contains_key(field) {
                map.insert(field.to_string(), value);
            }
        }
    }
}

impl<R> PatchPayload<R> {
    pub fn is_bound(&self, field: &str) -> bool {
        self.bound.contains(field)
    }
}
