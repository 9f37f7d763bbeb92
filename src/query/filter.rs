use std::fmt;

use super::coerce::{self, coerce, supports_range};
use super::lexer::{Chunk, Combinator, RANGE_SEPARATOR, STRING_LIKE_INDICATOR};
use crate::catalog::{Entity, Field, Value};
use crate::errors::CoercionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMatch {
    Exact,
    StartsWith,
    EndsWith,
    Contains,
}

/// Predicate over one entity type.
pub enum Filter<T: 'static> {
    Always,
    Never,
    In {
        field: &'static Field<T>,
        values: Vec<Value>,
    },
    Range {
        field: &'static Field<T>,
        lower: Option<Value>,
        upper: Option<Value>,
    },
    Text {
        field: &'static Field<T>,
        mode: TextMatch,
        needle: String,
    },
    And(Box<Filter<T>>, Box<Filter<T>>),
    Or(Box<Filter<T>>, Box<Filter<T>>),
}

impl<T: 'static> Filter<T> {
    pub fn and(self, other: Filter<T>) -> Filter<T> {
        Filter::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Filter<T>) -> Filter<T> {
        Filter::Or(Box::new(self), Box::new(other))
    }

    /// OR together a list of alternatives; an empty list matches nothing.
    pub fn any_of(filters: impl IntoIterator<Item = Filter<T>>) -> Filter<T> {
        filters
            .into_iter()
            .reduce(Filter::or)
            .unwrap_or(Filter::Never)
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Filter::Always)
    }
}

impl<T: 'static> fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Always => write!(f, "Always"),
            Filter::Never => write!(f, "Never"),
            Filter::In { field, values } => write!(f, "{} in {values:?}", field.name()),
            Filter::Range {
                field,
                lower,
                upper,
            } => write!(f, "{} in [{lower:?}, {upper:?}]", field.name()),
            Filter::Text {
                field,
                mode,
                needle,
            } => write!(f, "{} {mode:?} {needle:?}", field.name()),
            Filter::And(a, b) => write!(f, "({a:?} and {b:?})"),
            Filter::Or(a, b) => write!(f, "({a:?} or {b:?})"),
        }
    }
}

/// Build a single predicate from tokenized chunks.
///
/// Chunks are combined strictly left to right with no precedence, so
/// `a;b,c` means `(a and b) or c`. Chunks naming unknown fields, or holding
/// a value that does not coerce, are skipped along with their combinator.
pub fn build<T: Entity>(chunks: &[Chunk]) -> Filter<T> {
    let catalog = T::catalog();
    let mut combined: Option<Filter<T>> = None;
    let mut pending = Combinator::End;

    for chunk in chunks {
        let Some(field) = catalog.get(&chunk.field) else {
            log::debug!("query: ignoring unknown field {:?}", chunk.field);
            continue;
        };

        let filter = match build_chunk(field, &chunk.values) {
            Ok(filter) => filter,
            Err(err) => {
                log::debug!("query: ignoring field {:?}: {err}", chunk.field);
                continue;
            }
        };

        combined = Some(match combined {
            None => filter,
            Some(acc) => match pending {
                Combinator::Or => acc.or(filter),
                Combinator::And | Combinator::End => acc.and(filter),
            },
        });
        pending = chunk.next;
    }

    combined.unwrap_or(Filter::Always)
}

/// Predicate for one field: its values OR together.
pub(crate) fn build_chunk<T: 'static>(
    field: &'static Field<T>,
    values: &[String],
) -> Result<Filter<T>, CoercionError> {
    if values.is_empty() {
        return Err(CoercionError::Empty);
    }

    if field.kind().is_string() {
        return Ok(string_filter(field, values));
    }

    let (ranges, exact): (Vec<&String>, Vec<&String>) = values
        .iter()
        .partition(|value| value.contains(RANGE_SEPARATOR));

    let mut alternatives = Vec::new();
    for range in ranges {
        if let Some(filter) = range_filter(field, range)? {
            alternatives.push(filter);
        }
    }

    if !exact.is_empty() {
        let values = exact
            .into_iter()
            .map(|value| coerce(field, value))
            .collect::<Result<Vec<_>, _>>()?;
        alternatives.push(Filter::In { field, values });
    }

    Ok(Filter::any_of(alternatives))
}

fn string_filter<T: 'static>(field: &'static Field<T>, values: &[String]) -> Filter<T> {
    let mut alternatives = Vec::new();
    let mut exact = Vec::new();

    for value in values {
        match text_match(value) {
            TextMatch::Exact => exact.push(Value::String(value.clone())),
            mode => alternatives.push(Filter::Text {
                field,
                mode,
                needle: value.replace(STRING_LIKE_INDICATOR, ""),
            }),
        }
    }

    if !exact.is_empty() {
        alternatives.push(Filter::In {
            field,
            values: exact,
        });
    }

    Filter::any_of(alternatives)
}

/// Classify a string token by where its wildcard markers sit.
pub(crate) fn text_match(value: &str) -> TextMatch {
    let leading = value.starts_with(STRING_LIKE_INDICATOR);
    let trailing = value.ends_with(STRING_LIKE_INDICATOR);
    match (leading, trailing) {
        (true, true) => TextMatch::Contains,
        (false, true) => TextMatch::StartsWith,
        (true, false) => TextMatch::EndsWith,
        (false, false) => TextMatch::Exact,
    }
}

/// `lo~hi` inclusive; an empty or `null` side is unbounded. Tokens with more
/// than one range separator are ignored.
fn range_filter<T: 'static>(
    field: &'static Field<T>,
    range: &str,
) -> Result<Option<Filter<T>>, CoercionError> {
    if !supports_range(field.kind()) {
        return Err(CoercionError::RangeNotSupported { kind: field.kind() });
    }

    let Some((start, end)) = range.split_once(RANGE_SEPARATOR) else {
        return Ok(None);
    };
    if end.contains(RANGE_SEPARATOR) {
        log::debug!("query: ignoring malformed range {range:?}");
        return Ok(None);
    }

    Ok(Some(Filter::Range {
        field,
        lower: bound(field, start)?,
        upper: bound(field, end)?,
    }))
}

fn bound<T>(field: &Field<T>, token: &str) -> Result<Option<Value>, CoercionError> {
    if token.trim().is_empty() || coerce::is_null_literal(token) {
        return Ok(None);
    }
    coerce(field, token).map(Some)
}
