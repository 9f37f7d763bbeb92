use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::catalog::{Field, FieldKind, Value};
use crate::errors::CoercionError;

pub const NULL: &str = "null";

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn is_null_literal(token: &str) -> bool {
    token.trim().eq_ignore_ascii_case(NULL)
}

/// Read a raw filter token as a value of `field`'s type.
pub fn coerce<T>(field: &Field<T>, token: &str) -> Result<Value, CoercionError> {
    let kind = field.kind();
    if kind.is_string() {
        return Ok(Value::String(token.to_string()));
    }

    if is_null_literal(token) {
        return if field.is_nullable() {
            Ok(Value::Null)
        } else {
            Err(CoercionError::NullNotAllowed { kind })
        };
    }

    coerce_kind(kind, token.trim())
}

fn coerce_kind(kind: FieldKind, token: &str) -> Result<Value, CoercionError> {
    let invalid = || CoercionError::invalid(token, kind);
    match kind {
        FieldKind::String => Ok(Value::String(token.to_string())),
        FieldKind::Int => token.parse::<i64>().map(Value::Int).map_err(|_| invalid()),
        FieldKind::Float => token
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::Float)
            .ok_or_else(invalid),
        FieldKind::Bool => {
            if token.eq_ignore_ascii_case("true") {
                Ok(Value::Bool(true))
            } else if token.eq_ignore_ascii_case("false") {
                Ok(Value::Bool(false))
            } else {
                Err(invalid())
            }
        }
        FieldKind::DateTime => parse_datetime(token).map(Value::DateTime).ok_or_else(invalid),
        FieldKind::Date => NaiveDate::parse_from_str(token, DATE_FORMAT)
            .map(Value::Date)
            .map_err(|_| invalid()),
        FieldKind::Enum(variants) => parse_enum(variants, token)
            .map(Value::Enum)
            .ok_or_else(invalid),
    }
}

fn parse_datetime(token: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(token) {
        return Some(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(token, format) {
            return Some(dt);
        }
    }

    // a bare date means midnight
    NaiveDate::parse_from_str(token, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Enum tokens are either a variant name (any case) or its ordinal.
fn parse_enum(variants: &[&str], token: &str) -> Option<u32> {
    if let Some(idx) = variants.iter().position(|v| v.eq_ignore_ascii_case(token)) {
        return u32::try_from(idx).ok();
    }

    token
        .parse::<u32>()
        .ok()
        .filter(|&ordinal| (ordinal as usize) < variants.len())
}

/// Range bounds only make sense for ordered kinds.
pub fn supports_range(kind: FieldKind) -> bool {
    !matches!(kind, FieldKind::Bool | FieldKind::String)
}
