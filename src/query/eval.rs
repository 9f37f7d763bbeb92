use std::cmp::Ordering;

use super::filter::{Filter, TextMatch};
use crate::catalog::Value;

pub fn eval<T: 'static>(filter: &Filter<T>, item: &T) -> bool {
    match filter {
        Filter::Always => true,
        Filter::Never => false,
        Filter::In { field, values } => {
            let value = field.read(item);
            values.contains(&value)
        }
        Filter::Range {
            field,
            lower,
            upper,
        } => {
            let value = field.read(item);
            let above = lower.as_ref().map_or(true, |lower| {
                matches!(
                    value.partial_cmp(lower),
                    Some(Ordering::Greater | Ordering::Equal)
                )
            });
            let below = upper.as_ref().map_or(true, |upper| {
                matches!(
                    value.partial_cmp(upper),
                    Some(Ordering::Less | Ordering::Equal)
                )
            });
            above && below
        }
        Filter::Text {
            field,
            mode,
            needle,
        } => match field.read(item) {
            Value::String(haystack) => eval_text(*mode, &haystack, needle),
            _ => false,
        },
        Filter::And(a, b) => eval(a, item) && eval(b, item),
        Filter::Or(a, b) => eval(a, item) || eval(b, item),
    }
}

fn eval_text(mode: TextMatch, haystack: &str, needle: &str) -> bool {
    match mode {
        TextMatch::Exact => haystack == needle,
        TextMatch::StartsWith => haystack.starts_with(needle),
        TextMatch::EndsWith => haystack.ends_with(needle),
        TextMatch::Contains => haystack.contains(needle),
    }
}

impl<T: 'static> Filter<T> {
    pub fn matches(&self, item: &T) -> bool {
        eval(self, item)
    }
}
