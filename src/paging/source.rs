use std::cmp::Ordering;
use std::fmt;

use crate::catalog::{Entity, Field};
use crate::errors::QueryError;
use crate::query::Filter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

pub struct SortKey<T: 'static> {
    pub field: &'static Field<T>,
    pub direction: Direction,
}

impl<T: 'static> Clone for SortKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> Copy for SortKey<T> {}

impl<T: 'static> fmt::Debug for SortKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.field.name(), self.direction)
    }
}

impl<T: 'static> SortKey<T> {
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        let ord = self.field.read(a).sort_cmp(&self.field.read(b));
        match self.direction {
            Direction::Ascending => ord,
            Direction::Descending => ord.reverse(),
        }
    }
}

/// Map order-by names to catalog fields. Any unknown name fails the whole
/// request.
pub fn resolve_ordering<T: Entity>(
    order_by: &[String],
    descending: bool,
) -> Result<Vec<SortKey<T>>, QueryError> {
    let direction = if descending {
        Direction::Descending
    } else {
        Direction::Ascending
    };
    let catalog = T::catalog();
    order_by
        .iter()
        .map(|name| {
            catalog
                .get(name)
                .map(|field| SortKey { field, direction })
                .ok_or_else(|| QueryError::FieldNotFound(name.clone()))
        })
        .collect()
}

/// A data source that can be filtered, ordered and sliced.
///
/// Each step consumes the source and returns the narrowed one, so backends
/// can build a deferred query as well as work on materialized rows.
pub trait Queryable: Sized {
    type Item: Entity;

    fn filter(self, filter: &Filter<Self::Item>) -> Self;

    /// Replaces any previous ordering.
    fn order_by(self, key: SortKey<Self::Item>) -> Self;

    /// Tie-breaker applied after the keys already given.
    fn then_by(self, key: SortKey<Self::Item>) -> Self;

    fn skip(self, count: u64) -> Self;

    fn take(self, count: u64) -> Self;

    fn count(&self) -> u64;
}

#[derive(Debug, Clone)]
pub struct MemoryQuery<T: 'static> {
    items: Vec<T>,
    keys: Vec<SortKey<T>>,
}

impl<T: Entity> MemoryQuery<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            keys: Vec::new(),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    fn sort(&mut self) {
        let keys = &self.keys;
        self.items.sort_by(|a, b| {
            keys.iter()
                .map(|key| key.compare(a, b))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        });
    }
}

impl<T: Entity> From<Vec<T>> for MemoryQuery<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

fn clamp(count: u64) -> usize {
    usize::try_from(count).unwrap_or(usize::MAX)
}

impl<T: Entity> Queryable for MemoryQuery<T> {
    type Item = T;

    fn filter(mut self, filter: &Filter<T>) -> Self {
        if !filter.is_always() {
            self.items.retain(|item| filter.matches(item));
        }
        self
    }

    fn order_by(mut self, key: SortKey<T>) -> Self {
        self.keys = vec![key];
        self.sort();
        self
    }

    fn then_by(mut self, key: SortKey<T>) -> Self {
        self.keys.push(key);
        self.sort();
        self
    }

    fn skip(mut self, count: u64) -> Self {
        let count = clamp(count).min(self.items.len());
        self.items.drain(..count);
        self
    }

    fn take(mut self, count: u64) -> Self {
        self.items.truncate(clamp(count));
        self
    }

    fn count(&self) -> u64 {
        self.items.len() as u64
    }
}
