use chrono::{NaiveDate, NaiveDateTime};
use std::{cmp::Ordering, collections::HashMap, fmt};

/// Semantic type of a queryable field. Drives coercion of filter tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Int,
    Float,
    Bool,
    DateTime,
    Date,
    /// Variant names in declaration order; values are compared by ordinal.
    Enum(&'static [&'static str]),
}

impl FieldKind {
    pub fn is_string(&self) -> bool {
        matches!(self, FieldKind::String)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::String => write!(f, "string"),
            FieldKind::Int => write!(f, "integer"),
            FieldKind::Float => write!(f, "float"),
            FieldKind::Bool => write!(f, "boolean"),
            FieldKind::DateTime => write!(f, "datetime"),
            FieldKind::Date => write!(f, "date"),
            FieldKind::Enum(_) => write!(f, "enum"),
        }
    }
}

/// A field value read from an entity, or a coerced filter operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Enum(u32),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::Enum(_) => 3,
            Value::Date(_) => 4,
            Value::DateTime(_) => 5,
            Value::String(_) => 6,
        }
    }

    /// Total order used for sorting: nulls first, then by value.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).total_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.total_cmp(&(*b as f64)),
            _ => self
                .partial_cmp(other)
                .unwrap_or_else(|| self.rank().cmp(&other.rank())),
        }
    }
}

impl PartialOrd for Value {
    /// Comparison between values of the same kind. Null compares to nothing,
    /// so range predicates never match a null field.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Bool(a), Value::Bool(b)) => a.partial_cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.partial_cmp(b),
            (Value::Date(a), Value::Date(b)) => a.partial_cmp(b),
            (Value::Enum(a), Value::Enum(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

pub type Getter<T> = fn(&T) -> Value;

/// One queryable/sortable field of an entity.
pub struct Field<T> {
    name: &'static str,
    kind: FieldKind,
    nullable: bool,
    get: Getter<T>,
}

impl<T> Field<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn read(&self, item: &T) -> Value {
        (self.get)(item)
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("nullable", &self.nullable)
            .finish()
    }
}

/// Per-entity table of queryable fields, keyed case-insensitively.
pub struct FieldCatalog<T> {
    fields: Vec<Field<T>>,
    by_name: HashMap<String, usize>,
}

impl<T> Default for FieldCatalog<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FieldCatalog<T> {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn field(self, name: &'static str, kind: FieldKind, get: Getter<T>) -> Self {
        self.insert(name, kind, false, get)
    }

    pub fn nullable(self, name: &'static str, kind: FieldKind, get: Getter<T>) -> Self {
        self.insert(name, kind, true, get)
    }

    fn insert(mut self, name: &'static str, kind: FieldKind, nullable: bool, get: Getter<T>) -> Self {
        let field = Field {
            name,
            kind,
            nullable,
            get,
        };
        match self.by_name.get(&name.to_lowercase()) {
            Some(&idx) => self.fields[idx] = field,
            None => {
                self.by_name.insert(name.to_lowercase(), self.fields.len());
                self.fields.push(field);
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Field<T>> {
        self.by_name
            .get(&name.trim().to_lowercase())
            .map(|&idx| &self.fields[idx])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field<T>> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A type that can be filtered, sorted and paged by field name.
///
/// Implementors keep their catalog in a `once_cell::sync::Lazy` static so it
/// is built once per type.
pub trait Entity: Sized + 'static {
    fn catalog() -> &'static FieldCatalog<Self>;
}
