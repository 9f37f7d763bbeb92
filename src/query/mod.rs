mod coerce;
mod eval;
mod filter;
mod lexer;

use crate::catalog::Entity;

pub use coerce::{coerce, NULL};
pub use eval::eval;
pub use filter::{build, Filter, TextMatch};
pub use lexer::{
    tokenize, Chunk, Combinator, ASSIGNMENT_SEPARATOR, FIELD_SEPARATOR, RANGE_SEPARATOR,
    STRING_LIKE_INDICATOR, VALUE_SEPARATOR,
};

/// Tolerant parse of a filter string into a predicate over `T`.
///
/// Never fails:
/// - Empty/whitespace input → matches everything
/// - Unknown fields → clause skipped
/// - Values that do not coerce to the field's type → clause skipped
/// - Malformed tail (`a=1;b=2x=3`) → everything before it still applies
pub fn parse<T: Entity>(input: &str) -> Filter<T> {
    let chunks = lexer::tokenize(input);
    filter::build(&chunks)
}

/// Convenience: parse + evaluate in one call.
pub fn matches<T: Entity>(query: &str, item: &T) -> bool {
    eval(&parse::<T>(query), item)
}

#[cfg(test)]
mod tests;
