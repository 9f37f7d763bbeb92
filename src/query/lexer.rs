pub const ASSIGNMENT_SEPARATOR: char = '=';
pub const FIELD_SEPARATOR: char = ';';
pub const VALUE_SEPARATOR: char = ',';
pub const RANGE_SEPARATOR: char = '~';
pub const STRING_LIKE_INDICATOR: char = '*';

const SEPARATORS: [char; 2] = [FIELD_SEPARATOR, VALUE_SEPARATOR];

/// How a chunk joins the one after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
    End,
}

impl Combinator {
    fn from_separator(sep: char) -> Self {
        match sep {
            FIELD_SEPARATOR => Combinator::And,
            _ => Combinator::Or,
        }
    }
}

/// One `field=values` clause of a filter string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub field: String,
    pub values: Vec<String>,
    pub next: Combinator,
}

/// Split a filter string into chunks, left to right.
///
/// A chunk's values run up to the last separator before the next `=`; that
/// separator is its combinator and the text after it names the next field.
/// Malformed input stops tokenization and keeps what was read so far.
pub fn tokenize(input: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut rest = input.trim();

    while !rest.is_empty() {
        let Some(eq) = rest.find(ASSIGNMENT_SEPARATOR) else {
            log::debug!("query: no assignment in {rest:?}, stopping");
            break;
        };

        let field = rest[..eq].trim();
        if field.is_empty() {
            log::debug!("query: empty field name in {rest:?}, stopping");
            break;
        }

        let after = &rest[eq + ASSIGNMENT_SEPARATOR.len_utf8()..];
        let (raw_values, next, remaining) = match after.find(ASSIGNMENT_SEPARATOR) {
            None => (after.trim_end_matches(SEPARATORS), Combinator::End, ""),
            Some(next_eq) => match after[..next_eq].rfind(SEPARATORS) {
                Some(sep) if sep > 0 => {
                    let sep_char = after[sep..].chars().next().unwrap_or(FIELD_SEPARATOR);
                    (
                        &after[..sep],
                        Combinator::from_separator(sep_char),
                        &after[sep + sep_char.len_utf8()..],
                    )
                }
                _ => {
                    log::debug!("query: malformed chunk for field {field:?}, stopping");
                    break;
                }
            },
        };

        if raw_values.is_empty() {
            log::debug!("query: field {field:?} has no values, stopping");
            break;
        }

        chunks.push(Chunk {
            field: field.to_string(),
            values: split_values(raw_values),
            next,
        });
        rest = remaining;
    }

    chunks
}

fn split_values(raw: &str) -> Vec<String> {
    raw.split(VALUE_SEPARATOR)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(field: &str, values: &[&str], next: Combinator) -> Chunk {
        Chunk {
            field: field.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
            next,
        }
    }

    #[test]
    fn test_single_chunk() {
        assert_eq!(tokenize("id=1"), vec![chunk("id", &["1"], Combinator::End)]);
    }

    #[test]
    fn test_values_and_combinators() {
        assert_eq!(
            tokenize("a=1,2;b=3~4,5,c=x"),
            vec![
                chunk("a", &["1", "2"], Combinator::And),
                chunk("b", &["3~4", "5"], Combinator::Or),
                chunk("c", &["x"], Combinator::End),
            ]
        );
    }

    #[test]
    fn test_trailing_value_list_belongs_to_last_field() {
        assert_eq!(
            tokenize("age=18~30;status=active,pending"),
            vec![
                chunk("age", &["18~30"], Combinator::And),
                chunk("status", &["active", "pending"], Combinator::End),
            ]
        );
    }

    #[test]
    fn test_trailing_separators_trimmed() {
        assert_eq!(tokenize("a=1;"), vec![chunk("a", &["1"], Combinator::End)]);
        assert_eq!(tokenize("a=1,2,"), vec![chunk("a", &["1", "2"], Combinator::End)]);
    }

    #[test]
    fn test_empty_values_removed() {
        assert_eq!(
            tokenize("a=1,,2;b=3"),
            vec![
                chunk("a", &["1", "2"], Combinator::And),
                chunk("b", &["3"], Combinator::End),
            ]
        );
    }

    #[test]
    fn test_malformed_stops_but_keeps_prefix() {
        assert_eq!(tokenize("a=1;b=2x=3"), vec![chunk("a", &["1"], Combinator::And)]);
        assert_eq!(tokenize("a=1;=2"), vec![chunk("a", &["1"], Combinator::And)]);
        assert!(tokenize("=1").is_empty());
        assert!(tokenize("nonsense").is_empty());
        assert!(tokenize("a=;b=2").is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_field_names_trimmed() {
        assert_eq!(tokenize(" id =1"), vec![chunk("id", &["1"], Combinator::End)]);
    }
}
