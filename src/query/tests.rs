use super::{matches, parse, tokenize, Filter};
use crate::tests::fixtures::{named, people, Person};

fn ids(query: &str) -> Vec<i64> {
    let filter = parse::<Person>(query);
    people()
        .iter()
        .filter(|p| filter.matches(p))
        .map(|p| p.id)
        .collect()
}

fn names(query: &str, sample: &[&str]) -> Vec<String> {
    let filter = parse::<Person>(query);
    named(sample)
        .into_iter()
        .filter(|p| filter.matches(p))
        .map(|p| p.name)
        .collect()
}

const ALL: [i64; 6] = [1, 2, 3, 4, 5, 6];

// --- Identity ---

#[test]
fn test_empty_query_matches_everything() {
    assert!(parse::<Person>("").is_always());
    assert_eq!(ids(""), ALL);
    assert_eq!(ids("   "), ALL);
}

// --- Wildcards ---

const SAMPLE: [&str; 4] = ["foobar", "barfoo", "xfooy", "foo"];

#[test]
fn test_wildcard_contains() {
    assert_eq!(names("name=*foo*", &SAMPLE), SAMPLE);
}

#[test]
fn test_wildcard_ends_with() {
    assert_eq!(names("name=*foo", &SAMPLE), ["barfoo", "foo"]);
}

#[test]
fn test_wildcard_starts_with() {
    assert_eq!(names("name=foo*", &SAMPLE), ["foobar", "foo"]);
}

#[test]
fn test_exact_string() {
    assert_eq!(names("name=foo", &SAMPLE), ["foo"]);
    assert!(names("name=Foo", &SAMPLE).is_empty());
}

#[test]
fn test_string_values_or_together() {
    assert_eq!(names("name=foo,*y", &SAMPLE), ["xfooy", "foo"]);
}

#[test]
fn test_null_string_field_never_matches_pattern() {
    // Carol's nickname is the only one containing "a"; Bob/Dave/Frank have none
    assert_eq!(ids("nickname=*a*"), [3]);
    assert_eq!(ids("nickname=*"), [1, 3, 5]);
}

// --- Ranges and equality ---

#[test]
fn test_inclusive_range() {
    assert_eq!(ids("age=18~30"), [1, 3, 5]);
    assert_eq!(ids("age=19~19"), [3]);
}

#[test]
fn test_open_ranges() {
    assert_eq!(ids("age=~20"), [3, 6]);
    assert_eq!(ids("age=null~20"), [3, 6]);
    assert_eq!(ids("age=40~"), [4]);
    assert_eq!(ids("age=40~NULL"), [4]);
}

#[test]
fn test_range_and_equality_or_together() {
    assert_eq!(ids("age=17,40~50"), [4, 6]);
}

#[test]
fn test_malformed_range_value_ignored() {
    assert_eq!(ids("age=1~2~3,45"), [4]);
}

#[test]
fn test_nullable_numbers() {
    assert_eq!(ids("score=null"), [2]);
    assert_eq!(ids("score=3~"), [1, 3, 5, 6]);
    assert_eq!(ids("score=4.5,null"), [1, 2, 5]);
}

#[test]
fn test_bool_field() {
    assert_eq!(ids("active=true"), [1, 3, 4]);
    assert_eq!(ids("active=FALSE"), [2, 5, 6]);
}

#[test]
fn test_enum_field() {
    assert_eq!(ids("status=closed"), [4, 6]);
    assert_eq!(ids("status=1"), [2, 3]);
    assert_eq!(ids("status=pending~closed"), [2, 3, 4, 6]);
}

#[test]
fn test_date_range() {
    assert_eq!(ids("joined=2020-01-01~2021-12-31"), [1, 2]);
}

// --- Combination order ---

#[test]
fn test_values_after_last_assignment_belong_to_that_field() {
    // `pending` has no `=`, so it is a second status value
    assert_eq!(ids("age=18~30;status=active,pending"), [1, 3, 5]);
}

#[test]
fn test_and_then_or_left_to_right() {
    // (age in 18..=30 and active) or name = Bob
    assert_eq!(ids("age=18~30;status=active,name=Bob"), [1, 2, 5]);
}

#[test]
fn test_or_then_and_has_no_precedence() {
    // (name = Bob or age in 18..=30) and active; Bob is pending
    assert_eq!(ids("name=Bob,age=18~30;status=active"), [1, 5]);
}

#[test]
fn test_chunk_order_matches_manual_fold() {
    let query = "status=pending,age=45;active=true,name=Frank";
    let expected: Vec<i64> = people()
        .iter()
        .filter(|p| {
            let a = p.status == crate::tests::fixtures::Status::Pending;
            let b = p.age == 45;
            let c = p.active;
            let d = p.name == "Frank";
            ((a || b) && c) || d
        })
        .map(|p| p.id)
        .collect();
    assert_eq!(ids(query), expected);
    assert_eq!(expected, [3, 4, 6]);
}

// --- Tolerance ---

#[test]
fn test_unknown_field_is_ignored() {
    assert_eq!(ids("bogus=1"), ALL);
    assert_eq!(ids("bogus=1;age=45"), [4]);
}

#[test]
fn test_skipped_chunk_takes_its_combinator_with_it() {
    assert_eq!(ids("name=Bob;bogus=1,age=35"), [2]);
    assert_eq!(ids("name=Bob,bogus=1;age=45"), [2, 4]);
}

#[test]
fn test_uncoercible_value_drops_clause() {
    assert_eq!(ids("age=abc"), ALL);
    assert_eq!(ids("age=abc;name=Alice"), [1]);
    assert_eq!(ids("age=30,abc;name=Alice"), [1]);
    assert_eq!(ids("age=null"), ALL);
}

#[test]
fn test_range_on_bool_drops_clause() {
    assert_eq!(ids("active=true~false"), ALL);
}

#[test]
fn test_malformed_tail_keeps_parsed_prefix() {
    assert_eq!(ids("age=45;name=Bob=x"), [4]);
}

#[test]
fn test_field_names_case_insensitive() {
    assert_eq!(ids("AGE=45"), [4]);
    assert_eq!(ids("Name=*o*"), [2, 3]);
}

#[test]
fn test_parse_is_deterministic() {
    let query = "age=18~40;status=active,pending";
    assert_eq!(ids(query), ids(query));
    assert_eq!(tokenize(query), tokenize(query));
}

#[test]
fn test_matches_convenience() {
    let bob = people().remove(1);
    assert!(matches("name=B*", &bob));
    assert!(!matches("name=B*;age=~30", &bob));
}

#[test]
fn test_debug_output_names_fields() {
    let filter: Filter<Person> = parse("age=1~2,name=x");
    let rendered = format!("{filter:?}");
    assert!(rendered.contains("age"));
    assert!(rendered.contains("name"));
}
