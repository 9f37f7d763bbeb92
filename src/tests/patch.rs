use serde::Deserialize;

use crate::errors::PatchError;
use crate::patch::{
    not_blank, read_bound_fields, PatchMap, PatchPayload, PatchRegistry, PatchRequest,
    PatchSchema, PatchValidator,
};
use crate::tests::fixtures::{people, Person};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProfilePatch {
    name: Option<String>,
    age: i64,
    nickname: Option<String>,
}

impl PatchRequest for ProfilePatch {
    type Target = Person;
}

#[derive(Debug, Deserialize)]
struct NeverRegistered {}

impl PatchRequest for NeverRegistered {
    type Target = Person;
}

fn profile_schema() -> PatchSchema<ProfilePatch> {
    let validator = PatchValidator::new()
        .when_bound("name", |r: &ProfilePatch| not_blank(r.name.as_deref()))
        .when_bound("age", |r: &ProfilePatch| {
            if (0..=150).contains(&r.age) {
                Ok(())
            } else {
                Err("must be between 0 and 150".to_string())
            }
        });

    // nickname is unmapped
    let map = PatchMap::new()
        .map("name", |r: &ProfilePatch, p: &mut Person| {
            if let Some(name) = &r.name {
                p.name = name.clone();
            }
        })
        .assign("age", |r: &ProfilePatch| r.age, |p: &mut Person, age| p.age = age);

    PatchSchema::new(validator, map)
}

fn registry() -> PatchRegistry {
    PatchRegistry::new().register(profile_schema())
}

fn alice() -> Person {
    people().remove(0)
}

// --- Binding ---

#[test]
fn test_bound_fields_are_top_level_keys() {
    let bound = read_bound_fields(r#"{"isRead": false, "Message": null, "meta": {"x": 1}}"#)
        .unwrap();
    assert_eq!(bound.len(), 3);
    assert!(bound.contains("isread"));
    assert!(bound.contains("message"));
    assert!(bound.contains("META"));
    assert!(!bound.contains("x"));
}

#[test]
fn test_bound_fields_empty_object() {
    assert!(read_bound_fields("{}").unwrap().is_empty());
}

#[test]
fn test_bound_fields_rejects_non_object() {
    assert!(matches!(
        read_bound_fields("[1, 2]"),
        Err(PatchError::NotAnObject)
    ));
    assert!(matches!(
        read_bound_fields("{"),
        Err(PatchError::Malformed(_))
    ));
}

#[test]
fn test_payload_keeps_request_and_bound() {
    let payload = PatchPayload::<ProfilePatch>::from_json(r#"{"age": 0}"#).unwrap();
    assert!(payload.is_bound("age"));
    assert!(!payload.is_bound("name"));
    assert_eq!(payload.request.age, 0);
}

#[test]
fn test_payload_type_mismatch_is_malformed() {
    let err = PatchPayload::<ProfilePatch>::from_json(r#"{"age": "old"}"#).unwrap_err();
    assert!(matches!(err, PatchError::Malformed(_)));
}

// --- Presence gates mutation ---

#[test]
fn test_zero_value_applies_when_bound() {
    let patch = registry().accept::<ProfilePatch>(r#"{"age": 0}"#).unwrap();
    let mut person = alice();
    let applied = patch.apply(&mut person);

    assert_eq!(applied, ["age"]);
    assert_eq!(person.age, 0);
    assert_eq!(person.name, "Alice");
}

#[test]
fn test_empty_body_changes_nothing() {
    let patch = registry().accept::<ProfilePatch>("{}").unwrap();
    let mut person = alice();
    let applied = patch.apply(&mut person);

    assert!(applied.is_empty());
    assert_eq!(person, alice());
}

#[test]
fn test_bound_but_unmapped_is_ignored() {
    let patch = registry()
        .accept::<ProfilePatch>(r#"{"nickname": "Ally"}"#)
        .unwrap();
    let mut person = alice();

    assert!(patch.apply(&mut person).is_empty());
    assert_eq!(person.nickname.as_deref(), Some("Al"));
}

#[test]
fn test_keys_match_case_insensitively() {
    let patch = registry()
        .accept::<ProfilePatch>(r#"{"AGE": 3, "Name": "Zed"}"#)
        .unwrap();
    assert_eq!(patch.request().age, 3);

    let mut person = alice();
    let applied = patch.apply(&mut person);
    assert_eq!(applied, ["name", "age"]);
    assert_eq!(person.age, 3);
    assert_eq!(person.name, "Zed");
}

#[test]
fn test_differently_cased_key_is_validated() {
    let err = registry()
        .accept_value::<ProfilePatch>(serde_json::json!({"Age": 200}))
        .unwrap_err();
    assert!(matches!(err, PatchError::Validation(ref errors) if errors.len() == 1));
}

#[test]
fn test_exact_case_key_wins() {
    let patch = registry()
        .accept::<ProfilePatch>(r#"{"age": 40, "AGE": 3}"#)
        .unwrap();
    let mut person = alice();
    patch.apply(&mut person);
    assert_eq!(person.age, 40);
}

#[test]
fn test_schema_field_names() {
    assert_eq!(profile_schema().field_names(), ["name", "age"]);
}

#[test]
fn test_apply_to_several_targets() {
    let patch = registry()
        .accept::<ProfilePatch>(r#"{"name": "Zed"}"#)
        .unwrap();
    let mut everyone = people();
    for person in everyone.iter_mut() {
        patch.apply(person);
    }
    assert!(everyone.iter().all(|p| p.name == "Zed"));
    assert_eq!(everyone[1].age, 35);
}

// --- Validation ---

#[test]
fn test_rules_run_only_for_bound_fields() {
    // age defaults to 0 and name to None, both fine since unbound
    let patch = registry().accept::<ProfilePatch>(r#"{"nickname": null}"#);
    assert!(patch.is_ok());

    // an out-of-range age is only checked once sent
    let err = registry()
        .accept::<ProfilePatch>(r#"{"age": 200}"#)
        .unwrap_err();
    let errors = match err {
        PatchError::Validation(errors) => errors,
        other => panic!("expected validation error, got {other:?}"),
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors.for_field("age").collect::<Vec<_>>(),
        ["must be between 0 and 150"]
    );
}

#[test]
fn test_all_failures_reported() {
    let err = registry()
        .accept::<ProfilePatch>(r#"{"name": "  ", "age": -1}"#)
        .unwrap_err();
    let errors = match err {
        PatchError::Validation(errors) => errors,
        other => panic!("expected validation error, got {other:?}"),
    };

    assert_eq!(errors.len(), 2);
    assert_eq!(errors.for_field("name").count(), 1);
    assert_eq!(errors.for_field("age").count(), 1);
    assert_eq!(
        errors.to_string(),
        "name : must not be empty\nage : must be between 0 and 150"
    );
}

#[test]
fn test_null_for_bound_optional_fails_its_rule() {
    let err = registry()
        .accept::<ProfilePatch>(r#"{"name": null}"#)
        .unwrap_err();
    assert!(matches!(err, PatchError::Validation(ref errors) if errors.len() == 1));
}

// --- Mapping table ---

#[test]
fn test_last_mapping_wins() {
    let map: PatchMap<ProfilePatch, Person> = PatchMap::new()
        .map("name", |_, p: &mut Person| p.name = "first".to_string())
        .map("NAME", |_, p: &mut Person| p.name = "second".to_string());
    assert_eq!(map.len(), 1);

    let payload = PatchPayload::<ProfilePatch>::from_json(r#"{"name": "x"}"#).unwrap();
    let mut person = alice();
    map.apply(&payload.bound, &payload.request, &mut person);
    assert_eq!(person.name, "second");
}

// --- Registry ---

#[test]
fn test_unregistered_type_is_configuration_error() {
    let registry = registry();
    assert!(registry.require::<ProfilePatch>().is_ok());
    assert!(matches!(
        registry.require::<NeverRegistered>(),
        Err(PatchError::Configuration(_))
    ));
    assert!(matches!(
        registry.accept::<NeverRegistered>("{}"),
        Err(PatchError::Configuration(_))
    ));
}

#[test]
fn test_configuration_checked_before_body() {
    let err = PatchRegistry::new()
        .accept::<ProfilePatch>("not json")
        .unwrap_err();
    assert!(matches!(err, PatchError::Configuration(_)));
}

#[test]
fn test_accept_value() {
    let patch = registry()
        .accept_value::<ProfilePatch>(serde_json::json!({"age": 7}))
        .unwrap();
    assert!(patch.is_bound("age"));
    assert_eq!(patch.request().age, 7);
}
