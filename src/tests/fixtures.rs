use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::catalog::{Entity, FieldCatalog, FieldKind, Value};
use crate::chats::{Chat, ChatGroup, Seed};

pub const STATUSES: &[&str] = &["Active", "Pending", "Closed"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Active,
    Pending,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub score: Option<f64>,
    pub status: Status,
    pub joined: NaiveDate,
    pub active: bool,
    pub nickname: Option<String>,
}

static PERSON_FIELDS: Lazy<FieldCatalog<Person>> = Lazy::new(|| {
    FieldCatalog::new()
        .field("id", FieldKind::Int, |p: &Person| p.id.into())
        .field("name", FieldKind::String, |p: &Person| (&p.name).into())
        .field("age", FieldKind::Int, |p: &Person| p.age.into())
        .nullable("score", FieldKind::Float, |p: &Person| p.score.into())
        .field("status", FieldKind::Enum(STATUSES), |p: &Person| {
            Value::Enum(p.status as u32)
        })
        .field("joined", FieldKind::Date, |p: &Person| p.joined.into())
        .field("active", FieldKind::Bool, |p: &Person| p.active.into())
        .nullable("nickname", FieldKind::String, |p: &Person| {
            p.nickname.as_deref().into()
        })
});

impl Entity for Person {
    fn catalog() -> &'static FieldCatalog<Self> {
        &PERSON_FIELDS
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date")
}

#[allow(clippy::too_many_arguments)]
fn make_person(
    id: i64,
    name: &str,
    age: i64,
    score: Option<f64>,
    status: Status,
    joined: NaiveDate,
    active: bool,
    nickname: Option<&str>,
) -> Person {
    Person {
        id,
        name: name.to_string(),
        age,
        score,
        status,
        joined,
        active,
        nickname: nickname.map(str::to_string),
    }
}

pub fn people() -> Vec<Person> {
    vec![
        make_person(1, "Alice", 25, Some(4.5), Status::Active, date(2020, 1, 10), true, Some("Al")),
        make_person(2, "Bob", 35, None, Status::Pending, date(2021, 6, 1), false, None),
        make_person(3, "Carol", 19, Some(3.0), Status::Pending, date(2019, 3, 15), true, Some("Caz")),
        make_person(4, "Dave", 45, Some(2.0), Status::Closed, date(2022, 11, 30), true, None),
        make_person(5, "Eve", 30, Some(4.5), Status::Active, date(2023, 2, 1), false, Some("Evie")),
        make_person(6, "Frank", 17, Some(5.0), Status::Closed, date(2018, 7, 7), false, None),
    ]
}

/// People numbered 1..=count, named `person-N`, ages cycling through 20..30.
pub fn numbered(count: i64) -> Vec<Person> {
    (1..=count)
        .map(|id| Person {
            id,
            name: format!("person-{id}"),
            age: 20 + id % 10,
            ..Default::default()
        })
        .collect()
}

pub fn named(names: &[&str]) -> Vec<Person> {
    names
        .iter()
        .enumerate()
        .map(|(idx, name)| Person {
            id: idx as i64 + 1,
            name: name.to_string(),
            ..Default::default()
        })
        .collect()
}

fn at(day: u32, hour: u32) -> NaiveDateTime {
    date(2024, 3, day)
        .and_hms_opt(hour, 0, 0)
        .expect("valid fixture time")
}

fn chat(
    id: i64,
    chat_group_id: i64,
    user_id: i64,
    message: &str,
    day: u32,
    is_read: bool,
) -> Chat {
    Chat {
        id,
        chat_group_id,
        user_id,
        message: message.to_string(),
        created_at: at(day, 9),
        updated_at: at(day, 9),
        is_deleted: false,
        is_read,
    }
}

/// Two live groups and one deleted group. Group 1 holds four live chats and
/// one deleted chat; group 2 holds one chat.
pub fn chat_seed() -> Seed {
    let group = |id: i64, shift_id: i64, is_deleted: bool| ChatGroup {
        id,
        shift_id,
        admin_user_id: 1,
        mobile_user_id: 10 + id,
        web_user_id: 20 + id,
        created_at: at(1, 8),
        updated_at: at(1, 8),
        is_deleted,
    };

    let mut deleted = chat(5, 1, 11, "removed", 5, false);
    deleted.is_deleted = true;

    Seed {
        chat_groups: vec![group(1, 100, false), group(2, 200, false), group(3, 300, true)],
        chats: vec![
            chat(1, 1, 11, "shift starts at nine", 1, true),
            chat(2, 1, 1, "running late", 2, true),
            chat(3, 1, 11, "on my way", 3, false),
            chat(4, 1, 1, "see you there", 4, false),
            deleted,
            chat(6, 2, 12, "swap shifts?", 2, false),
        ],
    }
}
