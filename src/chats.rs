use chrono::{NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{
    io::ErrorKind,
    path::Path,
    sync::{Arc, RwLock},
    time::Instant,
};

use crate::{
    catalog::{Entity, FieldCatalog, FieldKind},
    errors::AppError,
    patch::{max_chars, not_blank, PatchMap, PatchRequest, PatchSchema, PatchValidator, ValidatedPatch},
};

pub const MESSAGE_MAX_CHARS: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: i64,
    pub chat_group_id: i64,
    pub user_id: i64,
    pub message: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub is_read: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatGroup {
    pub id: i64,
    pub shift_id: i64,
    pub admin_user_id: i64,
    pub mobile_user_id: i64,
    pub web_user_id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(default)]
    pub is_deleted: bool,
}

static CHAT_FIELDS: Lazy<FieldCatalog<Chat>> = Lazy::new(|| {
    FieldCatalog::new()
        .field("id", FieldKind::Int, |c: &Chat| c.id.into())
        .field("chatGroupId", FieldKind::Int, |c: &Chat| c.chat_group_id.into())
        .field("userId", FieldKind::Int, |c: &Chat| c.user_id.into())
        .field("message", FieldKind::String, |c: &Chat| (&c.message).into())
        .field("createdAt", FieldKind::DateTime, |c: &Chat| c.created_at.into())
        .field("updatedAt", FieldKind::DateTime, |c: &Chat| c.updated_at.into())
        .field("isDeleted", FieldKind::Bool, |c: &Chat| c.is_deleted.into())
        .field("isRead", FieldKind::Bool, |c: &Chat| c.is_read.into())
});

static CHAT_GROUP_FIELDS: Lazy<FieldCatalog<ChatGroup>> = Lazy::new(|| {
    FieldCatalog::new()
        .field("id", FieldKind::Int, |g: &ChatGroup| g.id.into())
        .field("shiftId", FieldKind::Int, |g: &ChatGroup| g.shift_id.into())
        .field("adminUserId", FieldKind::Int, |g: &ChatGroup| {
            g.admin_user_id.into()
        })
        .field("mobileUserId", FieldKind::Int, |g: &ChatGroup| {
            g.mobile_user_id.into()
        })
        .field("webUserId", FieldKind::Int, |g: &ChatGroup| g.web_user_id.into())
        .field("createdAt", FieldKind::DateTime, |g: &ChatGroup| {
            g.created_at.into()
        })
        .field("updatedAt", FieldKind::DateTime, |g: &ChatGroup| {
            g.updated_at.into()
        })
        .field("isDeleted", FieldKind::Bool, |g: &ChatGroup| g.is_deleted.into())
});

impl Entity for Chat {
    fn catalog() -> &'static FieldCatalog<Self> {
        &CHAT_FIELDS
    }
}

impl Entity for ChatGroup {
    fn catalog() -> &'static FieldCatalog<Self> {
        &CHAT_GROUP_FIELDS
    }
}

/// Partial update of a chat. Only the keys present in the body are applied.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatPatchRequest {
    pub is_read: bool,
    pub message: Option<String>,
}

impl PatchRequest for ChatPatchRequest {
    type Target = Chat;
}

pub fn chat_patch_schema() -> PatchSchema<ChatPatchRequest> {
    let validator = PatchValidator::new()
        .when_bound("message", |r: &ChatPatchRequest| {
            not_blank(r.message.as_deref())
        })
        .when_bound("message", |r: &ChatPatchRequest| {
            max_chars(r.message.as_deref(), MESSAGE_MAX_CHARS)
        });

    let map = PatchMap::new()
        .assign(
            "isRead",
            |r: &ChatPatchRequest| r.is_read,
            |c: &mut Chat, is_read| c.is_read = is_read,
        )
        .map("message", |r: &ChatPatchRequest, c: &mut Chat| {
            if let Some(message) = &r.message {
                c.message = message.clone();
            }
        });

    PatchSchema::new(validator, map)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Seed {
    pub chat_groups: Vec<ChatGroup>,
    pub chats: Vec<Chat>,
}

pub trait ChatRepository: Send + Sync {
    /// Chat groups that are not deleted.
    fn chat_groups(&self) -> Vec<ChatGroup>;
    /// Chats of a live group that are not deleted.
    fn chats(&self, chat_group_id: i64) -> Result<Vec<Chat>, AppError>;
    fn patch_chat(
        &self,
        chat_group_id: i64,
        chat_id: i64,
        patch: &ValidatedPatch<ChatPatchRequest>,
    ) -> Result<Chat, AppError>;
}

/// In-memory chat data, optionally seeded from a JSON file.
#[derive(Debug, Clone, Default)]
pub struct ChatStore {
    groups: Arc<RwLock<Vec<ChatGroup>>>,
    chats: Arc<RwLock<Vec<Chat>>>,
}

impl ChatStore {
    pub fn new(seed: Seed) -> Self {
        Self {
            groups: Arc::new(RwLock::new(seed.chat_groups)),
            chats: Arc::new(RwLock::new(seed.chats)),
        }
    }

    /// A missing file yields an empty store.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let now = Instant::now();
        let seed: Seed = match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::warn!("seed file {} not found, starting empty", path.display());
                Seed::default()
            }
            Err(err) => Err(err)?,
        };

        log::info!(
            "loaded {} chat groups and {} chats in {}ms",
            seed.chat_groups.len(),
            seed.chats.len(),
            now.elapsed().as_micros() as f64 / 1000.0
        );

        Ok(Self::new(seed))
    }

    fn group_exists(&self, chat_group_id: i64) -> bool {
        self.groups
            .read()
            .unwrap()
            .iter()
            .any(|g| g.id == chat_group_id && !g.is_deleted)
    }
}

impl ChatRepository for ChatStore {
    fn chat_groups(&self) -> Vec<ChatGroup> {
        self.groups
            .read()
            .unwrap()
            .iter()
            .filter(|g| !g.is_deleted)
            .cloned()
            .collect()
    }

    fn chats(&self, chat_group_id: i64) -> Result<Vec<Chat>, AppError> {
        if !self.group_exists(chat_group_id) {
            return Err(AppError::NotFound(format!("chat group {chat_group_id}")));
        }

        Ok(self
            .chats
            .read()
            .unwrap()
            .iter()
            .filter(|c| c.chat_group_id == chat_group_id && !c.is_deleted)
            .cloned()
            .collect())
    }

    fn patch_chat(
        &self,
        chat_group_id: i64,
        chat_id: i64,
        patch: &ValidatedPatch<ChatPatchRequest>,
    ) -> Result<Chat, AppError> {
        if !self.group_exists(chat_group_id) {
            return Err(AppError::NotFound(format!("chat group {chat_group_id}")));
        }

        let mut chats = self.chats.write().unwrap();
        let chat = chats
            .iter_mut()
            .find(|c| c.id == chat_id && c.chat_group_id == chat_group_id && !c.is_deleted)
            .ok_or_else(|| AppError::NotFound(format!("chat {chat_id}")))?;

        let applied = patch.apply(chat);
        if !applied.is_empty() {
            chat.updated_at = Utc::now().naive_utc();
            log::info!("chat {chat_id}: patched {}", applied.join(", "));
        }

        Ok(chat.clone())
    }
}
