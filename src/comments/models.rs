use serde::{Deserialize, Serialize};

use crate::resources::{SongId, UserId};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    pub avatar_url: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SongRef {
    pub song_id: SongId,
    #[serde(default)]
    pub title: String,
}

/// A comment on a song. The API shape is already flat enough to be used as is.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    pub id: i64,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: String,
    pub user: UserRef,
    pub song: SongRef,
}

pub fn normalize_comment(raw: CommentRecord) -> CommentRecord {
    CommentRecord {
        content: raw.content.trim().to_string(),
        ..raw
    }
}
