//! Raw API shapes, as returned inside page envelopes.
//!
//! Every nested object is optional: the API omits them freely and the
//! normalizers treat a missing object as "leave the derived fields out".
//!
//! Entities come with `id`, with a prefixed key (`songId`, `countryId`, ...)
//! or with both. Both keys are kept as separate fields, the prefixed one wins.

use serde::{Deserialize, Serialize};

pub type SongId = i64;
pub type UserId = i64;

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawCountry {
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_id: Option<i64>,
    pub name: Option<String>,
    pub code: Option<String>,
}

impl RawCountry {
    pub fn resolved_id(&self) -> Option<i64> {
        self.country_id.or(self.id)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawGenre {
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl RawGenre {
    pub fn resolved_id(&self) -> Option<i64> {
        self.genre_id.or(self.id)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawTribe {
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tribe_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub country: Option<RawCountry>,
}

impl RawTribe {
    pub fn resolved_id(&self) -> Option<i64> {
        self.tribe_id.or(self.id)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawArtist {
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<i64>,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub country: Option<RawCountry>,
    pub tribe: Option<RawTribe>,
}

impl RawArtist {
    pub fn resolved_id(&self) -> Option<i64> {
        self.artist_id.or(self.id)
    }
}

/// A song. Decoding fails when neither `songId` nor `id` is present.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", try_from = "SongFields")]
pub struct RawSong {
    pub song_id: SongId,
    pub title: String,
    pub duration: Option<u32>,
    pub audio_url: Option<String>,
    pub cover_url: Option<String>,
    pub release_date: Option<String>,
    pub upvotes: Option<u64>,
    pub downvotes: Option<u64>,
    pub artist: Option<RawArtist>,
    pub genre: Option<RawGenre>,
    pub country: Option<RawCountry>,
    pub tribe: Option<RawTribe>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SongFields {
    song_id: Option<SongId>,
    id: Option<SongId>,
    #[serde(default)]
    title: String,
    duration: Option<u32>,
    audio_url: Option<String>,
    cover_url: Option<String>,
    release_date: Option<String>,
    upvotes: Option<u64>,
    downvotes: Option<u64>,
    artist: Option<RawArtist>,
    genre: Option<RawGenre>,
    country: Option<RawCountry>,
    tribe: Option<RawTribe>,
}

impl TryFrom<SongFields> for RawSong {
    type Error = String;

    fn try_from(fields: SongFields) -> Result<Self, Self::Error> {
        let song_id = fields
            .song_id
            .or(fields.id)
            .ok_or_else(|| "missing field `songId`".to_string())?;
        Ok(RawSong {
            song_id,
            title: fields.title,
            duration: fields.duration,
            audio_url: fields.audio_url,
            cover_url: fields.cover_url,
            release_date: fields.release_date,
            upvotes: fields.upvotes,
            downvotes: fields.downvotes,
            artist: fields.artist,
            genre: fields.genre,
            country: fields.country,
            tribe: fields.tribe,
        })
    }
}

/// A user. Decoding fails when neither `userId` nor `id` is present.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", try_from = "UserFields")]
pub struct RawUser {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: Option<String>,
    pub country: Option<RawCountry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserFields {
    id: Option<UserId>,
    user_id: Option<UserId>,
    #[serde(default)]
    username: String,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    role: Option<String>,
    avatar_url: Option<String>,
    created_at: Option<String>,
    country: Option<RawCountry>,
}

impl TryFrom<UserFields> for RawUser {
    type Error = String;

    fn try_from(fields: UserFields) -> Result<Self, Self::Error> {
        let id = fields
            .user_id
            .or(fields.id)
            .ok_or_else(|| "missing field `id`".to_string())?;
        Ok(RawUser {
            id,
            username: fields.username,
            email: fields.email,
            first_name: fields.first_name,
            last_name: fields.last_name,
            role: fields.role,
            avatar_url: fields.avatar_url,
            created_at: fields.created_at,
            country: fields.country,
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawFavorite {
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite_id: Option<i64>,
    pub created_at: Option<String>,
    pub song: Option<RawSong>,
}

impl RawFavorite {
    pub fn resolved_id(&self) -> Option<i64> {
        self.favorite_id.or(self.id)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawVoteSong {
    pub id: Option<SongId>,
    pub song_id: Option<SongId>,
}

impl RawVoteSong {
    pub fn resolved_id(&self) -> Option<SongId> {
        self.song_id.or(self.id)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawVote {
    pub id: Option<i64>,
    pub song_id: Option<SongId>,
    pub song: Option<RawVoteSong>,
    pub vote_type: Option<super::votes::VoteType>,
    /// Older endpoints send the vote as `type`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub legacy_type: Option<super::votes::VoteType>,
}
