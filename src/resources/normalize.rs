//! Flat records and the pure functions that produce them.

use serde::Serialize;

use super::models::*;

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SongRecord {
    pub song_id: SongId,
    pub title: String,
    pub duration_secs: Option<u32>,
    pub audio_url: Option<String>,
    pub cover_url: Option<String>,
    pub release_date: Option<String>,
    pub upvotes: u64,
    pub downvotes: u64,
    pub artist_id: Option<i64>,
    pub artist_name: Option<String>,
    pub genre_id: Option<i64>,
    pub genre_name: Option<String>,
    pub country_id: Option<i64>,
    pub country_name: Option<String>,
    pub tribe_id: Option<i64>,
    pub tribe_name: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArtistRecord {
    pub artist_id: Option<i64>,
    pub name: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub country_id: Option<i64>,
    pub country_name: Option<String>,
    pub tribe_id: Option<i64>,
    pub tribe_name: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenreRecord {
    pub genre_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TribeRecord {
    pub tribe_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub country_id: Option<i64>,
    pub country_name: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CountryRecord {
    pub country_id: Option<i64>,
    pub name: String,
    pub code: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub user_id: UserId,
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: Option<String>,
    pub country_id: Option<i64>,
    pub country_name: Option<String>,
}

/// A favorited song, flattened. `song` is `None` when the API omitted it.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteSongRecord {
    pub favorite_id: Option<i64>,
    pub favorited_at: Option<String>,
    #[serde(flatten)]
    pub song: Option<SongRecord>,
}

fn country_fields(country: Option<RawCountry>) -> (Option<i64>, Option<String>) {
    country.map(|c| (c.resolved_id(), c.name)).unwrap_or_default()
}

pub fn normalize_song(raw: RawSong) -> SongRecord {
    let (artist_id, artist_name) = raw
        .artist
        .map(|a| (a.resolved_id(), a.name))
        .unwrap_or_default();
    let (genre_id, genre_name) = raw
        .genre
        .map(|g| (g.resolved_id(), g.name))
        .unwrap_or_default();
    let (country_id, country_name) = country_fields(raw.country);
    let (tribe_id, tribe_name) = raw
        .tribe
        .map(|t| (t.resolved_id(), t.name))
        .unwrap_or_default();

    SongRecord {
        song_id: raw.song_id,
        title: raw.title,
        duration_secs: raw.duration,
        audio_url: raw.audio_url,
        cover_url: raw.cover_url,
        release_date: raw.release_date,
        upvotes: raw.upvotes.unwrap_or(0),
        downvotes: raw.downvotes.unwrap_or(0),
        artist_id,
        artist_name,
        genre_id,
        genre_name,
        country_id,
        country_name,
        tribe_id,
        tribe_name,
    }
}

pub fn normalize_artist(raw: RawArtist) -> ArtistRecord {
    let artist_id = raw.resolved_id();
    let (country_id, country_name) = country_fields(raw.country);
    let (tribe_id, tribe_name) = raw
        .tribe
        .map(|t| (t.resolved_id(), t.name))
        .unwrap_or_default();
    ArtistRecord {
        artist_id,
        name: raw.name.unwrap_or_default(),
        bio: raw.bio,
        image_url: raw.image_url,
        country_id,
        country_name,
        tribe_id,
        tribe_name,
    }
}

pub fn normalize_genre(raw: RawGenre) -> GenreRecord {
    GenreRecord {
        genre_id: raw.resolved_id(),
        name: raw.name.unwrap_or_default(),
        description: raw.description,
    }
}

pub fn normalize_tribe(raw: RawTribe) -> TribeRecord {
    let tribe_id = raw.resolved_id();
    let (country_id, country_name) = country_fields(raw.country);
    TribeRecord {
        tribe_id,
        name: raw.name.unwrap_or_default(),
        description: raw.description,
        country_id,
        country_name,
    }
}

pub fn normalize_country(raw: RawCountry) -> CountryRecord {
    CountryRecord {
        country_id: raw.resolved_id(),
        name: raw.name.unwrap_or_default(),
        code: raw.code,
    }
}

pub fn normalize_user(raw: RawUser) -> UserRecord {
    let full_name = match (raw.first_name, raw.last_name) {
        (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
        (Some(name), None) | (None, Some(name)) => Some(name),
        (None, None) => None,
    };
    let (country_id, country_name) = country_fields(raw.country);

    UserRecord {
        user_id: raw.id,
        username: raw.username,
        email: raw.email,
        full_name,
        role: raw.role,
        avatar_url: raw.avatar_url,
        created_at: raw.created_at,
        country_id,
        country_name,
    }
}

pub fn normalize_favorite(raw: RawFavorite) -> FavoriteSongRecord {
    FavoriteSongRecord {
        favorite_id: raw.resolved_id(),
        favorited_at: raw.created_at,
        song: raw.song.map(normalize_song),
    }
}
