//! Client for the catalog REST API.

mod client;
mod payloads;

pub use client::{CatalogClient, ClientConfig};
pub use payloads::*;

/// Endpoint paths, relative to the API base URL.
pub mod paths {
    use crate::resources::UserId;

    pub const SONGS: &str = "/api/songs";
    pub const ARTISTS: &str = "/api/artists";
    pub const GENRES: &str = "/api/genres";
    pub const TRIBES: &str = "/api/tribes";
    pub const COUNTRIES: &str = "/api/countries";
    pub const USERS: &str = "/api/users";
    pub const COMMENTS: &str = "/api/comments";
    pub const VOTES: &str = "/api/votes";
    pub const FAVORITES: &str = "/api/favorites";
    pub const AUTH_LOGIN: &str = "/api/auth/login";
    pub const AUTH_REGISTER: &str = "/api/auth/register";

    pub fn votes_by_user(user_id: UserId) -> String {
        format!("{}/user/{}", VOTES, user_id)
    }

    pub fn favorites_by_user(user_id: UserId) -> String {
        format!("{}/user/{}", FAVORITES, user_id)
    }
}
