//! HTTP client for the catalog API.
//!
//! Read access goes through paginated fetch sessions, one per resource.
//! Writes are plain JSON requests.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::paths;
use super::payloads::*;
use crate::comments::CommentRecord;
use crate::fetcher::{
    build_headers, read_json, EndpointConfig, EnvelopeShape, FetchError, FetchSession,
    FetchSettings, HttpPageSource, PagedFetcher, ProgressStream,
};
use crate::resources::*;

#[derive(Clone, Debug, Default)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., "http://localhost:8080")
    pub base_url: String,
    pub auth_token: Option<String>,
    pub headers: BTreeMap<String, String>,
    /// Sent with every paginated request.
    pub query_params: BTreeMap<String, String>,
    pub settings: FetchSettings,
    /// Request timeout. None leaves requests unbounded.
    pub timeout: Option<Duration>,
}

/// Client for the catalog API.
#[derive(Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: String,
    auth_token: Option<String>,
    headers: BTreeMap<String, String>,
    query_params: BTreeMap<String, String>,
    settings: FetchSettings,
}

impl CatalogClient {
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        if config.settings.page_size == 0 || config.settings.max_concurrent_requests == 0 {
            return Err(FetchError::InvalidConfig(
                "page_size and max_concurrent_requests must be greater than 0".to_string(),
            ));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        // Validate headers up front rather than on the first request
        build_headers(&config.headers, config.auth_token.as_deref())?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
            headers: config.headers.clone(),
            query_params: config.query_params.clone(),
            settings: config.settings,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn settings(&self) -> FetchSettings {
        self.settings
    }

    /// Returns a client that sends `token` as bearer token.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // =========================================================================
    // Paginated reads
    // =========================================================================

    /// Builds a fetcher for the paginated collection at `path`.
    pub fn fetcher(&self, path: &str) -> Result<PagedFetcher, FetchError> {
        let endpoint = EndpointConfig {
            url: self.url(path),
            headers: self.headers.clone(),
            query_params: self.query_params.clone(),
            auth_token: self.auth_token.clone(),
        };
        let source = HttpPageSource::with_client(self.http.clone(), &endpoint)?;
        Ok(PagedFetcher::new(Arc::new(source), self.settings))
    }

    /// Starts a fetch session for resource `R` at `path`.
    pub fn session<R: Resource>(
        &self,
        path: &str,
    ) -> Result<(FetchSession<R>, ProgressStream), FetchError> {
        Ok(self.fetcher(path)?.start_session::<R>())
    }

    pub fn songs(&self) -> Result<(FetchSession<Songs>, ProgressStream), FetchError> {
        self.session(paths::SONGS)
    }

    pub fn artists(&self) -> Result<(FetchSession<Artists>, ProgressStream), FetchError> {
        self.session(paths::ARTISTS)
    }

    pub fn genres(&self) -> Result<(FetchSession<Genres>, ProgressStream), FetchError> {
        self.session(paths::GENRES)
    }

    pub fn tribes(&self) -> Result<(FetchSession<Tribes>, ProgressStream), FetchError> {
        self.session(paths::TRIBES)
    }

    pub fn countries(&self) -> Result<(FetchSession<Countries>, ProgressStream), FetchError> {
        self.session(paths::COUNTRIES)
    }

    pub fn users(&self) -> Result<(FetchSession<Users>, ProgressStream), FetchError> {
        self.session(paths::USERS)
    }

    pub fn comments(&self) -> Result<(FetchSession<Comments>, ProgressStream), FetchError> {
        self.session(paths::COMMENTS)
    }

    pub fn votes_by_user(
        &self,
        user_id: UserId,
    ) -> Result<(FetchSession<Votes>, ProgressStream), FetchError> {
        self.session(&paths::votes_by_user(user_id))
    }

    pub fn favorites_by_user(
        &self,
        user_id: UserId,
    ) -> Result<(FetchSession<FavoriteSongs>, ProgressStream), FetchError> {
        self.session(&paths::favorites_by_user(user_id))
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Exchanges credentials for a bearer token. The token is returned, not stored.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String, FetchError> {
        let response: LoginResponse = self
            .send_json(
                Method::POST,
                paths::AUTH_LOGIN,
                Some(&LoginRequest { username, password }),
            )
            .await?;
        Ok(response.token)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<(), FetchError> {
        self.send(Method::POST, paths::AUTH_REGISTER, Some(request))
            .await
            .map(|_| ())
    }

    // =========================================================================
    // Catalog writes
    // =========================================================================

    pub async fn create_song(&self, song: &SongPayload) -> Result<SongRecord, FetchError> {
        let raw: RawSong = self.send_json(Method::POST, paths::SONGS, Some(song)).await?;
        Ok(normalize_song(raw))
    }

    pub async fn update_song(&self, id: SongId, song: &SongPayload) -> Result<SongRecord, FetchError> {
        let path = format!("{}/{}", paths::SONGS, id);
        let raw: RawSong = self.send_json(Method::PUT, &path, Some(song)).await?;
        Ok(normalize_song(raw))
    }

    pub async fn create_artist(&self, artist: &ArtistPayload) -> Result<ArtistRecord, FetchError> {
        let raw: RawArtist = self.send_json(Method::POST, paths::ARTISTS, Some(artist)).await?;
        Ok(normalize_artist(raw))
    }

    pub async fn update_artist(
        &self,
        id: i64,
        artist: &ArtistPayload,
    ) -> Result<ArtistRecord, FetchError> {
        let path = format!("{}/{}", paths::ARTISTS, id);
        let raw: RawArtist = self.send_json(Method::PUT, &path, Some(artist)).await?;
        Ok(normalize_artist(raw))
    }

    pub async fn create_genre(&self, genre: &NamedPayload) -> Result<GenreRecord, FetchError> {
        let raw: RawGenre = self.send_json(Method::POST, paths::GENRES, Some(genre)).await?;
        Ok(normalize_genre(raw))
    }

    pub async fn update_genre(&self, id: i64, genre: &NamedPayload) -> Result<GenreRecord, FetchError> {
        let path = format!("{}/{}", paths::GENRES, id);
        let raw: RawGenre = self.send_json(Method::PUT, &path, Some(genre)).await?;
        Ok(normalize_genre(raw))
    }

    pub async fn create_tribe(&self, tribe: &NamedPayload) -> Result<TribeRecord, FetchError> {
        let raw: RawTribe = self.send_json(Method::POST, paths::TRIBES, Some(tribe)).await?;
        Ok(normalize_tribe(raw))
    }

    pub async fn update_tribe(&self, id: i64, tribe: &NamedPayload) -> Result<TribeRecord, FetchError> {
        let path = format!("{}/{}", paths::TRIBES, id);
        let raw: RawTribe = self.send_json(Method::PUT, &path, Some(tribe)).await?;
        Ok(normalize_tribe(raw))
    }

    pub async fn create_country(&self, country: &NamedPayload) -> Result<CountryRecord, FetchError> {
        let raw: RawCountry = self.send_json(Method::POST, paths::COUNTRIES, Some(country)).await?;
        Ok(normalize_country(raw))
    }

    pub async fn update_country(
        &self,
        id: i64,
        country: &NamedPayload,
    ) -> Result<CountryRecord, FetchError> {
        let path = format!("{}/{}", paths::COUNTRIES, id);
        let raw: RawCountry = self.send_json(Method::PUT, &path, Some(country)).await?;
        Ok(normalize_country(raw))
    }

    // =========================================================================
    // User interactions
    // =========================================================================

    pub async fn cast_vote(&self, song_id: SongId, vote_type: VoteType) -> Result<(), FetchError> {
        let body = VoteRequest { song_id, vote_type };
        self.send(Method::POST, paths::VOTES, Some(&body)).await.map(|_| ())
    }

    pub async fn remove_vote(&self, song_id: SongId) -> Result<(), FetchError> {
        let path = format!("{}/{}", paths::VOTES, song_id);
        self.send::<()>(Method::DELETE, &path, None).await.map(|_| ())
    }

    pub async fn post_comment(&self, song_id: SongId, content: &str) -> Result<CommentRecord, FetchError> {
        let body = CommentRequest { song_id, content };
        self.send_json(Method::POST, paths::COMMENTS, Some(&body)).await
    }

    /// Toggles the favorite flag of `song_id`, returning the new state.
    pub async fn toggle_favorite(&self, song_id: SongId) -> Result<bool, FetchError> {
        let path = format!("{}/{}/toggle", paths::FAVORITES, song_id);
        let response: FavoriteToggleResponse = self.send_json::<(), _>(Method::POST, &path, None).await?;
        Ok(response.favorite)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Sends a request and returns the (unwrapped) JSON response.
    ///
    /// Responses wrapped as `{responseCode|code, message, data|body}` are
    /// checked for an embedded error code and unwrapped.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, FetchError> {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let headers = build_headers(&self.headers, self.auth_token.as_deref())?;
        let mut request = self.http.request(method, &url).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        let value = read_json(request.send().await?).await?;
        unwrap_write_response(value)
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, FetchError> {
        let value = self.send(method, path, body).await?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Write endpoints answer with a bare entity or with one of the page
/// wrappers. A wrapper without payload reads as `null`.
fn unwrap_write_response(value: Value) -> Result<Value, FetchError> {
    let shape = EnvelopeShape::detect(&value);
    Ok(shape.payload(value)?.unwrap_or(Value::Null))
}
