//! Mock catalog API lifecycle management
//!
//! Each test spawns its own `MockApi` on a random port. Collections are
//! registered per path and served as paginated envelopes; every request is
//! recorded so tests can assert on what the client actually sent.

use super::constants::*;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// How a collection wraps its page objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wrapper {
    Plain,
    /// `{responseCode, message, data}`
    Data,
    /// `{code, message, body}`
    Body,
}

/// A paginated collection served at one path.
#[derive(Clone, Debug)]
pub struct Collection {
    items: Vec<Value>,
    wrapper: Wrapper,
    total_pages: Option<u32>,
    failing_pages: HashSet<u32>,
    delays_ms: HashMap<u32, u64>,
    error_code: Option<(Value, String)>,
}

impl Collection {
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            items,
            wrapper: Wrapper::Plain,
            total_pages: None,
            failing_pages: HashSet::new(),
            delays_ms: HashMap::new(),
            error_code: None,
        }
    }

    pub fn wrapped(mut self, wrapper: Wrapper) -> Self {
        self.wrapper = wrapper;
        self
    }

    /// Overrides the advertised `totalPages`.
    pub fn with_total_pages(mut self, total: u32) -> Self {
        self.total_pages = Some(total);
        self
    }

    /// Answers `page` with a 500.
    pub fn failing(mut self, page: u32) -> Self {
        self.failing_pages.insert(page);
        self
    }

    pub fn delay(mut self, page: u32, ms: u64) -> Self {
        self.delays_ms.insert(page, ms);
        self
    }

    /// Answers with HTTP 200 but an error code inside the wrapper.
    pub fn with_error_code(mut self, code: Value, message: &str) -> Self {
        self.error_code = Some((code, message.to_string()));
        self
    }

    fn page(&self, page: u32, size: u32) -> Value {
        let size = size.max(1);
        let total_elements = self.items.len() as u32;
        let total_pages = self
            .total_pages
            .unwrap_or_else(|| total_elements.div_ceil(size));
        let start = (page * size) as usize;
        let content: Vec<Value> = self
            .items
            .iter()
            .skip(start)
            .take(size as usize)
            .cloned()
            .collect();

        json!({
            "content": content,
            "number": page,
            "size": size,
            "totalPages": total_pages,
            "totalElements": total_elements,
            "first": page == 0,
            "last": page + 1 >= total_pages,
        })
    }

    fn wrap(&self, page: Value) -> Value {
        let (code, message) = self
            .error_code
            .clone()
            .unwrap_or_else(|| (json!(200), "OK".to_string()));
        match self.wrapper {
            Wrapper::Plain => page,
            Wrapper::Data => json!({ "responseCode": code, "message": message, "data": page }),
            Wrapper::Body => json!({ "code": code, "message": message, "body": page }),
        }
    }
}

/// One request as seen by the mock API.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl RecordedRequest {
    pub fn page(&self) -> Option<u32> {
        self.query.get("page").and_then(|p| p.parse().ok())
    }
}

#[derive(Default)]
struct MockState {
    collections: Mutex<HashMap<String, Collection>>,
    requests: Mutex<Vec<RecordedRequest>>,
    favorites: Mutex<HashSet<i64>>,
    next_id: Mutex<i64>,
}

impl MockState {
    fn record(
        &self,
        method: Method,
        uri: &Uri,
        query: HashMap<String, String>,
        headers: &HeaderMap,
        body: Option<Value>,
    ) {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path: uri.path().to_string(),
            query,
            authorization,
            headers: headers.clone(),
            body,
        });
    }

    fn next_id(&self) -> i64 {
        let mut id = self.next_id.lock().unwrap();
        *id += 1;
        *id
    }
}

type SharedState = Arc<MockState>;

/// Mock API instance. Shuts down when dropped.
pub struct MockApi {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    state: SharedState,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockApi {
    /// Spawns the mock API on a random port and waits until it accepts connections.
    pub async fn spawn() -> Self {
        let state = SharedState::default();
        let app = make_app(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            state,
            shutdown_tx: Some(shutdown_tx),
        };
        server.wait_for_ready().await;
        server
    }

    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);
        let url = format!("{}/health", self.base_url);

        while start.elapsed() < timeout {
            if let Ok(response) = client.get(&url).send().await {
                if response.status().is_success() {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_MS)).await;
        }

        panic!("Mock API did not become ready within {}ms", SERVER_READY_TIMEOUT_MS);
    }

    /// Serves `collection` on GET `path`.
    pub fn serve(&self, path: &str, collection: Collection) {
        self.state
            .collections
            .lock()
            .unwrap()
            .insert(path.to_string(), collection);
    }

    /// All requests received so far, health checks excluded.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// GET requests to `path`, in arrival order.
    pub fn page_requests(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == Method::GET && r.path == path)
            .collect()
    }

    pub fn mark_favorite(&self, song_id: i64) {
        self.state.favorites.lock().unwrap().insert(song_id);
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn make_app(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/songs", get(list_page).post(create_song))
        .route("/api/songs/{id}", put(update_song))
        .route("/api/artists", get(list_page).post(create_entity))
        .route("/api/artists/{id}", put(update_entity))
        .route("/api/genres", get(list_page).post(create_named))
        .route("/api/genres/{id}", put(update_entity))
        .route("/api/tribes", get(list_page).post(create_entity))
        .route("/api/tribes/{id}", put(update_entity))
        .route("/api/countries", get(list_page).post(create_entity))
        .route("/api/countries/{id}", put(update_entity))
        .route("/api/users", get(list_page))
        .route("/api/comments", get(list_page).post(create_comment))
        .route("/api/votes", post(cast_vote))
        .route("/api/votes/{song_id}", delete(remove_vote))
        .route("/api/votes/user/{user_id}", get(list_page))
        .route("/api/favorites/user/{user_id}", get(list_page))
        .route("/api/favorites/{song_id}/toggle", post(toggle_favorite))
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .with_state(state)
}

fn parse_body(body: &Bytes) -> Option<Value> {
    serde_json::from_slice(body).ok()
}

async fn list_page(
    State(state): State<SharedState>,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record(Method::GET, &uri, query.clone(), &headers, None);

    let Some(collection) = state.collections.lock().unwrap().get(uri.path()).cloned() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let page: u32 = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(0);
    let size: u32 = query.get("size").and_then(|s| s.parse().ok()).unwrap_or(20);

    if let Some(ms) = collection.delays_ms.get(&page) {
        tokio::time::sleep(Duration::from_millis(*ms)).await;
    }

    if collection.failing_pages.contains(&page) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "page unavailable").into_response();
    }

    Json(collection.wrap(collection.page(page, size))).into_response()
}

async fn create_song(
    State(state): State<SharedState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = parse_body(&body);
    state.record(Method::POST, &uri, HashMap::new(), &headers, body.clone());

    let Some(body) = body else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let song = json!({
        "songId": state.next_id(),
        "title": body["title"],
        "artist": { "id": body["artistId"], "name": "The Test Band" },
    });
    (
        StatusCode::CREATED,
        Json(json!({ "responseCode": 201, "message": "Created", "data": song })),
    )
        .into_response()
}

async fn update_song(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = parse_body(&body);
    state.record(Method::PUT, &uri, HashMap::new(), &headers, body.clone());

    // Both id keys, as some song DTOs carry them
    let title = body.map(|b| b["title"].clone()).unwrap_or(Value::Null);
    Json(json!({ "id": id, "songId": id, "title": title })).into_response()
}

/// Echoes the payload back as a bare entity with an `id`. Countries also get
/// a `code` derived from their name.
fn echo_entity(path: &str, id: i64, body: &Value) -> Value {
    let mut entity = body.clone();
    if let Some(fields) = entity.as_object_mut() {
        fields.insert("id".to_string(), json!(id));
        if path.starts_with("/api/countries") {
            let code: String = body["name"]
                .as_str()
                .unwrap_or_default()
                .chars()
                .take(2)
                .collect();
            fields.insert("code".to_string(), json!(code.to_uppercase()));
        }
    }
    entity
}

async fn create_entity(
    State(state): State<SharedState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = parse_body(&body);
    state.record(Method::POST, &uri, HashMap::new(), &headers, body.clone());

    let Some(body) = body else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let entity = echo_entity(uri.path(), state.next_id(), &body);
    (StatusCode::CREATED, Json(entity)).into_response()
}

async fn update_entity(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = parse_body(&body);
    state.record(Method::PUT, &uri, HashMap::new(), &headers, body.clone());

    let Some(body) = body else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    Json(echo_entity(uri.path(), id, &body)).into_response()
}

async fn create_named(
    State(state): State<SharedState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = parse_body(&body);
    state.record(Method::POST, &uri, HashMap::new(), &headers, body.clone());

    match body.as_ref().and_then(|b| b["name"].as_str()) {
        Some(name) if !name.is_empty() => {
            let genre = json!({ "id": state.next_id(), "name": name });
            Json(json!({ "code": "SUCCESS", "message": "ok", "body": genre })).into_response()
        }
        _ => Json(json!({ "code": 400, "message": "name is required", "body": null }))
            .into_response(),
    }
}

async fn create_comment(
    State(state): State<SharedState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = parse_body(&body);
    state.record(Method::POST, &uri, HashMap::new(), &headers, body.clone());

    let Some(body) = body else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let comment = json!({
        "id": state.next_id(),
        "content": body["content"],
        "createdAt": "2024-03-02T12:00:00Z",
        "user": { "id": USER_1_ID, "username": TEST_USER },
        "song": { "songId": body["songId"], "title": "Posted on" },
    });
    (StatusCode::CREATED, Json(comment)).into_response()
}

async fn cast_vote(
    State(state): State<SharedState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = parse_body(&body);
    state.record(Method::POST, &uri, HashMap::new(), &headers, body.clone());

    let valid = body
        .as_ref()
        .and_then(|b| b["voteType"].as_str())
        .is_some_and(|t| t == "UPVOTE" || t == "DOWNVOTE");
    if valid {
        Json(json!({ "responseCode": 200, "message": "Vote recorded", "data": null }))
            .into_response()
    } else {
        Json(json!({ "responseCode": 422, "message": "Invalid vote type", "data": null }))
            .into_response()
    }
}

async fn remove_vote(
    State(state): State<SharedState>,
    Path(_song_id): Path<i64>,
    uri: Uri,
    headers: HeaderMap,
) -> StatusCode {
    state.record(Method::DELETE, &uri, HashMap::new(), &headers, None);
    StatusCode::NO_CONTENT
}

async fn toggle_favorite(
    State(state): State<SharedState>,
    Path(song_id): Path<i64>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    state.record(Method::POST, &uri, HashMap::new(), &headers, None);

    let mut favorites = state.favorites.lock().unwrap();
    let favorite = if favorites.remove(&song_id) {
        false
    } else {
        favorites.insert(song_id);
        true
    };
    Json(json!({ "favorite": favorite })).into_response()
}

async fn login(
    State(state): State<SharedState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = parse_body(&body);
    state.record(Method::POST, &uri, HashMap::new(), &headers, body.clone());

    let credentials = body.as_ref().map(|b| (b["username"].as_str(), b["password"].as_str()));
    if credentials == Some((Some(TEST_USER), Some(TEST_PASS))) {
        Json(json!({ "token": TEST_TOKEN })).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, "invalid credentials").into_response()
    }
}

async fn register(
    State(state): State<SharedState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = parse_body(&body);
    state.record(Method::POST, &uri, HashMap::new(), &headers, body.clone());

    match body.as_ref().and_then(|b| b["username"].as_str()) {
        Some(TEST_USER) => (StatusCode::CONFLICT, "username already taken").into_response(),
        Some(_) => (
            StatusCode::CREATED,
            Json(json!({ "message": "User registered" })),
        )
            .into_response(),
        None => StatusCode::BAD_REQUEST.into_response(),
    }
}
