#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use spafcli::{
    config::{Config, Credentials, RetryPolicy},
    events::{RunEvent, RunObserver},
};
use tokio::net::TcpListener;

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";
pub const ACCESS_TOKEN: &str = "mock-token";

/// Binds a listener on a random local port and returns it with its base url.
pub async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    (listener, base)
}

pub fn spawn(listener: TcpListener, router: Router) {
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
}

/// Config pointing at the mock with fast, deterministic retries.
pub fn test_config(base: &str) -> Config {
    let mut config = Config::with_base_urls(
        Credentials {
            client_id: CLIENT_ID.to_string(),
            client_secret: CLIENT_SECRET.to_string(),
        },
        format!("{}/v1", base),
        format!("{}/api/token", base),
    );
    config.retry = fast_retry(3);
    config
}

pub fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        initial_backoff: Duration::from_millis(10),
        jitter: Duration::ZERO,
    }
}

/// Observer that keeps every event for later assertions.
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<RunEvent>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl RunObserver for Recorder {
    fn on_event(&self, event: &RunEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Counts requests per key.
#[derive(Default)]
pub struct Hits(Mutex<HashMap<String, usize>>);

impl Hits {
    pub fn record(&self, key: impl Into<String>) {
        *self.0.lock().unwrap().entry(key.into()).or_insert(0) += 1;
    }

    pub fn get(&self, key: &str) -> usize {
        self.0.lock().unwrap().get(key).copied().unwrap_or(0)
    }
}

pub fn playlist(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "public": true,
        "collaborative": false,
        "snapshot_id": "snap",
    })
}

pub fn item(id: &str, name: &str) -> Value {
    json!({
        "added_at": "2024-01-01T00:00:00Z",
        "is_local": false,
        "track": { "id": id, "name": name, "duration_ms": 180000 },
    })
}

pub fn features(seed: u32) -> Value {
    json!({
        "id": format!("track-{}", seed),
        "type": "audio_features",
        "danceability": 0.5,
        "energy": 0.75,
        "key": seed,
        "loudness": -6.25,
        "mode": 1,
        "speechiness": 0.03,
        "acousticness": 0.125,
        "instrumentalness": 0.0,
        "liveness": 0.25,
        "valence": 0.5,
        "tempo": 120.5,
        "duration_ms": 180000,
    })
}

/// The CSV line produced for [`features`] with the given seed.
pub fn feature_columns(seed: u32) -> String {
    format!("0.5,0.75,{},-6.25,1,0.03,0.125,0.0,0.25,0.5,120.5", seed)
}

/// Content served by [`MockCatalog::start`].
#[derive(Default)]
pub struct MockCatalog {
    pub playlists: Vec<Value>,
    pub playlists_page_size: usize,
    /// Status returned by the user playlists listing instead of data.
    pub list_status: Option<u16>,
    pub tracks: HashMap<String, Vec<Value>>,
    pub tracks_page_size: usize,
    /// Playlists whose tracks endpoint fails on the given 0-based page.
    pub broken_track_pages: HashMap<String, usize>,
    /// Playlists answering 404 on the details endpoint.
    pub missing_playlists: HashSet<String>,
    /// Tracks without an entry answer 404.
    pub features: HashMap<String, Value>,
    /// Tracks whose features answer 429 this many times before succeeding.
    pub rate_limited_features: HashMap<String, usize>,
}

struct Shared {
    base: String,
    catalog: MockCatalog,
    hits: Arc<Hits>,
    remaining_429: Mutex<HashMap<String, usize>>,
}

pub struct MockServer {
    pub base: String,
    pub hits: Arc<Hits>,
}

impl MockCatalog {
    pub async fn start(self) -> MockServer {
        let (listener, base) = bind().await;
        let hits = Arc::new(Hits::default());
        let remaining_429 = Mutex::new(self.rate_limited_features.clone());

        let shared = Arc::new(Shared {
            base: base.clone(),
            catalog: self,
            hits: Arc::clone(&hits),
            remaining_429,
        });

        let router = Router::new()
            .route("/api/token", post(token))
            .route("/v1/users/{user_id}/playlists", get(user_playlists))
            .route("/v1/playlists/{playlist_id}", get(playlist_details))
            .route("/v1/playlists/{playlist_id}/tracks", get(playlist_tracks))
            .route("/v1/audio-features/{track_id}", get(audio_features))
            .with_state(shared);

        spawn(listener, router);
        MockServer { base, hits }
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", ACCESS_TOKEN))
        .unwrap_or(false)
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "missing bearer token").into_response()
}

/// Slices `items` into a page starting at `offset`, linking to the next one.
fn page(items: &[Value], offset: usize, size: usize, next_base: &str) -> Value {
    let size = size.max(1);
    let end = (offset + size).min(items.len());
    let next = if end < items.len() {
        Value::String(format!("{}?offset={}&limit={}", next_base, end, size))
    } else {
        Value::Null
    };

    json!({
        "href": next_base,
        "items": items[offset.min(end)..end].to_vec(),
        "limit": size,
        "offset": offset,
        "total": items.len(),
        "next": next,
    })
}

fn offset(query: &HashMap<String, String>) -> usize {
    query
        .get("offset")
        .and_then(|o| o.parse().ok())
        .unwrap_or(0)
}

async fn token(
    State(shared): State<Arc<Shared>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    shared.hits.record("token");

    let valid = form.get("grant_type").map(String::as_str) == Some("client_credentials")
        && form.get("client_id").map(String::as_str) == Some(CLIENT_ID)
        && form.get("client_secret").map(String::as_str) == Some(CLIENT_SECRET);

    if !valid {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_client" })),
        )
            .into_response();
    }

    Json(json!({
        "access_token": ACCESS_TOKEN,
        "token_type": "Bearer",
        "expires_in": 3600,
    }))
    .into_response()
}

async fn user_playlists(
    State(shared): State<Arc<Shared>>,
    Path(user_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    shared.hits.record("playlists");
    if !authorized(&headers) {
        return unauthorized();
    }
    if let Some(status) = shared.catalog.list_status {
        let status = StatusCode::from_u16(status).unwrap();
        return (status, "listing failed").into_response();
    }

    let next_base = format!("{}/v1/users/{}/playlists", shared.base, user_id);
    Json(page(
        &shared.catalog.playlists,
        offset(&query),
        shared.catalog.playlists_page_size,
        &next_base,
    ))
    .into_response()
}

async fn playlist_details(
    State(shared): State<Arc<Shared>>,
    Path(playlist_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    shared.hits.record(format!("playlist:{}", playlist_id));
    if !authorized(&headers) {
        return unauthorized();
    }
    if shared.catalog.missing_playlists.contains(&playlist_id) {
        return (StatusCode::NOT_FOUND, "Resource not found").into_response();
    }

    match shared
        .catalog
        .playlists
        .iter()
        .find(|p| p["id"] == playlist_id.as_str())
    {
        Some(playlist) => Json(playlist.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "Resource not found").into_response(),
    }
}

async fn playlist_tracks(
    State(shared): State<Arc<Shared>>,
    Path(playlist_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    shared.hits.record(format!("tracks:{}", playlist_id));
    if !authorized(&headers) {
        return unauthorized();
    }

    let size = shared.catalog.tracks_page_size.max(1);
    let offset = offset(&query);
    if let Some(broken) = shared.catalog.broken_track_pages.get(&playlist_id) {
        if offset / size == *broken {
            return (StatusCode::INTERNAL_SERVER_ERROR, "server error").into_response();
        }
    }

    let Some(items) = shared.catalog.tracks.get(&playlist_id) else {
        return (StatusCode::NOT_FOUND, "Resource not found").into_response();
    };

    let next_base = format!("{}/v1/playlists/{}/tracks", shared.base, playlist_id);
    Json(page(items, offset, size, &next_base)).into_response()
}

async fn audio_features(
    State(shared): State<Arc<Shared>>,
    Path(track_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    shared.hits.record(format!("features:{}", track_id));
    if !authorized(&headers) {
        return unauthorized();
    }

    {
        let mut remaining = shared.remaining_429.lock().unwrap();
        if let Some(count) = remaining.get_mut(&track_id) {
            if *count > 0 {
                *count -= 1;
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    [(header::RETRY_AFTER, "0")],
                    "rate limited",
                )
                    .into_response();
            }
        }
    }

    match shared.catalog.features.get(&track_id) {
        Some(features) => Json(features.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "analysis not found").into_response(),
    }
}
