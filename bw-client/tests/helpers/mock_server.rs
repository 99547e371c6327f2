//! In-process stand-in for the Blue Waves REST server
//!
//! Serves every endpoint the client calls under `/api/v1`, counts the
//! requests each endpoint receives, and lets a test inject delays and
//! failures through `MockConfig`.

use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bw_common::api::{LoginRequest, MetadataUpdate, MusicEntry, MusicId, RegisterRequest};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

pub const TEST_EMAIL: &str = "listener@example.com";
pub const TEST_PASSWORD: &str = "correct horse";
pub const TEST_TOKEN: &str = "tok-1";
const SESSION_COOKIE: &str = "session=valid";

/// Behaviour knobs, fixed when the server starts
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// (id, title, artist) rows initially in the library
    pub library: Vec<(&'static str, &'static str, &'static str)>,
    pub token_delay: Duration,
    /// Token endpoint refuses even a valid session
    pub fail_token: bool,
    pub cover_art_delays: HashMap<&'static str, Duration>,
    /// Ids that have no cover art (404)
    pub missing_cover_art: Vec<&'static str>,
    pub update_delay: Duration,
    pub cover_art_put_delay: Duration,
    /// Cover art uploads are rejected with 400
    pub reject_cover_art: bool,
}

/// Request counters, one per endpoint
#[derive(Debug, Default)]
pub struct Counters {
    pub register: AtomicUsize,
    pub login: AtomicUsize,
    pub logout: AtomicUsize,
    pub token: AtomicUsize,
    pub list: AtomicUsize,
    pub add: AtomicUsize,
    pub update: AtomicUsize,
    pub cover_art_put: AtomicUsize,
    pub delete: AtomicUsize,
    pub audio: AtomicUsize,
    pub cover_art_get: AtomicUsize,
    /// Writes (PATCH, PUT cover art) whose handler has finished
    pub completed_writes: AtomicUsize,
}

impl Counters {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    /// Requests to any endpoint that needs the bearer token
    pub fn dependent(&self) -> usize {
        [
            &self.list,
            &self.add,
            &self.update,
            &self.cover_art_put,
            &self.delete,
            &self.audio,
            &self.cover_art_get,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }
}

pub struct MockState {
    config: MockConfig,
    pub counters: Counters,
    music: Mutex<Vec<MusicEntry>>,
    cover_art: Mutex<HashMap<String, Vec<u8>>>,
    accounts: Mutex<Vec<String>>,
    logged_out: AtomicBool,
    next_id: AtomicUsize,
}

pub struct MockServer {
    addr: std::net::SocketAddr,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockServer {
    pub async fn start(config: MockConfig) -> Self {
        let music = config
            .library
            .iter()
            .map(|(id, title, artist)| MusicEntry {
                music_id: MusicId::new(*id),
                title: title.to_string(),
                artist: artist.to_string(),
            })
            .collect();

        let state = Arc::new(MockState {
            config,
            counters: Counters::default(),
            music: Mutex::new(music),
            cover_art: Mutex::new(HashMap::new()),
            accounts: Mutex::new(vec![TEST_EMAIL.to_string()]),
            logged_out: AtomicBool::new(false),
            next_id: AtomicUsize::new(100),
        });

        let app = Router::new()
            .route("/api/v1/users", post(register))
            .route("/api/v1/users/login", post(login))
            .route("/api/v1/users/logout", post(logout))
            .route("/api/v1/users/token", get(token))
            .route("/api/v1/users/music", get(list_music).post(add_music))
            .route(
                "/api/v1/users/music/:id",
                get(audio).patch(update_music).delete(delete_music),
            )
            .route(
                "/api/v1/users/music/:id/cover-art",
                get(get_cover_art).put(put_cover_art),
            )
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }

    pub fn counters(&self) -> &Counters {
        &self.state.counters
    }

    pub fn music(&self) -> Vec<MusicEntry> {
        self.state.music.lock().unwrap().clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

type AppState = State<Arc<MockState>>;

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn bearer_ok(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TEST_TOKEN))
}

fn session_ok(state: &MockState, headers: &HeaderMap) -> bool {
    !state.logged_out.load(Ordering::SeqCst)
        && headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains(SESSION_COOKIE))
}

async fn register(State(state): AppState, Json(request): Json<RegisterRequest>) -> Response {
    state.counters.register.fetch_add(1, Ordering::SeqCst);

    let mut accounts = state.accounts.lock().unwrap();
    if accounts.contains(&request.email) {
        return error(StatusCode::CONFLICT, "Account already exists");
    }
    accounts.push(request.email);
    StatusCode::CREATED.into_response()
}

async fn login(State(state): AppState, Json(request): Json<LoginRequest>) -> Response {
    state.counters.login.fetch_add(1, Ordering::SeqCst);

    if !state.accounts.lock().unwrap().contains(&request.email) {
        return error(StatusCode::NOT_FOUND, "Account not found");
    }
    if request.password != TEST_PASSWORD {
        return error(StatusCode::UNAUTHORIZED, "Wrong password");
    }

    state.logged_out.store(false, Ordering::SeqCst);
    (
        StatusCode::OK,
        [(header::SET_COOKIE, format!("{}; Path=/", SESSION_COOKIE))],
    )
        .into_response()
}

async fn logout(State(state): AppState) -> Response {
    state.counters.logout.fetch_add(1, Ordering::SeqCst);
    state.logged_out.store(true, Ordering::SeqCst);
    (
        StatusCode::OK,
        [(header::SET_COOKIE, "session=; Path=/; Max-Age=0".to_string())],
    )
        .into_response()
}

async fn token(State(state): AppState, headers: HeaderMap) -> Response {
    state.counters.token.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(state.config.token_delay).await;

    if state.config.fail_token || !session_ok(&state, &headers) {
        return error(StatusCode::UNAUTHORIZED, "Session expired");
    }
    Json(json!({ "access_token": TEST_TOKEN })).into_response()
}

async fn list_music(State(state): AppState, headers: HeaderMap) -> Response {
    state.counters.list.fetch_add(1, Ordering::SeqCst);
    if !bearer_ok(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Invalid token");
    }

    let music = state.music.lock().unwrap().clone();
    Json(json!({ "music": music })).into_response()
}

async fn add_music(State(state): AppState, headers: HeaderMap, mut multipart: Multipart) -> Response {
    state.counters.add.fetch_add(1, Ordering::SeqCst);
    if !bearer_ok(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Invalid token");
    }

    let mut title = None;
    let mut artist = None;
    let mut file = None;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => title = Some(field.text().await.unwrap()),
            "artist" => artist = Some(field.text().await.unwrap()),
            "file" => file = Some(field.bytes().await.unwrap()),
            _ => {}
        }
    }

    let (Some(title), Some(artist), Some(_file)) = (title, artist, file) else {
        return error(StatusCode::BAD_REQUEST, "Missing title, artist or file");
    };

    let mut music = state.music.lock().unwrap();
    if music.iter().any(|entry| entry.title == title) {
        return error(StatusCode::CONFLICT, "Track already exists");
    }

    let entry = MusicEntry {
        music_id: MusicId::new(format!(
            "m{}",
            state.next_id.fetch_add(1, Ordering::SeqCst)
        )),
        title,
        artist,
    };
    music.push(entry.clone());
    (StatusCode::CREATED, Json(entry)).into_response()
}

async fn update_music(
    State(state): AppState,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(update): Json<MetadataUpdate>,
) -> Response {
    state.counters.update.fetch_add(1, Ordering::SeqCst);
    if !bearer_ok(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Invalid token");
    }
    tokio::time::sleep(state.config.update_delay).await;

    let response = {
        let mut music = state.music.lock().unwrap();
        match music.iter_mut().find(|entry| entry.music_id.as_str() == id) {
            Some(entry) => {
                entry.title = update.title;
                entry.artist = update.artist;
                StatusCode::OK.into_response()
            }
            None => error(StatusCode::NOT_FOUND, "Music not found"),
        }
    };

    state.counters.completed_writes.fetch_add(1, Ordering::SeqCst);
    response
}

async fn delete_music(State(state): AppState, Path(id): Path<String>, headers: HeaderMap) -> Response {
    state.counters.delete.fetch_add(1, Ordering::SeqCst);
    if !bearer_ok(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Invalid token");
    }

    let mut music = state.music.lock().unwrap();
    let before = music.len();
    music.retain(|entry| entry.music_id.as_str() != id);
    if music.len() == before {
        return error(StatusCode::NOT_FOUND, "Music not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn audio(State(state): AppState, Path(id): Path<String>, headers: HeaderMap) -> Response {
    state.counters.audio.fetch_add(1, Ordering::SeqCst);
    if !bearer_ok(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Invalid token");
    }

    (
        [(header::CONTENT_TYPE, "audio/mpeg")],
        format!("audio-{}", id).into_bytes(),
    )
        .into_response()
}

async fn get_cover_art(State(state): AppState, Path(id): Path<String>, headers: HeaderMap) -> Response {
    state.counters.cover_art_get.fetch_add(1, Ordering::SeqCst);
    if !bearer_ok(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Invalid token");
    }
    if let Some(delay) = state.config.cover_art_delays.get(id.as_str()) {
        tokio::time::sleep(*delay).await;
    }
    if state.config.missing_cover_art.contains(&id.as_str()) {
        return error(StatusCode::NOT_FOUND, "Cover art not found");
    }

    let bytes = state
        .cover_art
        .lock()
        .unwrap()
        .get(&id)
        .cloned()
        .unwrap_or_else(|| format!("art-{}", id).into_bytes());
    ([(header::CONTENT_TYPE, "image/png")], bytes).into_response()
}

async fn put_cover_art(
    State(state): AppState,
    Path(id): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    state.counters.cover_art_put.fetch_add(1, Ordering::SeqCst);
    if !bearer_ok(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Invalid token");
    }
    tokio::time::sleep(state.config.cover_art_put_delay).await;

    let mut art = None;
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() == Some("artFile") {
            art = Some(field.bytes().await.unwrap().to_vec());
        }
    }

    let response = match art {
        _ if state.config.reject_cover_art => error(StatusCode::BAD_REQUEST, "Unsupported image"),
        Some(art) => {
            state.cover_art.lock().unwrap().insert(id, art);
            StatusCode::OK.into_response()
        }
        None => error(StatusCode::BAD_REQUEST, "Missing artFile"),
    };

    state.counters.completed_writes.fetch_add(1, Ordering::SeqCst);
    response
}
