//! Shared API request/response types

use serde::{Deserialize, Serialize};
use std::fmt;

// ========================================
// Identifiers
// ========================================

/// Server-assigned identifier of one library entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct MusicId(String);

impl MusicId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MusicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MusicId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ========================================
// Session Types
// ========================================

/// `GET users/token` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// `POST users/login` body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST users` body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

// ========================================
// Library Types
// ========================================

/// One library entry as listed by the server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MusicEntry {
    pub music_id: MusicId,
    pub title: String,
    pub artist: String,
}

/// `GET users/music` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MusicListResponse {
    pub music: Vec<MusicEntry>,
}

/// `PATCH users/music/{id}` body
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MetadataUpdate {
    pub title: String,
    pub artist: String,
}

// ========================================
// Error Response Types
// ========================================

/// Body of every non-success response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    /// Extract the server's message from a raw response body, if it has
    /// the `{ "error": "..." }` shape
    pub fn message_from(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .map(|b| b.error)
    }
}

// ========================================
// Tests
// ========================================
