//! Stage 1 of the resource pipeline: the bearer token
//!
//! The token is read from `GET users/token`, which authenticates with the
//! session cookie set at login. One `TokenResource` lives exactly as long
//! as the view that created it. Within that lifetime the endpoint is hit
//! at most once, concurrent callers share the in-flight request, and the
//! settled outcome (token or failure) is handed to every later caller.
//! A failure is never retried in place: the caller has to navigate to the
//! login page and build a fresh view.

use crate::error::{ClientError, Result};
use crate::http::ApiClient;
use bw_common::api::TokenResponse;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Token endpoint, relative to the API base URL
pub const TOKEN_PATH: &str = "users/token";

/// Opaque bearer credential
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    value: String,
    acquired_at: DateTime<Utc>,
}

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            acquired_at: Utc::now(),
        }
    }

    /// Raw token text for the `Authorization` header
    pub fn expose(&self) -> &str {
        &self.value
    }

    pub fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("value", &"<redacted>")
            .field("acquired_at", &self.acquired_at)
            .finish()
    }
}

/// Lazily acquired, de-duplicated, cached bearer token
pub struct TokenResource {
    api: ApiClient,
    settled: OnceCell<Result<SessionToken>>,
    requests: AtomicUsize,
}

impl TokenResource {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            settled: OnceCell::new(),
            requests: AtomicUsize::new(0),
        }
    }

    /// Get the token, requesting it on first use
    ///
    /// Fails with `ClientError::Unauthenticated` for any failure of the
    /// token request; every later call returns that same error.
    pub async fn acquire(&self) -> Result<SessionToken> {
        self.settled
            .get_or_init(|| self.request_token())
            .await
            .clone()
    }

    async fn request_token(&self) -> Result<SessionToken> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        match self.api.get_json::<TokenResponse>(TOKEN_PATH, None).await {
            Ok(response) if !response.access_token.is_empty() => {
                let token = SessionToken::new(response.access_token);
                info!(acquired_at = %token.acquired_at(), "Session token acquired");
                Ok(token)
            }
            Ok(_) => {
                warn!("Token endpoint returned an empty access token");
                Err(ClientError::Unauthenticated {
                    message: "Empty access token".to_string(),
                })
            }
            Err(err) => {
                warn!(error = %err, "Session token request failed");
                Err(ClientError::Unauthenticated {
                    message: err.to_string(),
                })
            }
        }
    }

    /// Settled outcome, or `None` while idle or in flight
    pub fn settled(&self) -> Option<&Result<SessionToken>> {
        self.settled.get()
    }

    pub fn is_settled(&self) -> bool {
        self.settled.initialized()
    }

    /// Number of requests issued to the token endpoint (0 or 1)
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}
