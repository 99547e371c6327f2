//! REST client for the Blue Waves API
//!
//! Wraps `reqwest::Client` with the base URL, the in-memory cookie jar
//! that carries the login session, bearer headers, and the mapping from
//! non-success responses onto `ClientError`.

use crate::error::{ClientError, Result};
use crate::session::SessionToken;
use bw_common::api::ErrorBody;
use bw_common::ClientConfig;
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

const USER_AGENT: &str = concat!("bw-client/", env!("CARGO_PKG_VERSION"));

/// Whether an endpoint reads or writes server state
///
/// Decides how a 4xx is classified: writes surface it as a validation
/// failure next to the form, reads as a transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Read,
    Write,
}

/// Binary response body plus its declared content type
#[derive(Debug, Clone)]
pub struct Fetched {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Blue Waves REST client
///
/// Cloning is cheap and clones share the cookie jar, so every view built
/// from one logged-in client sees the same session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| {
            ClientError::Common(bw_common::Error::InvalidInput(format!(
                "Invalid endpoint path '{}': {}",
                path, e
            )))
        })
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&SessionToken>,
    ) -> Result<RequestBuilder> {
        let url = self.url(path)?;
        debug!(method = %method, url = %url, bearer = token.is_some(), "Sending request");

        let builder = self.http.request(method, url);
        Ok(match token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        })
    }

    async fn send(&self, builder: RequestBuilder, kind: RequestKind) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let message = ErrorBody::message_from(&body).unwrap_or_else(|| fallback_message(status));
        debug!(status = status.as_u16(), message = %message, "Request failed");

        Err(classify(status, message, kind))
    }

    /// GET a JSON document
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SessionToken>,
    ) -> Result<T> {
        let builder = self.request(Method::GET, path, token)?;
        let response = self.send(builder, RequestKind::Read).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// GET an opaque binary body
    pub async fn get_bytes(&self, path: &str, token: Option<&SessionToken>) -> Result<Fetched> {
        let builder = self.request(Method::GET, path, token)?;
        let response = self.send(builder, RequestKind::Read).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();

        Ok(Fetched {
            bytes,
            content_type,
        })
    }

    /// Send a JSON body to a write endpoint
    pub async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        token: Option<&SessionToken>,
        body: &B,
    ) -> Result<Response> {
        let builder = self.request(method, path, token)?.json(body);
        self.send(builder, RequestKind::Write).await
    }

    /// Send a multipart form to a write endpoint
    pub async fn send_multipart(
        &self,
        method: Method,
        path: &str,
        token: Option<&SessionToken>,
        form: Form,
    ) -> Result<Response> {
        let builder = self.request(method, path, token)?.multipart(form);
        self.send(builder, RequestKind::Write).await
    }

    /// Send a body-less write request (DELETE, logout)
    pub async fn send_empty(
        &self,
        method: Method,
        path: &str,
        token: Option<&SessionToken>,
    ) -> Result<Response> {
        let builder = self.request(method, path, token)?;
        self.send(builder, RequestKind::Write).await
    }
}

/// Map a non-success status onto the error taxonomy
pub fn classify(status: StatusCode, message: String, kind: RequestKind) -> ClientError {
    let status = status.as_u16();
    match kind {
        RequestKind::Write if (400..500).contains(&status) => {
            ClientError::ValidationFailed { status, message }
        }
        _ => ClientError::TransientFailure { status, message },
    }
}

fn fallback_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
