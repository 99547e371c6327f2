//! # Blue Waves Client Library (bw-client)
//!
//! Headless client for the Blue Waves music library service.
//!
//! **Purpose:** Acquire a bearer token from the cookie session, gate every
//! dependent fetch on it, keep cached blobs coherent across mutations, and
//! reconcile the local library list with server-confirmed changes.
//!
//! **Architecture:** `ApiClient` (reqwest) -> `TokenResource` (stage 1) ->
//! `GatedResource` (stage 2) -> views (`LibraryView`, `PlayerView`).

pub mod cli;
pub mod error;
pub mod form;
pub mod http;
pub mod library;
pub mod logging;
pub mod resource;
pub mod routes;
pub mod session;
pub mod views;

pub use error::{ClientError, Result};
pub use http::ApiClient;
pub use resource::{BlobHandle, BlobStore, BlobUrl, GatedResource, Phase};
pub use routes::Route;
pub use session::{SessionToken, TokenResource};
pub use views::{AuthView, LibraryView, PlayerView};
