//! `DependentFetch` implementations for the library endpoints

use crate::error::Result;
use crate::http::ApiClient;
use crate::library::endpoints;
use crate::library::state::LibraryState;
use crate::resource::{BlobHandle, BlobStore, DependentFetch};
use crate::session::SessionToken;
use async_trait::async_trait;
use bw_common::api::MusicId;

const DEFAULT_AUDIO_MIME: &str = "audio/mpeg";

/// The whole library list; there is only one, so the key is `()`
pub struct MusicListFetcher {
    api: ApiClient,
}

impl MusicListFetcher {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl DependentFetch for MusicListFetcher {
    type Key = ();
    type Output = LibraryState;

    fn name(&self) -> &'static str {
        "music-list"
    }

    async fn fetch(&self, _key: &(), token: &SessionToken) -> Result<LibraryState> {
        let entries = endpoints::list_music(&self.api, token).await?;
        Ok(LibraryState::new(entries))
    }
}

/// Cover art decoded into a blob handle
pub struct CoverArtFetcher {
    api: ApiClient,
    blobs: BlobStore,
}

impl CoverArtFetcher {
    pub fn new(api: ApiClient, blobs: BlobStore) -> Self {
        Self { api, blobs }
    }
}

#[async_trait]
impl DependentFetch for CoverArtFetcher {
    type Key = MusicId;
    type Output = BlobHandle;

    fn name(&self) -> &'static str {
        "cover-art"
    }

    async fn fetch(&self, key: &MusicId, token: &SessionToken) -> Result<BlobHandle> {
        let fetched = endpoints::fetch_cover_art(&self.api, token, key).await?;
        let mime = fetched
            .content_type
            .or_else(|| infer::get(&fetched.bytes).map(|kind| kind.mime_type().to_string()));
        Ok(self.blobs.allocate(fetched.bytes, mime))
    }
}

/// Audio stream decoded into a blob handle
pub struct AudioFetcher {
    api: ApiClient,
    blobs: BlobStore,
}

impl AudioFetcher {
    pub fn new(api: ApiClient, blobs: BlobStore) -> Self {
        Self { api, blobs }
    }
}

#[async_trait]
impl DependentFetch for AudioFetcher {
    type Key = MusicId;
    type Output = BlobHandle;

    fn name(&self) -> &'static str {
        "audio"
    }

    async fn fetch(&self, key: &MusicId, token: &SessionToken) -> Result<BlobHandle> {
        let fetched = endpoints::fetch_audio(&self.api, token, key).await?;
        let mime = fetched
            .content_type
            .filter(|mime| mime.starts_with("audio/"))
            .unwrap_or_else(|| DEFAULT_AUDIO_MIME.to_string());
        Ok(self.blobs.allocate(fetched.bytes, Some(mime)))
    }
}
