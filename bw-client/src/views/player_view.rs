//! Music page: audio source plus cover art poster

use crate::error::{ClientError, Result};
use crate::http::ApiClient;
use crate::library::{AudioFetcher, CoverArtFetcher};
use crate::resource::{BlobHandle, BlobStore, GatedResource};
use crate::session::TokenResource;
use bw_common::api::MusicId;
use std::sync::Arc;
use tracing::warn;

/// Everything the player needs to render
#[derive(Debug, Clone)]
pub struct PlayerMedia {
    pub audio: Arc<BlobHandle>,
    /// Missing art does not stop playback
    pub poster: Option<Arc<BlobHandle>>,
}

pub struct PlayerView {
    token: Arc<TokenResource>,
    audio: GatedResource<AudioFetcher>,
    poster: GatedResource<CoverArtFetcher>,
}

impl PlayerView {
    pub fn new(api: ApiClient, blobs: BlobStore) -> Self {
        let token = Arc::new(TokenResource::new(api.clone()));
        Self {
            audio: GatedResource::new(
                Arc::clone(&token),
                AudioFetcher::new(api.clone(), blobs.clone()),
            ),
            poster: GatedResource::new(Arc::clone(&token), CoverArtFetcher::new(api, blobs)),
            token,
        }
    }

    pub fn token(&self) -> &TokenResource {
        &self.token
    }

    /// Load audio and poster for `id` concurrently
    ///
    /// Both reads share the view's single token request. An audio failure
    /// fails the load; a poster failure only drops the poster, unless the
    /// token itself failed.
    pub async fn load(&self, id: &MusicId) -> Result<PlayerMedia> {
        let (audio, poster) = tokio::join!(self.audio.read(id.clone()), self.poster.read(id.clone()));

        let poster = match poster {
            Ok(poster) => Some(poster),
            Err(err @ ClientError::Unauthenticated { .. }) => return Err(err),
            Err(err) => {
                warn!(music_id = %id, error = %err, "Cover art unavailable");
                None
            }
        };

        Ok(PlayerMedia {
            audio: audio?,
            poster,
        })
    }

    pub fn audio_resource(&self) -> &GatedResource<AudioFetcher> {
        &self.audio
    }

    pub fn poster_resource(&self) -> &GatedResource<CoverArtFetcher> {
        &self.poster
    }
}
