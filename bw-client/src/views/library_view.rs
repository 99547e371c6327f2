//! Library page: list, add, edit, delete, cover art preview

use crate::error::{ClientError, Result};
use crate::form::FormState;
use crate::http::ApiClient;
use crate::library::{
    self, CoverArtFetcher, MetadataChange, MusicListFetcher, NewMusic, Upload,
};
use crate::resource::{BlobHandle, BlobStore, GatedResource, Phase};
use crate::session::TokenResource;
use bw_common::api::{MetadataUpdate, MusicEntry, MusicId};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

/// What an edit submission changed on the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub metadata: Option<MetadataChange>,
    pub cover_art_replaced: bool,
}

pub struct LibraryView {
    api: ApiClient,
    token: Arc<TokenResource>,
    entries: GatedResource<MusicListFetcher>,
    cover_art: GatedResource<CoverArtFetcher>,
    selected: Mutex<Option<MusicId>>,
    add_form: FormState,
    edit_form: FormState,
}

impl LibraryView {
    pub fn new(api: ApiClient, blobs: BlobStore) -> Self {
        let token = Arc::new(TokenResource::new(api.clone()));
        Self {
            entries: GatedResource::new(Arc::clone(&token), MusicListFetcher::new(api.clone())),
            cover_art: GatedResource::new(
                Arc::clone(&token),
                CoverArtFetcher::new(api.clone(), blobs),
            ),
            api,
            token,
            selected: Mutex::new(None),
            add_form: FormState::new(),
            edit_form: FormState::new(),
        }
    }

    pub fn token(&self) -> &TokenResource {
        &self.token
    }

    /// The list, fetched on first call and served from memory afterwards
    pub async fn load(&self) -> Result<Vec<MusicEntry>> {
        let state = self.entries.read(()).await?;
        Ok(state.entries().to_vec())
    }

    /// The list as currently held, without fetching
    pub fn entries(&self) -> Option<Vec<MusicEntry>> {
        self.entries
            .peek(&())
            .map(|state| state.entries().to_vec())
    }

    pub fn list_phase(&self) -> Phase<()> {
        self.entries.phase()
    }

    pub fn list_fetch_count(&self) -> usize {
        self.entries.fetch_count()
    }

    pub fn cover_art_resource(&self) -> &GatedResource<CoverArtFetcher> {
        &self.cover_art
    }

    pub fn add_form(&self) -> &FormState {
        &self.add_form
    }

    pub fn edit_form(&self) -> &FormState {
        &self.edit_form
    }

    pub fn selected(&self) -> Option<MusicId> {
        self.selected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Upload a new entry and append the server's record to the list
    pub async fn add(&self, new_music: NewMusic) -> Result<MusicEntry> {
        self.add_form
            .run(async {
                let token = self.token.acquire().await?;
                let created = library::add_music(&self.api, &token, new_music).await?;
                let entry = MusicEntry::clone(&created);

                if self
                    .entries
                    .mutate(&(), |state| state.apply_created(created))
                    .await
                    .is_none()
                {
                    debug!(music_id = %entry.music_id, "List not loaded, created entry not spliced");
                }
                Ok(entry)
            })
            .await
    }

    /// Delete an entry and drop it from the list
    pub async fn delete(&self, id: &MusicId) -> Result<Option<MusicEntry>> {
        let token = self.token.acquire().await?;
        let deletion = library::delete_music(&self.api, &token, id).await?;

        let removed = self
            .entries
            .mutate(&(), |state| state.apply_deleted(deletion))
            .await
            .flatten();

        self.cover_art.invalidate(id).await;
        {
            let mut selected = self.selected.lock().unwrap_or_else(PoisonError::into_inner);
            if selected.as_ref() == Some(id) {
                *selected = None;
            }
        }

        Ok(removed)
    }

    /// Select `id` and load its cover art (hover preload)
    ///
    /// Re-selecting the current id is served from the cache.
    pub async fn preview_cover_art(&self, id: &MusicId) -> Result<Arc<BlobHandle>> {
        {
            let mut selected = self.selected.lock().unwrap_or_else(PoisonError::into_inner);
            if selected.as_ref() != Some(id) {
                *selected = Some(id.clone());
            }
        }
        self.cover_art(id).await
    }

    pub async fn cover_art(&self, id: &MusicId) -> Result<Arc<BlobHandle>> {
        self.cover_art.read(id.clone()).await
    }

    /// Submit the edit form: metadata and cover art in parallel
    ///
    /// `on_complete` (closing the dialog) runs once, after both requests
    /// have settled and both succeeded. Whatever the server confirmed is
    /// applied locally even when the sibling request fails; the first
    /// failure is returned.
    pub async fn submit_edit(
        &self,
        id: &MusicId,
        metadata: Option<MetadataUpdate>,
        cover_art: Option<Upload>,
        on_complete: impl FnOnce(),
    ) -> Result<EditOutcome> {
        if metadata.is_none() && cover_art.is_none() {
            return Err(ClientError::Common(bw_common::Error::InvalidInput(
                "Nothing to update".to_string(),
            )));
        }

        self.edit_form
            .run(async {
                let token = self.token.acquire().await?;

                let metadata_request = async {
                    match &metadata {
                        Some(update) => library::update_metadata(&self.api, &token, id, update)
                            .await
                            .map(Some),
                        None => Ok(None),
                    }
                };
                let cover_art_request = async {
                    match cover_art {
                        Some(art) => library::replace_cover_art(&self.api, &token, id, art)
                            .await
                            .map(Some),
                        None => Ok(None),
                    }
                };

                let (metadata_result, cover_art_result) =
                    tokio::join!(metadata_request, cover_art_request);

                let metadata_change = match metadata_result {
                    Ok(Some(change)) => {
                        let applied = MetadataChange::clone(&change);
                        self.entries
                            .mutate(&(), |state| state.apply_updated(change))
                            .await;
                        Ok(Some(applied))
                    }
                    Ok(None) => Ok(None),
                    Err(err) => Err(err),
                };

                let cover_art_replaced = match cover_art_result {
                    Ok(Some(_)) => {
                        self.cover_art.invalidate(id).await;
                        Ok(true)
                    }
                    Ok(None) => Ok(false),
                    Err(err) => Err(err),
                };

                let outcome = EditOutcome {
                    metadata: metadata_change?,
                    cover_art_replaced: cover_art_replaced?,
                };

                info!(music_id = %id, "Edit submitted");
                on_complete();
                Ok(outcome)
            })
            .await
    }
}
