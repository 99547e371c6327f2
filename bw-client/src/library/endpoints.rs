//! Calls to the `users/music` endpoints
//!
//! Every write returns its result wrapped in `Confirmed`, which only this
//! module can construct and only after the server answered 2xx. Local list
//! state accepts nothing else, so the list can never run ahead of the
//! server.

use crate::error::{ClientError, Result};
use crate::http::{ApiClient, Fetched};
use crate::library::upload::Upload;
use crate::session::SessionToken;
use bw_common::api::{MetadataUpdate, MusicEntry, MusicId, MusicListResponse};
use reqwest::multipart::Form;
use reqwest::Method;
use std::ops::Deref;
use tracing::info;

pub const MUSIC_PATH: &str = "users/music";

pub fn music_path(id: &MusicId) -> String {
    format!("{}/{}", MUSIC_PATH, id)
}

pub fn cover_art_path(id: &MusicId) -> String {
    format!("{}/{}/cover-art", MUSIC_PATH, id)
}

/// A server-acknowledged change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmed<T>(T);

impl<T> Confirmed<T> {
    pub(crate) fn new(value: T) -> Self {
        Self(value)
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Confirmed<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

/// Acknowledged metadata update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataChange {
    pub music_id: MusicId,
    pub title: String,
    pub artist: String,
}

/// Acknowledged cover art replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverArtReplaced {
    pub music_id: MusicId,
}

/// Acknowledged deletion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deletion {
    pub music_id: MusicId,
}

/// Contents of the "add music" form
#[derive(Debug, Clone)]
pub struct NewMusic {
    pub title: String,
    pub artist: String,
    pub file: Upload,
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ClientError::Common(bw_common::Error::InvalidInput(format!(
            "{} is required",
            field
        ))));
    }
    Ok(())
}

/// `GET users/music`
pub async fn list_music(api: &ApiClient, token: &SessionToken) -> Result<Vec<MusicEntry>> {
    let response: MusicListResponse = api.get_json(MUSIC_PATH, Some(token)).await?;
    info!(count = response.music.len(), "Library loaded");
    Ok(response.music)
}

/// `POST users/music` (multipart: title, artist, file)
pub async fn add_music(
    api: &ApiClient,
    token: &SessionToken,
    new_music: NewMusic,
) -> Result<Confirmed<MusicEntry>> {
    require("Title", &new_music.title)?;
    require("Artist", &new_music.artist)?;

    let form = Form::new()
        .text("title", new_music.title)
        .text("artist", new_music.artist)
        .part("file", new_music.file.into_part()?);

    let response = api
        .send_multipart(Method::POST, MUSIC_PATH, Some(token), form)
        .await?;
    let created: MusicEntry = response
        .json()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))?;

    info!(music_id = %created.music_id, title = %created.title, "Music added");
    Ok(Confirmed::new(created))
}

/// `PATCH users/music/{id}` (JSON: title, artist)
pub async fn update_metadata(
    api: &ApiClient,
    token: &SessionToken,
    id: &MusicId,
    update: &MetadataUpdate,
) -> Result<Confirmed<MetadataChange>> {
    require("Title", &update.title)?;
    require("Artist", &update.artist)?;

    api.send_json(Method::PATCH, &music_path(id), Some(token), update)
        .await?;

    info!(music_id = %id, "Metadata updated");
    Ok(Confirmed::new(MetadataChange {
        music_id: id.clone(),
        title: update.title.clone(),
        artist: update.artist.clone(),
    }))
}

/// `PUT users/music/{id}/cover-art` (multipart: artFile)
pub async fn replace_cover_art(
    api: &ApiClient,
    token: &SessionToken,
    id: &MusicId,
    art: Upload,
) -> Result<Confirmed<CoverArtReplaced>> {
    let form = Form::new().part("artFile", art.into_part()?);

    api.send_multipart(Method::PUT, &cover_art_path(id), Some(token), form)
        .await?;

    info!(music_id = %id, "Cover art replaced");
    Ok(Confirmed::new(CoverArtReplaced {
        music_id: id.clone(),
    }))
}

/// `DELETE users/music/{id}`
pub async fn delete_music(
    api: &ApiClient,
    token: &SessionToken,
    id: &MusicId,
) -> Result<Confirmed<Deletion>> {
    api.send_empty(Method::DELETE, &music_path(id), Some(token))
        .await?;

    info!(music_id = %id, "Music deleted");
    Ok(Confirmed::new(Deletion {
        music_id: id.clone(),
    }))
}

/// `GET users/music/{id}`: the audio stream
pub async fn fetch_audio(api: &ApiClient, token: &SessionToken, id: &MusicId) -> Result<Fetched> {
    api.get_bytes(&music_path(id), Some(token)).await
}

/// `GET users/music/{id}/cover-art`: the image
pub async fn fetch_cover_art(
    api: &ApiClient,
    token: &SessionToken,
    id: &MusicId,
) -> Result<Fetched> {
    api.get_bytes(&cover_art_path(id), Some(token)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let id = MusicId::new("abc");
        assert_eq!(music_path(&id), "users/music/abc");
        assert_eq!(cover_art_path(&id), "users/music/abc/cover-art");
    }

    #[test]
    fn test_confirmed_derefs() {
        let confirmed = Confirmed::new(Deletion {
            music_id: MusicId::new("x"),
        });
        assert_eq!(confirmed.music_id, MusicId::new("x"));
        assert_eq!(confirmed.into_inner().music_id.as_str(), "x");
    }
}
