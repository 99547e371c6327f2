//! In-memory copy of the library list
//!
//! Server truth is fetched once per view; afterwards the list is kept in
//! step by splicing in confirmed changes instead of re-fetching.

use crate::library::endpoints::{Confirmed, Deletion, MetadataChange};
use crate::resource::Release;
use bw_common::api::{MusicEntry, MusicId};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryState {
    entries: Vec<MusicEntry>,
}

impl LibraryState {
    pub fn new(entries: Vec<MusicEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[MusicEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, id: &MusicId) -> Option<&MusicEntry> {
        self.entries.iter().find(|entry| &entry.music_id == id)
    }

    /// Append a newly created entry
    pub fn apply_created(&mut self, created: Confirmed<MusicEntry>) {
        let entry = created.into_inner();
        debug!(music_id = %entry.music_id, "Appending created entry");
        self.entries.push(entry);
    }

    /// Rewrite title and artist of the matching entry; false if absent
    pub fn apply_updated(&mut self, change: Confirmed<MetadataChange>) -> bool {
        let change = change.into_inner();
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.music_id == change.music_id)
        {
            Some(entry) => {
                entry.title = change.title;
                entry.artist = change.artist;
                true
            }
            None => false,
        }
    }

    /// Remove the first entry with the deleted id
    pub fn apply_deleted(&mut self, deletion: Confirmed<Deletion>) -> Option<MusicEntry> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.music_id == deletion.music_id)?;
        Some(self.entries.remove(index))
    }
}

impl Release for LibraryState {}
