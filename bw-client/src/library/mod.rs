//! Music library: endpoint calls, dependent fetchers, local list state

pub mod endpoints;
pub mod fetchers;
pub mod state;
pub mod upload;

pub use endpoints::{
    add_music, delete_music, fetch_audio, fetch_cover_art, list_music, replace_cover_art,
    update_metadata, Confirmed, CoverArtReplaced, Deletion, MetadataChange, NewMusic,
};
pub use fetchers::{AudioFetcher, CoverArtFetcher, MusicListFetcher};
pub use state::LibraryState;
pub use upload::Upload;
