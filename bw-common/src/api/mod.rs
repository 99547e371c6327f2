//! Wire types for the Blue Waves REST API
//!
//! Plain serde structs; bw-client does the requests. The crate links
//! reqwest only for its `Url` type, used by the config.

pub mod types;

pub use types::{
    ErrorBody, LoginRequest, MetadataUpdate, MusicEntry, MusicId,
    MusicListResponse, RegisterRequest, TokenResponse,
};
