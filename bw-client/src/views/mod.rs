//! Headless page models
//!
//! Each view owns its own `TokenResource` (one token per page lifetime)
//! and the resources gated on it. Children of a view borrow from it and
//! never hold their own caches of the same key.

pub mod auth_view;
pub mod library_view;
pub mod player_view;

pub use auth_view::AuthView;
pub use library_view::{EditOutcome, LibraryView};
pub use player_view::{PlayerMedia, PlayerView};
