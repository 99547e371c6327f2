//! Navigation targets

use bw_common::api::MusicId;
use std::fmt;

/// A page the client can navigate to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Register,
    Login,
    Home,
    Library,
    Music(MusicId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Register => "/register".to_string(),
            Route::Login => "/login".to_string(),
            Route::Home => "/home".to_string(),
            Route::Library => "/library".to_string(),
            Route::Music(id) => format!("/library/{}", id),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
