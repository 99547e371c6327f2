//! Session lifecycle: account forms and the bearer token resource

pub mod auth;
pub mod token;

pub use auth::{login, logout, register};
pub use token::{SessionToken, TokenResource, TOKEN_PATH};
