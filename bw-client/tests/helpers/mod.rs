//! Shared helpers for bw-client integration tests
#![allow(dead_code)]

pub mod mock_server;

use bw_client::{session, ApiClient};
use bw_common::ClientConfig;
pub use mock_server::{MockConfig, MockServer, TEST_EMAIL, TEST_PASSWORD, TEST_TOKEN};

/// Client pointed at `server`, not logged in
pub fn client_for(server: &MockServer) -> ApiClient {
    let config = ClientConfig::with_base_url(&server.base_url()).unwrap();
    ApiClient::new(&config).unwrap()
}

/// Client pointed at `server` holding a valid session cookie
pub async fn logged_in_client(server: &MockServer) -> ApiClient {
    let api = client_for(server);
    session::login(&api, TEST_EMAIL, TEST_PASSWORD).await.unwrap();
    api
}
