//! Account forms: register, login, logout
//!
//! Each call returns the route the caller should navigate to on success.
//! Server rejections (wrong password, unknown account, duplicate email)
//! come back as `ClientError::ValidationFailed` carrying the server text.

use crate::error::{ClientError, Result};
use crate::http::ApiClient;
use crate::routes::Route;
use crate::session::SessionToken;
use bw_common::api::{LoginRequest, RegisterRequest};
use reqwest::Method;
use tracing::info;

const REGISTER_PATH: &str = "users";
const LOGIN_PATH: &str = "users/login";
const LOGOUT_PATH: &str = "users/logout";

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ClientError::Common(bw_common::Error::InvalidInput(format!(
            "{} is required",
            field
        ))));
    }
    Ok(())
}

/// Create an account; success navigates to the login page
pub async fn register(api: &ApiClient, request: &RegisterRequest) -> Result<Route> {
    require("Email", &request.email)?;
    require("Password", &request.password)?;
    require("First name", &request.first_name)?;
    require("Last name", &request.last_name)?;

    api.send_json(Method::POST, REGISTER_PATH, None, request)
        .await?;

    info!(email = %request.email, "Account registered");
    Ok(Route::Login)
}

/// Start a cookie session; success navigates to the home page
pub async fn login(api: &ApiClient, email: &str, password: &str) -> Result<Route> {
    require("Email", email)?;
    require("Password", password)?;

    let request = LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    };
    api.send_json(Method::POST, LOGIN_PATH, None, &request)
        .await?;

    info!(email = %email, "Logged in");
    Ok(Route::Home)
}

/// End the cookie session; success navigates back to the login page
pub async fn logout(api: &ApiClient, token: Option<&SessionToken>) -> Result<Route> {
    api.send_empty(Method::POST, LOGOUT_PATH, token).await?;

    info!("Logged out");
    Ok(Route::Login)
}
