//! Register and login screens

use crate::error::Result;
use crate::form::FormState;
use crate::http::ApiClient;
use crate::routes::Route;
use crate::session;
use bw_common::api::RegisterRequest;

/// Both account forms, each with its own in-flight guard and error text
pub struct AuthView {
    api: ApiClient,
    register_form: FormState,
    login_form: FormState,
}

impl AuthView {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            register_form: FormState::new(),
            login_form: FormState::new(),
        }
    }

    /// Submit the register form; a second submit while the first is in
    /// flight fails with `SubmitInFlight` and sends nothing
    pub async fn register(&self, request: &RegisterRequest) -> Result<Route> {
        self.register_form
            .run(session::register(&self.api, request))
            .await
    }

    /// Submit the login form, guarded like `register`
    pub async fn login(&self, email: &str, password: &str) -> Result<Route> {
        self.login_form
            .run(session::login(&self.api, email, password))
            .await
    }

    pub fn register_form(&self) -> &FormState {
        &self.register_form
    }

    pub fn login_form(&self) -> &FormState {
        &self.login_form
    }
}
