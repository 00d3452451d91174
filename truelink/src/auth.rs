//! Login, registration and logout.
//!
//! A successful login or registration stores the returned token in the
//! session; logout clears it. Nothing is retried.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::info;

use crate::api::{ApiClient, InFlight};
use crate::error::{ApiError, ApiResult};
use crate::models::{AuthResponse, User};

#[derive(Debug, Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterBody<'a> {
    email: &'a str,
    full_name: &'a str,
    password: &'a str,
}

#[derive(Debug)]
pub struct AuthFlow {
    client: ApiClient,
    submitting: InFlight,
    user: Mutex<Option<User>>,
}

impl AuthFlow {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            submitting: InFlight::new(),
            user: Mutex::new(None),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<User> {
        let _guard = self.submitting.begin()?;
        let body = LoginBody { email, password };
        let resp: AuthResponse = self
            .client
            .post("/api/auth/login", &body, "Login failed")
            .await
            .map_err(ApiError::credentials_rejected)?;
        info!(user_id = %resp.user.id, "logged in");
        Ok(self.accept(resp))
    }

    pub async fn register(&self, email: &str, full_name: &str, password: &str) -> ApiResult<User> {
        let _guard = self.submitting.begin()?;
        let body = RegisterBody {
            email,
            full_name,
            password,
        };
        let resp: AuthResponse = self
            .client
            .post("/api/auth/register", &body, "Registration failed")
            .await
            .map_err(ApiError::credentials_rejected)?;
        info!(user_id = %resp.user.id, "registered");
        Ok(self.accept(resp))
    }

    pub fn logout(&self) {
        self.client.session().clear_credential();
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = None;
        info!("logged out");
    }

    /// The user returned by the last successful login or registration.
    pub fn current_user(&self) -> Option<User> {
        self.user.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.is_busy()
    }

    fn accept(&self, resp: AuthResponse) -> User {
        self.client.session().set_credential(resp.token);
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = Some(resp.user.clone());
        resp.user
    }
}
