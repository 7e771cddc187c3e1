//! Auth-flow state container.

use std::sync::RwLock;

use serde_json::json;

use crate::catalog::UserProfile;
use crate::server::{AuthResponse, MessageResponse, UserResponse};

use super::{error_message, parse_json, ClientError};

/// Observable auth state.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The signed-in user, if any
    pub user: Option<UserProfile>,

    /// An action is in flight
    pub loading: bool,

    /// The initial fetch-user probe has not completed yet
    pub fetching_user: bool,

    /// Message of the last failed action
    pub error: Option<String>,

    /// Message of the last successful action
    pub message: Option<String>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            loading: false,
            // The session probe runs before anything else
            fetching_user: true,
            error: None,
            message: None,
        }
    }
}

/// State container for the auth flow.
///
/// Each action maps 1:1 to an API endpoint; the cookie jar carries the
/// session across calls.
pub struct AuthStore {
    http: reqwest::Client,
    base_url: String,
    state: RwLock<AuthState>,
}

impl AuthStore {
    /// Create a store talking to the API at `base_url`
    /// (e.g. `http://localhost:5000`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a store over an existing client (to share a cookie jar
    /// with a [`BookStore`](super::BookStore)).
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            state: RwLock::new(AuthState::default()),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AuthState {
        self.state.read().expect("auth state poisoned").clone()
    }

    fn set(&self, apply: impl FnOnce(&mut AuthState)) {
        let mut state = self.state.write().expect("auth state poisoned");
        apply(&mut state);
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `POST /api/signup`. On success the new user becomes the current
    /// user.
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, ClientError> {
        self.set(|s| {
            s.loading = true;
            s.message = None;
        });

        let result: Result<AuthResponse, ClientError> = async {
            let response = self
                .http
                .post(self.url("/api/signup"))
                .json(&json!({
                    "username": username,
                    "email": email,
                    "password": password,
                }))
                .send()
                .await?;
            parse_json(response, "Error signing up").await
        }
        .await;

        match result {
            Ok(body) => {
                self.set(|s| {
                    s.user = Some(body.user.clone());
                    s.loading = false;
                });
                Ok(body.user)
            }
            Err(e) => {
                let message = error_message(&e, "Error signing up");
                self.set(|s| {
                    s.loading = false;
                    s.error = Some(message);
                });
                Err(e)
            }
        }
    }

    /// `POST /api/log-in`.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        self.set(|s| {
            s.loading = true;
            s.message = None;
        });

        let result: Result<AuthResponse, ClientError> = async {
            let response = self
                .http
                .post(self.url("/api/log-in"))
                .json(&json!({ "email": email, "password": password }))
                .send()
                .await?;
            parse_json(response, "Error logging in").await
        }
        .await;

        match result {
            Ok(body) => {
                self.set(|s| {
                    s.user = Some(body.user.clone());
                    s.message = Some(body.message.clone());
                    s.loading = false;
                });
                Ok(body)
            }
            Err(e) => {
                let message = error_message(&e, "Error logging in");
                self.set(|s| {
                    s.loading = false;
                    s.error = Some(message);
                });
                Err(e)
            }
        }
    }

    /// `GET /api/fetch-user`: the session probe. A failure only clears
    /// the user; it is not recorded as an error.
    pub async fn fetch_user(&self) -> Result<UserProfile, ClientError> {
        self.set(|s| {
            s.fetching_user = true;
            s.error = None;
        });

        let result: Result<UserResponse, ClientError> = async {
            let response = self.http.get(self.url("/api/fetch-user")).send().await?;
            parse_json(response, "Error fetching user").await
        }
        .await;

        match result {
            Ok(body) => {
                self.set(|s| {
                    s.user = Some(body.user.clone());
                    s.fetching_user = false;
                });
                Ok(body.user)
            }
            Err(e) => {
                self.set(|s| {
                    s.fetching_user = false;
                    s.error = None;
                    s.user = None;
                });
                Err(e)
            }
        }
    }

    /// `POST /api/logout`. Clears the local user on success.
    pub async fn logout(&self) -> Result<String, ClientError> {
        self.set(|s| {
            s.loading = true;
            s.message = None;
            s.error = None;
        });

        let result: Result<MessageResponse, ClientError> = async {
            let response = self.http.post(self.url("/api/logout")).send().await?;
            parse_json(response, "Error logging out").await
        }
        .await;

        match result {
            Ok(body) => {
                self.set(|s| {
                    s.message = Some(body.message.clone());
                    s.loading = false;
                    s.user = None;
                    s.error = None;
                });
                Ok(body.message)
            }
            Err(e) => {
                let message = error_message(&e, "Error logging out");
                self.set(|s| {
                    s.loading = false;
                    s.error = Some(message);
                });
                Err(e)
            }
        }
    }
}
